//! Tune candidate evaluation
//!
//! Scores caller-supplied tune candidates. Choosing the candidates is left to
//! the optimizer driving this module.

use crate::backtest::{BacktestEngine, BacktestResult};
use crate::data::CandleSeries;
use crate::strategy::Strategy;
use crate::tune::Tune;
use crate::Result;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{info, warn};

/// Outcome of one candidate
#[derive(Debug)]
pub struct CandidateResult {
    /// Position in the candidate list
    pub index: usize,
    pub tune: Tune,
    pub outcome: Result<BacktestResult>,
}

impl CandidateResult {
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.outcome.as_ref().ok()?.score(metric)
    }
}

/// Runs each candidate through its own backtest
#[derive(Debug, Clone, Default)]
pub struct CandidateEvaluator {
    engine: BacktestEngine,
}

impl CandidateEvaluator {
    pub fn new(engine: BacktestEngine) -> Self {
        Self { engine }
    }

    /// Evaluate candidates in parallel, one fresh strategy per candidate.
    ///
    /// Results come back in candidate order. A failing candidate only affects
    /// its own result.
    pub fn evaluate<S, F>(&self, factory: F, data: &CandleSeries, candidates: Vec<Tune>) -> Vec<CandidateResult>
    where
        S: Strategy,
        F: Fn(Tune) -> S + Sync,
    {
        info!(candidates = candidates.len(), "evaluating tune candidates");
        candidates
            .into_par_iter()
            .enumerate()
            .map(|(index, tune)| {
                let mut strategy = factory(tune.clone());
                let outcome = self.engine.run(&mut strategy, data);
                if let Err(err) = &outcome {
                    warn!(index, error = %format!("{err:#}"), "candidate failed");
                }
                CandidateResult { index, tune, outcome }
            })
            .collect()
    }

    /// Evaluate candidates one after another on a single strategy instance,
    /// replacing its tune before every run.
    pub fn evaluate_sequential<S: Strategy + ?Sized>(
        &self,
        strategy: &mut S,
        data: &CandleSeries,
        candidates: Vec<Tune>,
    ) -> Vec<CandidateResult> {
        candidates
            .into_iter()
            .enumerate()
            .map(|(index, tune)| {
                *strategy.tune_mut() = tune.clone();
                let outcome = self.engine.run(&mut *strategy, data);
                if let Err(err) = &outcome {
                    warn!(index, error = %format!("{err:#}"), "candidate failed");
                }
                CandidateResult { index, tune, outcome }
            })
            .collect()
    }
}

/// Whether a larger or smaller metric value ranks first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Maximize,
    Minimize,
}

impl Objective {
    /// Ranking direction for the metrics computed by the backtest engine
    pub fn for_metric(metric: &str) -> Self {
        match metric {
            "max_drawdown" => Objective::Minimize,
            _ => Objective::Maximize,
        }
    }
}

/// Best successful candidate for `metric` in the given direction
pub fn best_by<'a>(
    results: &'a [CandidateResult],
    metric: &str,
    objective: Objective,
) -> Option<&'a CandidateResult> {
    let scored = results
        .iter()
        .filter_map(|result| Some((result, result.score(metric).filter(|v| !v.is_nan())?)));
    let order = |a: &f64, b: &f64| a.partial_cmp(b).unwrap_or(Ordering::Equal);
    match objective {
        Objective::Maximize => scored.max_by(|(_, a), (_, b)| order(a, b)),
        Objective::Minimize => scored.min_by(|(_, a), (_, b)| order(a, b)),
    }
    .map(|(result, _)| result)
}
