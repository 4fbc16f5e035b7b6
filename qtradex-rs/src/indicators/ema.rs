//! EMA (Exponential Moving Average) indicator

use crate::indicators::{ready_series, Indicator};
use crate::Result;
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

/// EMA indicator wrapper
#[derive(Debug)]
pub struct EMA {
    inner: ExponentialMovingAverage,
    period: usize,
    update_count: usize,
    last_value: Option<f64>,
}

impl EMA {
    /// Create new EMA indicator
    pub fn new(period: usize) -> Result<Self> {
        let inner = ExponentialMovingAverage::new(period)
            .map_err(|e| anyhow::anyhow!("invalid EMA period {period}: {e:?}"))?;
        Ok(Self {
            inner,
            period,
            update_count: 0,
            last_value: None,
        })
    }

    /// Get EMA period
    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for EMA {
    fn name(&self) -> &str {
        "EMA"
    }

    fn update(&mut self, value: f64) {
        let ema_value = self.inner.next(value);
        self.update_count += 1;
        if self.update_count >= self.period {
            self.last_value = Some(ema_value);
        }
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.update_count >= self.period
    }
}

/// EMA series over `values`, right-aligned
pub fn calculate_ema(values: &[f64], period: usize) -> Result<Vec<f64>> {
    Ok(ready_series(EMA::new(period)?, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_series_is_right_aligned() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let series = calculate_ema(&values, 5).unwrap();
        assert_eq!(series.len(), 16);
        assert!(series.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_ema_rejects_zero_period() {
        assert!(EMA::new(0).is_err());
    }
}
