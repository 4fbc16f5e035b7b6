//! RSI (Relative Strength Index) indicator

use crate::indicators::{ready_series, Indicator};
use crate::Result;
use ta::indicators::RelativeStrengthIndex;
use ta::Next;

/// RSI indicator wrapper
#[derive(Debug)]
pub struct RSI {
    inner: RelativeStrengthIndex,
    period: usize,
    update_count: usize,
    last_value: Option<f64>,
}

impl RSI {
    /// Create new RSI indicator
    pub fn new(period: usize) -> Result<Self> {
        let inner = RelativeStrengthIndex::new(period)
            .map_err(|e| anyhow::anyhow!("invalid RSI period {period}: {e:?}"))?;
        Ok(Self {
            inner,
            period,
            update_count: 0,
            last_value: None,
        })
    }

    /// Get RSI period
    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for RSI {
    fn name(&self) -> &str {
        "RSI"
    }

    fn update(&mut self, value: f64) {
        let rsi_value = self.inner.next(value);
        self.update_count += 1;
        if self.update_count > self.period {
            self.last_value = Some(rsi_value);
        }
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        // ta RSI needs period+1 values
        self.update_count > self.period
    }
}

/// RSI series over `values`, right-aligned
pub fn calculate_rsi(values: &[f64], period: usize) -> Result<Vec<f64>> {
    Ok(ready_series(RSI::new(period)?, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_not_ready_before_period() {
        let mut rsi = RSI::new(14).unwrap();
        for value in [100.0, 102.0, 101.0, 103.0, 105.0, 104.0, 106.0] {
            rsi.update(value);
        }
        // 14 period needs at least 15 values
        assert!(!rsi.is_ready());
        assert_eq!(rsi.value(), None);
    }

    #[test]
    fn test_rsi_series_bounds() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + ((i % 7) as f64 - 3.0)).collect();
        let series = calculate_rsi(&values, 14).unwrap();
        assert_eq!(series.len(), 40 - 14);
        assert!(series.iter().all(|v| (0.0..=100.0).contains(v)));
    }
}
