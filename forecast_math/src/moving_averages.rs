//! Trailing-window means
//!
//! Rolling means here tolerate partial windows: with fewer than `window`
//! observations available, the mean is taken over whatever exists (a
//! minimum of one observation).

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Streaming trailing mean over the most recent `window` values
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    values: VecDeque<f64>,
}

impl RollingMean {
    /// Create a new rolling mean with the specified window
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(MathError::InvalidInput(
                "Window must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            window,
            values: VecDeque::with_capacity(window),
        })
    }

    /// Push a new value, evicting the oldest once the window is full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.window {
            self.values.pop_front();
        }
    }

    /// Mean of the values currently in the window, `None` before the first update
    pub fn value(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Number of observations currently held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no observations have been pushed yet
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the configured window
    pub fn window(&self) -> usize {
        self.window
    }

    /// Reset, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Rolling mean for every position of `values` (minimum one observation)
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<f64>> {
    let mut rolling = RollingMean::new(window)?;
    let mut means = Vec::with_capacity(values.len());

    for &value in values {
        rolling.update(value);
        // Just updated, so the window holds at least one value
        means.push(rolling.value().unwrap_or(value));
    }

    Ok(means)
}

/// Mean of the last `window` entries of `values`, or of all of them when fewer exist
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() || window == 0 {
        return None;
    }

    let start = values.len().saturating_sub(window);
    let tail = &values[start..];
    Some(tail.iter().sum::<f64>() / tail.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rolling_mean_partial_windows() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        let means = rolling_mean(&values, 3).unwrap();

        assert_eq!(means.len(), 5);
        assert_relative_eq!(means[0], 10.0);
        assert_relative_eq!(means[1], 15.0);
        assert_relative_eq!(means[2], 20.0);
        assert_relative_eq!(means[3], 30.0);
        assert_relative_eq!(means[4], 40.0);
    }

    #[test]
    fn test_rolling_mean_rejects_zero_window() {
        assert!(rolling_mean(&[1.0], 0).is_err());
        assert!(RollingMean::new(0).is_err());
    }

    #[test]
    fn test_streaming_matches_batch() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let batch = rolling_mean(&values, 4).unwrap();

        let mut rolling = RollingMean::new(4).unwrap();
        assert!(rolling.value().is_none());
        for (i, &v) in values.iter().enumerate() {
            rolling.update(v);
            assert_relative_eq!(rolling.value().unwrap(), batch[i]);
        }
        assert_eq!(rolling.len(), 4);

        rolling.reset();
        assert!(rolling.is_empty());
    }

    #[test]
    fn test_trailing_mean() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(trailing_mean(&values, 2).unwrap(), 3.5);
        assert_relative_eq!(trailing_mean(&values, 30).unwrap(), 2.5);
        assert!(trailing_mean(&[], 7).is_none());
    }
}
