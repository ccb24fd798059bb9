use std::collections::HashMap;

use super::MetricKey;

/// Converts monotonic counters into per-interval deltas.
///
/// Holds the last raw value seen for every key. Entries are created on first
/// observation and never removed; stale keys from containers that went away
/// are bounded by the number of distinct keys ever seen.
#[derive(Debug, Default)]
pub struct RateTracker {
    last_values: HashMap<MetricKey, f64>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `raw` for `key` and return the delta against the previous
    /// sample, or `None` when this is the first sample (baseline only).
    ///
    /// A decrease is read as a wrap at `max_counter`. If the wrapped delta is
    /// implausible (more than half the counter range) the counter was reset
    /// instead, and the result is 0 with `raw` as the new baseline.
    pub fn observe(&mut self, key: &MetricKey, raw: f64, max_counter: f64) -> Option<f64> {
        let previous = self.last_values.insert(key.clone(), raw)?;

        let delta = raw - previous;
        if delta >= 0.0 {
            return Some(delta);
        }

        let wrapped = ((max_counter - previous) + raw).max(0.0);
        if wrapped > max_counter / 2.0 {
            Some(0.0)
        } else {
            Some(wrapped)
        }
    }

    /// Same as [`observe`](Self::observe), reporting the baseline sample as 0
    #[allow(dead_code)]
    pub fn derive(&mut self, key: &MetricKey, raw: f64, max_counter: f64) -> f64 {
        self.observe(key, raw, max_counter).unwrap_or(0.0)
    }

    /// Number of keys with a recorded baseline
    pub fn tracked_keys(&self) -> usize {
        self.last_values.len()
    }
}
