use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Divisor turning CPU nanosecond counters into published units
pub const CPU_NANOS_DIVISOR: f64 = 10_000_000.0;

/// Largest value a runtime counter can hold before wrapping
pub const MAX_COUNTER: f64 = u64::MAX as f64;

/// Metric name used as the lookup key for rate state.
///
/// Must be unique per physical counter stream: two containers resolving to
/// the same key would overwrite each other's rate baseline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey(String);

impl MetricKey {
    pub fn new(prefix: &str, leaf: &str) -> Self {
        Self(format!("{}.{}", prefix, leaf))
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single published (name, value) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl MetricPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl From<(MetricKey, f64)> for MetricPoint {
    fn from((key, value): (MetricKey, f64)) -> Self {
        Self::new(key.into_string(), value)
    }
}

/// Round to a fixed number of decimal places for gauge publishing
pub fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_key_joins_with_dot() {
        let key = MetricKey::new("test.146979a53289.docker", "cpu3.user");
        assert_eq!(key.as_str(), "test.146979a53289.docker.cpu3.user");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(99.999, 2), 100.0);
    }
}
