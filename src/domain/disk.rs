use serde::{Deserialize, Serialize};
use thiserror::Error;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const GB: f64 = 1000.0 * 1000.0 * 1000.0;

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("Unable to parse size {0:?}")]
    InvalidSize(String),

    #[error("Path does not exist: {0}")]
    MissingPath(String),

    #[error("statvfs failed: {0}")]
    Stat(String),
}

/// Block totals for a mounted filesystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskUsageSample {
    pub mount_point: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskUsageSample {
    pub fn new(mount_point: String, total_bytes: u64, free_bytes: u64) -> Self {
        Self {
            mount_point,
            total_bytes,
            free_bytes,
        }
    }

    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    pub fn usage_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes() as f64 / self.total_bytes as f64) * 100.0
    }

    /// (total, available, used, utilization) with sizes in GiB
    pub fn gauges(&self) -> [(&'static str, f64); 4] {
        [
            ("total", self.total_bytes as f64 / GIB),
            ("available", self.free_bytes as f64 / GIB),
            ("used", self.used_bytes() as f64 / GIB),
            ("utilization", self.usage_percent()),
        ]
    }
}

/// Storage driver data space, as reported by `docker info`
#[derive(Debug, Clone, PartialEq)]
pub struct DataSpace {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
}

impl DataSpace {
    /// Picks the "Data Space *" rows out of the driver status table.
    ///
    /// Returns `Ok(None)` when the driver does not report all three (e.g.
    /// overlay2); a row that is present but unreadable is an error.
    pub fn from_driver_status(status: &[(String, String)]) -> Result<Option<Self>, DiskError> {
        let find = |label: &str| {
            status
                .iter()
                .find(|(key, _)| key == label)
                .map(|(_, value)| value.as_str())
        };

        let (Some(total), Some(used), Some(available)) = (
            find("Data Space Total"),
            find("Data Space Used"),
            find("Data Space Available"),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            total_bytes: parse_human_size(total)?,
            used_bytes: parse_human_size(used)?,
            available_bytes: parse_human_size(available)?,
        }))
    }

    /// (available, used, total, utilization) with sizes in GB
    pub fn gauges(&self) -> [(&'static str, f64); 4] {
        let total = self.total_bytes as f64 / GB;
        let used = self.used_bytes as f64 / GB;
        let utilization = if total > 0.0 { used / total * 100.0 } else { 0.0 };
        [
            ("available", self.available_bytes as f64 / GB),
            ("used", used),
            ("total", total),
            ("utilization", utilization),
        ]
    }
}

/// Parse sizes such as `12.5 GB`, `100MB`, `1.2k` or `512` using decimal units
pub fn parse_human_size(value: &str) -> Result<u64, DiskError> {
    let invalid = || DiskError::InvalidSize(value.to_string());

    let trimmed = value.trim();
    let without_b = trimmed
        .strip_suffix(|c: char| c == 'b' || c == 'B')
        .unwrap_or(trimmed)
        .trim_end();

    let (number, multiplier) = match without_b.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => {
            let multiplier = unit_multiplier(c).ok_or_else(invalid)?;
            (without_b[..without_b.len() - 1].trim_end(), multiplier)
        }
        _ => (without_b, 1.0),
    };

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }
    let parsed: f64 = number.parse().map_err(|_| invalid())?;

    Ok((parsed * multiplier) as u64)
}

fn unit_multiplier(unit: char) -> Option<f64> {
    let multiplier = match unit.to_ascii_lowercase() {
        'k' => 1e3,
        'm' => 1e6,
        'g' => 1e9,
        't' => 1e12,
        'p' => 1e15,
        _ => return None,
    };
    Some(multiplier)
}
