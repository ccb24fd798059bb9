//! Container stats payload and the tolerant parser over it.
//!
//! [`RawStats`] mirrors the runtime's stats document with every field
//! optional, so schema differences between runtime versions (cgroup v1 vs
//! v2 memory stats, `network` vs `networks`) become explicit presence checks
//! in [`SnapshotParser`] instead of silent defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interface name used when the runtime only reports one unnamed interface
pub const DEFAULT_INTERFACE: &str = "eth0";

/// Keys tried in order for resident memory (cgroup v1 first)
const RSS_KEYS: [&str; 3] = ["total_rss", "rss", "anon"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Published metric groups for one container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricGroup {
    Cpu,
    Memory,
    Network,
    OpenSockets,
}

impl MetricGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "mem",
            Self::Network => "net",
            Self::OpenSockets => "open_sockets",
        }
    }
}

/// Stats document as returned by the runtime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStats {
    #[serde(default)]
    pub cpu_stats: Option<RawCpuStats>,
    #[serde(default)]
    pub memory_stats: Option<RawMemoryStats>,
    #[serde(default)]
    pub networks: Option<BTreeMap<String, RawNetworkCounters>>,
    /// Single-interface form used by older runtimes
    #[serde(default)]
    pub network: Option<RawNetworkCounters>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCpuStats {
    #[serde(default)]
    pub cpu_usage: Option<RawCpuUsage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCpuUsage {
    #[serde(default)]
    pub total_usage: Option<u64>,
    #[serde(default)]
    pub percpu_usage: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMemoryStats {
    #[serde(default)]
    pub stats: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNetworkCounters {
    #[serde(default)]
    pub rx_bytes: Option<u64>,
    #[serde(default)]
    pub tx_bytes: Option<u64>,
}

/// Cumulative CPU time in nanoseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuUsage {
    /// Indexed by core; absent on hosts that do not report per-core usage
    pub per_core: Vec<u64>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub rss_bytes: u64,
    pub limit_bytes: u64,
}

/// Cumulative counters for one network interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceCounters {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Typed view of one container's stats at a point in time.
///
/// Groups that failed to parse are `None` and their errors are kept in
/// `errors`, so one bad group never hides the others.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub cpu: Option<CpuUsage>,
    pub memory: Option<MemoryUsage>,
    pub network: Vec<InterfaceCounters>,
    pub open_sockets: Option<u64>,
    pub errors: Vec<(MetricGroup, ParseError)>,
}

impl StatsSnapshot {
    pub fn with_open_sockets(mut self, open_sockets: Option<u64>) -> Self {
        self.open_sockets = open_sockets;
        self
    }
}

/// Extracts typed values from [`RawStats`]
pub struct SnapshotParser;

impl SnapshotParser {
    pub fn parse(raw: &RawStats) -> StatsSnapshot {
        let mut errors = Vec::new();

        let cpu = Self::parse_cpu(raw)
            .map_err(|e| errors.push((MetricGroup::Cpu, e)))
            .ok();
        let memory = Self::parse_memory(raw)
            .map_err(|e| errors.push((MetricGroup::Memory, e)))
            .ok();
        let mut network = Vec::new();
        for interface in Self::parse_network(raw) {
            match interface {
                Ok(counters) => network.push(counters),
                Err(e) => errors.push((MetricGroup::Network, e)),
            }
        }

        StatsSnapshot {
            cpu,
            memory,
            network,
            open_sockets: None,
            errors,
        }
    }

    pub fn parse_cpu(raw: &RawStats) -> Result<CpuUsage, ParseError> {
        let usage = raw
            .cpu_stats
            .as_ref()
            .ok_or(ParseError::MissingField("cpu_stats"))?
            .cpu_usage
            .as_ref()
            .ok_or(ParseError::MissingField("cpu_stats.cpu_usage"))?;

        let total = usage
            .total_usage
            .ok_or(ParseError::MissingField("cpu_stats.cpu_usage.total_usage"))?;

        Ok(CpuUsage {
            per_core: usage.percpu_usage.clone().unwrap_or_default(),
            total,
        })
    }

    pub fn parse_memory(raw: &RawStats) -> Result<MemoryUsage, ParseError> {
        let memory = raw
            .memory_stats
            .as_ref()
            .ok_or(ParseError::MissingField("memory_stats"))?;

        let stats = memory
            .stats
            .as_ref()
            .ok_or(ParseError::MissingField("memory_stats.stats"))?;

        // Null entries are treated as absent so the next key is tried
        let (rss_key, rss_value) = RSS_KEYS
            .iter()
            .find_map(|key| stats.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))
            .ok_or(ParseError::MissingField("memory_stats.stats.total_rss"))?;

        let rss_bytes = rss_value.as_u64().ok_or_else(|| ParseError::Invalid {
            field: "memory_stats.stats.total_rss",
            reason: format!("expected an unsigned integer for {}, got {}", rss_key, rss_value),
        })?;

        let limit_bytes = memory
            .limit
            .ok_or(ParseError::MissingField("memory_stats.limit"))?;

        Ok(MemoryUsage {
            rss_bytes,
            limit_bytes,
        })
    }

    /// Prefers the per-interface map; falls back to the single unnamed block
    /// as `eth0`. No network data at all yields no interfaces. A block missing
    /// a counter is returned as an error in its place.
    pub fn parse_network(raw: &RawStats) -> Vec<Result<InterfaceCounters, ParseError>> {
        if let Some(networks) = &raw.networks {
            return networks
                .iter()
                .map(|(name, counters)| Self::interface(name, counters))
                .collect();
        }

        raw.network
            .as_ref()
            .map(|counters| Self::interface(DEFAULT_INTERFACE, counters))
            .into_iter()
            .collect()
    }

    fn interface(name: &str, counters: &RawNetworkCounters) -> Result<InterfaceCounters, ParseError> {
        let missing = |counter: &str| ParseError::Invalid {
            field: "networks",
            reason: format!("interface {} has no {}", name, counter),
        };

        Ok(InterfaceCounters {
            name: name.to_string(),
            rx_bytes: counters.rx_bytes.ok_or_else(|| missing("rx_bytes"))?,
            tx_bytes: counters.tx_bytes.ok_or_else(|| missing("tx_bytes"))?,
        })
    }
}
