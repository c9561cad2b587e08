// src/launch/budget.rs

//! Memory ceiling for the benchmark runner.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::{ConfigLookup, LookupError, keys};
use crate::host::HostRuntime;

/// Multiplier applied to the orchestrator's own heap ceiling when no memory
/// limit is configured. The runner does the heavy lifting and gets three
/// times the orchestrator's headroom. Not meant to be tuned.
pub const FALLBACK_HEAP_MULTIPLIER: u64 = 3;

/// Where a [`ResourceBudget`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetSource {
    Configured,
    DerivedDefault,
}

impl fmt::Display for BudgetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetSource::Configured => f.write_str("configured"),
            BudgetSource::DerivedDefault => f.write_str("derived-default"),
        }
    }
}

/// Memory ceiling for one launch. Recomputed on every launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceBudget {
    /// Ceiling in megabytes.
    pub limit_mb: u64,
    /// Value passed to the memory flag verbatim, e.g. `"2g"` or `"1536m"`.
    pub flag_value: String,
    pub source: BudgetSource,
}

/// Unit suffix of a memory string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryUnit {
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl MemoryUnit {
    fn from_suffix(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'k' => Some(MemoryUnit::Kilobytes),
            'm' => Some(MemoryUnit::Megabytes),
            'g' => Some(MemoryUnit::Gigabytes),
            _ => None,
        }
    }

    fn to_mb(self, amount: u64) -> Option<u64> {
        match self {
            MemoryUnit::Kilobytes => Some(amount.div_ceil(1024)),
            MemoryUnit::Megabytes => Some(amount),
            MemoryUnit::Gigabytes => amount.checked_mul(1024),
        }
    }
}

/// Parse `"<digits><k|m|g>"` into megabytes.
///
/// Returns a human-readable reason on failure so the caller can log it.
pub fn parse_memory_mb(value: &str) -> Result<u64, String> {
    let value = value.trim();
    let suffix = value
        .chars()
        .last()
        .ok_or_else(|| "empty memory value".to_string())?;

    let unit = MemoryUnit::from_suffix(suffix)
        .ok_or_else(|| format!("missing unit suffix (expected k, m or g) in '{value}'"))?;

    let digits = &value[..value.len() - suffix.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid amount '{digits}' in '{value}'"));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|e| format!("invalid amount '{digits}': {e}"))?;
    if amount == 0 {
        return Err(format!("memory limit must be positive, got '{value}'"));
    }

    unit.to_mb(amount)
        .ok_or_else(|| format!("memory limit '{value}' overflows"))
}

/// Derives the runner's memory ceiling from configuration, falling back to a
/// multiple of the orchestrator's own heap ceiling.
#[derive(Debug, Clone)]
pub struct ResourceBudgetCalculator {
    host: Arc<dyn HostRuntime>,
}

impl ResourceBudgetCalculator {
    pub fn new(host: Arc<dyn HostRuntime>) -> Self {
        Self { host }
    }

    /// Compute the budget for one launch.
    ///
    /// Missing, empty or malformed values are logged and replaced by the
    /// derived default; this never fails.
    pub fn compute_limit(&self, config: &dyn ConfigLookup) -> ResourceBudget {
        let configured = match config.get_string(keys::MAX_MEMORY) {
            Ok(v) => v,
            Err(LookupError::Missing(_)) => {
                warn!(key = keys::MAX_MEMORY, "memory limit not configured; deriving default");
                return self.derived_default();
            }
            Err(e) => {
                error!(key = keys::MAX_MEMORY, error = %e, "failed to read memory limit");
                return self.derived_default();
            }
        };

        let trimmed = configured.trim();
        if trimmed.is_empty() {
            debug!(key = keys::MAX_MEMORY, "memory limit empty; deriving default");
            return self.derived_default();
        }

        match parse_memory_mb(trimmed) {
            Ok(limit_mb) => ResourceBudget {
                limit_mb,
                flag_value: trimmed.to_string(),
                source: BudgetSource::Configured,
            },
            Err(reason) => {
                error!(
                    key = keys::MAX_MEMORY,
                    value = %configured,
                    reason = %reason,
                    "failed to parse memory limit; deriving default"
                );
                self.derived_default()
            }
        }
    }

    fn derived_default(&self) -> ResourceBudget {
        let limit_mb = self
            .host
            .max_heap_mb()
            .saturating_mul(FALLBACK_HEAP_MULTIPLIER);
        ResourceBudget {
            limit_mb,
            flag_value: format!("{limit_mb}m"),
            source: BudgetSource::DerivedDefault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_memory_mb("2g"), Ok(2048));
        assert_eq!(parse_memory_mb("2G"), Ok(2048));
        assert_eq!(parse_memory_mb("512m"), Ok(512));
        assert_eq!(parse_memory_mb("1048576k"), Ok(1024));
        assert_eq!(parse_memory_mb("1k"), Ok(1));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_memory_mb("").is_err());
        assert!(parse_memory_mb("2048").is_err());
        assert!(parse_memory_mb("2gb").is_err());
        assert!(parse_memory_mb("g").is_err());
        assert!(parse_memory_mb("0m").is_err());
        assert!(parse_memory_mb("-1m").is_err());
        assert!(parse_memory_mb("+5m").is_err());
        assert!(parse_memory_mb("1 g").is_err());
        assert!(parse_memory_mb("99999999999999999999g").is_err());
    }
}
