// src/config/lookup.rs

use std::fmt::Debug;

use thiserror::Error;

/// Why a typed lookup could not produce a value.
///
/// These never leave the component doing the lookup; they are logged and a
/// default is used instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("configuration key '{0}' is not set")]
    Missing(String),

    #[error("configuration key '{key}' has invalid value '{value}': {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Read-only key → string view over the benchmark configuration.
///
/// Keys are dotted (`runner.max-memory`). Typed helpers are provided on top
/// of the single required method.
pub trait ConfigLookup: Send + Sync + Debug {
    /// Raw string value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    fn get_string(&self, key: &str) -> Result<String, LookupError> {
        self.get(key)
            .ok_or_else(|| LookupError::Missing(key.to_string()))
    }

    fn get_bool(&self, key: &str) -> Result<bool, LookupError> {
        let raw = self.get_string(key)?;
        match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(LookupError::Invalid {
                key: key.to_string(),
                value: raw,
                reason: "expected a boolean".to_string(),
            }),
        }
    }

    fn get_u64(&self, key: &str) -> Result<u64, LookupError> {
        let raw = self.get_string(key)?;
        raw.trim().parse::<u64>().map_err(|e| LookupError::Invalid {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
    }
}
