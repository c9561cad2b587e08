// src/config/model.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use toml::{Table, Value};

use crate::config::lookup::ConfigLookup;

/// Configuration backed by a parsed TOML document.
///
/// Dotted keys walk nested tables, so both of these answer
/// `runner.max-memory`:
///
/// ```toml
/// [runner]
/// max-memory = "2g"
/// ```
///
/// ```toml
/// "runner.max-memory" = "2g"
/// ```
///
/// Scalars are rendered with `to_string`; arrays of scalars are joined with a
/// single space. Tables have no string form and read as unset.
#[derive(Debug, Clone, Default)]
pub struct TomlConfig {
    table: Table,
}

impl TomlConfig {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let table: Table = toml::from_str(contents)?;
        Ok(Self { table })
    }

    fn find(&self, key: &str) -> Option<&Value> {
        if let Some(v) = self.table.get(key) {
            return Some(v);
        }

        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.table.get(first)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(items) => {
            let rendered: Option<Vec<String>> = items.iter().map(render).collect();
            rendered.map(|parts| parts.join(" "))
        }
        Value::Table(_) => None,
    }
}

impl ConfigLookup for TomlConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.find(key).and_then(render)
    }
}

/// In-memory configuration, used for `--set key=value` overrides and tests.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: BTreeMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Parse `key=value` pairs as given on the command line.
    ///
    /// The value may be empty (`runner.max-memory=`); a pair without `=` is
    /// rejected.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cfg = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got '{pair}'"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("empty key in '{pair}'"));
            }
            cfg.insert(key, value);
        }
        Ok(cfg)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigLookup for MapConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Ordered stack of lookups; the first layer that knows a key wins.
#[derive(Debug, Clone, Default)]
pub struct LayeredConfig {
    layers: Vec<Arc<dyn ConfigLookup>>,
}

impl LayeredConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer with lower priority than every layer added before it.
    pub fn push(mut self, layer: impl ConfigLookup + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }
}

impl ConfigLookup for LayeredConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}
