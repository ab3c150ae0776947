//! Flat property map — the single configuration source every provider reads
//! its own `"<name>."` slice from.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;

/// Ordered map of dotted keys (`"openai.api_key"`) to string values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a value, falling back to `default`.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Look up a non-blank value.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Parse a value. `Ok(None)` when absent, `Err` with a readable message
    /// when present but unparseable.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, String> {
        match self.get_non_empty(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| format!("invalid value for '{key}': {raw:?}")),
        }
    }

    /// Read a boolean flag (`true`/`1`/`yes`/`on`, case-insensitive).
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_non_empty(key).map(|v| {
            matches!(
                v.to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            )
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    /// Entries whose key starts with `prefix`, with the prefix stripped.
    ///
    /// Keys equal to the bare prefix are dropped (they have no name left).
    pub fn filter_prefix(&self, prefix: &str) -> Properties {
        self.entries
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_string(), v.clone()))
            })
            .collect()
    }

    /// Overlay `other` on top of `self` (other wins).
    pub fn merge(&mut self, other: Properties) {
        self.entries.extend(other.entries);
    }

    /// Flatten a JSON document into dotted keys.
    ///
    /// `{"openai": {"api_key": "k"}, "server": {"port": 8080}}` becomes
    /// `openai.api_key = k`, `server.port = 8080`. `null` leaves are skipped,
    /// arrays are kept as compact JSON text.
    pub fn from_json(value: &Value) -> Properties {
        let mut props = Properties::new();
        flatten_json("", value, &mut props);
        props
    }

    /// Parse Java-style `.properties` text (`key=value` or `key: value`,
    /// `#`/`!` comment lines).
    pub fn parse(text: &str) -> Properties {
        let mut props = Properties::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let split_at = line.find(|c| c == '=' || c == ':');
            let (key, value) = match split_at {
                Some(pos) => (&line[..pos], &line[pos + 1..]),
                None => (line, ""),
            };
            let key = key.trim();
            if !key.is_empty() {
                props.insert(key, value.trim());
            }
        }
        props
    }
}

fn flatten_json(prefix: &str, value: &Value, out: &mut Properties) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_json(&join(key), child, out);
            }
        }
        Value::Null => {}
        Value::String(s) if !prefix.is_empty() => out.insert(prefix, s.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) if !prefix.is_empty() => {
            out.insert(prefix, value.to_string())
        }
        _ => {}
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Properties {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
