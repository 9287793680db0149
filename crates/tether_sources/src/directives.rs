//! Toolchain directives.

use serde::Serialize;
use std::collections::BTreeMap;

/// Key/value toolchain settings, forwarded verbatim to the build backend.
///
/// Setting a key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildDirectives {
    entries: BTreeMap<String, String>,
}

impl BuildDirectives {
    /// Creates an empty directive set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one directive, replacing any earlier value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(old) = self.entries.insert(key.clone(), value.clone()) {
            if old != value {
                tracing::debug!(%key, %old, new = %value, "directive overridden");
            }
        }
    }

    /// Applies directives in order; later entries win.
    pub fn apply_directives<I, K, V>(&mut self, directives: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in directives {
            self.set(key, value);
        }
    }

    /// Returns the value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Iterates over the directives in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of directives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no directives are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildDirectives {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut directives = Self::new();
        directives.apply_directives(iter);
        directives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut d = BuildDirectives::new();
        d.apply_directives([
            ("VHDL_INPUT_VERSION", "VHDL_2008"),
            ("VHDL_SHOW_LMF_MAPPING_MESSAGES", "OFF"),
            ("VHDL_INPUT_VERSION", "VHDL_1993"),
        ]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("VHDL_INPUT_VERSION"), Some("VHDL_1993"));
    }

    #[test]
    fn iterates_in_key_order() {
        let d: BuildDirectives = [("B", "2"), ("A", "1")].into_iter().collect();
        let keys: Vec<_> = d.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert!(!d.is_empty());
    }
}
