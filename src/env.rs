// src/env.rs

//! Per-run environment map handed to the script process.
//!
//! The map is built fresh for every run from a snapshot of the ambient
//! process environment plus the deployment-specific values from
//! `[script.env]`. It is passed by value into the spawn call; the process-wide
//! environment is never modified.
//!
//! Values may be secrets (API keys), so `Debug` only prints keys.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvironmentVariables {
    vars: BTreeMap<String, String>,
}

impl EnvironmentVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment.
    pub fn from_ambient() -> Self {
        std::env::vars().collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return a new map with `overrides` layered on top of `self`.
    pub fn merged_with<'a, I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut vars = self.vars.clone();
        for (k, v) in overrides {
            vars.insert(k.clone(), v.clone());
        }
        Self { vars }
    }

    /// Keys from `required` that are missing or blank.
    pub fn missing<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|key| self.get(key).is_none_or(|v| v.trim().is_empty()))
            .map(String::as_str)
            .collect()
    }
}

impl FromIterator<(String, String)> for EnvironmentVariables {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for EnvironmentVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.vars.keys().map(|k| (k, "<redacted>")))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambient() -> EnvironmentVariables {
        [
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("PINECONE_INDEX".to_string(), "old".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn overrides_win_and_base_is_untouched() {
        let base = ambient();
        let mut extra = BTreeMap::new();
        extra.insert("PINECONE_INDEX".to_string(), "docs".to_string());
        extra.insert("PINECONE_API_KEY".to_string(), "pc-secret".to_string());

        let merged = base.merged_with(&extra);

        assert_eq!(merged.get("PINECONE_INDEX"), Some("docs"));
        assert_eq!(merged.get("PINECONE_API_KEY"), Some("pc-secret"));
        assert_eq!(merged.get("PATH"), Some("/usr/bin"));
        assert_eq!(base.get("PINECONE_INDEX"), Some("old"));
        assert!(!base.contains_key("PINECONE_API_KEY"));
    }

    #[test]
    fn debug_output_never_contains_values() {
        let mut env = EnvironmentVariables::new();
        env.insert("OPENROUTER_API_KEY", "sk-or-very-secret");
        let rendered = format!("{env:?}");
        assert!(rendered.contains("OPENROUTER_API_KEY"));
        assert!(!rendered.contains("sk-or-very-secret"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut env = EnvironmentVariables::new();
        env.insert("A", "set");
        env.insert("B", "  ");
        let required = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(env.missing(&required), vec!["B", "C"]);
    }
}
