//! # Label Models
//!
//! A [`LabelSet`] is the tag map currently attached to a resource.
//! [`RequiredLabels`] is the organisation's mandated key list, read from configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value tags attached to a single resource. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for LabelSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The label keys every resource must carry.
///
/// Keeps the configured order so reports list missing keys the way they were
/// declared. Duplicates and blank keys are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredLabels(Vec<String>);

impl RequiredLabels {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for key in keys {
            let key: String = key.into().trim().to_string();
            if !key.is_empty() && !out.contains(&key) {
                out.push(key);
            }
        }
        Self(out)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Required keys absent from `labels`, in configured order.
    pub fn missing_from(&self, labels: &LabelSet) -> Vec<String> {
        self.0
            .iter()
            .filter(|key| !labels.contains_key(key))
            .cloned()
            .collect()
    }
}

impl std::str::FromStr for RequiredLabels {
    type Err = std::convert::Infallible;

    /// Parses a comma separated list such as `"AppName, AppCode"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.split(',')))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_required_labels_dedup_and_trim() {
        let required = RequiredLabels::new(["AppName", " AppCode ", "AppName", ""]);
        assert_eq!(required.iter().collect::<Vec<_>>(), vec!["AppName", "AppCode"]);
    }

    #[test]
    fn test_required_labels_from_str() {
        let required = RequiredLabels::from_str("AppName,AppCode, Owner").unwrap();
        assert_eq!(required.len(), 3);

        let empty = RequiredLabels::from_str("").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_missing_from_keeps_declared_order() {
        let required = RequiredLabels::new(["AppName", "AppCode", "Owner"]);
        let labels: LabelSet = [("AppCode", "x")].into_iter().collect();
        assert_eq!(required.missing_from(&labels), vec!["AppName", "Owner"]);
    }

    #[test]
    fn test_missing_from_ignores_values() {
        let required = RequiredLabels::new(["AppName"]);
        let labels: LabelSet = [("AppName", "")].into_iter().collect();
        assert!(required.missing_from(&labels).is_empty());
    }

    #[test]
    fn test_label_set_keys_are_unique() {
        let mut labels = LabelSet::new();
        labels.insert("Env", "dev");
        labels.insert("Env", "prod");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("Env"), Some("prod"));
    }
}
