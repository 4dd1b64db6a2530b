//! Episode record extracted from a feed item.

use std::collections::BTreeMap;

/// Flat view of one feed item: logical field name to text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeRecord {
    fields: BTreeMap<String, String>,
}

impl EpisodeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Human-readable label for log lines: title, then guid.
    pub fn label(&self) -> &str {
        self.get("title")
            .filter(|t| !t.is_empty())
            .or_else(|| self.get("guid"))
            .unwrap_or("<untitled>")
    }
}

impl<K, V> FromIterator<(K, V)> for EpisodeRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
