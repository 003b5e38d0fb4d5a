//! Engine configuration.

use serde::Deserialize;

use crate::model::rel;

/// Settings shared by every operation of a [`SyncEngine`](crate::SyncEngine).
///
/// # Example
/// ```
/// use linked_sync::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_mapped_title("title")
///     .with_batch_size(0);
/// assert!(!config.concurrent_items());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Attribute that receives a feed item's title.
    pub mapped_title: String,
    /// `> 0` hydrates collection items concurrently, `0` sequentially.
    pub batch_size: usize,
    /// Relations that identify a resource, in order of preference.
    pub canonical_rels: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mapped_title: "name".to_string(),
            batch_size: 1,
            canonical_rels: vec![rel::CANONICAL.to_string(), rel::SELF.to_string()],
        }
    }
}

impl EngineConfig {
    pub fn with_mapped_title(mut self, name: impl Into<String>) -> Self {
        self.mapped_title = name.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_canonical_rels(mut self, rels: Vec<String>) -> Self {
        self.canonical_rels = rels;
        self
    }

    pub fn concurrent_items(&self) -> bool {
        self.batch_size > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.mapped_title, "name");
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.canonical_rels, vec!["canonical", "self"]);
        assert!(config.concurrent_items());
    }

    #[test]
    fn deserializes_partial_config() {
        let config: EngineConfig = serde_json::from_str(r#"{ "batch_size": 0 }"#).unwrap();
        assert_eq!(config.batch_size, 0);
        assert_eq!(config.mapped_title, "name");
    }
}
