//! Dispatcher configuration

use serde::{Deserialize, Serialize};

/// Tunables for a [`Dispatcher`](crate::Dispatcher).
///
/// Deserializable so hosts can keep it in their own config files. Missing
/// fields fall back to [`Default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum number of command hops a single `dispatch` call follows.
    ///
    /// The action passed to `dispatch` is at depth 0, actions produced by its
    /// commands at depth 1, and so on. An action deeper than the limit is
    /// still shown to the watcher, then the chain stops with
    /// [`DispatchError::ChainTooDeep`](crate::DispatchError::ChainTooDeep).
    /// `None` follows chains for as long as they keep producing actions.
    pub max_chain_depth: Option<usize>,
}

impl DispatchConfig {
    /// Config with no chain limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many command hops one dispatch follows.
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = Some(depth);
        self
    }

    /// Whether an action at `depth` is past the configured limit.
    pub(crate) fn exceeds(&self, depth: usize) -> Option<usize> {
        self.max_chain_depth.filter(|limit| depth > *limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let config = DispatchConfig::default();
        assert_eq!(config.max_chain_depth, None);
        assert_eq!(config.exceeds(10_000), None);
    }

    #[test]
    fn test_exceeds_only_past_limit() {
        let config = DispatchConfig::new().with_max_chain_depth(2);
        assert_eq!(config.exceeds(0), None);
        assert_eq!(config.exceeds(2), None);
        assert_eq!(config.exceeds(3), Some(2));
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let config: DispatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DispatchConfig::default());

        let config: DispatchConfig = serde_json::from_str(r#"{"max_chain_depth": 8}"#).unwrap();
        assert_eq!(config.max_chain_depth, Some(8));
    }
}
