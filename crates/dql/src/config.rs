use serde::{Deserialize, Serialize};

/// Configuration for a [`QueryBuilder`](crate::QueryBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Whether `get_dql()` reuses the last rendering until the clauses change.
    /// When disabled every call re-renders.
    pub cache_enabled: bool,
    /// Truncate DQL in log events (in bytes). `None` means no truncation.
    pub max_logged_dql: Option<usize>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            max_logged_dql: Some(200),
        }
    }
}

impl BuilderConfig {
    /// Create a new configuration with defaults (cache enabled, logs truncated at 200 bytes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the render cache.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set maximum DQL length to log.
    pub fn with_max_logged_dql(mut self, len: usize) -> Self {
        self.max_logged_dql = Some(len);
        self
    }

    /// Disable DQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_dql = None;
        self
    }
}

/// Truncate to at most `max_bytes`, backing off to a char boundary.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_dql(dql: &str, max_bytes: Option<usize>) -> &str {
    let Some(max_bytes) = max_bytes else {
        return dql;
    };
    if dql.len() <= max_bytes {
        return dql;
    }
    let mut end = max_bytes;
    while end > 0 && !dql.is_char_boundary(end) {
        end -= 1;
    }
    &dql[..end]
}
