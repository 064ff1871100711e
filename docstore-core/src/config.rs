//! Connection and naming defaults for a document store.

use std::time::Duration;

/// The URI used when none is configured.
pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

/// The per-operation timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable store configuration, built once with [`StoreConfig::builder`].
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use docstore::config::StoreConfig;
///
/// let config = StoreConfig::builder()
///     .uri("mongodb://localhost:27017")
///     .timeout(Duration::from_secs(5))
///     .database("testdb")
///     .collection("testcol")
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    uri: String,
    timeout: Duration,
    database: String,
    collection: String,
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// The configured URI, or [`DEFAULT_URI`] when empty.
    pub fn uri(&self) -> &str {
        if self.uri.is_empty() { DEFAULT_URI } else { &self.uri }
    }

    /// The configured timeout, or [`DEFAULT_TIMEOUT`] when zero.
    pub fn timeout(&self) -> Duration {
        if self.timeout.is_zero() { DEFAULT_TIMEOUT } else { self.timeout }
    }

    /// The default database, if one is configured.
    pub fn database(&self) -> Option<&str> {
        non_empty(&self.database)
    }

    /// The default collection, if one is configured.
    pub fn collection(&self) -> Option<&str> {
        non_empty(&self.collection)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`StoreConfig`].
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    uri: String,
    timeout: Duration,
    database: String,
    collection: String,
}

impl StoreConfigBuilder {
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in whole seconds.
    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn build(self) -> StoreConfig {
        StoreConfig {
            uri: self.uri,
            timeout: self.timeout,
            database: self.database,
            collection: self.collection,
        }
    }
}

pub(crate) fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_option() {
        let config = StoreConfig::builder()
            .uri("mongodb://db.internal:27017")
            .timeout(Duration::from_secs(5))
            .database("testdb")
            .collection("testcol")
            .build();

        assert_eq!(config.uri(), "mongodb://db.internal:27017");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.database(), Some("testdb"));
        assert_eq!(config.collection(), Some("testcol"));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = StoreConfig::default();

        assert_eq!(config.uri(), DEFAULT_URI);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.database(), None);
        assert_eq!(config.collection(), None);
    }
}
