use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Tuning knobs for a [`Database`](crate::Database).
///
/// ```
/// use std::time::Duration;
/// use skiff_db::DatabaseConfig;
///
/// let config: DatabaseConfig = serde_json::from_str(r#"{ "lock_timeout_ms": 250 }"#).unwrap();
/// assert_eq!(config.lock_timeout, Some(Duration::from_millis(250)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// How long a statement waits for its table guard before giving up.
    /// `None` waits indefinitely.
    #[serde(rename = "lock_timeout_ms", deserialize_with = "millis")]
    pub lock_timeout: Option<Duration>,
}

impl DatabaseConfig {
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}
