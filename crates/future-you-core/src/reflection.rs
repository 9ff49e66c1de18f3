use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One saved response to a daily prompt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionEntry {
    pub id: String,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    pub response: String,
}

impl ReflectionEntry {
    /// Build an entry stamped with the current time.
    ///
    /// The id is the millisecond timestamp plus a short random suffix, so two
    /// saves inside the same millisecond still get distinct ids.
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        let now = Utc::now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{}-{}", now.timestamp_millis(), &suffix[..8]),
            timestamp: now,
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}
