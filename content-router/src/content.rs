//! Content items and the providers that produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a third-party content source.
///
/// Used both as a configuration value and as the lookup key into the
/// provider registry.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provider(String);

impl Provider {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Provider {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Provider {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One piece of content fetched from a provider.
///
/// `source` always names the provider whose capability produced the item,
/// which differs from the slot's primary provider when a fallback served it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub source: String,
    pub summary: String,
    pub link: String,
    pub expiry: DateTime<Utc>,
}
