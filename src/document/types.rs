use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identity of an [`Entry`].
///
/// The stored value is the entry's creation timestamp, but it is only ever
/// compared as an opaque key.
///
/// Entries written without a `createdAt` carry an empty identity, which is
/// left out again when the entry is stored.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Wrap an existing identity string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Identity for an entry created at `at` (millisecond precision, UTC, `Z` suffix).
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Generate an identity for `at` that does not collide with `taken`.
    ///
    /// Two entries created within the same millisecond would otherwise share a
    /// key, so the timestamp is advanced one millisecond at a time until free.
    pub fn unique_at<'a>(at: DateTime<Utc>, taken: impl IntoIterator<Item = &'a Self> + Clone) -> Self {
        let mut candidate_at = at;
        loop {
            let candidate = Self::from_timestamp(candidate_at);
            if !taken.clone().into_iter().any(|id| *id == candidate) {
                return candidate;
            }
            candidate_at += Duration::milliseconds(1);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One ordered instruction of an [`Entry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Optional URL. Not validated; empty when absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
}

impl Step {
    pub fn new(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: link.into(),
        }
    }

    /// Steps with a blank description are dropped before persisting.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A single airdrop record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: String,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "EntryId::is_empty"
    )]
    pub created_at: EntryId,
}

/// The whole persisted collection.
///
/// Keys other than `items` are kept in `extra` so a read-modify-write never
/// drops data written by someone else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Entry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    /// An empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a stored document. A missing `items` key yields an empty list.
    ///
    /// # Errors
    /// Returns an error if the text is not a JSON object of the expected shape.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serialize with two-space indentation, the layout the file is stored in.
    ///
    /// # Errors
    /// Returns an error if a value in `extra` cannot be serialized.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find an entry by identity.
    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.items.iter().find(|entry| entry.created_at == *id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntryId> + Clone {
        self.items.iter().map(|entry| &entry.created_at)
    }
}
