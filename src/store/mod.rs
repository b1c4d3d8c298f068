//! Remote document persistence.
//!
//! The collection lives in one JSON file on a version-controlled file host.
//! [`ContentApi`] is the seam to that host: a read that returns the decoded
//! file text plus its [`VersionToken`], and a conditional write that the host
//! rejects when the token is stale. [`DocumentStore`] layers the
//! read-modify-write protocol on top.
//!
//! - [`GithubContents`]: GitHub repository contents API over `reqwest`
//! - [`MemoryContents`]: in-process host used by tests

mod error;
mod github;
mod memory;

pub use error::StoreError;
pub use github::GithubContents;
pub use memory::MemoryContents;

use std::fmt;

use tracing::{debug, info, warn};

use crate::document::Document;

/// Opaque revision marker of the stored file (the host's blob sha).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The stored file, already decoded from its transfer encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub text: String,
    pub version: VersionToken,
}

/// A conditional overwrite of the stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub text: String,
    /// Commit message recorded by the host.
    pub message: String,
    /// Precondition: the revision the write was computed from.
    /// `None` only when creating a file that does not exist yet.
    pub version: Option<VersionToken>,
}

/// Access to the single remote file.
pub trait ContentApi: Send + Sync {
    /// Short name used in logs.
    fn describe(&self) -> String;

    /// Fetch the current file text and revision.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when the file does not exist, or the
    /// transport/auth failure reported by the host.
    fn read(&self) -> Result<RemoteFile, StoreError>;

    /// Overwrite the file if its revision still matches `write.version`.
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] when the host rejects a stale revision.
    fn write(&self, write: &FileWrite) -> Result<(), StoreError>;
}

impl<T: ContentApi + ?Sized> ContentApi for std::sync::Arc<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn read(&self) -> Result<RemoteFile, StoreError> {
        (**self).read()
    }

    fn write(&self, write: &FileWrite) -> Result<(), StoreError> {
        (**self).write(write)
    }
}

/// Result of a non-fatal load: on failure the document is empty and the
/// reason is kept for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub document: Document,
    pub failure: Option<StoreError>,
}

/// Read-modify-write client for the remote document.
#[derive(Debug)]
pub struct DocumentStore<A> {
    api: A,
    create_missing: bool,
}

impl<A: ContentApi> DocumentStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            create_missing: false,
        }
    }

    /// Create the file on the first save instead of failing with `NotFound`.
    #[must_use]
    pub fn with_create_missing(mut self, enabled: bool) -> Self {
        self.create_missing = enabled;
        self
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Read and parse the document along with its revision.
    ///
    /// # Errors
    /// Returns the host error, or [`StoreError::Decode`] if the file is not a
    /// valid document.
    pub fn fetch(&self) -> Result<(Document, VersionToken), StoreError> {
        let file = self.api.read()?;
        let document = Document::from_json(&file.text)
            .map_err(|err| StoreError::Decode(format!("document is not valid JSON: {err}")))?;
        debug!(
            remote = %self.api.describe(),
            version = %file.version,
            items = document.len(),
            "fetched document"
        );
        Ok((document, file.version))
    }

    /// Load the document for display. Failures fall back to an empty
    /// document and are reported in [`Loaded::failure`].
    pub fn load(&self) -> Loaded {
        match self.fetch() {
            Ok((document, _)) => Loaded {
                document,
                failure: None,
            },
            Err(err) => {
                warn!(remote = %self.api.describe(), error = %err, "load failed, showing empty list");
                Loaded {
                    document: Document::empty(),
                    failure: Some(err),
                }
            }
        }
    }

    /// Re-read the document, apply `mutator`, and write the result back with
    /// the freshly read revision as precondition.
    ///
    /// The revision is always obtained by this call; a token from an earlier
    /// load is never reused. A concurrent writer between the read and the
    /// write surfaces as [`StoreError::Conflict`]. Nothing is retried.
    ///
    /// # Errors
    /// Returns the first failure of the read, encode, or write step.
    pub fn save<F>(&self, mutator: F, message: &str) -> Result<(), StoreError>
    where
        F: FnOnce(&Document) -> Document,
    {
        let (current, version) = match self.fetch() {
            Ok((document, version)) => (document, Some(version)),
            Err(StoreError::NotFound) if self.create_missing => {
                debug!(remote = %self.api.describe(), "document missing, creating it");
                (Document::empty(), None)
            }
            Err(err) => return Err(err),
        };

        let next = mutator(&current);
        let text = next
            .to_pretty_json()
            .map_err(|err| StoreError::Decode(format!("failed to encode document: {err}")))?;
        self.api.write(&FileWrite {
            text,
            message: message.to_string(),
            version,
        })?;
        info!(
            remote = %self.api.describe(),
            items = next.len(),
            commit = message,
            "committed document"
        );
        Ok(())
    }
}
