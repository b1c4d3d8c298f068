use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ContentApi, FileWrite, RemoteFile, StoreError, VersionToken};
use crate::document::Document;

/// An in-process stand-in for the file host.
///
/// Every accepted write produces a new revision, writes are rejected when
/// their precondition revision is stale, and hooks allow simulating another
/// writer or a failing transport.
#[derive(Debug, Default)]
pub struct MemoryContents {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    file: Option<(String, VersionToken)>,
    revision: u64,
    reads: usize,
    writes: Vec<FileWrite>,
    after_read: Option<String>,
    fail_read: Option<StoreError>,
    fail_write: Option<StoreError>,
}

impl State {
    fn commit(&mut self, text: String) -> VersionToken {
        self.revision += 1;
        let version = VersionToken::new(format!("rev-{}", self.revision));
        self.file = Some((text, version.clone()));
        version
    }
}

impl MemoryContents {
    /// A host where the file does not exist yet.
    pub fn missing() -> Self {
        Self::default()
    }

    /// A host holding `text` verbatim.
    pub fn with_text(text: &str) -> Self {
        let contents = Self::default();
        contents.lock().commit(text.to_string());
        contents
    }

    /// A host holding `document` in its stored layout.
    pub fn with_document(document: &Document) -> Self {
        Self::with_text(&document.to_pretty_json().unwrap_or_default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current revision, if the file exists.
    pub fn version(&self) -> Option<VersionToken> {
        self.lock().file.as_ref().map(|(_, version)| version.clone())
    }

    /// Current raw text, if the file exists.
    pub fn text(&self) -> Option<String> {
        self.lock().file.as_ref().map(|(text, _)| text.clone())
    }

    /// Current stored document, if the file exists and parses.
    pub fn document(&self) -> Option<Document> {
        self.text().and_then(|text| Document::from_json(&text).ok())
    }

    /// Number of reads served so far.
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    /// Every write accepted so far, in order.
    pub fn writes(&self) -> Vec<FileWrite> {
        self.lock().writes.clone()
    }

    /// Another client overwrites the file right now.
    pub fn replace_externally(&self, document: &Document) {
        let text = document.to_pretty_json().unwrap_or_default();
        self.lock().commit(text);
    }

    /// Another client overwrites the file right after the next read is
    /// served, invalidating the revision that read returned.
    pub fn interleave_external_write(&self, document: &Document) {
        self.lock().after_read = Some(document.to_pretty_json().unwrap_or_default());
    }

    pub fn fail_next_read(&self, err: StoreError) {
        self.lock().fail_read = Some(err);
    }

    pub fn fail_next_write(&self, err: StoreError) {
        self.lock().fail_write = Some(err);
    }
}

impl ContentApi for MemoryContents {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn read(&self) -> Result<RemoteFile, StoreError> {
        let mut state = self.lock();
        state.reads += 1;
        if let Some(err) = state.fail_read.take() {
            return Err(err);
        }
        let (text, version) = state.file.clone().ok_or(StoreError::NotFound)?;
        if let Some(external) = state.after_read.take() {
            state.commit(external);
        }
        Ok(RemoteFile { text, version })
    }

    fn write(&self, write: &FileWrite) -> Result<(), StoreError> {
        let mut state = self.lock();
        if let Some(err) = state.fail_write.take() {
            return Err(err);
        }
        let current = state.file.as_ref().map(|(_, version)| version.clone());
        match (&current, &write.version) {
            (None, None) => {}
            (None, Some(_)) => {
                return Err(StoreError::Conflict("file no longer exists".to_string()));
            }
            (Some(_), None) => {
                return Err(StoreError::Conflict("\"sha\" wasn't supplied.".to_string()));
            }
            (Some(current), Some(expected)) if current != expected => {
                return Err(StoreError::Conflict(format!(
                    "document is at {current} but expected {expected}"
                )));
            }
            (Some(_), Some(_)) => {}
        }
        state.writes.push(write.clone());
        state.commit(write.text.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_bumps_revision() {
        let contents = MemoryContents::with_text("{}");
        let before = contents.version().unwrap();
        contents
            .write(&FileWrite {
                text: "{\"items\":[]}".to_string(),
                message: "m".to_string(),
                version: Some(before.clone()),
            })
            .unwrap();
        assert_ne!(contents.version().unwrap(), before);
        assert_eq!(contents.text().unwrap(), "{\"items\":[]}");
    }

    #[test]
    fn test_stale_write_is_rejected() {
        let contents = MemoryContents::with_text("{}");
        let err = contents
            .write(&FileWrite {
                text: "{}".to_string(),
                message: "m".to_string(),
                version: Some(VersionToken::new("rev-0")),
            })
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(contents.writes().is_empty());
    }

    #[test]
    fn test_interleaved_write_invalidates_served_revision() {
        let contents = MemoryContents::with_text("{}");
        contents.interleave_external_write(&Document::empty());
        let served = contents.read().unwrap();
        assert_ne!(contents.version().unwrap(), served.version);
    }

    #[test]
    fn test_failures_apply_once() {
        let contents = MemoryContents::with_text("{}");
        contents.fail_next_read(StoreError::Network("offline".to_string()));
        assert!(contents.read().is_err());
        assert!(contents.read().is_ok());
        assert_eq!(contents.reads(), 2);
    }
}
