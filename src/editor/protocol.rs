use chrono::{DateTime, Utc};

use super::draft::{Draft, DraftError};
use crate::document::{Document, Entry, EntryId, Step};

const MESSAGE_TITLE_CHARS: usize = 20;

/// Where an edited entry lands in the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// Remove the old entry and append the replacement at the end.
    #[default]
    MoveToEnd,
    /// Put the replacement where the old entry was.
    InPlace,
}

/// How the submitted entry is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Replace the entry with this key.
    Existing(EntryId),
    /// A new entry created at this instant.
    Fresh(DateTime<Utc>),
}

/// A validated, self-contained change ready to be applied to the latest
/// document.
///
/// Built on the UI thread from the [`Draft`], then applied to whatever the
/// store re-reads right before writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    title: String,
    steps: Vec<Step>,
    info: String,
    identity: Identity,
    placement: Placement,
}

impl Submission {
    /// Validate `draft` and capture its content.
    ///
    /// Step rows with empty text are dropped, even if they carry a link.
    ///
    /// # Errors
    /// Returns [`DraftError::EmptyTitle`] when the title is blank.
    pub fn prepare(draft: &Draft, now: DateTime<Utc>) -> Result<Self, DraftError> {
        draft.validate()?;
        let steps = draft
            .steps()
            .iter()
            .map(super::StepRow::to_step)
            .filter(Step::has_text)
            .collect();
        let identity = draft
            .editing_id()
            .map_or(Identity::Fresh(now), |id| Identity::Existing(id.clone()));
        Ok(Self {
            title: draft.title.text(),
            steps,
            info: draft.info.text(),
            identity,
            placement: Placement::default(),
        })
    }

    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    pub const fn is_edit(&self) -> bool {
        matches!(self.identity, Identity::Existing(_))
    }

    /// Commit message recorded with the write.
    pub fn commit_message(&self) -> String {
        let short: String = self.title.chars().take(MESSAGE_TITLE_CHARS).collect();
        if self.is_edit() {
            format!("Update item: {short}...")
        } else {
            format!("Add new item: {short}...")
        }
    }

    /// Compute the next document from `current`.
    ///
    /// New entries are appended with a key that does not collide with any
    /// existing one. Edits remove every entry carrying the edited key and
    /// insert the replacement according to the placement; if nothing
    /// matched, the replacement is appended. Other top-level keys are kept.
    pub fn apply(&self, current: &Document) -> Document {
        let mut next = current.clone();
        match &self.identity {
            Identity::Fresh(at) => {
                let id = EntryId::unique_at(*at, current.ids());
                next.items.push(self.entry(id));
            }
            Identity::Existing(id) => {
                let first_match = next.items.iter().position(|e| &e.created_at == id);
                if id.is_empty() {
                    // Entries stored without a key only ever match one at a time.
                    if let Some(index) = first_match {
                        next.items.remove(index);
                    }
                } else {
                    next.items.retain(|e| &e.created_at != id);
                }
                let entry = self.entry(id.clone());
                match (self.placement, first_match) {
                    (Placement::InPlace, Some(index)) => next.items.insert(index, entry),
                    _ => next.items.push(entry),
                }
            }
        }
        next
    }

    fn entry(&self, created_at: EntryId) -> Entry {
        Entry {
            title: self.title.clone(),
            steps: self.steps.clone(),
            info: self.info.clone(),
            created_at,
        }
    }
}
