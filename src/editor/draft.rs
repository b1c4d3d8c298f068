use thiserror::Error;

use super::field::TextField;
use crate::document::{Entry, EntryId, Step};

/// Rejections raised while editing or before submitting a [`Draft`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("title is required")]
    EmptyTitle,
    #[error("step {index} does not exist ({len} steps)")]
    StepOutOfRange { index: usize, len: usize },
    #[error("an entry keeps at least one step row")]
    LastStep,
}

/// One step row of the form: description and optional link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepRow {
    pub text: TextField,
    pub link: TextField,
}

impl StepRow {
    pub fn new(text: &str, link: &str) -> Self {
        Self {
            text: TextField::single_line(text),
            link: TextField::single_line(link),
        }
    }

    pub fn to_step(&self) -> Step {
        Step::new(self.text.text(), self.link.text())
    }

    fn is_blank(&self) -> bool {
        self.text.is_empty() && self.link.is_empty()
    }
}

/// The form's working copy of an entry.
///
/// Always holds at least one step row. `editing_id` is set while an existing
/// entry is being edited and decides whether a submit appends or replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: TextField,
    steps: Vec<StepRow>,
    pub info: TextField,
    editing_id: Option<EntryId>,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    pub fn new() -> Self {
        Self {
            title: TextField::single_line(""),
            steps: vec![StepRow::default()],
            info: TextField::multi_line(""),
            editing_id: None,
        }
    }

    /// Load an existing entry into the form for editing.
    ///
    /// Only the form changes; the document is untouched until submit.
    pub fn from_entry(entry: &Entry) -> Self {
        let mut steps: Vec<StepRow> = entry
            .steps
            .iter()
            .map(|step| StepRow::new(&step.text, &step.link))
            .collect();
        if steps.is_empty() {
            steps.push(StepRow::default());
        }
        Self {
            title: TextField::single_line(&entry.title),
            steps,
            info: TextField::multi_line(&entry.info),
            editing_id: Some(entry.created_at.clone()),
        }
    }

    /// Replace the form content with `entry`.
    pub fn begin_edit(&mut self, entry: &Entry) {
        *self = Self::from_entry(entry);
    }

    /// Discard all edits and leave edit mode.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub const fn editing_id(&self) -> Option<&EntryId> {
        self.editing_id.as_ref()
    }

    pub const fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn steps(&self) -> &[StepRow] {
        &self.steps
    }

    /// # Errors
    /// Returns [`DraftError::StepOutOfRange`] for a bad index.
    pub fn step_mut(&mut self, index: usize) -> Result<&mut StepRow, DraftError> {
        let len = self.steps.len();
        self.steps
            .get_mut(index)
            .ok_or(DraftError::StepOutOfRange { index, len })
    }

    /// Append a blank step row and return its index.
    pub fn add_step(&mut self) -> usize {
        self.steps.push(StepRow::default());
        self.steps.len() - 1
    }

    /// # Errors
    /// Returns [`DraftError::StepOutOfRange`] for a bad index and
    /// [`DraftError::LastStep`] when it would leave no rows.
    pub fn remove_step(&mut self, index: usize) -> Result<StepRow, DraftError> {
        if index >= self.steps.len() {
            return Err(DraftError::StepOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        if self.steps.len() == 1 {
            return Err(DraftError::LastStep);
        }
        Ok(self.steps.remove(index))
    }

    /// Overwrite both fields of a step row.
    ///
    /// # Errors
    /// Returns [`DraftError::StepOutOfRange`] for a bad index.
    pub fn set_step(&mut self, index: usize, text: &str, link: &str) -> Result<(), DraftError> {
        let row = self.step_mut(index)?;
        row.text.set(text);
        row.link.set(link);
        Ok(())
    }

    /// # Errors
    /// Returns [`DraftError::EmptyTitle`] when the title is blank.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.text().trim().is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        Ok(())
    }

    /// Whether anything has been typed or an entry is loaded.
    pub fn is_dirty(&self) -> bool {
        self.editing_id.is_some()
            || !self.title.is_empty()
            || !self.info.is_empty()
            || self.steps.iter().any(|row| !row.is_blank())
    }
}
