use chrono::{DateTime, Utc};
use tracing::debug;

use crate::app::model::{Busy, Focus};
use crate::app::{Model, ToastLevel};
use crate::editor::{Direction, DraftError, Submission};
use crate::store::{Loaded, StoreError};
use crate::worker::{Completion, Outcome};

/// All possible events and actions in the application.
///
/// These represent user input, request completions, and window events.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Focus
    /// Move focus to the next field (Tab)
    FocusNext,
    /// Move focus to the previous field (Shift+Tab)
    FocusPrev,
    /// Jump to the entry list
    FocusList,
    /// Jump back to the title field
    FocusForm,

    // Field editing
    InsertChar(char),
    Paste(String),
    DeleteBack,
    DeleteForward,
    MoveCursor(Direction),
    MoveHome,
    MoveEnd,
    /// Enter inside a field: line break in notes, next field elsewhere
    Newline,

    // Draft
    AddStep,
    /// Remove the focused step row
    RemoveStep,
    /// Submit the draft; the instant becomes the identity of a new entry
    Submit(DateTime<Utc>),
    /// Discard the draft and leave edit mode
    Cancel,

    // Entry list
    SelectPrev,
    SelectNext,
    SelectFirst,
    SelectLast,
    /// Load the selected entry into the form
    EditSelected,

    // Store
    Reload,
    LoadFinished { seq: u64, loaded: Loaded },
    SubmitFinished {
        seq: u64,
        result: Result<(), StoreError>,
    },

    // Window
    ToggleHelp,
    HideHelp,
    HelpScrollUp,
    HelpScrollDown,
    Resize(u16, u16),
    Redraw,

    // Application
    Quit,
}

impl Message {
    /// Messages that change the draft.
    const fn edits_draft(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::Paste(_)
                | Self::DeleteBack
                | Self::DeleteForward
                | Self::Newline
                | Self::AddStep
                | Self::RemoveStep
                | Self::Cancel
                | Self::EditSelected
        )
    }
}

impl From<Completion> for Message {
    fn from(completion: Completion) -> Self {
        match completion.outcome {
            Outcome::Loaded(loaded) => Self::LoadFinished {
                seq: completion.seq,
                loaded,
            },
            Outcome::Submitted(result) => Self::SubmitFinished {
                seq: completion.seq,
                result,
            },
        }
    }
}

/// Pure function that updates the model based on a message.
///
/// Network work is queued as commands on the model; nothing here blocks.
pub fn update(mut model: Model, msg: Message) -> Model {
    if !matches!(msg, Message::Quit) {
        model.quit_confirmed = false;
    }

    // The submitted draft stays frozen until its completion arrives.
    if model.is_submitting() && msg.edits_draft() {
        model.show_toast(ToastLevel::Info, "Saving… please wait");
        return model;
    }

    match msg {
        // Focus
        Message::FocusNext => cycle_focus(&mut model, true),
        Message::FocusPrev => cycle_focus(&mut model, false),
        Message::FocusList => {
            model.focus = Focus::List;
            model.clamp_selection();
        }
        Message::FocusForm => {
            model.focus = Focus::Title;
        }

        // Field editing
        Message::InsertChar(ch) => {
            if let Some(field) = model.focused_field_mut() {
                field.insert_char(ch);
            }
        }
        Message::Paste(text) => {
            if let Some(field) = model.focused_field_mut() {
                field.insert_str(&text);
            }
        }
        Message::DeleteBack => {
            if let Some(field) = model.focused_field_mut() {
                field.delete_back();
            }
        }
        Message::DeleteForward => {
            if let Some(field) = model.focused_field_mut() {
                field.delete_forward();
            }
        }
        Message::MoveCursor(direction) => {
            if let Some(field) = model.focused_field_mut() {
                field.move_cursor(direction);
            }
        }
        Message::MoveHome => {
            if let Some(field) = model.focused_field_mut() {
                field.home();
            }
        }
        Message::MoveEnd => {
            if let Some(field) = model.focused_field_mut() {
                field.end();
            }
        }
        Message::Newline => match model.focus {
            Focus::Info => model.draft.info.newline(),
            Focus::List => {}
            _ => return update(model, Message::FocusNext),
        },

        // Draft
        Message::AddStep => {
            let index = model.draft.add_step();
            model.focus = Focus::StepText(index);
        }
        Message::RemoveStep => {
            let (Focus::StepText(index) | Focus::StepLink(index)) = model.focus else {
                model.show_toast(ToastLevel::Info, "Move to a step to remove it");
                return model;
            };
            match model.draft.remove_step(index) {
                Ok(_) => {
                    model.focus = Focus::StepText(index);
                    model.clamp_focus();
                }
                Err(DraftError::LastStep) => {
                    model.show_toast(ToastLevel::Warning, "An entry keeps at least one step");
                }
                Err(err) => model.show_toast(ToastLevel::Warning, err.to_string()),
            }
        }
        Message::Submit(now) => {
            if model.busy != Busy::Idle {
                model.show_toast(ToastLevel::Info, "Busy, try again in a moment");
                return model;
            }
            match Submission::prepare(&model.draft, now) {
                Ok(submission) => {
                    let submission = submission.with_placement(model.placement);
                    model.request_submit(submission);
                }
                Err(err) => {
                    model.focus = Focus::Title;
                    model.show_toast(ToastLevel::Warning, capitalize(&err.to_string()));
                }
            }
        }
        Message::Cancel => {
            let was_editing = model.draft.is_editing();
            model.draft.clear();
            model.focus = Focus::Title;
            if was_editing {
                model.show_toast(ToastLevel::Info, "Edit cancelled");
            }
        }

        // Entry list
        Message::SelectPrev => {
            if let Some(selected) = model.selected {
                model.selected = Some(selected.saturating_sub(1));
            }
            model.clamp_selection();
        }
        Message::SelectNext => {
            let next = model.selected.map_or(0, |selected| selected + 1);
            model.selected = Some(next);
            model.clamp_selection();
        }
        Message::SelectFirst => {
            model.selected = Some(0);
            model.clamp_selection();
        }
        Message::SelectLast => {
            model.selected = Some(model.items.len().saturating_sub(1));
            model.clamp_selection();
        }
        Message::EditSelected => {
            if let Some(entry) = model.selected_entry().cloned() {
                model.draft.begin_edit(&entry);
                model.focus = Focus::Title;
                model.show_toast(ToastLevel::Info, format!("Editing {}", entry.title));
            }
        }

        // Store
        Message::Reload => {
            if model.is_submitting() {
                model.show_toast(ToastLevel::Info, "Busy, try again in a moment");
            } else {
                model.request_load();
            }
        }
        Message::LoadFinished { seq, loaded } => {
            if !model.is_latest_load(seq) {
                debug!(seq, "discarding stale load response");
                return model;
            }
            model.finish_load();
            model.items = loaded.document.items;
            model.clamp_selection();
            if let Some(err) = loaded.failure {
                let (level, text) = describe_load_failure(&err, &model.location);
                model.show_toast(level, text);
            }
        }
        Message::SubmitFinished { seq, result } => {
            let Some(title) = model.take_pending_submit(seq) else {
                debug!(seq, "ignoring completion for unknown submit");
                return model;
            };
            model.busy = Busy::Idle;
            match result {
                Ok(()) => {
                    model.draft.clear();
                    model.focus = Focus::Title;
                    model.show_toast(ToastLevel::Info, format!("Saved {title}"));
                    model.request_load();
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, describe_submit_failure(&err));
                }
            }
        }

        // Window
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            model.help_scroll_offset = 0;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::HelpScrollUp => {
            model.help_scroll_offset = model.help_scroll_offset.saturating_sub(1);
        }
        Message::HelpScrollDown => {
            model.help_scroll_offset += 1;
        }
        Message::Resize(width, height) => {
            model.width = width;
            model.height = height;
        }
        Message::Redraw => {}

        // Application
        Message::Quit => {
            if model.is_submitting() && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "A save is still in flight. Press quit again to exit without waiting for it",
                );
            } else if model.draft.is_dirty() && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved draft. Press quit again to discard it",
                );
            } else {
                model.should_quit = true;
            }
        }
    }

    model
}

fn cycle_focus(model: &mut Model, forward: bool) {
    let order = model.focus_order();
    let current = order.iter().position(|f| *f == model.focus).unwrap_or(0);
    let next = if forward {
        (current + 1) % order.len()
    } else {
        (current + order.len() - 1) % order.len()
    };
    model.focus = order[next];
    if model.focus == Focus::List {
        model.clamp_selection();
    }
}

fn describe_load_failure(err: &StoreError, location: &str) -> (ToastLevel, String) {
    match err {
        StoreError::NotFound => (
            ToastLevel::Warning,
            format!("No document yet at {location}"),
        ),
        other => (
            ToastLevel::Error,
            format!("Load failed ({}): {other}", other.class()),
        ),
    }
}

fn describe_submit_failure(err: &StoreError) -> String {
    match err {
        StoreError::Conflict(_) => format!(
            "Save failed (Conflict): the document changed meanwhile. Your draft is kept, submit again. {err}"
        ),
        StoreError::NotFound => {
            "Save failed (NotFound): the document does not exist. Your draft is kept".to_string()
        }
        other => format!("Save failed ({}): {other}. Your draft is kept", other.class()),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
