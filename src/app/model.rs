use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::document::Entry;
use crate::editor::{Draft, Placement, Submission, TextField};

const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// What the app is waiting on. At most one request kind is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Busy {
    #[default]
    Idle,
    Loading,
    Submitting,
}

impl Busy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading…",
            Self::Submitting => "saving…",
        }
    }
}

/// Which part of the screen receives keystrokes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Title,
    StepText(usize),
    StepLink(usize),
    Info,
    List,
}

/// Work `update` asks the effects layer to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load { seq: u64 },
    Submit { seq: u64, submission: Submission },
}

/// The complete application state.
///
/// All state lives here; requests leave through [`Command`]s and come back
/// as completion messages.
#[derive(Debug)]
pub struct Model {
    /// Entries from the last successful load, in stored order
    pub items: Vec<Entry>,
    pub draft: Draft,
    pub focus: Focus,
    /// Selected row of the entry list
    pub selected: Option<usize>,
    pub busy: Busy,
    /// `owner/repo:path@branch`, shown in the status bar
    pub location: String,
    pub placement: Placement,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    pub help_visible: bool,
    pub help_scroll_offset: usize,
    pub width: u16,
    pub height: u16,
    pub should_quit: bool,
    /// Set after the first quit attempt with an unsaved draft
    pub quit_confirmed: bool,
    toast: Option<Toast>,
    next_seq: u64,
    latest_load: Option<u64>,
    pending_submit: Option<(u64, String)>,
    commands: Vec<Command>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(String::new(), (80, 24))
    }
}

impl Model {
    pub fn new(location: impl Into<String>, terminal_size: (u16, u16)) -> Self {
        Self {
            items: Vec::new(),
            draft: Draft::new(),
            focus: Focus::Title,
            selected: None,
            busy: Busy::Idle,
            location: location.into(),
            placement: Placement::default(),
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            help_scroll_offset: 0,
            width: terminal_size.0,
            height: terminal_size.1,
            should_quit: false,
            quit_confirmed: false,
            toast: None,
            next_seq: 0,
            latest_load: None,
            pending_submit: None,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Commands queued by `update` since the last call.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Issue a load tagged with a fresh sequence number. Any load still in
    /// flight becomes stale.
    pub(super) fn request_load(&mut self) {
        let seq = self.next_seq();
        self.latest_load = Some(seq);
        self.busy = Busy::Loading;
        self.commands.push(Command::Load { seq });
    }

    pub(super) fn request_submit(&mut self, submission: Submission) {
        let seq = self.next_seq();
        self.pending_submit = Some((seq, submission.title().to_string()));
        self.busy = Busy::Submitting;
        self.commands.push(Command::Submit { seq, submission });
    }

    /// Whether `seq` is the most recently issued load.
    pub(super) fn is_latest_load(&self, seq: u64) -> bool {
        self.latest_load == Some(seq)
    }

    pub(super) fn finish_load(&mut self) {
        self.latest_load = None;
        if self.busy == Busy::Loading {
            self.busy = Busy::Idle;
        }
    }

    /// Title of the submit in flight, if `seq` is it.
    pub(super) fn take_pending_submit(&mut self, seq: u64) -> Option<String> {
        match &self.pending_submit {
            Some((pending, _)) if *pending == seq => {
                self.pending_submit.take().map(|(_, title)| title)
            }
            _ => None,
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// The text field that currently has focus, if any.
    pub fn focused_field(&self) -> Option<&TextField> {
        match self.focus {
            Focus::Title => Some(&self.draft.title),
            Focus::Info => Some(&self.draft.info),
            Focus::StepText(i) => self.draft.steps().get(i).map(|row| &row.text),
            Focus::StepLink(i) => self.draft.steps().get(i).map(|row| &row.link),
            Focus::List => None,
        }
    }

    pub(super) fn focused_field_mut(&mut self) -> Option<&mut TextField> {
        match self.focus {
            Focus::Title => Some(&mut self.draft.title),
            Focus::Info => Some(&mut self.draft.info),
            Focus::StepText(i) => self.draft.step_mut(i).ok().map(|row| &mut row.text),
            Focus::StepLink(i) => self.draft.step_mut(i).ok().map(|row| &mut row.link),
            Focus::List => None,
        }
    }

    /// Focus order: title, each step's text then link, notes, list.
    pub(super) fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Title];
        for i in 0..self.draft.steps().len() {
            order.push(Focus::StepText(i));
            order.push(Focus::StepLink(i));
        }
        order.push(Focus::Info);
        order.push(Focus::List);
        order
    }

    /// Keep the focus on something that exists after the draft changed shape.
    pub(super) fn clamp_focus(&mut self) {
        let last = self.draft.steps().len().saturating_sub(1);
        self.focus = match self.focus {
            Focus::StepText(i) if i > last => Focus::StepText(last),
            Focus::StepLink(i) if i > last => Focus::StepLink(last),
            other => other,
        };
    }

    pub(super) fn clamp_selection(&mut self) {
        self.selected = match (self.selected, self.items.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some(i.min(len - 1)),
        };
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// Title of the entry being edited, as last loaded.
    pub fn editing_title(&self) -> Option<&str> {
        let id = self.draft.editing_id()?;
        Some(
            self.items
                .iter()
                .find(|entry| &entry.created_at == id)
                .map_or(id.as_str(), |entry| entry.title.as_str()),
        )
    }

    pub const fn is_submitting(&self) -> bool {
        matches!(self.busy, Busy::Submitting)
    }
}
