//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Store requests leave `update` as [`Command`]s, run on the
//! [`StoreWorker`], and come back as completion messages.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Busy, Command, Focus, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::editor::Placement;
use crate::worker::StoreWorker;

/// Main application struct that owns the worker and runs the event loop.
pub struct App {
    worker: StoreWorker,
    location: String,
    placement: Placement,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create an application for the document served by `worker`.
    pub fn new(worker: StoreWorker, location: impl Into<String>) -> Self {
        Self {
            worker,
            location: location.into(),
            placement: Placement::default(),
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Choose where edited entries land.
    #[must_use]
    pub const fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Build the initial model and issue the first load.
    pub fn start(&self, terminal_size: (u16, u16)) -> Model {
        let mut model = Model::new(self.location.clone(), terminal_size).with_placement(self.placement);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        self.dispatch(model, Message::Reload)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("location", &self.location)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
