// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. store::StoreError)
    clippy::module_name_repetitions
)]

//! # Dropboard
//!
//! A terminal form for keeping a list of airdrops in a JSON file that lives
//! in a GitHub repository.
//!
//! The repository contents API is the only persistence layer. Every submit
//! re-reads the file, applies the change to the latest version, and writes it
//! back with the blob sha as an optimistic-concurrency precondition.
//!
//! ## Architecture
//!
//! Dropboard uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`config`]: Flags, rc files, environment, and store settings
//! - [`document`]: The persisted data model
//! - [`editor`]: Form state and the append-or-replace protocol
//! - [`store`]: Remote file access and read-modify-write
//! - [`ui`]: Terminal UI components
//! - [`worker`]: Background request execution

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod store;
pub mod ui;
pub mod worker;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{Document, Entry, EntryId, Step};
    pub use crate::editor::{Draft, Placement, Submission};
    pub use crate::store::{ContentApi, DocumentStore, StoreError};
}
