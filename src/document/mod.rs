//! The airdrop collection data model.
//!
//! The remote file holds a single [`Document`]: an ordered list of
//! [`Entry`] records, each with ordered [`Step`]s. Entries are keyed by
//! their creation timestamp ([`EntryId`]).

mod types;

pub use types::{Document, Entry, EntryId, Step};
