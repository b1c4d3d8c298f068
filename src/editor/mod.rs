//! The airdrop editor: form state and the update protocol.
//!
//! [`Draft`] is the form's working copy, made of rope-backed [`TextField`]s.
//! [`Submission`] turns a validated draft into an append-or-replace mutation
//! applied to the freshly read document at write time.

mod draft;
mod field;
mod protocol;

pub use draft::{Draft, DraftError, StepRow};
pub use field::{Direction, FieldKind, TextField};
pub use protocol::{Identity, Placement, Submission};
