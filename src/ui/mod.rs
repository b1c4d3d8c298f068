//! Terminal UI components.
//!
//! - [`render`]: the two-column screen (entry form and entry list)
//! - [`style`]: shared colors and emphasis

pub mod style;

mod overlays;
mod render;
mod status;

pub use render::{render, split_main_columns};

pub const FORM_WIDTH_PERCENT: u16 = 45;
pub const LIST_WIDTH_PERCENT: u16 = 55;
