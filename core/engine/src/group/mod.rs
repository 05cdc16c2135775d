//! Group/Aggregate subsystem.
//!
//! This module provides two layers:
//! - `definition`: what a grouping IS (key field, carried columns, labels)
//! - `engine`: HOW rows collapse into one aggregate row per key

pub mod definition;
pub mod engine;

pub use definition::*;
pub use engine::{drill_down, group_key, group_rows, GroupRow};
