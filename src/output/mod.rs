//! Output module for run reporting
//!
//! Console progress lives with the crawler; this module covers what is left
//! once the run is over.

pub mod stats;

pub use stats::{print_summary, MirrorSummary};
