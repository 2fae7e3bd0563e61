//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Counters`: atomic started/finished counters per phase plus outcome tallies
//! - `FinishGuard`: drop guard that advances a phase's finished counter
//! - `WorkItem`: a URL queued to a worker pool, tagged with its role

mod counters;
mod work_item;

// Re-export main types
pub use counters::{CounterSnapshot, Counters, FinishGuard};
pub use work_item::{Role, WorkItem};
