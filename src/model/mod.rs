//! Burndown data model
//!
//! A [`Sprint`] owns one [`SprintEffort`] bucket per calendar day. Buckets are
//! created by chart setup and mutated in place by every sync.

mod sprint;

pub use sprint::{Sprint, SprintEffort};
