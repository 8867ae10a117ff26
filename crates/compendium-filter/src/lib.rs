//! compendium-filter
//!
//! Attribute filtering over a base result set. Each item's detail record is
//! fetched in fixed-size batches and tested against a [`FilterSelection`]
//! (see `predicate`). Runs are explicit handles so a newer run can cancel
//! an older one (see `run`).
//!
//! [`FilterSelection`]: compendium_core::types::FilterSelection
pub mod engine;
pub mod predicate;
pub mod run;

pub use engine::{FilterEngine, FilterError, FilterOutcome, FilterReport};
pub use predicate::matches_selection;
pub use run::{FilterRun, RunTracker};
