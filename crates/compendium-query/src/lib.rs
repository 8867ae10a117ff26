//! compendium-query
//!
//! Category listing and free-text narrowing. See `dispatcher`.
pub mod dispatcher;

pub use dispatcher::{filter_by_name, QueryDispatcher};
