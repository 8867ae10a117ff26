//! compendium-fetch
//!
//! Resilient HTTP access to the remote catalog: a per-call retry state machine
//! (`retry`) and the reqwest client that drives it (`client`).

pub mod client;
pub mod retry;

pub use client::HttpCatalog;
pub use retry::{AttemptOutcome, RetryPolicy, RetryState};
