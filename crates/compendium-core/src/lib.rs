//! compendium-core
//!
//! Domain types, error taxonomy, the `CatalogSource` seam, configuration and
//! the static category/filter tables shared by every other crate.

pub mod config;
pub mod detail;
pub mod error;
pub mod taxonomy;
#[cfg(feature = "test-utils")]
pub mod testing;
pub mod traits;
pub mod types;

pub use detail::DetailRecord;
pub use error::{Error, Result};
pub use traits::CatalogSource;
pub use types::{Category, CategoryKind, FilterSelection, SearchHit};
