//! compendium-detail
//!
//! Fetches a single catalog record and lays it out per category: spells and
//! monsters get dedicated stat blocks, everything else a generic field list.
pub mod presenter;
pub mod view;

pub use presenter::DetailPresenter;
pub use view::{render, DetailView, Section, SectionBody};
