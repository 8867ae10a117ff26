use compendium_core::detail::DetailRecord;
use compendium_core::error::Result;
use compendium_core::traits::CatalogSource;
use compendium_core::types::{Category, SearchHit};

use crate::view::{render, DetailView};

/// Fetches one full record and turns it into a [`DetailView`].
pub struct DetailPresenter<C> {
    catalog: C,
    base_url: String,
}

impl<C: CatalogSource> DetailPresenter<C> {
    pub fn new(catalog: C, base_url: impl Into<String>) -> Self {
        Self { catalog, base_url: base_url.into() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single fetch of the hit's reference path, decoded for `category`.
    pub async fn get_details(&self, category: &Category, hit: &SearchHit) -> Result<DetailRecord> {
        let body = self.catalog.fetch_json(&hit.detail_path(category)).await?;
        DetailRecord::decode(category, body)
    }

    /// Like [`get_details`](Self::get_details) but rendered; failures are logged and yield `None`.
    pub async fn show(&self, category: &Category, hit: &SearchHit) -> Option<DetailView> {
        match self.get_details(category, hit).await {
            Ok(record) => Some(render(&record, category, &self.base_url)),
            Err(e) => {
                tracing::error!("Error fetching details for {}: {}", hit.id, e);
                None
            }
        }
    }
}
