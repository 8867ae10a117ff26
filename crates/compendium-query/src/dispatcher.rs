use compendium_core::error::{Error, Result};
use compendium_core::traits::CatalogSource;
use compendium_core::types::{Category, Listing, SearchHit};

/// Turns free text + a category into a base result set.
pub struct QueryDispatcher<C> {
    catalog: C,
}

impl<C: CatalogSource> QueryDispatcher<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Full listing for a category, failures propagated.
    pub async fn list(&self, category: &Category) -> Result<Vec<SearchHit>> {
        let path = category.listing_path();
        let body = self.catalog.fetch_json(&path).await?;
        let listing: Listing = serde_json::from_value(body).map_err(|e| Error::Decode {
            what: format!("{} listing", category),
            reason: e.to_string(),
        })?;
        Ok(listing.results)
    }

    /// Listing narrowed to names containing `query`, case-insensitively.
    pub async fn try_search(&self, query: &str, category: &Category) -> Result<Vec<SearchHit>> {
        let hits = self.list(category).await?;
        let total = hits.len();
        let kept = filter_by_name(hits, query);
        tracing::info!("Search '{}' in {}: {}/{} hits", query.trim(), category, kept.len(), total);
        Ok(kept)
    }

    /// Like [`try_search`](Self::try_search), but a failed fetch yields an
    /// empty set; it is logged, never surfaced.
    pub async fn search(&self, query: &str, category: &Category) -> Vec<SearchHit> {
        self.try_search(query, category).await.unwrap_or_else(|e| {
            tracing::error!("Error fetching {} listing: {}", category, e);
            Vec::new()
        })
    }
}

/// Substring match on display names, ignoring case. Blank queries keep everything.
pub fn filter_by_name(hits: Vec<SearchHit>, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return hits;
    }
    hits.into_iter()
        .filter(|h| h.display_name.to_lowercase().contains(&needle))
        .collect()
}
