use std::sync::Arc;
use std::time::Duration;

use compendium_core::config::FilterSettings;
use compendium_core::detail::DetailRecord;
use compendium_core::traits::CatalogSource;
use compendium_core::types::{Category, FilterSelection, SearchHit};
use tokio::task::JoinSet;

use crate::predicate::matches_selection;
use crate::run::FilterRun;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("filter worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub batches: usize,
    pub pauses: usize,
    pub fetched: usize,
    pub kept: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// No active groups; the base set passes through untouched.
    Unchanged(Vec<SearchHit>),
    Completed { hits: Vec<SearchHit>, report: FilterReport },
    /// Superseded or cancelled; partial results were discarded.
    Cancelled,
    /// The run itself broke; the base set is returned as-is.
    Unfiltered(Vec<SearchHit>),
}

impl FilterOutcome {
    pub fn into_hits(self) -> Vec<SearchHit> {
        match self {
            Self::Unchanged(hits) | Self::Unfiltered(hits) | Self::Completed { hits, .. } => hits,
            Self::Cancelled => Vec::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn report(&self) -> Option<&FilterReport> {
        match self {
            Self::Completed { report, .. } => Some(report),
            _ => None,
        }
    }
}

enum Verdict {
    Matched,
    Rejected,
    /// Detail unavailable; the item stays in the result.
    Unknown,
}

/// Narrows a base result set by fetching each item's detail record.
pub struct FilterEngine<C> {
    catalog: Arc<C>,
    batch_size: usize,
    batch_delay: Duration,
}

impl<C> Clone for FilterEngine<C> {
    fn clone(&self) -> Self {
        Self { catalog: Arc::clone(&self.catalog), batch_size: self.batch_size, batch_delay: self.batch_delay }
    }
}

impl<C: CatalogSource + 'static> FilterEngine<C> {
    pub fn new(catalog: Arc<C>, settings: &FilterSettings) -> Self {
        Self::with_batching(catalog, settings.batch_size, settings.batch_delay())
    }

    pub fn with_batching(catalog: Arc<C>, batch_size: usize, batch_delay: Duration) -> Self {
        Self { catalog, batch_size: batch_size.max(1), batch_delay }
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Keep the items of `base` whose detail record satisfies `selection`.
    pub async fn apply_filters(
        &self,
        run: &FilterRun,
        base: &[SearchHit],
        category: &Category,
        selection: &FilterSelection,
    ) -> FilterOutcome {
        if selection.is_empty() {
            return FilterOutcome::Unchanged(base.to_vec());
        }
        match self.run_batches(run, base, category, selection).await {
            Ok(outcome) => outcome,
            Err(e) if run.is_cancelled() => {
                tracing::info!("Filter run {} cancelled; dropping worker failure: {}", run.id(), e);
                FilterOutcome::Cancelled
            }
            Err(e) => {
                tracing::error!("Filtering failed, showing unfiltered results: {}", e);
                FilterOutcome::Unfiltered(base.to_vec())
            }
        }
    }

    async fn run_batches(
        &self,
        run: &FilterRun,
        base: &[SearchHit],
        category: &Category,
        selection: &FilterSelection,
    ) -> Result<FilterOutcome, FilterError> {
        let total_batches = base.len().div_ceil(self.batch_size);
        tracing::info!("Starting filtering for {} items", base.len());

        let selection = Arc::new(selection.clone());
        let mut kept = Vec::new();
        let mut report = FilterReport::default();

        for (i, chunk) in base.chunks(self.batch_size).enumerate() {
            if run.is_cancelled() {
                tracing::info!("Filter run {} cancelled before batch {}", run.id(), i + 1);
                return Ok(FilterOutcome::Cancelled);
            }
            tracing::info!("Processing batch {}/{}", i + 1, total_batches);

            let mut tasks = JoinSet::new();
            for (slot, hit) in chunk.iter().enumerate() {
                let catalog = Arc::clone(&self.catalog);
                let category = category.clone();
                let selection = Arc::clone(&selection);
                let hit = hit.clone();
                tasks.spawn(async move { (slot, judge(&*catalog, &category, &selection, &hit).await) });
            }

            let mut verdicts: Vec<Option<Verdict>> = (0..chunk.len()).map(|_| None).collect();
            while let Some(joined) = tasks.join_next().await {
                let (slot, verdict) = joined?;
                verdicts[slot] = Some(verdict);
            }

            if run.is_cancelled() {
                tracing::info!("Filter run {} cancelled, discarding batch {}", run.id(), i + 1);
                return Ok(FilterOutcome::Cancelled);
            }

            report.batches += 1;
            report.fetched += chunk.len();
            for (hit, verdict) in chunk.iter().zip(verdicts) {
                match verdict {
                    Some(Verdict::Matched) => kept.push(hit.clone()),
                    Some(Verdict::Unknown) => {
                        report.failures += 1;
                        kept.push(hit.clone());
                    }
                    Some(Verdict::Rejected) | None => {}
                }
            }

            if i + 1 < total_batches && !self.batch_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.batch_delay) => report.pauses += 1,
                    _ = run.cancelled() => {
                        tracing::info!("Filter run {} cancelled during pause", run.id());
                        return Ok(FilterOutcome::Cancelled);
                    }
                }
            }
        }

        report.kept = kept.len();
        tracing::info!("Filtering complete: {}/{} items match filters", report.kept, base.len());
        Ok(FilterOutcome::Completed { hits: kept, report })
    }
}

async fn judge<C: CatalogSource>(
    catalog: &C,
    category: &Category,
    selection: &FilterSelection,
    hit: &SearchHit,
) -> Verdict {
    let path = hit.detail_path(category);
    let record = match catalog.fetch_json(&path).await {
        Ok(body) => DetailRecord::decode(category, body),
        Err(e) => Err(e),
    };
    match record {
        Ok(record) if matches_selection(&record, selection) => Verdict::Matched,
        Ok(_) => Verdict::Rejected,
        Err(e) => {
            tracing::warn!("Error fetching details for {}: {}", hit.id, e);
            Verdict::Unknown
        }
    }
}
