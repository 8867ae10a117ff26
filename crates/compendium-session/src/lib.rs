//! compendium-session
//!
//! One user's lookup state: the selected category and query, the base result
//! set, the displayed subset and the active filters. Composes the query
//! dispatcher, the filter engine and the detail presenter over one catalog.
//!
//! The session is a cheap clone handle. State sits behind a mutex that is
//! never held across an await, so a newer `apply_filters` can begin while an
//! older one is still fetching; only the newest run's result is applied.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use compendium_core::config::Settings;
use compendium_core::traits::CatalogSource;
use compendium_core::types::{Category, FilterSelection, SearchHit};
use compendium_detail::{DetailPresenter, DetailView};
use compendium_filter::{FilterEngine, RunTracker};
use compendium_query::QueryDispatcher;

/// What became of an `apply_filters` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterApplication {
    /// Displayed set replaced; holds its new length.
    Applied(usize),
    /// A newer run began first; nothing was written.
    Superseded,
    /// No category selected, or the base listing could not be loaded.
    Skipped,
}

#[derive(Debug, Default)]
struct SessionState {
    category: Option<Category>,
    query: String,
    /// `None` until a listing is loaded, and again after a failed search.
    base: Option<Vec<SearchHit>>,
    displayed: Vec<SearchHit>,
    filters: FilterSelection,
    searches: u64,
    runs: RunTracker,
}

impl SessionState {
    fn select(&mut self, category: Category, query: &str) -> u64 {
        self.category = Some(category);
        self.query = query.to_string();
        self.filters = FilterSelection::new();
        self.runs.cancel_current();
        self.searches += 1;
        self.searches
    }
}

struct Shared<C> {
    dispatcher: QueryDispatcher<Arc<C>>,
    engine: FilterEngine<C>,
    presenter: DetailPresenter<Arc<C>>,
    state: Mutex<SessionState>,
}

pub struct LookupSession<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for LookupSession<C> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<C: CatalogSource + 'static> LookupSession<C> {
    pub fn new(catalog: Arc<C>, settings: &Settings) -> Self {
        let shared = Shared {
            dispatcher: QueryDispatcher::new(Arc::clone(&catalog)),
            engine: FilterEngine::new(Arc::clone(&catalog), &settings.filter),
            presenter: DetailPresenter::new(catalog, settings.catalog.base_url.clone()),
            state: Mutex::new(SessionState::default()),
        };
        Self { shared: Arc::new(shared) }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch to `category` without searching. The base set is loaded lazily
    /// by the next `apply_filters`.
    pub fn set_category(&self, category: Category) {
        let mut s = self.state();
        s.select(category, "");
        s.base = None;
        s.displayed.clear();
    }

    /// Run a free-text search and make its hits both the base and displayed sets.
    /// Active filters are reset. A failed listing clears both sets.
    pub async fn search(&self, query: &str, category: &Category) -> Vec<SearchHit> {
        let ticket = self.state().select(category.clone(), query);

        let searched = self.shared.dispatcher.try_search(query, category).await;

        let mut s = self.state();
        if s.searches != ticket {
            tracing::debug!("Discarding stale search '{}' in {}", query, category);
            return s.displayed.clone();
        }
        match searched {
            Ok(hits) => {
                s.base = Some(hits.clone());
                s.displayed = hits.clone();
                hits
            }
            Err(e) => {
                tracing::error!("Error fetching {} listing: {}", category, e);
                s.base = None;
                s.displayed.clear();
                Vec::new()
            }
        }
    }

    /// Narrow the base set by `selection`. Begins a new filter run, cancelling any
    /// run still in flight; the result is written only if this run is still the
    /// newest when it finishes.
    pub async fn apply_filters(&self, selection: FilterSelection) -> FilterApplication {
        let (run, category, base) = {
            let mut s = self.state();
            let Some(category) = s.category.clone() else {
                tracing::debug!("No category selected; ignoring filters");
                return FilterApplication::Skipped;
            };
            s.filters = selection.clone();
            (s.runs.begin(), category, s.base.clone())
        };

        let base = match base {
            Some(base) => base,
            None => match self.shared.dispatcher.list(&category).await {
                Ok(hits) => {
                    let mut s = self.state();
                    if !s.runs.is_current(&run) {
                        return FilterApplication::Superseded;
                    }
                    s.base = Some(hits.clone());
                    hits
                }
                Err(e) => {
                    tracing::error!("Error loading {} for filtering: {}", category, e);
                    self.state().runs.finish(&run);
                    return FilterApplication::Skipped;
                }
            },
        };

        let outcome = self.shared.engine.apply_filters(&run, &base, &category, &selection).await;

        let mut s = self.state();
        if outcome.is_cancelled() || !s.runs.is_current(&run) {
            tracing::debug!("Filter run {} superseded", run.id());
            return FilterApplication::Superseded;
        }
        s.runs.finish(&run);
        s.displayed = outcome.into_hits();
        FilterApplication::Applied(s.displayed.len())
    }

    pub async fn clear_filters(&self) -> FilterApplication {
        self.apply_filters(FilterSelection::new()).await
    }

    /// Detail view of `hit` in the current category.
    pub async fn show(&self, hit: &SearchHit) -> Option<DetailView> {
        let category = self.category()?;
        self.shared.presenter.show(&category, hit).await
    }

    pub fn category(&self) -> Option<Category> {
        self.state().category.clone()
    }

    pub fn query(&self) -> String {
        self.state().query.clone()
    }

    pub fn base(&self) -> Option<Vec<SearchHit>> {
        self.state().base.clone()
    }

    pub fn displayed(&self) -> Vec<SearchHit> {
        self.state().displayed.clone()
    }

    pub fn active_filters(&self) -> FilterSelection {
        self.state().filters.clone()
    }
}
