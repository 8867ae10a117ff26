use std::sync::Arc;

use compendium_core::config::Settings;
use compendium_core::testing::MemoryCatalog;
use compendium_core::types::{Category, FilterSelection, SearchHit};
use compendium_session::{FilterApplication, LookupSession};
use serde_json::json;

fn spell(catalog: &MemoryCatalog, hit: &SearchHit, level: i64) {
    catalog.insert(&hit.reference_path, json!({"index": hit.id, "name": hit.display_name, "level": level}));
}

/// Twelve spells, levels cycling 0..=3.
fn spellbook() -> (Arc<MemoryCatalog>, Vec<SearchHit>) {
    let catalog = Arc::new(MemoryCatalog::new());
    let names: Vec<String> = (0..12).map(|i| format!("Spell {i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let hits = catalog.insert_listing(&Category::new("spells"), &refs);
    for (i, hit) in hits.iter().enumerate() {
        spell(&catalog, hit, (i % 4) as i64);
    }
    (catalog, hits)
}

fn level(l: &str) -> FilterSelection {
    FilterSelection::new().with("level", [l])
}

#[tokio::test(start_paused = true)]
async fn search_sets_base_and_resets_filters() {
    let (catalog, _) = spellbook();
    let session = LookupSession::new(Arc::clone(&catalog), &Settings::default());
    let spells = Category::new("spells");

    session.search("", &spells).await;
    assert_eq!(session.apply_filters(level("1")).await, FilterApplication::Applied(3));
    assert_eq!(session.active_filters(), level("1"));

    let hits = session.search("spell 1", &spells).await;
    assert_eq!(hits.len(), 3, "Spell 1, Spell 10, Spell 11");
    assert_eq!(session.base(), Some(hits.clone()));
    assert_eq!(session.displayed(), hits);
    assert!(session.active_filters().is_empty());
    assert_eq!(session.query(), "spell 1");
    assert_eq!(session.category(), Some(spells));
}

#[tokio::test]
async fn failed_search_clears_results() {
    let catalog = Arc::new(MemoryCatalog::new());
    let rules = Category::new("rules");
    catalog.fail(&rules.listing_path());
    let session = LookupSession::new(catalog, &Settings::default());

    assert!(session.search("combat", &rules).await.is_empty());
    assert_eq!(session.base(), None);
    assert!(session.displayed().is_empty());
}

#[tokio::test]
async fn filters_without_category_are_skipped() {
    let (catalog, _) = spellbook();
    let session = LookupSession::new(Arc::clone(&catalog), &Settings::default());
    assert_eq!(session.apply_filters(level("2")).await, FilterApplication::Skipped);
    assert_eq!(catalog.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_base_is_loaded_before_filtering() {
    let (catalog, hits) = spellbook();
    let session = LookupSession::new(Arc::clone(&catalog), &Settings::default());
    session.set_category(Category::new("spells"));
    assert_eq!(session.base(), None);

    assert_eq!(session.apply_filters(level("0")).await, FilterApplication::Applied(3));
    assert_eq!(session.base(), Some(hits.clone()));
    assert_eq!(catalog.calls()[0], "/api/spells");

    let shown: Vec<String> = session.displayed().into_iter().map(|h| h.id).collect();
    assert_eq!(shown, vec!["spell-0", "spell-4", "spell-8"]);
}

#[tokio::test]
async fn clearing_filters_restores_base_without_fetching() {
    let (catalog, hits) = spellbook();
    let session = LookupSession::new(Arc::clone(&catalog), &Settings::default());
    session.search("", &Category::new("spells")).await;
    let before = catalog.call_count();

    assert_eq!(session.clear_filters().await, FilterApplication::Applied(hits.len()));
    assert_eq!(session.displayed(), hits);
    assert_eq!(catalog.call_count(), before);
}

#[tokio::test(start_paused = true)]
async fn newest_run_wins_when_older_finishes_last() {
    let (catalog, hits) = spellbook();
    let session = LookupSession::new(Arc::clone(&catalog), &Settings::default());
    session.search("", &Category::new("spells")).await;

    catalog.hold();
    let older = tokio::spawn({
        let session = session.clone();
        async move { session.apply_filters(level("3")).await }
    });
    while catalog.in_flight() < 10 {
        tokio::task::yield_now().await;
    }

    // The newer run needs no fetches and lands first.
    assert_eq!(session.clear_filters().await, FilterApplication::Applied(hits.len()));
    catalog.release();

    assert_eq!(older.await.expect("older run"), FilterApplication::Superseded);
    assert_eq!(session.displayed(), hits);
    assert!(session.active_filters().is_empty());
}

#[tokio::test(start_paused = true)]
async fn newest_run_wins_when_both_are_in_flight() {
    let (catalog, _) = spellbook();
    let session = LookupSession::new(Arc::clone(&catalog), &Settings::default());
    session.search("", &Category::new("spells")).await;

    catalog.hold();
    let older = tokio::spawn({
        let session = session.clone();
        async move { session.apply_filters(level("3")).await }
    });
    while catalog.in_flight() < 10 {
        tokio::task::yield_now().await;
    }
    let newer = tokio::spawn({
        let session = session.clone();
        async move { session.apply_filters(level("2")).await }
    });
    while catalog.in_flight() < 20 {
        tokio::task::yield_now().await;
    }
    catalog.release();

    let (older, newer) = (older.await.expect("older run"), newer.await.expect("newer run"));
    assert_eq!(older, FilterApplication::Superseded);
    assert_eq!(newer, FilterApplication::Applied(3));
    let shown: Vec<String> = session.displayed().into_iter().map(|h| h.id).collect();
    assert_eq!(shown, vec!["spell-2", "spell-6", "spell-10"]);
}

#[tokio::test]
async fn show_uses_current_category() {
    let (catalog, hits) = spellbook();
    let session = LookupSession::new(Arc::clone(&catalog), &Settings::default());
    assert!(session.show(&hits[1]).await.is_none(), "no category yet");

    session.search("", &Category::new("spells")).await;
    let view = session.show(&hits[1]).await.expect("view");
    assert_eq!(view.title, "Spell 1");
    assert_eq!(view.badge, "spells");
}
