use compendium_core::error::Error;
use compendium_core::testing::MemoryCatalog;
use compendium_core::types::Category;
use compendium_query::QueryDispatcher;
use serde_json::json;

#[tokio::test]
async fn search_is_case_insensitive_substring() {
    let catalog = MemoryCatalog::new();
    let spells = Category::new("spells");
    catalog.insert_listing(&spells, &["Fireball", "Fire Bolt", "Cure Wounds", "Delayed Blast Fireball"]);
    let dispatcher = QueryDispatcher::new(catalog);

    let hits = dispatcher.search("fire", &spells).await;
    assert_eq!(hits.len(), 3);
    for h in &hits {
        assert!(h.display_name.to_lowercase().contains("fire"));
    }
    assert_eq!(dispatcher.search("WOUNDS", &spells).await[0].id, "cure-wounds");
}

#[tokio::test]
async fn empty_query_returns_full_listing_in_order() {
    let catalog = MemoryCatalog::new();
    let monsters = Category::new("monsters");
    let listed = catalog.insert_listing(&monsters, &["Aboleth", "Goblin", "Zombie"]);
    let dispatcher = QueryDispatcher::new(catalog);
    assert_eq!(dispatcher.search("", &monsters).await, listed);
    assert_eq!(dispatcher.catalog().calls(), vec!["/api/monsters".to_string()]);
}

#[tokio::test]
async fn failed_listing_is_absorbed() {
    let catalog = MemoryCatalog::new();
    let rules = Category::new("rules");
    catalog.fail(&rules.listing_path());
    let dispatcher = QueryDispatcher::new(catalog);
    assert!(dispatcher.search("", &rules).await.is_empty());
    assert!(dispatcher.list(&rules).await.is_err(), "list keeps the error");
}

#[tokio::test]
async fn malformed_listing_is_a_decode_error() {
    let catalog = MemoryCatalog::new();
    let feats = Category::new("feats");
    catalog.insert(&feats.listing_path(), json!({"results": "nope"}));
    let dispatcher = QueryDispatcher::new(catalog);
    assert!(dispatcher.list(&feats).await.is_err());
    assert!(dispatcher.search("x", &feats).await.is_empty());
}

#[tokio::test]
async fn listing_without_results_key_is_empty() {
    let catalog = MemoryCatalog::new();
    let feats = Category::new("feats");
    catalog.insert(&feats.listing_path(), json!({"count": 0}));
    let dispatcher = QueryDispatcher::new(catalog);
    assert!(dispatcher.list(&feats).await.expect("list").is_empty());
}

#[tokio::test]
async fn try_search_filters_or_surfaces_the_failure() {
    let catalog = MemoryCatalog::new();
    let spells = Category::new("spells");
    let rules = Category::new("rules");
    catalog.insert_listing(&spells, &["Fireball", "Shield", "Fire Bolt"]);
    catalog.fail(&rules.listing_path());
    let dispatcher = QueryDispatcher::new(catalog);

    let hits = dispatcher.try_search("fire", &spells).await.expect("search spells");
    let names: Vec<&str> = hits.iter().map(|h| h.display_name.as_str()).collect();
    assert_eq!(names, vec!["Fireball", "Fire Bolt"]);

    let err = dispatcher.try_search("", &rules).await.expect_err("rules listing fails");
    assert!(matches!(err, Error::Transient { ref path, .. } if path == "/api/rules"), "{err:?}");
}
