//! Domain types shared by the dispatcher, the filter engine and the presenter.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One entry of a category listing.
///
/// - `id`: unique within its category (the catalog's `index`)
/// - `display_name`: human readable name, the field free-text queries match on
/// - `reference_path`: service-rooted path of the full detail record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SearchHit {
    #[serde(rename = "index")]
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "url")]
    pub reference_path: String,
}

impl SearchHit {
    /// Build a hit for a known id without going through a listing.
    pub fn from_id(category: &Category, id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: id.to_string(),
            reference_path: format!("{}/{}", category.listing_path(), id),
        }
    }

    /// Path of the full detail record. Falls back to `/api/{category}/{id}`
    /// when the listing left `url` blank.
    pub fn detail_path(&self, category: &Category) -> String {
        if self.reference_path.is_empty() {
            format!("{}/{}", category.listing_path(), self.id)
        } else {
            self.reference_path.clone()
        }
    }
}

/// Body of `GET /api/{category}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub count: usize,
}

/// Compact `{index, name, url}` link the catalog embeds in detail records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiReference {
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Which predicate table and detail layout a category uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryKind {
    Spells,
    Monsters,
    Equipment,
    Other,
}

/// A catalog endpoint slug such as `spells` or `magic-items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into().trim().to_lowercase())
    }

    pub fn slug(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> CategoryKind {
        match self.0.as_str() {
            "spells" => CategoryKind::Spells,
            "monsters" => CategoryKind::Monsters,
            "equipment" => CategoryKind::Equipment,
            _ => CategoryKind::Other,
        }
    }

    pub fn listing_path(&self) -> String {
        format!("/api/{}", self.0)
    }

    /// Badge text: hyphens shown as spaces.
    pub fn badge(&self) -> String {
        self.0.replace('-', " ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

/// User-chosen filter values keyed by filter group id.
///
/// Values inside a group are OR-ed, groups are AND-ed. A group with no values
/// never constrains anything and is dropped on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FilterSelection {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, convenient in tests and CLI parsing.
    pub fn with<I, S>(mut self, group: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for v in values {
            self.insert(group, v);
        }
        self
    }

    pub fn insert(&mut self, group: &str, value: impl Into<String>) {
        self.groups.entry(group.to_string()).or_default().insert(value.into());
    }

    /// Remove one value; the group disappears once it is empty.
    pub fn remove(&mut self, group: &str, value: &str) {
        if let Some(values) = self.groups.get_mut(group) {
            values.remove(value);
            if values.is_empty() {
                self.groups.remove(group);
            }
        }
    }

    pub fn values(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(group).filter(|v| !v.is_empty())
    }

    /// Groups that carry at least one value.
    pub fn active_groups(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.groups
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.active_groups().next().is_none()
    }

    /// Total selected values across groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }
}
