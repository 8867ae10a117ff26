//! Category-shaped detail records.
//!
//! The catalog has no fixed schema, so each record is decoded into the variant
//! its category calls for. Typed variants keep the fields the filter engine and
//! presenter read and park everything else in `extra`; categories without a
//! dedicated layout keep the whole object in [`GenericDetail`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::{ApiReference, Category, CategoryKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellDetail {
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub name: String,
    pub level: Option<i64>,
    pub school: Option<ApiReference>,
    #[serde(default)]
    pub classes: Vec<ApiReference>,
    pub casting_time: Option<String>,
    pub range: Option<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub desc: Vec<String>,
    #[serde(default)]
    pub higher_level: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonsterDetail {
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub name: String,
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub creature_type: Option<String>,
    pub alignment: Option<String>,
    pub challenge_rating: Option<f64>,
    pub xp: Option<u64>,
    /// Either a list of `{type, value}` entries or, in older records, a bare number.
    pub armor_class: Option<Value>,
    pub hit_points: Option<i64>,
    pub hit_dice: Option<String>,
    /// Movement modes; values are usually strings ("30 ft.") but `hover` is a bool.
    #[serde(default)]
    pub speed: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MonsterDetail {
    pub fn armor_class_value(&self) -> Option<i64> {
        match self.armor_class.as_ref()? {
            Value::Array(entries) => entries.first()?.get("value")?.as_i64(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentDetail {
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub name: String,
    pub equipment_category: Option<ApiReference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Any other category: the raw object, rendered as key/value pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericDetail {
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum DetailRecord {
    Spell(SpellDetail),
    Monster(MonsterDetail),
    Equipment(EquipmentDetail),
    Other(GenericDetail),
}

impl DetailRecord {
    /// Decode a detail body according to the category it was fetched for.
    pub fn decode(category: &Category, value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Decode {
                what: format!("{} detail", category),
                reason: "expected a JSON object".to_string(),
            });
        }
        let decode_err = |e: serde_json::Error| Error::Decode {
            what: format!("{} detail", category),
            reason: e.to_string(),
        };
        let record = match category.kind() {
            CategoryKind::Spells => Self::Spell(serde_json::from_value(value).map_err(decode_err)?),
            CategoryKind::Monsters => Self::Monster(serde_json::from_value(value).map_err(decode_err)?),
            CategoryKind::Equipment => Self::Equipment(serde_json::from_value(value).map_err(decode_err)?),
            CategoryKind::Other => Self::Other(serde_json::from_value(value).map_err(decode_err)?),
        };
        Ok(record)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Spell(s) => &s.name,
            Self::Monster(m) => &m.name,
            Self::Equipment(e) => &e.name,
            Self::Other(g) => g.fields.get("name").and_then(Value::as_str).unwrap_or_default(),
        }
    }
}

/// Format a catalog number the way the catalog itself prints it:
/// integral values without a fraction (`10`), others as-is (`0.125`).
pub fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
