//! Per-category match rules for one detail record.
//!
//! | category  | group              | rule                                              |
//! |-----------|--------------------|---------------------------------------------------|
//! | spells    | level              | level as text is selected                         |
//! | spells    | school             | `school.index` is selected                        |
//! | spells    | class              | any `classes[].index` is selected                 |
//! | monsters  | challenge_rating   | CR as text is selected, or "10+" and CR >= 10     |
//! | monsters  | type               | lowercased type is selected                       |
//! | monsters  | size               | lowercased size is selected                       |
//! | equipment | equipment_category | `equipment_category.index` is selected            |
//! | other     | any                | always matches                                    |
//!
//! Unknown groups on the three filterable categories never match.

use std::collections::BTreeSet;

use compendium_core::detail::{display_number, DetailRecord, EquipmentDetail, MonsterDetail, SpellDetail};
use compendium_core::types::FilterSelection;

/// Threshold behind the "10+" challenge rating option.
pub const HIGH_CR_OPTION: &str = "10+";
pub const HIGH_CR_THRESHOLD: f64 = 10.0;

/// AND across active groups, OR within a group. Stops at the first failing group.
pub fn matches_selection(record: &DetailRecord, selection: &FilterSelection) -> bool {
    selection
        .active_groups()
        .all(|(group, values)| group_matches(record, group, values))
}

pub fn group_matches(record: &DetailRecord, group: &str, values: &BTreeSet<String>) -> bool {
    if values.is_empty() {
        return true;
    }
    match record {
        DetailRecord::Spell(spell) => spell_matches(spell, group, values),
        DetailRecord::Monster(monster) => monster_matches(monster, group, values),
        DetailRecord::Equipment(item) => equipment_matches(item, group, values),
        DetailRecord::Other(_) => true,
    }
}

fn spell_matches(spell: &SpellDetail, group: &str, values: &BTreeSet<String>) -> bool {
    match group {
        "level" => spell.level.is_some_and(|l| values.contains(l.to_string().as_str())),
        "school" => spell.school.as_ref().is_some_and(|s| values.contains(s.index.as_str())),
        "class" => spell.classes.iter().any(|c| values.contains(c.index.as_str())),
        _ => false,
    }
}

fn monster_matches(monster: &MonsterDetail, group: &str, values: &BTreeSet<String>) -> bool {
    match group {
        "challenge_rating" => monster.challenge_rating.is_some_and(|cr| {
            challenge_rating_labels(cr).iter().any(|l| values.contains(l.as_str()))
                || (values.contains(HIGH_CR_OPTION) && cr >= HIGH_CR_THRESHOLD)
        }),
        "type" => lower_in(monster.creature_type.as_deref(), values),
        "size" => lower_in(monster.size.as_deref(), values),
        _ => false,
    }
}

fn equipment_matches(item: &EquipmentDetail, group: &str, values: &BTreeSet<String>) -> bool {
    match group {
        "equipment_category" => item
            .equipment_category
            .as_ref()
            .is_some_and(|c| !c.index.is_empty() && values.contains(c.index.as_str())),
        _ => false,
    }
}

fn lower_in(field: Option<&str>, values: &BTreeSet<String>) -> bool {
    field.is_some_and(|f| values.contains(f.to_lowercase().as_str()))
}

/// Text forms a challenge rating can be selected by: the catalog's decimal
/// (`0.125`, `3`) plus the fraction the option table uses (`1/8`).
pub fn challenge_rating_labels(cr: f64) -> Vec<String> {
    let mut labels = vec![display_number(cr)];
    let fraction = if cr == 0.125 {
        Some("1/8")
    } else if cr == 0.25 {
        Some("1/4")
    } else if cr == 0.5 {
        Some("1/2")
    } else {
        None
    };
    if let Some(f) = fraction {
        labels.push(f.to_string());
    }
    labels
}
