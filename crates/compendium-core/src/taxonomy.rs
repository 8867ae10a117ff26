//! Static category and filter tables.

use crate::error::{Error, Result};
use crate::types::{Category, FilterSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub slug: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAccess {
    pub slug: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOption {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterGroup {
    pub id: &'static str,
    pub label: &'static str,
    pub options: &'static [FilterOption],
}

impl FilterGroup {
    pub fn option(&self, value: &str) -> Option<&'static FilterOption> {
        self.options.iter().find(|o| o.value.eq_ignore_ascii_case(value))
    }
}

const fn opt(label: &'static str, value: &'static str) -> FilterOption {
    FilterOption { label, value }
}

pub static CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo { slug: "ability-scores", label: "Ability Scores" },
    CategoryInfo { slug: "alignments", label: "Alignments" },
    CategoryInfo { slug: "backgrounds", label: "Backgrounds" },
    CategoryInfo { slug: "classes", label: "Classes" },
    CategoryInfo { slug: "conditions", label: "Conditions" },
    CategoryInfo { slug: "damage-types", label: "Damage Types" },
    CategoryInfo { slug: "equipment", label: "Equipment" },
    CategoryInfo { slug: "equipment-categories", label: "Equipment Categories" },
    CategoryInfo { slug: "feats", label: "Feats" },
    CategoryInfo { slug: "features", label: "Features" },
    CategoryInfo { slug: "languages", label: "Languages" },
    CategoryInfo { slug: "magic-items", label: "Magic Items" },
    CategoryInfo { slug: "magic-schools", label: "Magic Schools" },
    CategoryInfo { slug: "monsters", label: "Monsters" },
    CategoryInfo { slug: "proficiencies", label: "Proficiencies" },
    CategoryInfo { slug: "races", label: "Races" },
    CategoryInfo { slug: "rule-sections", label: "Rule Sections" },
    CategoryInfo { slug: "rules", label: "Rules" },
    CategoryInfo { slug: "skills", label: "Skills" },
    CategoryInfo { slug: "spells", label: "Spells" },
    CategoryInfo { slug: "subclasses", label: "Subclasses" },
    CategoryInfo { slug: "subraces", label: "Subraces" },
    CategoryInfo { slug: "traits", label: "Traits" },
    CategoryInfo { slug: "weapon-properties", label: "Weapon Properties" },
];

pub static QUICK_ACCESS: &[QuickAccess] = &[
    QuickAccess { slug: "spells", label: "Spells", description: "Magical spells and cantrips" },
    QuickAccess { slug: "monsters", label: "Monsters", description: "Creatures and beasts" },
    QuickAccess { slug: "equipment", label: "Equipment", description: "Weapons, armor, and gear" },
    QuickAccess { slug: "classes", label: "Classes", description: "Character classes" },
    QuickAccess { slug: "races", label: "Races", description: "Player character races" },
    QuickAccess { slug: "magic-items", label: "Magic Items", description: "Enchanted items and artifacts" },
];

static SPELL_GROUPS: &[FilterGroup] = &[
    FilterGroup {
        id: "level",
        label: "Spell Level",
        options: &[
            opt("Cantrip (0)", "0"),
            opt("1st Level", "1"),
            opt("2nd Level", "2"),
            opt("3rd Level", "3"),
            opt("4th Level", "4"),
            opt("5th Level", "5"),
            opt("6th Level", "6"),
            opt("7th Level", "7"),
            opt("8th Level", "8"),
            opt("9th Level", "9"),
        ],
    },
    FilterGroup {
        id: "school",
        label: "School of Magic",
        options: &[
            opt("Abjuration", "abjuration"),
            opt("Conjuration", "conjuration"),
            opt("Divination", "divination"),
            opt("Enchantment", "enchantment"),
            opt("Evocation", "evocation"),
            opt("Illusion", "illusion"),
            opt("Necromancy", "necromancy"),
            opt("Transmutation", "transmutation"),
        ],
    },
    FilterGroup {
        id: "class",
        label: "Spellcaster Class",
        options: &[
            opt("Bard", "bard"),
            opt("Cleric", "cleric"),
            opt("Druid", "druid"),
            opt("Paladin", "paladin"),
            opt("Ranger", "ranger"),
            opt("Sorcerer", "sorcerer"),
            opt("Warlock", "warlock"),
            opt("Wizard", "wizard"),
        ],
    },
];

static MONSTER_GROUPS: &[FilterGroup] = &[
    FilterGroup {
        id: "challenge_rating",
        label: "Challenge Rating",
        options: &[
            opt("0", "0"),
            opt("1/8", "1/8"),
            opt("1/4", "1/4"),
            opt("1/2", "1/2"),
            opt("1", "1"),
            opt("2", "2"),
            opt("3", "3"),
            opt("4", "4"),
            opt("5", "5"),
            opt("10+", "10+"),
        ],
    },
    FilterGroup {
        id: "type",
        label: "Creature Type",
        options: &[
            opt("Beast", "beast"),
            opt("Humanoid", "humanoid"),
            opt("Dragon", "dragon"),
            opt("Undead", "undead"),
            opt("Fiend", "fiend"),
            opt("Celestial", "celestial"),
            opt("Fey", "fey"),
            opt("Aberration", "aberration"),
        ],
    },
    FilterGroup {
        id: "size",
        label: "Size",
        options: &[
            opt("Tiny", "tiny"),
            opt("Small", "small"),
            opt("Medium", "medium"),
            opt("Large", "large"),
            opt("Huge", "huge"),
            opt("Gargantuan", "gargantuan"),
        ],
    },
];

static EQUIPMENT_GROUPS: &[FilterGroup] = &[FilterGroup {
    id: "equipment_category",
    label: "Equipment Type",
    options: &[
        opt("Weapons", "weapon"),
        opt("Armor", "armor"),
        opt("Adventuring Gear", "adventuring-gear"),
        opt("Tools", "tools"),
        opt("Mounts & Vehicles", "mounts-and-vehicles"),
    ],
}];

// Listed for the UI; the predicate table lets every record through for these.
static CLASS_GROUPS: &[FilterGroup] = &[FilterGroup {
    id: "hit_die",
    label: "Hit Die",
    options: &[opt("d6", "6"), opt("d8", "8"), opt("d10", "10"), opt("d12", "12")],
}];

static RACE_GROUPS: &[FilterGroup] = &[FilterGroup {
    id: "size",
    label: "Size",
    options: &[opt("Small", "small"), opt("Medium", "medium")],
}];

pub fn category_info(slug: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES.iter().find(|c| c.slug == slug)
}

/// Filter groups offered for a category; empty when the category has none.
pub fn filter_groups(category: &Category) -> &'static [FilterGroup] {
    match category.slug() {
        "spells" => SPELL_GROUPS,
        "monsters" => MONSTER_GROUPS,
        "equipment" => EQUIPMENT_GROUPS,
        "classes" => CLASS_GROUPS,
        "races" => RACE_GROUPS,
        _ => &[],
    }
}

/// Parse `group=value[,value...]` specs into a selection, validating both the
/// group and every value against the category's table.
pub fn parse_selection<S: AsRef<str>>(category: &Category, clauses: &[S]) -> Result<FilterSelection> {
    let groups = filter_groups(category);
    let mut selection = FilterSelection::new();
    for clause in clauses {
        let clause = clause.as_ref();
        let (group_id, values) = clause
            .split_once('=')
            .ok_or_else(|| Error::InvalidFilter(format!("expected group=value, got '{}'", clause)))?;
        let group_id = group_id.trim();
        let group = groups.iter().find(|g| g.id == group_id).ok_or_else(|| {
            let known: Vec<&str> = groups.iter().map(|g| g.id).collect();
            Error::InvalidFilter(format!(
                "'{}' has no filter group '{}' (known: {})",
                category,
                group_id,
                if known.is_empty() { "none".to_string() } else { known.join(", ") }
            ))
        })?;
        for value in values.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            let option = group.option(value).ok_or_else(|| {
                Error::InvalidFilter(format!("'{}' is not an option of '{}'", value, group.id))
            })?;
            selection.insert(group.id, option.value);
        }
    }
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_quick_access_entry_is_a_known_category() {
        for q in QUICK_ACCESS {
            assert!(category_info(q.slug).is_some(), "{} missing", q.slug);
        }
    }

    #[test]
    fn parse_selection_groups_values() {
        let spells = Category::new("spells");
        let sel = parse_selection(&spells, &["level=3,4", "school=Evocation"]).expect("parse");
        assert_eq!(sel.values("level").map(|v| v.len()), Some(2));
        assert!(sel.values("school").expect("school").contains("evocation"));
    }

    #[test]
    fn parse_selection_rejects_unknown_group_and_value() {
        let monsters = Category::new("monsters");
        assert!(parse_selection(&monsters, &["level=3"]).is_err());
        assert!(parse_selection(&monsters, &["size=colossal"]).is_err());
        assert!(parse_selection(&monsters, &["size"]).is_err());
        let sel = parse_selection(&monsters, &["challenge_rating=10+"]).expect("parse");
        assert!(sel.values("challenge_rating").expect("cr").contains("10+"));
    }

    #[test]
    fn categories_without_filters_have_no_groups() {
        assert!(filter_groups(&Category::new("conditions")).is_empty());
        assert_eq!(filter_groups(&Category::new("classes"))[0].id, "hit_die");
    }
}
