//! Structured, display-ready rendering of a detail record.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use compendium_core::detail::{display_number, DetailRecord, MonsterDetail, SpellDetail};
use compendium_core::types::Category;

const UNKNOWN: &str = "Unknown";
const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];
const IMAGE_PREFIX: &str = "/api/images/";
/// Keys the generic layout never lists as fields.
const RESERVED_KEYS: [&str; 4] = ["index", "name", "url", "desc"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SectionBody {
    Text(String),
    Paragraphs(Vec<String>),
    Badges(Vec<String>),
    /// Absolute image URL.
    Image(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

impl Section {
    fn text(heading: &str, text: impl Into<String>) -> Self {
        Self { heading: heading.to_string(), body: SectionBody::Text(text.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub title: String,
    pub badge: String,
    pub sections: Vec<Section>,
}

impl DetailView {
    pub fn section(&self, heading: &str) -> Option<&SectionBody> {
        self.sections.iter().find(|s| s.heading == heading).map(|s| &s.body)
    }
}

/// Lay out `record` for `category`. `base_url` resolves catalog-relative image paths.
pub fn render(record: &DetailRecord, category: &Category, base_url: &str) -> DetailView {
    let sections = match record {
        DetailRecord::Spell(spell) => spell_sections(spell),
        DetailRecord::Monster(monster) => monster_sections(monster),
        DetailRecord::Equipment(item) => {
            let fields = match serde_json::to_value(item) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            };
            generic_sections(&fields, base_url)
        }
        DetailRecord::Other(generic) => generic_sections(&generic.fields, base_url),
    };
    DetailView { title: record.name().to_string(), badge: category.badge(), sections }
}

fn or_unknown(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or(UNKNOWN).to_string()
}

fn spell_sections(spell: &SpellDetail) -> Vec<Section> {
    let level = match spell.level {
        Some(0) => "Cantrip".to_string(),
        Some(n) => format!("Level {}", n),
        None => UNKNOWN.to_string(),
    };
    let mut sections = vec![
        Section::text("Level", level),
        Section::text("School", or_unknown(spell.school.as_ref().map(|s| s.name.as_str()))),
        Section::text("Casting Time", or_unknown(spell.casting_time.as_deref())),
        Section::text("Range", or_unknown(spell.range.as_deref())),
        Section::text("Duration", or_unknown(spell.duration.as_deref())),
        Section { heading: "Components".into(), body: SectionBody::Badges(spell.components.clone()) },
    ];
    if !spell.desc.is_empty() {
        sections.push(Section { heading: "Description".into(), body: SectionBody::Paragraphs(spell.desc.clone()) });
    }
    if !spell.higher_level.is_empty() {
        sections.push(Section {
            heading: "At Higher Levels".into(),
            body: SectionBody::Paragraphs(spell.higher_level.clone()),
        });
    }
    sections
}

fn monster_sections(monster: &MonsterDetail) -> Vec<Section> {
    let challenge = match (monster.challenge_rating, monster.xp) {
        (Some(cr), Some(xp)) => format!("{} ({} XP)", display_number(cr), xp),
        (Some(cr), None) => display_number(cr),
        (None, _) => UNKNOWN.to_string(),
    };
    let armor = monster.armor_class_value().map_or_else(|| UNKNOWN.to_string(), |ac| ac.to_string());
    let hit_points = match (monster.hit_points, monster.hit_dice.as_deref()) {
        (Some(hp), Some(dice)) => format!("{} ({})", hp, dice),
        (Some(hp), None) => hp.to_string(),
        (None, _) => UNKNOWN.to_string(),
    };
    let speed = monster
        .speed
        .iter()
        .map(|(mode, value)| format!("{}: {}", mode, scalar_text(value)))
        .collect();
    vec![
        Section::text("Size", or_unknown(monster.size.as_deref())),
        Section::text("Type", or_unknown(monster.creature_type.as_deref())),
        Section::text("Alignment", or_unknown(monster.alignment.as_deref())),
        Section::text("Challenge Rating", challenge),
        Section::text("Armor Class", armor),
        Section::text("Hit Points", hit_points),
        Section { heading: "Speed".into(), body: SectionBody::Badges(speed) },
    ]
}

fn generic_sections(fields: &Map<String, Value>, base_url: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    match fields.get("desc") {
        Some(Value::String(text)) => sections.push(Section::text("Description", text.clone())),
        Some(Value::Array(items)) => {
            let paragraphs = items.iter().map(scalar_text).collect();
            sections.push(Section { heading: "Description".into(), body: SectionBody::Paragraphs(paragraphs) });
        }
        _ => {}
    }
    for (key, value) in fields {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if value.is_object() || value.is_array() || value.is_null() {
            continue;
        }
        let text = scalar_text(value);
        let body = if value.is_string() && looks_like_image(&text) {
            SectionBody::Image(resolve_image(&text, base_url))
        } else {
            SectionBody::Text(text)
        };
        sections.push(Section { heading: humanize_key(key), body });
    }
    sections
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn looks_like_image(value: &str) -> bool {
    let lower = value.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        || value.contains("image")
        || value.starts_with(IMAGE_PREFIX)
        || (value.starts_with("http") && value.contains("img"))
}

fn resolve_image(value: &str, base_url: &str) -> String {
    if value.starts_with(IMAGE_PREFIX) {
        format!("{}{}", base_url.trim_end_matches('/'), value)
    } else {
        value.to_string()
    }
}

/// `hit_die` -> `Hit Die`
pub fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for SectionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{}", text),
            Self::Badges(badges) => {
                let joined: Vec<String> = badges.iter().map(|b| format!("[{}]", b)).collect();
                write!(f, "{}", joined.join(" "))
            }
            Self::Image(url) => write!(f, "<image {}>", url),
            Self::Paragraphs(paragraphs) => {
                for (i, p) in paragraphs.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "\n  {}", p)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.title, self.badge)?;
        writeln!(f, "{}", "-".repeat(self.title.chars().count() + self.badge.chars().count() + 3))?;
        for section in &self.sections {
            writeln!(f, "{}: {}", section.heading, section.body)?;
        }
        Ok(())
    }
}
