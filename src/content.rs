//! Page content model.
//!
//! A page stores its body as one JSON document, `{ "sections": [...] }`, where every
//! section is `{ id, type, title, content, order }` and `type` selects the shape of
//! `content`. In Rust the `type`/`content` pair is the `SectionBody` sum type; section
//! types the editor has no dedicated form for are kept verbatim in `SectionBody::Custom`.
//!
//! Decoding stored content is lenient: a missing or malformed document reads as an
//! empty page, and a section whose content does not fit its declared type is kept as
//! `Custom` so nothing is lost on the next save. Keys the typed structs do not name
//! are carried in their `extra` maps and written back as they were.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// The `type` discriminator of a section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Hero,
    Text,
    Features,
    Stats,
    Cta,
    /// Any other type string, including the literal `"custom"`.
    Custom(String),
}

impl SectionKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "hero" => Self::Hero,
            "text" => Self::Text,
            "features" => Self::Features,
            "stats" => Self::Stats,
            "cta" => Self::Cta,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Hero => "hero",
            Self::Text => "text",
            Self::Features => "features",
            Self::Stats => "stats",
            Self::Cta => "cta",
            Self::Custom(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroContent {
    pub subtitle: String,
    pub description: String,
    pub button_text: String,
    pub button_link: String,
    /// Keys this struct does not name, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextContent {
    pub body: String,
    /// Keys this struct does not name, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureItem {
    pub title: String,
    pub description: String,
    pub icon: String,
    /// Keys this struct does not name, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesContent {
    pub items: Vec<FeatureItem>,
    /// Keys this struct does not name, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatItem {
    pub value: String,
    pub label: String,
    /// Keys this struct does not name, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsContent {
    pub items: Vec<StatItem>,
    /// Keys this struct does not name, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CtaContent {
    pub description: String,
    pub button_text: String,
    pub button_link: String,
    /// Keys this struct does not name, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Type-specific payload of a section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Hero(HeroContent),
    Text(TextContent),
    Features(FeaturesContent),
    Stats(StatsContent),
    Cta(CtaContent),
    Custom { kind: String, content: Value },
}

impl SectionBody {
    /// Content a freshly added section of `kind` starts with.
    pub fn starter(kind: &SectionKind) -> Self {
        match kind {
            SectionKind::Hero => Self::Hero(HeroContent {
                button_text: "Get Started".to_string(),
                button_link: "#".to_string(),
                ..HeroContent::default()
            }),
            SectionKind::Text => Self::Text(TextContent::default()),
            SectionKind::Features => Self::Features(FeaturesContent {
                items: vec![FeatureItem::default()],
                ..FeaturesContent::default()
            }),
            SectionKind::Stats => Self::Stats(StatsContent {
                items: vec![StatItem::default()],
                ..StatsContent::default()
            }),
            SectionKind::Cta => Self::Cta(CtaContent {
                button_text: "Contact Us".to_string(),
                button_link: "/contact".to_string(),
                ..CtaContent::default()
            }),
            SectionKind::Custom(name) => Self::Custom {
                kind: name.clone(),
                content: Value::Object(Map::new()),
            },
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Hero(_) => SectionKind::Hero,
            Self::Text(_) => SectionKind::Text,
            Self::Features(_) => SectionKind::Features,
            Self::Stats(_) => SectionKind::Stats,
            Self::Cta(_) => SectionKind::Cta,
            Self::Custom { kind, .. } => SectionKind::Custom(kind.clone()),
        }
    }

    /// Strict decode: a typed kind only accepts content of its own shape.
    pub fn decode(kind: &SectionKind, content: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            SectionKind::Hero => Self::Hero(serde_json::from_value(content)?),
            SectionKind::Text => Self::Text(serde_json::from_value(content)?),
            SectionKind::Features => Self::Features(serde_json::from_value(content)?),
            SectionKind::Stats => Self::Stats(serde_json::from_value(content)?),
            SectionKind::Cta => Self::Cta(serde_json::from_value(content)?),
            SectionKind::Custom(name) => Self::Custom {
                kind: name.clone(),
                content,
            },
        })
    }

    /// Lenient decode used for stored documents.
    fn from_stored(kind: &str, content: Value) -> Self {
        let parsed = SectionKind::parse(kind);
        match Self::decode(&parsed, content.clone()) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(kind, error = %e, "Section content does not match its type, keeping it raw");
                Self::Custom {
                    kind: kind.to_string(),
                    content,
                }
            }
        }
    }

    pub fn to_value(&self) -> Value {
        let encoded = match self {
            Self::Hero(c) => serde_json::to_value(c),
            Self::Text(c) => serde_json::to_value(c),
            Self::Features(c) => serde_json::to_value(c),
            Self::Stats(c) => serde_json::to_value(c),
            Self::Cta(c) => serde_json::to_value(c),
            Self::Custom { content, .. } => return content.clone(),
        };
        // Plain string/vec structs cannot fail to serialize.
        encoded.unwrap_or(Value::Null)
    }
}

/// One block of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredSection", into = "StoredSection")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub body: SectionBody,
    /// Section keys besides id/type/title/content/order, kept for the next save.
    pub extra: Map<String, Value>,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        self.body.kind()
    }
}

/// Wire shape of a section inside the page document.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct StoredSection {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    content: Value,
    order: u32,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<StoredSection> for Section {
    fn from(stored: StoredSection) -> Self {
        Self {
            body: SectionBody::from_stored(&stored.kind, stored.content),
            id: stored.id,
            title: stored.title,
            order: stored.order,
            extra: stored.extra,
        }
    }
}

impl From<Section> for StoredSection {
    fn from(section: Section) -> Self {
        Self {
            kind: section.body.kind().as_str().to_string(),
            content: section.body.to_value(),
            id: section.id,
            title: section.title,
            order: section.order,
            extra: section.extra,
        }
    }
}

/// Partial update for `PageContent::update_section`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SectionPatch {
    pub title: Option<String>,
    /// Merged key-by-key into the current content when both are objects.
    #[schema(value_type = Object)]
    pub content: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// The `content` column of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageContent {
    pub sections: Vec<Section>,
}

impl<'de> Deserialize<'de> for PageContent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_stored(value))
    }
}

impl PageContent {
    /// Reads a stored document. Anything without a `sections` array is an empty page;
    /// entries that are not objects are dropped.
    pub fn from_stored(value: Value) -> Self {
        let Value::Object(mut document) = value else {
            return Self::default();
        };
        let Some(Value::Array(items)) = document.remove("sections") else {
            return Self::default();
        };

        let sections = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Section>(item) {
                Ok(section) => Some(section),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping unreadable section entry");
                    None
                }
            })
            .collect();

        Self { sections }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({ "sections": [] }))
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// addSection: appends a section with a fresh id, the starter content of `kind` and
    /// `order` equal to the current length. Existing orders are left alone.
    pub fn add_section(&mut self, kind: SectionKind) -> &Section {
        let id = self.fresh_id();
        let order = self.sections.len() as u32;
        self.sections.push(Section {
            id,
            title: String::new(),
            order,
            body: SectionBody::starter(&kind),
            extra: Map::new(),
        });
        let last = self.sections.len() - 1;
        &self.sections[last]
    }

    fn fresh_id(&self) -> String {
        loop {
            let candidate = Uuid::new_v4().simple().to_string();
            if self.section(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// updateSection: applies `patch` to the section `id`. Returns false, changing
    /// nothing, when the id is unknown or the merged content no longer fits the
    /// section's type.
    pub fn update_section(&mut self, id: &str, patch: SectionPatch) -> bool {
        let Some(section) = self.sections.iter_mut().find(|s| s.id == id) else {
            return false;
        };

        let body = match patch.content {
            Some(incoming) => {
                let merged = merge_content(section.body.to_value(), incoming);
                match SectionBody::decode(&section.body.kind(), merged) {
                    Ok(body) => Some(body),
                    Err(e) => {
                        tracing::debug!(section = id, error = %e, "Ignoring content patch");
                        return false;
                    }
                }
            }
            None => None,
        };

        if let Some(title) = patch.title {
            section.title = title;
        }
        if let Some(body) = body {
            section.body = body;
        }
        true
    }

    /// Replaces the whole content of section `id`, as the raw JSON editor does.
    pub fn replace_section_content(&mut self, id: &str, content: Value) -> bool {
        let Some(section) = self.sections.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        match SectionBody::decode(&section.body.kind(), content) {
            Ok(body) => {
                section.body = body;
                true
            }
            Err(e) => {
                tracing::debug!(section = id, error = %e, "Ignoring raw content edit");
                false
            }
        }
    }

    /// deleteSection: removes the section. Remaining `order` values keep their gaps
    /// until the next `move_section`.
    pub fn delete_section(&mut self, id: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.id != id);
        self.sections.len() != before
    }

    /// moveSection: swaps `id` with its neighbour in `direction`, then renumbers every
    /// `order` to the new array position. No-op at either boundary.
    pub fn move_section(&mut self, id: &str, direction: Direction) -> bool {
        let Some(index) = self.sections.iter().position(|s| s.id == id) else {
            return false;
        };
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.sections.len() => index + 1,
            _ => return false,
        };

        self.sections.swap(index, target);
        for (position, section) in self.sections.iter_mut().enumerate() {
            section.order = position as u32;
        }
        true
    }
}

fn merge_content(current: Value, incoming: Value) -> Value {
    match (current, incoming) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (key, value) in patch {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, replacement) => replacement,
    }
}
