//! Admin editors: turning operator input into repository writes.
//!
//! Every editor follows the same cycle: load the stored record, mutate an in-memory
//! copy, then save the whole record back and return what the database now holds.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::content::{PageContent, Section, SectionBody};
use crate::error::{AppError, AppResult};
use crate::json_input::{JsonField, parse_or_string, to_editable_text};
use crate::models::{
    BlogPostInput, BlogPostWrite, CaseStudyInput, CaseStudyWrite, Component, ComponentInput,
    ComponentWrite, Page, PageInput, PageWrite, PublishStatus, SiteSettingInput,
    SiteSettingWrite,
};
use crate::repository::Repository;

/// `published_at` for a save happening at `now`: stamped on every published save,
/// `None` (keep whatever is stored) otherwise.
pub fn publication_stamp(status: PublishStatus, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (status == PublishStatus::Published).then_some(now)
}

/// URL slug from a title: lowercase, only `[a-z0-9 -]` kept, whitespace runs become
/// one `-`, repeated `-` collapse.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    for c in kept.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug
}

/// Splits the comma-separated tag box, dropping blanks.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn slug_or_title(slug: &str, title: &str) -> String {
    if slug.trim().is_empty() {
        slugify(title)
    } else {
        slug.to_string()
    }
}

pub fn blog_post_write(input: BlogPostInput, now: DateTime<Utc>) -> BlogPostWrite {
    BlogPostWrite {
        slug: slug_or_title(&input.slug, &input.title),
        tags: split_tags(&input.tags),
        published_at: publication_stamp(input.status, now),
        title: input.title,
        excerpt: input.excerpt,
        content: input.content,
        featured_image: input.featured_image,
        status: input.status,
        category: input.category,
    }
}

pub fn case_study_write(input: CaseStudyInput, now: DateTime<Utc>) -> CaseStudyWrite {
    CaseStudyWrite {
        slug: slug_or_title(&input.slug, &input.title),
        published_at: publication_stamp(input.status, now),
        title: input.title,
        company_name: input.company_name,
        industry: input.industry,
        challenge: input.challenge,
        solution: input.solution,
        results: input.results,
        featured_image: input.featured_image,
        logo_image: input.logo_image,
        status: input.status,
    }
}

pub fn setting_write(input: SiteSettingInput) -> SiteSettingWrite {
    SiteSettingWrite {
        value: parse_or_string(&input.value_text),
        key: input.key,
        description: input.description,
    }
}

// --- Pages ---

/// PageEditor
///
/// Working copy of one page. New pages start as an empty draft.
#[derive(Debug, Clone, Default)]
pub struct PageEditor {
    id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    pub status: PublishStatus,
    pub content: PageContent,
}

impl PageEditor {
    pub fn new_draft() -> Self {
        Self::default()
    }

    pub fn from_page(page: Page) -> Self {
        Self {
            id: Some(page.id),
            slug: page.slug,
            title: page.title,
            meta_description: page.meta_description,
            status: page.status,
            content: page.content,
        }
    }

    /// Fetches page `id` for editing.
    pub async fn load(repo: &dyn Repository, id: Uuid) -> AppResult<Self> {
        repo.get_page(id)
            .await?
            .map(Self::from_page)
            .ok_or_else(|| AppError::NotFound("Page".to_string()))
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Copies the metadata fields; `content` is only replaced when the input has one.
    pub fn apply_input(&mut self, input: PageInput) {
        self.slug = input.slug;
        self.title = input.title;
        self.meta_description = input.meta_description;
        self.status = input.status;
        if let Some(content) = input.content {
            self.content = content;
        }
    }

    pub fn to_write(&self, now: DateTime<Utc>) -> PageWrite {
        PageWrite {
            slug: self.slug.clone(),
            title: self.title.clone(),
            meta_description: self.meta_description.clone(),
            status: self.status,
            content: self.content.clone(),
            published_at: publication_stamp(self.status, now),
        }
    }

    /// Persists the working copy and re-reads the stored row. A failed write leaves the
    /// stored page as it was.
    pub async fn save(&mut self, repo: &dyn Repository, actor: Uuid) -> AppResult<Page> {
        let write = self.to_write(Utc::now());
        let id = match self.id {
            None => repo.create_page(&write, actor).await?.id,
            Some(id) => {
                repo.update_page(id, &write, actor)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Page".to_string()))?
                    .id
            }
        };
        self.id = Some(id);

        let stored = repo
            .get_page(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Page".to_string()))?;
        *self = Self::from_page(stored.clone());
        Ok(stored)
    }
}

// --- Section Forms ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldInput {
    Text,
    Textarea,
    /// Free-text JSON, applied only when it parses.
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FormField {
    /// Key in the section's content (or `title`).
    pub name: String,
    pub label: String,
    pub input: FieldInput,
    pub value: String,
}

impl FormField {
    fn new(name: &str, label: &str, input: FieldInput, value: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            input,
            value: value.to_string(),
        }
    }
}

/// The editing form for one section, chosen by its type.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SectionForm {
    pub section_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub fields: Vec<FormField>,
}

pub fn section_form(section: &Section) -> SectionForm {
    let title = FormField::new("title", "Title", FieldInput::Text, &section.title);

    let mut fields = vec![title];
    match &section.body {
        SectionBody::Hero(hero) => fields.extend([
            FormField::new("subtitle", "Subtitle", FieldInput::Text, &hero.subtitle),
            FormField::new("description", "Description", FieldInput::Textarea, &hero.description),
            FormField::new("buttonText", "Button Text", FieldInput::Text, &hero.button_text),
            FormField::new("buttonLink", "Button Link", FieldInput::Text, &hero.button_link),
        ]),
        SectionBody::Text(text) => fields.push(FormField::new(
            "body",
            "Content",
            FieldInput::Textarea,
            &text.body,
        )),
        SectionBody::Cta(cta) => fields.extend([
            FormField::new("description", "Description", FieldInput::Textarea, &cta.description),
            FormField::new("buttonText", "Button Text", FieldInput::Text, &cta.button_text),
            FormField::new("buttonLink", "Button Link", FieldInput::Text, &cta.button_link),
        ]),
        SectionBody::Features(_) | SectionBody::Stats(_) | SectionBody::Custom { .. } => {
            fields.push(FormField::new(
                "content",
                "Content (JSON)",
                FieldInput::Json,
                &to_editable_text(&section.body.to_value()),
            ))
        }
    }

    SectionForm {
        section_id: section.id.clone(),
        kind: section.kind().as_str().to_string(),
        fields,
    }
}

// --- Components ---

/// Which free-text JSON boxes of a component edit were not applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IgnoredText {
    pub content: bool,
    pub props: bool,
}

/// ComponentDraft
///
/// Working copy of a component. `content` and `props` are text boxes that only take
/// effect when they hold valid JSON.
#[derive(Debug, Clone, Default)]
pub struct ComponentDraft {
    pub name: String,
    pub component_type: String,
    pub content: JsonField,
    pub props: JsonField,
}

impl ComponentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_component(component: &Component) -> Self {
        Self {
            name: component.name.clone(),
            component_type: component.component_type.clone(),
            content: JsonField::new(component.content.clone()),
            props: JsonField::new(component.props.clone()),
        }
    }

    pub fn apply_input(&mut self, input: ComponentInput) -> IgnoredText {
        self.name = input.name;
        self.component_type = input.component_type;

        let mut ignored = IgnoredText::default();
        if let Some(text) = input.content_text {
            ignored.content = !self.content.set_text(text);
        }
        if let Some(text) = input.props_text {
            ignored.props = !self.props.set_text(text);
        }
        ignored
    }

    pub fn to_write(&self) -> ComponentWrite {
        ComponentWrite {
            name: self.name.clone(),
            component_type: self.component_type.clone(),
            content: self.content.value().clone(),
            props: self.props.value().clone(),
        }
    }
}
