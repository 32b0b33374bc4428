use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::content::PageContent;

// --- Roles & Statuses ---

/// Role
///
/// The single role row a user owns in `public.user_roles`. Stored as text and open to
/// extension: unknown strings survive as `Other` and grant nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
            Self::Other(raw) => raw,
        }
    }

    /// `admin` and `super_admin` both carry the admin capability.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "user" => Self::User,
            "admin" => Self::Admin,
            "super_admin" => Self::SuperAdmin,
            _ => Self::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// PublishStatus
///
/// Lifecycle of pages, blog posts and case studies. New records start as `draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl TryFrom<String> for PublishStatus {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown publish status '{other}'")),
        }
    }
}

/// ContactStatus
///
/// Admin triage state of a contact submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ContactStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Closed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<String> for ContactStatus {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        match raw.as_str() {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown contact status '{other}'")),
        }
    }
}

// --- Core Content Schemas (Mapped to Database) ---

/// Page
///
/// A CMS page from `public.pages`. `content` is the section document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Page {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    #[sqlx(try_from = "String")]
    pub status: PublishStatus,
    #[sqlx(json)]
    #[ts(type = "{ sections: Array<Record<string, unknown>> }")]
    #[schema(value_type = Object)]
    pub content: PageContent,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

/// BlogPost
///
/// A blog article from `public.blog_posts`. The body is free text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    #[sqlx(try_from = "String")]
    pub status: PublishStatus,
    pub category: String,
    pub tags: Vec<String>,
    pub author_id: Option<Uuid>,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CaseStudy
///
/// A customer story from `public.case_studies`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct CaseStudy {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub company_name: String,
    pub industry: String,
    pub challenge: String,
    pub solution: String,
    pub results: String,
    pub featured_image: String,
    pub logo_image: String,
    #[sqlx(try_from = "String")]
    pub status: PublishStatus,
    pub author_id: Option<Uuid>,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Component
///
/// A reusable content fragment. `content` and `props` are only required to be JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Component {
    pub id: Uuid,
    pub name: String,
    // 'type' is a reserved keyword in Rust.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub component_type: String,
    #[schema(value_type = Object)]
    pub content: Value,
    #[schema(value_type = Object)]
    pub props: Value,
    pub created_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// SiteSetting
///
/// A `key -> value` pair from `public.site_settings`. Key uniqueness is a database
/// constraint, not checked here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct SiteSetting {
    pub id: Uuid,
    pub key: String,
    #[schema(value_type = Object)]
    pub value: Value,
    pub description: String,
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ContactSubmission
///
/// What a visitor sent through the contact form, plus the admin triage overlay
/// (`status`, `notes`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: String,
    // The visitor's job title, unrelated to `Role`.
    pub role: String,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: ContactStatus,
    pub notes: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Repository Write Payloads ---

/// Column values written by a page save.
///
/// `published_at: None` leaves an existing timestamp untouched (COALESCE).
#[derive(Debug, Clone, Default)]
pub struct PageWrite {
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    pub status: PublishStatus,
    pub content: PageContent,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct BlogPostWrite {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub status: PublishStatus,
    pub category: String,
    pub tags: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct CaseStudyWrite {
    pub title: String,
    pub slug: String,
    pub company_name: String,
    pub industry: String,
    pub challenge: String,
    pub solution: String,
    pub results: String,
    pub featured_image: String,
    pub logo_image: String,
    pub status: PublishStatus,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ComponentWrite {
    pub name: String,
    pub component_type: String,
    pub content: Value,
    pub props: Value,
}

#[derive(Debug, Clone, Default)]
pub struct SiteSettingWrite {
    pub key: String,
    pub value: Value,
    pub description: String,
}

// --- Request Payloads (Input Schemas) ---

/// PageInput
///
/// Body of `POST /admin/pages` and `PUT /admin/pages/{id}`. Omitting `content` keeps the
/// stored sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageInput {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "{ sections: Array<Record<string, unknown>> } | null")]
    #[schema(value_type = Object)]
    pub content: Option<PageContent>,
}

/// NewSectionRequest
///
/// Body of `POST /admin/pages/{id}/sections`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NewSectionRequest {
    #[serde(rename = "type")]
    pub kind: String,
}

/// MoveSectionRequest
///
/// Body of `POST /admin/pages/{id}/sections/{section_id}/move`: `"up"` or `"down"`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoveSectionRequest {
    #[schema(value_type = String, example = "up")]
    pub direction: crate::content::Direction,
}

/// RawSectionJson
///
/// Body of the raw JSON section editor: whatever the operator typed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RawSectionJson {
    pub text: String,
}

/// BlogPostInput
///
/// `tags` is the comma-separated text box; a blank `slug` is derived from the title.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct BlogPostInput {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub status: PublishStatus,
    pub category: String,
    pub tags: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct CaseStudyInput {
    pub title: String,
    pub slug: String,
    pub company_name: String,
    pub industry: String,
    pub challenge: String,
    pub solution: String,
    pub results: String,
    pub featured_image: String,
    pub logo_image: String,
    pub status: PublishStatus,
}

/// ComponentInput
///
/// `content_text` / `props_text` are the raw JSON text boxes. Text that does not parse
/// leaves the stored value unchanged; an omitted box keeps it as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ComponentInput {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props_text: Option<String>,
}

/// SiteSettingInput
///
/// `value_text` is stored as JSON when it parses and as a plain string otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(default)]
#[ts(export)]
pub struct SiteSettingInput {
    pub key: String,
    pub value_text: String,
    pub description: String,
}

/// ContactSubmissionInput
///
/// Body of the public `POST /contact`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactSubmissionInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    pub message: String,
}

/// ContactTriageUpdate
///
/// Body of `PATCH /admin/contacts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactTriageUpdate {
    pub status: ContactStatus,
    #[serde(default)]
    pub notes: String,
}

/// RoleAssignment
///
/// Body of the super-admin `PUT /admin/users/{user_id}/role`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RoleAssignment {
    #[ts(type = "string")]
    #[schema(value_type = String, example = "admin")]
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// --- Dashboard Schemas (Output) ---

/// DashboardStats
///
/// Output of `GET /admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardStats {
    pub total_pages: i64,
    pub total_blog_posts: i64,
    pub total_case_studies: i64,
    pub total_contacts: i64,
}
