use crate::error::RepositoryError;
use crate::models::{
    BlogPost, BlogPostWrite, CaseStudy, CaseStudyWrite, Component, ComponentWrite,
    ContactSubmission, ContactSubmissionInput, ContactTriageUpdate, DashboardStats, Page,
    PageWrite, Role, SiteSetting, SiteSettingWrite,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract for the CMS tables. Handlers, the editor and the session
/// resolver only ever see `Arc<dyn Repository>`, so Postgres and the in-memory store
/// are interchangeable.
///
/// Every method returns `Result`: callers decide whether a failure aborts a request
/// (CRUD) or degrades to a default (role lookup).
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Roles ---
    /// `Ok(None)` when the user has no row in `user_roles`.
    async fn get_user_role(&self, user_id: Uuid) -> Result<Option<Role>, RepositoryError>;
    async fn set_user_role(&self, user_id: Uuid, role: &Role) -> Result<(), RepositoryError>;

    // --- Pages ---
    async fn list_pages(&self) -> Result<Vec<Page>, RepositoryError>;
    async fn get_page(&self, id: Uuid) -> Result<Option<Page>, RepositoryError>;
    async fn get_published_page(&self, slug: &str) -> Result<Option<Page>, RepositoryError>;
    async fn create_page(&self, page: &PageWrite, actor: Uuid) -> Result<Page, RepositoryError>;
    /// `published_at: None` in the write keeps the stored timestamp.
    async fn update_page(
        &self,
        id: Uuid,
        page: &PageWrite,
        actor: Uuid,
    ) -> Result<Option<Page>, RepositoryError>;
    async fn delete_page(&self, id: Uuid) -> Result<bool, RepositoryError>;

    // --- Blog ---
    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, RepositoryError>;
    async fn list_published_blog_posts(&self) -> Result<Vec<BlogPost>, RepositoryError>;
    async fn get_blog_post(&self, id: Uuid) -> Result<Option<BlogPost>, RepositoryError>;
    async fn get_published_blog_post(&self, slug: &str)
    -> Result<Option<BlogPost>, RepositoryError>;
    async fn create_blog_post(
        &self,
        post: &BlogPostWrite,
        author: Uuid,
    ) -> Result<BlogPost, RepositoryError>;
    async fn update_blog_post(
        &self,
        id: Uuid,
        post: &BlogPostWrite,
        author: Uuid,
    ) -> Result<Option<BlogPost>, RepositoryError>;
    async fn delete_blog_post(&self, id: Uuid) -> Result<bool, RepositoryError>;

    // --- Case Studies ---
    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>, RepositoryError>;
    async fn list_published_case_studies(&self) -> Result<Vec<CaseStudy>, RepositoryError>;
    async fn get_case_study(&self, id: Uuid) -> Result<Option<CaseStudy>, RepositoryError>;
    async fn get_published_case_study(
        &self,
        slug: &str,
    ) -> Result<Option<CaseStudy>, RepositoryError>;
    async fn create_case_study(
        &self,
        study: &CaseStudyWrite,
        author: Uuid,
    ) -> Result<CaseStudy, RepositoryError>;
    async fn update_case_study(
        &self,
        id: Uuid,
        study: &CaseStudyWrite,
        author: Uuid,
    ) -> Result<Option<CaseStudy>, RepositoryError>;
    async fn delete_case_study(&self, id: Uuid) -> Result<bool, RepositoryError>;

    // --- Components ---
    async fn list_components(&self) -> Result<Vec<Component>, RepositoryError>;
    async fn get_component(&self, id: Uuid) -> Result<Option<Component>, RepositoryError>;
    async fn create_component(
        &self,
        component: &ComponentWrite,
        actor: Uuid,
    ) -> Result<Component, RepositoryError>;
    async fn update_component(
        &self,
        id: Uuid,
        component: &ComponentWrite,
    ) -> Result<Option<Component>, RepositoryError>;
    async fn delete_component(&self, id: Uuid) -> Result<bool, RepositoryError>;

    // --- Site Settings ---
    async fn list_settings(&self) -> Result<Vec<SiteSetting>, RepositoryError>;
    /// Inserts the row or overwrites the one with the same `id`.
    async fn upsert_setting(
        &self,
        id: Uuid,
        setting: &SiteSettingWrite,
        actor: Uuid,
    ) -> Result<SiteSetting, RepositoryError>;
    async fn delete_setting(&self, id: Uuid) -> Result<bool, RepositoryError>;

    // --- Contacts ---
    async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, RepositoryError>;
    async fn create_contact(
        &self,
        submission: &ContactSubmissionInput,
    ) -> Result<ContactSubmission, RepositoryError>;
    async fn update_contact_triage(
        &self,
        id: Uuid,
        update: &ContactTriageUpdate,
    ) -> Result<Option<ContactSubmission>, RepositoryError>;

    // --- Dashboard ---
    async fn get_stats(&self) -> Result<DashboardStats, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const PAGE_COLUMNS: &str = "id, slug, title, meta_description, status, content, published_at, \
     created_at, updated_at, created_by, updated_by";

const BLOG_COLUMNS: &str = "id, title, slug, excerpt, content, featured_image, status, category, \
     tags, author_id, published_at, created_at, updated_at";

const CASE_STUDY_COLUMNS: &str = "id, title, slug, company_name, industry, challenge, solution, \
     results, featured_image, logo_image, status, author_id, published_at, created_at, updated_at";

const COMPONENT_COLUMNS: &str = "id, name, type, content, props, created_by, created_at, updated_at";

const SETTING_COLUMNS: &str = "id, key, value, description, updated_by, updated_at";

const CONTACT_COLUMNS: &str = "id, name, email, company, role, message, status, notes, created_at";

/// Maps unique violations (slug, settings key) to `Conflict`; everything else stays a
/// database error.
fn write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
    }
    RepositoryError::Database(e)
}

/// PostgresRepository
///
/// `Repository` backed by the Supabase Postgres database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user_role(&self, user_id: Uuid) -> Result<Option<Role>, RepositoryError> {
        let role = sqlx::query_scalar::<_, String>(
            "SELECT role FROM user_roles WHERE user_id = $1 LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role.map(Role::from))
    }

    async fn set_user_role(&self, user_id: Uuid, role: &Role) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO user_roles (user_id, role) VALUES ($1, $2)
               ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role"#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --- PAGES ---

    /// list_pages
    ///
    /// Every page regardless of status, most recently edited first.
    async fn list_pages(&self) -> Result<Vec<Page>, RepositoryError> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages ORDER BY updated_at DESC");
        Ok(sqlx::query_as::<_, Page>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_page(&self, id: Uuid) -> Result<Option<Page>, RepositoryError> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1");
        Ok(sqlx::query_as::<_, Page>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_published_page(&self, slug: &str) -> Result<Option<Page>, RepositoryError> {
        let sql =
            format!("SELECT {PAGE_COLUMNS} FROM pages WHERE slug = $1 AND status = 'published'");
        Ok(sqlx::query_as::<_, Page>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_page(&self, page: &PageWrite, actor: Uuid) -> Result<Page, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO pages (id, slug, title, meta_description, status, content, published_at,
                                 created_by, updated_by, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, NOW(), NOW())
               RETURNING {PAGE_COLUMNS}"#
        );
        sqlx::query_as::<_, Page>(&sql)
            .bind(Uuid::new_v4())
            .bind(&page.slug)
            .bind(&page.title)
            .bind(&page.meta_description)
            .bind(page.status.as_str())
            .bind(sqlx::types::Json(&page.content))
            .bind(page.published_at)
            .bind(actor)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, "A page with this slug"))
    }

    /// update_page
    ///
    /// Full overwrite of the editable columns. `COALESCE` keeps `published_at` when the
    /// save is not a publish.
    async fn update_page(
        &self,
        id: Uuid,
        page: &PageWrite,
        actor: Uuid,
    ) -> Result<Option<Page>, RepositoryError> {
        let sql = format!(
            r#"UPDATE pages SET
                 slug = $2, title = $3, meta_description = $4, status = $5, content = $6,
                 published_at = COALESCE($7, published_at),
                 updated_by = $8, updated_at = NOW()
               WHERE id = $1
               RETURNING {PAGE_COLUMNS}"#
        );
        sqlx::query_as::<_, Page>(&sql)
            .bind(id)
            .bind(&page.slug)
            .bind(&page.title)
            .bind(&page.meta_description)
            .bind(page.status.as_str())
            .bind(sqlx::types::Json(&page.content))
            .bind(page.published_at)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, "A page with this slug"))
    }

    async fn delete_page(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- BLOG ---

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blog_posts ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, BlogPost>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_published_blog_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let sql = format!(
            "SELECT {BLOG_COLUMNS} FROM blog_posts WHERE status = 'published' \
             ORDER BY published_at DESC NULLS LAST"
        );
        Ok(sqlx::query_as::<_, BlogPost>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_blog_post(&self, id: Uuid) -> Result<Option<BlogPost>, RepositoryError> {
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blog_posts WHERE id = $1");
        Ok(sqlx::query_as::<_, BlogPost>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_published_blog_post(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        let sql = format!(
            "SELECT {BLOG_COLUMNS} FROM blog_posts WHERE slug = $1 AND status = 'published'"
        );
        Ok(sqlx::query_as::<_, BlogPost>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_blog_post(
        &self,
        post: &BlogPostWrite,
        author: Uuid,
    ) -> Result<BlogPost, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO blog_posts (id, title, slug, excerpt, content, featured_image, status,
                                      category, tags, author_id, published_at, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
               RETURNING {BLOG_COLUMNS}"#
        );
        sqlx::query_as::<_, BlogPost>(&sql)
            .bind(Uuid::new_v4())
            .bind(&post.title)
            .bind(&post.slug)
            .bind(&post.excerpt)
            .bind(&post.content)
            .bind(&post.featured_image)
            .bind(post.status.as_str())
            .bind(&post.category)
            .bind(&post.tags)
            .bind(author)
            .bind(post.published_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, "A blog post with this slug"))
    }

    async fn update_blog_post(
        &self,
        id: Uuid,
        post: &BlogPostWrite,
        author: Uuid,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        let sql = format!(
            r#"UPDATE blog_posts SET
                 title = $2, slug = $3, excerpt = $4, content = $5, featured_image = $6,
                 status = $7, category = $8, tags = $9, author_id = $10,
                 published_at = COALESCE($11, published_at), updated_at = NOW()
               WHERE id = $1
               RETURNING {BLOG_COLUMNS}"#
        );
        sqlx::query_as::<_, BlogPost>(&sql)
            .bind(id)
            .bind(&post.title)
            .bind(&post.slug)
            .bind(&post.excerpt)
            .bind(&post.content)
            .bind(&post.featured_image)
            .bind(post.status.as_str())
            .bind(&post.category)
            .bind(&post.tags)
            .bind(author)
            .bind(post.published_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, "A blog post with this slug"))
    }

    async fn delete_blog_post(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- CASE STUDIES ---

    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>, RepositoryError> {
        let sql = format!("SELECT {CASE_STUDY_COLUMNS} FROM case_studies ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, CaseStudy>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_published_case_studies(&self) -> Result<Vec<CaseStudy>, RepositoryError> {
        let sql = format!(
            "SELECT {CASE_STUDY_COLUMNS} FROM case_studies WHERE status = 'published' \
             ORDER BY published_at DESC NULLS LAST"
        );
        Ok(sqlx::query_as::<_, CaseStudy>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_case_study(&self, id: Uuid) -> Result<Option<CaseStudy>, RepositoryError> {
        let sql = format!("SELECT {CASE_STUDY_COLUMNS} FROM case_studies WHERE id = $1");
        Ok(sqlx::query_as::<_, CaseStudy>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_published_case_study(
        &self,
        slug: &str,
    ) -> Result<Option<CaseStudy>, RepositoryError> {
        let sql = format!(
            "SELECT {CASE_STUDY_COLUMNS} FROM case_studies WHERE slug = $1 AND status = 'published'"
        );
        Ok(sqlx::query_as::<_, CaseStudy>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_case_study(
        &self,
        study: &CaseStudyWrite,
        author: Uuid,
    ) -> Result<CaseStudy, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO case_studies (id, title, slug, company_name, industry, challenge, solution,
                                        results, featured_image, logo_image, status, author_id,
                                        published_at, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW())
               RETURNING {CASE_STUDY_COLUMNS}"#
        );
        sqlx::query_as::<_, CaseStudy>(&sql)
            .bind(Uuid::new_v4())
            .bind(&study.title)
            .bind(&study.slug)
            .bind(&study.company_name)
            .bind(&study.industry)
            .bind(&study.challenge)
            .bind(&study.solution)
            .bind(&study.results)
            .bind(&study.featured_image)
            .bind(&study.logo_image)
            .bind(study.status.as_str())
            .bind(author)
            .bind(study.published_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, "A case study with this slug"))
    }

    async fn update_case_study(
        &self,
        id: Uuid,
        study: &CaseStudyWrite,
        author: Uuid,
    ) -> Result<Option<CaseStudy>, RepositoryError> {
        let sql = format!(
            r#"UPDATE case_studies SET
                 title = $2, slug = $3, company_name = $4, industry = $5, challenge = $6,
                 solution = $7, results = $8, featured_image = $9, logo_image = $10,
                 status = $11, author_id = $12,
                 published_at = COALESCE($13, published_at), updated_at = NOW()
               WHERE id = $1
               RETURNING {CASE_STUDY_COLUMNS}"#
        );
        sqlx::query_as::<_, CaseStudy>(&sql)
            .bind(id)
            .bind(&study.title)
            .bind(&study.slug)
            .bind(&study.company_name)
            .bind(&study.industry)
            .bind(&study.challenge)
            .bind(&study.solution)
            .bind(&study.results)
            .bind(&study.featured_image)
            .bind(&study.logo_image)
            .bind(study.status.as_str())
            .bind(author)
            .bind(study.published_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, "A case study with this slug"))
    }

    async fn delete_case_study(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM case_studies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- COMPONENTS ---

    async fn list_components(&self) -> Result<Vec<Component>, RepositoryError> {
        let sql = format!("SELECT {COMPONENT_COLUMNS} FROM components ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Component>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_component(&self, id: Uuid) -> Result<Option<Component>, RepositoryError> {
        let sql = format!("SELECT {COMPONENT_COLUMNS} FROM components WHERE id = $1");
        Ok(sqlx::query_as::<_, Component>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_component(
        &self,
        component: &ComponentWrite,
        actor: Uuid,
    ) -> Result<Component, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO components (id, name, type, content, props, created_by, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
               RETURNING {COMPONENT_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Component>(&sql)
            .bind(Uuid::new_v4())
            .bind(&component.name)
            .bind(&component.component_type)
            .bind(&component.content)
            .bind(&component.props)
            .bind(actor)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_component(
        &self,
        id: Uuid,
        component: &ComponentWrite,
    ) -> Result<Option<Component>, RepositoryError> {
        let sql = format!(
            r#"UPDATE components SET name = $2, type = $3, content = $4, props = $5, updated_at = NOW()
               WHERE id = $1
               RETURNING {COMPONENT_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Component>(&sql)
            .bind(id)
            .bind(&component.name)
            .bind(&component.component_type)
            .bind(&component.content)
            .bind(&component.props)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_component(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM components WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- SITE SETTINGS ---

    async fn list_settings(&self) -> Result<Vec<SiteSetting>, RepositoryError> {
        let sql = format!("SELECT {SETTING_COLUMNS} FROM site_settings ORDER BY key");
        Ok(sqlx::query_as::<_, SiteSetting>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn upsert_setting(
        &self,
        id: Uuid,
        setting: &SiteSettingWrite,
        actor: Uuid,
    ) -> Result<SiteSetting, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO site_settings (id, key, value, description, updated_by, updated_at)
               VALUES ($1, $2, $3, $4, $5, NOW())
               ON CONFLICT (id) DO UPDATE SET
                 key = EXCLUDED.key, value = EXCLUDED.value, description = EXCLUDED.description,
                 updated_by = EXCLUDED.updated_by, updated_at = EXCLUDED.updated_at
               RETURNING {SETTING_COLUMNS}"#
        );
        sqlx::query_as::<_, SiteSetting>(&sql)
            .bind(id)
            .bind(&setting.key)
            .bind(&setting.value)
            .bind(&setting.description)
            .bind(actor)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, "A setting with this key"))
    }

    async fn delete_setting(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM site_settings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- CONTACTS ---

    async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        let sql =
            format!("SELECT {CONTACT_COLUMNS} FROM contact_submissions ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, ContactSubmission>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_contact(
        &self,
        submission: &ContactSubmissionInput,
    ) -> Result<ContactSubmission, RepositoryError> {
        let sql = format!(
            r#"INSERT INTO contact_submissions (id, name, email, company, role, message, status, notes, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, 'new', '', NOW())
               RETURNING {CONTACT_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, ContactSubmission>(&sql)
            .bind(Uuid::new_v4())
            .bind(&submission.name)
            .bind(&submission.email)
            .bind(&submission.company)
            .bind(&submission.role)
            .bind(&submission.message)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_contact_triage(
        &self,
        id: Uuid,
        update: &ContactTriageUpdate,
    ) -> Result<Option<ContactSubmission>, RepositoryError> {
        let sql = format!(
            r#"UPDATE contact_submissions SET status = $2, notes = $3
               WHERE id = $1
               RETURNING {CONTACT_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, ContactSubmission>(&sql)
            .bind(id)
            .bind(update.status.as_str())
            .bind(&update.notes)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// get_stats
    ///
    /// Compiles the dashboard counters in a single round trip.
    async fn get_stats(&self) -> Result<DashboardStats, RepositoryError> {
        let (total_pages, total_blog_posts, total_case_studies, total_contacts) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"SELECT
                     (SELECT COUNT(*) FROM pages),
                     (SELECT COUNT(*) FROM blog_posts),
                     (SELECT COUNT(*) FROM case_studies),
                     (SELECT COUNT(*) FROM contact_submissions)"#,
            )
            .fetch_one(&self.pool)
            .await?;
        Ok(DashboardStats {
            total_pages,
            total_blog_posts,
            total_case_studies,
            total_contacts,
        })
    }
}
