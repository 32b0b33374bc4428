use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{
    BlogPost, BlogPostWrite, CaseStudy, CaseStudyWrite, Component, ComponentWrite,
    ContactStatus, ContactSubmission, ContactSubmissionInput, ContactTriageUpdate,
    DashboardStats, Page, PageWrite, PublishStatus, Role, SiteSetting, SiteSettingWrite,
};
use crate::repository::Repository;

#[derive(Default)]
struct Tables {
    roles: HashMap<Uuid, Role>,
    pages: Vec<Page>,
    blog_posts: Vec<BlogPost>,
    case_studies: Vec<CaseStudy>,
    components: Vec<Component>,
    settings: Vec<SiteSetting>,
    contacts: Vec<ContactSubmission>,
    last_tick: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps so "newest first" orderings are deterministic.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_tick {
            Some(last) if now <= last => last + ChronoDuration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }
}

/// InMemoryRepository
///
/// `Repository` over in-process tables. Used by the test-suite and by `Env::Local`
/// when no database is reachable. Mirrors the Postgres behaviour that callers rely on:
/// unique slugs and setting keys, `published_at` coalescing, listing orders.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    failing: AtomicBool,
    role_lookup_delay: Option<Duration>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a row in `user_roles`.
    pub fn with_role(mut self, user_id: Uuid, role: Role) -> Self {
        self.tables.get_mut().roles.insert(user_id, role);
        self
    }

    /// Makes every role lookup take at least `delay`.
    pub fn with_role_lookup_delay(mut self, delay: Duration) -> Self {
        self.role_lookup_delay = Some(delay);
        self
    }

    /// When set, every call fails with `RepositoryError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "Mock Repository Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

fn conflict(what: &str) -> RepositoryError {
    RepositoryError::Conflict(format!("{what} already exists"))
}

fn newest_first<T>(rows: &[T], key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T>
where
    T: Clone,
{
    let mut rows = rows.to_vec();
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user_role(&self, user_id: Uuid) -> Result<Option<Role>, RepositoryError> {
        if let Some(delay) = self.role_lookup_delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        Ok(self.tables.read().await.roles.get(&user_id).cloned())
    }

    async fn set_user_role(&self, user_id: Uuid, role: &Role) -> Result<(), RepositoryError> {
        self.check()?;
        self.tables.write().await.roles.insert(user_id, role.clone());
        Ok(())
    }

    // --- Pages ---

    async fn list_pages(&self) -> Result<Vec<Page>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.pages, |p| p.updated_at))
    }

    async fn get_page(&self, id: Uuid) -> Result<Option<Page>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.pages.iter().find(|p| p.id == id).cloned())
    }

    async fn get_published_page(&self, slug: &str) -> Result<Option<Page>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .pages
            .iter()
            .find(|p| p.slug == slug && p.status == PublishStatus::Published)
            .cloned())
    }

    async fn create_page(&self, page: &PageWrite, actor: Uuid) -> Result<Page, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables.pages.iter().any(|p| p.slug == page.slug) {
            return Err(conflict("A page with this slug"));
        }
        let now = tables.tick();
        let row = Page {
            id: Uuid::new_v4(),
            slug: page.slug.clone(),
            title: page.title.clone(),
            meta_description: page.meta_description.clone(),
            status: page.status,
            content: page.content.clone(),
            published_at: page.published_at,
            created_at: now,
            updated_at: now,
            created_by: Some(actor),
            updated_by: Some(actor),
        };
        tables.pages.push(row.clone());
        Ok(row)
    }

    async fn update_page(
        &self,
        id: Uuid,
        page: &PageWrite,
        actor: Uuid,
    ) -> Result<Option<Page>, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables.pages.iter().any(|p| p.slug == page.slug && p.id != id) {
            return Err(conflict("A page with this slug"));
        }
        let now = tables.tick();
        let Some(row) = tables.pages.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        row.slug = page.slug.clone();
        row.title = page.title.clone();
        row.meta_description = page.meta_description.clone();
        row.status = page.status;
        row.content = page.content.clone();
        row.published_at = page.published_at.or(row.published_at);
        row.updated_by = Some(actor);
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_page(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let before = tables.pages.len();
        tables.pages.retain(|p| p.id != id);
        Ok(tables.pages.len() < before)
    }

    // --- Blog ---

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.blog_posts, |p| p.created_at))
    }

    async fn list_published_blog_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        let mut posts = self.list_blog_posts().await?;
        posts.retain(|p| p.status == PublishStatus::Published);
        posts.sort_by_key(|p| std::cmp::Reverse(p.published_at));
        Ok(posts)
    }

    async fn get_blog_post(&self, id: Uuid) -> Result<Option<BlogPost>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.blog_posts.iter().find(|p| p.id == id).cloned())
    }

    async fn get_published_blog_post(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .blog_posts
            .iter()
            .find(|p| p.slug == slug && p.status == PublishStatus::Published)
            .cloned())
    }

    async fn create_blog_post(
        &self,
        post: &BlogPostWrite,
        author: Uuid,
    ) -> Result<BlogPost, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables.blog_posts.iter().any(|p| p.slug == post.slug) {
            return Err(conflict("A blog post with this slug"));
        }
        let now = tables.tick();
        let row = BlogPost {
            id: Uuid::new_v4(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            featured_image: post.featured_image.clone(),
            status: post.status,
            category: post.category.clone(),
            tags: post.tags.clone(),
            author_id: Some(author),
            published_at: post.published_at,
            created_at: now,
            updated_at: now,
        };
        tables.blog_posts.push(row.clone());
        Ok(row)
    }

    async fn update_blog_post(
        &self,
        id: Uuid,
        post: &BlogPostWrite,
        author: Uuid,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables
            .blog_posts
            .iter()
            .any(|p| p.slug == post.slug && p.id != id)
        {
            return Err(conflict("A blog post with this slug"));
        }
        let now = tables.tick();
        let Some(row) = tables.blog_posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        row.title = post.title.clone();
        row.slug = post.slug.clone();
        row.excerpt = post.excerpt.clone();
        row.content = post.content.clone();
        row.featured_image = post.featured_image.clone();
        row.status = post.status;
        row.category = post.category.clone();
        row.tags = post.tags.clone();
        row.author_id = Some(author);
        row.published_at = post.published_at.or(row.published_at);
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_blog_post(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let before = tables.blog_posts.len();
        tables.blog_posts.retain(|p| p.id != id);
        Ok(tables.blog_posts.len() < before)
    }

    // --- Case Studies ---

    async fn list_case_studies(&self) -> Result<Vec<CaseStudy>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.case_studies, |s| s.created_at))
    }

    async fn list_published_case_studies(&self) -> Result<Vec<CaseStudy>, RepositoryError> {
        let mut studies = self.list_case_studies().await?;
        studies.retain(|s| s.status == PublishStatus::Published);
        studies.sort_by_key(|s| std::cmp::Reverse(s.published_at));
        Ok(studies)
    }

    async fn get_case_study(&self, id: Uuid) -> Result<Option<CaseStudy>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.case_studies.iter().find(|s| s.id == id).cloned())
    }

    async fn get_published_case_study(
        &self,
        slug: &str,
    ) -> Result<Option<CaseStudy>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .case_studies
            .iter()
            .find(|s| s.slug == slug && s.status == PublishStatus::Published)
            .cloned())
    }

    async fn create_case_study(
        &self,
        study: &CaseStudyWrite,
        author: Uuid,
    ) -> Result<CaseStudy, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables.case_studies.iter().any(|s| s.slug == study.slug) {
            return Err(conflict("A case study with this slug"));
        }
        let now = tables.tick();
        let row = CaseStudy {
            id: Uuid::new_v4(),
            title: study.title.clone(),
            slug: study.slug.clone(),
            company_name: study.company_name.clone(),
            industry: study.industry.clone(),
            challenge: study.challenge.clone(),
            solution: study.solution.clone(),
            results: study.results.clone(),
            featured_image: study.featured_image.clone(),
            logo_image: study.logo_image.clone(),
            status: study.status,
            author_id: Some(author),
            published_at: study.published_at,
            created_at: now,
            updated_at: now,
        };
        tables.case_studies.push(row.clone());
        Ok(row)
    }

    async fn update_case_study(
        &self,
        id: Uuid,
        study: &CaseStudyWrite,
        author: Uuid,
    ) -> Result<Option<CaseStudy>, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables
            .case_studies
            .iter()
            .any(|s| s.slug == study.slug && s.id != id)
        {
            return Err(conflict("A case study with this slug"));
        }
        let now = tables.tick();
        let Some(row) = tables.case_studies.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        row.title = study.title.clone();
        row.slug = study.slug.clone();
        row.company_name = study.company_name.clone();
        row.industry = study.industry.clone();
        row.challenge = study.challenge.clone();
        row.solution = study.solution.clone();
        row.results = study.results.clone();
        row.featured_image = study.featured_image.clone();
        row.logo_image = study.logo_image.clone();
        row.status = study.status;
        row.author_id = Some(author);
        row.published_at = study.published_at.or(row.published_at);
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_case_study(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let before = tables.case_studies.len();
        tables.case_studies.retain(|s| s.id != id);
        Ok(tables.case_studies.len() < before)
    }

    // --- Components ---

    async fn list_components(&self) -> Result<Vec<Component>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.components, |c| c.created_at))
    }

    async fn get_component(&self, id: Uuid) -> Result<Option<Component>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.components.iter().find(|c| c.id == id).cloned())
    }

    async fn create_component(
        &self,
        component: &ComponentWrite,
        actor: Uuid,
    ) -> Result<Component, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let row = Component {
            id: Uuid::new_v4(),
            name: component.name.clone(),
            component_type: component.component_type.clone(),
            content: component.content.clone(),
            props: component.props.clone(),
            created_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        tables.components.push(row.clone());
        Ok(row)
    }

    async fn update_component(
        &self,
        id: Uuid,
        component: &ComponentWrite,
    ) -> Result<Option<Component>, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let Some(row) = tables.components.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        row.name = component.name.clone();
        row.component_type = component.component_type.clone();
        row.content = component.content.clone();
        row.props = component.props.clone();
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_component(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let before = tables.components.len();
        tables.components.retain(|c| c.id != id);
        Ok(tables.components.len() < before)
    }

    // --- Site Settings ---

    async fn list_settings(&self) -> Result<Vec<SiteSetting>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut settings = tables.settings.clone();
        settings.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(settings)
    }

    async fn upsert_setting(
        &self,
        id: Uuid,
        setting: &SiteSettingWrite,
        actor: Uuid,
    ) -> Result<SiteSetting, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables
            .settings
            .iter()
            .any(|s| s.key == setting.key && s.id != id)
        {
            return Err(conflict("A setting with this key"));
        }
        let row = SiteSetting {
            id,
            key: setting.key.clone(),
            value: setting.value.clone(),
            description: setting.description.clone(),
            updated_by: Some(actor),
            updated_at: tables.tick(),
        };
        match tables.settings.iter_mut().find(|s| s.id == id) {
            Some(existing) => *existing = row.clone(),
            None => tables.settings.push(row.clone()),
        }
        Ok(row)
    }

    async fn delete_setting(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let before = tables.settings.len();
        tables.settings.retain(|s| s.id != id);
        Ok(tables.settings.len() < before)
    }

    // --- Contacts ---

    async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.contacts, |c| c.created_at))
    }

    async fn create_contact(
        &self,
        submission: &ContactSubmissionInput,
    ) -> Result<ContactSubmission, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let row = ContactSubmission {
            id: Uuid::new_v4(),
            name: submission.name.clone(),
            email: submission.email.clone(),
            company: submission.company.clone(),
            role: submission.role.clone(),
            message: submission.message.clone(),
            status: ContactStatus::New,
            notes: String::new(),
            created_at: tables.tick(),
        };
        tables.contacts.push(row.clone());
        Ok(row)
    }

    async fn update_contact_triage(
        &self,
        id: Uuid,
        update: &ContactTriageUpdate,
    ) -> Result<Option<ContactSubmission>, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let Some(row) = tables.contacts.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        row.status = update.status;
        row.notes = update.notes.clone();
        Ok(Some(row.clone()))
    }

    async fn get_stats(&self) -> Result<DashboardStats, RepositoryError> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(DashboardStats {
            total_pages: tables.pages.len() as i64,
            total_blog_posts: tables.blog_posts.len() as i64,
            total_case_studies: tables.case_studies.len() as i64,
            total_contacts: tables.contacts.len() as i64,
        })
    }
}
