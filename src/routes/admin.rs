use crate::{
    AppState,
    handlers::{admin, blog, case_studies, components, contacts, pages, sections, settings},
};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

/// Admin Router Module
///
/// Mounted under `/admin` behind `guard::require_admin`: every handler here receives
/// the caller as `Extension<AdminActor>` and can assume the admin capability.
/// Postgres row-level security still has the final word on every write.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Dashboard counters.
        .route("/stats", get(admin::get_admin_stats))
        // --- Pages ---
        .route("/pages", get(pages::list_pages).post(pages::create_page))
        .route(
            "/pages/{id}",
            get(pages::get_page)
                .put(pages::update_page)
                .delete(pages::delete_page),
        )
        // --- Section Editing ---
        // Load -> mutate -> save on the stored page; edits that change nothing are not saved.
        .route("/pages/{id}/sections", post(sections::add_section))
        .route(
            "/pages/{id}/sections/{section_id}",
            patch(sections::update_section).delete(sections::delete_section),
        )
        .route(
            "/pages/{id}/sections/{section_id}/json",
            put(sections::replace_section_json),
        )
        .route(
            "/pages/{id}/sections/{section_id}/move",
            post(sections::move_section),
        )
        .route(
            "/pages/{id}/sections/{section_id}/form",
            get(sections::get_section_form),
        )
        // --- Blog ---
        .route("/blog", get(blog::list_blog_posts).post(blog::create_blog_post))
        .route(
            "/blog/{id}",
            get(blog::get_blog_post)
                .put(blog::update_blog_post)
                .delete(blog::delete_blog_post),
        )
        // --- Case Studies ---
        .route(
            "/case-studies",
            get(case_studies::list_case_studies).post(case_studies::create_case_study),
        )
        .route(
            "/case-studies/{id}",
            get(case_studies::get_case_study)
                .put(case_studies::update_case_study)
                .delete(case_studies::delete_case_study),
        )
        // --- Components ---
        .route(
            "/components",
            get(components::list_components).post(components::create_component),
        )
        .route(
            "/components/{id}",
            get(components::get_component)
                .put(components::update_component)
                .delete(components::delete_component),
        )
        // --- Site Settings ---
        .route(
            "/settings",
            get(settings::list_settings).post(settings::create_setting),
        )
        .route(
            "/settings/{id}",
            put(settings::save_setting).delete(settings::delete_setting),
        )
        // --- Contacts ---
        .route("/contacts", get(contacts::list_contacts))
        .route("/contacts/{id}", patch(contacts::triage_contact))
}

/// Super-Admin Router Module
///
/// Mounted under `/admin` behind `guard::require_super_admin`.
pub fn super_admin_routes() -> Router<AppState> {
    Router::new()
        // PUT /admin/users/{user_id}/role
        // Assigns the user's row in `user_roles`.
        .route("/users/{user_id}/role", put(admin::assign_role))
}
