use crate::{AppState, handlers::{auth, public}};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints with no guard. Content handlers only ever return `published` records,
/// so drafts stay invisible to anonymous visitors.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // --- Published Content ---
        .route("/pages/{slug}", get(public::get_published_page))
        .route("/blog", get(public::list_published_blog_posts))
        .route("/blog/{slug}", get(public::get_published_blog_post))
        .route("/case-studies", get(public::list_published_case_studies))
        .route("/case-studies/{slug}", get(public::get_published_case_study))
        // POST /contact
        // The marketing contact form; lands in the admin contacts inbox as `new`.
        .route("/contact", post(public::submit_contact))
        // --- Credential Exchange ---
        // Failures come back as 4xx values, never as 500s.
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
}
