use crate::{AppState, handlers::auth};
use axum::{
    Router,
    routing::{get, post},
};

/// Session Router Module
///
/// Endpoints over the caller's own session context, resolved by the `CurrentSession`
/// extractor from the bearer token. No guard: an anonymous caller simply sees the
/// anonymous state.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        // GET /auth/session
        // Phase, user, role and the derived admin flags.
        .route("/auth/session", get(auth::get_session))
        // POST /auth/refresh
        // Token rotation; the context follows the new access token.
        .route("/auth/refresh", post(auth::refresh_session))
        // POST /auth/sign-out
        // Clears session, user and role in one step.
        .route("/auth/sign-out", post(auth::sign_out))
}
