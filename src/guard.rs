//! Route guard for the admin surface.
//!
//! `evaluate` is the whole decision; the middleware only maps it onto HTTP and waits
//! (bounded) when the answer is still `Loading`.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::CurrentSession, models::Role, session::AuthSnapshot};

/// What the guard does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state is still resolving; show a placeholder, decide nothing yet.
    Loading,
    RedirectToSignIn,
    /// Signed in without the required capability.
    AccessDenied,
    Allow,
}

/// Decides access from one snapshot. Unresolved state never redirects: a signed-in
/// admin whose role has not arrived yet must not be bounced.
pub fn evaluate(snapshot: &AuthSnapshot, require_admin: bool) -> GuardDecision {
    if snapshot.is_resolving() {
        return GuardDecision::Loading;
    }
    if snapshot.user.is_none() {
        return GuardDecision::RedirectToSignIn;
    }
    if require_admin && !snapshot.is_admin() {
        return GuardDecision::AccessDenied;
    }
    GuardDecision::Allow
}

/// Same as `evaluate(snapshot, true)` but only `super_admin` is allowed through.
pub fn evaluate_super_admin(snapshot: &AuthSnapshot) -> GuardDecision {
    match evaluate(snapshot, true) {
        GuardDecision::Allow if !snapshot.is_super_admin() => GuardDecision::AccessDenied,
        decision => decision,
    }
}

/// AdminActor
///
/// Identity of a caller that passed the guard, inserted into request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminActor {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// require_admin
///
/// Middleware for `/admin/*`. Admin and super-admin roles pass.
pub async fn require_admin(
    State(state): State<AppState>,
    session: CurrentSession,
    request: Request,
    next: Next,
) -> Response {
    run_guard(&state, session, request, next, |snapshot| evaluate(snapshot, true)).await
}

/// require_super_admin
///
/// Middleware for role assignment. Only super-admins pass.
pub async fn require_super_admin(
    State(state): State<AppState>,
    session: CurrentSession,
    request: Request,
    next: Next,
) -> Response {
    run_guard(&state, session, request, next, evaluate_super_admin).await
}

async fn run_guard(
    state: &AppState,
    session: CurrentSession,
    mut request: Request,
    next: Next,
    check: fn(&AuthSnapshot) -> GuardDecision,
) -> Response {
    let mut snapshot = session.snapshot();
    let mut decision = check(&snapshot);

    if decision == GuardDecision::Loading {
        if let Some(context) = &session.context {
            snapshot = context
                .wait_until_resolved(state.config.role_resolution_timeout)
                .await;
            decision = check(&snapshot);
        }
    }

    match decision {
        GuardDecision::Allow => {
            if let Some(user) = snapshot.user {
                request.extensions_mut().insert(AdminActor {
                    id: user.id,
                    email: user.email,
                    role: snapshot.role.unwrap_or(Role::User),
                });
            }
            next.run(request).await
        }
        GuardDecision::Loading => {
            tracing::warn!("Role resolution timed out, asking client to retry");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, "1")],
                Json(json!({ "status": "loading" })),
            )
                .into_response()
        }
        GuardDecision::RedirectToSignIn => Redirect::to(&state.config.sign_in_path).into_response(),
        GuardDecision::AccessDenied => {
            tracing::info!(user_id = ?snapshot.user.map(|u| u.id), "Admin access denied");
            (
                StatusCode::FORBIDDEN,
                [(header::LOCATION, state.config.public_root.clone())],
                Json(json!({
                    "error": "access_denied",
                    "message": "You don't have permission to access this area.",
                    "redirect": state.config.public_root,
                })),
            )
                .into_response()
        }
    }
}
