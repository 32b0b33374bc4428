use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppResult,
    guard::AdminActor,
    models::{DashboardStats, RoleAssignment},
};

/// get_admin_stats
///
/// [Admin Route] Dashboard counters.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = DashboardStats))
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    Ok(Json(state.repo.get_stats().await?))
}

/// assign_role
///
/// [Super-Admin Route] Writes the user's row in `user_roles`. Sessions already open
/// for that user pick the new role up on their next sign-in or token refresh.
#[utoipa::path(
    put,
    path = "/admin/users/{user_id}/role",
    params(("user_id" = Uuid, Path, description = "Auth user ID")),
    request_body = RoleAssignment,
    responses(
        (status = 204, description = "Assigned"),
        (status = 403, description = "Not a super-admin")
    )
)]
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleAssignment>,
) -> AppResult<StatusCode> {
    state.repo.set_user_role(user_id, &payload.role).await?;
    tracing::info!(
        actor = %actor.id,
        %user_id,
        role = payload.role.as_str(),
        "Role assigned"
    );
    Ok(StatusCode::NO_CONTENT)
}
