use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    editor::setting_write,
    error::{AppError, AppResult},
    guard::AdminActor,
    models::{SiteSetting, SiteSettingInput},
};

#[utoipa::path(
    get,
    path = "/admin/settings",
    responses((status = 200, description = "All settings ordered by key", body = [SiteSetting]))
)]
pub async fn list_settings(State(state): State<AppState>) -> AppResult<Json<Vec<SiteSetting>>> {
    Ok(Json(state.repo.list_settings().await?))
}

/// create_setting
///
/// [Admin Route] `value_text` is stored as JSON when it parses, as a string otherwise.
#[utoipa::path(
    post,
    path = "/admin/settings",
    request_body = SiteSettingInput,
    responses(
        (status = 201, description = "Created", body = SiteSetting),
        (status = 409, description = "Key taken")
    )
)]
pub async fn create_setting(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Json(payload): Json<SiteSettingInput>,
) -> AppResult<(StatusCode, Json<SiteSetting>)> {
    if payload.key.trim().is_empty() {
        return Err(AppError::BadRequest("key is required".to_string()));
    }
    let setting = state
        .repo
        .upsert_setting(Uuid::new_v4(), &setting_write(payload), actor.id)
        .await?;
    Ok((StatusCode::CREATED, Json(setting)))
}

/// save_setting
///
/// [Admin Route] Upsert by id; the saving admin is recorded as `updated_by`.
#[utoipa::path(
    put,
    path = "/admin/settings/{id}",
    params(("id" = Uuid, Path, description = "Setting ID")),
    request_body = SiteSettingInput,
    responses(
        (status = 200, description = "Saved", body = SiteSetting),
        (status = 409, description = "Key taken")
    )
)]
pub async fn save_setting(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SiteSettingInput>,
) -> AppResult<Json<SiteSetting>> {
    if payload.key.trim().is_empty() {
        return Err(AppError::BadRequest("key is required".to_string()));
    }
    let setting = state
        .repo
        .upsert_setting(id, &setting_write(payload), actor.id)
        .await?;
    tracing::info!(setting_key = %setting.key, "Setting saved");
    Ok(Json(setting))
}

#[utoipa::path(
    delete,
    path = "/admin/settings/{id}",
    params(("id" = Uuid, Path, description = "Setting ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_setting(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Setting".to_string()))
    }
}
