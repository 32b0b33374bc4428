use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    editor::ComponentDraft,
    error::{AppError, AppResult},
    guard::AdminActor,
    models::{Component, ComponentInput},
};

fn not_found() -> AppError {
    AppError::NotFound("Component".to_string())
}

#[utoipa::path(
    get,
    path = "/admin/components",
    responses((status = 200, description = "All components, newest first", body = [Component]))
)]
pub async fn list_components(State(state): State<AppState>) -> AppResult<Json<Vec<Component>>> {
    Ok(Json(state.repo.list_components().await?))
}

#[utoipa::path(
    get,
    path = "/admin/components/{id}",
    params(("id" = Uuid, Path, description = "Component ID")),
    responses(
        (status = 200, description = "Found", body = Component),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Component>> {
    state
        .repo
        .get_component(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// create_component
///
/// [Admin Route] `content_text` / `props_text` that are not valid JSON fall back to
/// an empty object.
#[utoipa::path(
    post,
    path = "/admin/components",
    request_body = ComponentInput,
    responses((status = 201, description = "Created", body = Component))
)]
pub async fn create_component(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Json(payload): Json<ComponentInput>,
) -> AppResult<(StatusCode, Json<Component>)> {
    let mut draft = ComponentDraft::new();
    let ignored = draft.apply_input(payload);
    if ignored.content || ignored.props {
        tracing::debug!(?ignored, "Component JSON text not applied");
    }

    let created = state
        .repo
        .create_component(&draft.to_write(), actor.id)
        .await?;
    let component = state
        .repo
        .get_component(created.id)
        .await?
        .ok_or_else(not_found)?;
    Ok((StatusCode::CREATED, Json(component)))
}

/// update_component
///
/// [Admin Route] JSON text that does not parse leaves the stored value in place.
#[utoipa::path(
    put,
    path = "/admin/components/{id}",
    params(("id" = Uuid, Path, description = "Component ID")),
    request_body = ComponentInput,
    responses(
        (status = 200, description = "Updated", body = Component),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ComponentInput>,
) -> AppResult<Json<Component>> {
    let stored = state.repo.get_component(id).await?.ok_or_else(not_found)?;

    let mut draft = ComponentDraft::from_component(&stored);
    let ignored = draft.apply_input(payload);
    if ignored.content || ignored.props {
        tracing::debug!(component_id = %id, ?ignored, "Component JSON text not applied");
    }

    state
        .repo
        .update_component(id, &draft.to_write())
        .await?
        .ok_or_else(not_found)?;
    state
        .repo
        .get_component(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[utoipa::path(
    delete,
    path = "/admin/components/{id}",
    params(("id" = Uuid, Path, description = "Component ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_component(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}
