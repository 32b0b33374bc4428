use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    editor::PageEditor,
    error::{AppError, AppResult},
    guard::AdminActor,
    models::{Page, PageInput},
};

/// list_pages
///
/// [Admin Route] Every page, most recently edited first.
#[utoipa::path(
    get,
    path = "/admin/pages",
    responses((status = 200, description = "All pages", body = [Page]))
)]
pub async fn list_pages(State(state): State<AppState>) -> AppResult<Json<Vec<Page>>> {
    Ok(Json(state.repo.list_pages().await?))
}

#[utoipa::path(
    get,
    path = "/admin/pages/{id}",
    params(("id" = Uuid, Path, description = "Page ID")),
    responses(
        (status = 200, description = "Found", body = Page),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Page>> {
    state
        .repo
        .get_page(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Page".to_string()))
}

/// create_page
///
/// [Admin Route] Saves a new page. Content defaults to an empty section list.
#[utoipa::path(
    post,
    path = "/admin/pages",
    request_body = PageInput,
    responses(
        (status = 201, description = "Created", body = Page),
        (status = 409, description = "Slug taken")
    )
)]
pub async fn create_page(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Json(payload): Json<PageInput>,
) -> AppResult<(StatusCode, Json<Page>)> {
    let mut editor = PageEditor::new_draft();
    editor.apply_input(payload);
    let page = editor.save(state.repo.as_ref(), actor.id).await?;
    tracing::info!(page_id = %page.id, slug = %page.slug, "Page created");
    Ok((StatusCode::CREATED, Json(page)))
}

/// update_page
///
/// [Admin Route] Overwrites the page metadata, and the sections when `content` is
/// given. Publishing stamps `published_at`.
#[utoipa::path(
    put,
    path = "/admin/pages/{id}",
    params(("id" = Uuid, Path, description = "Page ID")),
    request_body = PageInput,
    responses(
        (status = 200, description = "Updated", body = Page),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_page(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PageInput>,
) -> AppResult<Json<Page>> {
    let mut editor = PageEditor::load(state.repo.as_ref(), id).await?;
    editor.apply_input(payload);
    Ok(Json(editor.save(state.repo.as_ref(), actor.id).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/pages/{id}",
    params(("id" = Uuid, Path, description = "Page ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_page(id).await? {
        tracing::info!(page_id = %id, "Page deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Page".to_string()))
    }
}
