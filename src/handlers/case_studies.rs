use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    editor::case_study_write,
    error::{AppError, AppResult},
    guard::AdminActor,
    models::{CaseStudy, CaseStudyInput},
};

fn not_found() -> AppError {
    AppError::NotFound("Case study".to_string())
}

#[utoipa::path(
    get,
    path = "/admin/case-studies",
    responses((status = 200, description = "All case studies, newest first", body = [CaseStudy]))
)]
pub async fn list_case_studies(State(state): State<AppState>) -> AppResult<Json<Vec<CaseStudy>>> {
    Ok(Json(state.repo.list_case_studies().await?))
}

#[utoipa::path(
    get,
    path = "/admin/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study ID")),
    responses(
        (status = 200, description = "Found", body = CaseStudy),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_case_study(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CaseStudy>> {
    state
        .repo
        .get_case_study(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[utoipa::path(
    post,
    path = "/admin/case-studies",
    request_body = CaseStudyInput,
    responses(
        (status = 201, description = "Created", body = CaseStudy),
        (status = 409, description = "Slug taken")
    )
)]
pub async fn create_case_study(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Json(payload): Json<CaseStudyInput>,
) -> AppResult<(StatusCode, Json<CaseStudy>)> {
    let write = case_study_write(payload, Utc::now());
    let created = state.repo.create_case_study(&write, actor.id).await?;
    let study = state
        .repo
        .get_case_study(created.id)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(case_study_id = %study.id, slug = %study.slug, "Case study created");
    Ok((StatusCode::CREATED, Json(study)))
}

#[utoipa::path(
    put,
    path = "/admin/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study ID")),
    request_body = CaseStudyInput,
    responses(
        (status = 200, description = "Updated", body = CaseStudy),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_case_study(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CaseStudyInput>,
) -> AppResult<Json<CaseStudy>> {
    let write = case_study_write(payload, Utc::now());
    state
        .repo
        .update_case_study(id, &write, actor.id)
        .await?
        .ok_or_else(not_found)?;
    state
        .repo
        .get_case_study(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[utoipa::path(
    delete,
    path = "/admin/case-studies/{id}",
    params(("id" = Uuid, Path, description = "Case study ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_case_study(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_case_study(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}
