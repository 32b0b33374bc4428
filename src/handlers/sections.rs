//! Section editing on a stored page.
//!
//! Each call loads the page, applies one operation of the content model and saves
//! the page back. An edit that changes nothing (invalid JSON, a move past either end,
//! content that does not fit the section type) is not saved; the stored page is
//! returned as it is.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    content::{PageContent, SectionKind, SectionPatch},
    editor::{PageEditor, SectionForm, section_form},
    error::{AppError, AppResult},
    guard::AdminActor,
    json_input::parse_lenient,
    models::{MoveSectionRequest, NewSectionRequest, Page, RawSectionJson},
};

fn section_not_found() -> AppError {
    AppError::NotFound("Section".to_string())
}

/// Loads page `id`, runs `edit` on its sections and saves when `edit` reports a
/// change.
async fn edit_sections(
    state: &AppState,
    actor: &AdminActor,
    id: Uuid,
    section_id: Option<&str>,
    edit: impl FnOnce(&mut PageContent) -> bool,
) -> AppResult<Json<Page>> {
    let mut editor = PageEditor::load(state.repo.as_ref(), id).await?;
    if let Some(section_id) = section_id {
        editor.content.section(section_id).ok_or_else(section_not_found)?;
    }

    if edit(&mut editor.content) {
        Ok(Json(editor.save(state.repo.as_ref(), actor.id).await?))
    } else {
        tracing::debug!(page_id = %id, ?section_id, "Section edit not applied");
        state
            .repo
            .get_page(id)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::NotFound("Page".to_string()))
    }
}

/// add_section
///
/// [Admin Route] Appends a section of the given type with its starter content.
/// Unknown types become custom sections.
#[utoipa::path(
    post,
    path = "/admin/pages/{id}/sections",
    params(("id" = Uuid, Path, description = "Page ID")),
    request_body = NewSectionRequest,
    responses(
        (status = 200, description = "Section added", body = Page),
        (status = 404, description = "Page not found")
    )
)]
pub async fn add_section(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewSectionRequest>,
) -> AppResult<Json<Page>> {
    let kind = SectionKind::parse(&payload.kind);
    edit_sections(&state, &actor, id, None, |content| {
        content.add_section(kind);
        true
    })
    .await
}

/// update_section
///
/// [Admin Route] Sets the title and/or merges fields into the section content.
#[utoipa::path(
    patch,
    path = "/admin/pages/{id}/sections/{section_id}",
    params(
        ("id" = Uuid, Path, description = "Page ID"),
        ("section_id" = String, Path, description = "Section ID")
    ),
    request_body = SectionPatch,
    responses(
        (status = 200, description = "Page after the edit", body = Page),
        (status = 404, description = "Page or section not found")
    )
)]
pub async fn update_section(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Json(patch): Json<SectionPatch>,
) -> AppResult<Json<Page>> {
    edit_sections(&state, &actor, id, Some(section_id.as_str()), |content| {
        content.update_section(&section_id, patch)
    })
    .await
}

/// replace_section_json
///
/// [Admin Route] The raw JSON editor. Text that is not valid JSON is ignored.
#[utoipa::path(
    put,
    path = "/admin/pages/{id}/sections/{section_id}/json",
    params(
        ("id" = Uuid, Path, description = "Page ID"),
        ("section_id" = String, Path, description = "Section ID")
    ),
    request_body = RawSectionJson,
    responses(
        (status = 200, description = "Page after the edit", body = Page),
        (status = 404, description = "Page or section not found")
    )
)]
pub async fn replace_section_json(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Json(payload): Json<RawSectionJson>,
) -> AppResult<Json<Page>> {
    let parsed = parse_lenient(&payload.text);
    edit_sections(&state, &actor, id, Some(section_id.as_str()), |content| {
        parsed.is_some_and(|value| content.replace_section_content(&section_id, value))
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/pages/{id}/sections/{section_id}/move",
    params(
        ("id" = Uuid, Path, description = "Page ID"),
        ("section_id" = String, Path, description = "Section ID")
    ),
    request_body = MoveSectionRequest,
    responses(
        (status = 200, description = "Page after the move", body = Page),
        (status = 404, description = "Page or section not found")
    )
)]
pub async fn move_section(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path((id, section_id)): Path<(Uuid, String)>,
    Json(payload): Json<MoveSectionRequest>,
) -> AppResult<Json<Page>> {
    edit_sections(&state, &actor, id, Some(section_id.as_str()), |content| {
        content.move_section(&section_id, payload.direction)
    })
    .await
}

#[utoipa::path(
    delete,
    path = "/admin/pages/{id}/sections/{section_id}",
    params(
        ("id" = Uuid, Path, description = "Page ID"),
        ("section_id" = String, Path, description = "Section ID")
    ),
    responses(
        (status = 200, description = "Page after the delete", body = Page),
        (status = 404, description = "Page or section not found")
    )
)]
pub async fn delete_section(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path((id, section_id)): Path<(Uuid, String)>,
) -> AppResult<Json<Page>> {
    edit_sections(&state, &actor, id, Some(section_id.as_str()), |content| {
        content.delete_section(&section_id)
    })
    .await
}

/// get_section_form
///
/// [Admin Route] The editing form for one section, chosen by its type.
#[utoipa::path(
    get,
    path = "/admin/pages/{id}/sections/{section_id}/form",
    params(
        ("id" = Uuid, Path, description = "Page ID"),
        ("section_id" = String, Path, description = "Section ID")
    ),
    responses(
        (status = 200, description = "Form descriptor", body = SectionForm),
        (status = 404, description = "Page or section not found")
    )
)]
pub async fn get_section_form(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(Uuid, String)>,
) -> AppResult<Json<SectionForm>> {
    let editor = PageEditor::load(state.repo.as_ref(), id).await?;
    let section = editor
        .content
        .section(&section_id)
        .ok_or_else(section_not_found)?;
    Ok(Json(section_form(section)))
}
