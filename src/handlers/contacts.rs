use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{ContactSubmission, ContactTriageUpdate},
};

#[utoipa::path(
    get,
    path = "/admin/contacts",
    responses((status = 200, description = "Submissions, newest first", body = [ContactSubmission]))
)]
pub async fn list_contacts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ContactSubmission>>> {
    Ok(Json(state.repo.list_contacts().await?))
}

/// triage_contact
///
/// [Admin Route] Sets the triage status and notes. The submission itself is never
/// edited.
#[utoipa::path(
    patch,
    path = "/admin/contacts/{id}",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = ContactTriageUpdate,
    responses(
        (status = 200, description = "Updated", body = ContactSubmission),
        (status = 404, description = "Not Found")
    )
)]
pub async fn triage_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContactTriageUpdate>,
) -> AppResult<Json<ContactSubmission>> {
    state
        .repo
        .update_contact_triage(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Contact submission".to_string()))
}
