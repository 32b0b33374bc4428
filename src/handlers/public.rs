use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{BlogPost, CaseStudy, ContactSubmission, ContactSubmissionInput, Page},
};

/// get_published_page
///
/// [Public Route] A published page by slug. Drafts and archived pages are 404.
#[utoipa::path(
    get,
    path = "/pages/{slug}",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Found", body = Page),
        (status = 404, description = "Not published")
    )
)]
pub async fn get_published_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Page>> {
    state
        .repo
        .get_published_page(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Page".to_string()))
}

/// list_published_blog_posts
///
/// [Public Route] Published posts, newest publication first.
#[utoipa::path(
    get,
    path = "/blog",
    responses((status = 200, description = "Published posts", body = [BlogPost]))
)]
pub async fn list_published_blog_posts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BlogPost>>> {
    Ok(Json(state.repo.list_published_blog_posts().await?))
}

#[utoipa::path(
    get,
    path = "/blog/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Found", body = BlogPost),
        (status = 404, description = "Not published")
    )
)]
pub async fn get_published_blog_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<BlogPost>> {
    state
        .repo
        .get_published_blog_post(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Blog post".to_string()))
}

#[utoipa::path(
    get,
    path = "/case-studies",
    responses((status = 200, description = "Published case studies", body = [CaseStudy]))
)]
pub async fn list_published_case_studies(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CaseStudy>>> {
    Ok(Json(state.repo.list_published_case_studies().await?))
}

#[utoipa::path(
    get,
    path = "/case-studies/{slug}",
    params(("slug" = String, Path, description = "Case study slug")),
    responses(
        (status = 200, description = "Found", body = CaseStudy),
        (status = 404, description = "Not published")
    )
)]
pub async fn get_published_case_study(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CaseStudy>> {
    state
        .repo
        .get_published_case_study(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Case study".to_string()))
}

/// submit_contact
///
/// [Public Route] The marketing site's contact form. Stored with status `new`.
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactSubmissionInput,
    responses(
        (status = 201, description = "Stored", body = ContactSubmission),
        (status = 400, description = "Missing name, email or message")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactSubmissionInput>,
) -> AppResult<(StatusCode, Json<ContactSubmission>)> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.message.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "name, email and message are required".to_string(),
        ));
    }

    let submission = state.repo.create_contact(&payload).await?;
    tracing::info!(contact_id = %submission.id, "Contact submission received");
    Ok((StatusCode::CREATED, Json(submission)))
}
