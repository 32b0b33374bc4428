use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    editor::blog_post_write,
    error::{AppError, AppResult},
    guard::AdminActor,
    models::{BlogPost, BlogPostInput},
};

fn not_found() -> AppError {
    AppError::NotFound("Blog post".to_string())
}

#[utoipa::path(
    get,
    path = "/admin/blog",
    responses((status = 200, description = "All posts, newest first", body = [BlogPost]))
)]
pub async fn list_blog_posts(State(state): State<AppState>) -> AppResult<Json<Vec<BlogPost>>> {
    Ok(Json(state.repo.list_blog_posts().await?))
}

#[utoipa::path(
    get,
    path = "/admin/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = BlogPost),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_blog_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BlogPost>> {
    state
        .repo
        .get_blog_post(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// create_blog_post
///
/// [Admin Route] A blank slug is derived from the title; `tags` is split on commas.
#[utoipa::path(
    post,
    path = "/admin/blog",
    request_body = BlogPostInput,
    responses(
        (status = 201, description = "Created", body = BlogPost),
        (status = 409, description = "Slug taken")
    )
)]
pub async fn create_blog_post(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Json(payload): Json<BlogPostInput>,
) -> AppResult<(StatusCode, Json<BlogPost>)> {
    let write = blog_post_write(payload, Utc::now());
    let created = state.repo.create_blog_post(&write, actor.id).await?;
    let post = state.repo.get_blog_post(created.id).await?.ok_or_else(not_found)?;
    tracing::info!(post_id = %post.id, slug = %post.slug, "Blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_blog_post
///
/// [Admin Route] Full overwrite. The saving admin becomes the author.
#[utoipa::path(
    put,
    path = "/admin/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = BlogPostInput,
    responses(
        (status = 200, description = "Updated", body = BlogPost),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_blog_post(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BlogPostInput>,
) -> AppResult<Json<BlogPost>> {
    let write = blog_post_write(payload, Utc::now());
    state
        .repo
        .update_blog_post(id, &write, actor.id)
        .await?
        .ok_or_else(not_found)?;
    state
        .repo
        .get_blog_post(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[utoipa::path(
    delete,
    path = "/admin/blog/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_blog_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_blog_post(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}
