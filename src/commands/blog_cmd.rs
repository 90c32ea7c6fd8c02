//! Blog Commands
//!
//! Blog post CRUD. Slugs default to the slugified title.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::domain::{slugify, BlogPost, DomainError};
use crate::repository::{Repository, SearchableRepository};
use super::{created, double_option, ok, ApiResult, CreatedResult, JsonBody, SharedState};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub slug: Option<String>,
    pub author_id: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub author_id: Option<Option<String>>,
    pub published: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub q: Option<String>,
    pub published: Option<bool>,
}

pub async fn create_post(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> CreatedResult<BlogPost> {
    let mut post = BlogPost::new(req.title, req.body);
    if let Some(slug) = req.slug {
        post.slug = slugify(&slug);
    }
    post.author_id = req.author_id;
    post.set_published(req.published);

    created(state.blog_repo.create(&post).await?)
}

pub async fn list_posts(
    State(state): State<SharedState>,
    Query(query): Query<PostListQuery>,
) -> ApiResult<Vec<BlogPost>> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let mut posts = match search {
        Some(q) => state.blog_repo.search(q).await?,
        None if query.published == Some(true) => state.blog_repo.list_published().await?,
        None => state.blog_repo.list().await?,
    };
    if let Some(published) = query.published {
        posts.retain(|p| p.published == published);
    }
    ok(posts)
}

pub async fn get_post(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<BlogPost> {
    let post = state
        .blog_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Blog post {} not found", id)))?;
    ok(post)
}

pub async fn get_post_by_slug(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> ApiResult<BlogPost> {
    let post = state
        .blog_repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Blog post {} not found", slug)))?;
    ok(post)
}

/// Update only the fields present in the body
pub async fn update_post(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdatePostRequest>,
) -> ApiResult<BlogPost> {
    let existing = state
        .blog_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Blog post {} not found", id)))?;

    let mut updated = BlogPost {
        title: req.title.unwrap_or(existing.title),
        body: req.body.unwrap_or(existing.body),
        slug: req.slug.as_deref().map(slugify).unwrap_or(existing.slug),
        author_id: req.author_id.unwrap_or(existing.author_id),
        ..existing
    };
    if let Some(published) = req.published {
        updated.set_published(published);
    }

    ok(state.blog_repo.update(&updated).await?)
}

pub async fn delete_post(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<()> {
    state.blog_repo.delete(&id).await?;
    log::info!("Deleted blog post {}", id);
    ok(())
}
