//! Blog Post Repository
//!
//! SQLite-backed implementation of Repository<BlogPost>.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{BlogPost, DomainError, DomainResult};
use super::db::{not_initialized, SharedConnection};
use super::traits::{Repository, SearchableRepository};

const POST_COLUMNS: &str =
    "id, title, slug, body, author_id, published, published_at, created_at, updated_at";

pub struct BlogRepository {
    conn: SharedConnection,
}

impl BlogRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_slug(&self, slug: &str) -> DomainResult<Option<BlogPost>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let post = conn
            .query_row(
                &format!("SELECT {} FROM blog_posts WHERE slug = ?", POST_COLUMNS),
                params![slug],
                row_to_post,
            )
            .optional()?;
        Ok(post)
    }

    /// Published posts, most recently published first
    pub async fn list_published(&self) -> DomainResult<Vec<BlogPost>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM blog_posts WHERE published = 1 ORDER BY published_at DESC, id",
            POST_COLUMNS
        ))?;
        let posts = stmt
            .query_map([], row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }
}

fn find_post(conn: &Connection, id: &str) -> DomainResult<Option<BlogPost>> {
    let post = conn
        .query_row(
            &format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS),
            params![id],
            row_to_post,
        )
        .optional()?;
    Ok(post)
}

/// Author must be an existing instructor
fn check_author(conn: &Connection, post: &BlogPost) -> DomainResult<()> {
    if let Some(author_id) = &post.author_id {
        if super::instructor_repo::find_instructor(conn, author_id)?.is_none() {
            return Err(DomainError::NotFound(format!("Instructor {} not found", author_id)));
        }
    }
    Ok(())
}

fn slug_conflict(slug: &str) -> impl FnOnce(rusqlite::Error) -> DomainError + '_ {
    move |e| match DomainError::from(e) {
        DomainError::Conflict(_) => DomainError::Conflict(format!("Slug {} is already taken", slug)),
        other => other,
    }
}

#[async_trait]
impl Repository<BlogPost> for BlogRepository {
    async fn create(&self, entity: &BlogPost) -> DomainResult<BlogPost> {
        entity.validate()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        check_author(conn, entity)?;

        conn.execute(
            "INSERT INTO blog_posts (id, title, slug, body, author_id, published, published_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entity.id,
                entity.title,
                entity.slug,
                entity.body,
                entity.author_id,
                entity.published,
                entity.published_at,
                entity.created_at,
                entity.updated_at
            ],
        )
        .map_err(slug_conflict(&entity.slug))?;

        log::info!("Created blog post {} ({})", entity.id, entity.slug);
        Ok(entity.clone())
    }

    async fn find_by_id(&self, id: &String) -> DomainResult<Option<BlogPost>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_post(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<BlogPost>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM blog_posts ORDER BY created_at DESC, id",
            POST_COLUMNS
        ))?;
        let posts = stmt
            .query_map([], row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    async fn update(&self, entity: &BlogPost) -> DomainResult<BlogPost> {
        entity.validate()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        check_author(conn, entity)?;

        let mut updated = entity.clone();
        updated.updated_at = crate::domain::now_millis();

        let changed = conn
            .execute(
                "UPDATE blog_posts SET title = ?, slug = ?, body = ?, author_id = ?, published = ?, published_at = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    updated.title,
                    updated.slug,
                    updated.body,
                    updated.author_id,
                    updated.published,
                    updated.published_at,
                    updated.updated_at,
                    updated.id
                ],
            )
            .map_err(slug_conflict(&entity.slug))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Blog post {} not found", entity.id)));
        }

        Ok(updated)
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute("DELETE FROM blog_posts WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Blog post {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchableRepository<BlogPost> for BlogRepository {
    async fn search(&self, query: &str) -> DomainResult<Vec<BlogPost>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let pattern = format!("%{}%", query.trim());
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM blog_posts WHERE title LIKE ?1 OR body LIKE ?1 ORDER BY created_at DESC, id",
            POST_COLUMNS
        ))?;
        let posts = stmt
            .query_map(params![pattern], row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }
}

fn row_to_post(row: &Row<'_>) -> rusqlite::Result<BlogPost> {
    Ok(BlogPost {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        body: row.get(3)?,
        author_id: row.get(4)?,
        published: row.get::<_, i64>(5)? != 0,
        published_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
