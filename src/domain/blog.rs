//! Blog Post Entity

use serde::{Deserialize, Serialize};
use super::entity::{now_millis, new_id, DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    /// URL key, unique across posts
    pub slug: String,
    pub body: String,
    /// Authoring instructor, cleared if the instructor is deleted
    pub author_id: Option<String>,
    pub published: bool,
    /// Set the first time the post is published
    pub published_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl BlogPost {
    pub fn new(title: String, body: String) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            slug: slugify(&title),
            title,
            body,
            author_id: None,
            published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Change visibility; the first publish stamps `published_at`
    pub fn set_published(&mut self, published: bool) {
        self.published = published;
        if published && self.published_at.is_none() {
            self.published_at = Some(now_millis());
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Post title is required".into()));
        }
        let valid_slug = !self.slug.is_empty()
            && !self.slug.starts_with('-')
            && !self.slug.ends_with('-')
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_slug {
            return Err(DomainError::InvalidInput(format!("Invalid slug: {:?}", self.slug)));
        }
        Ok(())
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

impl Entity for BlogPost {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust 2024 -- what's new  "), "rust-2024-what-s-new");
        assert_eq!(slugify("¡¿?!"), "");
    }

    #[test]
    fn test_validate_slug() {
        let mut post = BlogPost::new("Launch".to_string(), String::new());
        assert!(post.validate().is_ok());

        post.slug = "Bad Slug".to_string();
        assert!(matches!(post.validate(), Err(DomainError::InvalidInput(_))));

        let untitled = BlogPost::new("!!!".to_string(), String::new());
        assert!(untitled.validate().is_err());
    }

    #[test]
    fn test_first_publish_is_stamped_once() {
        let mut post = BlogPost::new("Launch".to_string(), String::new());
        assert_eq!(post.published_at, None);

        post.set_published(true);
        let stamped = post.published_at;
        assert!(stamped.is_some());

        post.set_published(false);
        post.set_published(true);
        assert_eq!(post.published_at, stamped);
    }
}
