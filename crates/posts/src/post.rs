use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scribe_core::{DomainResult, Entity, FieldErrors, PostId, UserId};

pub const MAX_TITLE_LENGTH: usize = 200;

/// A blog post. Owned by exactly one user for its whole life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub owner: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create or full-replace request.
///
/// Unknown fields (including any client-supplied `owner`) are ignored; the
/// owner always comes from the authenticated caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

/// Body of a partial update: only the present fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

impl Post {
    /// Create a post for `owner`.
    pub fn create(id: PostId, owner: UserId, input: NewPost, now: DateTime<Utc>) -> DomainResult<Self> {
        let (title, content) = validate_new(input)?;
        Ok(Self {
            id,
            owner,
            title,
            content,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Full replace (PUT): both fields required.
    pub fn replace(&mut self, input: NewPost, now: DateTime<Utc>) -> DomainResult<()> {
        let (title, content) = validate_new(input)?;
        self.title = title;
        self.content = content;
        self.updated_at = now;
        Ok(())
    }

    /// Partial update (PATCH). Nothing is written unless every present field is valid.
    pub fn apply_changes(&mut self, changes: PostChanges, now: DateTime<Utc>) -> DomainResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut errors = FieldErrors::new();
        let title = changes.title.map(|t| check_title(&t, &mut errors));
        let content = changes.content.map(|c| check_content(&c, &mut errors));
        errors.into_result()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> PostId {
        self.id
    }
}

fn validate_new(input: NewPost) -> DomainResult<(String, String)> {
    let mut errors = FieldErrors::new();
    let title = check_title(&input.title, &mut errors);
    let content = check_content(&input.content, &mut errors);
    errors.into_result()?;
    Ok((title, content))
}

fn check_title(raw: &str, errors: &mut FieldErrors) -> String {
    let title = raw.trim();
    if title.is_empty() {
        errors.add("title", "This field may not be blank.");
    } else if title.chars().count() > MAX_TITLE_LENGTH {
        errors.add(
            "title",
            format!("Ensure this field has no more than {MAX_TITLE_LENGTH} characters."),
        );
    }
    title.to_string()
}

fn check_content(raw: &str, errors: &mut FieldErrors) -> String {
    if raw.trim().is_empty() {
        errors.add("content", "This field may not be blank.");
    }
    raw.to_string()
}
