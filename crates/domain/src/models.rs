use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::QueryError;

const ID_BYTES: usize = 12;

/// External string form of a comment identifier: 24 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        if s.len() != ID_BYTES * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(QueryError::validation("Invalid comment ID"));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn new_unchecked(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored comment. Deliberately not `Serialize`: the only way out to a
/// client is through [`crate::CommentView`].
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    pub page_id: String,
    pub domain: String,
    pub page_url: String,
    pub author: String,
    pub email: String,
    pub gravatar: String,
    pub body: String,
    pub is_verified: bool,
    pub secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A top-level comment and its direct replies, as fetched by one join.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    pub parent: Comment,
    pub replies: Vec<Comment>,
}

/// Whoever issues the current read request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    email: Option<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self { email: None }
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        let email = email.into();
        if email.is_empty() {
            return Self::anonymous();
        }
        Self { email: Some(email) }
    }

    /// Exact, case-sensitive comparison against the stored email.
    pub fn owns(&self, comment: &Comment) -> bool {
        match &self.email {
            Some(email) => !email.is_empty() && *email == comment.email,
            None => false,
        }
    }
}
