use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Comment, CommentId, Viewer};
use crate::query::Pagination;

/// Legacy nested author object, duplicated from `author`/`gravatar` for old widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub gravatar: String,
}

/// Public-safe shape of a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: CommentId,
    pub author: String,
    pub gravatar: String,
    pub body: String,
    pub parent_id: Option<CommentId>,
    pub is_verified: bool,
    pub is_own: bool,
    pub created_at: DateTime<Utc>,
    pub owner: Owner,
}

impl CommentView {
    pub fn project(c: &Comment, viewer: &Viewer) -> Self {
        Self {
            id: c.id.clone(),
            author: c.author.clone(),
            gravatar: c.gravatar.clone(),
            body: c.body.clone(),
            parent_id: c.parent_id.clone(),
            is_verified: c.is_verified,
            is_own: viewer.owns(c),
            created_at: c.created_at,
            owner: Owner {
                name: c.author.clone(),
                gravatar: c.gravatar.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLevelComment {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies_count: u64,
}

/// A top-level comment with its direct replies inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentTree {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub limit: u32,
    pub skip: u64,
    pub has_more: bool,
}

impl PageMeta {
    pub fn new(total: u64, page: Pagination, returned: usize) -> Self {
        Self {
            total,
            limit: page.limit(),
            skip: page.skip(),
            has_more: page.skip().saturating_add(returned as u64) < total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedComments {
    pub comments: Vec<TopLevelComment>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedReplies {
    pub replies: Vec<CommentView>,
    #[serde(flatten)]
    pub meta: PageMeta,
}
