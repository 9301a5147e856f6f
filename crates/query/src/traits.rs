use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use domain::{Comment, CommentId, PageFilter, Pagination, Selector, SortOrder, Thread};

/// The document-store operations the query engine is allowed to issue.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn count_comments(&self, selector: &Selector) -> Result<u64>;

    async fn find_comments(
        &self,
        selector: &Selector,
        order: SortOrder,
        page: Pagination,
    ) -> Result<Vec<Comment>>;

    /// One grouped query for the whole batch, keyed by parent id.
    async fn count_replies_by_parent(
        &self,
        parent_ids: &[CommentId],
    ) -> Result<HashMap<CommentId, u64>>;

    /// Top-level comments joined with their direct replies in one query,
    /// both newest-first.
    async fn find_threads(&self, filter: &PageFilter) -> Result<Vec<Thread>>;
}
