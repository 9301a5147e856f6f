use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::{Comment, CommentId, PageFilter, Pagination, Selector, SortOrder, Thread};
use storage::Db;

use crate::traits::CommentStore;

#[async_trait]
impl CommentStore for Db {
    async fn count_comments(&self, selector: &Selector) -> Result<u64> {
        Db::count_comments(self, selector)
            .await
            .context("counting comments")
    }

    async fn find_comments(
        &self,
        selector: &Selector,
        order: SortOrder,
        page: Pagination,
    ) -> Result<Vec<Comment>> {
        Db::find_comments(self, selector, order, page)
            .await
            .context("finding comments")
    }

    async fn count_replies_by_parent(
        &self,
        parent_ids: &[CommentId],
    ) -> Result<HashMap<CommentId, u64>> {
        Db::count_replies_by_parent(self, parent_ids)
            .await
            .context("grouping reply counts")
    }

    async fn find_threads(&self, filter: &PageFilter) -> Result<Vec<Thread>> {
        Db::find_threads(self, filter)
            .await
            .context("joining comment threads")
    }
}
