use std::collections::HashMap;

use anyhow::Context;
use domain::{
    CommentId, CommentTree, CommentView, PageFilter, PageMeta, PagedComments, PagedReplies,
    Pagination, QueryError, Selector, SortOrder, TopLevelComment, Viewer,
};
use tracing::debug;

use crate::traits::CommentStore;

/// Read-only threaded comment queries over a [`CommentStore`].
///
/// Holds nothing but the store handle. Calls are independent and read-only.
#[derive(Clone)]
pub struct CommentQueryEngine<S> {
    store: S,
}

impl<S: CommentStore> CommentQueryEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One page of top-level comments, each with its reply count.
    ///
    /// Issues a count, a find, and (for a non-empty page) a single grouped
    /// reply-count query, no matter how many comments are on the page.
    pub async fn list_top_level_comments(
        &self,
        filter: &PageFilter,
        page: Pagination,
        order: SortOrder,
        viewer: &Viewer,
    ) -> Result<PagedComments, QueryError> {
        let selector = Selector::TopLevel(filter.clone());

        let total = self
            .store
            .count_comments(&selector)
            .await
            .context("listing top-level comments")?;
        let parents = self
            .store
            .find_comments(&selector, order, page)
            .await
            .context("listing top-level comments")?;

        let counts = if parents.is_empty() {
            HashMap::new()
        } else {
            let ids: Vec<CommentId> = parents.iter().map(|c| c.id.clone()).collect();
            self.store
                .count_replies_by_parent(&ids)
                .await
                .context("counting replies")?
        };

        let comments: Vec<TopLevelComment> = parents
            .iter()
            .map(|c| TopLevelComment {
                comment: CommentView::project(c, viewer),
                replies_count: counts.get(&c.id).copied().unwrap_or(0),
            })
            .collect();

        debug!(
            ?filter,
            ?order,
            total,
            returned = comments.len(),
            "Listed top-level comments"
        );

        let meta = PageMeta::new(total, page, comments.len());
        Ok(PagedComments { comments, meta })
    }

    /// One page of direct replies to `parent_id`, always oldest first.
    pub async fn list_replies(
        &self,
        parent_id: &CommentId,
        page: Pagination,
        viewer: &Viewer,
    ) -> Result<PagedReplies, QueryError> {
        let selector = Selector::RepliesTo(parent_id.clone());

        let total = self
            .store
            .count_comments(&selector)
            .await
            .context("listing replies")?;
        let replies: Vec<CommentView> = self
            .store
            .find_comments(&selector, SortOrder::Asc, page)
            .await
            .context("listing replies")?
            .iter()
            .map(|c| CommentView::project(c, viewer))
            .collect();

        debug!(%parent_id, total, returned = replies.len(), "Listed replies");

        let meta = PageMeta::new(total, page, replies.len());
        Ok(PagedReplies { replies, meta })
    }

    /// Legacy shape: every top-level comment newest-first with all of its
    /// direct replies inlined, fetched by a single join.
    pub async fn list_comments_with_embedded_replies(
        &self,
        filter: &PageFilter,
        viewer: &Viewer,
    ) -> Result<Vec<CommentTree>, QueryError> {
        let threads = self
            .store
            .find_threads(filter)
            .await
            .context("listing comment threads")?;

        let trees: Vec<CommentTree> = threads
            .iter()
            .map(|t| CommentTree {
                comment: CommentView::project(&t.parent, viewer),
                replies: t
                    .replies
                    .iter()
                    .map(|r| CommentView::project(r, viewer))
                    .collect(),
            })
            .collect();

        debug!(
            ?filter,
            threads = trees.len(),
            "Listed embedded comment trees"
        );
        Ok(trees)
    }
}
