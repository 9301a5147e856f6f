use axum::{
    extract::{Path, State},
    Json,
};
use domain::{
    CommentId, CommentTree, PageFilter, PagedComments, PagedReplies, Pagination, SortOrder,
};
use serde::Deserialize;

use crate::{auth::CurrentViewer, error::ApiError, http::extract::QueryParams, state::Engine};

// Everything is read as a raw string so that bad numbers fall back to
// defaults instead of failing extraction. Repeated keys still fail it.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsParams {
    pub page_id: Option<String>,
    pub domain: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
    pub sort: Option<String>,
}

#[derive(Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub skip: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub page_id: Option<String>,
    pub domain: Option<String>,
}

pub async fn list_comments(
    State(engine): State<Engine>,
    CurrentViewer(viewer): CurrentViewer,
    QueryParams(params): QueryParams<ListCommentsParams>,
) -> Result<Json<PagedComments>, ApiError> {
    let filter = PageFilter::new(params.page_id.as_deref(), params.domain.as_deref())?;
    let page = Pagination::parse(params.limit.as_deref(), params.skip.as_deref());
    let order = SortOrder::parse(params.sort.as_deref());

    let result = engine
        .list_top_level_comments(&filter, page, order, &viewer)
        .await?;
    Ok(Json(result))
}

pub async fn list_replies(
    State(engine): State<Engine>,
    CurrentViewer(viewer): CurrentViewer,
    Path(comment_id): Path<String>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<PagedReplies>, ApiError> {
    let parent_id = CommentId::parse(&comment_id)?;
    let page = Pagination::parse(params.limit.as_deref(), params.skip.as_deref());

    let result = engine.list_replies(&parent_id, page, &viewer).await?;
    Ok(Json(result))
}

/// Older embed widgets expect a bare array with replies inlined.
pub async fn list_legacy_comments(
    State(engine): State<Engine>,
    CurrentViewer(viewer): CurrentViewer,
    QueryParams(params): QueryParams<FilterParams>,
) -> Result<Json<Vec<CommentTree>>, ApiError> {
    let filter = PageFilter::new(params.page_id.as_deref(), params.domain.as_deref())?;

    let trees = engine
        .list_comments_with_embedded_replies(&filter, &viewer)
        .await?;
    Ok(Json(trees))
}
