use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    App,
    blog::tree::CommentTree,
    error::AppError,
    extract::{Path, Query},
    pagination::{Page, parse_flag},
    response::ApiResponse,
};

#[derive(Deserialize)]
pub struct Queries {
    page: Option<u32>,
    limit: Option<u32>,
    approved: Option<String>,
}

pub async fn get_comments(
    State(ctx): State<App>,
    Query(q): Query<Queries>,
) -> Result<ApiResponse<Vec<CommentTree>>, AppError> {
    let page = Page::new(q.page, q.limit).map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let comments = ctx
        .comments
        .find_all(page, parse_flag(q.approved.as_deref()))
        .await?;

    Ok(ApiResponse::paginated(
        "Comments retrieved successfully",
        comments.map(CommentTree::from),
    ))
}

pub async fn get_post_comments(
    State(ctx): State<App>,
    Path(post_id): Path<i32>,
) -> Result<ApiResponse<Vec<CommentTree>>, AppError> {
    let tree = ctx.comments.find_by_post(post_id).await?;

    Ok(ApiResponse::ok(
        format!("Comments for post {post_id} retrieved successfully"),
        tree,
    ))
}

pub async fn get_comments_by_author(
    State(ctx): State<App>,
    Path(author): Path<String>,
) -> Result<ApiResponse<Vec<CommentTree>>, AppError> {
    let comments = ctx.comments.find_by_author(&author).await?;

    Ok(ApiResponse::ok(
        format!("Comments by \"{author}\" retrieved successfully"),
        comments.into_iter().map(CommentTree::from).collect(),
    ))
}

pub async fn get_comment(
    State(ctx): State<App>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<CommentTree>, AppError> {
    let comment = ctx.comments.find_one(id).await?;
    Ok(ApiResponse::ok("Comment retrieved successfully", comment.into()))
}
