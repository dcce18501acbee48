use axum::{debug_handler, extract::State, http::StatusCode};

use crate::{
    App,
    blog::{
        models::blog_comment::CommentPatch,
        tree::CommentTree,
        validation,
    },
    error::AppError,
    extract::{Json, Path},
    response::ApiResponse,
};

#[debug_handler]
pub async fn patch_comment(
    State(ctx): State<App>,
    Path(id): Path<i32>,
    Json(mut comment): Json<CommentPatch>,
) -> Result<ApiResponse<CommentTree>, AppError> {
    comment
        .validate()
        .map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let comment = ctx.comments.update(id, comment).await?;

    Ok(ApiResponse::ok("Comment updated successfully", comment.into()))
}

pub async fn approve_comment(
    State(ctx): State<App>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<CommentTree>, AppError> {
    let comment = ctx.comments.approve(id).await?;
    tracing::info!(id, "Approved comment");

    Ok(ApiResponse::ok("Comment approved successfully", comment.into()))
}

pub async fn reject_comment(
    State(ctx): State<App>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<CommentTree>, AppError> {
    let comment = ctx.comments.reject(id).await?;
    tracing::info!(id, "Rejected comment");

    Ok(ApiResponse::ok("Comment rejected successfully", comment.into()))
}

impl CommentPatch {
    fn validate(&mut self) -> Result<(), String> {
        if let Some(content) = self.content.as_mut() {
            validation::length("content", content, 3, None)?;
        }
        if let Some(author) = self.author.as_mut() {
            validation::length("author", author, 2, Some(100))?;
        }
        if let Some(email) = self.email.as_mut() {
            validation::email(email)?;
        }

        Ok(())
    }
}
