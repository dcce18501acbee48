use axum::{debug_handler, extract::State, http::StatusCode};

use crate::{
    App,
    blog::{
        models::blog_comment::CommentSubmission,
        tree::CommentTree,
        validation,
    },
    error::AppError,
    extract::Json,
    response::ApiResponse,
};

#[debug_handler]
pub async fn create_comment(
    State(ctx): State<App>,
    Json(mut comment): Json<CommentSubmission>,
) -> Result<ApiResponse<CommentTree>, AppError> {
    comment
        .validate()
        .map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let comment = ctx.comments.create(comment).await?;

    Ok(ApiResponse::created("Comment created successfully", comment.into()))
}

impl CommentSubmission {
    fn validate(&mut self) -> Result<(), String> {
        validation::length("content", &mut self.content, 3, None)?;
        validation::length("author", &mut self.author, 2, Some(100))?;
        validation::email(&mut self.email)?;

        Ok(())
    }
}
