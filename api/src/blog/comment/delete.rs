use axum::{debug_handler, extract::State};

use crate::{App, error::AppError, extract::Path, response::ApiResponse};

#[debug_handler]
pub async fn delete_comment(
    State(ctx): State<App>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, AppError> {
    let removed = ctx.comments.remove(id).await?;
    tracing::info!(id, removed, "Deleted comment");

    Ok(ApiResponse::message("Comment deleted successfully"))
}
