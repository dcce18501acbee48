use axum::extract::State;

use crate::{App, error::AppError, extract::Path, response::ApiResponse};

pub async fn delete_post(
    State(ctx): State<App>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, AppError> {
    ctx.posts.remove(id).await?;
    tracing::info!(id, "Deleted post");

    Ok(ApiResponse::message("Post deleted successfully"))
}
