use axum::{debug_handler, extract::State, http::StatusCode};

use crate::{
    App,
    blog::{
        models::blog_post::{BlogPost, PostPatch},
        validation,
    },
    error::AppError,
    extract::{Json, Path},
    response::ApiResponse,
};

#[debug_handler]
pub async fn patch_post(
    State(ctx): State<App>,
    Path(id): Path<i32>,
    Json(mut patch): Json<PostPatch>,
) -> Result<ApiResponse<BlogPost>, AppError> {
    patch.validate().map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let post = ctx.posts.update(id, patch).await?;

    Ok(ApiResponse::ok("Post updated successfully", post))
}

impl PostPatch {
    fn validate(&mut self) -> Result<(), String> {
        if let Some(title) = self.title.as_mut() {
            validation::length("title", title, 3, Some(200))?;
        }
        if let Some(content) = self.content.as_mut() {
            validation::length("content", content, 10, None)?;
        }
        if let Some(author) = self.author.as_mut() {
            validation::length("author", author, 2, Some(100))?;
        }
        if let Some(tags) = self.tags.as_mut() {
            validation::tags(tags);
        }

        Ok(())
    }
}
