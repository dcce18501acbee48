use axum::{debug_handler, extract::State, http::StatusCode};

use crate::{
    App,
    blog::{
        models::blog_post::{BlogPost, PostSubmission},
        validation,
    },
    error::AppError,
    extract::Json,
    response::ApiResponse,
};

#[debug_handler]
pub async fn create_post(
    State(ctx): State<App>,
    Json(mut post): Json<PostSubmission>,
) -> Result<ApiResponse<BlogPost>, AppError> {
    post.validate().map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let post = ctx.posts.create(post).await?;

    Ok(ApiResponse::created("Post created successfully", post))
}

impl PostSubmission {
    fn validate(&mut self) -> Result<(), String> {
        validation::length("title", &mut self.title, 3, Some(200))?;
        validation::length("content", &mut self.content, 10, None)?;
        validation::length("author", &mut self.author, 2, Some(100))?;

        if let Some(tags) = self.tags.as_mut() {
            validation::tags(tags);
        }

        Ok(())
    }
}
