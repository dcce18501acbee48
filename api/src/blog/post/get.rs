use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    App,
    blog::models::blog_post::BlogPost,
    error::AppError,
    extract::{Path, Query},
    pagination::{Page, parse_flag},
    response::ApiResponse,
};

#[derive(Deserialize)]
pub struct Queries {
    page: Option<u32>,
    limit: Option<u32>,
    published: Option<String>,
}

pub async fn get_posts(
    State(ctx): State<App>,
    Query(q): Query<Queries>,
) -> Result<ApiResponse<Vec<BlogPost>>, AppError> {
    let page = Page::new(q.page, q.limit).map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let posts = ctx
        .posts
        .find_all(page, parse_flag(q.published.as_deref()))
        .await?;

    Ok(ApiResponse::paginated("Posts retrieved successfully", posts))
}

pub async fn get_post(
    State(ctx): State<App>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<BlogPost>, AppError> {
    let post = ctx.posts.find_one(id).await?;
    Ok(ApiResponse::ok("Post retrieved successfully", post))
}

pub async fn get_post_by_slug(
    State(ctx): State<App>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<BlogPost>, AppError> {
    let post = ctx.posts.find_by_slug(&slug).await?;
    Ok(ApiResponse::ok("Post retrieved successfully", post))
}

pub async fn get_posts_by_author(
    State(ctx): State<App>,
    Path(author): Path<String>,
) -> Result<ApiResponse<Vec<BlogPost>>, AppError> {
    let posts = ctx.posts.find_by_author(&author).await?;
    Ok(ApiResponse::ok(
        format!("Posts by \"{author}\" retrieved successfully"),
        posts,
    ))
}

pub async fn get_posts_by_tag(
    State(ctx): State<App>,
    Path(tag): Path<String>,
) -> Result<ApiResponse<Vec<BlogPost>>, AppError> {
    let posts = ctx.posts.find_by_tag(&tag).await?;
    Ok(ApiResponse::ok(
        format!("Posts tagged with \"{tag}\" retrieved successfully"),
        posts,
    ))
}
