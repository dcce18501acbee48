use axum::http::StatusCode;
use diesel_async::pooled_connection::deadpool::PoolError;

use crate::error::ApiRequestError;

pub mod comment;
pub mod models;
pub mod post;
pub mod routes;
pub mod store;
pub mod tree;
mod validation;

pub const POST_NOT_FOUND: &str = "Post not found";
pub const PARENT_NOT_FOUND: &str = "Parent comment not found";
pub const PARENT_ON_OTHER_POST: &str = "Parent comment must belong to the same post";

#[derive(thiserror::Error, Debug)]
pub enum BlogError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("A post with similar title already exists")]
    DuplicateSlug,

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Could not acquire a database connection: {0}")]
    Pool(#[from] PoolError),
}

impl BlogError {
    pub fn post_not_found(id: i32) -> Self {
        BlogError::NotFound(format!("Post with ID {id} not found"))
    }

    pub fn comment_not_found(id: i32) -> Self {
        BlogError::NotFound(format!("Comment with ID {id} not found"))
    }

    pub fn bad_request(message: &str) -> Self {
        BlogError::BadRequest(message.into())
    }
}

impl ApiRequestError for BlogError {
    fn status_code(&self) -> StatusCode {
        match self {
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::BadRequest(_) | BlogError::DuplicateSlug => StatusCode::BAD_REQUEST,
            BlogError::Database(_) | BlogError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            BlogError::NotFound(_) => "NOT_FOUND",
            BlogError::BadRequest(_) => "BAD_REQUEST",
            BlogError::DuplicateSlug => "DUPLICATE_SLUG",
            BlogError::Database(_) | BlogError::Pool(_) => "SERVER_ERR",
        }
    }
}
