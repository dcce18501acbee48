use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::pagination::{Paginated, Pagination};

/// The envelope every successful request is answered with.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,

    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            pagination: None,
            status: StatusCode::OK,
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paginated(message: impl Into<String>, page: Paginated<T>) -> Self {
        let pagination = Pagination::from(&page);
        ApiResponse {
            pagination: Some(pagination),
            ..Self::ok(message, page.items)
        }
    }
}

impl ApiResponse<()> {
    /// A response carrying no payload, e.g. after a deletion.
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: None,
            pagination: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
