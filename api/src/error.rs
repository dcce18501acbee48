use std::collections::HashMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use diesel_async::pooled_connection::deadpool::PoolError;
use serde::Serialize;
use serde_json::Value;

use crate::blog::BlogError;

/// Errors caused by the request itself rather than by the server.
pub trait ApiRequestError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    fn code(&self) -> &'static str {
        "ERR"
    }
}

#[derive(Debug)]
pub enum ServerError {
    DatabaseError(diesel::result::Error),
    PoolError(PoolError),
}

impl Serialize for ServerError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;
        let message = match self {
            ServerError::DatabaseError(e) => e.to_string(),
            ServerError::PoolError(e) => e.to_string(),
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("message", &message)?;
        map.end()
    }
}

#[derive(Debug)]
pub enum AppError {
    ServerError {
        error: ServerError,

        #[cfg(debug_assertions)]
        backtrace: backtrace::Backtrace,
    },
    RequestError {
        message: String,
        status: StatusCode,
        code: &'static str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    success: bool,
    message: String,
    code: &'static str,

    #[cfg(debug_assertions)]
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_info: Option<HashMap<&'static str, Value>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, error_response) = match self {
            AppError::ServerError {
                error,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                tracing::error!(?error, "Request failed with a server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        success: false,
                        message: "Internal server error".into(),
                        code: "SERVER_ERR",
                        #[cfg(debug_assertions)]
                        debug_info: Some(HashMap::from([
                            (
                                "backtrace",
                                serde_json::to_value(filter_backtrace(&backtrace))
                                    .unwrap_or_default(),
                            ),
                            ("error", serde_json::to_value(&error).unwrap_or_default()),
                        ])),
                    },
                )
            }
            AppError::RequestError {
                message,
                status,
                code,
            } => (
                status,
                ErrorResponse {
                    success: false,
                    message,
                    code,
                    #[cfg(debug_assertions)]
                    debug_info: None,
                },
            ),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl AppError {
    fn server(error: ServerError) -> Self {
        AppError::ServerError {
            error,

            #[cfg(debug_assertions)]
            backtrace: backtrace::Backtrace::new(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestError { status, .. } => *status,
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        AppError::server(ServerError::DatabaseError(e))
    }
}

impl From<PoolError> for AppError {
    fn from(e: PoolError) -> Self {
        AppError::server(ServerError::PoolError(e))
    }
}

impl From<BlogError> for AppError {
    fn from(e: BlogError) -> Self {
        match e {
            BlogError::Database(e) => e.into(),
            BlogError::Pool(e) => e.into(),
            e => AppError::RequestError {
                message: e.to_string(),
                status: e.status_code(),
                code: e.code(),
            },
        }
    }
}

impl<S: Into<String>> From<(S, StatusCode)> for AppError {
    fn from((message, status): (S, StatusCode)) -> Self {
        AppError::RequestError {
            message: message.into(),
            status,
            code: "ERR",
        }
    }
}

#[cfg(debug_assertions)]
#[derive(Serialize, Debug)]
struct FrameInfo {
    name: String,
    loc: String,
}

#[cfg(debug_assertions)]
fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
    let mut frames_info: Vec<FrameInfo> = Vec::new();

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            if let (Some(name), Some(filename), Some(lineno)) = (
                symbol.name().map(|n| n.to_string()),
                symbol.filename(),
                symbol.lineno(),
            ) {
                if name.contains(MODULE_PREFIX) {
                    frames_info.push(FrameInfo {
                        name,
                        loc: format!("{}:{}", filename.display(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}
