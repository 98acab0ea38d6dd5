use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::error::PipelineError;

/// Request-level failures, each with a fixed status and machine-readable code.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no input data")]
    NoInput,

    #[error("query missing")]
    QueryMissing,

    #[error("invalid chat_history")]
    InvalidChatHistory,

    #[error("service unavailable")]
    Unavailable,

    #[error("processing error")]
    Processing(#[from] PipelineError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'static str>,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoInput | Self::QueryMissing | Self::InvalidChatHistory => {
                StatusCode::BAD_REQUEST
            }
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoInput => "no_input",
            Self::QueryMissing => "query_missing",
            Self::InvalidChatHistory => "invalid_chat_history",
            Self::Unavailable => "service_unavailable",
            Self::Processing(e) => e.code(),
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            Self::NoInput => ("no input data", None),
            Self::QueryMissing => ("query missing", None),
            Self::InvalidChatHistory => ("invalid chat_history", None),
            Self::Unavailable => ("service unavailable", None),
            Self::Processing(e) => ("processing error", Some(e.public_message())),
        };
        ErrorBody {
            error,
            code: self.code(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
