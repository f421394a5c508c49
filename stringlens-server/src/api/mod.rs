// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HTTP API handlers

pub mod health;
pub mod strings;

pub use health::health_check;
pub use strings::{strings_router, PropertiesView, RecordView};

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use stringlens_core::StringLensError;
use stringlens_query::{QueryError, StringEngine};

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<StringLensError> for ApiError {
    fn from(err: StringLensError) -> Self {
        let message = err.to_string();
        tracing::debug!(kind = err.kind(), "{}", message);
        match err {
            StringLensError::Validation(_) | StringLensError::Unparseable(_) => {
                ApiError::BadRequest(message)
            }
            StringLensError::NotFound(_) => ApiError::NotFound(message),
            StringLensError::Duplicate(_) => ApiError::Conflict(message),
            StringLensError::Conflict(_) => ApiError::Unprocessable(message),
            StringLensError::Internal(_) => ApiError::Internal(message),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        StringLensError::from(err).into()
    }
}

/// Fallback for paths no route matches, including `/strings/`
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<StringEngine>,
}

impl AppState {
    pub fn new(engine: StringEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
