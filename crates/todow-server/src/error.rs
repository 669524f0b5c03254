//! API error handling
//!
//! Every failure a handler can produce funnels through [`ApiError`], and its
//! `IntoResponse` impl is the single place status codes are chosen.

use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use todow_core::StoreError;

/// Errors surfaced to HTTP clients
#[derive(Error, Debug)]
pub enum ApiError {
    /// Unsupported content type or undecodable add payload
    #[error("{0}")]
    BadRequest(String),

    /// Missing or wrong Basic credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// No route for this method and path
    #[error("404 page not found")]
    NotFound,

    /// Failure from the collection store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(
                StoreError::NoItems
                | StoreError::Corrupt(_)
                | StoreError::Encode(_)
                | StoreError::Storage(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}", self);
        }

        let body = format!("{}\n", self);
        match self {
            ApiError::Unauthorized => (status, [(WWW_AUTHENTICATE, "Basic")], body).into_response(),
            _ => (status, body).into_response(),
        }
    }
}
