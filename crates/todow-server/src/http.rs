//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use todow_core::{Item, ItemId, NewItem};

use crate::error::ApiError;
use crate::AppState;

/// How an add request encodes the new item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddRequestKind {
    /// `application/json`, sent by the CLI; the client sets `Created`
    Json,
    /// `application/x-www-form-urlencoded`, sent by the web page
    Form,
}

impl AddRequestKind {
    /// Pick the request kind from the media type, ignoring parameters such
    /// as `charset`
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let media_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase());

        match media_type.as_deref() {
            Some("application/json") => Ok(Self::Json),
            Some("application/x-www-form-urlencoded") => Ok(Self::Form),
            _ => Err(ApiError::BadRequest("content type not supported".to_string())),
        }
    }
}

/// Decode a JSON add payload
pub fn decode_json_item(bytes: &[u8]) -> Result<NewItem, ApiError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::BadRequest(format!("unable to decode todo item: {}", e)))
}

/// Read the `body` field of a form post; a missing field is an empty body
pub fn decode_form_body(bytes: &[u8]) -> String {
    url::form_urlencoded::parse(bytes)
        .find(|(key, _)| key == "body")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// List all items as the stored JSON document
pub async fn all_items(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let bytes = state.with_store(|store| store.all_items()).await?;
    tracing::debug!("{}", String::from_utf8_lossy(&bytes));

    Ok(([(CONTENT_TYPE, "application/json")], bytes).into_response())
}

/// Add an item from a JSON or form-encoded body
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, ApiError> {
    let kind = AddRequestKind::from_headers(request.headers())?;
    let bytes = Bytes::from_request(request, &())
        .await
        .map_err(|e| ApiError::BadRequest(format!("unable to read request: {}", e.body_text())))?;

    let item = match kind {
        AddRequestKind::Json => decode_json_item(&bytes)?.into_item(Utc::now()),
        AddRequestKind::Form => Item::new(decode_form_body(&bytes), Utc::now()),
    };

    let item = state
        .with_store(move |store| {
            let mut item = item;
            store.add(&mut item)?;
            Ok(item)
        })
        .await?;
    tracing::info!(id = item.id, body = %item.body, "added item");

    Ok(match kind {
        AddRequestKind::Json => {
            (StatusCode::CREATED, format!("Added item #{}\n", item.id)).into_response()
        }
        AddRequestKind::Form => Redirect::to("/").into_response(),
    })
}

/// Remove an item
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<String, ApiError> {
    let id = path_id(id)?;
    state.with_store(move |store| store.remove(id)).await?;
    tracing::info!(id, "removed item");

    Ok(format!("Removed item #{}\n", id))
}

/// Mark an item complete
pub async fn complete_item(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<String, ApiError> {
    let id = path_id(id)?;
    state.with_store(move |store| store.complete(id)).await?;
    tracing::info!(id, "completed item");

    Ok(format!("Completed item #{}\n", id))
}

/// Fallback for unknown paths and methods
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// A segment that cannot even be decoded is an unknown route too
fn path_id(segment: Result<Path<String>, PathRejection>) -> Result<ItemId, ApiError> {
    let Path(segment) = segment.map_err(|_| ApiError::NotFound)?;
    parse_id(&segment)
}

/// A path ID must be all digits; anything else is treated as an unknown
/// route rather than a missing item.
fn parse_id(segment: &str) -> Result<ItemId, ApiError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    segment.parse().map_err(|_| ApiError::NotFound)
}
