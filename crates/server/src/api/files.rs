//! File endpoints.
//!
//! Uploads are multipart: `storage_key` and `description` as form fields,
//! the content under a `data` file part. Downloads return the metadata with
//! the content base64-encoded in the JSON body; listings omit the content.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use aegis_core::entity::{FileParams, FileRecord};

use super::error::file_registry;
use super::{bad_request, ApiResult, ErrorBody, PushResponse, VaultPath};
use crate::auth::CallerId;
use crate::state::AppState;

// ── Types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FileResponse {
    pub id: Uuid,
    pub storage_key: String,
    pub hash_sum: String,
    pub description: String,
    /// Base64 content; present on single-file fetches only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn to_response(file: FileRecord, include_data: bool) -> FileResponse {
    let data = if include_data {
        Some(BASE64.encode(&file.data))
    } else {
        None
    };
    FileResponse {
        id: file.id,
        storage_key: file.storage_key,
        hash_sum: file.hash_sum,
        description: file.description,
        data,
        updated_at: file.updated_at,
    }
}

/// Pull `storage_key`, `description` and the `data` part out of a multipart
/// body. Missing parts come out empty and fail domain validation with the
/// precise message.
async fn read_file_form(
    multipart: &mut Multipart,
) -> Result<FileParams, (StatusCode, Json<ErrorBody>)> {
    let mut params = FileParams {
        storage_key: String::new(),
        description: String::new(),
        data: Vec::new(),
    };
    while let Some(field) = multipart.next_field().await.map_err(|_| bad_request())? {
        match field.name() {
            Some("storage_key") => {
                params.storage_key = field.text().await.map_err(|_| bad_request())?;
            }
            Some("description") => {
                params.description = field.text().await.map_err(|_| bad_request())?;
            }
            Some("data") => {
                params.data = field.bytes().await.map_err(|_| bad_request())?.to_vec();
            }
            _ => {}
        }
    }
    Ok(params)
}

// ── Handlers ─────────────────────────────────────────────────────

/// List the caller's files (metadata only)
#[utoipa::path(
    get,
    path = "/items/files",
    tag = "Files",
    responses(
        (status = 200, description = "File metadata", body = Vec<FileResponse>),
        (status = 204, description = "No files stored"),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
) -> ApiResult<Response> {
    let files = state
        .files
        .list(user_id)
        .await
        .map_err(|e| file_registry().respond(&e))?;
    if files.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let body: Vec<FileResponse> = files.into_iter().map(|f| to_response(f, false)).collect();
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Fetch one file with its content
#[utoipa::path(
    get,
    path = "/items/files/{id}",
    tag = "Files",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "The file", body = FileResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultPath(id): VaultPath<Uuid>,
) -> ApiResult<Json<FileResponse>> {
    let file = state
        .files
        .pull(id, user_id)
        .await
        .map_err(|e| file_registry().respond(&e))?;
    Ok(Json(to_response(file, true)))
}

/// Upload a new file
#[utoipa::path(
    post,
    path = "/items/files",
    tag = "Files",
    request_body(content_type = "multipart/form-data", description = "storage_key, description and data parts"),
    responses(
        (status = 201, description = "Stored", body = PushResponse),
        (status = 400, description = "Validation failure", body = ErrorBody)
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PushResponse>)> {
    let params = read_file_form(&mut multipart).await?;
    let id = state
        .files
        .push(user_id, None, params)
        .await
        .map_err(|e| file_registry().respond(&e))?;
    Ok((StatusCode::CREATED, Json(PushResponse { id })))
}

/// Replace an existing file
#[utoipa::path(
    put,
    path = "/items/files/{id}",
    tag = "Files",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body(content_type = "multipart/form-data", description = "storage_key, description and data parts"),
    responses(
        (status = 201, description = "Updated", body = PushResponse),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultPath(id): VaultPath<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PushResponse>)> {
    let params = read_file_form(&mut multipart).await?;
    let id = state
        .files
        .push(user_id, Some(id), params)
        .await
        .map_err(|e| file_registry().respond(&e))?;
    Ok((StatusCode::CREATED, Json(PushResponse { id })))
}
