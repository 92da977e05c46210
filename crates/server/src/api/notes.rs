//! Note endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aegis_core::{Note, NoteParams, RecordKind};

use super::error::registry_for;
use super::{ApiResult, PushResponse, VaultJson, VaultPath};
use crate::auth::CallerId;
use crate::state::AppState;

// ── Types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct NoteRequest {
    pub content: String,
    #[serde(default)]
    pub description: String,
}

impl NoteRequest {
    pub(crate) fn into_params(self) -> NoteParams {
        NoteParams {
            content: self.content,
            description: self.description,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NoteResponse {
    pub id: Uuid,
    pub content: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            content: note.content,
            description: note.description,
            updated_at: note.updated_at,
        }
    }
}

fn registry() -> super::Registry {
    registry_for(RecordKind::Note)
}

// ── Handlers ─────────────────────────────────────────────────────

/// List the caller's notes
#[utoipa::path(
    get,
    path = "/items/notes",
    tag = "Notes",
    responses(
        (status = 200, description = "Notes", body = Vec<NoteResponse>),
        (status = 204, description = "No notes stored"),
        (status = 500, description = "Internal error", body = super::ErrorBody)
    )
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
) -> ApiResult<Response> {
    let notes = state
        .notes
        .list(user_id)
        .await
        .map_err(|e| registry().respond(&e))?;
    if notes.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let body: Vec<NoteResponse> = notes.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Fetch one note
#[utoipa::path(
    get,
    path = "/items/notes/{id}",
    tag = "Notes",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "The note", body = NoteResponse),
        (status = 404, description = "Not found", body = super::ErrorBody)
    )
)]
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultPath(id): VaultPath<Uuid>,
) -> ApiResult<Json<NoteResponse>> {
    let note = state
        .notes
        .pull(id, user_id)
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok(Json(note.into()))
}

/// Store a new note
#[utoipa::path(
    post,
    path = "/items/notes",
    tag = "Notes",
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Stored", body = PushResponse),
        (status = 400, description = "Validation failure", body = super::ErrorBody)
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultJson(request): VaultJson<NoteRequest>,
) -> ApiResult<(StatusCode, Json<PushResponse>)> {
    let id = state
        .notes
        .push(user_id, None, request.into_params())
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok((StatusCode::CREATED, Json(PushResponse { id })))
}

/// Update an existing note
#[utoipa::path(
    put,
    path = "/items/notes/{id}",
    tag = "Notes",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Updated", body = PushResponse),
        (status = 403, description = "Not the owner", body = super::ErrorBody),
        (status = 404, description = "Not found", body = super::ErrorBody)
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultPath(id): VaultPath<Uuid>,
    VaultJson(request): VaultJson<NoteRequest>,
) -> ApiResult<(StatusCode, Json<PushResponse>)> {
    let id = state
        .notes
        .push(user_id, Some(id), request.into_params())
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok((StatusCode::CREATED, Json(PushResponse { id })))
}
