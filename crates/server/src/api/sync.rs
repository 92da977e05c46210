//! Bulk synchronisation endpoints.
//!
//! `GET /items/sync` pulls the whole vault; an empty vault answers 204.
//! `POST /items/sync` pushes a batch of records across all four kinds and
//! acknowledges with 204; the first failing item aborts the batch.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aegis_core::entity::FileParams;

use super::bank_cards::{BankCardRequest, BankCardResponse};
use super::credentials::{CredentialRequest, CredentialResponse};
use super::error::sync_registry;
use super::files::{to_response, FileResponse};
use super::notes::{NoteRequest, NoteResponse};
use super::{bad_request, ApiResult, ErrorBody, VaultJson};
use crate::auth::CallerId;
use crate::state::AppState;
use crate::sync::{PushItem, SyncPush};

// ── Types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SyncResponse {
    pub user_id: Uuid,
    pub bank_cards: Vec<BankCardResponse>,
    pub credentials: Vec<CredentialResponse>,
    pub notes: Vec<NoteResponse>,
    pub files: Vec<FileResponse>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SyncBankCardItem {
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub card: BankCardRequest,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SyncCredentialItem {
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub credential: CredentialRequest,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SyncNoteItem {
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub note: NoteRequest,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SyncFileItem {
    pub id: Option<Uuid>,
    pub storage_key: String,
    #[serde(default)]
    pub description: String,
    /// Base64 content.
    pub data: String,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct SyncRequest {
    #[serde(default)]
    pub bank_cards: Vec<SyncBankCardItem>,
    #[serde(default)]
    pub credentials: Vec<SyncCredentialItem>,
    #[serde(default)]
    pub notes: Vec<SyncNoteItem>,
    #[serde(default)]
    pub files: Vec<SyncFileItem>,
}

impl SyncRequest {
    /// Decode into the service-level push batch. Undecodable file content is
    /// a binding failure, reported before any service work starts.
    fn into_push(self) -> Result<SyncPush, (StatusCode, Json<ErrorBody>)> {
        let mut files = Vec::with_capacity(self.files.len());
        for item in self.files {
            let data = BASE64.decode(&item.data).map_err(|_| bad_request())?;
            files.push(PushItem {
                id: item.id,
                params: FileParams {
                    storage_key: item.storage_key,
                    description: item.description,
                    data,
                },
            });
        }
        Ok(SyncPush {
            bank_cards: self
                .bank_cards
                .into_iter()
                .map(|item| PushItem {
                    id: item.id,
                    params: item.card.into_params(),
                })
                .collect(),
            credentials: self
                .credentials
                .into_iter()
                .map(|item| PushItem {
                    id: item.id,
                    params: item.credential.into_params(),
                })
                .collect(),
            notes: self
                .notes
                .into_iter()
                .map(|item| PushItem {
                    id: item.id,
                    params: item.note.into_params(),
                })
                .collect(),
            files,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────

/// Pull the whole vault
#[utoipa::path(
    get,
    path = "/items/sync",
    tag = "Sync",
    responses(
        (status = 200, description = "The vault", body = SyncResponse),
        (status = 204, description = "Empty vault"),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn pull(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
) -> ApiResult<Response> {
    let payload = state
        .sync
        .pull(user_id)
        .await
        .map_err(|e| sync_registry().respond(&e))?;

    if payload.bank_cards.is_empty()
        && payload.credentials.is_empty()
        && payload.notes.is_empty()
        && payload.files.is_empty()
    {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body = SyncResponse {
        user_id: payload.user_id,
        bank_cards: payload.bank_cards.into_iter().map(Into::into).collect(),
        credentials: payload.credentials.into_iter().map(Into::into).collect(),
        notes: payload.notes.into_iter().map(Into::into).collect(),
        files: payload
            .files
            .into_iter()
            .map(|f| to_response(f, false))
            .collect(),
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Push a batch across all kinds
#[utoipa::path(
    post,
    path = "/items/sync",
    tag = "Sync",
    request_body = SyncRequest,
    responses(
        (status = 204, description = "Batch stored"),
        (status = 400, description = "Validation failure", body = ErrorBody),
        (status = 403, description = "Ownership mismatch", body = ErrorBody),
        (status = 404, description = "Unknown record id", body = ErrorBody)
    )
)]
pub async fn push(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultJson(request): VaultJson<SyncRequest>,
) -> ApiResult<StatusCode> {
    let batch = request.into_push()?;
    state
        .sync
        .push(user_id, batch)
        .await
        .map_err(|e| sync_registry().respond(&e))?;
    Ok(StatusCode::NO_CONTENT)
}
