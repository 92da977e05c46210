//! Credential endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aegis_core::{Credential, CredentialParams, RecordKind};

use super::error::registry_for;
use super::{ApiResult, PushResponse, VaultJson, VaultPath};
use crate::auth::CallerId;
use crate::state::AppState;

// ── Types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CredentialRequest {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub description: String,
}

impl CredentialRequest {
    pub(crate) fn into_params(self) -> CredentialParams {
        CredentialParams {
            login: self.login,
            password: self.password,
            description: self.description,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CredentialResponse {
    pub id: Uuid,
    pub login: String,
    pub password: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Credential> for CredentialResponse {
    fn from(credential: Credential) -> Self {
        Self {
            id: credential.id,
            login: credential.login,
            password: credential.password,
            description: credential.description,
            updated_at: credential.updated_at,
        }
    }
}

fn registry() -> super::Registry {
    registry_for(RecordKind::Credential)
}

// ── Handlers ─────────────────────────────────────────────────────

/// List the caller's credentials
#[utoipa::path(
    get,
    path = "/items/credentials",
    tag = "Credentials",
    responses(
        (status = 200, description = "Credentials", body = Vec<CredentialResponse>),
        (status = 204, description = "No credentials stored"),
        (status = 500, description = "Internal error", body = super::ErrorBody)
    )
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
) -> ApiResult<Response> {
    let credentials = state
        .credentials
        .list(user_id)
        .await
        .map_err(|e| registry().respond(&e))?;
    if credentials.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let body: Vec<CredentialResponse> = credentials.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Fetch one credential
#[utoipa::path(
    get,
    path = "/items/credentials/{id}",
    tag = "Credentials",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "The credential", body = CredentialResponse),
        (status = 404, description = "Not found", body = super::ErrorBody)
    )
)]
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultPath(id): VaultPath<Uuid>,
) -> ApiResult<Json<CredentialResponse>> {
    let credential = state
        .credentials
        .pull(id, user_id)
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok(Json(credential.into()))
}

/// Store a new credential
#[utoipa::path(
    post,
    path = "/items/credentials",
    tag = "Credentials",
    request_body = CredentialRequest,
    responses(
        (status = 201, description = "Stored", body = PushResponse),
        (status = 400, description = "Validation failure", body = super::ErrorBody)
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultJson(request): VaultJson<CredentialRequest>,
) -> ApiResult<(StatusCode, Json<PushResponse>)> {
    let id = state
        .credentials
        .push(user_id, None, request.into_params())
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok((StatusCode::CREATED, Json(PushResponse { id })))
}

/// Update an existing credential
#[utoipa::path(
    put,
    path = "/items/credentials/{id}",
    tag = "Credentials",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body = CredentialRequest,
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
    VaultJson(request): VaultJson<CredentialRequest>,
) -> ApiResult<(StatusCode, Json<PushResponse>)> {
    let id = state
        .credentials
        .push(user_id, Some(id), request.into_params())
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok((StatusCode::CREATED, Json(PushResponse { id })))
}
