//! Bank card endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aegis_core::{BankCard, BankCardParams, RecordKind};

use super::error::registry_for;
use super::{ApiResult, PushResponse, VaultJson, VaultPath};
use crate::auth::CallerId;
use crate::state::AppState;

// ── Types ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct BankCardRequest {
    pub card_number: String,
    pub card_holder: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    #[serde(default)]
    pub description: String,
}

impl BankCardRequest {
    pub(crate) fn into_params(self) -> BankCardParams {
        BankCardParams {
            card_number: self.card_number,
            card_holder: self.card_holder,
            expiry_month: self.expiry_month,
            expiry_year: self.expiry_year,
            cvv: self.cvv,
            description: self.description,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BankCardResponse {
    pub id: Uuid,
    pub card_number: String,
    pub card_holder: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl From<BankCard> for BankCardResponse {
    fn from(card: BankCard) -> Self {
        Self {
            id: card.id,
            card_number: card.card_number,
            card_holder: card.card_holder,
            expiry_month: card.expiry_month,
            expiry_year: card.expiry_year,
            cvv: card.cvv,
            description: card.description,
            updated_at: card.updated_at,
        }
    }
}

fn registry() -> super::Registry {
    registry_for(RecordKind::BankCard)
}

// ── Handlers ─────────────────────────────────────────────────────

/// List the caller's bank cards
#[utoipa::path(
    get,
    path = "/items/bankcards",
    tag = "Bank cards",
    responses(
        (status = 200, description = "Bank cards", body = Vec<BankCardResponse>),
        (status = 204, description = "No bank cards stored"),
        (status = 500, description = "Internal error", body = super::ErrorBody)
    )
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
) -> ApiResult<Response> {
    let cards = state
        .bank_cards
        .list(user_id)
        .await
        .map_err(|e| registry().respond(&e))?;
    if cards.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    let body: Vec<BankCardResponse> = cards.into_iter().map(Into::into).collect();
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Fetch one bank card
#[utoipa::path(
    get,
    path = "/items/bankcards/{id}",
    tag = "Bank cards",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "The bank card", body = BankCardResponse),
        (status = 404, description = "Not found", body = super::ErrorBody)
    )
)]
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultPath(id): VaultPath<Uuid>,
) -> ApiResult<Json<BankCardResponse>> {
    let card = state
        .bank_cards
        .pull(id, user_id)
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok(Json(card.into()))
}

/// Store a new bank card
#[utoipa::path(
    post,
    path = "/items/bankcards",
    tag = "Bank cards",
    request_body = BankCardRequest,
    responses(
        (status = 201, description = "Stored", body = PushResponse),
        (status = 400, description = "Validation failure", body = super::ErrorBody)
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultJson(request): VaultJson<BankCardRequest>,
) -> ApiResult<(StatusCode, Json<PushResponse>)> {
    let id = state
        .bank_cards
        .push(user_id, None, request.into_params())
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok((StatusCode::CREATED, Json(PushResponse { id })))
}

/// Update an existing bank card
#[utoipa::path(
    put,
    path = "/items/bankcards/{id}",
    tag = "Bank cards",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body = BankCardRequest,
    responses(
        (status = 201, description = "Updated", body = PushResponse),
        (status = 400, description = "Validation failure", body = super::ErrorBody),
        (status = 403, description = "Not the owner", body = super::ErrorBody),
        (status = 404, description = "Not found", body = super::ErrorBody)
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    VaultPath(id): VaultPath<Uuid>,
    VaultJson(request): VaultJson<BankCardRequest>,
) -> ApiResult<(StatusCode, Json<PushResponse>)> {
    let id = state
        .bank_cards
        .push(user_id, Some(id), request.into_params())
        .await
        .map_err(|e| registry().respond(&e))?;
    Ok((StatusCode::CREATED, Json(PushResponse { id })))
}
