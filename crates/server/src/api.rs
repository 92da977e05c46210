//! HTTP surface: DTOs, handlers, and the error registry.
//!
//! Handlers all follow the same skeleton: caller identity from the request
//! extensions, bind, call the service, and on failure let the kind's
//! registry translate the error into the `{"messages": [...]}` envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub mod bank_cards;
pub mod credentials;
pub mod doc;
pub mod error;
pub mod files;
pub mod health;
pub mod notes;
pub mod sync;

pub use error::{ErrorBody, Registry};

/// What every fallible handler returns: a typed response or an enveloped
/// error.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

/// Body of a successful push.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PushResponse {
    pub id: Uuid,
}

/// The generic 400 envelope for binding failures. Details of why the body
/// failed to bind are not echoed back.
pub(crate) fn bad_request() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            messages: vec!["Bad Request".into()],
        }),
    )
}

pub(crate) fn internal_error() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            messages: vec!["Internal Server Error".into()],
        }),
    )
}

/// `axum::Json` with the rejection replaced by the standard envelope.
pub struct VaultJson<T>(pub T);

impl<S, T> FromRequest<S> for VaultJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|_: JsonRejection| bad_request())?;
        Ok(VaultJson(value))
    }
}

/// `axum::extract::Path` with the rejection replaced by the standard
/// envelope, so a malformed record id binds to the same 400 shape.
pub struct VaultPath<T>(pub T);

impl<S, T> FromRequestParts<S> for VaultPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| bad_request())?;
        Ok(VaultPath(value))
    }
}
