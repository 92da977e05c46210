//! Caller identity.
//!
//! Authentication itself lives outside this service: some middleware on the
//! deployment's router verifies the bearer token and inserts an [`AuthUser`]
//! into the request extensions (answering 401 itself when the token is bad).
//! Handlers only ever see the extension. A request that reaches a handler
//! without one means the middleware is missing, which is a deployment bug
//! and reported as a 500, never a 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use uuid::Uuid;

use crate::api::ErrorBody;

/// The authenticated caller, installed by the external auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Extractor handing handlers the caller's user id.
pub struct CallerId(pub Uuid);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthUser>() {
            Some(user) => Ok(CallerId(user.user_id)),
            None => {
                error!("caller identity missing from request extensions; is the auth middleware installed?");
                Err(crate::api::internal_error())
            }
        }
    }
}
