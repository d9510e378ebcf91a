//! Bearer-token admin identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;

use crate::token::validate_access_token;

/// HMAC secret used to validate bearer tokens. Exposed to the extractor via `FromRef`.
#[derive(Clone)]
pub struct JwtSecret(pub Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authenticated administrator, taken from `Authorization: Bearer <jwt>`.
///
/// Returns 401 if the header is absent or the token fails validation,
/// 403 if the token is valid but lacks admin privileges.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub username: String,
}

impl<S> FromRequestParts<S> for AdminIdentity
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Values are extracted synchronously so the returned future is 'static.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_owned());

        let result = match bearer {
            None => Err(StatusCode::UNAUTHORIZED),
            Some(token) => match validate_access_token(&token, secret.as_str()) {
                Ok(info) if info.is_admin => Ok(Self {
                    username: info.username,
                }),
                Ok(info) => {
                    tracing::warn!(username = %info.username, "non-admin token rejected");
                    Err(StatusCode::FORBIDDEN)
                }
                Err(_) => Err(StatusCode::UNAUTHORIZED),
            },
        };

        async move { result }
    }
}
