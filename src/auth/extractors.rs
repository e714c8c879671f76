use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;

use super::{
    claims::Claims,
    jwt::{TokenError, TokenIssuer},
};
use crate::error::AppError;

pub const TOKEN_COOKIE: &str = "Authorization";

/// Validated claims of the caller. Rejects with 401 when no valid token is presented.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

fn bearer_from_header(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
}

fn token_from_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenIssuer: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_from_header(&parts.headers)
            .filter(|t| !t.is_empty())
            .or_else(|| token_from_cookie(&parts.headers))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

        let issuer = TokenIssuer::from_ref(state);
        match issuer.validate(token) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(TokenError::Expired) => {
                warn!("expired token");
                Err(AppError::Unauthorized("token expired".into()))
            }
            Err(e) => {
                warn!(error = %e, "invalid token");
                Err(AppError::Unauthorized("invalid token".into()))
            }
        }
    }
}
