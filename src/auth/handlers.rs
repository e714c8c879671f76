use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{SignInRequest, SignInResponse, SignUpRequest},
    extractors::TOKEN_COOKIE,
    jwt::IssuedToken,
    services::AuthService,
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::dto::UserEnvelope,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/signup", post(sign_up))
        .route("/v1/signin", post(sign_in))
}

/// Every route that accepts the cookie lives under this prefix.
const TOKEN_COOKIE_PATH: &str = "/v1";

/// `Set-Cookie` value carrying the token.
fn token_cookie(issued: &IssuedToken) -> AppResult<HeaderValue> {
    let cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly",
        TOKEN_COOKIE,
        issued.token,
        TOKEN_COOKIE_PATH,
        issued.ttl.whole_seconds()
    );
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))
}

#[instrument(skip(auth, payload))]
pub async fn sign_up(
    State(auth): State<AuthService>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let (user, token) = auth.sign_up(payload).await?;
    let cookie = token_cookie(&token)?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserEnvelope { user }),
    ))
}

#[instrument(skip(auth, payload))]
pub async fn sign_in(
    State(auth): State<AuthService>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let token = auth.sign_in(payload).await?;
    let cookie = token_cookie(&token)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse::bearer(token.token)),
    ))
}
