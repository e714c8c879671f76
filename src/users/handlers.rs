use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{parse_id, PublicUser, UpdateUserRequest, UserEnvelope, UsersEnvelope};
use crate::{
    auth::{extractors::AuthUser, services::AuthService},
    error::AppResult,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users", get(list_users))
        .route(
            "/v1/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<UsersEnvelope>> {
    let users = state.users.find_all().await?;
    Ok(Json(UsersEnvelope {
        users: users.into_iter().map(PublicUser::from).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserEnvelope>> {
    let id = parse_id(&id)?;
    let user = state.users.find_by_id(id).await?;
    Ok(Json(UserEnvelope { user: user.into() }))
}

#[instrument(skip(auth, caller, payload), fields(caller_id = caller.0.user_id))]
pub async fn update_user(
    State(auth): State<AuthService>,
    caller: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserEnvelope>)> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let user = auth.update_user(id, payload).await?;
    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

#[instrument(skip(state, caller), fields(caller_id = caller.0.user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    state.users.delete(id).await?;
    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
