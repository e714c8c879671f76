use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::User;
use crate::error::AppError;

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UsersEnvelope {
    pub users: Vec<PublicUser>,
}

/// Request body for `PUT /v1/users/:id`. Username and email replace the stored values;
/// an absent or empty password keeps the current one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
}

/// Ids are positive and fit in 32 bits.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<u32>() {
        Ok(id) if id > 0 => Ok(i64::from(id)),
        _ => Err(AppError::InvalidId),
    }
}
