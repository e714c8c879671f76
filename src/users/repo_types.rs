use std::fmt;

use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database. Never serialized; responses go through `PublicUser`.
#[derive(Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string
    pub created_at: OffsetDateTime,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Row to insert; `password_hash` is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Replacement values for an existing row. `None` keeps the stored hash.
#[derive(Clone)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
}
