use serde::{Deserialize, Serialize};

/// JWT payload. Every field is required; a token missing one fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub iat: u64,    // issued at (unix seconds)
    pub exp: u64,    // expires at (unix seconds)
    pub iss: String,
    pub aud: String,
}
