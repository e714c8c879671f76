use serde::{Deserialize, Serialize};

/// Request body for signup. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for signin.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
}

impl SignInResponse {
    pub fn bearer(token: String) -> Self {
        Self {
            token,
            token_type: "bearer",
        }
    }
}
