use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{SignInRequest, SignUpRequest},
    jwt::{IssuedToken, TokenIssuer},
    password::{hash_password, verify_password},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::{PublicUser, UpdateUserRequest},
        repo::{RepoError, UserRepository},
        repo_types::{NewUser, UserChanges},
    },
};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const PASSWORD_MAX: usize = 128;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    email.len() <= EMAIL_MAX && EMAIL_RE.is_match(email)
}

lazy_static! {
    /// Verified against when the email is unknown so both signin failures cost one Argon2 run.
    static ref DUMMY_HASH: Option<String> = hash_password("accounts-dummy-password").ok();
}

/// Builds the dummy hash at startup instead of on the first unknown-email signin.
pub fn prepare_dummy_hash() {
    lazy_static::initialize(&DUMMY_HASH);
}

fn burn_password_check(password: &str) {
    match DUMMY_HASH.as_deref() {
        Some(hash) => {
            let _ = verify_password(password, hash);
        }
        None => warn!("dummy password hash unavailable"),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_profile(username: &str, email: &str) -> AppResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AppError::validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if !is_valid_email(email) {
        return Err(AppError::validation("invalid email"));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() > PASSWORD_MAX {
        return Err(AppError::validation(format!(
            "password must be at most {PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

/// Signup, signin and credential-changing updates.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.tokens.clone())
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    pub async fn sign_up(&self, req: SignUpRequest) -> AppResult<(PublicUser, IssuedToken)> {
        let username = req.username.trim().to_string();
        let email = normalize_email(&req.email);
        if username.is_empty() || email.is_empty() || req.password.is_empty() {
            return Err(AppError::validation("please provide required details"));
        }
        validate_profile(&username, &email)?;
        validate_password(&req.password)?;

        let password_hash = hash_password(&req.password)?;
        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| {
                if matches!(e, RepoError::Conflict(_)) {
                    warn!("signup for an already registered email");
                }
                AppError::from(e)
            })?;

        let token = self.tokens.issue(user.id, &user.email)?;
        info!(user_id = user.id, "user registered");
        Ok((user.into(), token))
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn sign_in(&self, req: SignInRequest) -> AppResult<IssuedToken> {
        let email = normalize_email(&req.email);
        if email.is_empty() || req.password.is_empty() {
            return Err(AppError::validation("please provide valid credentials"));
        }

        let user = match self.users.find_by_email(&email).await {
            Ok(u) => u,
            Err(RepoError::NotFound) => {
                burn_password_check(&req.password);
                warn!("signin for unknown email");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = user.id, "signin with invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.email)?;
        info!(user_id = user.id, expires_at = %token.expires_at, "user signed in");
        Ok(token)
    }

    /// Replaces username and email; re-hashes the password only when one is supplied.
    pub async fn update_user(&self, id: i64, req: UpdateUserRequest) -> AppResult<PublicUser> {
        let username = req.username.trim().to_string();
        let email = normalize_email(&req.email);
        if username.is_empty() || email.is_empty() {
            return Err(AppError::validation("please provide required details"));
        }
        validate_profile(&username, &email)?;

        let password_hash = match req.password.as_deref() {
            Some(p) if !p.is_empty() => {
                validate_password(p)?;
                Some(hash_password(p)?)
            }
            _ => None,
        };
        let rehashed = password_hash.is_some();

        let user = self
            .users
            .update(
                id,
                UserChanges {
                    username,
                    email,
                    password_hash,
                },
            )
            .await?;
        info!(user_id = user.id, rehashed, "user updated");
        Ok(user.into())
    }
}
