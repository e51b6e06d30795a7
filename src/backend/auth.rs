//! Email/password accounts and cookie or bearer sessions.
//!
//! Every `/api` handler except signup and login takes a [`CurrentUser`], so an
//! unauthenticated request never reaches the query layer.

use axum::extract::{FromRequestParts, State};
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::info;
use uuid::Uuid;

use crate::backend::AppState;
use crate::database::db::queries::users;
use crate::database::models::User;
use crate::error::{AppError, Result};
use crate::util::now;

pub const SESSION_COOKIE: &str = "session";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user = users::find_session_user(&state.db, &token, now())
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            token,
        })
    }
}

/// Bearer token first, then the `session` cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Hex SHA-256 of `salt || password`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares the stored hex hash in constant time.
pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    hash_password(salt, password)
        .as_bytes()
        .ct_eq(expected_hash.as_bytes())
        .into()
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

async fn start_session(state: &AppState, user: User) -> Result<impl IntoResponse> {
    let token = Uuid::new_v4().simple().to_string();
    let created_at = now();
    let ttl = Duration::hours(state.config.session_ttl_hours);
    users::create_session(&state.db, &token, &user.id, created_at, created_at + ttl).await?;

    let cookie = session_cookie(&token, ttl.num_seconds());
    Ok(([(SET_COOKIE, cookie)], Json(SessionResponse { token, user })))
}

// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::validation("A valid email address is required"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let salt = Uuid::new_v4().simple().to_string();
    let hash = hash_password(&salt, &req.password);
    let display_name = req
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let user = users::create_user(
        &state.db,
        &Uuid::new_v4().to_string(),
        &email,
        display_name,
        &hash,
        &salt,
        now(),
    )
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict("Email is already registered".to_string()),
        other => other,
    })?;
    info!(user_id = %user.id, "user signed up");

    let session = start_session(&state, user).await?;
    Ok((StatusCode::CREATED, session))
}

// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let email = req.email.trim().to_lowercase();
    let (user, credentials) = users::find_credentials_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&credentials.password_salt, &req.password, &credentials.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let purged = users::delete_expired_sessions(&state.db, now()).await?;
    if purged > 0 {
        info!(purged, "expired sessions removed");
    }

    start_session(&state, user).await
}

// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> Result<impl IntoResponse> {
    users::delete_session(&state.db, &user.token).await?;
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, session_cookie("", 0))]))
}

// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<User>> {
    Ok(Json(users::get_user(&state.db, &user.id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn password_hash_depends_on_salt() {
        let a = hash_password("salt-a", "hunter22");
        let b = hash_password("salt-b", "hunter22");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("salt-a", "hunter22"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn verify_password_matches_only_the_stored_hash() {
        let stored = hash_password("salt-a", "hunter22");
        assert!(verify_password("salt-a", "hunter22", &stored));
        assert!(!verify_password("salt-a", "hunter23", &stored));
        assert!(!verify_password("salt-b", "hunter22", &stored));
        assert!(!verify_password("salt-a", "hunter22", &stored[..63]));
    }

    #[test]
    fn token_is_read_from_bearer_or_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=abc123"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn empty_cookie_is_not_a_session() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_token(&headers), None);
    }
}
