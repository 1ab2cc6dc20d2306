use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use bson::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::SessionKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::model::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn set_cookie_headers(cookie: String) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let value = cookie
        .parse()
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("invalid cookie value")))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match state.users.find_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if let Some(id) = user.id {
        state.users.record_login(id, DateTime::now()).await?;
    }

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(&user)?;
    let headers = set_cookie_headers(keys.session_cookie(&token))?;

    info!(email = %user.email, "user logged in");
    Ok((
        headers,
        Json(AuthResponse {
            user: PublicUser::from_user(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::new(
        payload.email,
        hash,
        name,
        payload.role.unwrap_or_default(),
    );
    let user = state.users.insert(user).await?;

    info!(email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from_user(&user))))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<serde_json::Value>), ApiError> {
    let keys = SessionKeys::from_ref(&state);
    let headers = set_cookie_headers(keys.clear_cookie())?;
    Ok((headers, Json(serde_json::json!({ "message": "Logged out" }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validity() {
        assert!(is_valid_email("agent@example.com"));
        assert!(!is_valid_email("agent@example"));
        assert!(!is_valid_email("not an email"));
    }
}
