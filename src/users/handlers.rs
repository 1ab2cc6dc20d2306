use axum::{extract::State, Json};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::password::hash_password;
use crate::auth::Session;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{MeResponse, SettingsRequest};
use crate::users::repo::UserSettingsPatch;

/// Numbers are edited without the country prefix and stored with it.
const COUNTRY_PREFIX: &str = "212";

fn is_valid_local_number(number: &str) -> bool {
    lazy_static! {
        static ref NUMBER_RE: Regex = Regex::new(r"^\d{9}$").unwrap();
    }
    NUMBER_RE.is_match(number)
}

#[instrument(skip(state, session))]
pub async fn get_me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let whatsapp_number = user
        .contact_number()
        .map(|n| n.strip_prefix(COUNTRY_PREFIX).unwrap_or(n).to_string())
        .unwrap_or_default();

    Ok(Json(MeResponse {
        name: user.name,
        email: user.email,
        whatsapp_number,
    }))
}

#[instrument(skip(state, session, payload))]
pub async fn update_settings(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SettingsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut patch = UserSettingsPatch::default();

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if !name.is_empty() {
            patch.name = Some(name);
        }
    }

    if let Some(password) = payload.password {
        if !password.is_empty() {
            patch.password_hash = Some(hash_password(&password)?);
        }
    }

    if let Some(number) = payload.whatsapp_number {
        if number.is_empty() {
            patch.whatsapp_number = Some(String::new());
        } else if is_valid_local_number(&number) {
            patch.whatsapp_number = Some(format!("{COUNTRY_PREFIX}{number}"));
        } else {
            warn!("rejected malformed whatsapp number");
            return Err(ApiError::BadRequest(
                "Invalid WhatsApp number format. It must be 9 digits.".into(),
            ));
        }
    }

    if patch.is_empty() {
        return Err(ApiError::BadRequest("No settings provided".into()));
    }

    if !state.users.update_settings(session.user_id, patch).await? {
        return Err(ApiError::NotFound("User"));
    }

    info!(user_id = %session.user_id, "settings updated");
    Ok(Json(
        serde_json::json!({ "message": "Settings updated successfully" }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_number_must_be_nine_digits() {
        assert!(is_valid_local_number("611222333"));
        assert!(!is_valid_local_number("61122233"));
        assert!(!is_valid_local_number("6112223334"));
        assert!(!is_valid_local_number("61a222333"));
        assert!(!is_valid_local_number("212611222333"));
    }
}
