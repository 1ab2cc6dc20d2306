use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{extract::State, Json, Router};
use serde_json::json;
use tracing::{debug, error, instrument};

use crate::state::AppState;
use crate::users::model::{Role, User};

/// Which tier of the fallback chain produced the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactTier {
    Admin,
    EarliestUser,
    Default,
}

#[derive(Debug, Clone)]
pub struct ResolvedContact {
    pub number: String,
    pub tier: ContactTier,
}

/// Three-tier WhatsApp number resolution: the admin's number when set,
/// else the earliest-created user's, else the configured default.
pub fn resolve_contact_number(
    admin: Option<&User>,
    earliest: Option<&User>,
    default_number: &str,
) -> ResolvedContact {
    if let Some(number) = admin.and_then(User::contact_number) {
        return ResolvedContact {
            number: number.to_string(),
            tier: ContactTier::Admin,
        };
    }
    if let Some(number) = earliest.and_then(User::contact_number) {
        return ResolvedContact {
            number: number.to_string(),
            tier: ContactTier::EarliestUser,
        };
    }
    ResolvedContact {
        number: default_number.to_string(),
        tier: ContactTier::Default,
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/contact-info", get(contact_info))
}

/// The contact button must keep working even when the store is down, so a
/// store failure still answers the default number.
#[instrument(skip(state))]
pub async fn contact_info(State(state): State<AppState>) -> Response {
    let lookups = async {
        let admin = state.users.find_first_by_role(Role::Admin).await?;
        let earliest = state.users.earliest_created().await?;
        anyhow::Ok((admin, earliest))
    }
    .await;

    match lookups {
        Ok((admin, earliest)) => {
            let resolved = resolve_contact_number(
                admin.as_ref(),
                earliest.as_ref(),
                &state.config.default_whatsapp_number,
            );
            debug!(tier = ?resolved.tier, "contact number resolved");
            Json(json!({ "whatsappNumber": resolved.number })).into_response()
        }
        Err(e) => {
            error!(error = %e, "contact info lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "Error fetching contact info",
                    "whatsappNumber": state.config.default_whatsapp_number,
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "212600000000";

    fn user(role: Role, number: Option<&str>) -> User {
        let mut user = User::new("u@example.com".into(), "hash".into(), "U".into(), role);
        user.whatsapp_number = number.map(str::to_string);
        user
    }

    #[test]
    fn admin_number_wins() {
        let admin = user(Role::Admin, Some("212611111111"));
        let earliest = user(Role::Manager, Some("212622222222"));
        let resolved = resolve_contact_number(Some(&admin), Some(&earliest), DEFAULT);
        assert_eq!(resolved.tier, ContactTier::Admin);
        assert_eq!(resolved.number, "212611111111");
    }

    #[test]
    fn admin_without_number_falls_through() {
        let admin = user(Role::Admin, None);
        let earliest = user(Role::Manager, Some("212622222222"));
        let resolved = resolve_contact_number(Some(&admin), Some(&earliest), DEFAULT);
        assert_eq!(resolved.tier, ContactTier::EarliestUser);
        assert_eq!(resolved.number, "212622222222");
    }

    #[test]
    fn cleared_numbers_do_not_count() {
        let admin = user(Role::Admin, Some(""));
        let earliest = user(Role::Manager, Some(""));
        let resolved = resolve_contact_number(Some(&admin), Some(&earliest), DEFAULT);
        assert_eq!(resolved.tier, ContactTier::Default);
        assert_eq!(resolved.number, DEFAULT);
    }

    #[test]
    fn empty_database_answers_the_default() {
        let resolved = resolve_contact_number(None, None, DEFAULT);
        assert_eq!(resolved.tier, ContactTier::Default);
        assert_eq!(resolved.number, DEFAULT);
    }
}
