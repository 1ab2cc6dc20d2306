use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use bson::oid::ObjectId;
use tracing::warn;

use crate::auth::session::{SessionKeys, SESSION_COOKIE};
use crate::error::ApiError;
use crate::users::model::Role;

/// The authenticated caller, extracted from the session cookie. Absence,
/// a bad signature, or expiry all reject with 401.
pub struct Session {
    pub user_id: ObjectId,
    pub email: String,
    pub role: Role,
}

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let token = parts
            .headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|header| cookie_value(header, SESSION_COOKIE))
            .ok_or(ApiError::Unauthorized)?;

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired session token");
            ApiError::Unauthorized
        })?;

        let user_id =
            ObjectId::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized)?;

        Ok(Session {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_session_cookie_among_others() {
        let header = "theme=dark; token=abc.def.ghi; locale=fr";
        assert_eq!(cookie_value(header, SESSION_COOKIE), Some("abc.def.ghi"));
    }

    #[test]
    fn ignores_cookies_with_a_matching_prefix() {
        let header = "tokenish=nope";
        assert_eq!(cookie_value(header, SESSION_COOKIE), None);
        assert_eq!(cookie_value("", SESSION_COOKIE), None);
    }
}
