use axum::extract::FromRef;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::AppState;
use crate::users::model::{Role, User};

/// Name of the HTTP-only cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Session token payload: who is logged in, carried on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    cookie_secure: bool,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            ttl: Duration::hours(jwt.ttl_hours),
            cookie_secure: state.config.cookie_secure,
        }
    }
}

impl SessionKeys {
    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        let id = user.id.ok_or_else(|| anyhow::anyhow!("user has no id"))?;
        let now = Utc::now();
        let claims = Claims {
            sub: id.to_hex(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %claims.sub, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        debug!(user_id = %data.claims.sub, "session token verified");
        Ok(data.claims)
    }

    /// `Set-Cookie` value carrying the token for the token lifetime.
    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
            self.ttl.num_seconds()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that expires the session cookie.
    pub fn clear_cookie(&self) -> String {
        let mut cookie =
            format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    fn keys(secret: &str) -> SessionKeys {
        SessionKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(24),
            cookie_secure: false,
        }
    }

    fn user() -> User {
        let mut user = User::new(
            "agent@example.com".into(),
            "hash".into(),
            "Agent".into(),
            Role::Manager,
        );
        user.id = Some(ObjectId::new());
        user
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = keys("dev-secret");
        let user = user();
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user.id.unwrap().to_hex());
        assert_eq!(claims.email, "agent@example.com");
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = keys("secret-a").sign(&user()).expect("sign");
        assert!(keys("secret-b").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = keys("dev-secret");
        let now = Utc::now();
        let claims = Claims {
            sub: ObjectId::new().to_hex(),
            email: "old@example.com".into(),
            role: Role::Manager,
            iat: (now - Duration::hours(25)).timestamp() as usize,
            exp: (now - Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn unsigned_users_cannot_get_tokens() {
        let mut user = user();
        user.id = None;
        assert!(keys("dev-secret").sign(&user).is_err());
    }

    #[test]
    fn cookie_attributes() {
        let cookie = keys("dev-secret").session_cookie("abc");
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let mut secure = keys("dev-secret");
        secure.cookie_secure = true;
        assert!(secure.session_cookie("abc").ends_with("; Secure"));
        assert!(secure.clear_cookie().contains("Max-Age=0"));
    }
}
