use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub jwt: JwtConfig,
    pub public_base_url: String,
    pub default_whatsapp_number: String,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongodb_uri = std::env::var("MONGODB_URI")?;
        let mongodb_db = std::env::var("MONGODB_DB").unwrap_or_else(|_| "darlist".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        let public_base_url =
            std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let default_whatsapp_number =
            std::env::var("DEFAULT_WHATSAPP_NUMBER").unwrap_or_else(|_| "212600000000".into());
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Ok(Self {
            mongodb_uri,
            mongodb_db,
            jwt,
            public_base_url,
            default_whatsapp_number,
            cookie_secure,
        })
    }
}
