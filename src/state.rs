use std::sync::Arc;

use anyhow::Context;
use mongodb::Client;

use crate::config::{AppConfig, JwtConfig};
use crate::listings::repo::{ListingStore, MemoryListingStore, MongoListingStore};
use crate::users::repo::{MemoryUserStore, MongoUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub listings: Arc<dyn ListingStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let client = Client::with_uri_str(&config.mongodb_uri)
            .await
            .context("connect to mongodb")?;
        let db = client.database(&config.mongodb_db);

        Ok(Self {
            users: Arc::new(MongoUserStore::new(&db)),
            listings: Arc::new(MongoListingStore::new(&db)),
            config,
        })
    }

    /// State over in-memory stores, for tests.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            mongodb_uri: "mongodb://localhost:27017".into(),
            mongodb_db: "darlist-test".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_hours: 24,
            },
            public_base_url: "http://localhost:3000".into(),
            default_whatsapp_number: "212600000000".into(),
            cookie_secure: false,
        });
        Self {
            users: Arc::new(MemoryUserStore::default()),
            listings: Arc::new(MemoryListingStore::default()),
            config,
        }
    }
}
