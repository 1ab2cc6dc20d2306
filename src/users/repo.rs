use std::sync::RwLock;

use axum::async_trait;
use bson::oid::ObjectId;
use bson::{doc, DateTime};
use mongodb::{Collection, Database};

use crate::users::model::{Role, User};

/// Partial settings update; `whatsapp_number: Some("")` clears the number.
#[derive(Debug, Default, Clone)]
pub struct UserSettingsPatch {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub whatsapp_number: Option<String>,
}

impl UserSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none() && self.whatsapp_number.is_none()
    }
}

/// Storage abstraction over the `users` collection so handlers can be
/// exercised without a running database.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> anyhow::Result<User>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<User>>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> anyhow::Result<Vec<User>>;
    async fn find_first_by_role(&self, role: Role) -> anyhow::Result<Option<User>>;
    async fn earliest_created(&self) -> anyhow::Result<Option<User>>;
    async fn record_login(&self, id: ObjectId, at: DateTime) -> anyhow::Result<()>;
    /// Returns false when no user matches `id`.
    async fn update_settings(&self, id: ObjectId, patch: UserSettingsPatch)
        -> anyhow::Result<bool>;
}

pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>("users"),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, mut user: User) -> anyhow::Result<User> {
        let result = self.collection.insert_one(&user).await?;
        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> anyhow::Result<Vec<User>> {
        use futures::stream::TryStreamExt;
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        let users = cursor.try_collect().await?;
        Ok(users)
    }

    async fn find_first_by_role(&self, role: Role) -> anyhow::Result<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "role": role.as_str() })
            .await?;
        Ok(user)
    }

    async fn earliest_created(&self) -> anyhow::Result<Option<User>> {
        let user = self
            .collection
            .find_one(doc! {})
            .sort(doc! { "createdAt": 1 })
            .await?;
        Ok(user)
    }

    async fn record_login(&self, id: ObjectId, at: DateTime) -> anyhow::Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "lastLogin": at, "updatedAt": at } },
            )
            .await?;
        Ok(())
    }

    async fn update_settings(
        &self,
        id: ObjectId,
        patch: UserSettingsPatch,
    ) -> anyhow::Result<bool> {
        let mut set = doc! { "updatedAt": DateTime::now() };
        if let Some(name) = patch.name {
            set.insert("name", name);
        }
        if let Some(hash) = patch.password_hash {
            set.insert("password", hash);
        }
        if let Some(number) = patch.whatsapp_number {
            set.insert("whatsappNumber", number);
        }
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }
}

/// In-memory store backing unit and router tests.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    fn lock(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, Vec<User>>> {
        self.users
            .write()
            .map_err(|_| anyhow::anyhow!("user store lock poisoned"))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, mut user: User) -> anyhow::Result<User> {
        user.id = Some(ObjectId::new());
        self.lock()?.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.iter().find(|u| u.id == Some(id)).cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> anyhow::Result<Vec<User>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|u| u.id.map(|id| ids.contains(&id)).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn find_first_by_role(&self, role: Role) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.iter().find(|u| u.role == role).cloned())
    }

    async fn earliest_created(&self) -> anyhow::Result<Option<User>> {
        Ok(self
            .lock()?
            .iter()
            .min_by_key(|u| u.created_at)
            .cloned())
    }

    async fn record_login(&self, id: ObjectId, at: DateTime) -> anyhow::Result<()> {
        if let Some(user) = self.lock()?.iter_mut().find(|u| u.id == Some(id)) {
            user.last_login = Some(at);
            user.updated_at = at;
        }
        Ok(())
    }

    async fn update_settings(
        &self,
        id: ObjectId,
        patch: UserSettingsPatch,
    ) -> anyhow::Result<bool> {
        let mut users = self.lock()?;
        let Some(user) = users.iter_mut().find(|u| u.id == Some(id)) else {
            return Ok(false);
        };
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        if let Some(number) = patch.whatsapp_number {
            user.whatsapp_number = Some(number);
        }
        user.updated_at = DateTime::now();
        Ok(true)
    }
}
