use std::sync::RwLock;

use axum::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use mongodb::{Collection, Database};

use crate::listings::model::Listing;
use crate::listings::query::ListingSelection;

/// Storage abstraction over the `properties` collection.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert(&self, listing: Listing) -> anyhow::Result<Listing>;
    async fn get(&self, id: ObjectId) -> anyhow::Result<Option<Listing>>;
    /// All listings matching the selection, newest first.
    async fn list(&self, selection: &ListingSelection) -> anyhow::Result<Vec<Listing>>;
    /// Returns the stored listing, or None when `id` does not exist.
    async fn replace(&self, id: ObjectId, listing: Listing) -> anyhow::Result<Option<Listing>>;
    /// Returns false when `id` does not exist.
    async fn delete(&self, id: ObjectId) -> anyhow::Result<bool>;
}

pub struct MongoListingStore {
    collection: Collection<Listing>,
}

impl MongoListingStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Listing>("properties"),
        }
    }
}

#[async_trait]
impl ListingStore for MongoListingStore {
    async fn insert(&self, mut listing: Listing) -> anyhow::Result<Listing> {
        let result = self.collection.insert_one(&listing).await?;
        listing.id = result.inserted_id.as_object_id();
        Ok(listing)
    }

    async fn get(&self, id: ObjectId) -> anyhow::Result<Option<Listing>> {
        let listing = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(listing)
    }

    async fn list(&self, selection: &ListingSelection) -> anyhow::Result<Vec<Listing>> {
        use futures::stream::TryStreamExt;
        let cursor = self
            .collection
            .find(selection.filter_doc())
            .sort(doc! { "createdAt": -1 })
            .await?;
        let listings = cursor.try_collect().await?;
        Ok(listings)
    }

    async fn replace(&self, id: ObjectId, mut listing: Listing) -> anyhow::Result<Option<Listing>> {
        listing.id = Some(id);
        let result = self.collection.replace_one(doc! { "_id": id }, &listing).await?;
        if result.matched_count == 0 {
            return Ok(None);
        }
        Ok(Some(listing))
    }

    async fn delete(&self, id: ObjectId) -> anyhow::Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// In-memory store backing unit and router tests.
#[derive(Default)]
pub struct MemoryListingStore {
    listings: RwLock<Vec<Listing>>,
}

impl MemoryListingStore {
    fn lock(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, Vec<Listing>>> {
        self.listings
            .write()
            .map_err(|_| anyhow::anyhow!("listing store lock poisoned"))
    }

    fn selected(listing: &Listing, selection: &ListingSelection) -> bool {
        if let Some(kind) = selection.kind {
            if listing.kind != kind {
                return false;
            }
        }
        if let Some(city) = &selection.city {
            if listing.location.city.as_deref() != Some(city.as_str()) {
                return false;
            }
        }
        selection
            .amenities
            .iter()
            .all(|amenity| listing.amenities.contains(amenity))
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn insert(&self, mut listing: Listing) -> anyhow::Result<Listing> {
        listing.id = Some(ObjectId::new());
        self.lock()?.push(listing.clone());
        Ok(listing)
    }

    async fn get(&self, id: ObjectId) -> anyhow::Result<Option<Listing>> {
        Ok(self.lock()?.iter().find(|l| l.id == Some(id)).cloned())
    }

    async fn list(&self, selection: &ListingSelection) -> anyhow::Result<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .lock()?
            .iter()
            .filter(|l| Self::selected(l, selection))
            .cloned()
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    async fn replace(&self, id: ObjectId, mut listing: Listing) -> anyhow::Result<Option<Listing>> {
        let mut listings = self.lock()?;
        let Some(stored) = listings.iter_mut().find(|l| l.id == Some(id)) else {
            return Ok(None);
        };
        listing.id = Some(id);
        *stored = listing.clone();
        Ok(Some(listing))
    }

    async fn delete(&self, id: ObjectId) -> anyhow::Result<bool> {
        let mut listings = self.lock()?;
        let before = listings.len();
        listings.retain(|l| l.id != Some(id));
        Ok(listings.len() != before)
    }
}
