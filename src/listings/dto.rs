use bson::oid::ObjectId;
use bson::DateTime as BsonDateTime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listings::availability::effective_status;
use crate::listings::model::{
    AvailabilityPeriod, Listing, ListingImage, ListingKind, ListingStatus, Location,
    PeriodStatus, Price,
};
use crate::users::model::User;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPeriodInput {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: PeriodStatus,
}

/// Create/update payload for a listing. Image records carry URLs issued by
/// the upload service; this API stores them as-is.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingInput {
    pub title: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ListingKind,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub images: Vec<ListingImage>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub availability: Vec<AvailabilityPeriodInput>,
}

impl ListingInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".into());
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".into());
        }
        if !self.price.has_any_tier() {
            return Err("At least one price tier is required".into());
        }
        Ok(())
    }

    pub fn into_listing(self, manager: Option<ObjectId>) -> Listing {
        let now = BsonDateTime::now();
        Listing {
            id: None,
            title: self.title,
            description: self.description,
            kind: self.kind,
            location: self.location,
            price: self.price,
            images: self.images,
            features: self.features,
            amenities: self.amenities,
            status: self.status,
            manager,
            availability: self
                .availability
                .into_iter()
                .map(|period| AvailabilityPeriod {
                    start_date: BsonDateTime::from_chrono(period.start_date),
                    end_date: BsonDateTime::from_chrono(period.end_date),
                    status: period.status,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Update payload for a listing: a partial patch of top-level fields.
/// Absent fields keep their stored value; a provided field replaces the
/// stored one wholesale (sub-documents included).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ListingKind>,
    pub location: Option<Location>,
    pub price: Option<Price>,
    pub images: Option<Vec<ListingImage>>,
    pub features: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub status: Option<ListingStatus>,
    pub manager: Option<String>,
    pub availability: Option<Vec<AvailabilityPeriodInput>>,
}

impl ListingPatch {
    /// Provided fields must still be valid on their own.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("Title is required".into());
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err("Description is required".into());
            }
        }
        if let Some(price) = &self.price {
            if !price.has_any_tier() {
                return Err("At least one price tier is required".into());
            }
        }
        Ok(())
    }

    /// Overwrites only the supplied fields and stamps the update time.
    /// The manager reference is handled by the caller, which has to parse
    /// and authorize it.
    pub fn apply_to(self, mut listing: Listing) -> Listing {
        if let Some(title) = self.title {
            listing.title = title;
        }
        if let Some(description) = self.description {
            listing.description = description;
        }
        if let Some(kind) = self.kind {
            listing.kind = kind;
        }
        if let Some(location) = self.location {
            listing.location = location;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(images) = self.images {
            listing.images = images;
        }
        if let Some(features) = self.features {
            listing.features = features;
        }
        if let Some(amenities) = self.amenities {
            listing.amenities = amenities;
        }
        if let Some(status) = self.status {
            listing.status = status;
        }
        if let Some(availability) = self.availability {
            listing.availability = availability
                .into_iter()
                .map(|period| AvailabilityPeriod {
                    start_date: BsonDateTime::from_chrono(period.start_date),
                    end_date: BsonDateTime::from_chrono(period.end_date),
                    status: period.status,
                })
                .collect();
        }
        listing.updated_at = BsonDateTime::now();
        listing
    }
}

/// Manager contact shown alongside a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ManagerInfo {
    pub name: String,
    pub email: String,
}

impl ManagerInfo {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPeriodView {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: PeriodStatus,
}

/// Listing as served to clients: string id, RFC 3339 dates, the manager
/// joined in, and the derived display status next to the stored one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ListingKind,
    pub location: Location,
    pub price: Price,
    pub images: Vec<ListingImage>,
    pub features: Vec<String>,
    pub amenities: Vec<String>,
    pub status: ListingStatus,
    pub effective_status: ListingStatus,
    pub manager: Option<ManagerInfo>,
    pub availability: Vec<AvailabilityPeriodView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
}

impl ListingView {
    pub fn build(listing: Listing, manager: Option<ManagerInfo>, now: DateTime<Utc>) -> Self {
        let effective = effective_status(listing.status, &listing.availability, now);
        Self {
            id: listing.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: listing.title,
            description: listing.description,
            kind: listing.kind,
            location: listing.location,
            price: listing.price,
            images: listing.images,
            features: listing.features,
            amenities: listing.amenities,
            status: listing.status,
            effective_status: effective,
            manager,
            availability: listing
                .availability
                .into_iter()
                .map(|period| AvailabilityPeriodView {
                    start_date: period.start_date.to_chrono(),
                    end_date: period.end_date.to_chrono(),
                    status: period.status,
                })
                .collect(),
            created_at: listing.created_at.to_chrono(),
            updated_at: listing.updated_at.to_chrono(),
            share_url: None,
        }
    }

    pub fn with_share_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.share_url = Some(format!("{base}/properties/{}", self.id));
        self
    }
}
