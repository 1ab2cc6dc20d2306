use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Rent,
    Sell,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Rent => "rent",
            ListingKind::Sell => "sell",
        }
    }

    /// Tolerant request-parameter parsing; `all` and anything unknown mean
    /// "no filter".
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "rent" => Some(ListingKind::Rent),
            "sell" => Some(ListingKind::Sell),
            _ => None,
        }
    }
}

impl Default for ListingKind {
    fn default() -> Self {
        ListingKind::Rent
    }
}

/// Stored listing status. The status shown in list views is derived, see
/// `listings::availability`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Rented,
    Maintenance,
}

impl Default for ListingStatus {
    fn default() -> Self {
        ListingStatus::Available
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    Available,
    Booked,
    Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

/// Price tiers; at least one of daily/weekly/monthly must be set on a
/// stored listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "DH".into()
}

impl Default for Price {
    fn default() -> Self {
        Self {
            daily: None,
            weekly: None,
            monthly: None,
            currency: default_currency(),
        }
    }
}

impl Price {
    pub fn has_any_tier(&self) -> bool {
        self.daily.is_some() || self.weekly.is_some() || self.monthly.is_some()
    }

    /// Price per day used for filtering and sorting: the daily tier when
    /// set, else monthly spread over 30 days, else 0.
    pub fn normalized_daily(&self) -> f64 {
        match (self.daily, self.monthly) {
            (Some(daily), _) => daily,
            (None, Some(monthly)) => monthly / 30.0,
            (None, None) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// A date range attached to a listing. `booked` periods covering the
/// current time make the listing show as rented.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPeriod {
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub status: PeriodStatus,
}

/// Listing document in the `properties` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<ObjectId>,
    #[serde(default)]
    pub availability: Vec<AvailabilityPeriod>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_daily_prefers_the_daily_tier() {
        let price = Price {
            daily: Some(120.0),
            weekly: None,
            monthly: Some(9000.0),
            currency: "DH".into(),
        };
        assert_eq!(price.normalized_daily(), 120.0);
    }

    #[test]
    fn normalized_daily_spreads_monthly_over_thirty_days() {
        let price = Price {
            monthly: Some(3000.0),
            ..Price::default()
        };
        assert_eq!(price.normalized_daily(), 100.0);
    }

    #[test]
    fn normalized_daily_defaults_to_zero() {
        assert_eq!(Price::default().normalized_daily(), 0.0);
    }

    #[test]
    fn document_uses_stored_field_names() {
        let listing = Listing {
            id: None,
            title: "Riad with patio".into(),
            description: "Two floors".into(),
            kind: ListingKind::Rent,
            location: Location {
                city: Some("Marrakech".into()),
                ..Location::default()
            },
            price: Price {
                daily: Some(80.0),
                ..Price::default()
            },
            images: vec![],
            features: vec![],
            amenities: vec!["WiFi".into()],
            status: ListingStatus::Available,
            manager: None,
            availability: vec![],
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };
        let doc = bson::to_document(&listing).expect("to document");
        assert_eq!(doc.get_str("type").unwrap(), "rent");
        assert!(doc.get_document("location").unwrap().get("city").is_some());
        assert!(doc.get("createdAt").is_some());

        let back: Listing = bson::from_document(doc).expect("from document");
        assert_eq!(back.kind, ListingKind::Rent);
        assert_eq!(back.price.currency, "DH");
    }
}
