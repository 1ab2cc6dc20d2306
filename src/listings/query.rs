use std::cmp::Ordering;

use bson::{doc, Document};
use serde::Deserialize;

use crate::listings::model::{Listing, ListingKind};

/// Raw request parameters for `GET /api/properties`. Everything is optional
/// and arrives as text; parsing is tolerant by design, a malformed value
/// behaves as if the parameter were absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub city: Option<String>,
    pub amenities: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PriceLow,
    PriceHigh,
    Newest,
}

impl SortOrder {
    fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("price-low") => SortOrder::PriceLow,
            Some("price-high") => SortOrder::PriceHigh,
            _ => SortOrder::Newest,
        }
    }
}

/// The store-side part of a query: equality and amenity selection that the
/// collection can answer directly with one filter document.
#[derive(Debug, Default, Clone)]
pub struct ListingSelection {
    pub kind: Option<ListingKind>,
    pub city: Option<String>,
    pub amenities: Vec<String>,
}

impl ListingSelection {
    pub fn filter_doc(&self) -> Document {
        let mut filter = doc! {};
        if let Some(kind) = self.kind {
            filter.insert("type", kind.as_str());
        }
        if let Some(city) = &self.city {
            filter.insert("location.city", city.clone());
        }
        if !self.amenities.is_empty() {
            filter.insert("amenities", doc! { "$all": self.amenities.clone() });
        }
        filter
    }
}

/// Typed listing query. Selection fields are pushed down to the store;
/// search, the normalized-price window, and ordering are applied in
/// process so the whole contract stays unit-testable.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub kind: Option<ListingKind>,
    pub city: Option<String>,
    pub amenities: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub sort: SortOrder,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// "all" means no filter for type and city.
fn without_all(value: Option<String>) -> Option<String> {
    non_blank(value).filter(|v| v != "all")
}

fn parse_price(value: Option<String>) -> Option<f64> {
    non_blank(value).and_then(|v| v.parse::<f64>().ok())
}

impl ListingQuery {
    pub fn from_params(params: ListingParams) -> Self {
        let kind = without_all(params.kind)
            .as_deref()
            .and_then(ListingKind::from_param);
        let amenities = non_blank(params.amenities)
            .map(|list| {
                list.split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            search: non_blank(params.search),
            kind,
            city: without_all(params.city),
            amenities,
            price_min: parse_price(params.price_min),
            price_max: parse_price(params.price_max),
            sort: SortOrder::from_param(params.sort_by.as_deref()),
        }
    }

    pub fn selection(&self) -> ListingSelection {
        ListingSelection {
            kind: self.kind,
            city: self.city.clone(),
            amenities: self.amenities.clone(),
        }
    }

    /// The in-process half of the contract: free-text match on
    /// title/description and the normalized daily-price window.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = listing.title.to_lowercase().contains(&needle);
            let in_description = listing.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        let price = listing.price.normalized_daily();
        if let Some(min) = self.price_min {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if price > max {
                return false;
            }
        }
        true
    }

    /// Filters and orders a result set fetched with `selection()`.
    pub fn apply(&self, mut listings: Vec<Listing>) -> Vec<Listing> {
        listings.retain(|listing| self.matches(listing));
        match self.sort {
            SortOrder::PriceLow => listings.sort_by(|a, b| compare_price(a, b)),
            SortOrder::PriceHigh => listings.sort_by(|a, b| compare_price(b, a)),
            SortOrder::Newest => listings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        listings
    }
}

fn compare_price(a: &Listing, b: &Listing) -> Ordering {
    a.price
        .normalized_daily()
        .partial_cmp(&b.price.normalized_daily())
        .unwrap_or(Ordering::Equal)
}
