use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{info, instrument};

use crate::auth::Session;
use crate::error::ApiError;
use crate::listings::availability::accepts_booking_now;
use crate::listings::dto::{ListingInput, ListingPatch, ListingView, ManagerInfo};
use crate::listings::model::Listing;
use crate::listings::query::{ListingParams, ListingQuery, ListingSelection};
use crate::state::AppState;

const FEATURED_LIMIT: usize = 6;

fn parse_listing_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id)
        .map_err(|_| ApiError::BadRequest("Invalid property ID format".into()))
}

fn parse_manager(input: &Option<String>) -> Result<Option<ObjectId>, ApiError> {
    match input.as_deref().filter(|m| !m.is_empty()) {
        Some(hex) => Ok(Some(ObjectId::parse_str(hex).map_err(|_| {
            ApiError::BadRequest("Invalid manager ID format".into())
        })?)),
        None => Ok(None),
    }
}

/// Joined manager name/email for every distinct manager id in the slice.
async fn manager_join(
    state: &AppState,
    listings: &[Listing],
) -> Result<HashMap<ObjectId, ManagerInfo>, ApiError> {
    let ids: Vec<ObjectId> = listings
        .iter()
        .filter_map(|l| l.manager)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let managers = state.users.find_by_ids(&ids).await?;
    Ok(managers
        .into_iter()
        .filter_map(|user| user.id.map(|id| (id, ManagerInfo::from_user(&user))))
        .collect())
}

fn views(listings: Vec<Listing>, managers: &HashMap<ObjectId, ManagerInfo>) -> Vec<ListingView> {
    let now = Utc::now();
    listings
        .into_iter()
        .map(|listing| {
            let manager = listing.manager.and_then(|id| managers.get(&id)).cloned();
            ListingView::build(listing, manager, now)
        })
        .collect()
}

#[instrument(skip(state))]
pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<Vec<ListingView>>, ApiError> {
    let query = ListingQuery::from_params(params);
    let listings = state.listings.list(&query.selection()).await?;
    let listings = query.apply(listings);
    let managers = manager_join(&state, &listings).await?;
    Ok(Json(views(listings, &managers)))
}

#[instrument(skip(state))]
pub async fn featured_listings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListingView>>, ApiError> {
    let now = Utc::now();
    let listings: Vec<Listing> = state
        .listings
        .list(&ListingSelection::default())
        .await?
        .into_iter()
        .filter(|l| accepts_booking_now(l.status, &l.availability, now))
        .take(FEATURED_LIMIT)
        .collect();
    let managers = manager_join(&state, &listings).await?;
    Ok(Json(views(listings, &managers)))
}

#[instrument(skip(state))]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListingView>, ApiError> {
    let id = parse_listing_id(&id)?;
    let listing = state
        .listings
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("Property"))?;
    let managers = manager_join(&state, std::slice::from_ref(&listing)).await?;
    let manager = listing.manager.and_then(|m| managers.get(&m)).cloned();
    let view = ListingView::build(listing, manager, Utc::now())
        .with_share_url(&state.config.public_base_url);
    Ok(Json(view))
}

#[instrument(skip(state, session, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<ListingInput>,
) -> Result<(StatusCode, Json<ListingView>), ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;

    // Back-office forms may omit the manager; the listing then belongs to
    // whoever created it.
    let manager = parse_manager(&payload.manager)?.or(Some(session.user_id));
    let listing = payload.into_listing(manager);
    let listing = state.listings.insert(listing).await?;

    info!(listing_id = ?listing.id, "listing created");
    let managers = manager_join(&state, std::slice::from_ref(&listing)).await?;
    let manager = listing.manager.and_then(|m| managers.get(&m)).cloned();
    Ok((
        StatusCode::CREATED,
        Json(ListingView::build(listing, manager, Utc::now())),
    ))
}

#[instrument(skip(state, _session, payload))]
pub async fn update_listing(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<String>,
    Json(payload): Json<ListingPatch>,
) -> Result<Json<ListingView>, ApiError> {
    let id = parse_listing_id(&id)?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let existing = state
        .listings
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("Property"))?;

    let manager = parse_manager(&payload.manager)?;
    let mut updated = payload.apply_to(existing);
    if let Some(manager) = manager {
        updated.manager = Some(manager);
    }
    let listing = state
        .listings
        .replace(id, updated)
        .await?
        .ok_or(ApiError::NotFound("Property"))?;

    info!(listing_id = %id, "listing updated");
    let managers = manager_join(&state, std::slice::from_ref(&listing)).await?;
    let manager = listing.manager.and_then(|m| managers.get(&m)).cloned();
    Ok(Json(ListingView::build(listing, manager, Utc::now())))
}

#[instrument(skip(state, _session))]
pub async fn delete_listing(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_listing_id(&id)?;
    if !state.listings.delete(id).await? {
        return Err(ApiError::NotFound("Property"));
    }
    info!(listing_id = %id, "listing deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}
