use chrono::{DateTime, Utc};

use crate::listings::model::{AvailabilityPeriod, ListingStatus, PeriodStatus};

/// Display status of a listing at `now`. Maintenance wins over everything;
/// otherwise a `booked` period covering `now` (bounds inclusive) makes the
/// listing rented; otherwise it is available. Every view that needs a
/// display status goes through this one function.
pub fn effective_status(
    stored: ListingStatus,
    periods: &[AvailabilityPeriod],
    now: DateTime<Utc>,
) -> ListingStatus {
    if stored == ListingStatus::Maintenance {
        return ListingStatus::Maintenance;
    }
    let rented_now = periods.iter().any(|period| {
        period.status == PeriodStatus::Booked
            && period.start_date.to_chrono() <= now
            && period.end_date.to_chrono() >= now
    });
    if rented_now {
        ListingStatus::Rented
    } else {
        ListingStatus::Available
    }
}

/// Whether the listing can take a booking right now: not under maintenance
/// and no booked or blocked period covering `now`. Backs the featured feed.
pub fn accepts_booking_now(
    stored: ListingStatus,
    periods: &[AvailabilityPeriod],
    now: DateTime<Utc>,
) -> bool {
    if stored == ListingStatus::Maintenance {
        return false;
    }
    !periods.iter().any(|period| {
        matches!(period.status, PeriodStatus::Booked | PeriodStatus::Blocked)
            && period.start_date.to_chrono() <= now
            && period.end_date.to_chrono() >= now
    })
}
