//! Listing expiration policy.
//!
//! Pure classification over the authoritative `expires_at` timestamp. Both
//! the lazy sweep and the owner-facing status badge derive from this module;
//! nothing here touches the store.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Listings within this many minutes of expiry are reported as expiring soon.
pub const EXPIRING_SOON_THRESHOLD_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    ExpiringSoon,
    Expired,
}

/// Whole minutes until expiry, rounded up. Zero or negative means expired.
pub fn minutes_left(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (expires_at - now).num_milliseconds();
    if ms > 0 {
        (ms + 59_999) / 60_000
    } else {
        // Integer division truncates toward zero, which is ceil for
        // non-positive values.
        ms / 60_000
    }
}

/// Classify a listing by its remaining validity. Exhaustive and mutually
/// exclusive over the whole timeline.
pub fn classify(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> ListingStatus {
    let left = minutes_left(expires_at, now);
    if left <= 0 {
        ListingStatus::Expired
    } else if left <= EXPIRING_SOON_THRESHOLD_MINUTES {
        ListingStatus::ExpiringSoon
    } else {
        ListingStatus::Active
    }
}

/// True when the listing must be treated as lapsed regardless of the stored
/// `is_active` flag.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at <= now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(now: DateTime<Utc>, offset: Duration) -> DateTime<Utc> {
        now + offset
    }

    #[test]
    fn minutes_left_rounds_up() {
        let now = Utc::now();
        assert_eq!(minutes_left(at(now, Duration::seconds(1)), now), 1);
        assert_eq!(minutes_left(at(now, Duration::seconds(61)), now), 2);
        assert_eq!(minutes_left(at(now, Duration::minutes(10)), now), 10);
    }

    #[test]
    fn minutes_left_non_positive_when_lapsed() {
        let now = Utc::now();
        assert_eq!(minutes_left(now, now), 0);
        assert_eq!(minutes_left(at(now, Duration::seconds(-30)), now), 0);
        assert_eq!(minutes_left(at(now, Duration::minutes(-3)), now), -3);
    }

    #[test]
    fn classify_is_exhaustive_and_exclusive() {
        let now = Utc::now();
        let cases = [
            (Duration::minutes(-10), ListingStatus::Expired),
            (Duration::zero(), ListingStatus::Expired),
            (Duration::seconds(30), ListingStatus::ExpiringSoon),
            (Duration::minutes(5), ListingStatus::ExpiringSoon),
            (Duration::minutes(5) + Duration::seconds(1), ListingStatus::Active),
            (Duration::minutes(6), ListingStatus::Active),
            (Duration::minutes(10), ListingStatus::Active),
        ];
        for (offset, expected) in cases {
            assert_eq!(classify(at(now, offset), now), expected, "offset {:?}", offset);
        }
    }

    #[test]
    fn classify_boundary_between_soon_and_active() {
        let now = Utc::now();
        // Exactly 5 minutes left is still "expiring soon"; one millisecond
        // more rounds up to 6 and flips to active.
        assert_eq!(classify(at(now, Duration::minutes(5)), now), ListingStatus::ExpiringSoon);
        assert_eq!(
            classify(at(now, Duration::minutes(5) + Duration::milliseconds(1)), now),
            ListingStatus::Active
        );
    }

    #[test]
    fn expired_iff_minutes_left_non_positive() {
        let now = Utc::now();
        for secs in [-600, -1, 0, 1, 299, 300, 301, 3600] {
            let e = at(now, Duration::seconds(secs));
            let expired = classify(e, now) == ListingStatus::Expired;
            assert_eq!(expired, minutes_left(e, now) <= 0, "secs {}", secs);
        }
    }
}
