//! Core data model for cfpwatch
//!
//! This module contains the flat CFP record type used throughout the
//! application, produced by the Sessionize mapping step and consumed by
//! the cache and query layers.

pub mod sessionize;

pub use sessionize::{CfpSource, SessionizeClient, SessionizeError};

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// One call-for-papers entry, flattened from the nested Sessionize wire
/// format into a single row.
///
/// Records are created only by the fetch mapping step and never mutated
/// afterwards; a refresh replaces the whole set. Every optional field
/// stays `None` when the upstream payload omits it or supplies a value
/// that cannot be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CfpRecord {
    /// External Sessionize event identifier (natural key for lookup)
    pub event_id: i32,
    /// Event name
    pub name: Option<String>,
    /// Organizing person or group
    pub organizer: Option<String>,
    /// Event website URL; records without one are dropped at fetch time
    pub website: Option<String>,
    /// Link to the CFP submission page
    pub cfp_link: Option<String>,
    /// Free-text event description
    pub description: Option<String>,
    /// Marked as a test event by the organizer
    pub is_test: bool,
    /// Event runs online
    pub is_online: bool,
    /// Event is a user group rather than a conference
    pub is_user_group: bool,
    /// Attendance is paid
    pub is_paid: bool,
    /// Organizer covers the conference fee for speakers
    pub conference_fee_covered: bool,
    /// Organizer covers speaker accommodation
    pub accommodation_covered: bool,
    /// Organizer covers speaker travel
    pub travel_covered: bool,
    /// Event start, parsed from a free-form date string
    pub event_start: Option<NaiveDateTime>,
    /// Event end, parsed from a free-form date string
    pub event_end: Option<NaiveDateTime>,
    /// All event dates joined in upstream order
    pub event_all_dates: Option<String>,
    /// CFP opens (event-local wall clock)
    pub cfp_start: Option<NaiveDateTime>,
    /// CFP closes (event-local wall clock)
    pub cfp_end: Option<NaiveDateTime>,
    /// CFP opens (UTC wall clock)
    pub cfp_start_utc: Option<NaiveDateTime>,
    /// CFP closes (UTC wall clock)
    pub cfp_end_utc: Option<NaiveDateTime>,
    /// IANA timezone name for the event
    pub timezone_iana: Option<String>,
    /// Windows timezone name for the event
    pub timezone_windows: Option<String>,
    /// Upstream timezone table id; no referential integrity enforced here
    pub time_zone_id: Option<i32>,
    /// Full location string ("Venue, City, Country")
    pub location_full: Option<String>,
    /// City component of the location
    pub location_city: Option<String>,
    /// State/province component of the location
    pub location_state: Option<String>,
    /// Country component of the location
    pub location_country: Option<String>,
    /// Latitude/longitude string for the location
    pub location_coordinates: Option<String>,
    /// Top-level country, populated independently of the location object
    pub country: Option<String>,
    /// ISO country code
    pub country_code: Option<String>,
    /// Top-level city, populated independently of the location object
    pub city: Option<String>,
    /// Comma-joined tag list, preserved as-is
    pub tags: Option<String>,
    /// Comma-joined topic list, preserved as-is
    pub topics: Option<String>,
    /// Comma-joined session format list, preserved as-is
    pub session_formats: Option<String>,
    /// Comma-joined category list, preserved as-is
    pub categories: Option<String>,
    /// When the record was mapped from the wire (observability only)
    pub last_updated: DateTime<Utc>,
    /// Twitter/X profile URL
    pub links_twitter: Option<String>,
    /// LinkedIn profile URL
    pub links_linkedin: Option<String>,
    /// Facebook page URL
    pub links_facebook: Option<String>,
    /// Instagram profile URL
    pub links_instagram: Option<String>,
}

/// Event spans longer than this many days are assumed to be online-only
/// listings rather than a single physical gathering.
const ONLINE_ONLY_DURATION_DAYS: i64 = 10;

impl CfpRecord {
    /// Whether the CFP submission window is open right now, judged on
    /// the local wall clock against the event-local CFP bounds.
    pub fn is_open(&self) -> bool {
        self.is_open_at(Local::now().naive_local())
    }

    /// Whether the CFP window contains `now`. Both bounds must be
    /// present; the comparison is inclusive on both ends.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        match (self.cfp_start, self.cfp_end) {
            (Some(start), Some(end)) => start <= now && now <= end,
            _ => false,
        }
    }

    /// Whether the event takes place in person.
    pub fn is_in_person(&self) -> bool {
        !self.is_online
    }

    /// Online event that also lists a physical location.
    pub fn is_hybrid(&self) -> bool {
        self.is_online
            && self
                .location_full
                .as_deref()
                .is_some_and(|full| !full.is_empty())
    }

    /// Whether the organizer covers the conference fee for speakers.
    pub fn is_free(&self) -> bool {
        self.conference_fee_covered
    }

    /// Heuristic: the event is likely online-only when it has no
    /// location at all, or when it spans more than ten days.
    pub fn is_likely_online_only(&self) -> bool {
        if self.location_full.is_none() {
            return true;
        }

        if let (Some(start), Some(end)) = (self.event_start, self.event_end) {
            if (end - start).num_days() > ONLINE_ONLY_DURATION_DAYS {
                return true;
            }
        }

        false
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::record;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_is_open_at_inside_window() {
        let mut r = record(1);
        r.cfp_start = Some(at(2024, 1, 1));
        r.cfp_end = Some(at(2024, 12, 31));

        assert!(r.is_open_at(at(2024, 6, 1)));
    }

    #[test]
    fn test_is_open_at_bounds_are_inclusive() {
        let mut r = record(1);
        r.cfp_start = Some(at(2024, 1, 1));
        r.cfp_end = Some(at(2024, 12, 31));

        assert!(r.is_open_at(at(2024, 1, 1)));
        assert!(r.is_open_at(at(2024, 12, 31)));
    }

    #[test]
    fn test_is_open_at_outside_window() {
        let mut r = record(1);
        r.cfp_start = Some(at(2024, 1, 1));
        r.cfp_end = Some(at(2024, 12, 31));

        assert!(!r.is_open_at(at(2025, 1, 1)));
        assert!(!r.is_open_at(at(2023, 12, 31)));
    }

    #[test]
    fn test_is_open_at_requires_both_bounds() {
        let mut r = record(1);
        r.cfp_start = Some(at(2024, 1, 1));
        assert!(!r.is_open_at(at(2024, 6, 1)));

        r.cfp_start = None;
        r.cfp_end = Some(at(2024, 12, 31));
        assert!(!r.is_open_at(at(2024, 6, 1)));
    }

    #[test]
    fn test_is_in_person_inverts_is_online() {
        let mut r = record(1);
        assert!(r.is_in_person());

        r.is_online = true;
        assert!(!r.is_in_person());
    }

    #[test]
    fn test_is_hybrid_requires_online_and_location() {
        let mut r = record(1);
        r.is_online = true;
        r.location_full = Some("Berlin, Germany".to_string());
        assert!(r.is_hybrid());

        r.is_online = false;
        assert!(!r.is_hybrid());

        r.is_online = true;
        r.location_full = None;
        assert!(!r.is_hybrid());

        r.location_full = Some(String::new());
        assert!(!r.is_hybrid());
    }

    #[test]
    fn test_is_free_follows_conference_fee_flag() {
        let mut r = record(1);
        assert!(!r.is_free());

        r.conference_fee_covered = true;
        assert!(r.is_free());
    }

    #[test]
    fn test_likely_online_only_when_location_missing() {
        let r = record(1);
        assert!(r.is_likely_online_only());
    }

    #[test]
    fn test_likely_online_only_when_event_spans_long() {
        let mut r = record(1);
        r.location_full = Some("Tokyo, Japan".to_string());
        r.event_start = Some(at(2024, 3, 1));
        r.event_end = Some(at(2024, 3, 20));

        assert!(r.is_likely_online_only());
    }

    #[test]
    fn test_not_online_only_for_short_located_event() {
        let mut r = record(1);
        r.location_full = Some("Tokyo, Japan".to_string());
        r.event_start = Some(at(2024, 3, 1));
        r.event_end = Some(at(2024, 3, 3));

        assert!(!r.is_likely_online_only());
    }

    #[test]
    fn test_ten_day_event_is_not_online_only() {
        let mut r = record(1);
        r.location_full = Some("Tokyo, Japan".to_string());
        r.event_start = Some(at(2024, 3, 1));
        r.event_end = Some(at(2024, 3, 11));

        assert!(!r.is_likely_online_only());
    }
}
