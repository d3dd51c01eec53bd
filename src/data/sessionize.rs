//! Sessionize open-CFP API client
//!
//! This module provides functionality to fetch the list of open calls
//! for papers from the Sessionize universal API and flatten the nested
//! wire format into our `CfpRecord` rows.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::CfpRecord;

/// Endpoint for the Sessionize universal open-CFP feed
const SESSIONIZE_CFP_URL: &str = "https://sessionize.com/api/universal/open-cfps";

/// Header carrying the Sessionize API key
const API_KEY_HEADER: &str = "X-API-KEY";

/// Upper bound on a single upstream request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when constructing the client or fetching CFPs
#[derive(Debug, Error)]
pub enum SessionizeError {
    /// No API key was supplied at construction time
    #[error("Sessionize API key is missing or blank")]
    MissingApiKey,

    /// HTTP request failed (transport error or timeout)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Sessionize returned HTTP status {0}")]
    HttpStatus(StatusCode),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Source of CFP records, the seam the cache refreshes through.
///
/// Object-safe so tests can swap in counting or failing stand-ins for
/// the real API client.
pub trait CfpSource: Send + Sync {
    /// Fetches the full current set of open CFP records.
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<CfpRecord>, SessionizeError>>;
}

/// Client for fetching open CFPs from the Sessionize API
#[derive(Debug, Clone)]
pub struct SessionizeClient {
    client: Client,
    api_key: String,
}

impl SessionizeClient {
    /// Creates a new client with the given API key.
    ///
    /// # Errors
    /// Returns `SessionizeError::MissingApiKey` when the key is empty or
    /// blank; the client is unusable without one.
    pub fn new(api_key: impl Into<String>) -> Result<Self, SessionizeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SessionizeError::MissingApiKey);
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { client, api_key })
    }

    /// Fetches all currently open CFPs and maps them into flat records.
    ///
    /// Performs exactly one request; transport failures, non-success
    /// statuses, and undecodable bodies surface as errors. Entries
    /// without a website are dropped from the result. Unparseable
    /// optional fields on individual entries degrade to `None` and
    /// never fail the fetch.
    pub async fn fetch_open_cfps(&self) -> Result<Vec<CfpRecord>, SessionizeError> {
        let response = self
            .client
            .get(SESSIONIZE_CFP_URL)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionizeError::HttpStatus(status));
        }

        let text = response.text().await?;
        let entries: Vec<CfpWire> = serde_json::from_str(&text)?;

        Ok(map_entries(entries, Utc::now()))
    }
}

impl CfpSource for SessionizeClient {
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<CfpRecord>, SessionizeError>> {
        Box::pin(self.fetch_open_cfps())
    }
}

/// One CFP entry as Sessionize sends it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CfpWire {
    pub event_id: i32,
    pub name: Option<String>,
    pub organizer: Option<String>,
    pub website: Option<String>,
    pub cfp_link: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_test: bool,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub is_user_group: bool,
    #[serde(default)]
    pub is_paid: bool,
    pub expenses_covered: Option<ExpensesWire>,
    pub event_dates: Option<EventDatesWire>,
    pub cfp_dates: Option<CfpDatesWire>,
    pub timezone_json: Option<TimezoneWire>,
    pub time_zone_id: Option<i32>,
    pub location: Option<LocationWire>,
    pub links: Option<LinksWire>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub tags: Option<String>,
    pub topics: Option<String>,
    pub session_formats: Option<String>,
    pub categories: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpensesWire {
    #[serde(default)]
    pub conference_fee: bool,
    #[serde(default)]
    pub accommodation: bool,
    #[serde(default)]
    pub travel: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventDatesWire {
    pub start: Option<String>,
    pub end: Option<String>,
    pub all_dates: Option<Vec<String>>,
}

/// CFP window bounds; kept as strings on the wire so one malformed
/// timestamp degrades to `None` instead of failing the whole fetch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CfpDatesWire {
    pub start: Option<String>,
    pub end: Option<String>,
    pub start_utc: Option<String>,
    pub end_utc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TimezoneWire {
    pub iana: Option<String>,
    pub windows: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LocationWire {
    pub full: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinksWire {
    pub twitter: Option<String>,
    pub linked_in: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

/// Maps a fetched payload into flat records, dropping entries whose
/// website is absent or blank.
pub(crate) fn map_entries(entries: Vec<CfpWire>, fetched_at: DateTime<Utc>) -> Vec<CfpRecord> {
    entries
        .into_iter()
        .filter(|entry| {
            entry
                .website
                .as_deref()
                .is_some_and(|website| !website.trim().is_empty())
        })
        .map(|entry| flatten(entry, fetched_at))
        .collect()
}

/// Flattens one nested wire entry into a `CfpRecord`, with an explicit
/// default for every optional nested field.
pub(crate) fn flatten(entry: CfpWire, fetched_at: DateTime<Utc>) -> CfpRecord {
    let expenses = entry.expenses_covered;
    let event_dates = entry.event_dates;
    let cfp_dates = entry.cfp_dates;
    let timezone = entry.timezone_json;
    let location = entry.location;
    let links = entry.links;

    CfpRecord {
        event_id: entry.event_id,
        name: entry.name,
        organizer: entry.organizer,
        website: entry.website,
        cfp_link: entry.cfp_link,
        description: entry.description,
        is_test: entry.is_test,
        is_online: entry.is_online,
        is_user_group: entry.is_user_group,
        is_paid: entry.is_paid,
        conference_fee_covered: expenses.as_ref().map(|e| e.conference_fee).unwrap_or(false),
        accommodation_covered: expenses.as_ref().map(|e| e.accommodation).unwrap_or(false),
        travel_covered: expenses.as_ref().map(|e| e.travel).unwrap_or(false),
        event_start: event_dates
            .as_ref()
            .and_then(|d| d.start.as_deref())
            .and_then(parse_date_time),
        event_end: event_dates
            .as_ref()
            .and_then(|d| d.end.as_deref())
            .and_then(parse_date_time),
        event_all_dates: event_dates
            .as_ref()
            .and_then(|d| d.all_dates.as_ref())
            .map(|dates| dates.join(", ")),
        cfp_start: cfp_dates
            .as_ref()
            .and_then(|d| d.start.as_deref())
            .and_then(parse_date_time),
        cfp_end: cfp_dates
            .as_ref()
            .and_then(|d| d.end.as_deref())
            .and_then(parse_date_time),
        cfp_start_utc: cfp_dates
            .as_ref()
            .and_then(|d| d.start_utc.as_deref())
            .and_then(parse_date_time),
        cfp_end_utc: cfp_dates
            .as_ref()
            .and_then(|d| d.end_utc.as_deref())
            .and_then(parse_date_time),
        timezone_iana: timezone.as_ref().and_then(|tz| tz.iana.clone()),
        timezone_windows: timezone.as_ref().and_then(|tz| tz.windows.clone()),
        time_zone_id: entry.time_zone_id,
        location_full: location.as_ref().and_then(|l| l.full.clone()),
        location_city: location.as_ref().and_then(|l| l.city.clone()),
        location_state: location.as_ref().and_then(|l| l.state.clone()),
        location_country: location.as_ref().and_then(|l| l.country.clone()),
        location_coordinates: location.as_ref().and_then(|l| l.coordinates.clone()),
        country: entry.country,
        country_code: entry.country_code,
        city: entry.city,
        tags: entry.tags,
        topics: entry.topics,
        session_formats: entry.session_formats,
        categories: entry.categories,
        last_updated: fetched_at,
        links_twitter: links.as_ref().and_then(|l| l.twitter.clone()),
        links_linkedin: links.as_ref().and_then(|l| l.linked_in.clone()),
        links_facebook: links.as_ref().and_then(|l| l.facebook.clone()),
        links_instagram: links.as_ref().and_then(|l| l.instagram.clone()),
    }
}

/// Parses an upstream date string leniently.
///
/// Sessionize mixes full ISO timestamps (with or without fractional
/// seconds or a UTC offset) and bare dates; anything unrecognized
/// yields `None`.
fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wire_from_json(json: &str) -> CfpWire {
        serde_json::from_str(json).expect("wire entry should deserialize")
    }

    fn full_entry_json() -> &'static str {
        r#"{
            "eventId": 42,
            "name": "RustConf",
            "organizer": "Rust Foundation",
            "website": "https://rustconf.com",
            "cfpLink": "https://sessionize.com/rustconf",
            "description": "The Rust conference",
            "isTest": false,
            "isOnline": true,
            "isUserGroup": false,
            "isPaid": true,
            "expensesCovered": {
                "conferenceFee": true,
                "accommodation": false,
                "travel": true
            },
            "eventDates": {
                "start": "2024-09-10",
                "end": "2024-09-12",
                "allDates": ["2024-09-10", "2024-09-11", "2024-09-12"]
            },
            "cfpDates": {
                "start": "2024-04-01T00:00:00",
                "end": "2024-05-15T23:59:59",
                "startUtc": "2024-04-01T07:00:00",
                "endUtc": "2024-05-16T06:59:59"
            },
            "timezoneJson": {
                "iana": "America/Los_Angeles",
                "windows": "Pacific Standard Time"
            },
            "timeZoneId": 7,
            "location": {
                "full": "Montreal, QC, Canada",
                "city": "Montreal",
                "state": "QC",
                "country": "Canada",
                "coordinates": "45.5019,-73.5674"
            },
            "links": {
                "twitter": "https://twitter.com/rustconf",
                "linkedIn": null,
                "facebook": null,
                "instagram": "https://instagram.com/rustconf"
            },
            "country": "Canada",
            "countryCode": "CA",
            "city": "Montreal",
            "tags": "rust, systems",
            "topics": "Rust, Compilers",
            "sessionFormats": "Talk, Workshop",
            "categories": "Programming"
        }"#
    }

    #[test]
    fn test_flatten_maps_every_nested_field() {
        let entry = wire_from_json(full_entry_json());
        let fetched_at = Utc::now();

        let record = flatten(entry, fetched_at);

        assert_eq!(record.event_id, 42);
        assert_eq!(record.name.as_deref(), Some("RustConf"));
        assert_eq!(record.organizer.as_deref(), Some("Rust Foundation"));
        assert_eq!(record.website.as_deref(), Some("https://rustconf.com"));
        assert!(record.is_online);
        assert!(record.is_paid);
        assert!(record.conference_fee_covered);
        assert!(!record.accommodation_covered);
        assert!(record.travel_covered);
        assert_eq!(
            record.event_start,
            NaiveDate::from_ymd_opt(2024, 9, 10).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(
            record.event_all_dates.as_deref(),
            Some("2024-09-10, 2024-09-11, 2024-09-12")
        );
        assert_eq!(
            record.cfp_end,
            NaiveDate::from_ymd_opt(2024, 5, 15).and_then(|d| d.and_hms_opt(23, 59, 59))
        );
        assert_eq!(
            record.cfp_start_utc,
            NaiveDate::from_ymd_opt(2024, 4, 1).and_then(|d| d.and_hms_opt(7, 0, 0))
        );
        assert_eq!(record.timezone_iana.as_deref(), Some("America/Los_Angeles"));
        assert_eq!(record.time_zone_id, Some(7));
        assert_eq!(record.location_full.as_deref(), Some("Montreal, QC, Canada"));
        assert_eq!(record.location_country.as_deref(), Some("Canada"));
        assert_eq!(record.country.as_deref(), Some("Canada"));
        assert_eq!(record.country_code.as_deref(), Some("CA"));
        assert_eq!(record.tags.as_deref(), Some("rust, systems"));
        assert_eq!(record.session_formats.as_deref(), Some("Talk, Workshop"));
        assert_eq!(record.last_updated, fetched_at);
        assert_eq!(
            record.links_twitter.as_deref(),
            Some("https://twitter.com/rustconf")
        );
        assert!(record.links_linkedin.is_none());
        assert_eq!(
            record.links_instagram.as_deref(),
            Some("https://instagram.com/rustconf")
        );
    }

    #[test]
    fn test_flatten_defaults_when_nested_objects_missing() {
        let entry = wire_from_json(r#"{"eventId": 7, "website": "https://x.dev"}"#);

        let record = flatten(entry, Utc::now());

        assert_eq!(record.event_id, 7);
        assert!(!record.is_test);
        assert!(!record.is_online);
        assert!(!record.conference_fee_covered);
        assert!(!record.accommodation_covered);
        assert!(!record.travel_covered);
        assert!(record.event_start.is_none());
        assert!(record.event_all_dates.is_none());
        assert!(record.cfp_start.is_none());
        assert!(record.timezone_iana.is_none());
        assert!(record.location_full.is_none());
        assert!(record.links_twitter.is_none());
    }

    #[test]
    fn test_flatten_degrades_bad_dates_to_none() {
        let entry = wire_from_json(
            r#"{
                "eventId": 9,
                "website": "https://x.dev",
                "eventDates": {"start": "sometime in spring", "end": null, "allDates": null},
                "cfpDates": {"start": "not-a-date", "end": "2024-05-15T23:59:59", "startUtc": null, "endUtc": ""}
            }"#,
        );

        let record = flatten(entry, Utc::now());

        assert!(record.event_start.is_none());
        assert!(record.event_end.is_none());
        assert!(record.cfp_start.is_none());
        assert!(record.cfp_end.is_some());
        assert!(record.cfp_start_utc.is_none());
        assert!(record.cfp_end_utc.is_none());
    }

    #[test]
    fn test_map_entries_drops_blank_websites() {
        let entries = vec![
            wire_from_json(r#"{"eventId": 1, "website": "http://a.com"}"#),
            wire_from_json(r#"{"eventId": 2, "website": null}"#),
            wire_from_json(r#"{"eventId": 3, "website": "   "}"#),
            wire_from_json(r#"{"eventId": 4}"#),
        ];

        let records = map_entries(entries, Utc::now());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_id, 1);
    }

    #[test]
    fn test_map_entries_preserves_order() {
        let entries = vec![
            wire_from_json(r#"{"eventId": 3, "website": "http://c.com"}"#),
            wire_from_json(r#"{"eventId": 1, "website": "http://a.com"}"#),
            wire_from_json(r#"{"eventId": 2, "website": "http://b.com"}"#),
        ];

        let ids: Vec<i32> = map_entries(entries, Utc::now())
            .iter()
            .map(|r| r.event_id)
            .collect();

        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_parse_date_time_formats() {
        assert_eq!(
            parse_date_time("2024-04-01T09:30:00"),
            NaiveDate::from_ymd_opt(2024, 4, 1).and_then(|d| d.and_hms_opt(9, 30, 0))
        );
        assert_eq!(
            parse_date_time("2024-04-01T09:30:00.123"),
            NaiveDate::from_ymd_opt(2024, 4, 1)
                .and_then(|d| d.and_hms_milli_opt(9, 30, 0, 123))
        );
        assert_eq!(
            parse_date_time("2024-04-01"),
            NaiveDate::from_ymd_opt(2024, 4, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert!(parse_date_time("2024-04-01T09:30:00Z").is_some());
        assert!(parse_date_time("next tuesday").is_none());
        assert!(parse_date_time("").is_none());
    }

    #[test]
    fn test_mapped_payload_through_open_filter() {
        use crate::query::{self, SortKey};

        let entries = vec![
            wire_from_json(
                r#"{
                    "eventId": 1,
                    "website": "http://a.com",
                    "cfpDates": {"start": "2024-01-01T00:00:00", "end": "2024-12-31T23:59:59"}
                }"#,
            ),
            wire_from_json(
                r#"{
                    "eventId": 2,
                    "website": null,
                    "cfpDates": {"start": "2024-01-01T00:00:00", "end": "2024-12-31T23:59:59"}
                }"#,
            ),
        ];

        let records = map_entries(entries, Utc::now());
        assert_eq!(records.len(), 1, "the website-less entry is dropped");

        let during = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let open = query::search_at(&records, "", true, SortKey::CfpEndDate, true, during);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].event_id, 1);

        let closed = query::search_at(&records, "", true, SortKey::CfpEndDate, true, after);
        assert!(closed.is_empty());
    }

    #[test]
    fn test_client_rejects_blank_api_key() {
        assert!(matches!(
            SessionizeClient::new(""),
            Err(SessionizeError::MissingApiKey)
        ));
        assert!(matches!(
            SessionizeClient::new("   "),
            Err(SessionizeError::MissingApiKey)
        ));
    }

    #[test]
    fn test_client_accepts_real_key() {
        assert!(SessionizeClient::new("secret-key").is_ok());
    }
}
