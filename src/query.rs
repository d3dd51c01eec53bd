//! In-memory query pipeline over a CFP snapshot
//!
//! Pure functions: open-window filter, case-insensitive substring
//! search, and a stable multi-key sort with absent values ordered last.
//! Nothing here touches the cache; callers hand in whatever snapshot
//! they hold.

use std::cmp::Ordering;

use chrono::{Local, NaiveDateTime};

use crate::data::CfpRecord;

/// Sort key for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Lexicographic on the event name
    Name,
    /// CFP closing time (the default)
    CfpEndDate,
    /// CFP opening time
    CfpStartDate,
    /// Event start
    EventStartDate,
    /// Country sub-field of the location (not the top-level country)
    Country,
}

impl SortKey {
    /// Parses a sort key case-insensitively. Unrecognized strings fall
    /// back to `CfpEndDate`.
    pub fn parse(s: &str) -> SortKey {
        match s.to_lowercase().as_str() {
            "name" => SortKey::Name,
            "cfpstartdate" => SortKey::CfpStartDate,
            "eventstartdate" => SortKey::EventStartDate,
            "country" => SortKey::Country,
            _ => SortKey::CfpEndDate,
        }
    }

    /// Short label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::CfpEndDate => "cfp end",
            SortKey::CfpStartDate => "cfp start",
            SortKey::EventStartDate => "event start",
            SortKey::Country => "country",
        }
    }

    /// Next key in the UI cycling order.
    pub fn next(&self) -> SortKey {
        match self {
            SortKey::CfpEndDate => SortKey::CfpStartDate,
            SortKey::CfpStartDate => SortKey::EventStartDate,
            SortKey::EventStartDate => SortKey::Name,
            SortKey::Name => SortKey::Country,
            SortKey::Country => SortKey::CfpEndDate,
        }
    }
}

/// Searches a snapshot using the local wall clock for the open filter.
pub fn search(
    records: &[CfpRecord],
    term: &str,
    open_only: bool,
    sort: SortKey,
    ascending: bool,
) -> Vec<CfpRecord> {
    search_at(
        records,
        term,
        open_only,
        sort,
        ascending,
        Local::now().naive_local(),
    )
}

/// Searches a snapshot with an explicit `now` for the open filter.
///
/// The pipeline is eager: filter by open window, filter by search term,
/// then sort the materialized set. Input records are never mutated.
pub fn search_at(
    records: &[CfpRecord],
    term: &str,
    open_only: bool,
    sort: SortKey,
    ascending: bool,
    now: NaiveDateTime,
) -> Vec<CfpRecord> {
    let mut results: Vec<CfpRecord> = records
        .iter()
        .filter(|record| !open_only || record.is_open_at(now))
        .filter(|record| matches_term(record, term))
        .cloned()
        .collect();

    sort_records(&mut results, sort, ascending);
    results
}

/// Finds a record by its Sessionize event id.
///
/// The id is taken as text straight from user input; anything that does
/// not parse as an integer yields `None` rather than an error.
pub fn get_by_id<'a>(records: &'a [CfpRecord], id: &str) -> Option<&'a CfpRecord> {
    let id: i32 = id.trim().parse().ok()?;
    records.iter().find(|record| record.event_id == id)
}

/// Case-insensitive substring match over the searchable fields. A blank
/// term matches everything; absent fields are skipped.
fn matches_term(record: &CfpRecord, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();

    [
        record.name.as_deref(),
        record.location_full.as_deref(),
        record.country.as_deref(),
        record.city.as_deref(),
        record.topics.as_deref(),
        record.tags.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Stable sort by the chosen key. Records with an absent key value sort
/// after all records with a present one, in both directions.
fn sort_records(records: &mut [CfpRecord], sort: SortKey, ascending: bool) {
    match sort {
        SortKey::Name => records.sort_by(|a, b| {
            compare_absent_last(a.name.as_deref(), b.name.as_deref(), ascending)
        }),
        SortKey::CfpEndDate => {
            records.sort_by(|a, b| compare_absent_last(a.cfp_end, b.cfp_end, ascending))
        }
        SortKey::CfpStartDate => {
            records.sort_by(|a, b| compare_absent_last(a.cfp_start, b.cfp_start, ascending))
        }
        SortKey::EventStartDate => {
            records.sort_by(|a, b| compare_absent_last(a.event_start, b.event_start, ascending))
        }
        SortKey::Country => records.sort_by(|a, b| {
            compare_absent_last(
                a.location_country.as_deref(),
                b.location_country.as_deref(),
                ascending,
            )
        }),
    }
}

/// Compares two optional key values: absent after present regardless of
/// direction; present values compare normally, reversed when
/// descending.
fn compare_absent_last<T: Ord>(a: Option<T>, b: Option<T>, ascending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            if ascending {
                x.cmp(&y)
            } else {
                y.cmp(&x)
            }
        }
    }
}
