//! Rolling statistics derived from the event log.

use chrono::{DateTime, Duration, Local, Utc};
use sentinel_core::{DetectionEvent, PiiCategory};
use serde::{Deserialize, Serialize};

/// Derived statistics snapshot. Never stored; recomputed from the
/// event log on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Detection events recorded today (host-local calendar day)
    pub today: u64,
    /// Detection events recorded in the trailing 7 days
    pub week: u64,
    /// Detection events over the whole retained log
    pub total: u64,
    /// Matches summed across all retained events
    pub match_total: u64,
    /// Top categories by event membership, highest first.
    /// Capped at five entries; ties keep first-seen order.
    pub top_categories: Vec<(PiiCategory, u64)>,
}

/// How many categories the display breakdown keeps.
const TOP_CATEGORY_LIMIT: usize = 5;

/// Compute a snapshot over `events` as of `now`.
///
/// "Today" is the host-local calendar day; "week" is the trailing
/// 7 days from `now`, not the calendar week.
#[must_use]
pub fn compute(events: &[DetectionEvent], now: DateTime<Utc>) -> StatsSnapshot {
    let local_today = now.with_timezone(&Local).date_naive();
    let week_start = now - Duration::days(7);

    let mut today = 0u64;
    let mut week = 0u64;
    let mut match_total = 0u64;
    // First-seen order preserved for stable tie-breaking
    let mut categories: Vec<(PiiCategory, u64)> = Vec::new();

    for event in events {
        match_total += u64::from(event.match_count);

        let event_local = event.timestamp.with_timezone(&Local).date_naive();
        if event_local == local_today {
            today += 1;
        }
        if event.timestamp >= week_start {
            week += 1;
        }

        for category in &event.categories {
            match categories.iter_mut().find(|(c, _)| c == category) {
                Some((_, n)) => *n += 1,
                None => categories.push((*category, 1)),
            }
        }
    }

    // Stable sort by count only, so equal counts keep insertion order
    categories.sort_by(|a, b| b.1.cmp(&a.1));
    categories.truncate(TOP_CATEGORY_LIMIT);

    StatsSnapshot {
        today,
        week,
        total: events.len() as u64,
        match_total,
        top_categories: categories,
    }
}
