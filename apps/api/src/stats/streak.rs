//! Calendar-day arithmetic over the activity log: streaks, heatmap, weekly counts.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of logged activities per calendar day.
pub type ActivityCounts = BTreeMap<NaiveDate, u32>;

pub const HEATMAP_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub weekday: String,
    pub count: u32,
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 timestamps.
/// Timestamps are reduced to their UTC calendar day.
pub fn parse_activity_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    None
}

/// Folds raw log entries into per-day counts, skipping anything unparseable.
pub fn normalize_dates<S: AsRef<str>>(raw: &[S]) -> ActivityCounts {
    let mut counts = ActivityCounts::new();
    let mut skipped = 0usize;
    for entry in raw {
        match parse_activity_date(entry.as_ref()) {
            Some(day) => *counts.entry(day).or_insert(0) += 1,
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} unparseable activity log entries");
    }
    counts
}

/// Length of the run of consecutive active days ending on `day`.
pub fn streak_ending(counts: &ActivityCounts, day: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = Some(day);
    while let Some(d) = cursor {
        if !counts.contains_key(&d) {
            break;
        }
        streak += 1;
        cursor = d.pred_opt();
    }
    streak
}

/// 0 unless `today` itself is in the log.
pub fn current_streak(counts: &ActivityCounts, today: NaiveDate) -> u32 {
    streak_ending(counts, today)
}

pub fn longest_streak(counts: &ActivityCounts) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in counts.keys() {
        run = match prev {
            Some(p) if p.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(*day);
    }
    longest
}

pub fn heat_level(count: u32) -> u8 {
    match count {
        0 => 0,
        1 => 1,
        2..=3 => 2,
        4..=5 => 3,
        _ => 4,
    }
}

/// One cell per day for the `days` days ending on `today`, oldest first.
pub fn heatmap(counts: &ActivityCounts, today: NaiveDate, days: u32) -> Vec<HeatmapCell> {
    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset as i64)))
        .map(|date| {
            let count = counts.get(&date).copied().unwrap_or(0);
            HeatmapCell {
                date,
                count,
                level: heat_level(count),
            }
        })
        .collect()
}

/// Activity counts for the last seven days ending on `today`, oldest first.
pub fn weekly_activity(counts: &ActivityCounts, today: NaiveDate) -> Vec<DayCount> {
    heatmap(counts, today, 7)
        .into_iter()
        .map(|cell| DayCount {
            weekday: cell.date.format("%a").to_string(),
            date: cell.date,
            count: cell.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_streak_zero_when_today_missing() {
        let counts = normalize_dates(&["2024-05-08", "2024-05-09"]);
        assert_eq!(current_streak(&counts, day("2024-05-10")), 0);
    }

    #[test]
    fn test_streak_counts_trailing_consecutive_days() {
        let counts = normalize_dates(&[
            "2024-05-01",
            "2024-05-07",
            "2024-05-08",
            "2024-05-09",
            "2024-05-10",
        ]);
        assert_eq!(current_streak(&counts, day("2024-05-10")), 4);
    }

    #[test]
    fn test_streak_crosses_month_and_year_boundaries() {
        let counts = normalize_dates(&["2023-12-30", "2023-12-31", "2024-01-01"]);
        assert_eq!(current_streak(&counts, day("2024-01-01")), 3);
    }

    #[test]
    fn test_duplicates_and_timestamps_collapse_to_one_day() {
        let counts = normalize_dates(&[
            "2024-05-10",
            "2024-05-10T08:30:00Z",
            "2024-05-10T23:59:59+00:00",
            "2024-05-09 12:00:00",
            "garbage",
        ]);
        assert_eq!(counts.get(&day("2024-05-10")), Some(&3));
        assert_eq!(current_streak(&counts, day("2024-05-10")), 2);
    }

    #[test]
    fn test_timestamps_use_utc_calendar_day() {
        assert_eq!(
            parse_activity_date("2024-05-10T01:00:00+05:00"),
            Some(day("2024-05-09"))
        );
    }

    #[test]
    fn test_longest_streak() {
        let counts = normalize_dates(&[
            "2024-01-01",
            "2024-01-02",
            "2024-01-03",
            "2024-02-10",
            "2024-02-11",
        ]);
        assert_eq!(longest_streak(&counts), 3);
        assert_eq!(longest_streak(&ActivityCounts::new()), 0);
    }

    #[test]
    fn test_heatmap_window_and_levels() {
        let counts = normalize_dates(&[
            "2024-05-10",
            "2024-05-10",
            "2024-05-10",
            "2024-05-10",
            "2024-05-09",
            "2023-01-01",
        ]);
        let cells = heatmap(&counts, day("2024-05-10"), HEATMAP_DAYS);
        assert_eq!(cells.len(), HEATMAP_DAYS as usize);
        assert_eq!(cells.last().unwrap().date, day("2024-05-10"));
        assert_eq!(cells.last().unwrap().level, 3);
        assert_eq!(cells[cells.len() - 2].level, 1);
        assert!(cells.iter().all(|c| c.date > day("2023-01-01")));
    }

    #[test]
    fn test_heat_level_thresholds() {
        assert_eq!(heat_level(0), 0);
        assert_eq!(heat_level(1), 1);
        assert_eq!(heat_level(3), 2);
        assert_eq!(heat_level(5), 3);
        assert_eq!(heat_level(40), 4);
    }

    #[test]
    fn test_weekly_activity_has_seven_days() {
        let counts = normalize_dates(&["2024-05-06", "2024-05-10"]);
        let week = weekly_activity(&counts, day("2024-05-10"));
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day("2024-05-04"));
        assert_eq!(week[6].weekday, "Fri");
        assert_eq!(week.iter().map(|d| d.count).sum::<u32>(), 2);
    }
}
