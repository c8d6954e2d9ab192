//! Focus statistics
//!
//! Turns the full session list into what the report screen shows:
//! - today's and all-time focus minutes, total distractions
//! - minutes per category, each with a chart color
//! - a rolling 7-day series ending at the reference date

use chrono::{Duration, NaiveDate};

use crate::session::SessionRecord;

/// Days in the rolling series
pub const WEEK_DAYS: usize = 7;

/// Category colors, assigned in order of first appearance and reused cyclically
pub const PALETTE: [&str; 5] = ["#e74c3c", "#3498db", "#f1c40f", "#2ecc71", "#9b59b6"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySlice {
    pub name: String,
    pub minutes: u64,
    pub color: &'static str,
}

/// Parallel label/value arrays for the bar chart
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailySeries {
    /// `MM-DD`, oldest first
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub today_focus: u64,
    pub total_focus: u64,
    pub total_distractions: u64,
    pub categories: Vec<CategorySlice>,
    pub week: DailySeries,
}

impl Summary {
    /// Whether the category breakdown has anything to draw
    pub fn has_category_data(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Get total focus time as (hours, minutes)
    pub fn total_time(&self) -> (u64, u64) {
        (self.total_focus / 60, self.total_focus % 60)
    }
}

/// Aggregate `sessions` relative to the calendar day `today`.
///
/// Sessions outside the 7-day window still count toward the totals.
/// Records whose date cannot be read count toward totals and categories only.
pub fn aggregate(sessions: &[SessionRecord], today: NaiveDate) -> Summary {
    let days: Vec<NaiveDate> = (0..WEEK_DAYS)
        .rev()
        .map(|back| today - Duration::days(back as i64))
        .collect();
    let mut week_values = vec![0u64; WEEK_DAYS];

    let mut summary = Summary::default();
    let mut categories: Vec<(String, u64)> = Vec::new();

    for session in sessions {
        let minutes = u64::from(session.duration);
        let day = session.day();

        summary.total_focus += minutes;
        summary.total_distractions += u64::from(session.distraction_count);

        if day == Some(today) {
            summary.today_focus += minutes;
        }

        match categories.iter_mut().find(|(name, _)| *name == session.category) {
            Some((_, total)) => *total += minutes,
            None => categories.push((session.category.clone(), minutes)),
        }

        if let Some(idx) = day.and_then(|d| days.iter().position(|&w| w == d)) {
            week_values[idx] += minutes;
        }
    }

    summary.categories = categories
        .into_iter()
        .enumerate()
        .map(|(idx, (name, minutes))| CategorySlice {
            name,
            minutes,
            color: PALETTE[idx % PALETTE.len()],
        })
        .collect();

    summary.week = DailySeries {
        labels: days.iter().map(|d| d.format("%m-%d").to_string()).collect(),
        values: week_values,
    };

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(duration: u32, category: &str, day: NaiveDate, distractions: u32) -> SessionRecord {
        SessionRecord {
            id: day.to_string(),
            date: format!("{day}T10:00:00+00:00"),
            duration,
            category: category.into(),
            distraction_count: distractions,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_empty_summary() {
        let summary = aggregate(&[], today());
        assert_eq!(summary.today_focus, 0);
        assert_eq!(summary.total_focus, 0);
        assert_eq!(summary.total_distractions, 0);
        assert!(!summary.has_category_data());
        assert_eq!(summary.week.values, vec![0; 7]);
        assert_eq!(
            summary.week.labels,
            vec!["03-04", "03-05", "03-06", "03-07", "03-08", "03-09", "03-10"]
        );
    }

    #[test]
    fn test_old_sessions_only_count_in_totals() {
        let today = today();
        let sessions = vec![
            session(25, "Coding", today, 1),
            session(25, "Coding", today - Duration::days(8), 2),
            session(10, "Reading", today, 0),
        ];

        let summary = aggregate(&sessions, today);
        assert_eq!(summary.today_focus, 35);
        assert_eq!(summary.total_focus, 60);
        assert_eq!(summary.total_distractions, 3);
        assert_eq!(
            summary.categories,
            vec![
                CategorySlice { name: "Coding".into(), minutes: 50, color: PALETTE[0] },
                CategorySlice { name: "Reading".into(), minutes: 10, color: PALETTE[1] },
            ]
        );
        assert_eq!(summary.week.values, vec![0, 0, 0, 0, 0, 0, 35]);
        assert_eq!(summary.week.values.iter().sum::<u64>(), 35);
    }

    #[test]
    fn test_week_buckets_by_day() {
        let today = today();
        let sessions = vec![
            session(25, "Study", today - Duration::days(6), 0),
            session(25, "Study", today - Duration::days(6), 0),
            session(15, "Study", today - Duration::days(3), 0),
            session(25, "Study", today - Duration::days(7), 0),
        ];

        let summary = aggregate(&sessions, today);
        assert_eq!(summary.week.values, vec![50, 0, 0, 15, 0, 0, 0]);
        assert_eq!(summary.today_focus, 0);
        assert_eq!(summary.total_focus, 90);
    }

    #[test]
    fn test_palette_cycles() {
        let today = today();
        let names = ["a", "b", "c", "d", "e", "f", "g"];
        let sessions: Vec<_> = names.iter().map(|n| session(5, n, today, 0)).collect();

        let summary = aggregate(&sessions, today);
        assert_eq!(summary.categories.len(), 7);
        assert_eq!(summary.categories[5].color, PALETTE[0]);
        assert_eq!(summary.categories[6].color, PALETTE[1]);
    }

    #[test]
    fn test_unreadable_date_still_totals() {
        let mut broken = session(25, "Study", today(), 1);
        broken.date = "yesterday-ish".into();

        let summary = aggregate(&[broken], today());
        assert_eq!(summary.total_focus, 25);
        assert_eq!(summary.today_focus, 0);
        assert_eq!(summary.week.values, vec![0; 7]);
        assert!(summary.has_category_data());
    }

    #[test]
    fn test_total_time() {
        let summary = Summary {
            total_focus: 135,
            ..Summary::default()
        };
        assert_eq!(summary.total_time(), (2, 15));
    }
}
