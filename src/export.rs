//! CSV export of the report and the raw session log

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::session::SessionRecord;
use crate::stats::Summary;

fn field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(summary: &Summary, sessions: &[SessionRecord]) -> String {
    let mut csv = format!(
        "Today (min),Total (min),Distractions\n{},{},{}\n\n",
        summary.today_focus, summary.total_focus, summary.total_distractions
    );

    csv.push_str("Category,Minutes\n");
    for slice in &summary.categories {
        csv.push_str(&format!("{},{}\n", field(&slice.name), slice.minutes));
    }

    csv.push_str("\nDay,Minutes\n");
    for (label, value) in summary.week.labels.iter().zip(&summary.week.values) {
        csv.push_str(&format!("{label},{value}\n"));
    }

    csv.push_str("\nSessions\nid,date,duration,category,distractionCount\n");
    for s in sessions {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            field(&s.id),
            field(&s.date),
            s.duration,
            field(&s.category),
            s.distraction_count
        ));
    }

    csv
}

pub fn write_csv(path: &Path, summary: &Summary, sessions: &[SessionRecord]) -> Result<()> {
    fs::write(path, to_csv(summary, sessions))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use chrono::NaiveDate;

    #[test]
    fn test_csv_sections() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let sessions = vec![SessionRecord {
            id: "42".into(),
            date: "2024-03-10T09:00:00+00:00".into(),
            duration: 25,
            category: "Side \"project\", v2".into(),
            distraction_count: 2,
        }];
        let csv = to_csv(&aggregate(&sessions, today), &sessions);

        assert!(csv.starts_with("Today (min),Total (min),Distractions\n25,25,2\n"));
        assert!(csv.contains("\"Side \"\"project\"\", v2\",25\n"));
        assert!(csv.contains("03-10,25\n"));
        assert!(csv.ends_with("42,2024-03-10T09:00:00+00:00,25,\"Side \"\"project\"\", v2\",2\n"));
    }
}
