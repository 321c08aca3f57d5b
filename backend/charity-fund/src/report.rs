//! Closed-project report: how long each project took to collect its money.

use chrono::Duration;
use serde::Serialize;

use crate::models::CharityProject;

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    /// Human-readable collection time, e.g. `"2 days, 3:04:05"`.
    pub collection_time: String,
    #[serde(skip)]
    pub collection_secs: i64,
    pub description: String,
    pub full_amount: i64,
}

/// Build report rows for closed projects, fastest collection first.
///
/// Open projects are skipped.
pub fn build(projects: &[CharityProject]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = projects
        .iter()
        .filter_map(|p| {
            let closed = p.close_date?;
            let elapsed = closed - p.create_date;
            Some(ReportRow {
                name: p.name.clone(),
                collection_time: format_duration(elapsed),
                collection_secs: elapsed.num_seconds(),
                description: p.description.clone(),
                full_amount: p.full_amount,
            })
        })
        .collect();
    rows.sort_by_key(|r| r.collection_secs);
    rows
}

fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let days = total / 86_400;
    let rest = total % 86_400;
    let (h, m, s) = (rest / 3_600, (rest % 3_600) / 60, rest % 60);
    let day_word = if days == 1 { "day" } else { "days" };
    format!("{days} {day_word}, {h}:{m:02}:{s:02}")
}
