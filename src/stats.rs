use chrono::{Duration, Local, NaiveDate};

use crate::models::{Application, ApplicationStatus};

/// Scores at or above this count as a high match on the dashboard.
pub const HIGH_MATCH_THRESHOLD: i64 = 90;

/// Days of history covered by the activity chart.
pub const ACTIVITY_WINDOW_DAYS: usize = 30;

/// Aggregate figures shown on the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardMetrics {
    pub total_applications: usize,
    pub in_interview: usize,
    pub offers: usize,
    pub high_matches: usize,
}

impl DashboardMetrics {
    pub fn compute(applications: &[Application]) -> Self {
        let mut metrics = Self {
            total_applications: applications.len(),
            in_interview: 0,
            offers: 0,
            high_matches: 0,
        };
        for app in applications {
            match app.status {
                ApplicationStatus::Interviewing => metrics.in_interview += 1,
                ApplicationStatus::OfferReceived => metrics.offers += 1,
                _ => {}
            }
            if app.match_score >= HIGH_MATCH_THRESHOLD {
                metrics.high_matches += 1;
            }
        }
        metrics
    }
}

/// Buckets applications by local calendar day over the trailing window,
/// oldest day first. Entries without a parseable timestamp are skipped.
pub fn activity_histogram(applications: &[Application], today: NaiveDate) -> Vec<(NaiveDate, u64)> {
    let start = today - Duration::days(ACTIVITY_WINDOW_DAYS as i64 - 1);
    let mut buckets: Vec<(NaiveDate, u64)> = (0..ACTIVITY_WINDOW_DAYS)
        .map(|offset| (start + Duration::days(offset as i64), 0))
        .collect();
    for app in applications {
        let Some(created) = app.created_at else { continue };
        let day = created.with_timezone(&Local).date_naive();
        if day < start || day > today {
            continue;
        }
        let idx = (day - start).num_days() as usize;
        buckets[idx].1 += 1;
    }
    buckets
}

/// The six dashboard orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Highest match score first.
    ScoreDesc,
    /// Lowest match score first.
    ScoreAsc,
    /// Job title A to Z.
    NameAsc,
    /// Job title Z to A.
    NameDesc,
}

/// Case-insensitive substring filter over job title and company, then a
/// stable sort in the requested order. Missing timestamps sort last under
/// either date ordering.
pub fn filter_and_sort(
    applications: &[Application],
    search: &str,
    order: SortOrder,
) -> Vec<Application> {
    let needle = search.trim().to_lowercase();
    let mut out: Vec<Application> = applications
        .iter()
        .filter(|app| {
            needle.is_empty()
                || app.job_title.to_lowercase().contains(&needle)
                || app.company_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    match order {
        SortOrder::DateDesc => out.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
        SortOrder::DateAsc => out.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
        SortOrder::ScoreDesc => out.sort_by(|a, b| b.match_score.cmp(&a.match_score)),
        SortOrder::ScoreAsc => out.sort_by(|a, b| a.match_score.cmp(&b.match_score)),
        SortOrder::NameAsc => {
            out.sort_by(|a, b| a.job_title.to_lowercase().cmp(&b.job_title.to_lowercase()))
        }
        SortOrder::NameDesc => {
            out.sort_by(|a, b| b.job_title.to_lowercase().cmp(&a.job_title.to_lowercase()))
        }
    }
    out
}
