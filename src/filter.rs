use regex::Regex;
use std::sync::LazyLock;

use crate::models::{DatePosted, FilterCriteria, JobListing};

// Digit runs, allowing thousands separators ("50,000").
static SALARY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("salary number pattern"));

/// Applies every active facet, in a fixed order, keeping listings that pass all of them.
///
/// Pure and order-preserving: the same input always yields the same output.
pub fn apply_filters(listings: &[JobListing], criteria: &FilterCriteria) -> Vec<JobListing> {
    listings
        .iter()
        .filter(|job| matches(job, criteria))
        .cloned()
        .collect()
}

pub fn matches(job: &JobListing, criteria: &FilterCriteria) -> bool {
    if let Some(job_type) = active(&criteria.job_type) {
        if !matches_job_type(&job.job_type, job_type) {
            return false;
        }
    }
    if let Some(level) = active(&criteria.experience_level) {
        if !matches_experience(&job.experience_level, level) {
            return false;
        }
    }
    if !matches_date_posted(&job.date_posted, criteria.date_posted) {
        return false;
    }
    if criteria.min_salary_thousands > 0
        && !matches_min_salary(&job.salary, criteria.min_salary_thousands)
    {
        return false;
    }
    if criteria.remote_only && !job.location.to_lowercase().contains("remote") {
        return false;
    }
    true
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn normalize_job_type(value: &str) -> String {
    value.to_lowercase().replace('_', " ").trim().to_string()
}

pub fn matches_job_type(listing: &str, filter: &str) -> bool {
    let listing = normalize_job_type(listing);
    let filter = normalize_job_type(filter);

    let aliased = |canonical: &str, hyphenated: &str| {
        filter == canonical && (listing == hyphenated || listing == canonical)
    };
    if aliased("full time", "full-time") || aliased("part time", "part-time") {
        return true;
    }

    listing == filter || listing.contains(&filter)
}

pub fn matches_experience(listing: &str, filter: &str) -> bool {
    let listing = listing.to_lowercase();
    let filter = filter.to_lowercase();

    listing.contains(&filter)
        || (filter == "entry" && listing.contains("junior"))
        || (filter == "mid" && (listing.contains("mid") || listing.contains("intermediate")))
}

/// Free-text recency buckets. This is a keyword heuristic, not date parsing:
/// "Recently" or an absolute date falls outside the day and week buckets.
pub fn matches_date_posted(listing: &str, bucket: DatePosted) -> bool {
    let posted = listing.to_lowercase();
    match bucket {
        DatePosted::Any => true,
        DatePosted::Day => {
            posted.contains("hour") || posted.contains("1 day") || posted.contains("today")
        }
        DatePosted::Week => {
            if posted.contains("month") || posted.contains("year") {
                return false;
            }
            posted.contains("week") || posted.contains("day") || posted.contains("hour")
        }
        DatePosted::Month => !posted.contains("year"),
    }
}

/// Lowest number in the salary text, read as thousands.
///
/// Values above 1000 are divided by 1000 ("$50,000" reads as 50). Known
/// failure modes: hourly rates ("$45/hr") read as 45 thousand, and monthly
/// figures in large-denomination currencies read far above any threshold.
pub fn salary_floor_thousands(salary: &str) -> Option<f64> {
    SALARY_NUMBER
        .find_iter(salary)
        .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .reduce(f64::min)
        .map(|min| if min > 1000.0 { min / 1000.0 } else { min })
}

pub fn matches_min_salary(salary: &str, threshold_thousands: u32) -> bool {
    salary_floor_thousands(salary).is_some_and(|floor| floor >= f64::from(threshold_thousands))
}
