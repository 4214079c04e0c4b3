use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoRef {
    pub primary: String,
    pub fallbacks: Vec<String>, // most-likely-to-succeed first, never contains `primary`
}

impl LogoRef {
    /// Every image reference a consumer should try, in order.
    pub fn attempts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary: String,      // display text, not a parsed range
    pub date_posted: String, // "3 days ago", "Recently", ...
    pub job_type: String,
    pub experience_level: String,
    pub remote: bool, // work mode, kept apart from experience_level
    pub company_rating: Option<f64>,
    pub url: String,
    pub logo: Option<LogoRef>,
    pub responsibilities: Vec<String>,
    pub qualifications: Vec<String>,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub location: String,
    pub continuation_token: Option<String>, // opaque, provider-owned
}

impl SearchRequest {
    pub fn fresh(query: &str, location: &str) -> Self {
        Self {
            query: query.to_string(),
            location: location.to_string(),
            continuation_token: None,
        }
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub listings: Vec<JobListing>,
    /// As reported by the provider. `None` means it gave no count, and
    /// holders fall back to the number of listings they have.
    pub total_results: Option<usize>,
    pub next_continuation_token: Option<String>,
    pub is_fallback: bool,
    pub advisory: Option<String>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self {
            listings: Vec::new(),
            total_results: Some(0),
            next_continuation_token: None,
            is_fallback: false,
            advisory: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePosted {
    #[default]
    Any,
    Day,
    Week,
    Month,
}

impl FromStr for DatePosted {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "any" => Ok(DatePosted::Any),
            "day" | "today" | "24h" => Ok(DatePosted::Day),
            "week" => Ok(DatePosted::Week),
            "month" => Ok(DatePosted::Month),
            other => Err(format!(
                "unknown date bucket '{}' (expected day, week, month or all)",
                other
            )),
        }
    }
}

impl fmt::Display for DatePosted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DatePosted::Any => "all",
            DatePosted::Day => "day",
            DatePosted::Week => "week",
            DatePosted::Month => "month",
        };
        f.write_str(label)
    }
}

/// Client-side facets. `None`, `false`, `0` and `DatePosted::Any` each mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub date_posted: DatePosted,
    pub min_salary_thousands: u32,
    pub remote_only: bool,
}

impl FilterCriteria {
    /// Maps the UI's "all"/blank sentinel to no constraint.
    pub fn constraint(value: Option<&str>) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
            .map(str::to_string)
    }

    pub fn is_active(&self) -> bool {
        self.job_type.is_some()
            || self.experience_level.is_some()
            || self.date_posted != DatePosted::Any
            || self.min_salary_thousands > 0
            || self.remote_only
    }
}

// --- Raw provider records (SerpAPI google_jobs shape) ---
//
// Every field is optional and tolerant of wrong JSON types so that a single
// odd record never fails the whole page.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderJobRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub detected_extensions: Option<DetectedExtensions>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub company_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub apply_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub share_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub highlights: Option<Highlights>,
    #[serde(default, deserialize_with = "lenient_sections")]
    pub job_highlights: Vec<HighlightSection>,
}

impl ProviderJobRecord {
    /// Best-effort conversion; anything that isn't an object becomes an empty record.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectedExtensions {
    #[serde(default, deserialize_with = "lenient_string")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub posted_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub schedule_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub work_from_home: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Highlights {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub qualifications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighlightSection {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub items: Vec<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    })
}

fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn lenient_sections<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<HighlightSection>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
