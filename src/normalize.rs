use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

use crate::logo;
use crate::models::{JobListing, ProviderJobRecord};

pub const DEFAULT_SALARY: &str = "Not specified";
pub const DEFAULT_DATE_POSTED: &str = "Recently";
pub const DEFAULT_JOB_TYPE: &str = "Full-time";

const BULLET: &str = "• ";
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 7;

const SECTION_HEADERS: &[&str] = &[
    "Job Description",
    "Responsibilities",
    "Qualifications",
    "Requirements",
    "About the Role",
    "About the Company",
    "Benefits",
    "Additional Information",
];

const ACTION_VERBS: &[&str] = &[
    "develop",
    "design",
    "create",
    "manage",
    "lead",
    "implement",
    "build",
    "collaborate",
    "analyze",
];

const MAX_RESPONSIBILITIES: usize = 5;
const MIN_RESPONSIBILITY_CHARS: usize = 15;

static BULLET_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[•●■◆★\-]\s").expect("bullet pattern"));

static RUN_ON_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.:])([A-Za-z0-9_])").expect("sentence break pattern"));

static HEADER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SECTION_HEADERS
        .iter()
        .map(|header| {
            Regex::new(&format!(r"(?i)({}s?:?)", regex::escape(header))).expect("header pattern")
        })
        .collect()
});

/// Maps one raw provider record into a `JobListing`, generating an id if needed.
pub fn normalize(raw: &ProviderJobRecord) -> JobListing {
    normalize_with(raw, &mut rand::thread_rng())
}

/// Same as [`normalize`] with the id randomness supplied by the caller.
///
/// Never fails: missing fields become empty strings or the documented
/// display defaults.
pub fn normalize_with<R: Rng + ?Sized>(raw: &ProviderJobRecord, rng: &mut R) -> JobListing {
    let id = raw
        .job_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| generate_id("job", rng));

    let ext = raw.detected_extensions.clone().unwrap_or_default();
    let company = raw.company_name.clone().unwrap_or_default();
    let raw_description = raw.description.clone().unwrap_or_default();

    let (qualifications, benefits) = highlights(raw);

    JobListing {
        id,
        title: raw.title.clone().unwrap_or_default(),
        location: raw.location.clone().unwrap_or_default(),
        description: format_description(&raw_description),
        salary: non_blank(ext.salary).unwrap_or_else(|| DEFAULT_SALARY.to_string()),
        date_posted: non_blank(ext.posted_at).unwrap_or_else(|| DEFAULT_DATE_POSTED.to_string()),
        job_type: non_blank(ext.schedule_type).unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string()),
        // Work-from-home is a work mode, not a seniority; it lands in `remote`.
        experience_level: String::new(),
        remote: ext.work_from_home,
        company_rating: raw.company_rating,
        url: [&raw.apply_link, &raw.job_link, &raw.share_link]
            .into_iter()
            .find_map(|link| non_blank(link.clone()))
            .unwrap_or_default(),
        logo: logo::resolve(&company, raw.company_thumbnail.as_deref()),
        responsibilities: extract_responsibilities(&raw_description),
        qualifications,
        benefits,
        company,
    }
}

/// `<prefix>-` followed by a fixed-length base36 suffix.
pub fn generate_id<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", prefix, suffix)
}

/// One-time ingestion formatting: canonical bullets, paragraph breaks after
/// run-on sentences, then a line break ahead of known section headers.
///
/// Not idempotent as a whole; apply once to raw provider text.
pub fn format_description(description: &str) -> String {
    let text = BULLET_GLYPH.replace_all(description, BULLET);
    let mut text = RUN_ON_SENTENCE.replace_all(&text, "${1}\n\n${2}").into_owned();
    for pattern in HEADER_PATTERNS.iter() {
        text = pattern.replace_all(&text, "\n${1}").into_owned();
    }
    text
}

/// Sentences that read like duties: contain one of the action verbs as a
/// whole space-separated word and are longer than 15 characters. At most five.
pub fn extract_responsibilities(description: &str) -> Vec<String> {
    description
        .split(['.', '!', '?'])
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            lower.split(' ').any(|word| ACTION_VERBS.contains(&word))
        })
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > MIN_RESPONSIBILITY_CHARS)
        .take(MAX_RESPONSIBILITIES)
        .map(str::to_string)
        .collect()
}

/// Canonical display form for a schedule/job type.
pub fn canonical_job_type(job_type: &str) -> String {
    match job_type.trim().to_lowercase().as_str() {
        "full-time" | "full time" => "Full-time".to_string(),
        "part-time" | "part time" => "Part-time".to_string(),
        "contract" => "Contract".to_string(),
        "internship" => "Internship".to_string(),
        _ => job_type.to_string(),
    }
}

fn highlights(raw: &ProviderJobRecord) -> (Vec<String>, Vec<String>) {
    let flat = raw.highlights.clone().unwrap_or_default();
    let section = |name: &str| -> Vec<String> {
        raw.job_highlights
            .iter()
            .find(|s| s.title.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(name)))
            .map(|s| s.items.clone())
            .unwrap_or_default()
    };

    let qualifications = if flat.qualifications.is_empty() {
        section("Qualifications")
    } else {
        flat.qualifications
    };
    let benefits = if flat.benefits.is_empty() {
        section("Benefits")
    } else {
        flat.benefits
    };
    (qualifications, benefits)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn record(value: serde_json::Value) -> ProviderJobRecord {
        ProviderJobRecord::from_value(value)
    }

    #[test]
    fn test_normalize_full_record() {
        let raw = record(json!({
            "job_id": "eyJqb2JfdGl0bGUiOiJSdXN0In0=",
            "title": "Rust Engineer",
            "company_name": "Ferrous Systems",
            "location": "Berlin, Germany",
            "description": "We build tools. You will develop compilers for embedded targets.",
            "detected_extensions": {
                "salary": "€70K–€90K a year",
                "posted_at": "3 days ago",
                "schedule_type": "Contractor"
            },
            "company_rating": 4.4,
            "apply_link": "https://jobs.example.com/1",
            "company_thumbnail": "https://img.example.com/ferrous.png",
            "highlights": { "qualifications": ["Rust"], "benefits": ["Remote budget"] }
        }));

        let listing = normalize(&raw);
        assert_eq!(listing.id, "eyJqb2JfdGl0bGUiOiJSdXN0In0=");
        assert_eq!(listing.title, "Rust Engineer");
        assert_eq!(listing.company, "Ferrous Systems");
        assert_eq!(listing.salary, "€70K–€90K a year");
        assert_eq!(listing.date_posted, "3 days ago");
        assert_eq!(listing.job_type, "Contractor");
        assert_eq!(listing.experience_level, "");
        assert!(!listing.remote);
        assert_eq!(listing.company_rating, Some(4.4));
        assert_eq!(listing.url, "https://jobs.example.com/1");
        assert_eq!(listing.logo.unwrap().primary, "https://img.example.com/ferrous.png");
        assert_eq!(listing.responsibilities, vec!["You will develop compilers for embedded targets"]);
        assert_eq!(listing.qualifications, vec!["Rust"]);
        assert_eq!(listing.benefits, vec!["Remote budget"]);
    }

    #[test]
    fn test_normalize_empty_record_uses_defaults() {
        let mut rng = StdRng::seed_from_u64(7);
        let listing = normalize_with(&ProviderJobRecord::default(), &mut rng);

        assert!(listing.id.starts_with("job-"));
        assert_eq!(listing.id.len(), "job-".len() + ID_SUFFIX_LEN);
        assert_eq!(listing.title, "");
        assert_eq!(listing.company, "");
        assert_eq!(listing.location, "");
        assert_eq!(listing.description, "");
        assert_eq!(listing.salary, "Not specified");
        assert_eq!(listing.date_posted, "Recently");
        assert_eq!(listing.job_type, "Full-time");
        assert_eq!(listing.experience_level, "");
        assert_eq!(listing.company_rating, None);
        assert_eq!(listing.url, "");
        assert!(listing.logo.is_none());
        assert!(listing.responsibilities.is_empty());
    }

    #[test]
    fn test_work_from_home_sets_remote_not_experience() {
        let raw = record(json!({
            "title": "SRE",
            "detected_extensions": { "work_from_home": true }
        }));
        let listing = normalize(&raw);
        assert!(listing.remote);
        assert_eq!(listing.experience_level, "");
    }

    #[test]
    fn test_url_prefers_apply_link_then_job_link() {
        let raw = record(json!({ "job_link": "https://b", "share_link": "https://c" }));
        assert_eq!(normalize(&raw).url, "https://b");
        let raw = record(json!({ "apply_link": "", "share_link": "https://c" }));
        assert_eq!(normalize(&raw).url, "https://c");
    }

    #[test]
    fn test_job_highlights_sections_are_used_when_flat_missing() {
        let raw = record(json!({
            "job_highlights": [
                { "title": "Qualifications", "items": ["5 years Go"] },
                { "title": "Benefits", "items": ["Dental", "401k"] }
            ]
        }));
        let listing = normalize(&raw);
        assert_eq!(listing.qualifications, vec!["5 years Go"]);
        assert_eq!(listing.benefits, vec!["Dental", "401k"]);
    }

    #[test]
    fn test_generated_ids_do_not_collide_in_a_batch() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut ids: Vec<String> = (0..200).map(|_| generate_id("job", &mut rng)).collect();
        assert!(ids.iter().all(|id| id[4..].chars().all(|c| c.is_ascii_alphanumeric())));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_format_description_bullets() {
        assert_eq!(format_description("● one ■ two - three"), "• one • two • three");
        // A hyphen inside a word is not a bullet.
        assert_eq!(format_description("self-starter"), "self-starter");
    }

    #[test]
    fn test_format_description_run_on_sentences() {
        assert_eq!(format_description("Fast paced.Great team"), "Fast paced.\n\nGreat team");
        assert_eq!(format_description("Fast paced. Great team"), "Fast paced. Great team");
    }

    #[test]
    fn test_format_description_section_headers() {
        let text = format_description("Great role. Responsibilities: ship code. benefits: lunch");
        assert_eq!(text, "Great role. \nResponsibilities: ship code. \nbenefits: lunch");
    }

    #[test]
    fn test_format_description_passes_in_order() {
        let text = format_description("Intro.Requirements:Rust - Go");
        assert_eq!(text, "Intro.\n\n\nRequirements:\n\nRust • Go");
    }

    #[test]
    fn test_extract_responsibilities_filters_and_caps() {
        let description = "You will design APIs for payments. Lunch. \
            We lead by example every day! Help build the team? \
            You will manage the on-call rotation. You will analyze metrics weekly. \
            You will implement new features quickly. You will create dashboards.";
        let found = extract_responsibilities(description);
        assert_eq!(found.len(), 5);
        assert_eq!(found[0], "You will design APIs for payments");
        assert_eq!(found[1], "We lead by example every day");
        assert_eq!(found[2], "Help build the team");
        assert!(!found.iter().any(|s| s.contains("dashboards")));
    }

    #[test]
    fn test_extract_responsibilities_drops_short_and_partial_words() {
        assert!(extract_responsibilities("We build it.").is_empty());
        assert!(extract_responsibilities("Developers are welcome to apply here").is_empty());
    }

    #[test]
    fn test_canonical_job_type() {
        assert_eq!(canonical_job_type("full time"), "Full-time");
        assert_eq!(canonical_job_type("PART-TIME"), "Part-time");
        assert_eq!(canonical_job_type("internship"), "Internship");
        assert_eq!(canonical_job_type("Per diem"), "Per diem");
    }
}
