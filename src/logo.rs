use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::models::LogoRef;

const LOGO_SERVICE: &str = "https://logo.clearbit.com";
const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";
const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

static CORPORATE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[,.]?\s*\b(inc|ltd|llc|corp)\b\.?\s*$").expect("corporate suffix pattern")
});

/// Builds the image attempt chain for a company.
///
/// A provider thumbnail wins outright. Otherwise the company name is reduced
/// to a domain-ish token and we guess logo URLs from it, ending with a
/// generated avatar. Returns `None` only when nothing usable is left of the name.
pub fn resolve(company_name: &str, provided_thumbnail: Option<&str>) -> Option<LogoRef> {
    if let Some(thumb) = provided_thumbnail.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(LogoRef {
            primary: thumb.to_string(),
            fallbacks: Vec::new(),
        });
    }

    let token = company_token(company_name)?;
    let stem = token.split('.').next().unwrap_or(&token).to_string();
    let domain = if token.contains('.') {
        token.clone()
    } else {
        format!("{}.com", stem)
    };

    let primary = format!("{}/{}", LOGO_SERVICE, domain);
    let mut fallbacks: Vec<String> = ["io", "co"]
        .iter()
        .map(|tld| format!("{}/{}.{}", LOGO_SERVICE, stem, tld))
        .collect();
    fallbacks.push(format!("{}?domain={}&sz=128", FAVICON_SERVICE, domain));
    if let Some(avatar) = avatar_url(company_name) {
        fallbacks.push(avatar);
    }

    fallbacks.retain(|url| *url != primary);
    fallbacks.dedup();

    Some(LogoRef { primary, fallbacks })
}

/// Lowercased first word of the company name with any trailing corporate suffix removed.
fn company_token(company_name: &str) -> Option<String> {
    let lower = company_name.trim().to_lowercase();
    let cleaned = CORPORATE_SUFFIX.replace(&lower, "");
    let first = cleaned.trim().split_whitespace().next()?;

    let token: String = first
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '.')
        .collect();
    let token = token.trim_matches(|c| c == '.' || c == '-').to_string();

    if token.is_empty() { None } else { Some(token) }
}

fn avatar_url(company_name: &str) -> Option<String> {
    let name = company_name.trim();
    if name.is_empty() {
        return None;
    }
    reqwest::Url::parse_with_params(
        AVATAR_SERVICE,
        &[("name", name), ("background", "random"), ("size", "128")],
    )
    .ok()
    .map(String::from)
}

/// Deterministic placeholder shown once every logo attempt has failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialsBadge {
    pub initials: String,
    pub background: String,
    pub foreground: String,
}

pub fn placeholder(company: &str) -> InitialsBadge {
    let hue = badge_hue(company);
    InitialsBadge {
        initials: initials(company),
        background: format!("hsl({}, 70%, 85%)", hue),
        foreground: format!("hsl({}, 80%, 30%)", hue),
    }
}

pub fn initials(company: &str) -> String {
    company
        .split(' ')
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

// Only the shifted operand is cut to 32 bits; the running sum is not.
fn badge_hue(company: &str) -> i64 {
    let hash = company.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit) + shifted - hash
    });
    (hash % 360).abs()
}
