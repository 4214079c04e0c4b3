use clap::ValueEnum;

pub const MAX_SUGGESTIONS: usize = 5;
const MIN_INPUT_CHARS: usize = 2;

pub const JOB_TITLES: &[&str] = &[
    "Software Engineer",
    "Product Manager",
    "Data Scientist",
    "UX Designer",
    "Frontend Developer",
    "Backend Developer",
    "DevOps Engineer",
    "Full Stack Developer",
    "Machine Learning Engineer",
    "iOS Developer",
    "Android Developer",
    "Web Developer",
    "React Developer",
    "Project Manager",
    "UI Designer",
    "Marketing Manager",
    "Content Writer",
    "Sales Representative",
    "Customer Success Manager",
    "Business Analyst",
    "Data Analyst",
    "QA Engineer",
    "Technical Writer",
    "Product Designer",
    "Systems Administrator",
    "Network Engineer",
    "Cloud Architect",
    "Graphic Designer",
    "Accountant",
    "HR Specialist",
];

pub const COMPANIES: &[&str] = &[
    "Google", "Microsoft", "Amazon", "Apple", "Meta", "Netflix", "Tesla", "Twitter", "Salesforce",
    "Adobe", "Airbnb", "Uber", "Lyft", "Spotify", "Slack", "Shopify", "Intel", "IBM", "Oracle",
    "Cisco", "eBay", "PayPal", "Zoom", "Dropbox", "Twilio",
];

pub const LOCATIONS: &[&str] = &[
    "Remote",
    "New York, NY",
    "San Francisco, CA",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
    "Chicago, IL",
    "Los Angeles, CA",
    "Denver, CO",
    "Atlanta, GA",
    "Portland, OR",
    "Dallas, TX",
    "Washington, DC",
    "Miami, FL",
    "San Diego, CA",
    "London, UK",
    "Toronto, Canada",
    "Berlin, Germany",
    "Amsterdam, Netherlands",
    "Paris, France",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SuggestionKind {
    #[default]
    Job,
    Location,
    Company,
}

impl SuggestionKind {
    fn pool(self) -> &'static [&'static str] {
        match self {
            SuggestionKind::Job => JOB_TITLES,
            SuggestionKind::Location => LOCATIONS,
            SuggestionKind::Company => COMPANIES,
        }
    }
}

fn matching<'a>(pool: &'a [&'a str], needle: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    pool.iter()
        .copied()
        .filter(move |entry| entry.to_lowercase().contains(needle))
}

fn needle(input: &str) -> Option<String> {
    let input = input.trim();
    if input.chars().count() < MIN_INPUT_CHARS {
        return None;
    }
    Some(input.to_lowercase())
}

/// Up to five pool entries containing `input`, case-insensitively, in pool order.
pub fn suggest(kind: SuggestionKind, input: &str) -> Vec<String> {
    let Some(needle) = needle(input) else {
        return Vec::new();
    };
    matching(kind.pool(), &needle)
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

/// Job titles first, then companies tagged "(Company)".
pub fn suggest_combined(input: &str) -> Vec<String> {
    let Some(needle) = needle(input) else {
        return Vec::new();
    };
    matching(JOB_TITLES, &needle)
        .map(str::to_string)
        .chain(matching(COMPANIES, &needle).map(|c| format!("{} (Company)", c)))
        .take(MAX_SUGGESTIONS)
        .collect()
}
