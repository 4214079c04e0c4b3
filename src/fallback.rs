use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logo;
use crate::models::JobListing;
use crate::normalize::{canonical_job_type, generate_id};

const MIN_BATCH: usize = 6;
const MAX_BATCH: usize = 10;
const MIN_BENEFITS: usize = 4;
const MAX_BENEFITS: usize = 6;

// --- Catalog ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBands {
    pub entry: String,
    pub mid: String,
    pub senior: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRegion {
    pub markers: Vec<String>,
    pub bands: SalaryBands,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPool {
    pub region: String,
    pub companies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitlePool {
    pub keywords: Vec<String>,
    pub titles: Vec<String>,
}

/// Static tables the fallback generator draws from.
///
/// Loaded once and handed to the generator; `Catalog::default()` is the
/// built-in set. A JSON file may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub companies: Vec<String>,
    /// Appended to `companies` for the first region the location names.
    /// Regions match as whole words of the location, not as substrings, so
    /// "Eurasia" or "Caucasian Hills" select no regional pool.
    pub regional_companies: Vec<RegionPool>,
    pub title_pools: Vec<TitlePool>,         // first pool whose keyword is in the query wins
    pub generic_titles: Vec<String>,
    pub entry_keywords: Vec<String>,
    pub senior_keywords: Vec<String>,
    /// First region with a marker naming the location as a whole word
    /// ("uk" does not hit "Milwaukee"); otherwise `default_salary`.
    pub salary_regions: Vec<SalaryRegion>,
    pub default_salary: SalaryBands,
    pub recency_labels: Vec<String>,
    pub job_types: Vec<String>,
    pub benefits: Vec<String>,
    pub default_location: String,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn bands(entry: &str, mid: &str, senior: &str) -> SalaryBands {
    SalaryBands {
        entry: entry.to_string(),
        mid: mid.to_string(),
        senior: senior.to_string(),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            companies: owned(&[
                "Google", "Microsoft", "Amazon", "Meta", "Apple", "Netflix", "Tesla", "Salesforce",
                "Adobe", "Shopify", "Stripe", "Airbnb",
            ]),
            regional_companies: vec![
                RegionPool {
                    region: "asia".to_string(),
                    companies: owned(&["Grab", "Sea Group", "Rakuten", "LINE", "Lazada"]),
                },
                RegionPool {
                    region: "europe".to_string(),
                    companies: owned(&["Spotify", "SAP", "Adyen", "Zalando", "Revolut"]),
                },
                RegionPool {
                    region: "australia".to_string(),
                    companies: owned(&["Atlassian", "Canva", "Xero", "SafetyCulture"]),
                },
                RegionPool {
                    region: "india".to_string(),
                    companies: owned(&["Infosys", "Flipkart", "Zomato", "Razorpay", "Swiggy"]),
                },
                RegionPool {
                    region: "indonesia".to_string(),
                    companies: owned(&["Gojek", "Tokopedia", "Traveloka", "Bukalapak"]),
                },
            ],
            title_pools: vec![
                TitlePool {
                    keywords: owned(&[
                        "developer", "engineer", "programmer", "programming", "software", "code",
                        "coding", "frontend", "backend", "full stack", "fullstack", "devops",
                        "data", "rust", "python", "java", "react",
                    ]),
                    titles: owned(&[
                        "Software Engineer",
                        "Backend Developer",
                        "Frontend Developer",
                        "Full Stack Developer",
                        "DevOps Engineer",
                        "Data Engineer",
                        "Machine Learning Engineer",
                        "Site Reliability Engineer",
                    ]),
                },
                TitlePool {
                    keywords: owned(&["manager", "management", "lead", "director", "head of"]),
                    titles: owned(&[
                        "Engineering Manager",
                        "Product Manager",
                        "Project Manager",
                        "Team Lead",
                        "Program Manager",
                        "Director of Operations",
                    ]),
                },
                TitlePool {
                    keywords: owned(&["design", "designer", "ux", "ui", "creative"]),
                    titles: owned(&[
                        "UX Designer",
                        "UI Designer",
                        "Product Designer",
                        "Graphic Designer",
                        "UX Researcher",
                    ]),
                },
            ],
            generic_titles: owned(&[
                "Software Engineer",
                "Product Manager",
                "Data Analyst",
                "UX Designer",
                "Business Analyst",
                "Marketing Manager",
                "Customer Success Manager",
                "QA Engineer",
            ]),
            entry_keywords: owned(&["junior", "fresh", "entry"]),
            senior_keywords: owned(&["senior", "lead", "architect"]),
            salary_regions: vec![
                SalaryRegion {
                    markers: owned(&["uk", "united kingdom", "london", "england", "manchester"]),
                    bands: bands("£28,000 - £38,000", "£45,000 - £65,000", "£70,000 - £95,000"),
                },
                SalaryRegion {
                    markers: owned(&[
                        "europe", "germany", "berlin", "munich", "france", "paris", "netherlands",
                        "amsterdam", "spain", "madrid", "ireland", "dublin",
                    ]),
                    bands: bands("€35,000 - €45,000", "€50,000 - €70,000", "€75,000 - €100,000"),
                },
                SalaryRegion {
                    markers: owned(&[
                        "india", "bangalore", "bengaluru", "mumbai", "delhi", "hyderabad", "pune",
                        "chennai",
                    ]),
                    bands: bands(
                        "₹400,000 - ₹800,000",
                        "₹1,000,000 - ₹1,800,000",
                        "₹2,000,000 - ₹3,500,000",
                    ),
                },
                SalaryRegion {
                    markers: owned(&[
                        "indonesia", "jakarta", "bandung", "surabaya", "bali", "yogyakarta",
                    ]),
                    bands: bands(
                        "Rp 6,000,000 - Rp 10,000,000",
                        "Rp 12,000,000 - Rp 20,000,000",
                        "Rp 25,000,000 - Rp 40,000,000",
                    ),
                },
            ],
            default_salary: bands("$60,000 - $85,000", "$90,000 - $130,000", "$140,000 - $190,000"),
            recency_labels: owned(&[
                "Just posted",
                "5 hours ago",
                "Today",
                "1 day ago",
                "2 days ago",
                "3 days ago",
                "5 days ago",
                "1 week ago",
                "2 weeks ago",
                "3 weeks ago",
            ]),
            job_types: owned(&["Full-time", "Full-time", "Full-time", "Contract", "Part-time"]),
            benefits: owned(&[
                "Health insurance",
                "Flexible working hours",
                "Remote work options",
                "Professional development budget",
                "Paid time off",
                "Retirement plan",
                "Stock options",
                "Wellness programs",
                "Parental leave",
                "Learning stipend",
            ]),
            default_location: "United States".to_string(),
        }
    }
}

// --- Keyword matching ---

/// Query keywords match at the start of any word ("engineer" hits "engineering").
fn has_keyword(text: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        return text.contains(keyword);
    }
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| word.starts_with(keyword))
}

/// Place markers must match a whole word ("uk" does not hit "milwaukee").
fn names_place(location: &str, marker: &str) -> bool {
    if marker.contains(' ') {
        return location.contains(marker);
    }
    location
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == marker)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seniority {
    Entry,
    Mid,
    Senior,
}

impl Seniority {
    pub fn label(self) -> &'static str {
        match self {
            Seniority::Entry => "Entry Level",
            Seniority::Mid => "Mid Level",
            Seniority::Senior => "Senior Level",
        }
    }

    fn years(self) -> &'static str {
        match self {
            Seniority::Entry => "0-2",
            Seniority::Mid => "3-5",
            Seniority::Senior => "6+",
        }
    }

    fn band(self, bands: &SalaryBands) -> &str {
        match self {
            Seniority::Entry => &bands.entry,
            Seniority::Mid => &bands.mid,
            Seniority::Senior => &bands.senior,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Template {
    Engineering,
    Design,
    Generic,
}

impl Template {
    fn for_title(title: &str) -> Self {
        let lower = title.to_lowercase();
        if ["engineer", "developer", "architect", "devops", "scientist"]
            .iter()
            .any(|k| has_keyword(&lower, k))
        {
            Template::Engineering
        } else if ["design", "ux", "ui"].iter().any(|k| has_keyword(&lower, k)) {
            Template::Design
        } else {
            Template::Generic
        }
    }
}

// --- Generator ---

/// Synthesizes placeholder listings when the provider has nothing usable.
///
/// All random choices go through `rng`, so a seeded generator gives a
/// reproducible batch.
pub struct FallbackGenerator<R: Rng> {
    catalog: Catalog,
    rng: R,
}

impl<R: Rng> FallbackGenerator<R> {
    pub fn new(catalog: Catalog, rng: R) -> Self {
        Self { catalog, rng }
    }

    pub fn generate(&mut self, query: &str, location: &str) -> Vec<JobListing> {
        let query_lower = query.to_lowercase();
        let location_lower = location.to_lowercase();

        let companies = self.company_pool(&location_lower);
        let titles = self.title_pool(&query_lower);
        let forced = self.forced_seniority(&query_lower);
        let salary_bands = self.salary_bands(&location_lower).clone();
        let base_location = if location.trim().is_empty() {
            self.catalog.default_location.clone()
        } else {
            location.trim().to_string()
        };

        let count = self.rng.gen_range(MIN_BATCH..=MAX_BATCH);
        debug!(
            query,
            location,
            count,
            companies = companies.len(),
            titles = titles.len(),
            "generating fallback listings"
        );

        (0..count)
            .map(|_| {
                let company = companies.choose(&mut self.rng).cloned().unwrap_or_default();
                let title = titles.choose(&mut self.rng).cloned().unwrap_or_default();
                let seniority = forced.unwrap_or_else(|| {
                    *[Seniority::Entry, Seniority::Mid, Seniority::Senior]
                        .choose(&mut self.rng)
                        .unwrap_or(&Seniority::Mid)
                });
                let remote_suffix = self.rng.gen_bool(0.5);
                let listing_location = if remote_suffix {
                    format!("{} (Remote)", base_location)
                } else {
                    base_location.clone()
                };
                self.listing(company, title, listing_location, seniority, &salary_bands)
            })
            .collect()
    }

    fn listing(
        &mut self,
        company: String,
        title: String,
        location: String,
        seniority: Seniority,
        salary_bands: &SalaryBands,
    ) -> JobListing {
        let template = Template::for_title(&title);
        let date_posted = self
            .catalog
            .recency_labels
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        let job_type = self
            .catalog
            .job_types
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| "Full-time".to_string());

        let benefit_count = self.rng.gen_range(MIN_BENEFITS..=MAX_BENEFITS);
        let benefits: Vec<String> = self
            .catalog
            .benefits
            .choose_multiple(&mut self.rng, benefit_count)
            .cloned()
            .collect();
        let rating = f64::from(self.rng.gen_range(35u8..=50)) / 10.0;

        JobListing {
            id: generate_id("fallback", &mut self.rng),
            description: description(template, &company, &title, &location, seniority),
            responsibilities: responsibilities(template, &company, &title),
            qualifications: qualifications(template, &title, seniority),
            salary: seniority.band(salary_bands).to_string(),
            date_posted,
            job_type,
            experience_level: seniority.label().to_string(),
            remote: location.to_lowercase().contains("remote"),
            company_rating: Some(rating),
            url: String::new(),
            logo: logo::resolve(&company, None),
            benefits,
            title,
            company,
            location,
        }
    }

    /// Global pool, plus the pool of the first region the location names.
    fn company_pool(&self, location: &str) -> Vec<String> {
        let mut pool = self.catalog.companies.clone();
        if let Some(region) = self
            .catalog
            .regional_companies
            .iter()
            .find(|r| names_place(location, &r.region.to_lowercase()))
        {
            pool.extend(region.companies.iter().cloned());
        }
        pool
    }

    fn title_pool(&self, query: &str) -> Vec<String> {
        self.catalog
            .title_pools
            .iter()
            .find(|pool| pool.keywords.iter().any(|k| has_keyword(query, &k.to_lowercase())))
            .map(|pool| pool.titles.clone())
            .unwrap_or_else(|| self.catalog.generic_titles.clone())
    }

    fn forced_seniority(&self, query: &str) -> Option<Seniority> {
        let mentions = |keywords: &[String]| keywords.iter().any(|k| has_keyword(query, &k.to_lowercase()));
        if mentions(&self.catalog.entry_keywords) {
            Some(Seniority::Entry)
        } else if mentions(&self.catalog.senior_keywords) {
            Some(Seniority::Senior)
        } else {
            None
        }
    }

    fn salary_bands(&self, location: &str) -> &SalaryBands {
        self.catalog
            .salary_regions
            .iter()
            .find(|region| region.markers.iter().any(|m| names_place(location, &m.to_lowercase())))
            .map(|region| &region.bands)
            .unwrap_or(&self.catalog.default_salary)
    }
}

// --- Canned content ---

fn description(template: Template, company: &str, title: &str, location: &str, seniority: Seniority) -> String {
    let level = seniority.label().to_lowercase();
    match template {
        Template::Engineering => format!(
            "{company} is hiring a {title} to join our engineering team in {location}. \
             In this {level} role you will design, build and operate services used by \
             customers around the world. You will work with modern tooling, review code \
             with your peers and help shape the technical direction of the platform."
        ),
        Template::Design => format!(
            "{company} is looking for a {title} in {location}. This {level} position sits \
             with our product team and owns the end-to-end experience, from research and \
             wireframes to polished interfaces. You will partner closely with engineering \
             and product to ship work that customers love."
        ),
        Template::Generic => format!(
            "Join {company} as a {title} based in {location}. This {level} opportunity \
             offers the chance to make a real impact on a growing business. You will work \
             with cross-functional teams, take ownership of key initiatives and grow your \
             career with a supportive team."
        ),
    }
}

fn responsibilities(template: Template, company: &str, title: &str) -> Vec<String> {
    match template {
        Template::Engineering => vec![
            format!("Design and implement scalable services for {}", company),
            "Write clean, well-tested and maintainable code".to_string(),
            "Collaborate with product managers and designers on new features".to_string(),
            "Participate in code reviews and technical design discussions".to_string(),
            "Monitor, debug and improve production systems".to_string(),
        ],
        Template::Design => vec![
            format!("Lead the design of new product experiences at {}", company),
            "Create wireframes, prototypes and high-fidelity mockups".to_string(),
            "Conduct user research and usability testing".to_string(),
            "Maintain and evolve the design system".to_string(),
            "Collaborate with engineers to ensure faithful implementation".to_string(),
        ],
        Template::Generic => vec![
            format!("Own the day-to-day responsibilities of the {} role", title),
            "Manage priorities across multiple stakeholders".to_string(),
            "Analyze results and report on key metrics".to_string(),
            "Collaborate with cross-functional teams to deliver projects".to_string(),
            format!("Help build processes that scale with {}", company),
        ],
    }
}

fn qualifications(template: Template, title: &str, seniority: Seniority) -> Vec<String> {
    let years = seniority.years();
    let mut items = vec![format!("{} years of experience as a {} or similar role", years, title)];
    match template {
        Template::Engineering => items.extend([
            "Strong knowledge of at least one modern programming language".to_string(),
            "Experience with cloud platforms and CI/CD".to_string(),
            "Solid understanding of data structures and system design".to_string(),
        ]),
        Template::Design => items.extend([
            "A portfolio demonstrating strong UX and visual design skills".to_string(),
            "Proficiency with Figma or similar design tools".to_string(),
            "Ability to communicate design decisions clearly".to_string(),
        ]),
        Template::Generic => items.extend([
            "Excellent written and verbal communication skills".to_string(),
            "Strong organizational and problem-solving skills".to_string(),
            "Comfortable working in a fast-paced environment".to_string(),
        ]),
    }
    items
}

// --- Featured listings ---

struct Featured {
    title: &'static str,
    company: &'static str,
    location: &'static str,
    job_type: &'static str,
    experience: &'static str,
    salary: &'static str,
    rating: f64,
    posted: &'static str,
    description: &'static str,
}

const FEATURED: &[Featured] = &[
    Featured {
        title: "Senior Software Engineer",
        company: "Google",
        location: "Mountain View, CA",
        job_type: "full-time",
        experience: "Senior Level",
        salary: "$150K - $220K",
        rating: 4.5,
        posted: "3 days ago",
        description: "Join our team to build the next generation of search technology. You'll work on highly scalable systems that impact billions of users worldwide.",
    },
    Featured {
        title: "Product Manager",
        company: "Microsoft",
        location: "Redmond, WA",
        job_type: "full-time",
        experience: "Mid Level",
        salary: "$120K - $160K",
        rating: 4.3,
        posted: "2 days ago",
        description: "Drive product development for our cloud services division. Work with cross-functional teams to deliver innovative solutions to enterprise customers.",
    },
    Featured {
        title: "Frontend Developer",
        company: "Meta",
        location: "Remote",
        job_type: "full-time",
        experience: "Mid Level",
        salary: "$130K - $170K",
        rating: 4.1,
        posted: "1 week ago",
        description: "Build engaging user interfaces and experiences for Meta's family of apps. Focus on performance, accessibility, and cutting-edge web technologies.",
    },
    Featured {
        title: "Data Scientist",
        company: "Netflix",
        location: "Los Angeles, CA",
        job_type: "full-time",
        experience: "Mid Level",
        salary: "$140K - $180K",
        rating: 4.2,
        posted: "5 days ago",
        description: "Apply machine learning and analytics to help optimize our content recommendations and streaming quality for millions of users.",
    },
    Featured {
        title: "UX Designer",
        company: "Apple",
        location: "Cupertino, CA",
        job_type: "full-time",
        experience: "Senior Level",
        salary: "$130K - $180K",
        rating: 4.6,
        posted: "1 day ago",
        description: "Create intuitive and elegant user experiences for Apple products. Collaborate with engineering and product teams to define and implement innovative solutions.",
    },
    Featured {
        title: "DevOps Engineer",
        company: "Amazon",
        location: "Seattle, WA",
        job_type: "full-time",
        experience: "Mid Level",
        salary: "$125K - $165K",
        rating: 3.9,
        posted: "4 days ago",
        description: "Build and maintain infrastructure for high-volume services. Implement CI/CD pipelines and ensure reliability across AWS environments.",
    },
    Featured {
        title: "Machine Learning Engineer",
        company: "Tesla",
        location: "Austin, TX",
        job_type: "full-time",
        experience: "Senior Level",
        salary: "$160K - $210K",
        rating: 3.8,
        posted: "2 weeks ago",
        description: "Develop machine learning models for autonomous driving systems. Work with large datasets and state-of-the-art algorithms to solve complex problems.",
    },
    Featured {
        title: "Backend Developer",
        company: "Salesforce",
        location: "San Francisco, CA",
        job_type: "full-time",
        experience: "Mid Level",
        salary: "$135K - $175K",
        rating: 4.0,
        posted: "3 days ago",
        description: "Design and develop scalable backend services for our CRM platform. Focus on performance, security, and maintainability.",
    },
    Featured {
        title: "iOS Developer",
        company: "Spotify",
        location: "New York, NY",
        job_type: "full-time",
        experience: "Mid Level",
        salary: "$120K - $160K",
        rating: 4.2,
        posted: "1 week ago",
        description: "Build and improve our iOS app used by millions of users. Focus on performance, user experience, and audio playback quality.",
    },
    Featured {
        title: "Android Developer",
        company: "Airbnb",
        location: "Remote",
        job_type: "full-time",
        experience: "Mid Level",
        salary: "$125K - $165K",
        rating: 4.1,
        posted: "6 days ago",
        description: "Develop features for our Android app that helps people find and book accommodations worldwide. Focus on reliability and beautiful interfaces.",
    },
];

/// Curated listings shown before the user has searched for anything.
pub fn featured_listings() -> Vec<JobListing> {
    FEATURED
        .iter()
        .enumerate()
        .map(|(i, job)| JobListing {
            id: format!("featured-job-{}", i + 1),
            title: job.title.to_string(),
            company: job.company.to_string(),
            location: job.location.to_string(),
            description: job.description.to_string(),
            salary: job.salary.to_string(),
            date_posted: job.posted.to_string(),
            job_type: canonical_job_type(job.job_type),
            experience_level: job.experience.to_string(),
            remote: job.location.eq_ignore_ascii_case("remote"),
            company_rating: Some(job.rating),
            url: String::new(),
            logo: logo::resolve(job.company, None),
            responsibilities: Vec::new(),
            qualifications: Vec::new(),
            benefits: Vec::new(),
        })
        .collect()
}
