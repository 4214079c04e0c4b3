mod config;
mod db;
mod error;
mod fallback;
mod filter;
mod logging;
mod logo;
mod models;
mod normalize;
mod pagination;
mod provider;
mod search;
mod suggestions;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use config::Config;
use db::Database;
use fallback::{Catalog, FallbackGenerator};
use models::{DatePosted, FilterCriteria, JobListing};
use pagination::Paginator;
use provider::{SerpApiProvider, UpstreamProvider};
use rand::SeedableRng;
use rand::rngs::StdRng;
use search::SearchService;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;
use suggestions::SuggestionKind;
use tracing::info;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Job search from the terminal - search, filter, and page through listings")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for jobs
    Search {
        /// What to search for (title, skill, company)
        query: String,

        /// Where to search
        #[arg(short, long, default_value = "")]
        location: String,

        /// Number of upstream pages to load
        #[arg(long, default_value = "1")]
        pages: usize,

        /// Page of the filtered results to display
        #[arg(long, default_value = "1")]
        page: usize,

        #[command(flatten)]
        filters: FilterArgs,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one listing in full
    Show {
        /// The search that produced the listing
        query: String,

        /// Listing ID, or its position in the filtered results
        id: String,

        /// Where to search
        #[arg(short, long, default_value = "")]
        location: String,

        /// Number of upstream pages to load
        #[arg(long, default_value = "1")]
        pages: usize,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show featured listings
    Featured {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest job titles, companies or locations
    Suggest {
        /// Partial input (at least 2 characters)
        text: String,

        /// Restrict to one pool; without it, titles and companies are mixed
        #[arg(short, long, value_enum)]
        kind: Option<SuggestionKind>,
    },

    /// Manage recent searches
    Recent {
        #[command(subcommand)]
        command: RecentCommands,
    },
}

#[derive(Subcommand)]
enum RecentCommands {
    /// List recent searches
    List,

    /// Remove a recent search
    Remove {
        /// Search text to forget
        text: String,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Job type (full_time, part_time, contract, internship)
    #[arg(long)]
    job_type: Option<String>,

    /// Experience level (entry, mid, senior)
    #[arg(long)]
    experience: Option<String>,

    /// Posted within (day, week, month, all)
    #[arg(long, default_value = "all")]
    posted: DatePosted,

    /// Minimum salary in thousands
    #[arg(long, default_value = "0")]
    min_salary: u32,

    /// Only listings whose location mentions remote
    #[arg(long)]
    remote: bool,
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            job_type: FilterCriteria::constraint(self.job_type.as_deref()),
            experience_level: FilterCriteria::constraint(self.experience.as_deref()),
            date_posted: self.posted,
            min_salary_thousands: self.min_salary,
            remote_only: self.remote,
        }
    }
}

fn run_search(config: &Config, query: &str, location: &str, pages: usize) -> Result<Paginator> {
    let provider = SerpApiProvider::new(config)?;
    search_pages(provider, config.load_catalog()?, query, location, pages)
}

/// Fresh search followed by up to `pages - 1` continuations.
///
/// Sample listings are seeded from the search itself, so `search` and a later
/// `show` for the same query and location see the same batch.
fn search_pages<P: UpstreamProvider>(
    provider: P,
    catalog: Catalog,
    query: &str,
    location: &str,
    pages: usize,
) -> Result<Paginator> {
    let rng = StdRng::seed_from_u64(fallback_seed(query, location));
    let mut service = SearchService::new(provider, FallbackGenerator::new(catalog, rng));
    let mut pager = Paginator::new();

    let ticket = pager.begin_search(query, location);
    let result = service.search(ticket.request());
    pager.accept(&ticket, result)?;

    for _ in 1..pages.max(1) {
        if !pager.has_more() {
            break;
        }
        let ticket = pager.begin_continuation()?;
        let result = service.search(ticket.request());
        pager.accept(&ticket, result)?;
    }

    info!(
        held = pager.listings().len(),
        total = pager.total_results(),
        fallback = pager.is_fallback(),
        "search complete"
    );
    Ok(pager)
}

fn fallback_seed(query: &str, location: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.trim().to_lowercase().hash(&mut hasher);
    location.trim().to_lowercase().hash(&mut hasher);
    hasher.finish()
}

fn print_listings(listings: &[JobListing], first_position: usize) {
    println!(
        "{:<4} {:<30} {:<20} {:<22} {:<10} {:>18}",
        "#", "TITLE", "COMPANY", "LOCATION", "TYPE", "SALARY"
    );
    println!("{}", "-".repeat(109));
    for (i, job) in listings.iter().enumerate() {
        println!(
            "{:<4} {:<30} {:<20} {:<22} {:<10} {:>18}",
            first_position + i,
            truncate(&job.title, 28),
            truncate(&job.company, 18),
            truncate(&job.location, 20),
            truncate(&job.job_type, 10),
            truncate(&job.salary, 18)
        );
    }
}

fn print_listing_detail(job: &JobListing) {
    println!("{}", job.title);
    println!("Company: {}", job.company);
    if job.remote {
        println!("Location: {} (remote work available)", job.location);
    } else {
        println!("Location: {}", job.location);
    }
    println!("Type: {}", job.job_type);
    if !job.experience_level.is_empty() {
        println!("Experience: {}", job.experience_level);
    }
    println!("Salary: {}", job.salary);
    println!("Posted: {}", job.date_posted);
    if let Some(rating) = job.company_rating {
        println!("Rating: {:.1}", rating);
    }
    if !job.url.is_empty() {
        println!("Apply: {}", job.url);
    }
    println!("ID: {}", job.id);

    match &job.logo {
        Some(logo) => {
            println!("\nLogo (try in order):");
            for attempt in logo.attempts() {
                println!("  {}", attempt);
            }
        }
        None => println!("\nLogo: none"),
    }
    let badge = logo::placeholder(&job.company);
    println!(
        "Badge: {} (background {}, text {})",
        badge.initials, badge.background, badge.foreground
    );

    if !job.description.is_empty() {
        println!("\n--- Description ---\n{}", textwrap::fill(&job.description, 80));
    }
    print_section("Responsibilities", &job.responsibilities);
    print_section("Qualifications", &job.qualifications);
    print_section("Benefits", &job.benefits);
}

fn print_section(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n--- {} ---", heading);
    let options = textwrap::Options::new(80)
        .initial_indent("  - ")
        .subsequent_indent("    ");
    for item in items {
        println!("{}", textwrap::fill(item, &options));
    }
}

fn find_listing<'a>(listings: &'a [JobListing], id: &str) -> Option<&'a JobListing> {
    listings.iter().find(|job| job.id == id).or_else(|| {
        id.parse::<usize>()
            .ok()
            .filter(|&position| position > 0)
            .and_then(|position| listings.get(position - 1))
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            query,
            location,
            pages,
            page,
            filters,
            json,
        } => {
            let pager = run_search(&config, &query, &location, pages)?;
            if !query.trim().is_empty() {
                Database::open()?.save_recent_search(&query)?;
            }

            let page = page.max(1);
            let criteria = filters.criteria();
            let view = pager.view(&criteria, page, config.page_size);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&view).context("Failed to serialize results")?
                );
                return Ok(());
            }

            if let Some(advisory) = &view.advisory {
                println!("Note: {}\n", advisory);
            }
            if view.listings.is_empty() {
                if view.held_count == 0 {
                    println!("No jobs found.");
                } else if criteria.is_active() && view.filtered_count == 0 {
                    println!("No jobs match the current filters ({} loaded).", view.held_count);
                } else {
                    println!("No jobs on page {}.", view.page);
                }
            } else {
                print_listings(&view.listings, (page - 1) * config.page_size + 1);
            }

            println!(
                "\nPage {} of {} ({} shown after filters, {} loaded, {} total results)",
                view.page,
                view.total_pages,
                view.filtered_count,
                view.held_count,
                view.total_results
            );
            if view.is_fallback {
                println!("(Sample listings: the job search service had no live results.)");
            } else if pager.has_more() {
                println!("More results available: rerun with --pages {}", pages.max(1) + 1);
            }
        }

        Commands::Show {
            query,
            id,
            location,
            pages,
            filters,
        } => {
            let pager = run_search(&config, &query, &location, pages)?;
            // Positions count the same filtered list that `search` numbers.
            let shown = filter::apply_filters(pager.listings(), &filters.criteria());
            match find_listing(&shown, &id) {
                Some(job) => {
                    if let Some(advisory) = pager.advisory() {
                        println!("Note: {}\n", advisory);
                    }
                    print_listing_detail(job);
                }
                None => {
                    println!("Listing '{}' not found in results for '{}'.", id, query);
                }
            }
        }

        Commands::Featured { json } => {
            let featured = fallback::featured_listings();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&featured).context("Failed to serialize listings")?
                );
            } else {
                println!("Featured jobs\n");
                print_listings(&featured, 1);
            }
        }

        Commands::Suggest { text, kind } => {
            let found = match kind {
                Some(kind) => suggestions::suggest(kind, &text),
                None => suggestions::suggest_combined(&text),
            };
            if found.is_empty() {
                println!("No suggestions.");
            } else {
                for suggestion in found {
                    println!("{}", suggestion);
                }
            }
        }

        Commands::Recent { command } => {
            let db = Database::open()?;
            info!(path = %db.path().display(), "opened recent search store");
            let recent = match command {
                RecentCommands::List => db.recent_searches()?,
                RecentCommands::Remove { text } => {
                    let updated = db.remove_recent_search(&text)?;
                    println!("Removed '{}'.", text);
                    updated
                }
            };
            if recent.is_empty() {
                println!("No recent searches.");
            } else {
                for (i, query) in recent.iter().enumerate() {
                    println!("{:<3} {}", i + 1, query);
                }
            }
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
