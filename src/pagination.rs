use serde::Serialize;
use tracing::{debug, warn};

use crate::error::SearchError;
use crate::filter::apply_filters;
use crate::models::{FilterCriteria, JobListing, SearchRequest, SearchResult};

pub const DEFAULT_PAGE_SIZE: usize = 9;

/// The upstream request that continues `request` from where `current` left off.
///
/// Tokens are opaque: we only ever hand back what the provider gave us.
pub fn next_page(
    current: Option<&SearchResult>,
    request: &SearchRequest,
) -> Result<SearchRequest, SearchError> {
    let token = current
        .and_then(|result| result.next_continuation_token.as_deref())
        .ok_or(SearchError::ContinuationWithoutToken)?;

    Ok(SearchRequest {
        query: request.query.clone(),
        location: request.location.clone(),
        continuation_token: Some(token.to_string()),
    })
}

/// Fresh searches replace the held set; continuations append (no dedup).
pub fn merge_result(
    existing: Vec<JobListing>,
    incoming: &SearchResult,
    is_fresh_search: bool,
) -> Vec<JobListing> {
    if is_fresh_search {
        return incoming.listings.clone();
    }
    let mut merged = existing;
    merged.extend(incoming.listings.iter().cloned());
    merged
}

pub fn total_pages(filtered_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    filtered_count.div_ceil(page_size)
}

/// 1-based page of `listings`; out-of-range pages are empty.
pub fn page_slice(listings: &[JobListing], page: usize, page_size: usize) -> &[JobListing] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= listings.len() {
        return &[];
    }
    let end = (start + page_size).min(listings.len());
    &listings[start..end]
}

/// Handle for one outstanding upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    fresh: bool,
    request: SearchRequest,
}

impl Ticket {
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub listings: Vec<JobListing>,
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub held_count: usize,
    pub total_results: usize,
    pub is_fallback: bool,
    pub advisory: Option<String>,
}

/// Holds the current listing set and continuation token across
/// "search" and "load more" requests.
///
/// Every request gets a generation number; only a response to the most
/// recently issued request is accepted.
#[derive(Debug, Default)]
pub struct Paginator {
    held: Option<SearchResult>,
    request: Option<SearchRequest>,
    issued: u64,
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh search. Any held token is dropped immediately so a
    /// "load more" cannot mix pages from two different searches.
    pub fn begin_search(&mut self, query: &str, location: &str) -> Ticket {
        if let Some(held) = self.held.as_mut() {
            held.next_continuation_token = None;
        }
        let request = SearchRequest::fresh(query, location);
        self.request = Some(request.clone());
        self.issue(request, true)
    }

    pub fn begin_continuation(&mut self) -> Result<Ticket, SearchError> {
        let base = self
            .request
            .as_ref()
            .ok_or(SearchError::ContinuationWithoutToken)?;
        let request = next_page(self.held.as_ref(), base)?;
        Ok(self.issue(request, false))
    }

    fn issue(&mut self, request: SearchRequest, fresh: bool) -> Ticket {
        self.issued += 1;
        debug!(generation = self.issued, fresh, "issuing search request");
        Ticket {
            generation: self.issued,
            fresh,
            request,
        }
    }

    /// Folds a response into the held state, or rejects it as stale.
    pub fn accept(&mut self, ticket: &Ticket, incoming: SearchResult) -> Result<(), SearchError> {
        if ticket.generation != self.issued {
            warn!(
                received = ticket.generation,
                latest = self.issued,
                "discarding stale search response"
            );
            return Err(SearchError::StaleResponse {
                received: ticket.generation,
                latest: self.issued,
            });
        }

        if ticket.fresh {
            let listings = merge_result(Vec::new(), &incoming, true);
            self.held = Some(SearchResult { listings, ..incoming });
            return Ok(());
        }

        let Some(held) = self.held.as_mut() else {
            self.held = Some(incoming);
            return Ok(());
        };

        if incoming.is_fallback {
            // A failed "load more" keeps what we have and stops paging.
            held.next_continuation_token = None;
            held.advisory = incoming.advisory;
            return Ok(());
        }

        let existing = std::mem::take(&mut held.listings);
        held.listings = merge_result(existing, &incoming, false);
        held.total_results = incoming.total_results;
        held.next_continuation_token = incoming.next_continuation_token;
        held.advisory = incoming.advisory;
        Ok(())
    }

    pub fn listings(&self) -> &[JobListing] {
        self.held.as_ref().map(|h| h.listings.as_slice()).unwrap_or(&[])
    }

    pub fn has_more(&self) -> bool {
        self.held
            .as_ref()
            .is_some_and(|h| h.next_continuation_token.is_some())
    }

    /// The provider's reported total when the latest page carried one,
    /// otherwise the number of listings held.
    pub fn total_results(&self) -> usize {
        self.held
            .as_ref()
            .map(|h| h.total_results.unwrap_or(h.listings.len()))
            .unwrap_or(0)
    }

    pub fn is_fallback(&self) -> bool {
        self.held.as_ref().is_some_and(|h| h.is_fallback)
    }

    pub fn advisory(&self) -> Option<&str> {
        self.held.as_ref().and_then(|h| h.advisory.as_deref())
    }

    /// Filtered, paged view of the held set. Page count is computed on the
    /// filtered subset; the held set itself is never truncated.
    pub fn view(&self, criteria: &FilterCriteria, page: usize, page_size: usize) -> PageView {
        let filtered = apply_filters(self.listings(), criteria);
        PageView {
            listings: page_slice(&filtered, page, page_size).to_vec(),
            page,
            total_pages: total_pages(filtered.len(), page_size),
            filtered_count: filtered.len(),
            held_count: self.listings().len(),
            total_results: self.total_results(),
            is_fallback: self.is_fallback(),
            advisory: self.advisory().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str) -> JobListing {
        JobListing {
            id: id.to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Austin, TX".to_string(),
            description: String::new(),
            salary: "Not specified".to_string(),
            date_posted: "Recently".to_string(),
            job_type: "Full-time".to_string(),
            experience_level: String::new(),
            remote: false,
            company_rating: None,
            url: String::new(),
            logo: None,
            responsibilities: Vec::new(),
            qualifications: Vec::new(),
            benefits: Vec::new(),
        }
    }

    fn result(prefix: &str, count: usize, token: Option<&str>, total: usize) -> SearchResult {
        SearchResult {
            listings: (0..count).map(|i| listing(&format!("{}{}", prefix, i))).collect(),
            total_results: Some(total),
            next_continuation_token: token.map(str::to_string),
            is_fallback: false,
            advisory: None,
        }
    }

    #[test]
    fn test_next_page_requires_token() {
        let request = SearchRequest::fresh("rust", "Berlin");
        assert_eq!(next_page(None, &request), Err(SearchError::ContinuationWithoutToken));

        let no_token = result("a", 3, None, 3);
        assert_eq!(
            next_page(Some(&no_token), &request),
            Err(SearchError::ContinuationWithoutToken)
        );

        let with_token = result("a", 3, Some("opaque=="), 30);
        let next = next_page(Some(&with_token), &request).unwrap();
        assert_eq!(next.query, "rust");
        assert_eq!(next.location, "Berlin");
        assert_eq!(next.continuation_token.as_deref(), Some("opaque=="));
    }

    #[test]
    fn test_merge_result_append_and_replace() {
        let first = result("a", 9, Some("t1"), 50);
        let second = result("b", 9, Some("t2"), 50);
        let merged = merge_result(first.listings.clone(), &second, false);
        assert_eq!(merged.len(), 18);
        assert_eq!(merged[9].id, "b0");

        let replaced = merge_result(merged, &result("c", 5, None, 5), true);
        assert_eq!(replaced.len(), 5);
        assert_eq!(replaced[0].id, "c0");
    }

    #[test]
    fn test_total_pages_ceiling() {
        assert_eq!(total_pages(0, 9), 0);
        assert_eq!(total_pages(9, 9), 1);
        assert_eq!(total_pages(10, 9), 2);
        assert_eq!(total_pages(18, 9), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_page_slice_bounds() {
        let items: Vec<JobListing> = (0..20).map(|i| listing(&i.to_string())).collect();
        assert_eq!(page_slice(&items, 1, 9).len(), 9);
        assert_eq!(page_slice(&items, 3, 9).len(), 2);
        assert_eq!(page_slice(&items, 3, 9)[0].id, "18");
        assert!(page_slice(&items, 4, 9).is_empty());
        assert!(page_slice(&items, 0, 9).is_empty());
    }

    #[test]
    fn test_paginator_merge_scenario() {
        let mut pager = Paginator::new();

        let ticket = pager.begin_search("rust", "");
        assert_eq!(ticket.request().continuation_token, None);
        pager.accept(&ticket, result("a", 9, Some("t1"), 40)).unwrap();
        assert_eq!(pager.listings().len(), 9);
        assert!(pager.has_more());

        let ticket = pager.begin_continuation().unwrap();
        assert_eq!(ticket.request().continuation_token.as_deref(), Some("t1"));
        pager.accept(&ticket, result("b", 9, Some("t2"), 40)).unwrap();
        assert_eq!(pager.listings().len(), 18);
        assert_eq!(pager.total_results(), 40);

        let ticket = pager.begin_search("go", "");
        pager.accept(&ticket, result("c", 5, None, 5)).unwrap();
        assert_eq!(pager.listings().len(), 5);
        assert!(!pager.has_more());
    }

    #[test]
    fn test_continuation_without_token_is_an_error() {
        let mut pager = Paginator::new();
        assert_eq!(pager.begin_continuation(), Err(SearchError::ContinuationWithoutToken));

        let ticket = pager.begin_search("rust", "");
        pager.accept(&ticket, result("a", 3, None, 3)).unwrap();
        assert_eq!(pager.begin_continuation(), Err(SearchError::ContinuationWithoutToken));
    }

    #[test]
    fn test_fresh_search_drops_held_token() {
        let mut pager = Paginator::new();
        let ticket = pager.begin_search("rust", "");
        pager.accept(&ticket, result("a", 9, Some("t1"), 40)).unwrap();

        let _pending = pager.begin_search("go", "");
        assert!(!pager.has_more());
        assert_eq!(pager.begin_continuation(), Err(SearchError::ContinuationWithoutToken));
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let mut pager = Paginator::new();
        let slow = pager.begin_search("rust", "");
        let fast = pager.begin_search("rust developer", "");

        pager.accept(&fast, result("fast", 4, None, 4)).unwrap();
        let err = pager.accept(&slow, result("slow", 9, Some("t"), 9)).unwrap_err();
        assert_eq!(err, SearchError::StaleResponse { received: 1, latest: 2 });
        assert_eq!(pager.listings().len(), 4);
        assert_eq!(pager.listings()[0].id, "fast0");
    }

    #[test]
    fn test_failed_continuation_keeps_held_set() {
        let mut pager = Paginator::new();
        let ticket = pager.begin_search("rust", "");
        pager.accept(&ticket, result("a", 9, Some("t1"), 40)).unwrap();

        let ticket = pager.begin_continuation().unwrap();
        let mut failed = result("f", 7, None, 7);
        failed.is_fallback = true;
        failed.advisory = Some("offline".to_string());
        pager.accept(&ticket, failed).unwrap();

        assert_eq!(pager.listings().len(), 9);
        assert!(!pager.is_fallback());
        assert!(!pager.has_more());
        assert_eq!(pager.advisory(), Some("offline"));
    }

    #[test]
    fn test_total_falls_back_to_held_count() {
        let mut pager = Paginator::new();
        let ticket = pager.begin_search("rust", "");
        pager.accept(&ticket, result("a", 9, Some("t1"), 120)).unwrap();
        assert_eq!(pager.total_results(), 120);

        let ticket = pager.begin_continuation().unwrap();
        let mut unreported = result("b", 9, None, 0);
        unreported.total_results = None;
        pager.accept(&ticket, unreported).unwrap();
        assert_eq!(pager.total_results(), 18);
    }

    #[test]
    fn test_reported_total_is_used_as_is() {
        let mut pager = Paginator::new();
        let ticket = pager.begin_search("rust", "");
        pager.accept(&ticket, result("a", 9, Some("t1"), 9)).unwrap();
        let ticket = pager.begin_continuation().unwrap();
        pager.accept(&ticket, result("b", 9, None, 12)).unwrap();
        assert_eq!(pager.listings().len(), 18);
        assert_eq!(pager.total_results(), 12);
    }

    #[test]
    fn test_view_pages_over_filtered_subset() {
        let mut pager = Paginator::new();
        let ticket = pager.begin_search("rust", "");
        let mut incoming = result("a", 12, None, 12);
        for job in incoming.listings.iter_mut().take(10) {
            job.location = "Remote".to_string();
        }
        pager.accept(&ticket, incoming).unwrap();

        let criteria = FilterCriteria {
            remote_only: true,
            ..FilterCriteria::default()
        };
        let view = pager.view(&criteria, 2, DEFAULT_PAGE_SIZE);
        assert_eq!(view.filtered_count, 10);
        assert_eq!(view.held_count, 12);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.listings.len(), 1);
        assert_eq!(view.listings[0].id, "a9");
    }
}
