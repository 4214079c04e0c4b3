use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{SearchError, UpstreamError};
use crate::fallback::FallbackGenerator;
use crate::models::{JobListing, SearchRequest, SearchResult};
use crate::normalize::normalize;
use crate::provider::UpstreamProvider;

/// Runs one search request end to end: upstream fetch, normalization, and
/// fallback generation when the provider has nothing usable.
pub struct SearchService<P: UpstreamProvider, R: Rng> {
    provider: P,
    generator: FallbackGenerator<R>,
}

impl<P: UpstreamProvider, R: Rng> SearchService<P, R> {
    pub fn new(provider: P, generator: FallbackGenerator<R>) -> Self {
        Self { provider, generator }
    }

    /// Never fails: a blank query yields an empty result, and any upstream
    /// failure is turned into a flagged fallback result.
    pub fn search(&mut self, request: &SearchRequest) -> SearchResult {
        if let Err(e) = check_query(request) {
            debug!(error = %e, "skipping upstream call");
            return SearchResult::empty();
        }

        let continuation = request.continuation_token.is_some();
        info!(
            query = %request.query,
            location = %request.location,
            continuation,
            provider = self.provider.name(),
            "searching"
        );

        match self.provider.fetch(request) {
            Ok(page) => {
                let listings: Vec<JobListing> = page.records.iter().map(normalize).collect();
                debug!(count = listings.len(), has_more = page.next_page_token.is_some(), "received listings");
                SearchResult {
                    total_results: page.total_results,
                    listings,
                    next_continuation_token: page.next_page_token,
                    is_fallback: false,
                    advisory: None,
                }
            }
            Err(e) if continuation => {
                warn!(kind = e.kind(), error = %e, "continuation failed; keeping current listings");
                failed_continuation(&e)
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "search failed; generating fallback listings");
                self.fallback(request, &e)
            }
        }
    }

    fn fallback(&mut self, request: &SearchRequest, cause: &UpstreamError) -> SearchResult {
        let listings = self.generator.generate(&request.query, &request.location);
        info!(count = listings.len(), "generated fallback listings");
        SearchResult {
            total_results: Some(listings.len()),
            listings,
            next_continuation_token: None,
            is_fallback: true,
            advisory: Some(cause.advisory().to_string()),
        }
    }
}

pub fn check_query(request: &SearchRequest) -> Result<(), SearchError> {
    if request.has_query() {
        Ok(())
    } else {
        Err(SearchError::EmptyQuery)
    }
}

// Nothing to append; the paginator keeps the held set and stops paging.
fn failed_continuation(cause: &UpstreamError) -> SearchResult {
    SearchResult {
        is_fallback: true,
        advisory: Some(cause.advisory().to_string()),
        ..SearchResult::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::Catalog;
    use crate::models::ProviderJobRecord;
    use crate::pagination::Paginator;
    use crate::provider::ProviderPage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    struct FakeProvider {
        calls: Cell<usize>,
        responses: RefCell<VecDeque<Result<ProviderPage, UpstreamError>>>,
    }

    impl FakeProvider {
        fn new(responses: Vec<Result<ProviderPage, UpstreamError>>) -> Self {
            Self {
                calls: Cell::new(0),
                responses: RefCell::new(responses.into()),
            }
        }
    }

    impl UpstreamProvider for FakeProvider {
        fn fetch(&self, _request: &SearchRequest) -> Result<ProviderPage, UpstreamError> {
            self.calls.set(self.calls.get() + 1);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(UpstreamError::NoResults))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn page(prefix: &str, count: usize, token: Option<&str>, total: Option<usize>) -> ProviderPage {
        ProviderPage {
            records: (0..count)
                .map(|i| {
                    ProviderJobRecord::from_value(json!({
                        "job_id": format!("{}{}", prefix, i),
                        "title": "Rust Engineer",
                        "company_name": "Ferrous Systems",
                        "location": "Berlin"
                    }))
                })
                .collect(),
            total_results: total,
            next_page_token: token.map(str::to_string),
        }
    }

    fn service(provider: FakeProvider) -> SearchService<FakeProvider, StdRng> {
        SearchService::new(
            provider,
            FallbackGenerator::new(Catalog::default(), StdRng::seed_from_u64(11)),
        )
    }

    #[test]
    fn test_empty_query_never_calls_upstream() {
        let mut svc = service(FakeProvider::new(vec![Ok(page("a", 3, None, None))]));
        let result = svc.search(&SearchRequest::fresh("   ", "Berlin"));
        assert_eq!(result, SearchResult::empty());
        assert_eq!(svc.provider.calls.get(), 0);
        assert_eq!(check_query(&SearchRequest::fresh("", "")), Err(SearchError::EmptyQuery));
    }

    #[test]
    fn test_successful_search_is_normalized() {
        let mut svc = service(FakeProvider::new(vec![Ok(page("a", 3, Some("t1"), Some(42)))]));
        let result = svc.search(&SearchRequest::fresh("rust", "Berlin"));
        assert_eq!(svc.provider.calls.get(), 1);
        assert!(!result.is_fallback);
        assert_eq!(result.advisory, None);
        assert_eq!(result.listings.len(), 3);
        assert_eq!(result.listings[0].id, "a0");
        assert_eq!(result.listings[0].salary, "Not specified");
        assert_eq!(result.total_results, Some(42));
        assert_eq!(result.next_continuation_token.as_deref(), Some("t1"));
    }

    #[test]
    fn test_missing_total_stays_unreported() {
        let mut svc = service(FakeProvider::new(vec![Ok(page("a", 4, None, None))]));
        let mut pager = Paginator::new();
        let ticket = pager.begin_search("rust", "");
        let result = svc.search(ticket.request());
        assert_eq!(result.total_results, None);

        pager.accept(&ticket, result).unwrap();
        assert_eq!(pager.total_results(), 4);
    }

    #[test]
    fn test_fully_empty_falls_back() {
        let mut svc = service(FakeProvider::new(vec![Err(UpstreamError::FullyEmpty)]));
        let result = svc.search(&SearchRequest::fresh("underwater basket weaver", ""));
        assert!(result.is_fallback);
        assert!((6..=10).contains(&result.listings.len()));
        assert_eq!(result.total_results, Some(result.listings.len()));
        assert_eq!(result.next_continuation_token, None);
        assert!(result.advisory.unwrap().contains("similar positions"));
        assert!(result.listings.iter().all(|j| j.id.starts_with("fallback-")));
    }

    #[test]
    fn test_connectivity_failure_falls_back_with_connect_advisory() {
        let mut svc = service(FakeProvider::new(vec![Err(UpstreamError::Transport(
            "connection refused".to_string(),
        ))]));
        let result = svc.search(&SearchRequest::fresh("nurse", "Leeds"));
        assert!(result.is_fallback);
        assert!(result.advisory.unwrap().contains("couldn't connect"));
    }

    #[test]
    fn test_failed_continuation_keeps_held_listings() {
        let mut svc = service(FakeProvider::new(vec![
            Ok(page("a", 9, Some("t1"), Some(90))),
            Err(UpstreamError::Status(502)),
        ]));
        let mut pager = Paginator::new();

        let ticket = pager.begin_search("rust", "Berlin");
        let first = svc.search(ticket.request());
        pager.accept(&ticket, first).unwrap();

        let ticket = pager.begin_continuation().unwrap();
        let second = svc.search(ticket.request());
        assert!(second.is_fallback);
        assert!(second.listings.is_empty());
        pager.accept(&ticket, second).unwrap();

        assert_eq!(svc.provider.calls.get(), 2);
        assert_eq!(pager.listings().len(), 9);
        assert!(!pager.has_more());
        assert!(pager.advisory().is_some());
        assert!(!pager.is_fallback());
    }

    #[test]
    fn test_continuation_appends() {
        let mut svc = service(FakeProvider::new(vec![
            Ok(page("a", 9, Some("t1"), None)),
            Ok(page("b", 9, Some("t2"), None)),
        ]));
        let mut pager = Paginator::new();

        let ticket = pager.begin_search("rust", "");
        pager.accept(&ticket, svc.search(ticket.request())).unwrap();
        let ticket = pager.begin_continuation().unwrap();
        pager.accept(&ticket, svc.search(ticket.request())).unwrap();

        assert_eq!(pager.listings().len(), 18);
        assert_eq!(pager.listings()[9].id, "b0");
        assert!(pager.has_more());
    }
}
