use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::models::{ProviderJobRecord, SearchRequest};

/// One page of raw records from the provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderPage {
    pub records: Vec<ProviderJobRecord>,
    pub total_results: Option<usize>,
    pub next_page_token: Option<String>,
}

// --- Provider trait ---

pub trait UpstreamProvider {
    fn fetch(&self, request: &SearchRequest) -> Result<ProviderPage, UpstreamError>;
    fn name(&self) -> &str;
}

// --- SerpAPI google_jobs provider ---

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    error: Option<String>,
    search_information: Option<SearchInformation>,
    jobs_results: Option<Vec<Value>>,
    search_metadata: Option<SearchMetadata>,
    serpapi_pagination: Option<SerpApiPagination>,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    jobs_results_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchMetadata {
    total_results: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SerpApiPagination {
    next_page_token: Option<String>,
}

#[derive(Debug)]
pub struct SerpApiProvider {
    api_key: Option<String>,
    endpoint: String,
    engine: String,
    language: String,
    client: reqwest::blocking::Client,
}

impl SerpApiProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            engine: config.engine.clone(),
            language: config.language.clone(),
            client,
        })
    }

    fn query_params<'a>(&'a self, request: &'a SearchRequest, api_key: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![("engine", self.engine.as_str()), ("q", request.query.as_str())];
        if !request.location.trim().is_empty() {
            params.push(("location", request.location.as_str()));
        }
        params.push(("hl", self.language.as_str()));
        params.push(("api_key", api_key));
        if let Some(token) = request.continuation_token.as_deref() {
            params.push(("next_page_token", token));
        }
        params
    }
}

impl UpstreamProvider for SerpApiProvider {
    fn fetch(&self, request: &SearchRequest) -> Result<ProviderPage, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::Unconfigured)?;

        let http_request = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params(request, api_key))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        debug!(url = %redact(http_request.url().as_str(), api_key), "requesting job listings");

        let response = self
            .client
            .execute(http_request)
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        parse_response(status.as_u16(), &body)
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}

/// Classifies a raw provider response. Anything other than a non-empty
/// record list is reported as an `UpstreamError`.
pub fn parse_response(status: u16, body: &str) -> Result<ProviderPage, UpstreamError> {
    if !(200..300).contains(&status) {
        return Err(UpstreamError::Status(status));
    }

    let response: SerpApiResponse = serde_json::from_str(body).map_err(|e| {
        UpstreamError::Parse(format!(
            "{} (first 200 chars: {})",
            e,
            body.chars().take(200).collect::<String>()
        ))
    })?;

    if let Some(error) = response.error {
        return Err(UpstreamError::ErrorPayload(error));
    }
    let fully_empty = response
        .search_information
        .and_then(|info| info.jobs_results_state)
        .is_some_and(|state| state == "Fully empty");
    if fully_empty {
        return Err(UpstreamError::FullyEmpty);
    }

    let records: Vec<ProviderJobRecord> = response
        .jobs_results
        .unwrap_or_default()
        .into_iter()
        .map(ProviderJobRecord::from_value)
        .collect();
    if records.is_empty() {
        return Err(UpstreamError::NoResults);
    }

    let total_results = response
        .search_metadata
        .and_then(|meta| meta.total_results)
        .and_then(|total| match total {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.replace(',', "").trim().parse().ok(),
            _ => None,
        })
        .map(|total| total as usize);

    Ok(ProviderPage {
        records,
        total_results,
        next_page_token: response
            .serpapi_pagination
            .and_then(|p| p.next_page_token)
            .filter(|t| !t.is_empty()),
    })
}

fn redact(url: &str, secret: &str) -> String {
    if secret.is_empty() {
        return url.to_string();
    }
    url.replace(secret, "REDACTED_KEY")
}
