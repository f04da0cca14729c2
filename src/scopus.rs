//! Scopus Search API client.
//!
//! Pages through `GET /content/search/scopus` one request at a time,
//! flattening each page into [`NormalizedRecord`]s.
//!
//! API Details:
//! - Authentication via the `X-ELS-APIKey` header
//! - At most 25 entries per request (`count`), offset by `start`
//! - Total hit count reported in `opensearch:totalResults` (a string)
//! - An empty result set is a single entry carrying an `error` field
//!
//! Pagination stops when the requested cap is reached, when a page comes back
//! empty, or when the reported total has been covered. Requests are strictly
//! sequential with a courtesy delay between pages.

use crate::error::{Result, ScopusError};
use crate::record::{normalize, NormalizedRecord, ScopusEntry};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Scopus Search API endpoint
pub const SCOPUS_API_URL: &str = "https://api.elsevier.com/content/search/scopus";

/// Maximum entries Scopus returns per request
pub const MAX_PAGE_SIZE: usize = 25;

/// Pause between successive page requests
pub const COURTESY_DELAY: Duration = Duration::from_millis(500);

/// Result cap used when the caller does not choose one
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Authentication header expected by the Elsevier APIs
const API_KEY_HEADER: &str = "X-ELS-APIKey";

/// Client tuning knobs.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Search endpoint (overridable for proxies and tests)
    pub endpoint: String,
    /// Entries requested per page, clamped to `1..=MAX_PAGE_SIZE`
    pub page_size: usize,
    /// Delay before each follow-up page
    pub courtesy_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: SCOPUS_API_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            courtesy_delay: COURTESY_DELAY,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of a pagination run that keeps whatever was gathered before a failure.
#[derive(Debug)]
pub struct PartialFetch {
    /// Records gathered, in API order
    pub records: Vec<NormalizedRecord>,
    /// Error that stopped pagination early, if any
    pub error: Option<ScopusError>,
}

impl PartialFetch {
    /// Discard gathered records if pagination failed.
    pub fn into_result(self) -> Result<Vec<NormalizedRecord>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.records),
        }
    }
}

// === Scopus API Response Types ===

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "search-results")]
    search_results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    entry: Vec<ScopusEntry>,
    #[serde(rename = "opensearch:totalResults", default)]
    total_results: Option<String>,
}

/// One parsed page.
#[derive(Debug)]
struct Page {
    entries: Vec<ScopusEntry>,
    total: usize,
}

/// Scopus Search API client
pub struct ScopusClient {
    client: Client,
    endpoint: Url,
    page_size: usize,
    courtesy_delay: Duration,
}

impl ScopusClient {
    /// Create a new ScopusClient from `config`.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ScopusError::Config(format!("Invalid endpoint {}: {}", config.endpoint, e)))?;

        let client = Client::builder()
            .user_agent("rustscopus/1.0")
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScopusError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
            courtesy_delay: config.courtesy_delay,
        })
    }

    /// Entries requested per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Run `query` and collect up to `max_results` records (rounded up to a whole page).
    ///
    /// Any failure discards records already gathered from earlier pages.
    pub async fn search(
        &self,
        api_key: &str,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<NormalizedRecord>> {
        self.search_partial(api_key, query, max_results)
            .await
            .into_result()
    }

    /// Like [`ScopusClient::search`], but keeps the records gathered before a failure.
    pub async fn search_partial(&self, api_key: &str, query: &str, max_results: usize) -> PartialFetch {
        info!(query = query, max_results = max_results, "Starting Scopus search");

        let mut records = Vec::new();
        let mut start = 0;

        while start < max_results {
            let page = match self.fetch_page(api_key, query, start).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(start = start, gathered = records.len(), error = %e, "Scopus request failed");
                    return PartialFetch {
                        records,
                        error: Some(e),
                    };
                }
            };

            if page.entries.is_empty() {
                debug!(start = start, "Empty page, stopping");
                break;
            }

            let count = page.entries.len();
            records.extend(page.entries.into_iter().map(normalize));
            debug!(start = start, count = count, total = page.total, "Fetched Scopus page");

            if start + self.page_size >= page.total {
                break;
            }

            start += self.page_size;
            tokio::time::sleep(self.courtesy_delay).await;
        }

        info!(total = records.len(), "Scopus search complete");
        PartialFetch {
            records,
            error: None,
        }
    }

    /// Request and parse one page starting at offset `start`.
    async fn fetch_page(&self, api_key: &str, query: &str, start: usize) -> Result<Page> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "application/json")
            .query(&[
                ("query", query.to_string()),
                ("count", self.page_size.to_string()),
                ("start", start.to_string()),
                ("view", "STANDARD".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ScopusError::Api {
                code: status.as_u16(),
                body,
            });
        }

        parse_page(&body)
    }
}

/// Parse a Scopus search body, dropping empty-result placeholder entries.
fn parse_page(body: &str) -> Result<Page> {
    let data: SearchResponse = serde_json::from_str(body)
        .map_err(|e| ScopusError::MalformedResponse(format!("Failed to parse Scopus response: {}", e)))?;

    let total = match data.search_results.total_results.as_deref().map(str::trim) {
        None | Some("") => 0,
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            ScopusError::MalformedResponse(format!("Invalid opensearch:totalResults: {:?}", raw))
        })?,
    };

    let entries = data
        .search_results
        .entry
        .into_iter()
        .filter(|e| !e.is_placeholder())
        .collect();

    Ok(Page { entries, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(n: usize) -> Value {
        json!({
            "dc:title": format!("Paper {}", n),
            "dc:creator": "Smith J.",
            "prism:coverDate": "2023-05-01",
            "prism:doi": format!("10.1000/{}", n),
            "citedby-count": n.to_string()
        })
    }

    fn page_body(first: usize, count: usize, total: usize) -> Value {
        let entries: Vec<Value> = (first..first + count).map(entry).collect();
        json!({
            "search-results": {
                "opensearch:totalResults": total.to_string(),
                "entry": entries
            }
        })
    }

    fn test_client(server: &MockServer) -> ScopusClient {
        ScopusClient::new(FetchConfig {
            endpoint: format!("{}/content/search/scopus", server.uri()),
            courtesy_delay: Duration::ZERO,
            ..Default::default()
        })
        .expect("client")
    }

    async fn mount_page(server: &MockServer, start: usize, body: Value) {
        Mock::given(method("GET"))
            .and(query_param("start", start.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_parse_page_placeholder() {
        let body = r#"{"search-results":{"opensearch:totalResults":"0","entry":[{"@_fa":"true","error":"Result set was empty"}]}}"#;
        let page = parse_page(body).expect("parse");
        assert!(page.entries.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_parse_page_malformed() {
        assert!(matches!(
            parse_page("<html>oops</html>"),
            Err(ScopusError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_page(r#"{"unexpected": {}}"#),
            Err(ScopusError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_page(r#"{"search-results":{"opensearch:totalResults":"many","entry":[]}}"#),
            Err(ScopusError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_page_size_clamped() {
        let client = ScopusClient::new(FetchConfig {
            page_size: 100,
            ..Default::default()
        })
        .expect("client");
        assert_eq!(client.page_size(), MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_sends_expected_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("X-ELS-APIKey", "secret"))
            .and(header("Accept", "application/json"))
            .and(query_param("query", "ai AND PUBYEAR IS 2024"))
            .and(query_param("count", "25"))
            .and(query_param("start", "0"))
            .and(query_param("view", "STANDARD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0, 3, 3)))
            .expect(1)
            .mount(&server)
            .await;

        let records = test_client(&server)
            .search("secret", "ai AND PUBYEAR IS 2024", 200)
            .await
            .expect("search");
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_full_pages_in_order() {
        let server = MockServer::start().await;
        for p in 0..3 {
            mount_page(&server, p * 25, page_body(p * 25, 25, 75)).await;
        }

        let records = test_client(&server)
            .search("key", "q", 200)
            .await
            .expect("search");

        assert_eq!(records.len(), 75);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.title, format!("Paper {}", i));
        }
    }

    #[tokio::test]
    async fn test_courtesy_delay_only_between_pages() {
        let delay = Duration::from_millis(300);
        let server = MockServer::start().await;
        mount_page(&server, 0, page_body(0, 25, 50)).await;
        mount_page(&server, 25, page_body(25, 25, 50)).await;

        let client = ScopusClient::new(FetchConfig {
            endpoint: server.uri(),
            courtesy_delay: delay,
            ..Default::default()
        })
        .expect("client");

        let started = std::time::Instant::now();
        let records = client.search("key", "q", 200).await.expect("search");
        let elapsed = started.elapsed();

        assert_eq!(records.len(), 50);
        assert!(elapsed >= delay, "no pause between pages: {:?}", elapsed);
        assert!(elapsed < delay * 2, "pause after last page: {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_stops_at_max_results() {
        let server = MockServer::start().await;
        mount_page(&server, 0, page_body(0, 25, 1000)).await;
        mount_page(&server, 25, page_body(25, 25, 1000)).await;

        let records = test_client(&server)
            .search("key", "q", 40)
            .await
            .expect("search");
        assert_eq!(records.len(), 50);

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_stops_without_error() {
        let server = MockServer::start().await;
        mount_page(&server, 0, page_body(0, 25, 500)).await;
        mount_page(&server, 25, page_body(0, 0, 500)).await;

        let records = test_client(&server)
            .search("key", "q", 200)
            .await
            .expect("search");
        assert_eq!(records.len(), 25);
    }

    #[tokio::test]
    async fn test_unauthorized_first_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API Key"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server)
            .search("bad", "q", 200)
            .await
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Error: 401 - Invalid API Key");
    }

    #[tokio::test]
    async fn test_later_failure_discards_earlier_pages() {
        let server = MockServer::start().await;
        mount_page(&server, 0, page_body(0, 25, 100)).await;
        Mock::given(method("GET"))
            .and(query_param("start", "25"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Quota exceeded"))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.search("key", "q", 200).await.expect_err("should fail");
        assert!(matches!(err, ScopusError::Api { code: 429, .. }));

        let partial = client.search_partial("key", "q", 200).await;
        assert_eq!(partial.records.len(), 25);
        assert!(partial.error.is_some());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .search("key", "q", 25)
            .await
            .expect_err("should fail");
        assert!(matches!(err, ScopusError::MalformedResponse(_)));
    }
}
