//! SearXNG metasearch adapter.

use super::Tool;
use crate::config::SearchSettings;
use crate::error::{Result, ZaaiError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

/// Number of results requested when the caller gives none.
pub const DEFAULT_RESULT_LIMIT: u32 = 10;

/// A single search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub result_limit: u32,
}

impl SearchQuery {
    /// Create a query; the limit must be at least 1.
    pub fn new(text: impl Into<String>, result_limit: u32) -> Result<Self> {
        if result_limit == 0 {
            return Err(ZaaiError::InvalidInput(
                "result limit must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            text: text.into(),
            result_limit,
        })
    }
}

/// Tool input as accepted by [`Tool::invoke`].
#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
    #[serde(default)]
    num_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<Value>,
}

/// Whether a search record is the in-band failure marker.
pub fn is_error_record(record: &Value) -> bool {
    record.get("error").is_some()
}

/// Searches a SearXNG instance for videos.
pub struct SearxSearchTool {
    client: reqwest::Client,
    base_url: String,
    settings: SearchSettings,
}

impl SearxSearchTool {
    /// Create a search tool from settings. The base URL must be set.
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let base_url = settings
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ZaaiError::Config(
                    "search.base_url is not set (set SEARXNG_BASE_URL or the config file)"
                        .to_string(),
                )
            })?
            .trim_end_matches('/')
            .to_string();

        url::Url::parse(&base_url).map_err(|e| {
            ZaaiError::Config(format!("search.base_url {:?} is not a valid URL: {}", base_url, e))
        })?;

        if settings.insecure {
            warn!(
                "TLS certificate verification is DISABLED for search requests to {}",
                base_url
            );
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.insecure)
            .build()?;

        Ok(Self {
            client,
            base_url,
            settings: settings.clone(),
        })
    }

    /// Run a search. Failures are reported as `[{"error": ...}]`, never raised.
    #[instrument(skip(self, query), fields(query = %query.text, limit = query.result_limit))]
    pub async fn search(&self, query: &SearchQuery) -> Vec<Value> {
        match self.try_search(query).await {
            Ok(results) => {
                info!("Search returned {} results", results.len());
                results
            }
            Err(e) => {
                warn!("Search failed, continuing with error record: {}", e);
                vec![json!({ "error": e.to_string() })]
            }
        }
    }

    async fn try_search(&self, query: &SearchQuery) -> Result<Vec<Value>> {
        let url = format!("{}/search", self.base_url);
        let params = self.query_params(query);

        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let body: SearxResponse = response.json().await?;
        Ok(body.results)
    }

    fn query_params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        let q = if self.settings.site_filter.is_empty() {
            query.text.clone()
        } else {
            format!("{} {}", query.text, self.settings.site_filter)
        };

        vec![
            ("q", q),
            ("format", "json".to_string()),
            ("safesearch", self.settings.safesearch.to_string()),
            ("categories", self.settings.categories.clone()),
            ("engines", self.settings.engines.clone()),
            ("pageno", "1".to_string()),
            ("language", self.settings.language.clone()),
            ("num_results", query.result_limit.to_string()),
        ]
    }
}

#[async_trait]
impl Tool for SearxSearchTool {
    fn name(&self) -> &str {
        "searx_search_tool"
    }

    fn description(&self) -> &str {
        "A tool to perform searches using the SearXNG metasearch engine. \
         Specify a query and optionally the number of results."
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let input: SearchInput = serde_json::from_value(input)
            .map_err(|e| ZaaiError::InvalidInput(format!("search input: {}", e)))?;
        let limit = input.num_results.unwrap_or(self.settings.result_limit);
        let query = SearchQuery::new(input.query, limit)?;

        Ok(Value::Array(self.search(&query).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_for(base_url: &str) -> SearxSearchTool {
        let settings = SearchSettings {
            base_url: Some(base_url.to_string()),
            ..SearchSettings::default()
        };
        SearxSearchTool::new(&settings).unwrap()
    }

    #[test]
    fn test_query_requires_positive_limit() {
        assert!(SearchQuery::new("rust", 0).is_err());
        assert_eq!(SearchQuery::new("rust", 3).unwrap().result_limit, 3);
    }

    #[test]
    fn test_missing_base_url_is_config_error() {
        let result = SearxSearchTool::new(&SearchSettings::default());
        assert!(matches!(result, Err(ZaaiError::Config(_))));
    }

    #[tokio::test]
    async fn test_insecure_client_builds_and_searches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "url": "https://www.youtube.com/watch?v=abc123" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = SearchSettings {
            base_url: Some(server.uri()),
            insecure: true,
            ..SearchSettings::default()
        };
        let tool = SearxSearchTool::new(&settings).unwrap();
        assert!(tool.settings.insecure);

        let results = tool.search(&SearchQuery::new("rust", 1).unwrap()).await;
        assert_eq!(results.len(), 1);
        assert!(!is_error_record(&results[0]));
    }

    #[test]
    fn test_unparseable_base_url_is_config_error() {
        let settings = SearchSettings {
            base_url: Some("searx without scheme".to_string()),
            ..SearchSettings::default()
        };
        assert!(matches!(
            SearxSearchTool::new(&settings),
            Err(ZaaiError::Config(_))
        ));
    }

    #[test]
    fn test_query_params() {
        let tool = tool_for("https://searx.example/");
        assert_eq!(tool.base_url, "https://searx.example");

        let params = tool.query_params(&SearchQuery::new("AI Agents", 7).unwrap());
        assert_eq!(params[0], ("q", "AI Agents :youtube".to_string()));
        assert!(params.contains(&("format", "json".to_string())));
        assert!(params.contains(&("safesearch", "1".to_string())));
        assert!(params.contains(&("categories", "general".to_string())));
        assert!(params.contains(&("engines", "google".to_string())));
        assert!(params.contains(&("pageno", "1".to_string())));
        assert!(params.contains(&("language", "en".to_string())));
        assert!(params.contains(&("num_results", "7".to_string())));
    }

    #[tokio::test]
    async fn test_search_returns_upstream_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "AI Agents :youtube"))
            .and(query_param("format", "json"))
            .and(query_param("num_results", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "AI Agents :youtube",
                "results": [
                    {"title": "Agents explained", "url": "https://www.youtube.com/watch?v=abc123"},
                    {"title": "Agents 101", "url": "https://www.youtube.com/watch?v=def456"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = tool_for(&server.uri());
        let results = tool
            .search(&SearchQuery::new("AI Agents", DEFAULT_RESULT_LIMIT).unwrap())
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["url"], "https://www.youtube.com/watch?v=abc123");
        assert!(!results.iter().any(is_error_record));
    }

    #[tokio::test]
    async fn test_search_server_error_becomes_error_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let results = tool_for(&server.uri())
            .search(&SearchQuery::new("rust", 5).unwrap())
            .await;

        assert_eq!(results.len(), 1);
        assert!(is_error_record(&results[0]));
    }

    #[tokio::test]
    async fn test_search_invalid_json_becomes_error_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let results = tool_for(&server.uri())
            .search(&SearchQuery::new("rust", 5).unwrap())
            .await;

        assert_eq!(results.len(), 1);
        assert!(is_error_record(&results[0]));
    }

    #[tokio::test]
    async fn test_search_connection_refused_becomes_error_record() {
        // Nothing listens on port 1.
        let results = tool_for("http://127.0.0.1:1")
            .search(&SearchQuery::new("rust", 5).unwrap())
            .await;

        assert_eq!(results.len(), 1);
        assert!(results[0]["error"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn test_invoke_uses_configured_default_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("num_results", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let output = tool_for(&server.uri())
            .invoke(json!({ "query": "rust" }))
            .await
            .unwrap();
        assert_eq!(output, json!([]));

        let err = tool_for(&server.uri())
            .invoke(json!({ "limit": 3 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ZaaiError::InvalidInput(_)));
    }
}
