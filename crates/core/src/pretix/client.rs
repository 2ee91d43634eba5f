//! reqwest-backed pretix REST client.

use std::collections::HashSet;
use std::future::Future;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http::{self, send_with_retry, RetryPolicy};

use super::types::{Item, Order, Page, Question};
use super::{PretixSource, SourceError};

/// Connection settings for one pretix event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PretixConfig {
    /// Base URL of the pretix instance.
    #[serde(default = "default_url")]
    pub url: String,
    /// Organizer slug.
    #[serde(default = "default_organizer_slug")]
    pub organizer_slug: String,
    /// Event slug (required).
    #[serde(default)]
    pub event_slug: String,
    /// API token. Falls back to the docker secret named below.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Name of a docker secret holding the API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_secret_name: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "https://tickets.swdec.de".to_string()
}

fn default_organizer_slug() -> String {
    "kv-stuttgart".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for PretixConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            organizer_slug: default_organizer_slug(),
            event_slug: String::new(),
            api_token: None,
            api_token_secret_name: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// pretix API client scoped to one event.
pub struct PretixClient {
    client: Client,
    event_url: String,
    token: String,
    retry: RetryPolicy,
}

impl PretixClient {
    /// Create a client for the event described by `config`.
    pub fn new(
        config: &PretixConfig,
        api_token: impl Into<String>,
        retry: RetryPolicy,
    ) -> Result<Self, SourceError> {
        if config.event_slug.trim().is_empty() {
            return Err(SourceError::Validation(
                "pretix event slug is required".to_string(),
            ));
        }

        let client = http::build_client(config.timeout_secs)?;
        let event_url = format!(
            "{}/api/v1/organizers/{}/events/{}",
            config.url.trim_end_matches('/'),
            urlencoding::encode(&config.organizer_slug),
            urlencoding::encode(&config.event_slug)
        );

        Ok(Self {
            client,
            event_url,
            token: api_token.into(),
            retry,
        })
    }

    /// Base URL of the event endpoints.
    pub fn event_url(&self) -> &str {
        &self.event_url
    }

    /// GET a URL and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        debug!("pretix GET {}", url);

        let auth = format!("Token {}", self.token);
        let response = send_with_retry(&self.retry, "pretix", || {
            self.client
                .get(url)
                .header(reqwest::header::AUTHORIZATION, &auth)
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("{}: {}", url, e)))
    }

    /// Fetch every page of a listing endpoint.
    async fn get_all<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, SourceError> {
        let first = format!("{}/{}/", self.event_url, endpoint);
        let results = collect_pages(first, |url| async move {
            self.get_json::<Page<T>>(&url).await
        })
        .await?;

        debug!("Fetched {} {} from pretix", results.len(), endpoint);
        Ok(results)
    }
}

/// Follow `next` pointers from `first` until the listing is exhausted.
///
/// Results keep first-seen order. A `next` pointing at an already fetched
/// page is reported as a parse error.
pub async fn collect_pages<T, F, Fut>(first: String, mut fetch: F) -> Result<Vec<T>, SourceError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, SourceError>>,
{
    let mut results = Vec::new();
    let mut seen = HashSet::new();
    let mut next = Some(first);

    while let Some(url) = next.take() {
        if !seen.insert(url.clone()) {
            return Err(SourceError::Parse(format!(
                "pagination loops back to {}",
                url
            )));
        }

        let page = fetch(url).await?;
        results.extend(page.results);
        next = page.next.filter(|n| !n.is_empty());
    }

    Ok(results)
}

#[async_trait]
impl PretixSource for PretixClient {
    async fn fetch_questions(&self) -> Result<Vec<Question>, SourceError> {
        self.get_all("questions").await
    }

    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError> {
        self.get_all("items").await
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, SourceError> {
        self.get_all("orders").await
    }

    async fn fetch_question_detail(&self, question_id: i64) -> Result<Value, SourceError> {
        let url = format!("{}/questions/{}/", self.event_url, question_id);
        self.get_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn page(results: &[i64], next: Option<&str>) -> Page<i64> {
        Page {
            results: results.to_vec(),
            next: next.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_collect_pages_follows_next() {
        let pages: HashMap<String, Page<i64>> = [
            ("p1".to_string(), page(&[1, 2], Some("p2"))),
            ("p2".to_string(), page(&[3], Some("p3"))),
            ("p3".to_string(), page(&[4, 5], None)),
        ]
        .into_iter()
        .collect();

        let mut requested = Vec::new();
        let results = collect_pages("p1".to_string(), |url| {
            requested.push(url.clone());
            let page = pages.get(&url).cloned();
            async move { page.ok_or_else(|| SourceError::Parse(url)) }
        })
        .await
        .unwrap();

        assert_eq!(results, vec![1, 2, 3, 4, 5]);
        assert_eq!(requested, vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_collect_pages_empty_next_stops() {
        let results = collect_pages("only".to_string(), |_| async {
            Ok(page(&[7], Some("")))
        })
        .await
        .unwrap();
        assert_eq!(results, vec![7]);
    }

    #[tokio::test]
    async fn test_collect_pages_detects_loop() {
        let result = collect_pages("a".to_string(), |url| async move {
            Ok(if url == "a" {
                page(&[1], Some("b"))
            } else {
                page(&[2], Some("a"))
            })
        })
        .await;
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_collect_pages_propagates_errors() {
        let result: Result<Vec<i64>, _> = collect_pages("a".to_string(), |url| async move {
            Err(SourceError::Status {
                status: 503,
                url,
                message: "down".to_string(),
            })
        })
        .await;
        assert!(matches!(result, Err(SourceError::Status { status: 503, .. })));
    }

    #[test]
    fn test_client_builds_event_url() {
        let config = PretixConfig {
            url: "https://tickets.example.org/".to_string(),
            event_slug: "teencamp".to_string(),
            ..PretixConfig::default()
        };
        let client = PretixClient::new(&config, "token", RetryPolicy::none()).unwrap();
        assert_eq!(
            client.event_url(),
            "https://tickets.example.org/api/v1/organizers/kv-stuttgart/events/teencamp"
        );
    }

    #[test]
    fn test_client_requires_event_slug() {
        let result = PretixClient::new(&PretixConfig::default(), "token", RetryPolicy::none());
        assert!(matches!(result, Err(SourceError::Validation(_))));
    }
}
