//! Data source abstraction for per-country news and analytics.
//!
//! - `HttpSource` talks to the backend API.
//! - `MemorySource` serves fixtures, optionally with artificial latency, for
//!   tests and offline runs.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use foundation::ids::CountryId;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::protocol::{NewsItem, RawAnalytics};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Unavailable(String),
}

/// Per-country news and analytics provider.
///
/// Implementations must be `Send + Sync` so fetch cycles can run on any task.
pub trait CountryDataSource: Send + Sync {
    fn fetch_news(&self, id: &CountryId) -> BoxFuture<'_, Result<Vec<NewsItem>, SourceError>>;

    /// `Ok(None)` when the server answers with an empty (null) body.
    fn fetch_analytics(
        &self,
        id: &CountryId,
    ) -> BoxFuture<'_, Result<Option<RawAnalytics>, SourceError>>;
}

/// Backend API over HTTP.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn news_url(&self, id: &CountryId) -> String {
        format!("{}/api/news/country/{id}/", self.base_url)
    }

    pub fn analytics_url(&self) -> String {
        format!("{}/api/analytics/country/", self.base_url)
    }

    pub fn news_request(&self, id: &CountryId) -> Result<reqwest::Request, SourceError> {
        let url = self.news_url(id);
        build(self.client.get(&url), url)
    }

    /// The id is sent exactly as the dataset spells it.
    pub fn analytics_request(&self, id: &CountryId) -> Result<reqwest::Request, SourceError> {
        let url = self.analytics_url();
        build(self.client.get(&url).query(&[("country", id.as_str())]), url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::Request,
    ) -> Result<T, SourceError> {
        let url = request.url().to_string();
        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|source| SourceError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await.map_err(|source| SourceError::Transport {
            url: url.clone(),
            source,
        })?;
        debug!(%url, bytes = bytes.len(), "response received");
        serde_json::from_slice(&bytes).map_err(|source| SourceError::Decode { url, source })
    }
}

fn build(builder: reqwest::RequestBuilder, url: String) -> Result<reqwest::Request, SourceError> {
    builder
        .build()
        .map_err(|source| SourceError::Transport { url, source })
}

impl CountryDataSource for HttpSource {
    fn fetch_news(&self, id: &CountryId) -> BoxFuture<'_, Result<Vec<NewsItem>, SourceError>> {
        let request = self.news_request(id);
        Box::pin(async move { self.get_json(request?).await })
    }

    fn fetch_analytics(
        &self,
        id: &CountryId,
    ) -> BoxFuture<'_, Result<Option<RawAnalytics>, SourceError>> {
        let request = self.analytics_request(id);
        Box::pin(async move { self.get_json(request?).await })
    }
}

/// Canned responses for one country.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryFixture {
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub analytics: Option<RawAnalytics>,
    #[serde(default)]
    pub fail_news: bool,
    #[serde(default)]
    pub fail_analytics: bool,
    #[serde(default)]
    pub news_delay_ms: u64,
    #[serde(default)]
    pub analytics_delay_ms: u64,
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("invalid fixture file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid country id {0:?} in fixture file")]
    CountryId(String),
}

/// In-memory source. Unknown countries get an empty news list and no
/// analytics, like the backend does.
#[derive(Debug, Default)]
pub struct MemorySource {
    fixtures: RwLock<HashMap<CountryId, CountryFixture>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `{"<country id>": CountryFixture, ...}`.
    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        let raw: HashMap<String, CountryFixture> = serde_json::from_str(text)?;
        let mut fixtures = HashMap::with_capacity(raw.len());
        for (key, fixture) in raw {
            let id: CountryId = key
                .parse()
                .map_err(|_| FixtureError::CountryId(key.clone()))?;
            fixtures.insert(id, fixture);
        }
        Ok(Self {
            fixtures: RwLock::new(fixtures),
        })
    }

    pub async fn set_fixture(&self, id: CountryId, fixture: CountryFixture) {
        self.fixtures.write().await.insert(id, fixture);
    }

    async fn fixture(&self, id: &CountryId) -> CountryFixture {
        self.fixtures
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

async fn delay(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

impl CountryDataSource for MemorySource {
    fn fetch_news(&self, id: &CountryId) -> BoxFuture<'_, Result<Vec<NewsItem>, SourceError>> {
        let id = id.clone();
        Box::pin(async move {
            let fixture = self.fixture(&id).await;
            delay(fixture.news_delay_ms).await;
            if fixture.fail_news {
                return Err(SourceError::Unavailable(format!("news for {id} unavailable")));
            }
            Ok(fixture.news)
        })
    }

    fn fetch_analytics(
        &self,
        id: &CountryId,
    ) -> BoxFuture<'_, Result<Option<RawAnalytics>, SourceError>> {
        let id = id.clone();
        Box::pin(async move {
            let fixture = self.fixture(&id).await;
            delay(fixture.analytics_delay_ms).await;
            if fixture.fail_analytics {
                return Err(SourceError::Unavailable(format!(
                    "analytics for {id} unavailable"
                )));
            }
            Ok(fixture.analytics)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CountryDataSource, FixtureError, HttpSource, MemorySource, SourceError};
    use foundation::ids::CountryId;

    #[test]
    fn builds_endpoint_urls() {
        let src = HttpSource::new("http://localhost:8000/");
        assert_eq!(src.base_url(), "http://localhost:8000");
        assert_eq!(
            src.news_url(&CountryId::numeric(356)),
            "http://localhost:8000/api/news/country/356/"
        );
        assert_eq!(
            src.analytics_url(),
            "http://localhost:8000/api/analytics/country/"
        );
    }

    #[test]
    fn zero_padded_ids_reach_the_backend_unchanged() {
        let src = HttpSource::new("http://api");
        let australia: CountryId = "036".parse().unwrap();

        let news = src.news_request(&australia).unwrap();
        assert_eq!(news.url().as_str(), "http://api/api/news/country/036/");
        let analytics = src.analytics_request(&australia).unwrap();
        assert_eq!(
            analytics.url().as_str(),
            "http://api/api/analytics/country/?country=036"
        );

        // Same country as far as camera overrides and fixtures are concerned.
        assert_eq!(australia, CountryId::numeric(36));
    }

    #[tokio::test]
    async fn memory_source_serves_fixtures() {
        let src = MemorySource::from_json(
            r#"{
                "356": {
                    "news": [{ "title": "Budget passes", "source": "PTI" }],
                    "analytics": { "llm_insights": ["Fiscal focus"] }
                },
                "250": { "fail_analytics": true }
            }"#,
        )
        .unwrap();

        let india = CountryId::numeric(356);
        let news = src.fetch_news(&india).await.unwrap();
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].source.as_deref(), Some("PTI"));
        let analytics = src.fetch_analytics(&india).await.unwrap().unwrap();
        assert_eq!(analytics.llm_insights, Some(vec!["Fiscal focus".to_string()]));

        let france = CountryId::numeric(250);
        assert!(src.fetch_news(&france).await.unwrap().is_empty());
        assert!(matches!(
            src.fetch_analytics(&france).await,
            Err(SourceError::Unavailable(_))
        ));

        let unknown = CountryId::code("XYZ");
        assert!(src.fetch_news(&unknown).await.unwrap().is_empty());
        assert!(src.fetch_analytics(&unknown).await.unwrap().is_none());
    }

    #[test]
    fn rejects_bad_fixture_keys() {
        assert!(matches!(
            MemorySource::from_json(r#"{"": {}}"#),
            Err(FixtureError::CountryId(_))
        ));
        assert!(matches!(
            MemorySource::from_json("[]"),
            Err(FixtureError::Json(_))
        ));
    }
}
