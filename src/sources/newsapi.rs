use super::{DocumentSource, RawArticle, SourceQuery};
use crate::types::{AppError, Result};
use crate::utils::toml_config::NewsroomConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// NewsAPI `everything` endpoint client
pub struct NewsApiSource {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Vec<RawArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl NewsApiSource {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("newsroom/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from `[news]`, resolving the key from the environment
    pub fn from_config(config: &NewsroomConfig) -> Result<Self> {
        let api_key = config
            .news_api_key()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Self::new(config.news.api_base.clone(), api_key, config.news.timeout())
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/everything", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl DocumentSource for NewsApiSource {
    async fn fetch(&self, query: &SourceQuery) -> Result<Vec<RawArticle>> {
        let from = query.range.start.format("%Y-%m-%dT%H:%M:%S").to_string();
        let to = query.range.end.format("%Y-%m-%dT%H:%M:%S").to_string();

        let response = self
            .http
            .get(self.endpoint())
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.topic.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("language", query.language.as_str()),
                ("sortBy", query.sort_by.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("NewsAPI request failed: {}", e)))?;

        let status = response.status();
        let body: EverythingResponse = response.json().await.map_err(|e| {
            AppError::Transport(format!("Unreadable NewsAPI response ({}): {}", status, e))
        })?;

        if body.status != "ok" {
            return Err(AppError::Transport(format!(
                "NewsAPI error {}: {}",
                body.code.as_deref().unwrap_or("unknown"),
                body.message.as_deref().unwrap_or("no message")
            )));
        }

        tracing::debug!(
            topic = %query.topic,
            articles = body.articles.len(),
            "NewsAPI fetch complete"
        );
        Ok(body.articles)
    }

    fn name(&self) -> &str {
        "newsapi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeRange;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> NewsApiSource {
        NewsApiSource::new(server.uri(), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_key() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(header("X-Api-Key", "test-key"))
            .and(query_param("q", "quantum computing"))
            .and(query_param("language", "en"))
            .and(query_param("sortBy", "relevancy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {"title": "A", "url": "https://a", "source": {"name": "Wire"}},
                    {"title": "B", "source": {"id": null, "name": null}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let articles = source(&server)
            .fetch(&SourceQuery::new("quantum computing", TimeRange::last_days(7)))
            .await
            .unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].clone().normalize().source_name, "Unknown Source");
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid"
            })))
            .mount(&server)
            .await;

        let err = source(&server)
            .fetch(&SourceQuery::new("x", TimeRange::last_days(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Transport(_)));
        assert!(err.to_string().contains("apiKeyInvalid"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = source(&server)
            .fetch(&SourceQuery::new("x", TimeRange::last_days(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }
}
