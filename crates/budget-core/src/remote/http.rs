//! REST document API client.
//!
//! Endpoints:
//! - `PUT    {base}/{collection}/{id}` with the document body
//! - `POST   {base}/{collection}` returning `{"id": "..."}`
//! - `DELETE {base}/{collection}/{id}`
//! - `GET    {base}/{collection}/{id}` returning `{"id", "data"}` or 404
//! - `GET    {base}/{collection}?where=field:value&orderBy=field:desc`
//!   returning `[{"id", "data"}, ...]`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use super::{Collection, Document, DocumentQuery, RemoteError, RemoteResult, RemoteStore};

const MAX_LOG_BODY_CHARS: usize = 512;

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: String,
    message: String,
}

/// Remote store backed by an HTTP document service.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl HttpRemoteStore {
    /// Create a client for `base_url` (e.g. "https://docs.example.com/v1").
    ///
    /// Requests wait as long as the service takes to answer.
    pub fn new(base_url: &str, token: Option<String>) -> RemoteResult<Self> {
        Self::build(base_url, token, None)
    }

    /// Like [`HttpRemoteStore::new`], but every request gives up after
    /// `timeout`.
    pub fn with_timeout(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> RemoteResult<Self> {
        Self::build(base_url, token, Some(timeout))
    }

    fn build(base_url: &str, token: Option<String>, timeout: Option<Duration>) -> RemoteResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.name())
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection.name(), id)
    }

    fn headers(&self) -> RemoteResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteError::api(401, "Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    fn log_response(status: StatusCode, body: &str) {
        if status.is_success() {
            tracing::debug!("Document API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        tracing::debug!("Document API error ({}): {}", status, preview);
    }

    /// Read the body, mapping non-success statuses to [`RemoteError::Api`].
    async fn checked_body(response: reqwest::Response) -> RemoteResult<String> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                let message = if error.code.is_empty() {
                    error.message
                } else {
                    format!("{}: {}", error.code, error.message)
                };
                return Err(RemoteError::api(status.as_u16(), message));
            }
            return Err(RemoteError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        Ok(body)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> RemoteResult<T> {
        let body = Self::checked_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn set(&self, collection: Collection, id: &str, data: Value) -> RemoteResult<()> {
        let response = self
            .client
            .put(self.document_url(collection, id))
            .headers(self.headers()?)
            .json(&data)
            .send()
            .await?;

        Self::checked_body(response).await?;
        Ok(())
    }

    async fn add(&self, collection: Collection, data: Value) -> RemoteResult<String> {
        let response = self
            .client
            .post(self.collection_url(collection))
            .headers(self.headers()?)
            .json(&data)
            .send()
            .await?;

        let created: CreatedResponse = Self::parse_response(response).await?;
        Ok(created.id)
    }

    async fn delete(&self, collection: Collection, id: &str) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.document_url(collection, id))
            .headers(self.headers()?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::checked_body(response).await?;
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> RemoteResult<Option<Document>> {
        let response = self
            .client
            .get(self.document_url(collection, id))
            .headers(self.headers()?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    async fn query(
        &self,
        collection: Collection,
        query: &DocumentQuery,
    ) -> RemoteResult<Vec<Document>> {
        let response = self
            .client
            .get(self.collection_url(collection))
            .headers(self.headers()?)
            .query(&query.to_query_pairs())
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_trim_trailing_slash() {
        let store = HttpRemoteStore::new("https://docs.example.com/v1/", None).unwrap();

        assert_eq!(
            store.collection_url(Collection::Budgets),
            "https://docs.example.com/v1/budgets"
        );
        assert_eq!(
            store.document_url(Collection::Users, "u1"),
            "https://docs.example.com/v1/users/u1"
        );
    }

    #[test]
    fn test_headers_carry_bearer_token() {
        let store =
            HttpRemoteStore::new("https://docs.example.com", Some("secret".to_string())).unwrap();
        let headers = store.headers().unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_no_timeout_unless_asked() {
        let store = HttpRemoteStore::new("https://docs.example.com", None).unwrap();
        assert_eq!(store.timeout(), None);

        let store = HttpRemoteStore::with_timeout(
            "https://docs.example.com",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(store.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_headers_without_token() {
        let store = HttpRemoteStore::new("https://docs.example.com", None).unwrap();
        assert!(store.headers().unwrap().get(AUTHORIZATION).is_none());
    }
}
