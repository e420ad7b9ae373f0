//! HTTP client for listing objects through the Cloud Storage JSON API.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use vizbq_auth::Authenticator;

use crate::error::GcsError;
use crate::types::ObjectsPage;

const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com";

/// Objects per listing page; the API maximum.
const PAGE_SIZE: u32 = 1000;

/// Builds the `gs://` locator for an object.
#[must_use]
pub fn object_uri(bucket: &str, object_name: &str) -> String {
    format!("gs://{bucket}/{object_name}")
}

/// Client for the Cloud Storage JSON API.
pub struct StorageClient {
    client: Client,
    auth: Arc<Authenticator>,
    base_url: Url,
}

impl StorageClient {
    /// # Errors
    ///
    /// Returns [`GcsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        auth: Arc<Authenticator>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GcsError> {
        Self::with_base_url(auth, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`GcsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`GcsError::InvalidBaseUrl`] if `base_url` does not
    /// parse as a URL that can carry path segments.
    pub fn with_base_url(
        auth: Arc<Authenticator>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GcsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let invalid = |reason: String| GcsError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason,
        };
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        Ok(Self {
            client,
            auth,
            base_url,
        })
    }

    /// Lists every object name in `bucket`, in the order the service returns
    /// them (lexicographic by name), following page tokens to the end.
    ///
    /// The whole listing is materialized before returning; a failure on any
    /// page discards what was already fetched.
    ///
    /// # Errors
    ///
    /// - [`GcsError::BucketNotFound`] on HTTP 404.
    /// - [`GcsError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`GcsError::PaginationCycle`] if a page token repeats.
    /// - [`GcsError::Http`], [`GcsError::Auth`], [`GcsError::Deserialize`]
    ///   on transport, credential, or body failures.
    pub async fn list_object_names(&self, bucket: &str) -> Result<Vec<String>, GcsError> {
        let mut names = Vec::new();
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            let page = self.fetch_page(bucket, page_token.as_deref()).await?;
            names.extend(page.items.into_iter().map(|item| item.name));

            match page.next_page_token {
                Some(token) => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(GcsError::PaginationCycle {
                            bucket: bucket.to_owned(),
                            token,
                        });
                    }
                    page_token = Some(token);
                }
                None => break,
            }
        }

        tracing::info!(bucket, objects = names.len(), pages = page_count, "listed bucket");
        Ok(names)
    }

    async fn fetch_page(
        &self,
        bucket: &str,
        page_token: Option<&str>,
    ) -> Result<ObjectsPage, GcsError> {
        let url = self.objects_url(bucket, page_token);
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GcsError::BucketNotFound {
                bucket: bucket.to_owned(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GcsError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GcsError::Deserialize {
            context: format!("object listing of {bucket}"),
            source: e,
        })
    }

    /// Builds the listing URL with the bucket as a percent-encoded path
    /// segment.
    fn objects_url(&self, bucket: &str, page_token: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "b", bucket, "o"]);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("maxResults", &PAGE_SIZE.to_string());
            pairs.append_pair("fields", "items(name),nextPageToken");
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> StorageClient {
        let auth = Arc::new(Authenticator::with_static_token("t"));
        StorageClient::with_base_url(auth, 5, "vizbq-test", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn object_uri_joins_bucket_and_name() {
        assert_eq!(
            object_uri("creatives", "2024/banner.png"),
            "gs://creatives/2024/banner.png"
        );
    }

    #[test]
    fn objects_url_without_token() {
        let url = test_client("https://storage.googleapis.com").objects_url("creatives", None);
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/creatives/o?maxResults=1000&fields=items%28name%29%2CnextPageToken"
        );
    }

    #[test]
    fn objects_url_with_token_and_trailing_slash() {
        let url = test_client("http://127.0.0.1:4443/").objects_url("creatives", Some("CgRiLnBuZw=="));
        assert_eq!(url.path(), "/storage/v1/b/creatives/o");
        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "pageToken" && v == "CgRiLnBuZw=="));
    }

    #[test]
    fn with_base_url_rejects_non_base() {
        let auth = Arc::new(Authenticator::with_static_token("t"));
        let result = StorageClient::with_base_url(auth, 5, "vizbq-test", "mailto:ops@example.com");
        assert!(matches!(result, Err(GcsError::InvalidBaseUrl { .. })));
    }
}
