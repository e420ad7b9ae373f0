//! HTTP client for the Cloud Vision `images:annotate` endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use vizbq_auth::Authenticator;

use crate::error::VisionError;
use crate::types::{AnnotateImageResponse, BatchAnnotateImagesRequest, BatchAnnotateImagesResponse, FeatureType};

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";

/// Detectors requested for every image. Landmark and document-text
/// detection are deliberately left out.
pub const REQUESTED_FEATURES: [FeatureType; 10] = [
    FeatureType::ObjectLocalization,
    FeatureType::FaceDetection,
    FeatureType::LogoDetection,
    FeatureType::LabelDetection,
    FeatureType::TextDetection,
    FeatureType::SafeSearchDetection,
    FeatureType::ImageProperties,
    FeatureType::CropHints,
    FeatureType::WebDetection,
    FeatureType::ProductSearch,
];

/// Client for the Cloud Vision REST API.
///
/// Use [`VisionClient::new`] for production or [`VisionClient::with_base_url`]
/// to point at a mock server in tests.
pub struct VisionClient {
    client: Client,
    auth: Arc<Authenticator>,
    annotate_url: Url,
}

impl VisionClient {
    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        auth: Arc<Authenticator>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, VisionError> {
        Self::with_base_url(auth, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`VisionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VisionError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        auth: Arc<Authenticator>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let raw = format!("{}/v1/images:annotate", base_url.trim_end_matches('/'));
        let annotate_url = Url::parse(&raw).map_err(|e| VisionError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            auth,
            annotate_url,
        })
    }

    /// Annotates one image by URI with the standard [`REQUESTED_FEATURES`].
    ///
    /// # Errors
    ///
    /// See [`Self::annotate_image_with`].
    pub async fn annotate_image(
        &self,
        image_uri: &str,
    ) -> Result<AnnotateImageResponse, VisionError> {
        self.annotate_image_with(image_uri, &REQUESTED_FEATURES)
            .await
    }

    /// Annotates one image by URI, asking for `features` in order.
    ///
    /// # Errors
    ///
    /// - [`VisionError::Auth`] if no access token can be obtained.
    /// - [`VisionError::Http`] on network failure.
    /// - [`VisionError::UnexpectedStatus`] on a non-2xx status.
    /// - [`VisionError::Deserialize`] if the body is not a batch response.
    /// - [`VisionError::EmptyResponse`] if the batch holds no response.
    /// - [`VisionError::Annotation`] if the service reports a per-image error.
    pub async fn annotate_image_with(
        &self,
        image_uri: &str,
        features: &[FeatureType],
    ) -> Result<AnnotateImageResponse, VisionError> {
        let token = self.auth.access_token().await?;
        let request = BatchAnnotateImagesRequest::single(image_uri, features);

        tracing::debug!(uri = %image_uri, features = features.len(), "annotating image");

        let response = self
            .client
            .post(self.annotate_url.clone())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.annotate_url.to_string(),
                body,
            });
        }

        let body = response.text().await?;
        let batch: BatchAnnotateImagesResponse =
            serde_json::from_str(&body).map_err(|e| VisionError::Deserialize {
                context: format!("images:annotate({image_uri})"),
                source: e,
            })?;

        let annotated = batch
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::EmptyResponse {
                uri: image_uri.to_owned(),
            })?;

        if let Some(err) = annotated.error.as_ref().filter(|e| e.code != 0) {
            return Err(VisionError::Annotation {
                uri: image_uri.to_owned(),
                code: err.code,
                message: err.message.clone(),
            });
        }

        Ok(annotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_features_exclude_landmarks_and_documents() {
        let names: Vec<String> = REQUESTED_FEATURES
            .iter()
            .map(|f| serde_json::to_value(f).unwrap().as_str().unwrap().to_owned())
            .collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "OBJECT_LOCALIZATION");
        assert_eq!(names[9], "PRODUCT_SEARCH");
        assert!(!names.iter().any(|n| n == "LANDMARK_DETECTION"));
        assert!(!names.iter().any(|n| n == "DOCUMENT_TEXT_DETECTION"));
    }

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let auth = Arc::new(Authenticator::with_static_token("t"));
        let client =
            VisionClient::with_base_url(auth, 5, "vizbq-test", "http://127.0.0.1:9000/").unwrap();
        assert_eq!(
            client.annotate_url.as_str(),
            "http://127.0.0.1:9000/v1/images:annotate"
        );
    }

    #[test]
    fn with_base_url_rejects_garbage() {
        let auth = Arc::new(Authenticator::with_static_token("t"));
        let result = VisionClient::with_base_url(auth, 5, "vizbq-test", "not a url");
        assert!(matches!(result, Err(VisionError::InvalidBaseUrl { .. })));
    }
}
