use futures::stream::{self, StreamExt};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::runtime::Runtime;

use super::{ClassifierError, IntentClassifier, IntentRequest, FALLBACK_INTENT};

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    predicted_class: Option<String>,
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    raw_prediction: Option<serde_json::Value>,
}

/// Client of an external classification service: `POST <base>/classify`
pub struct HttpIntentClassifier {
    endpoint: String,
    client: Client,
    timeout: Duration,
    concurrency: usize,
    runtime: Runtime,
}

impl HttpIntentClassifier {
    pub fn new(base_url: &str, timeout: Duration, concurrency: usize) -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: format!("{}/classify", base_url.trim_end_matches('/')),
            client: Client::builder().build()?,
            timeout,
            concurrency: concurrency.max(1),
            runtime: Runtime::new()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn classify(&self, request: &IntentRequest) -> Result<String, ClassifierError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let body: ClassifyResponse = response.json().await?;
        match body.predicted_class {
            Some(label) if body.valid && !label.trim().is_empty() => Ok(label),
            _ => Err(ClassifierError::InvalidPrediction(
                body.raw_prediction.map(|v| v.to_string()).unwrap_or_default(),
            )),
        }
    }
}

impl IntentClassifier for HttpIntentClassifier {
    fn name(&self) -> &'static str {
        "http"
    }

    fn predict(&self, request: &IntentRequest) -> Result<String, ClassifierError> {
        self.runtime.block_on(self.classify(request))
    }

    /// Up to `concurrency` requests in flight; labels come back in request order
    fn predict_batch(&self, requests: &[IntentRequest]) -> Vec<String> {
        self.runtime.block_on(
            stream::iter(requests)
                .map(|request| async move {
                    match self.classify(request).await {
                        Ok(label) => label,
                        Err(e) => {
                            debug!("Intent classification failed for {:?}: {}", request.text, e);
                            FALLBACK_INTENT.to_string()
                        }
                    }
                })
                .buffered(self.concurrency)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> IntentRequest {
        IntentRequest { text: "as in [1]".into(), cite_start: 6, cite_end: 9, section: None }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let classifier = HttpIntentClassifier::new("http://localhost:8000/", Duration::from_secs(1), 4).unwrap();
        assert_eq!(classifier.endpoint(), "http://localhost:8000/classify");
    }

    #[test]
    fn test_unreachable_service_falls_back() {
        // Port 9 (discard) on localhost is closed in test environments.
        let classifier = HttpIntentClassifier::new("http://127.0.0.1:9", Duration::from_millis(500), 2).unwrap();
        assert!(classifier.predict(&request()).is_err());
        assert_eq!(classifier.predict_batch(&[request(), request()]), vec![FALLBACK_INTENT, FALLBACK_INTENT]);
    }

    #[test]
    fn test_response_parsing() {
        let body: ClassifyResponse =
            serde_json::from_str(r#"{"predicted_class": "method", "valid": true}"#).unwrap();
        assert_eq!(body.predicted_class.as_deref(), Some("method"));
        assert!(body.valid);

        let body: ClassifyResponse = serde_json::from_str(r#"{"raw_prediction": "???"}"#).unwrap();
        assert!(!body.valid);
    }
}
