//! Citation intent labelling.
//!
//! Classifiers are black boxes behind [`IntentClassifier`]. A failed prediction never
//! stops the pipeline: the label falls back to [`FALLBACK_INTENT`].

pub mod heuristic;
pub mod http;

pub use heuristic::HeuristicClassifier;
pub use http::HttpIntentClassifier;

use clap::ValueEnum;
use log::warn;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Label used when the classifier fails
pub const FALLBACK_INTENT: &str = "Other";

/// One citation occurrence to classify
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentRequest {
    pub text: String,
    pub cite_start: u64,
    pub cite_end: u64,
    #[serde(skip)]
    pub section: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned status {0}")]
    Status(u16),

    #[error("invalid prediction: {0}")]
    InvalidPrediction(String),
}

pub trait IntentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn predict(&self, request: &IntentRequest) -> Result<String, ClassifierError>;

    /// Predict, logging a failure and falling back to [`FALLBACK_INTENT`]
    fn predict_or_fallback(&self, request: &IntentRequest) -> String {
        match self.predict(request) {
            Ok(label) => label,
            Err(e) => {
                warn!("Intent classification failed ({}): {}", self.name(), e);
                FALLBACK_INTENT.to_string()
            }
        }
    }

    /// Labels for a batch, in request order
    fn predict_batch(&self, requests: &[IntentRequest]) -> Vec<String> {
        requests.iter().map(|r| self.predict_or_fallback(r)).collect()
    }
}

/// Which classifier labels contexts that arrive without an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClassifierKind {
    /// Section and keyword rules
    Heuristic,
    /// External classification service
    Http,
    /// Leave unlabelled contexts as Unknown
    None,
}

/// Build the configured classifier; `None` for [`ClassifierKind::None`]
pub fn build_classifier(
    kind: ClassifierKind,
    url: Option<&str>,
    timeout: Duration,
    concurrency: usize,
) -> anyhow::Result<Option<Box<dyn IntentClassifier>>> {
    Ok(match kind {
        ClassifierKind::None => None,
        ClassifierKind::Heuristic => Some(Box::new(HeuristicClassifier) as Box<dyn IntentClassifier>),
        ClassifierKind::Http => {
            let url = url.ok_or_else(|| anyhow::anyhow!("--classifier-url is required with --classify http"))?;
            Some(Box::new(HttpIntentClassifier::new(url, timeout, concurrency)?) as Box<dyn IntentClassifier>)
        }
    })
}
