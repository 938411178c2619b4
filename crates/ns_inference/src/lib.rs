use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ns_core::{Error, Result, SpeechSynthesizer};
use reqwest::Client;
use tracing::info;

pub mod comparison;
pub mod json;
pub mod models;
pub mod retry;
pub mod sentiment;
pub mod speech;
pub mod topics;

pub use comparison::Comparator;
pub use models::{create_generator, create_sentiment_classifier, create_topic_classifier};
pub use retry::RetryPolicy;
pub use sentiment::SentimentTagger;
pub use speech::{GoogleSpeechClient, Narrator, ServiceAccount};
pub use topics::TopicTagger;

/// What to do when a classifier call fails for one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole batch.
    #[default]
    Abort,
    /// Tag the article Unknown and continue.
    MarkUnknown,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "unknown" | "mark-unknown" => Ok(FailurePolicy::MarkUnknown),
            other => Err(format!("invalid failure policy '{}' (expected abort or unknown)", other)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => f.write_str("abort"),
            FailurePolicy::MarkUnknown => f.write_str("unknown"),
        }
    }
}

#[derive(Clone)]
pub struct InferenceConfig {
    pub generator: String,
    pub generator_model: Option<String>,
    pub groq_api_key: Option<String>,
    pub model_url: Option<String>,
    pub classifier: String,
    pub hf_api_token: Option<String>,
    pub service_account: Option<ServiceAccount>,
    pub retry: RetryPolicy,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("generator", &self.generator)
            .field("generator_model", &self.generator_model)
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "<redacted>"))
            .field("model_url", &self.model_url)
            .field("classifier", &self.classifier)
            .field("hf_api_token", &self.hf_api_token.as_ref().map(|_| "<redacted>"))
            .field("service_account", &self.service_account)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            generator: "groq".to_string(),
            generator_model: None,
            groq_api_key: None,
            model_url: None,
            classifier: "huggingface".to_string(),
            hf_api_token: None,
            service_account: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// The speech client, or `None` when credentials are absent.
pub fn create_synthesizer(config: &InferenceConfig, client: Arc<Client>) -> Option<Arc<dyn SpeechSynthesizer>> {
    let account = config.service_account.clone()?;
    info!("🔊 Speech synthesis enabled for {}", account.client_email);
    let synthesizer: Arc<dyn SpeechSynthesizer> =
        Arc::new(GoogleSpeechClient::new(client, account).with_retry(config.retry.clone()));
    Some(synthesizer)
}

/// Every model handle the pipeline needs, built once at startup.
#[derive(Debug, Clone)]
pub struct Models {
    pub sentiment: Arc<dyn ns_core::TextClassifier>,
    pub topics: Arc<dyn ns_core::TextClassifier>,
    pub generator: Arc<dyn ns_core::TextGenerator>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

impl Models {
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        let client = models::http_client(config)?;
        Ok(Self {
            sentiment: create_sentiment_classifier(config, client.clone())?,
            topics: create_topic_classifier(config, client.clone())?,
            generator: create_generator(config, client.clone())?,
            synthesizer: create_synthesizer(config, client),
        })
    }
}

pub fn parse_failure_policy(value: &str) -> Result<FailurePolicy> {
    value.parse().map_err(Error::Config)
}

pub mod prelude {
    pub use super::{Comparator, FailurePolicy, InferenceConfig, Models, Narrator, SentimentTagger, TopicTagger};
    pub use ns_core::{Article, Error, Result};
}
