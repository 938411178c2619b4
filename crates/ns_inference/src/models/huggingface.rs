use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ns_core::{Classification, Error, Result, TextClassifier};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

pub const SENTIMENT_MODEL: &str = "tabularisai/multilingual-sentiment-analysis";
pub const TOPIC_MODEL: &str = "valurank/distilroberta-topic-classification";
const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    parameters: ClassifyParameters,
}

#[derive(Serialize)]
struct ClassifyParameters {
    top_k: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<Classification>>),
    Flat(Vec<Classification>),
}

impl ClassifyResponse {
    fn into_labels(self) -> Vec<Classification> {
        match self {
            ClassifyResponse::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            ClassifyResponse::Flat(labels) => labels,
        }
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Text classification through the Hugging Face hosted inference API.
pub struct HuggingFaceClassifier {
    client: Arc<Client>,
    api_token: Option<String>,
    model: String,
    base_url: String,
    retry: RetryPolicy,
}

impl fmt::Debug for HuggingFaceClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceClassifier")
            .field("client", &"<reqwest::Client>")
            .field("api_token", &self.api_token.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HuggingFaceClassifier {
    pub fn new(client: Arc<Client>, api_token: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_token,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }

    async fn call(&self, text: &str, top_k: usize) -> Result<Vec<Classification>> {
        let request = ClassifyRequest {
            inputs: text,
            parameters: ClassifyParameters { top_k },
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(Error::Classification(format!(
                "{} answered HTTP {}: {}",
                self.model, status, reason
            )));
        }

        parse_labels(&body, top_k)
    }
}

/// Decodes a classification payload, ordering labels by descending score.
pub(crate) fn parse_labels(body: &str, top_k: usize) -> Result<Vec<Classification>> {
    let response: ClassifyResponse = serde_json::from_str(body)
        .map_err(|e| Error::Classification(format!("unreadable classifier output: {}", e)))?;

    let mut labels = response.into_labels();
    labels.sort_by(|a, b| b.score.total_cmp(&a.score));
    labels.truncate(top_k);
    Ok(labels)
}

#[async_trait]
impl TextClassifier for HuggingFaceClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    async fn classify(&self, text: &str, top_k: usize) -> Result<Vec<Classification>> {
        let what = format!("classifier {}", self.model);
        self.retry.run(&what, || self.call(text, top_k)).await
    }
}
