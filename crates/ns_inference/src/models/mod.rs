use std::sync::Arc;
use std::time::Duration;

use ns_core::{Error, Result, TextClassifier, TextGenerator};
use reqwest::Client;
use tracing::info;

use crate::InferenceConfig;

pub mod dummy;
pub mod groq;
pub mod huggingface;
pub mod ollama;

pub use dummy::{DummyModel, DummyTask};
pub use groq::GroqModel;
pub use huggingface::HuggingFaceClassifier;
pub use ollama::{OllamaModel, OllamaModelConfig};

/// Shared HTTP client for every hosted model.
pub fn http_client(config: &InferenceConfig) -> Result<Arc<Client>> {
    let client = Client::builder()
        .timeout(config.retry.timeout + Duration::from_secs(5))
        .build()?;
    Ok(Arc::new(client))
}

pub fn create_generator(config: &InferenceConfig, client: Arc<Client>) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match config.generator.as_str() {
        "groq" => {
            let mut model = GroqModel::new(client, config.groq_api_key.clone())?
                .with_retry(config.retry.clone());
            if let Some(name) = &config.generator_model {
                model = model.with_model(name.clone());
            }
            Arc::new(model)
        }
        "ollama" => {
            let model_config = OllamaModelConfig::from_url(config.model_url.as_deref())?;
            Arc::new(OllamaModel::new(model_config)?.with_retry(config.retry.clone()))
        }
        "dummy" => Arc::new(DummyModel::sentiment()),
        other => {
            return Err(Error::Config(format!(
                "unknown generator '{}'. Available generators: groq, ollama, dummy",
                other
            )))
        }
    };
    info!("🧠 Generator ready (using {})", generator.name());
    Ok(generator)
}

fn create_classifier(
    config: &InferenceConfig,
    client: Arc<Client>,
    model: &str,
    task: DummyTask,
) -> Result<Arc<dyn TextClassifier>> {
    let classifier: Arc<dyn TextClassifier> = match config.classifier.as_str() {
        "huggingface" => Arc::new(
            HuggingFaceClassifier::new(client, config.hf_api_token.clone(), model)
                .with_retry(config.retry.clone()),
        ),
        "dummy" => Arc::new(DummyModel::new(task)),
        other => {
            return Err(Error::Config(format!(
                "unknown classifier '{}'. Available classifiers: huggingface, dummy",
                other
            )))
        }
    };
    info!("🏷️ Classifier ready (using {})", classifier.name());
    Ok(classifier)
}

pub fn create_sentiment_classifier(config: &InferenceConfig, client: Arc<Client>) -> Result<Arc<dyn TextClassifier>> {
    create_classifier(config, client, huggingface::SENTIMENT_MODEL, DummyTask::Sentiment)
}

pub fn create_topic_classifier(config: &InferenceConfig, client: Arc<Client>) -> Result<Arc<dyn TextClassifier>> {
    create_classifier(config, client, huggingface::TOPIC_MODEL, DummyTask::Topics)
}
