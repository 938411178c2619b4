use std::fmt;
#[cfg(feature = "ollama")]
use std::sync::Arc;

use ns_core::{Error, GenerationOptions, Result, TextGenerator};
use url::Url;

use crate::retry::RetryPolicy;

#[cfg(feature = "ollama")]
use {
    anyhow::anyhow,
    langchain_rust::language_models::llm::LLM,
    langchain_rust::llm::client::GenerationOptions as OllamaOptions,
    langchain_rust::llm::ollama::client::{Ollama, OllamaClient},
};

const DEFAULT_URL: &str = "http://localhost:11434/llama3.1:8b";

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaModelConfig {
    ollama_host: String,
    ollama_port: u16,
    model_name: String,
}

impl Default for OllamaModelConfig {
    fn default() -> Self {
        Self {
            ollama_host: "http://localhost".to_string(),
            ollama_port: 11434,
            model_name: "llama3.1:8b".to_string(),
        }
    }
}

impl OllamaModelConfig {
    /// Reads `scheme://host:port/model`; missing parts keep their defaults.
    pub fn from_url(url: Option<&str>) -> Result<Self> {
        let parsed = Url::parse(url.unwrap_or(DEFAULT_URL))
            .map_err(|e| Error::Config(format!("invalid Ollama URL: {}", e)))?;
        let defaults = Self::default();

        let model_name = parsed.path().trim_start_matches('/').to_string();

        Ok(Self {
            ollama_host: format!(
                "{}://{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or("localhost")
            ),
            ollama_port: parsed.port().unwrap_or(defaults.ollama_port),
            model_name: if model_name.is_empty() {
                defaults.model_name
            } else {
                model_name
            },
        })
    }

    pub fn host(&self) -> &str {
        &self.ollama_host
    }

    pub fn port(&self) -> u16 {
        self.ollama_port
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Local generation through an Ollama server, driven by langchain-rust.
pub struct OllamaModel {
    config: OllamaModelConfig,
    retry: RetryPolicy,
    #[cfg(feature = "ollama")]
    client: Arc<OllamaClient>,
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .finish()
    }
}

impl OllamaModel {
    pub fn new(config: OllamaModelConfig) -> Result<Self> {
        #[cfg(feature = "ollama")]
        {
            let client = Arc::new(OllamaClient::new(config.host().to_string(), config.port()));
            Ok(Self {
                config,
                retry: RetryPolicy::default(),
                client,
            })
        }
        #[cfg(not(feature = "ollama"))]
        {
            Err(Error::Config(format!(
                "Ollama support ({}) requires building with the `ollama` feature",
                config.model_name()
            )))
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait::async_trait]
impl TextGenerator for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        #[cfg(feature = "ollama")]
        {
            let mut generation = OllamaOptions::default();
            if let Some(max_tokens) = options.max_tokens {
                generation = generation.num_predict(max_tokens as i32);
            }
            let ollama = Ollama::new(
                self.client.clone(),
                self.config.model_name().to_string(),
                Some(generation),
            );
            self.retry
                .run("Ollama completion", || async {
                    ollama.invoke(prompt).await.map_err(|e| {
                        Error::External(anyhow!(
                            "Ollama at {}:{} failed: {}. Is the model '{}' installed?",
                            self.config.host(),
                            self.config.port(),
                            e,
                            self.config.model_name()
                        ))
                    })
                })
                .await
        }
        #[cfg(not(feature = "ollama"))]
        {
            let _ = (prompt, options);
            Err(Error::Config("built without the `ollama` feature".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_url() {
        let config = OllamaModelConfig::from_url(Some("http://gpu-box:11500/gemma3:12b")).unwrap();
        assert_eq!(config.host(), "http://gpu-box");
        assert_eq!(config.port(), 11500);
        assert_eq!(config.model_name(), "gemma3:12b");
    }

    #[test]
    fn test_config_defaults() {
        let config = OllamaModelConfig::from_url(None).unwrap();
        assert_eq!(config, OllamaModelConfig::default());

        let config = OllamaModelConfig::from_url(Some("http://localhost")).unwrap();
        assert_eq!(config.model_name(), "llama3.1:8b");
        assert_eq!(config.port(), 11434);

        assert!(OllamaModelConfig::from_url(Some("not a url")).is_err());
    }
}
