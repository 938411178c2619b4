use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One label produced by a text classification model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

#[async_trait]
pub trait TextClassifier: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Classify `text`, returning at most `top_k` labels ordered by descending score.
    async fn classify(&self, text: &str, top_k: usize) -> Result<Vec<Classification>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Complete a single free-text prompt.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub language_code: String,
    pub name: String,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            language_code: "hi-IN".to_string(),
            name: "hi-IN-Chirp3-HD-Kore".to_string(),
        }
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Synthesize `text` to MP3 bytes.
    async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>>;
}
