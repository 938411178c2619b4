use std::fmt;

use ns_core::{Classification, GenerationOptions, Result, TextClassifier, TextGenerator};

const POSITIVE_WORDS: &[&str] = &[
    "soar", "surge", "gain", "profit", "growth", "record", "rally", "beat", "upgrade", "win",
];
const NEGATIVE_WORDS: &[&str] = &[
    "lawsuit", "loss", "fall", "plunge", "probe", "fraud", "fine", "cut", "crash", "downgrade",
];
const TOPIC_WORDS: &[(&str, &[&str])] = &[
    ("Finance", &["profit", "revenue", "earnings", "loss", "results", "quarter"]),
    ("Markets", &["stock", "share", "market", "investor", "rally", "soar"]),
    ("Legal", &["lawsuit", "court", "probe", "regulator", "fine", "fraud"]),
    ("Technology", &["ai", "software", "chip", "cloud", "electric", "launch"]),
    ("Business", &["deal", "merger", "acquisition", "partnership", "expansion"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyTask {
    Sentiment,
    Topics,
}

/// Offline stand-in for every model: keyword matching for classification and
/// a first-line echo for generation.
pub struct DummyModel {
    task: DummyTask,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").field("task", &self.task).finish()
    }
}

impl DummyModel {
    pub fn new(task: DummyTask) -> Self {
        Self { task }
    }

    pub fn sentiment() -> Self {
        Self::new(DummyTask::Sentiment)
    }

    pub fn topics() -> Self {
        Self::new(DummyTask::Topics)
    }

    fn count_hits(words: &[&str], text: &str) -> usize {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .filter(|token| words.iter().any(|w| token.starts_with(w)))
            .count()
    }

    fn sentiment_labels(text: &str) -> Vec<Classification> {
        let positive = Self::count_hits(POSITIVE_WORDS, text);
        let negative = Self::count_hits(NEGATIVE_WORDS, text);
        let total = (positive + negative) as f64;

        let (label, score) = if positive > negative {
            ("Positive", 0.5 + 0.5 * positive as f64 / total)
        } else if negative > positive {
            ("Negative", 0.5 + 0.5 * negative as f64 / total)
        } else {
            ("Neutral", 0.5)
        };
        vec![Classification::new(label, score)]
    }

    fn topic_labels(text: &str) -> Vec<Classification> {
        let mut labels: Vec<Classification> = TOPIC_WORDS
            .iter()
            .filter_map(|(topic, words)| {
                let hits = Self::count_hits(words, text);
                (hits > 0).then(|| Classification::new(*topic, hits as f64))
            })
            .collect();
        // stable sort keeps table order for ties
        labels.sort_by(|a, b| b.score.total_cmp(&a.score));
        let total: f64 = labels.iter().map(|l| l.score).sum();
        for label in &mut labels {
            label.score /= total;
        }
        labels
    }
}

#[async_trait::async_trait]
impl TextClassifier for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn classify(&self, text: &str, top_k: usize) -> Result<Vec<Classification>> {
        let text = text.to_lowercase();
        let mut labels = match self.task {
            DummyTask::Sentiment => Self::sentiment_labels(&text),
            DummyTask::Topics => Self::topic_labels(&text),
        };
        labels.truncate(top_k);
        Ok(labels)
    }
}

#[async_trait::async_trait]
impl TextGenerator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let line = prompt
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default();
        let words: Vec<&str> = line.split_whitespace().collect();
        let limit = options.max_tokens.map(|t| t as usize).unwrap_or(words.len());
        Ok(words.into_iter().take(limit).collect::<Vec<_>>().join(" "))
    }
}
