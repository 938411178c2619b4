use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const NO_TITLE: &str = "No Title";
pub const NO_SUMMARY: &str = "No Summary";
pub const UNKNOWN_TOPIC: &str = "Unknown";

/// Sentiment label attached to an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    #[default]
    Unknown,
}

impl Sentiment {
    /// Normalizes a raw classifier label. Matching ignores case and surrounding
    /// whitespace; the "very" intensities fold into their base polarity.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" | "very positive" => Sentiment::Positive,
            "negative" | "very negative" => Sentiment::Negative,
            "neutral" => Sentiment::Neutral,
            _ => Sentiment::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A story as it comes off the news source, before any tagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Summary")]
    pub summary: String,
}

impl RawArticle {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }
}

fn default_title() -> String {
    NO_TITLE.to_string()
}

fn default_summary() -> String {
    NO_SUMMARY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "Title", default = "default_title")]
    pub title: String,
    #[serde(rename = "Summary", default = "default_summary")]
    pub summary: String,
    #[serde(rename = "Sentiment", default)]
    pub sentiment: Sentiment,
    #[serde(rename = "Score", default)]
    pub score: f64,
    #[serde(rename = "Topics", default)]
    pub topics: Vec<String>,
}

impl Article {
    /// Title and summary joined the way both classifiers expect to see them.
    pub fn content(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }

    /// Copy with blank title or summary replaced by their placeholders.
    pub fn with_defaults(&self) -> Self {
        let mut article = self.clone();
        if article.title.trim().is_empty() {
            article.title = default_title();
        }
        if article.summary.trim().is_empty() {
            article.summary = default_summary();
        }
        article
    }
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Self {
            title: raw.title,
            summary: raw.summary,
            sentiment: Sentiment::Unknown,
            score: 0.0,
            topics: Vec::new(),
        }
    }
}

/// Per-bucket article counts. Unknown articles are never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(rename = "Positive", default)]
    pub positive: u32,
    #[serde(rename = "Negative", default)]
    pub negative: u32,
    #[serde(rename = "Neutral", default)]
    pub neutral: u32,
}

impl SentimentCounts {
    /// Increments the bucket for `sentiment`. Returns false for `Unknown`.
    pub fn record(&mut self, sentiment: Sentiment) -> bool {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Unknown => return false,
        }
        true
    }

    pub fn get(&self, sentiment: Sentiment) -> u32 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Unknown => 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.positive + self.negative + self.neutral
    }
}

impl fmt::Display for SentimentCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{'Positive': {}, 'Negative': {}, 'Neutral': {}}}",
            self.positive, self.negative, self.neutral
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDifference {
    #[serde(rename = "Comparison")]
    pub comparison: String,
    #[serde(rename = "Impact")]
    pub impact: String,
}

/// Topics left over for each article once the common ones are removed,
/// keyed "Article 1", "Article 2", ... in article order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniqueTopics(Vec<(String, Vec<String>)>);

impl UniqueTopics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn label(index: usize) -> String {
        format!("Article {}", index + 1)
    }

    pub fn insert(&mut self, key: String, topics: Vec<String>) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = topics,
            None => self.0.push((key, topics)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, topics)| topics.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for UniqueTopics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, topics) in &self.0 {
            map.serialize_entry(key, topics)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UniqueTopics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UniqueTopicsVisitor;

        impl<'de> Visitor<'de> for UniqueTopicsVisitor {
            type Value = UniqueTopics;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of article labels to topic lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut topics = UniqueTopics::new();
                while let Some((key, value)) = access.next_entry::<String, Vec<String>>()? {
                    topics.insert(key, value);
                }
                Ok(topics)
            }
        }

        deserializer.deserialize_map(UniqueTopicsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopicOverlap {
    #[serde(rename = "Common Topics", default)]
    pub common_topics: Vec<String>,
    #[serde(rename = "Unique Topics", default)]
    pub unique_topics: UniqueTopics,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparativeSentimentScore {
    #[serde(rename = "Sentiment Distribution", default)]
    pub sentiment_distribution: SentimentCounts,
    #[serde(rename = "Coverage Differences", default)]
    pub coverage_differences: Vec<CoverageDifference>,
    #[serde(rename = "Topic Overlap", default)]
    pub topic_overlap: TopicOverlap,
}

/// The document produced for one company per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeReport {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Articles", default)]
    pub articles: Vec<Article>,
    #[serde(rename = "Comparative Sentiment Score", default)]
    pub comparative_sentiment_score: ComparativeSentimentScore,
    #[serde(rename = "Final Sentiment Analysis", default)]
    pub final_sentiment_analysis: String,
    #[serde(rename = "Audio", default)]
    pub audio: Option<String>,
}
