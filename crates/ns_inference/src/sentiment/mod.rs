use std::fmt;
use std::sync::Arc;

use ns_core::{Article, Result, Sentiment, SentimentCounts, TextClassifier};
use tracing::{debug, warn};

use crate::FailurePolicy;

/// Labels each article with a normalized sentiment and keeps the bucket counts.
pub struct SentimentTagger {
    classifier: Arc<dyn TextClassifier>,
    on_failure: FailurePolicy,
}

impl fmt::Debug for SentimentTagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentTagger")
            .field("classifier", &self.classifier.name())
            .field("on_failure", &self.on_failure)
            .finish()
    }
}

impl SentimentTagger {
    pub fn new(classifier: Arc<dyn TextClassifier>, on_failure: FailurePolicy) -> Self {
        Self {
            classifier,
            on_failure,
        }
    }

    /// Tags `articles` in place. A classifier error aborts the batch unless the
    /// policy says to mark the article Unknown and move on.
    pub async fn tag(&self, articles: &mut [Article]) -> Result<SentimentCounts> {
        let mut counts = SentimentCounts::default();

        for article in articles.iter_mut() {
            let (sentiment, score) = match self.classifier.classify(&article.content(), 1).await {
                Ok(labels) => match labels.first() {
                    Some(top) => (Sentiment::from_label(&top.label), top.score),
                    None => (Sentiment::Unknown, 0.0),
                },
                Err(e) if self.on_failure == FailurePolicy::MarkUnknown => {
                    warn!("⚠️ Sentiment classification failed for {:?}: {}", article.title, e);
                    (Sentiment::Unknown, 0.0)
                }
                Err(e) => return Err(e),
            };

            debug!("{} ({:.2}) - {}", sentiment, score, article.title);
            article.sentiment = sentiment;
            article.score = score;
            counts.record(sentiment);
        }

        Ok(counts)
    }
}
