use std::fmt;
use std::sync::Arc;

use ns_core::types::UNKNOWN_TOPIC;
use ns_core::{Article, Result, TextClassifier};
use tracing::{debug, warn};

use crate::FailurePolicy;

pub const MAX_TOPICS: usize = 3;

pub struct TopicTagger {
    classifier: Arc<dyn TextClassifier>,
    on_failure: FailurePolicy,
}

impl fmt::Debug for TopicTagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicTagger")
            .field("classifier", &self.classifier.name())
            .field("on_failure", &self.on_failure)
            .finish()
    }
}

impl TopicTagger {
    pub fn new(classifier: Arc<dyn TextClassifier>, on_failure: FailurePolicy) -> Self {
        Self {
            classifier,
            on_failure,
        }
    }

    /// Returns the articles, in order, each carrying up to three topics.
    /// An empty classifier answer becomes the single topic "Unknown".
    pub async fn tag(&self, articles: Vec<Article>) -> Result<Vec<Article>> {
        let mut tagged = Vec::with_capacity(articles.len());

        for article in articles {
            let topics = match self.classifier.classify(&article.content(), MAX_TOPICS).await {
                Ok(labels) => labels
                    .into_iter()
                    .take(MAX_TOPICS)
                    .map(|l| l.label)
                    .collect::<Vec<_>>(),
                Err(e) if self.on_failure == FailurePolicy::MarkUnknown => {
                    warn!("⚠️ Topic classification failed for {:?}: {}", article.title, e);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };

            let topics = if topics.is_empty() {
                vec![UNKNOWN_TOPIC.to_string()]
            } else {
                topics
            };
            debug!("🏷️ {:?} - {}", topics, article.title);

            tagged.push(Article { topics, ..article });
        }

        Ok(tagged)
    }
}
