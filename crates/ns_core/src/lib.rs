pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use error::{Error, FetchError, Result};
pub use models::{
    Classification, GenerationOptions, SpeechSynthesizer, TextClassifier, TextGenerator, Voice,
};
pub use storage::ReportStorage;
pub use types::{
    Article, ComparativeReport, ComparativeSentimentScore, CoverageDifference, RawArticle,
    Sentiment, SentimentCounts, TopicOverlap, UniqueTopics,
};

pub mod prelude {
    pub use crate::models::{SpeechSynthesizer, TextClassifier, TextGenerator};
    pub use crate::storage::ReportStorage;
    pub use crate::types::{Article, ComparativeReport, Sentiment, SentimentCounts};
    pub use crate::{Error, Result};
}
