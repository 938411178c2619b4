use std::sync::Arc;

use ns_core::{Article, ComparativeReport, Error, ReportStorage, Result};
use ns_inference::{Comparator, FailurePolicy, Models, Narrator, SentimentTagger, TopicTagger};

use crate::logging::ReportLog;
use crate::scrapers::{NewsSource, DEFAULT_ARTICLE_LIMIT};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub article_limit: usize,
    pub on_classifier_error: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            article_limit: DEFAULT_ARTICLE_LIMIT,
            on_classifier_error: FailurePolicy::Abort,
        }
    }
}

/// Runs fetch → sentiment → topics → comparison → assembly for one company
/// at a time and persists the result.
pub struct ReportManager {
    source: Arc<dyn NewsSource>,
    sentiment: SentimentTagger,
    topics: TopicTagger,
    comparator: Comparator,
    narrator: Narrator,
    storage: Arc<dyn ReportStorage>,
    config: PipelineConfig,
}

impl ReportManager {
    pub fn new(
        source: Arc<dyn NewsSource>,
        models: &Models,
        storage: Arc<dyn ReportStorage>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            sentiment: SentimentTagger::new(models.sentiment.clone(), config.on_classifier_error),
            topics: TopicTagger::new(models.topics.clone(), config.on_classifier_error),
            comparator: Comparator::new(models.generator.clone()),
            narrator: Narrator::new(models.generator.clone(), models.synthesizer.clone()),
            storage,
            config,
        }
    }

    pub fn source(&self) -> &str {
        self.source.source()
    }

    /// Stories for `company`, untagged.
    pub async fn fetch(&self, company: &str) -> Result<Vec<Article>> {
        let company = validate_company(company)?;
        let stories = self
            .source
            .fetch_articles(company, self.config.article_limit)
            .await?;
        Ok(stories.into_iter().map(Article::from).collect())
    }

    /// Builds, persists and returns the report for `company`. Nothing is
    /// written if any stage before assembly fails.
    pub async fn generate_report(&self, company: &str) -> Result<ComparativeReport> {
        let company = validate_company(company)?;
        let log = ReportLog::for_company(company);

        log.info(format!("📰 Fetching articles from {}", self.source()));
        let mut articles = self.fetch(company).await?;
        log.info(format!("✨ Found {} articles", articles.len()));

        log.info("🤖 Classifying sentiment");
        let counts = self.sentiment.tag(&mut articles).await?;
        log.info(format!("✨ Sentiment distribution: {}", counts));

        log.info("🏷️ Extracting topics");
        let articles = self.topics.tag(articles).await?;

        log.info("🔍 Comparing coverage");
        let report = self.comparator.compare(company, articles, counts).await?;

        let report = self.assemble(report, &log).await?;
        log.info("✅ Report ready");
        Ok(report)
    }

    /// Attaches audio (when possible) and persists the client view of the
    /// report, which is also what the caller gets back.
    async fn assemble(&self, mut report: ComparativeReport, log: &ReportLog) -> Result<ComparativeReport> {
        let log = log.stage("audio");
        let audio = self.narrator.narrate(&report.final_sentiment_analysis).await;

        let stored = match audio {
            Some(bytes) => match self.storage.store_audio(&bytes).await {
                Ok(()) => true,
                Err(e) => {
                    log.warn(format!("⚠️ Could not write audio: {}", e));
                    false
                }
            },
            None => false,
        };

        if !stored {
            // an older file must not be served for this report
            if let Err(e) = self.storage.clear_audio().await {
                log.warn(format!("⚠️ Could not remove stale audio: {}", e));
            }
            log.warn(format!(
                "🔇 Audio file could not be found at {}",
                self.storage.audio_location()
            ));
        }

        report.audio = Some(self.storage.audio_location());
        let report = client_view(&report);
        self.storage.store_report(&report).await?;
        Ok(report)
    }

    /// The persisted report document, if a report has been generated.
    pub async fn document(&self) -> Result<Option<Vec<u8>>> {
        self.storage.load_report().await
    }

    /// The persisted audio, if the last report produced any.
    pub async fn audio(&self) -> Result<Option<Vec<u8>>> {
        self.storage.load_audio().await
    }
}

fn validate_company(company: &str) -> Result<&str> {
    let company = company.trim();
    if company.is_empty() {
        return Err(Error::InvalidInput("company name is required".to_string()));
    }
    Ok(company)
}

/// Placeholder text for blank titles and summaries, everything else unchanged.
pub fn client_view(report: &ComparativeReport) -> ComparativeReport {
    ComparativeReport {
        articles: report.articles.iter().map(Article::with_defaults).collect(),
        ..report.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ns_core::types::{NO_SUMMARY, NO_TITLE};
    use ns_core::{
        Classification, FetchError, GenerationOptions, RawArticle, Sentiment, SentimentCounts,
        SpeechSynthesizer, TextClassifier, TextGenerator, Voice,
    };
    use ns_inference::models::DummyModel;
    use ns_storage::MemoryStorage;
    use std::collections::HashSet;

    struct StaticSource(std::result::Result<Vec<RawArticle>, FetchError>);

    #[async_trait]
    impl NewsSource for StaticSource {
        fn source(&self) -> &str {
            "Static"
        }

        async fn fetch_articles(
            &self,
            _company: &str,
            limit: usize,
        ) -> std::result::Result<Vec<RawArticle>, FetchError> {
            self.0.clone().map(|mut stories| {
                stories.truncate(limit);
                stories
            })
        }
    }

    #[derive(Debug)]
    struct AcmeSentiment;

    #[async_trait]
    impl TextClassifier for AcmeSentiment {
        fn name(&self) -> &str {
            "AcmeSentiment"
        }

        async fn classify(&self, text: &str, _top_k: usize) -> Result<Vec<Classification>> {
            if text.contains("profits") {
                Ok(vec![Classification::new("positive", 0.91)])
            } else if text.contains("lawsuit") {
                Ok(vec![Classification::new("negative", 0.87)])
            } else {
                Ok(vec![Classification::new("mixed", 0.3)])
            }
        }
    }

    #[derive(Debug)]
    struct AcmeTopics;

    #[async_trait]
    impl TextClassifier for AcmeTopics {
        fn name(&self) -> &str {
            "AcmeTopics"
        }

        async fn classify(&self, text: &str, _top_k: usize) -> Result<Vec<Classification>> {
            let labels: &[&str] = if text.contains("profits") {
                &["Finance", "Markets"]
            } else if text.contains("lawsuit") {
                &["Legal", "Finance"]
            } else {
                &[]
            };
            Ok(labels.iter().map(|l| Classification::new(*l, 0.5)).collect())
        }
    }

    #[derive(Debug)]
    struct AcmeGenerator;

    #[async_trait]
    impl TextGenerator for AcmeGenerator {
        fn name(&self) -> &str {
            "AcmeGenerator"
        }

        async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
            Ok(if prompt.contains("CommonTopics") {
                r#"{"CommonTopics": ["Finance"]}"#.to_string()
            } else if prompt.contains("Coverage Differences") {
                "no json today".to_string()
            } else if prompt.starts_with("Just Translate") {
                "मिश्रित खबर".to_string()
            } else {
                "Mixed news for Acme.".to_string()
            })
        }
    }

    #[derive(Debug)]
    struct Mp3Synth;

    #[async_trait]
    impl SpeechSynthesizer for Mp3Synth {
        fn name(&self) -> &str {
            "Mp3"
        }

        async fn synthesize(&self, _text: &str, _voice: &Voice) -> Result<Vec<u8>> {
            Ok(b"ID3".to_vec())
        }
    }

    fn acme_stories() -> Vec<RawArticle> {
        vec![
            RawArticle::new("Acme profits soar", "Quarterly profit doubled."),
            RawArticle::new("Acme faces lawsuit", "Regulators sued Acme."),
        ]
    }

    fn acme_models(synthesizer: Option<Arc<dyn SpeechSynthesizer>>) -> Models {
        Models {
            sentiment: Arc::new(AcmeSentiment),
            topics: Arc::new(AcmeTopics),
            generator: Arc::new(AcmeGenerator),
            synthesizer,
        }
    }

    fn manager(
        stories: std::result::Result<Vec<RawArticle>, FetchError>,
        models: &Models,
        storage: Arc<MemoryStorage>,
    ) -> ReportManager {
        ReportManager::new(
            Arc::new(StaticSource(stories)),
            models,
            storage,
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_acme_report() {
        let storage = Arc::new(MemoryStorage::new());
        let synth: Arc<dyn SpeechSynthesizer> = Arc::new(Mp3Synth);
        let models = acme_models(Some(synth));
        let manager = manager(Ok(acme_stories()), &models, storage.clone());

        let report = manager.generate_report(" Acme ").await.unwrap();

        assert_eq!(report.company, "Acme");
        assert_eq!(report.articles[0].sentiment, Sentiment::Positive);
        assert_eq!(report.articles[0].score, 0.91);
        assert_eq!(report.articles[1].sentiment, Sentiment::Negative);
        assert_eq!(report.articles[1].topics, vec!["Legal", "Finance"]);

        let score = &report.comparative_sentiment_score;
        assert_eq!(
            score.sentiment_distribution,
            SentimentCounts { positive: 1, negative: 1, neutral: 0 }
        );
        assert!(score.topic_overlap.common_topics.len() <= 3);
        assert_eq!(score.topic_overlap.common_topics, vec!["Finance"]);
        assert_eq!(score.topic_overlap.unique_topics.get("Article 1"), Some(&["Markets".to_string()][..]));
        assert_eq!(score.topic_overlap.unique_topics.get("Article 2"), Some(&["Legal".to_string()][..]));
        assert!(score.coverage_differences.is_empty());
        assert_eq!(report.final_sentiment_analysis, "Mixed news for Acme.");
        assert_eq!(report.audio, Some(storage.audio_location()));

        assert_eq!(manager.audio().await.unwrap(), Some(b"ID3".to_vec()));

        let document = manager.document().await.unwrap().unwrap();
        let persisted: ComparativeReport = serde_json::from_slice(&document).unwrap();
        assert_eq!(persisted.company, report.company);
        assert_eq!(persisted.articles, report.articles);
        assert_eq!(persisted.comparative_sentiment_score, report.comparative_sentiment_score);
    }

    #[tokio::test]
    async fn test_unique_topics_match_set_difference() {
        let storage = Arc::new(MemoryStorage::new());
        let models = acme_models(None);
        let manager = manager(Ok(acme_stories()), &models, storage);

        let report = manager.generate_report("Acme").await.unwrap();
        let overlap = &report.comparative_sentiment_score.topic_overlap;
        let common: HashSet<&String> = overlap.common_topics.iter().collect();

        for (i, article) in report.articles.iter().enumerate() {
            let expected: HashSet<&String> = article.topics.iter().filter(|t| !common.contains(t)).collect();
            let actual: HashSet<&String> = overlap
                .unique_topics
                .get(&format!("Article {}", i + 1))
                .unwrap()
                .iter()
                .collect();
            assert_eq!(actual, expected);
        }
    }

    #[tokio::test]
    async fn test_no_credentials_means_no_audio_file() {
        let storage = Arc::new(MemoryStorage::new());
        storage.store_audio(b"stale").await.unwrap();
        let models = acme_models(None);
        let manager = manager(Ok(acme_stories()), &models, storage.clone());

        let report = manager.generate_report("Acme").await.unwrap();

        assert_eq!(report.audio, Some(storage.audio_location()));
        assert_eq!(manager.audio().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_sentiment_is_kept_but_not_counted() {
        let storage = Arc::new(MemoryStorage::new());
        let models = acme_models(None);
        let mut stories = acme_stories();
        stories.push(RawArticle::new("Acme ships widgets", "Nothing notable."));
        let manager = manager(Ok(stories), &models, storage);

        let report = manager.generate_report("Acme").await.unwrap();

        assert_eq!(report.articles.len(), 3);
        assert_eq!(report.articles[2].sentiment, Sentiment::Unknown);
        assert_eq!(report.articles[2].topics, vec!["Unknown"]);
        let counts = report.comparative_sentiment_score.sentiment_distribution;
        assert_eq!(counts.total(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_surfaced_and_nothing_written() {
        let storage = Arc::new(MemoryStorage::new());
        let models = acme_models(None);
        let manager = manager(Err(FetchError::Status(503)), &models, storage);

        let result = manager.generate_report("Acme").await;

        assert!(matches!(result, Err(Error::Fetch(FetchError::Status(503)))));
        assert!(manager.document().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_classifier_failure_aborts_before_persisting() {
        #[derive(Debug)]
        struct Broken;

        #[async_trait]
        impl TextClassifier for Broken {
            fn name(&self) -> &str {
                "Broken"
            }

            async fn classify(&self, _text: &str, _top_k: usize) -> Result<Vec<Classification>> {
                Err(Error::Classification("model offline".to_string()))
            }
        }

        let storage = Arc::new(MemoryStorage::new());
        let mut models = acme_models(None);
        models.sentiment = Arc::new(Broken);
        let manager = manager(Ok(acme_stories()), &models, storage);

        assert!(matches!(
            manager.generate_report("Acme").await,
            Err(Error::Classification(_))
        ));
        assert!(manager.document().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_company_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        let models = acme_models(None);
        let manager = manager(Ok(acme_stories()), &models, storage);
        assert!(matches!(
            manager.generate_report("   ").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_dummy_models_run_offline() {
        let storage = Arc::new(MemoryStorage::new());
        let models = Models {
            sentiment: Arc::new(DummyModel::sentiment()),
            topics: Arc::new(DummyModel::topics()),
            generator: Arc::new(DummyModel::sentiment()),
            synthesizer: None,
        };
        let manager = manager(Ok(acme_stories()), &models, storage);

        let report = manager.generate_report("Acme").await.unwrap();
        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.articles[0].sentiment, Sentiment::Positive);
        assert_eq!(report.articles[1].sentiment, Sentiment::Negative);
        assert!(report.comparative_sentiment_score.coverage_differences.is_empty());
    }

    #[tokio::test]
    async fn test_blank_title_persisted_as_returned() {
        let storage = Arc::new(MemoryStorage::new());
        let models = Models {
            sentiment: Arc::new(DummyModel::sentiment()),
            topics: Arc::new(DummyModel::topics()),
            generator: Arc::new(DummyModel::sentiment()),
            synthesizer: None,
        };
        let stories = vec![RawArticle::new("", "Acme profits soar"), RawArticle::new("Acme rallies", "  ")];
        let manager = manager(Ok(stories), &models, storage);

        let report = manager.generate_report("Acme").await.unwrap();
        assert_eq!(report.articles[0].title, NO_TITLE);
        assert_eq!(report.articles[1].summary, NO_SUMMARY);
        // classification still saw the story text
        assert_eq!(report.articles[0].sentiment, Sentiment::Positive);

        let document = manager.document().await.unwrap().unwrap();
        let persisted: ComparativeReport = serde_json::from_slice(&document).unwrap();
        assert_eq!(persisted.articles, report.articles);
        assert_eq!(persisted, report);
    }

    #[test]
    fn test_client_view_fills_placeholders() {
        let report = ComparativeReport {
            company: "Acme".to_string(),
            articles: vec![Article::from(RawArticle::new("", ""))],
            comparative_sentiment_score: Default::default(),
            final_sentiment_analysis: String::new(),
            audio: None,
        };
        let view = client_view(&report);
        assert_eq!(view.articles[0].title, NO_TITLE);
        assert_eq!(view.articles[0].summary, NO_SUMMARY);
        assert_eq!(view.company, "Acme");
    }
}
