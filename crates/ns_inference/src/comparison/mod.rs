//! Cross-article comparison: topic overlap, coverage contrasts and the final
//! sentiment narrative for one company's batch.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use ns_core::{
    Article, ComparativeReport, ComparativeSentimentScore, CoverageDifference, GenerationOptions,
    Result, SentimentCounts, TextGenerator, TopicOverlap, UniqueTopics,
};
use tracing::{info, warn};

use crate::json::field_or;

pub const MAX_COMMON_TOPICS: usize = 3;
pub const NARRATIVE_MAX_TOKENS: u32 = 200;
const NARRATIVE_UNAVAILABLE: &str = "Sentiment analysis summary not available.";

pub struct Comparator {
    generator: Arc<dyn TextGenerator>,
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("generator", &self.generator.name())
            .finish()
    }
}

impl Comparator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Builds the comparative report (without audio) for tagged articles.
    pub async fn compare(
        &self,
        company: &str,
        articles: Vec<Article>,
        counts: SentimentCounts,
    ) -> Result<ComparativeReport> {
        let baseline = baseline_common_topics(&articles);
        info!("🔗 Baseline common topics: {:?}", baseline);

        let common_topics = self.common_topics(&articles, baseline).await;
        info!("🔗 Common topics: {:?}", common_topics);

        let coverage_differences = self
            .coverage_differences(company, &counts, &common_topics)
            .await;
        info!("⚖️ {} coverage differences", coverage_differences.len());

        let unique_topics = unique_topics(&articles, &common_topics);
        let final_sentiment_analysis = self.final_sentiment(company, &articles, &counts).await?;

        Ok(ComparativeReport {
            company: company.to_string(),
            articles,
            comparative_sentiment_score: ComparativeSentimentScore {
                sentiment_distribution: counts,
                coverage_differences,
                topic_overlap: TopicOverlap {
                    common_topics,
                    unique_topics,
                },
            },
            final_sentiment_analysis,
            audio: None,
        })
    }

    /// Asks the generator for up to three shared themes, falling back to the
    /// exact intersection.
    pub async fn common_topics(&self, articles: &[Article], baseline: Vec<String>) -> Vec<String> {
        let prompt = common_topics_prompt(articles);
        let mut topics = match self.generator.generate(&prompt, &GenerationOptions::default()).await {
            Ok(response) => field_or(&response, "CommonTopics", baseline),
            Err(e) => {
                warn!("⚠️ Common topic refinement failed ({}), using intersection", e);
                baseline
            }
        };
        topics.truncate(MAX_COMMON_TOPICS);
        topics
    }

    pub async fn coverage_differences(
        &self,
        company: &str,
        counts: &SentimentCounts,
        common_topics: &[String],
    ) -> Vec<CoverageDifference> {
        let prompt = coverage_prompt(company, counts, common_topics);
        match self.generator.generate(&prompt, &GenerationOptions::default()).await {
            Ok(response) => field_or(&response, "Coverage Differences", Vec::new()),
            Err(e) => {
                warn!("⚠️ Coverage comparison failed ({}), leaving it empty", e);
                Vec::new()
            }
        }
    }

    pub async fn final_sentiment(
        &self,
        company: &str,
        articles: &[Article],
        counts: &SentimentCounts,
    ) -> Result<String> {
        let prompt = narrative_prompt(company, articles, counts);
        let options = GenerationOptions::with_max_tokens(NARRATIVE_MAX_TOKENS);
        let response = self.generator.generate(&prompt, &options).await?;
        let response = response.trim();

        if response.is_empty() {
            Ok(NARRATIVE_UNAVAILABLE.to_string())
        } else {
            Ok(response.to_string())
        }
    }
}

fn dedup(topics: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    topics
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}

/// Topics present in every article, in the order the first article lists them.
pub fn baseline_common_topics(articles: &[Article]) -> Vec<String> {
    let Some((first, rest)) = articles.split_first() else {
        return Vec::new();
    };
    let others: Vec<HashSet<&str>> = rest
        .iter()
        .map(|a| a.topics.iter().map(String::as_str).collect())
        .collect();

    dedup(&first.topics)
        .into_iter()
        .filter(|topic| others.iter().all(|set| set.contains(topic.as_str())))
        .collect()
}

/// Each article's topics minus the common ones, keyed "Article N".
pub fn unique_topics(articles: &[Article], common_topics: &[String]) -> UniqueTopics {
    let common: HashSet<&str> = common_topics.iter().map(String::as_str).collect();
    let mut unique = UniqueTopics::new();

    for (i, article) in articles.iter().enumerate() {
        let topics = dedup(&article.topics)
            .into_iter()
            .filter(|t| !common.contains(t.as_str()))
            .collect();
        unique.insert(UniqueTopics::label(i), topics);
    }

    unique
}

fn topic_sets(articles: &[Article]) -> String {
    let sets: Vec<String> = articles
        .iter()
        .map(|a| {
            let quoted: Vec<String> = dedup(&a.topics).iter().map(|t| format!("'{}'", t)).collect();
            format!("{{{}}}", quoted.join(", "))
        })
        .collect();
    format!("[{}]", sets.join(", "))
}

fn common_topics_prompt(articles: &[Article]) -> String {
    format!(
        r#"Analyze the following article topics and identify **only three** key themes that are common across multiple articles,
even if they are phrased differently. The topics from each article are:
{}

Respond **ONLY** with a JSON format:
{{"CommonTopics": ["topic1", "topic2", "topic3"]}}"#,
        topic_sets(articles)
    )
}

fn coverage_prompt(company: &str, counts: &SentimentCounts, common_topics: &[String]) -> String {
    let topics: Vec<String> = common_topics.iter().map(|t| format!("'{}'", t)).collect();
    format!(
        r#"Provide a high-level summary comparing {total} news articles about "{company}":
- Sentiment distribution: {counts}
- Commonly discussed topics across articles: [{topics}]

Consider the following:
1. Notable contrasts between articles (e.g., major differences in topics and perspectives).
2. Overall implications for the company's reputation, stock potential, and public perception.
3. How sentiment varies across articles and its impact.

Respond **ONLY** with a concise and insightful summary in this JSON format:
{{
    "Coverage Differences": [
        {{"Comparison": "Brief contrast between Articles 1 & 2", "Impact": "Concise impact statement"}},
        {{"Comparison": "Brief contrast between Articles 3 & 4", "Impact": "Concise impact statement"}}
    ]
}}"#,
        total = counts.total(),
        company = company,
        counts = counts,
        topics = topics.join(", "),
    )
}

fn narrative_prompt(company: &str, articles: &[Article], counts: &SentimentCounts) -> String {
    let summaries: Vec<&str> = articles.iter().map(|a| a.summary.as_str()).collect();
    format!(
        r#"Based on the analysis of {total} articles about the company "{company}":
- Positive articles: {positive}
- Negative articles: {negative}
- Neutral articles: {neutral}
The following are the summarized key points from the articles: "{summaries}".
Provide a single, concise summary that integrates the overall sentiment analysis and key news highlights while maintaining a natural flow. Explain its implications for the company's reputation, stock potential, and public perception.
Respond **ONLY** with a well-structured very concise and short paragraph in plain text, focusing on overall sentiment."#,
        total = counts.total(),
        company = company,
        positive = counts.positive,
        negative = counts.negative,
        neutral = counts.neutral,
        summaries = summaries.join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ns_core::{Error, RawArticle, Sentiment};
    use std::sync::Mutex;

    /// Answers each prompt kind with a canned reply and records what it saw.
    #[derive(Debug, Default)]
    struct ScriptedGenerator {
        topics: Option<String>,
        coverage: Option<String>,
        narrative: Option<String>,
        prompts: Mutex<Vec<(String, GenerationOptions)>>,
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            "Scripted"
        }

        async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), options.clone()));
            let reply = if prompt.contains("CommonTopics") {
                &self.topics
            } else if prompt.contains("Coverage Differences") {
                &self.coverage
            } else {
                &self.narrative
            };
            reply
                .clone()
                .ok_or_else(|| Error::Generation("service unavailable".to_string()))
        }
    }

    fn acme_articles() -> Vec<Article> {
        let mut first = Article::from(RawArticle::new("Acme profits soar", "Quarterly profit doubled."));
        first.sentiment = Sentiment::Positive;
        first.score = 0.91;
        first.topics = vec!["Finance".to_string(), "Markets".to_string()];

        let mut second = Article::from(RawArticle::new("Acme faces lawsuit", "Regulators sued Acme."));
        second.sentiment = Sentiment::Negative;
        second.score = 0.87;
        second.topics = vec!["Legal".to_string(), "Finance".to_string()];

        vec![first, second]
    }

    fn acme_counts() -> SentimentCounts {
        SentimentCounts { positive: 1, negative: 1, neutral: 0 }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_baseline_intersection() {
        assert_eq!(baseline_common_topics(&acme_articles()), strings(&["Finance"]));
        assert!(baseline_common_topics(&[]).is_empty());

        let single = &acme_articles()[..1];
        assert_eq!(baseline_common_topics(single), strings(&["Finance", "Markets"]));
    }

    #[test]
    fn test_unique_topics_is_set_difference() {
        let unique = unique_topics(&acme_articles(), &strings(&["Finance"]));
        assert_eq!(unique.len(), 2);
        assert_eq!(unique.get("Article 1"), Some(&strings(&["Markets"])[..]));
        assert_eq!(unique.get("Article 2"), Some(&strings(&["Legal"])[..]));

        let unique = unique_topics(&acme_articles(), &strings(&["Corporate Earnings"]));
        assert_eq!(unique.get("Article 1"), Some(&strings(&["Finance", "Markets"])[..]));
    }

    #[tokio::test]
    async fn test_compare_acme_end_to_end() {
        let generator = Arc::new(ScriptedGenerator {
            topics: Some(r#"{"CommonTopics": ["Finance", "Corporate Performance", "Risk", "Extra"]}"#.to_string()),
            coverage: Some(
                r#"{"Coverage Differences": [{"Comparison": "Article 1 is upbeat, Article 2 is not.", "Impact": "Mixed signals for investors."}]}"#
                    .to_string(),
            ),
            narrative: Some("  Acme's news is mixed.  ".to_string()),
            ..ScriptedGenerator::default()
        });
        let comparator = Comparator::new(generator.clone());

        let report = comparator
            .compare("Acme", acme_articles(), acme_counts())
            .await
            .unwrap();

        let score = &report.comparative_sentiment_score;
        assert_eq!(report.company, "Acme");
        assert_eq!(report.articles.len(), 2);
        assert_eq!(score.sentiment_distribution, acme_counts());
        assert_eq!(
            score.topic_overlap.common_topics,
            strings(&["Finance", "Corporate Performance", "Risk"])
        );
        assert_eq!(score.topic_overlap.unique_topics.get("Article 1"), Some(&strings(&["Markets"])[..]));
        assert_eq!(score.topic_overlap.unique_topics.get("Article 2"), Some(&strings(&["Legal"])[..]));
        assert_eq!(score.coverage_differences.len(), 1);
        assert_eq!(score.coverage_differences[0].impact, "Mixed signals for investors.");
        assert_eq!(report.final_sentiment_analysis, "Acme's news is mixed.");
        assert_eq!(report.audio, None);

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].0.contains("{'Finance', 'Markets'}, {'Legal', 'Finance'}"));
        assert!(prompts[1].0.contains("{'Positive': 1, 'Negative': 1, 'Neutral': 0}"));
        assert!(prompts[2].0.contains("\"Quarterly profit doubled. Regulators sued Acme.\""));
        assert_eq!(prompts[2].1.max_tokens, Some(NARRATIVE_MAX_TOKENS));
    }

    #[tokio::test]
    async fn test_unparsable_replies_fall_back() {
        let generator = Arc::new(ScriptedGenerator {
            topics: Some("The common themes are finance and law.".to_string()),
            coverage: Some("Article one is happier.".to_string()),
            narrative: Some("Mixed.".to_string()),
            ..ScriptedGenerator::default()
        });
        let comparator = Comparator::new(generator);

        let report = comparator
            .compare("Acme", acme_articles(), acme_counts())
            .await
            .unwrap();

        let overlap = &report.comparative_sentiment_score.topic_overlap;
        assert_eq!(overlap.common_topics, strings(&["Finance"]));
        assert_eq!(overlap.unique_topics.get("Article 1"), Some(&strings(&["Markets"])[..]));
        assert!(report.comparative_sentiment_score.coverage_differences.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_coverage_entries_fall_back() {
        let generator = Arc::new(ScriptedGenerator {
            coverage: Some(r#"{"Coverage Differences": [{"Comparison": "only half"}]}"#.to_string()),
            ..ScriptedGenerator::default()
        });
        let comparator = Comparator::new(generator);

        let coverage = comparator
            .coverage_differences("Acme", &acme_counts(), &strings(&["Finance"]))
            .await;
        assert!(coverage.is_empty());
    }

    #[tokio::test]
    async fn test_generator_outage_only_fails_narrative() {
        let comparator = Comparator::new(Arc::new(ScriptedGenerator::default()));

        let common = comparator
            .common_topics(&acme_articles(), strings(&["Finance"]))
            .await;
        assert_eq!(common, strings(&["Finance"]));

        let result = comparator
            .compare("Acme", acme_articles(), acme_counts())
            .await;
        assert!(matches!(result, Err(Error::Generation(_))));
    }

    #[tokio::test]
    async fn test_blank_narrative_placeholder() {
        let generator = Arc::new(ScriptedGenerator {
            narrative: Some("   ".to_string()),
            ..ScriptedGenerator::default()
        });
        let comparator = Comparator::new(generator);

        let text = comparator
            .final_sentiment("Acme", &acme_articles(), &acme_counts())
            .await
            .unwrap();
        assert_eq!(text, NARRATIVE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_common_topics_never_exceed_three() {
        let generator = Arc::new(ScriptedGenerator {
            topics: Some(r#"{"CommonTopics": ["a", "b", "c", "d", "e"]}"#.to_string()),
            ..ScriptedGenerator::default()
        });
        let comparator = Comparator::new(generator);
        let baseline = strings(&["w", "x", "y", "z"]);

        assert_eq!(comparator.common_topics(&[], baseline.clone()).await.len(), 3);

        let silent = Comparator::new(Arc::new(ScriptedGenerator::default()));
        assert_eq!(silent.common_topics(&[], baseline).await, strings(&["w", "x", "y"]));
    }
}
