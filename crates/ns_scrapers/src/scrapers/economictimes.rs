use std::sync::Arc;

use async_trait::async_trait;
use ns_core::{Error, FetchError, RawArticle};
use ns_inference::RetryPolicy;
use reqwest::Client;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use super::utils;
use super::NewsSource;

const STORY_SELECTOR: &str = "div.clr.flt.topicstry.story_list";
const NO_TITLE_FOUND: &str = "No Title Found";
const NO_SUMMARY_FOUND: &str = "No Summary Found";

/// Topic pages of The Economic Times, e.g. `/topic/Tesla/news`.
#[derive(Debug, Clone)]
pub struct EconomicTimesScraper {
    client: Arc<Client>,
    base_url: String,
    retry: RetryPolicy,
}

impl EconomicTimesScraper {
    const BASE_URL: &'static str = "https://economictimes.indiatimes.com/topic";

    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            base_url: Self::BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn topic_url(&self, company: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Transport(format!("invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(company)
            .push("news");
        Ok(url)
    }
}

/// Pulls title/summary pairs out of a topic page.
pub fn parse_stories(html: &str, limit: usize) -> Result<Vec<RawArticle>, FetchError> {
    let document = Html::parse_document(html);
    let story = utils::selector(STORY_SELECTOR)?;
    let title_link = utils::selector("h2 a")?;
    let paragraph = utils::selector("p")?;

    let stories = document
        .select(&story)
        .take(limit)
        .map(|el| {
            let title = utils::first_text(&el, &title_link)
                .unwrap_or_else(|| NO_TITLE_FOUND.to_string());
            let summary = utils::first_text(&el, &paragraph)
                .unwrap_or_else(|| NO_SUMMARY_FOUND.to_string());
            RawArticle::new(title, summary)
        })
        .collect();

    Ok(stories)
}

#[async_trait]
impl NewsSource for EconomicTimesScraper {
    fn source(&self) -> &str {
        "The Economic Times"
    }

    async fn fetch_articles(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>, FetchError> {
        let url = self.topic_url(company)?;
        let what = format!("fetch of {}", url);

        let html = self
            .retry
            .run(&what, || async { self.fetch_page(&url).await.map_err(Error::Fetch) })
            .await
            .map_err(|e| match e {
                Error::Fetch(e) => e,
                other => FetchError::Transport(other.to_string()),
            })?;

        parse_stories(&html, limit)
    }
}

impl EconomicTimesScraper {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        debug!("🌐 GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("⚠️ Failed to fetch {}. Status code: {}", url, status.as_u16());
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
