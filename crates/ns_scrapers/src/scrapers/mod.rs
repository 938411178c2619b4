use async_trait::async_trait;
use ns_core::{FetchError, RawArticle};

pub mod economictimes;

pub use economictimes::EconomicTimesScraper;

pub const DEFAULT_ARTICLE_LIMIT: usize = 10;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the name of the news source
    fn source(&self) -> &str;

    /// Fetches up to `limit` recent stories about `company`, in page order.
    async fn fetch_articles(&self, company: &str, limit: usize) -> Result<Vec<RawArticle>, FetchError>;
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use ns_core::FetchError;
    use scraper::{ElementRef, Selector};

    pub fn selector(css: &str) -> Result<Selector, FetchError> {
        Selector::parse(css).map_err(|e| FetchError::Markup(format!("invalid selector {:?}: {}", css, e)))
    }

    /// Text of the first match under `root`, each text node trimmed.
    pub fn first_text(root: &ElementRef<'_>, selector: &Selector) -> Option<String> {
        root.select(selector)
            .next()
            .map(|el| el.text().map(str::trim).collect::<String>())
    }
}
