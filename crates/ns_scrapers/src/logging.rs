use std::fmt;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Log handle for one report run. Every line carries the company and, inside
/// a stage, the stage name, e.g. `[Acme/audio] 🔇 ...`.
#[derive(Debug, Clone)]
pub struct ReportLog {
    company: String,
    stage: Option<&'static str>,
}

impl ReportLog {
    pub fn for_company(company: &str) -> Self {
        Self {
            company: company.to_string(),
            stage: None,
        }
    }

    pub fn stage(&self, stage: &'static str) -> Self {
        Self {
            company: self.company.clone(),
            stage: Some(stage),
        }
    }

    pub fn info(&self, message: impl fmt::Display) {
        tracing::info!(company = %self.company, "{} {}", self, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        tracing::warn!(company = %self.company, "{} {}", self, message);
    }
}

impl fmt::Display for ReportLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(f, "[{}/{}]", self.company, stage),
            None => write!(f, "[{}]", self.company),
        }
    }
}

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
/// Later calls, or a subscriber installed elsewhere, leave things as they are.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}
