pub mod cli;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use cli::{handle_command, NewsArgs, NewsCommands};
pub use logging::{init_logging, ReportLog};
pub use manager::{client_view, PipelineConfig, ReportManager};
pub use scrapers::{EconomicTimesScraper, NewsSource};

pub mod prelude {
    pub use super::manager::{PipelineConfig, ReportManager};
    pub use super::scrapers::NewsSource;
    pub use ns_core::{Article, Error, Result};
}
