use std::io::Write;

use clap::{Args, Subcommand};
use ns_core::{Result, Sentiment};

use crate::manager::ReportManager;

#[derive(Args, Debug, Clone)]
pub struct NewsArgs {
    #[command(subcommand)]
    pub command: NewsCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NewsCommands {
    /// List the stories the news source has about a company
    Fetch {
        /// Company name, e.g. "Tata Motors"
        company: String,
    },
    /// Run the full pipeline for a company and print the report as JSON
    Report {
        /// Company name, e.g. "Tata Motors"
        company: String,
    },
}

fn emoji(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "📈",
        Sentiment::Negative => "📉",
        Sentiment::Neutral => "➖",
        Sentiment::Unknown => "❔",
    }
}

pub async fn handle_command(args: NewsArgs, manager: &ReportManager, out: &mut impl Write) -> Result<()> {
    match args.command {
        NewsCommands::Fetch { company } => {
            let articles = manager.fetch(&company).await?;
            writeln!(out, "Found {} articles on {}", articles.len(), manager.source())?;
            for (i, article) in articles.iter().enumerate() {
                writeln!(out, "{:>2}. {}", i + 1, article.title)?;
            }
        }
        NewsCommands::Report { company } => {
            let report = manager.generate_report(&company).await?;
            for article in &report.articles {
                tracing::info!("{} {} ({:.2})", emoji(article.sentiment), article.title, article.score);
            }
            let document = serde_json::to_string_pretty(&report)?;
            writeln!(out, "{}", document)?;
        }
    }
    Ok(())
}
