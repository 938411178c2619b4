use clap::Parser;
use ns_core::Result;
use ns_inference::speech::ServiceAccount;
use ns_inference::{models::http_client, FailurePolicy, InferenceConfig, Models, RetryPolicy};
use ns_scrapers::{handle_command, init_logging, NewsArgs, NewsCommands, PipelineConfig, ReportManager};
use ns_scrapers::{EconomicTimesScraper, NewsSource};
use ns_web::{create_app, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Company news sentiment reports", long_about = None)]
pub struct Cli {
    /// Text generator backend: groq, ollama or dummy
    #[arg(long, env = "NS_GENERATOR", default_value = "groq")]
    generator: String,
    /// Override the generator's model name
    #[arg(long, env = "NS_GENERATOR_MODEL")]
    generator_model: Option<String>,
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    groq_api_key: Option<String>,
    /// Ollama endpoint, e.g. http://localhost:11434/llama3.1:8b
    #[arg(long, env = "NS_MODEL_URL")]
    model_url: Option<String>,
    /// Classifier backend: huggingface or dummy
    #[arg(long, env = "NS_CLASSIFIER", default_value = "huggingface")]
    classifier: String,
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    hf_api_token: Option<String>,
    /// Service account key for speech synthesis; `\n` sequences are unescaped
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,
    #[arg(long, env = "CLIENT_EMAIL")]
    client_email: Option<String>,
    /// Where final_summary.json and hindi_summary.mp3 are written
    #[arg(long, env = "NS_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,
    #[arg(long, default_value = "file", help = "Report storage: file (default), memory")]
    storage: String,
    /// Maximum number of stories per report
    #[arg(long, default_value_t = 10)]
    articles: usize,
    /// Per-call timeout for remote models
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// Attempts per remote model call
    #[arg(long, default_value_t = 1)]
    retries: u32,
    /// abort the report, or tag the article as unknown
    #[arg(long, default_value = "abort")]
    on_classifier_error: FailurePolicy,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "NS_ADDR", default_value = "0.0.0.0:8000")]
        addr: String,
    },
    #[command(flatten)]
    News(NewsCommands),
}

impl Cli {
    fn inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            generator: self.generator.clone(),
            generator_model: self.generator_model.clone(),
            groq_api_key: self.groq_api_key.clone(),
            model_url: self.model_url.clone(),
            classifier: self.classifier.clone(),
            hf_api_token: self.hf_api_token.clone(),
            service_account: ServiceAccount::from_parts(self.private_key.clone(), self.client_email.clone()),
            retry: RetryPolicy::new(self.retries.max(1), Duration::from_secs(self.timeout_secs)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let config = cli.inference_config();
    let models = Models::from_config(&config)?;
    info!(
        "🧠 Models initialized (sentiment: {}, topics: {}, generator: {})",
        models.sentiment.name(),
        models.topics.name(),
        models.generator.name()
    );
    if models.synthesizer.is_none() {
        warn!("🔇 No speech credentials configured, reports will have no audio");
    }

    let storage = ns_storage::create_storage(&cli.storage, &cli.output_dir)?;
    info!("💾 Storage ready ({})", storage.audio_location());

    let scraper = EconomicTimesScraper::new(http_client(&config)?).with_retry(config.retry.clone());
    let source: Arc<dyn NewsSource> = Arc::new(scraper);
    info!("🦗 News source: {}", source.source());

    let pipeline = PipelineConfig {
        article_limit: cli.articles,
        on_classifier_error: cli.on_classifier_error,
    };
    let manager = ReportManager::new(source, &models, storage, pipeline);

    match cli.command {
        Commands::Serve { addr } => {
            let app = create_app(AppState::new(Arc::new(manager)));
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("🚀 Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::News(command) => {
            let mut stdout = std::io::stdout().lock();
            handle_command(NewsArgs { command }, &manager, &mut stdout).await?;
        }
    }

    Ok(())
}
