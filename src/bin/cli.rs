//! Profile Timeline Analyzer CLI
//!
//! Runs the web form, or a single analysis from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use timeline_analyzer::{
    driver::ChromiumDriverFactory,
    error::Result,
    models::{AnalysisKind, AnalysisRequest, AnalysisResult, Config, FormInput},
    pipeline,
    server::{self, AppState},
    services::OpenAiAssistantClient,
};

/// Timeline Analyzer - scrape a profile timeline and analyze its posts
#[derive(Parser, Debug)]
#[command(
    name = "timeline-analyzer",
    version,
    about = "Profile timeline scraper with LLM analysis"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the analysis form over HTTP
    Serve {
        /// Address to bind (default: server.bind from config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run one analysis and print the result
    Analyze {
        /// Profile handle, with or without the leading @
        #[arg(long)]
        handle: String,

        /// Maximum number of posts to collect
        #[arg(long)]
        limit: Option<usize>,

        /// Login username
        #[arg(long, env = "ANALYZER_USERNAME")]
        username: String,

        /// Login password
        #[arg(long, env = "ANALYZER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Response language
        #[arg(long)]
        language: Option<String>,

        /// Analysis to run; repeat for several
        #[arg(long = "kind")]
        kinds: Vec<AnalysisKind>,

        /// Model name
        #[arg(long)]
        model: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_result(result: &AnalysisResult) {
    println!("Fetched {} posts.", result.posts.len());
    for section in &result.sections {
        println!("\n## {}\n\n{}", section.title, section.body);
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Serve { bind } => {
            config.validate()?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let drivers = Arc::new(ChromiumDriverFactory::new(config.automation.clone()));
            let analyst = Arc::new(OpenAiAssistantClient::from_env(config.analysis.clone())?);

            server::serve(AppState::new(config, drivers, analyst), &bind).await?;
        }

        Command::Analyze {
            handle,
            limit,
            username,
            password,
            language,
            kinds,
            model,
            json,
        } => {
            config.validate()?;
            let input = FormInput {
                handle,
                limit: limit.map(|l| l.to_string()).unwrap_or_default(),
                username,
                password,
                language: language.unwrap_or_default(),
                model: model.unwrap_or_default(),
                kinds,
            };
            let request = AnalysisRequest::from_form(&input, &config.form)?;

            let drivers = ChromiumDriverFactory::new(config.automation.clone());
            let analyst = OpenAiAssistantClient::from_env(config.analysis.clone())?;
            let result = pipeline::run_analysis(&config, &request, &drivers, &analyst).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
            log::info!(
                "Analysis of @{} complete ({})",
                result.handle,
                result.stop_reason.as_str()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
