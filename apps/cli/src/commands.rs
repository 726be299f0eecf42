//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::info;

use sermondeck_insights::pipeline::InsightProgress;
use sermondeck_insights::{enrich, fallback_insight};
use sermondeck_model::OpenRouterClient;
use sermondeck_shared::{
    AppConfig, ContentItem, FALLBACK_CATEGORY, InsightConfig, InsightOrigin, init_config,
    load_config, validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SermonDeck — curated insights for your sermon library.
#[derive(Parser)]
#[command(
    name = "sermondeck",
    version,
    about = "Generate AI insights and categories for a sermon library's dashboard.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich documents with AI-generated insights and categories.
    Enrich {
        /// JSON file holding the documents: an array of {"title", "body"?}.
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum number of documents to enrich (defaults to config).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Model ID override (defaults to config).
        #[arg(short, long)]
        model: Option<String>,

        /// Emit results as JSON instead of a human summary.
        #[arg(long)]
        json: bool,
    },

    /// Show the deterministic fallback insight for a title.
    Fallback {
        /// Document title.
        title: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sermondeck=info",
        1 => "sermondeck=debug",
        _ => "sermondeck=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich {
            file,
            limit,
            model,
            json,
        } => cmd_enrich(&file, limit, model.as_deref(), json).await,
        Command::Fallback { title } => cmd_fallback(&title),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// enrich
// ---------------------------------------------------------------------------

/// One document entry in the input file.
#[derive(Debug, Deserialize)]
struct DocumentSpec {
    title: String,
    #[serde(default)]
    body: Option<String>,
}

async fn cmd_enrich(
    file: &Path,
    limit: Option<usize>,
    model: Option<&str>,
    json: bool,
) -> Result<()> {
    // Validate API key before doing anything
    let config = load_config()?;
    validate_api_key(&config)?;

    let limit = limit.unwrap_or(config.defaults.insight_limit);

    let items = load_documents(file)?;
    if items.is_empty() {
        return Err(eyre!("no documents found in '{}'", file.display()));
    }

    let client = OpenRouterClient::from_config(&config.openrouter, model)?;
    let insight_config = InsightConfig::from(&config);

    info!(
        documents = items.len(),
        limit,
        model = model.unwrap_or(&config.openrouter.default_model),
        "starting enrichment"
    );

    let start = Instant::now();
    let reporter = CliProgress::new();
    let results = enrich(&client, &insight_config, &items, limit, &reporter).await;
    reporter.finish();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let fallbacks = results
        .iter()
        .filter(|r| r.origin == InsightOrigin::Fallback)
        .count();

    println!();
    for item in &results {
        let marker = match item.origin {
            InsightOrigin::Model => "",
            InsightOrigin::Fallback => " (fallback)",
        };
        println!("  {} [{}]{marker}", item.source.title, item.category);
        println!("    {}", item.insight);
    }
    println!();
    println!("  Enriched: {}", results.len());
    println!("  Fallback: {fallbacks}");
    println!("  Time:     {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

/// Read and validate the document input file.
fn load_documents(file: &Path) -> Result<Vec<ContentItem>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;

    let specs: Vec<DocumentSpec> = serde_json::from_str(&content)
        .map_err(|e| eyre!("invalid document file '{}': {e}", file.display()))?;

    Ok(specs
        .into_iter()
        .map(|spec| ContentItem::new(spec.title, spec.body))
        .collect())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner.set_message("Enriching documents");
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl InsightProgress for CliProgress {
    fn item_done(&self, current: usize, total: usize, title: &str) {
        self.spinner
            .set_message(format!("Enriching [{current}/{total}] {title}"));
    }
}

// ---------------------------------------------------------------------------
// fallback / config
// ---------------------------------------------------------------------------

fn cmd_fallback(title: &str) -> Result<()> {
    println!("{} [{}]", fallback_insight(title), FALLBACK_CATEGORY);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
