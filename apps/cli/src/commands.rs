//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use doclib_analysis::{
    AnalysisReport, AnalysisRequest, AnalysisSelection, HttpAnalysisService, ModerationThresholds,
    Provider, Tone, format_percent, format_timestamp, run_analyses,
};
use doclib_core::library::{CORPUS_FILE, MANIFEST_FILE};
use doclib_core::pipeline::{BuildLibraryResult, ProgressReporter};
use doclib_core::search::{self, DEFAULT_LIMIT};
use doclib_shared::{
    AppConfig, BuildConfig, BuildOverrides, CategoryCatalog, init_config, load_config,
    load_config_from, load_credentials,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// doclib: turn a documentation tree into a categorized reference library.
#[derive(Parser)]
#[command(
    name = "doclib",
    version,
    about = "Turn a Markdown/MDX documentation tree into a categorized, searchable reference library.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.doclib/doclib.toml.
    #[arg(long, env = "DOCLIB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

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
    /// Build the library from a docs tree.
    Build {
        /// Documentation root to ingest.
        #[arg(long, env = "DOCLIB_DOCS_DIR")]
        docs_dir: Option<PathBuf>,

        /// Output directory (replaced on every build).
        #[arg(short, long, env = "DOCLIB_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Base URL source links are resolved against.
        #[arg(long, env = "DOCLIB_BASE_URL")]
        base_url: Option<String>,
    },

    /// Keyword search over a built corpus.
    Search {
        /// Search terms.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Corpus file (defaults to <output_dir>/corpus.json).
        #[arg(long, env = "DOCLIB_CORPUS_PATH")]
        corpus: Option<PathBuf>,

        /// Maximum number of results.
        #[arg(short = 'k', long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
    },

    /// Analyze a video asset through the analysis service.
    Analyze {
        /// Asset identifier.
        asset_id: String,

        /// AI provider: openai, anthropic or google.
        #[arg(long)]
        provider: Option<Provider>,

        /// Summary tone: professional, neutral or playful.
        #[arg(long, default_value_t = Tone::default())]
        tone: Tone,

        /// Chapter language code.
        #[arg(long, default_value = doclib_analysis::DEFAULT_LANGUAGE)]
        language: String,

        /// Generate summary and tags.
        #[arg(long)]
        summarize: bool,

        /// Generate chapters.
        #[arg(long)]
        chapters: bool,

        /// Run content moderation.
        #[arg(long)]
        moderate: bool,

        /// Run all analyses.
        #[arg(long)]
        all: bool,

        /// Analysis service endpoint.
        #[arg(long, env = "DOCLIB_ANALYSIS_ENDPOINT")]
        endpoint: Option<String>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
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
        0 => "doclib=info",
        1 => "doclib=debug",
        _ => "doclib=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Build {
            docs_dir,
            output_dir,
            base_url,
        } => {
            let overrides = BuildOverrides {
                docs_dir,
                output_dir,
                base_url,
            };
            cmd_build(config_path, overrides)
        }
        Command::Search {
            query,
            corpus,
            limit,
        } => cmd_search(config_path, &query.join(" "), corpus, limit),
        Command::Analyze {
            asset_id,
            provider,
            tone,
            language,
            summarize,
            chapters,
            moderate,
            all,
            endpoint,
            json,
        } => {
            let selection = if all {
                AnalysisSelection::all()
            } else {
                AnalysisSelection {
                    summarize,
                    chapters,
                    moderate,
                }
            };
            let options = AnalyzeOptions {
                provider,
                tone,
                language,
                selection,
                endpoint,
                json,
            };
            cmd_analyze(config_path, &asset_id, options).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

fn cmd_build(config_path: Option<&Path>, overrides: BuildOverrides) -> Result<()> {
    let config = load_app_config(config_path)?;
    let build_config = BuildConfig::resolve(&config, overrides)?;

    info!(
        docs_dir = %build_config.docs_dir.display(),
        output_dir = %build_config.output_dir.display(),
        base_url = %build_config.base_url,
        "building documentation library"
    );

    let catalog = CategoryCatalog::default();
    let reporter = CliProgress::new();
    let result = match doclib_core::build_library(&build_config, &catalog, &reporter) {
        Ok(result) => result,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    println!();
    println!("  Library built successfully!");
    println!("  Documents: {}", result.entry_count);
    for (category, count) in &result.categories {
        println!("    {:<28} {count}", catalog.display_name(*category));
    }
    println!("  Path:      {}", result.output_dir.display());
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

fn cmd_search(
    config_path: Option<&Path>,
    query: &str,
    corpus_path: Option<PathBuf>,
    limit: usize,
) -> Result<()> {
    let corpus_path = match corpus_path {
        Some(path) => path,
        None => {
            let config = load_app_config(config_path)?;
            PathBuf::from(&config.corpus.output_dir).join(CORPUS_FILE)
        }
    };

    // A corpus inside a built library must come from a compatible build
    if let Some(library_dir) = corpus_path.parent() {
        if library_dir.join(MANIFEST_FILE).exists() {
            let manifest = doclib_core::read_manifest(library_dir)
                .wrap_err("library manifest is unreadable. Re-run `doclib build`")?;
            info!(
                generated_at = %manifest.generated_at,
                documents = manifest.entry_count,
                "using library"
            );
        }
    }

    let corpus = search::load_corpus(&corpus_path)?;
    let hits = search::search(&corpus, query, limit);

    info!(query, hits = hits.len(), corpus = %corpus_path.display(), "search finished");

    if hits.is_empty() {
        println!("No documents matched \"{query}\". Try fewer or broader terms.");
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!();
        println!("{}. {} ({} matching terms)", rank + 1, hit.entry.title, hit.score);
        println!("   {}", hit.entry.source_url);
        println!("   {}...", search::preview(&hit.entry.content));
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

struct AnalyzeOptions {
    provider: Option<Provider>,
    tone: Tone,
    language: String,
    selection: AnalysisSelection,
    endpoint: Option<String>,
    json: bool,
}

async fn cmd_analyze(config_path: Option<&Path>, asset_id: &str, options: AnalyzeOptions) -> Result<()> {
    let config = load_app_config(config_path)?;

    // Credentials first: nothing is sent without them
    let credentials = load_credentials(&config)?;

    let provider = match options.provider {
        Some(provider) => provider,
        None => config
            .analysis
            .default_provider
            .parse::<Provider>()
            .wrap_err("invalid analysis.default_provider in config")?,
    };

    let request = AnalysisRequest {
        asset_id: asset_id.to_string(),
        selection: options.selection,
        provider,
        tone: options.tone,
        language: options.language,
        thresholds: ModerationThresholds::default(),
    };

    let endpoint = options
        .endpoint
        .unwrap_or_else(|| config.analysis.endpoint.clone());
    let service = HttpAnalysisService::new(&endpoint, credentials, config.analysis.timeout_secs)?;

    info!(asset_id, %provider, endpoint = %service.endpoint(), "running analyses");

    if !options.json {
        println!("{}", "=".repeat(60));
        println!("  Video Analysis");
        println!("{}", "=".repeat(60));
        println!("  Asset ID: {asset_id}");
        println!("  Provider: {provider}");
    }

    let report = run_analyses(&service, &request).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    if let Some(summary) = &report.summary {
        println!();
        println!("Summary and tags");
        println!("  Title: {}", summary.title);
        println!();
        println!("  Description:");
        println!("  {}", summary.description);
        println!();
        println!("  Tags: {}", summary.tags.join(", "));
        println!("  Asset ID: {}", summary.asset_id);
    }

    if let Some(chapters) = &report.chapters {
        println!();
        println!("Chapters");
        for chapter in &chapters.chapters {
            println!("  {} - {}", format_timestamp(chapter.start_time), chapter.title);
        }
        println!();
        println!("  Language: {}", chapters.language_code);
    }

    if let Some(moderation) = &report.moderation {
        println!();
        println!("Content moderation");
        let status = if moderation.exceeds_threshold {
            "FLAGGED"
        } else {
            "PASSED"
        };
        println!("  Status: {status}");
        println!(
            "  Max sexual score:   {}",
            format_percent(moderation.max_scores.sexual)
        );
        println!(
            "  Max violence score: {}",
            format_percent(moderation.max_scores.violence)
        );
        if moderation.exceeds_threshold {
            println!();
            println!("  This content may require manual review.");
        }
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("  Analysis complete!");
    println!("{}", "=".repeat(60));
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
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_parsed(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Parsing [{current}/{total}] {path}"));
    }

    fn file_written(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &BuildLibraryResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
