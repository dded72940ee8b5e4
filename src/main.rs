// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subweave::app_config::{load_settings, JsonFileSettingsStore, LogLevel, SettingsStore};
use subweave::glossary::{
    export_glossary, export_glossary_csv, find_glossary, import_glossary, import_glossary_from_csv,
    migrate_all_glossaries, upsert_glossary, Glossary,
};
use subweave::language_utils::ScriptDetector;
use subweave::pipeline::{plan_chunks, select_chunks_by_duration, DurationBudget};
use subweave::subtitle::SubtitleItem;
use subweave::validation::{check_terminology, ConsistencyValidator};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run consistency and terminology checks on a subtitle JSON file
    Check {
        /// Subtitle list as JSON (array of subtitle items)
        #[arg(value_name = "SUBTITLES")]
        subtitles: PathBuf,

        /// Glossary file (.json or .csv); defaults to the active glossary
        #[arg(short, long)]
        glossary: Option<PathBuf>,
    },

    /// Manage saved glossaries
    #[command(subcommand)]
    Glossary(GlossaryCommand),

    /// Print the chunk plan for a media duration
    Chunks {
        /// Media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Chunk length in seconds (defaults to the configured value)
        #[arg(short, long)]
        chunk_length: Option<f64>,

        /// Minutes to process, or "all"
        #[arg(short, long, default_value = "all")]
        budget: DurationBudget,
    },

    /// Generate shell completions for subweave
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum GlossaryCommand {
    /// Import a glossary from a .json or .csv file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Make the imported glossary the active one
        #[arg(short, long)]
        activate: bool,
    },

    /// Export a saved glossary to stdout
    Export {
        /// Glossary identifier
        id: String,

        /// Export as CSV instead of JSON
        #[arg(long)]
        csv: bool,
    },

    /// List saved glossaries
    List,

    /// Tag glossaries that have no target language
    Migrate {
        /// Language used for glossaries without terms
        #[arg(long)]
        fallback: Option<String>,
    },
}

/// subweave - chunked transcription and translation tooling for subtitles
#[derive(Parser, Debug)]
#[command(name = "subweave")]
#[command(version = "0.1.0")]
#[command(about = "Subtitle pipeline tooling: chunk planning, glossaries and quality checks")]
#[command(long_about = "subweave plans transcription chunks, manages translation glossaries and checks translated subtitles.

EXAMPLES:
    subweave check episode.json                      # Check with the active glossary
    subweave check episode.json -g terms.csv         # Check against a glossary file
    subweave glossary import terms.csv --activate    # Import and activate a glossary
    subweave glossary export glossary-1a2b --csv     # Export as CSV
    subweave chunks --duration 3600 --budget 20      # Plan the first 20 minutes
    subweave completions bash > subweave.bash        # Generate bash completions

CONFIGURATION:
    Settings are stored as JSON under the user's config directory. Use
    --settings or SUBWEAVE_SETTINGS to point at a different file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Settings file path
    #[arg(long, global = true, env = "SUBWEAVE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation; the level lives in log::max_level()
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the settings say otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subweave", &mut std::io::stdout());
        return Ok(());
    }

    let store = match &cli.settings {
        Some(path) => JsonFileSettingsStore::new(path),
        None => JsonFileSettingsStore::new_default()?,
    };
    debug!("Using settings at {}", store.path().display());
    let level_from_cli = cli.log_level.is_some();

    match cli.command {
        Commands::Check { subtitles, glossary } => run_check(&store, &subtitles, glossary.as_deref(), level_from_cli),
        Commands::Glossary(command) => run_glossary(&store, command, level_from_cli),
        Commands::Chunks {
            duration,
            chunk_length,
            budget,
        } => run_chunks(&store, duration, chunk_length, budget, level_from_cli),
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(store: &JsonFileSettingsStore, level_from_cli: bool) -> Result<subweave::Config> {
    let config = load_settings(store, &ScriptDetector, None)?;
    config.validate().context("Configuration validation failed")?;
    if !level_from_cli {
        log::set_max_level(config.log_level.to_level_filter());
    }
    Ok(config)
}

fn read_glossary_file(path: &Path) -> Result<Glossary> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read glossary file: {}", path.display()))?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let glossary = if is_csv {
        let filename = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        import_glossary_from_csv(&text, &filename)?
    } else {
        import_glossary(&text)?
    };
    Ok(glossary)
}

fn run_check(store: &JsonFileSettingsStore, path: &Path, glossary_path: Option<&Path>, level_from_cli: bool) -> Result<()> {
    let config = load_config(store, level_from_cli)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read subtitles: {}", path.display()))?;
    let subtitles: Vec<SubtitleItem> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse subtitles: {}", path.display()))?;

    let glossary = match glossary_path {
        Some(path) => Some(read_glossary_file(path)?),
        None => config.active_glossary().cloned(),
    };

    let consistency = ConsistencyValidator::new().validate(&subtitles);
    for issue in &consistency {
        println!("{}", issue);
    }

    let terminology = match &glossary {
        Some(glossary) => check_terminology(&glossary.terms, &subtitles),
        None => {
            warn!("No glossary given and none active, skipping terminology check");
            Vec::new()
        }
    };
    for issue in &terminology {
        println!("{}", issue);
        for occurrence in &issue.occurrences {
            println!("    {}: {} -> {}", occurrence.subtitle_id, occurrence.original, occurrence.translated);
        }
    }

    info!(
        "{} subtitles checked: {} consistency issues, {} terminology issues",
        subtitles.len(),
        consistency.len(),
        terminology.len()
    );
    Ok(())
}

fn run_glossary(store: &JsonFileSettingsStore, command: GlossaryCommand, level_from_cli: bool) -> Result<()> {
    match command {
        GlossaryCommand::Import { file, activate } => {
            let mut config = load_config(store, level_from_cli)?;
            let glossary = read_glossary_file(&file)?;
            info!("Imported '{}' with {} terms", glossary.name, glossary.terms.len());
            println!("{}", glossary.id);
            if activate {
                config.active_glossary_id = Some(glossary.id.clone());
            }
            upsert_glossary(&mut config.glossaries, glossary);
            store.save(&config)
        }
        GlossaryCommand::Export { id, csv } => {
            let config = load_config(store, level_from_cli)?;
            let glossary =
                find_glossary(&config.glossaries, &id).ok_or_else(|| anyhow!("No glossary with id {}", id))?;
            if csv {
                print!("{}", export_glossary_csv(glossary));
            } else {
                println!("{}", export_glossary(glossary));
            }
            Ok(())
        }
        GlossaryCommand::List => {
            let config = load_config(store, level_from_cli)?;
            if config.glossaries.is_empty() {
                println!("No saved glossaries");
            }
            for glossary in &config.glossaries {
                let marker = if config.active_glossary_id.as_deref() == Some(glossary.id.as_str()) { "*" } else { " " };
                println!(
                    "{} {}  {}  ({} terms, {})",
                    marker,
                    glossary.id,
                    glossary.name,
                    glossary.terms.len(),
                    glossary.target_language.as_deref().unwrap_or("no language")
                );
            }
            Ok(())
        }
        GlossaryCommand::Migrate { fallback } => {
            // Read the raw settings so the explicit fallback wins over the automatic upgrade
            let Some(mut config) = store.load()? else {
                println!("No saved settings");
                return Ok(());
            };
            let fallback = fallback.unwrap_or_else(|| config.target_language.clone());
            let (migrated, changed) = migrate_all_glossaries(&config.glossaries, &ScriptDetector, Some(&fallback));
            if changed {
                config.glossaries = migrated;
                store.save(&config)?;
                println!("Glossaries updated");
            } else {
                println!("Nothing to migrate");
            }
            Ok(())
        }
    }
}

fn run_chunks(
    store: &JsonFileSettingsStore,
    duration: f64,
    chunk_length: Option<f64>,
    budget: DurationBudget,
    level_from_cli: bool,
) -> Result<()> {
    let config = load_config(store, level_from_cli)?;
    let chunk_length = chunk_length.unwrap_or(config.pipeline.chunk_duration_secs);

    let planned = plan_chunks(duration, chunk_length)?;
    let selected = select_chunks_by_duration(&planned, budget, chunk_length);
    for chunk in &selected {
        println!("{:>4}  {:>9.1}s - {:>9.1}s  ({:.1}s)", chunk.index, chunk.start, chunk.end, chunk.duration());
    }
    info!("{} of {} chunks selected (budget {})", selected.len(), planned.len(), budget);
    Ok(())
}
