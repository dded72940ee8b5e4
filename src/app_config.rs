/*!
 * Application configuration.
 *
 * Handles the persisted settings: languages, pipeline limits, alignment
 * backend and the user's glossaries.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::glossary::Glossary;
use crate::glossary::migrate::migrate_all_glossaries;
use crate::language_utils::LanguageDetector;
use crate::pipeline::chunks::DurationBudget;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Pipeline limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Alignment backend
    #[serde(default)]
    pub alignment: AlignmentSettings,

    /// Saved glossaries
    #[serde(default)]
    pub glossaries: Vec<Glossary>,

    /// Glossary applied to translation and terminology checks
    #[serde(default)]
    pub active_glossary_id: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Concurrency, chunking, timeout and retry settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Maximum simultaneous external calls
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Length of each transcription chunk in seconds
    #[serde(default = "default_chunk_duration_secs")]
    pub chunk_duration_secs: f64,

    /// How much of the media to process
    #[serde(default)]
    pub duration_budget: DurationBudget,

    /// Deadline for each external call in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for transient failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff for retries in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Transcription model identifier
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    /// Subtitles per translation request
    #[serde(default = "default_translation_batch_size")]
    pub translation_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            chunk_duration_secs: default_chunk_duration_secs(),
            duration_budget: DurationBudget::All,
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            transcription_model: default_transcription_model(),
            translation_batch_size: default_translation_batch_size(),
        }
    }
}

/// Forced-alignment backend settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentSettings {
    /// "none", "ctc"; unknown values behave like "none"
    #[serde(default = "default_alignment_mode")]
    pub mode: String,

    /// Alignment model file
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Aligner helper binary
    #[serde(default)]
    pub aligner_path: Option<PathBuf>,
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self {
            mode: default_alignment_mode(),
            model_path: None,
            aligner_path: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrency() -> usize {
    3
}

fn default_chunk_duration_secs() -> f64 {
    300.0
}

fn default_timeout_secs() -> u64 {
    600 // External transcription of a 5 minute chunk can take several minutes
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_transcription_model() -> String {
    "default".to_string()
}

fn default_translation_batch_size() -> usize {
    20
}

fn default_alignment_mode() -> String {
    "none".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "zh".to_string(),
            pipeline: PipelineConfig::default(),
            alignment: AlignmentSettings::default(),
            glossaries: Vec::new(),
            active_glossary_id: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.source_language)?;
        crate::language_utils::get_language_name(&self.target_language)?;

        if self.pipeline.concurrency == 0 {
            return Err(anyhow!("Pipeline concurrency must be at least 1"));
        }
        if !(self.pipeline.chunk_duration_secs > 0.0) {
            return Err(anyhow!(
                "Chunk duration must be positive, got {}",
                self.pipeline.chunk_duration_secs
            ));
        }
        if self.pipeline.translation_batch_size == 0 {
            return Err(anyhow!("Translation batch size must be at least 1"));
        }
        if let Some(id) = &self.active_glossary_id {
            if !self.glossaries.iter().any(|g| &g.id == id) {
                return Err(anyhow!("Active glossary {} does not exist", id));
            }
        }

        Ok(())
    }

    /// The glossary selected for translation and terminology checks
    pub fn active_glossary(&self) -> Option<&Glossary> {
        let id = self.active_glossary_id.as_ref()?;
        self.glossaries.iter().find(|g| &g.id == id)
    }
}

/// Persistence of the settings blob
pub trait SettingsStore: Send + Sync {
    /// Read the stored settings, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<Config>>;

    /// Replace the stored settings
    fn save(&self, config: &Config) -> Result<()>;
}

/// Settings stored as pretty-printed JSON on disk
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    /// Store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's config directory
    pub fn new_default() -> Result<Self> {
        let dir = dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(Self::new(dir.join("subweave").join("settings.json")))
    }

    /// Location on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Option<Config>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file: {}", self.path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", self.path.display()))?;
        Ok(Some(config))
    }

    fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(config).context("Failed to serialize settings")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

/// In-memory settings, for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    config: Mutex<Option<Config>>,
}

impl MemorySettingsStore {
    /// Store pre-populated with `config`
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Mutex::new(Some(config)),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<Config>> {
        Ok(self.config.lock().clone())
    }

    fn save(&self, config: &Config) -> Result<()> {
        *self.config.lock() = Some(config.clone());
        Ok(())
    }
}

/// Load settings, applying the one-time glossary language upgrade.
///
/// Missing settings yield the defaults. When the upgrade changed anything
/// the result is written back, so later loads are no-ops.
pub fn load_settings(
    store: &dyn SettingsStore,
    detector: &dyn LanguageDetector,
    fallback_language: Option<&str>,
) -> Result<Config> {
    let Some(mut config) = store.load()? else {
        debug!("No saved settings, using defaults");
        return Ok(Config::default());
    };

    let fallback = fallback_language.unwrap_or(&config.target_language).to_string();
    let (migrated, changed) = migrate_all_glossaries(&config.glossaries, detector, Some(&fallback));
    if changed {
        info!("Upgraded glossary language tags for {} glossaries", migrated.len());
        config.glossaries = migrated;
        store.save(&config)?;
    }

    Ok(config)
}
