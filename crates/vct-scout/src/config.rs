// Configuration loading and parsing (config/scout.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use vct_core::{FuzzyResolver, JaroWinkler, LinkPolicy, Linker, QueryResolver, SequenceRatio};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config at {path}")]
    FileNotFound { path: PathBuf },

    #[error("invalid TOML in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("bad value for `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("could not seed config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

const CONFIG_FILE: &str = "scout.toml";

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory that relative paths in the file are resolved against.
    pub base_dir: PathBuf,
    pub data: DataConfig,
    pub matching: MatchingConfig,
    pub prompt: PromptConfig,
}

/// Raw deserialization target for scout.toml.
#[derive(Debug, Clone, Deserialize)]
struct ScoutFile {
    data: DataConfig,
    #[serde(default)]
    matching: MatchingConfig,
    #[serde(default)]
    prompt: PromptConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub dir: String,
    /// Pre-fetched stats scrape (JSON). Optional.
    #[serde(default)]
    pub scrape_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerChoice {
    #[default]
    Sequence,
    JaroWinkler,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub scorer: ScorerChoice,
    #[serde(default = "enabled")]
    pub fuzzy_teams: bool,
    #[serde(default = "enabled")]
    pub fuzzy_participants: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            scorer: ScorerChoice::default(),
            fuzzy_teams: true,
            fuzzy_participants: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    /// Scraped players included in a prompt.
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Linked matches included in a prompt.
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_players: default_max_players(),
            max_matches: default_max_matches(),
        }
    }
}

fn default_threshold() -> f64 {
    vct_core::DEFAULT_THRESHOLD
}

fn enabled() -> bool {
    true
}

fn default_max_players() -> usize {
    3
}

fn default_max_matches() -> usize {
    20
}

// ---------------------------------------------------------------------------
// Derived components
// ---------------------------------------------------------------------------

impl MatchingConfig {
    pub fn fuzzy_resolver(&self) -> FuzzyResolver {
        match self.scorer {
            ScorerChoice::Sequence => FuzzyResolver::new(SequenceRatio),
            ScorerChoice::JaroWinkler => FuzzyResolver::new(JaroWinkler),
        }
    }

    pub fn link_policy(&self) -> LinkPolicy {
        LinkPolicy {
            threshold: self.threshold,
            fuzzy_teams: self.fuzzy_teams,
            fuzzy_participants: self.fuzzy_participants,
        }
    }
}

impl Config {
    pub fn linker(&self) -> Linker {
        Linker::new(self.matching.link_policy(), self.matching.fuzzy_resolver())
    }

    pub fn query_resolver(&self) -> QueryResolver {
        QueryResolver::new(self.matching.fuzzy_resolver(), self.matching.threshold)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join(&self.data.dir)
    }

    pub fn scrape_path(&self) -> Option<PathBuf> {
        self.data.scrape_file.as_ref().map(|p| self.base_dir.join(p))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/scout.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config_in()` which does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    let file: ScoutFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        base_dir: base_dir.to_path_buf(),
        data: file.data,
        matching: file.matching,
        prompt: file.prompt,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` from `defaults/`, skipping files that already exist.
/// Returns the paths written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults = base_dir.join("defaults");
    let target_dir = base_dir.join("config");

    if !defaults.is_dir() {
        return if target_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(copy_error(format!(
                "no defaults/ or config/ under {}",
                base_dir.display()
            )))
        };
    }

    std::fs::create_dir_all(&target_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", target_dir.display())))?;

    let mut sources: Vec<PathBuf> = std::fs::read_dir(&defaults)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    sources.sort();

    let mut written = Vec::new();
    for source in sources {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = target_dir.join(name);
        if seed_file(&source, &target)? {
            written.push(target);
        }
    }
    Ok(written)
}

/// Copy `source` to `target` unless `target` exists. `create_new` makes the
/// existence check and the create a single step.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    use std::io::Write;

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let bytes = std::fs::read(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    dest.write_all(&bytes)
        .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Copy any missing defaults, then load config relative to `base_dir`.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.dir".into(),
            message: "must not be empty".into(),
        });
    }

    let threshold = config.matching.threshold;
    if !(0.0..=100.0).contains(&threshold) {
        return Err(ConfigError::ValidationError {
            field: "matching.threshold".into(),
            message: format!("must be between 0 and 100 inclusive, got {threshold}"),
        });
    }

    let limits = [
        ("prompt.max_players", config.prompt.max_players),
        ("prompt.max_matches", config.prompt.max_matches),
    ];
    if let Some((field, _)) = limits.iter().find(|(_, limit)| *limit == 0) {
        return Err(ConfigError::ValidationError {
            field: (*field).to_string(),
            message: "must be at least 1".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
