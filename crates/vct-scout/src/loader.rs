// Data loading: JSON source files into a `Snapshot`.
//
// The data directory holds one or more files per collection, selected by
// file-name prefix. Files are read in natural name order (digit runs compare
// as numbers), so base files load before `_v2`, `_v2` before `_v10`, and
// win-last merging favours the newer data.
// A file that cannot be read or parsed is skipped with a warning; only an
// unreadable data directory aborts the load.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use vct_core::scrape::parse_scrape_slice;
use vct_core::{EntityKind, MappingIngest, ReferenceStore, ScrapedPlayer, Snapshot};

use crate::config::Config;

// ---------------------------------------------------------------------------
// Error and report types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What a load pass did with each file it looked at.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub loaded: Vec<PathBuf>,
    /// Files that matched a collection but could not be used, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl LoadReport {
    fn skip(&mut self, path: &Path, reason: String) {
        warn!("skipping {}: {}", path.display(), reason);
        self.skipped.push((path.to_path_buf(), reason));
    }
}

/// Which collection a source file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Mappings,
    Table(EntityKind),
}

const MAPPING_PREFIX: &str = "mapping_data";

fn classify(file_name: &str) -> Option<Collection> {
    let stem = file_name.strip_suffix(".json")?;
    if stem.starts_with(MAPPING_PREFIX) {
        return Some(Collection::Mappings);
    }
    EntityKind::ALL
        .into_iter()
        .find(|kind| stem.starts_with(kind.table_name()))
        .map(Collection::Table)
}

/// One run of a file name: digits compare by value, everything else as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NameChunk {
    Number(u64),
    Text(String),
}

fn natural_key(path: &Path) -> Vec<NameChunk> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut chunks = Vec::new();
    let mut run = String::new();
    let mut digits = false;
    for c in name.chars() {
        if !run.is_empty() && c.is_ascii_digit() != digits {
            chunks.push(name_chunk(std::mem::take(&mut run), digits));
        }
        digits = c.is_ascii_digit();
        run.push(c);
    }
    if !run.is_empty() {
        chunks.push(name_chunk(run, digits));
    }
    chunks
}

fn name_chunk(run: String, digits: bool) -> NameChunk {
    match digits.then(|| run.parse::<u64>().ok()).flatten() {
        Some(n) => NameChunk::Number(n),
        None => NameChunk::Text(run),
    }
}

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Anything that can build a fresh snapshot: files on disk in production,
/// fixtures in tests.
pub trait DataSource {
    fn load(&self) -> Result<Snapshot, LoadError>;
}

/// Loads reference tables and mappings from a directory of JSON files, plus
/// an optional pre-fetched stats scrape.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    data_dir: PathBuf,
    scrape_file: Option<PathBuf>,
}

impl DirectorySource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            scrape_file: None,
        }
    }

    pub fn with_scrape_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.scrape_file = Some(path.into());
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let source = Self::new(config.data_dir());
        match config.scrape_path() {
            Some(path) => source.with_scrape_file(path),
            None => source,
        }
    }

    /// Load everything, reporting which files were used or skipped.
    pub fn load_with_report(&self) -> Result<(Snapshot, LoadReport), LoadError> {
        let mut report = LoadReport::default();
        let mut store = ReferenceStore::new();
        let mut ingest = MappingIngest::new();

        for path in self.source_files()? {
            let Some(collection) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(classify)
            else {
                debug!("ignoring {}", path.display());
                continue;
            };

            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    report.skip(&path, e.to_string());
                    continue;
                }
            };

            match collection {
                Collection::Mappings => match ingest.ingest_slice(&bytes) {
                    Ok(added) => debug!(added, "loaded mappings from {}", path.display()),
                    Err(e) => {
                        report.skip(&path, e.to_string());
                        continue;
                    }
                },
                Collection::Table(kind) => match serde_json::from_slice::<Value>(&bytes) {
                    Ok(value) => {
                        let stored = store.extend(kind, value);
                        debug!(%kind, stored, "loaded {}", path.display());
                    }
                    Err(e) => {
                        report.skip(&path, e.to_string());
                        continue;
                    }
                },
            }
            report.loaded.push(path);
        }

        let scraped = self.load_scrape(&mut report);
        let snapshot = Snapshot::new(store, ingest.into_records(), scraped);
        info!(
            files = report.loaded.len(),
            skipped = report.skipped.len(),
            "loaded {}",
            snapshot.summary()
        );
        Ok((snapshot, report))
    }

    /// Regular files in the data directory, in natural name order.
    fn source_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        let entries = std::fs::read_dir(&self.data_dir).map_err(|e| LoadError::DataDir {
            path: self.data_dir.clone(),
            source: e,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort_by_cached_key(|path| (natural_key(path), path.clone()));
        Ok(files)
    }

    fn load_scrape(&self, report: &mut LoadReport) -> Vec<ScrapedPlayer> {
        let Some(path) = &self.scrape_file else {
            return Vec::new();
        };
        let parsed = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| parse_scrape_slice(&bytes).map_err(|e| e.to_string()));
        match parsed {
            Ok(players) => {
                report.loaded.push(path.clone());
                players
            }
            Err(reason) => {
                report.skip(path, reason);
                Vec::new()
            }
        }
    }
}

impl DataSource for DirectorySource {
    fn load(&self) -> Result<Snapshot, LoadError> {
        self.load_with_report().map(|(snapshot, _)| snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
