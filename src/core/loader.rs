//! Snapshot loading
//!
//! A snapshot directory holds one sub-directory per record kind
//! (`teams/`, `cars/`, `parts/`, `car_parts/`). Each `.yaml`, `.yml` or
//! `.json` file in it contains either a single record or a list of records.
//!
//! Files that cannot be read or parsed are skipped with a warning and
//! reported back to the caller, so one bad export does not hide the rest.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::entity::Entity;
use crate::core::identity::RecordKind;
use crate::core::store::Snapshot;
use crate::entities::{Car, CarPart, Part, Team};

/// Errors raised while loading records from disk
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("data directory not found: {}", path.display())]
    #[diagnostic(
        code(pitlane::load::missing_dir),
        help("run `pitlane init` or point `data_dir` in .pitlane/config.yaml at an export")
    )]
    MissingDataDir { path: PathBuf },

    #[error("failed to read {}", path.display())]
    #[diagnostic(code(pitlane::load::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(pitlane::load::parse))]
    Parse {
        #[source_code]
        src: NamedSource<String>,

        #[label("here")]
        span: SourceSpan,

        #[help]
        help: Option<String>,

        message: String,
    },

    #[error("duplicate {kind} key {key} in {}", path.display())]
    #[diagnostic(
        code(pitlane::load::duplicate_key),
        help("store keys are unique; the first occurrence is kept")
    )]
    DuplicateKey {
        kind: RecordKind,
        key: i64,
        path: PathBuf,
    },
}

/// A file (or record) left out of the snapshot
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: LoadError,
}

/// Records of one kind plus whatever was skipped
#[derive(Debug)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedFile>,
}

/// A full snapshot plus every skipped file across all kinds
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }
}

/// Parse one file into records (a single record or a list)
pub fn load_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<Vec<T>, LoadError> {
    let format = FileFormat::from_path(path).unwrap_or(FileFormat::Yaml);
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&content, format, &path.display().to_string())
}

fn parse_records<T: DeserializeOwned + 'static>(
    content: &str,
    format: FileFormat,
    filename: &str,
) -> Result<Vec<T>, LoadError> {
    match format {
        FileFormat::Yaml => {
            let value: serde_yml::Value = serde_yml::from_str(content).map_err(|e| {
                let (line, column) = e
                    .location()
                    .map(|loc| (loc.line(), loc.column()))
                    .unwrap_or((1, 1));
                parse_error(content, filename, line, column, e.to_string())
            })?;
            let records = match value {
                serde_yml::Value::Null => Ok(Vec::new()),
                serde_yml::Value::Sequence(_) => serde_yml::from_value::<Vec<T>>(value),
                other => serde_yml::from_value::<T>(other).map(|r| vec![r]),
            };
            records.map_err(|e| parse_error(content, filename, 1, 1, e.to_string()))
        }
        FileFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(content)
                .map_err(|e| parse_error(content, filename, e.line(), e.column(), e.to_string()))?;
            let records = if value.is_array() {
                serde_json::from_value::<Vec<T>>(value)
            } else {
                serde_json::from_value::<T>(value).map(|r| vec![r])
            };
            records.map_err(|e| parse_error(content, filename, 1, 1, e.to_string()))
        }
    }
}

fn parse_error(content: &str, filename: &str, line: usize, column: usize, message: String) -> LoadError {
    let offset = line_col_to_offset(content, line, column);
    let help = parse_help(&message);
    LoadError::Parse {
        src: NamedSource::new(filename, content.to_string()),
        span: SourceSpan::from(offset..offset.saturating_add(1).min(content.len().max(1))),
        help,
        message,
    }
}

/// 1-based line/column to a byte offset, clamped to the content
fn line_col_to_offset(content: &str, line: usize, column: usize) -> usize {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let rest = content.get(line_start..).unwrap_or("");
    let in_line = rest
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    (line_start + in_line).min(content.len())
}

fn parse_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();
    if msg.contains("missing field") {
        return Some("every record needs its store key and required fields".to_string());
    }
    if msg.contains("installed_at") || msg.contains("removed_at") || msg.contains("premature end") {
        return Some("timestamps are RFC 3339, e.g. 2024-03-01T09:30:00Z".to_string());
    }
    if msg.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs".to_string());
    }
    None
}

/// Load every record of one kind from `dir`, in file-name order.
///
/// A missing directory yields no records. Records whose key was already
/// seen are skipped.
pub fn load_kind<T: Entity + 'static>(dir: &Path) -> Loaded<T> {
    let mut loaded = Loaded {
        records: Vec::new(),
        skipped: Vec::new(),
    };
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no records directory");
        return loaded;
    }

    let mut keys = HashSet::new();
    let files = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| FileFormat::from_path(e.path()).is_some());

    for entry in files {
        let path = entry.path();
        match load_file::<T>(path) {
            Ok(records) => {
                for record in records {
                    if keys.insert(record.key()) {
                        loaded.records.push(record);
                    } else {
                        tracing::warn!(kind = %T::KIND, key = record.key(), path = %path.display(), "duplicate key skipped");
                        loaded.skipped.push(SkippedFile {
                            path: path.to_path_buf(),
                            error: LoadError::DuplicateKey {
                                kind: T::KIND,
                                key: record.key(),
                                path: path.to_path_buf(),
                            },
                        });
                    }
                }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "skipping unreadable record file");
                loaded.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }

    tracing::debug!(
        kind = %T::KIND,
        records = loaded.records.len(),
        skipped = loaded.skipped.len(),
        "loaded records"
    );
    loaded
}

/// Load all four record kinds from a snapshot directory
pub fn load_snapshot(data_dir: &Path) -> Result<LoadedSnapshot, LoadError> {
    if !data_dir.is_dir() {
        return Err(LoadError::MissingDataDir {
            path: data_dir.to_path_buf(),
        });
    }

    let teams = load_kind::<Team>(&data_dir.join(RecordKind::Team.directory()));
    let cars = load_kind::<Car>(&data_dir.join(RecordKind::Car.directory()));
    let parts = load_kind::<Part>(&data_dir.join(RecordKind::Part.directory()));
    let car_parts = load_kind::<CarPart>(&data_dir.join(RecordKind::Inst.directory()));

    let mut skipped = teams.skipped;
    skipped.extend(cars.skipped);
    skipped.extend(parts.skipped);
    skipped.extend(car_parts.skipped);

    Ok(LoadedSnapshot {
        snapshot: Snapshot::new(teams.records, cars.records, parts.records, car_parts.records),
        skipped,
    })
}
