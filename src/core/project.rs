//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::RecordKind;

/// Name of the marker directory at the project root
pub const MARKER_DIR: &str = ".pitlane";

/// Default snapshot directory, relative to the project root
pub const DEFAULT_DATA_DIR: &str = "data";

/// Represents a pitlane project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .pitlane/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(MARKER_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "found project");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(MARKER_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::scaffold(root)
    }

    /// Initialize even if .pitlane/ exists; existing records are left alone
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::scaffold(root)
    }

    fn scaffold(root: PathBuf) -> Result<Self, ProjectError> {
        let marker = root.join(MARKER_DIR);
        std::fs::create_dir_all(&marker).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(marker.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let data = root.join(DEFAULT_DATA_DIR);
        for kind in RecordKind::all() {
            std::fs::create_dir_all(data.join(kind.directory()))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Pitlane project configuration

# Snapshot directory (teams/, cars/, parts/, car_parts/), relative to this project
# data_dir: data

# Results per page for list commands
# page_size: 100

# Default output format (auto, yaml, json, tsv, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .pitlane configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    /// Resolve a snapshot directory setting against the project root
    pub fn data_dir(&self, configured: Option<&str>) -> PathBuf {
        let dir = Path::new(configured.unwrap_or(DEFAULT_DATA_DIR));
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        }
    }

    /// Directory holding records of one kind
    pub fn kind_dir(&self, configured: Option<&str>, kind: RecordKind) -> PathBuf {
        self.data_dir(configured).join(kind.directory())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a pitlane project (searched from {searched_from:?}). Run 'pitlane init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("pitlane project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.config_dir().join("config.yaml").exists());
        for kind in RecordKind::all() {
            assert!(project.kind_dir(None, *kind).is_dir());
        }
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));

        assert!(Project::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_project_discover_finds_marker_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_marker_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_data_dir_resolution() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        assert_eq!(project.data_dir(None), project.root().join("data"));
        assert_eq!(project.data_dir(Some("export")), project.root().join("export"));
        assert_eq!(project.data_dir(Some("/srv/export")), PathBuf::from("/srv/export"));
    }
}
