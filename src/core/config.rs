//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::query::DEFAULT_PAGE_SIZE;
use crate::core::Project;

/// Pitlane configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot directory; relative paths resolve against the project root
    pub data_dir: Option<String>,

    /// Results per page for list commands
    pub page_size: Option<usize>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load for a known project root
    pub fn load_for(project: &Project) -> Self {
        Self::load_layers(
            Self::global_config_path().as_deref(),
            Some(&project.config_dir().join("config.yaml")),
            |key| std::env::var(key).ok(),
        )
    }

    fn load_layers(
        global: Option<&Path>,
        project: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/pitlane/config.yaml)
        // 3. Project config (.pitlane/config.yaml)
        for path in [global, project].into_iter().flatten() {
            if let Some(layer) = Self::read_file(path) {
                tracing::debug!(path = %path.display(), "applying config layer");
                config.merge(layer);
            }
        }

        // 4. Environment variables
        if let Some(dir) = env("PITLANE_DATA_DIR") {
            config.data_dir = Some(dir);
        }
        if let Some(size) = env("PITLANE_PAGE_SIZE") {
            match size.parse() {
                Ok(size) => config.page_size = Some(size),
                Err(_) => tracing::warn!(value = %size, "ignoring invalid PITLANE_PAGE_SIZE"),
            }
        }
        if let Some(format) = env("PITLANE_FORMAT") {
            config.default_format = Some(format);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Option<Config>>(&contents) {
            // A file with only comments parses as null
            Ok(layer) => Some(layer.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pitlane")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Configured page size, falling back to the default; zero is ignored
    pub fn page_size(&self) -> usize {
        self.page_size.filter(|n| *n > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }
}
