//! File-backed configuration store with atomic writes.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, instrument};

use crate::document::{ConfigDocument, ProjectConfig, ProjectSummary};
use crate::error::{ConfigError, ConfigResult};

/// Stateless store over a single YAML configuration file.
///
/// Every operation re-reads the document from disk, transforms it, and
/// rewrites the whole file through a temp-file rename so readers never
/// observe a partial document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store backed by the given file path. The file need not
    /// exist yet; it is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document. A missing or empty file yields an empty
    /// document; a present-but-malformed file is an error.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> ConfigResult<ConfigDocument> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("config file absent, starting empty");
                return Ok(ConfigDocument::default());
            }
            Err(err) => {
                return Err(ConfigError::Read {
                    path: self.path.display().to_string(),
                    source: err,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(ConfigDocument::default());
        }
        serde_yaml::from_str(&contents).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Atomically replaces the document on disk.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, document: &ConfigDocument) -> ConfigResult<()> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir).map_err(|err| ConfigError::Write {
                path: self.path.display().to_string(),
                source: err,
            })?;
        }
        let tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
            .map_err(|err| ConfigError::Write {
                path: self.path.display().to_string(),
                source: err,
            })?;
        serde_yaml::to_writer(&tmp, document)?;
        // The temp file cleans itself up if persist fails.
        tmp.persist(&self.path).map_err(|err| ConfigError::Write {
            path: self.path.display().to_string(),
            source: err.error,
        })?;
        debug!("config saved");
        Ok(())
    }

    /// Returns the configuration for a project, or `None` when the
    /// project has no entry.
    pub fn get(&self, project_id: i64) -> ConfigResult<Option<ProjectConfig>> {
        let document = self.load()?;
        Ok(document.projects.get(&project_id.to_string()).cloned())
    }

    /// Replaces a project's configuration wholesale. Returns `true` when
    /// the entry was created rather than overwritten.
    pub fn set(&self, project_id: i64, config: ProjectConfig) -> ConfigResult<bool> {
        let mut document = self.load()?;
        let created = document
            .projects
            .insert(project_id.to_string(), config)
            .is_none();
        self.save(&document)?;
        Ok(created)
    }

    /// Deep-merges `updates` into the project's existing configuration
    /// (an absent entry merges into the defaults) and returns the result.
    pub fn update(&self, project_id: i64, updates: &Value) -> ConfigResult<ProjectConfig> {
        let mut document = self.load()?;
        let key = project_id.to_string();
        let existing = document.projects.get(&key).cloned().unwrap_or_default();
        let base = serde_yaml::to_value(&existing)?;
        let merged = deep_merge(&base, updates);
        let config: ProjectConfig =
            serde_yaml::from_value(merged).map_err(|err| ConfigError::Parse(err.to_string()))?;
        document.projects.insert(key, config.clone());
        self.save(&document)?;
        Ok(config)
    }

    /// Removes a project's configuration. Returns `true` when an entry
    /// was actually removed; the file is only rewritten in that case.
    pub fn delete(&self, project_id: i64) -> ConfigResult<bool> {
        let mut document = self.load()?;
        let removed = document.projects.remove(&project_id.to_string()).is_some();
        if removed {
            self.save(&document)?;
        }
        Ok(removed)
    }

    /// Lists configured projects. Entries whose key is not a decimal
    /// integer are skipped; a missing name gets a placeholder.
    pub fn list(&self) -> ConfigResult<Vec<ProjectSummary>> {
        let document = self.load()?;
        Ok(document
            .projects
            .iter()
            .filter_map(|(key, config)| {
                let project_id: i64 = key.parse().ok()?;
                let name = config
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Project {project_id}"));
                Some(ProjectSummary { project_id, name })
            })
            .collect())
    }
}

/// Recursively merges `updates` into `base`.
///
/// When both sides are mappings, keys are merged and nested mappings
/// recurse; any other pairing takes the update side wholesale, so a
/// scalar or sequence in `updates` replaces whatever `base` had.
#[must_use]
pub fn deep_merge(base: &Value, updates: &Value) -> Value {
    match (base, updates) {
        (Value::Mapping(base_map), Value::Mapping(update_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in update_map {
                let entry = match merged.get(key) {
                    Some(existing) if existing.is_mapping() && value.is_mapping() => {
                        deep_merge(existing, value)
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Mapping(merged)
        }
        _ => updates.clone(),
    }
}
