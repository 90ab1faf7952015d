//! Service configuration loading and types.
//!
//! The config directory holds one YAML file per workspace, plus an optional
//! `server.yaml` with service-wide settings.

use anyhow::{bail, Context, Result};
use nano_common::{MemoryDataset, MemoryRepository, MemoryWorkspace};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service-wide settings from `server.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Title shown on the index page.
    #[serde(default = "default_title")]
    pub title: String,

    /// CRS used when a map request has no `srs`.
    #[serde(default = "default_srs")]
    pub default_srs: String,

    /// Upper bound for map `width`.
    #[serde(default = "default_max_size")]
    pub max_width: i32,

    /// Upper bound for map `height`.
    #[serde(default = "default_max_size")]
    pub max_height: i32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_srs: default_srs(),
            max_width: default_max_size(),
            max_height: default_max_size(),
        }
    }
}

fn default_title() -> String {
    "nano".to_string()
}

fn default_srs() -> String {
    "EPSG:4326".to_string()
}

fn default_max_size() -> i32 {
    4096
}

/// One workspace file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub datasets: Vec<MemoryDataset>,
}

impl WorkspaceConfig {
    fn into_workspace(self) -> MemoryWorkspace {
        let mut workspace = MemoryWorkspace::new(self.name);
        if let Some(title) = self.title {
            workspace = workspace.with_title(title);
        }
        self.datasets
            .into_iter()
            .fold(workspace, |ws, ds| ws.with_dataset(ds))
    }
}

/// Everything loaded from the config and template directories.
#[derive(Clone, Default)]
pub struct ServerConfig {
    pub settings: ServerSettings,
    pub repository: MemoryRepository,
    pub template_dir: PathBuf,
}

impl ServerConfig {
    /// Load settings and workspaces from `config_dir`.
    pub fn load(config_dir: &Path, template_dir: &Path) -> Result<Self> {
        let mut config = Self {
            template_dir: template_dir.to_path_buf(),
            ..Self::default()
        };

        // If directory doesn't exist, serve an empty catalog
        if !config_dir.exists() {
            tracing::warn!(
                dir = %config_dir.display(),
                "Config directory does not exist, using defaults"
            );
            return Ok(config);
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(config_dir)
            .with_context(|| format!("Failed to read directory: {}", config_dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        // deterministic registration order
        files.sort();

        for file_path in files {
            let content = std::fs::read_to_string(&file_path)
                .with_context(|| format!("Failed to read: {:?}", file_path))?;
            let file_name = file_path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

            if file_name == "server" {
                config.settings = serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse server settings: {:?}", file_path))?;
                continue;
            }

            let workspace: WorkspaceConfig = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse workspace: {:?}", file_path))?;
            let name = workspace.name.clone();
            let dataset_count = workspace.datasets.len();

            if !config.repository.insert(workspace.into_workspace()) {
                bail!("Duplicate workspace {} in {:?}", name, file_path);
            }

            tracing::info!(
                workspace = %name,
                datasets = dataset_count,
                "Loaded workspace from {:?}",
                file_path
            );
        }

        Ok(config)
    }
}
