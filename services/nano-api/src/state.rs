//! Application state shared by all requests.

use metrics_exporter_prometheus::PrometheusHandle;
use nano_common::{CrsLookup, DataRepository, EpsgRegistry, TemplateStore};
use std::sync::Arc;

use crate::config::{ServerConfig, ServerSettings};

/// Read-only server state. Safe to share across request tasks.
pub struct AppState {
    /// Workspace/dataset lookup.
    pub repository: Arc<dyn DataRepository>,

    /// CRS lookup used by the `srs` parameter.
    pub crs: Arc<dyn CrsLookup>,

    /// Templates for static pages.
    pub templates: TemplateStore,

    pub settings: ServerSettings,

    /// Set when a Prometheus recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from loaded configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            repository: Arc::new(config.repository),
            crs: Arc::new(EpsgRegistry::new()),
            templates: TemplateStore::new(config.template_dir),
            settings: config.settings,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
