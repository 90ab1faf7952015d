//! Capability traits for the external data repository.
//!
//! Format drivers implement these; the dispatch core only ever looks things
//! up by name through them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bbox::BoundingBox;
use crate::error::NanoResult;

/// Kind of data a dataset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    #[default]
    Vector,
    Raster,
}

/// A single named layer inside a workspace.
pub trait Dataset: Send + Sync {
    fn name(&self) -> &str;

    fn title(&self) -> Option<&str> {
        None
    }

    fn kind(&self) -> DatasetKind;

    /// Native CRS identifier, when known.
    fn crs(&self) -> Option<&str> {
        None
    }

    /// Native extent, when known.
    fn bounds(&self) -> Option<BoundingBox> {
        None
    }
}

/// A named collection of datasets.
pub trait Workspace: Send + Sync {
    fn name(&self) -> &str;

    fn title(&self) -> Option<&str> {
        None
    }

    /// `Ok(None)` when the workspace has no dataset of that name.
    fn dataset(&self, name: &str) -> NanoResult<Option<Arc<dyn Dataset>>>;

    fn dataset_names(&self) -> NanoResult<Vec<String>>;
}

/// Lookup of workspaces by identifier. Must be safe for concurrent reads.
pub trait DataRepository: Send + Sync {
    /// `Ok(None)` when nothing is registered under `key`.
    fn workspace(&self, key: &str) -> NanoResult<Option<Arc<dyn Workspace>>>;

    fn workspace_names(&self) -> NanoResult<Vec<String>>;
}

// ============================================================================
// In-memory repository
// ============================================================================

/// Dataset described entirely by its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDataset {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub kind: DatasetKind,
    #[serde(default)]
    pub crs: Option<String>,
    #[serde(default)]
    pub bounds: Option<[f64; 4]>,
}

impl MemoryDataset {
    pub fn new(name: impl Into<String>, kind: DatasetKind) -> Self {
        Self {
            name: name.into(),
            title: None,
            kind,
            crs: None,
            bounds: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn with_bounds(mut self, bounds: [f64; 4]) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

impl Dataset for MemoryDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn kind(&self) -> DatasetKind {
        self.kind
    }

    fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    fn bounds(&self) -> Option<BoundingBox> {
        self.bounds.map(BoundingBox::from)
    }
}

/// Workspace holding its datasets in registration order.
#[derive(Clone, Default)]
pub struct MemoryWorkspace {
    name: String,
    title: Option<String>,
    datasets: Vec<Arc<MemoryDataset>>,
}

impl MemoryWorkspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            datasets: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_dataset(mut self, dataset: MemoryDataset) -> Self {
        self.datasets.push(Arc::new(dataset));
        self
    }
}

impl Workspace for MemoryWorkspace {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn dataset(&self, name: &str) -> NanoResult<Option<Arc<dyn Dataset>>> {
        Ok(self
            .datasets
            .iter()
            .find(|d| d.name == name)
            .map(|d| Arc::clone(d) as Arc<dyn Dataset>))
    }

    fn dataset_names(&self) -> NanoResult<Vec<String>> {
        Ok(self.datasets.iter().map(|d| d.name.clone()).collect())
    }
}

/// Repository backed by a fixed list of workspaces. Read-only once built.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    workspaces: Vec<Arc<MemoryWorkspace>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workspace(mut self, workspace: MemoryWorkspace) -> Self {
        self.insert(workspace);
        self
    }

    /// Add a workspace; returns false if the name is already taken.
    pub fn insert(&mut self, workspace: MemoryWorkspace) -> bool {
        if self.workspaces.iter().any(|w| w.name == workspace.name) {
            return false;
        }
        self.workspaces.push(Arc::new(workspace));
        true
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

impl DataRepository for MemoryRepository {
    fn workspace(&self, key: &str) -> NanoResult<Option<Arc<dyn Workspace>>> {
        Ok(self
            .workspaces
            .iter()
            .find(|w| w.name == key)
            .map(|w| Arc::clone(w) as Arc<dyn Workspace>))
    }

    fn workspace_names(&self) -> NanoResult<Vec<String>> {
        Ok(self.workspaces.iter().map(|w| w.name.clone()).collect())
    }
}
