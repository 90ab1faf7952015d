//! Common types for the nano geospatial service.
//!
//! Everything here is independent of the HTTP transport: request model,
//! path matching, workspace/dataset resolution, query parameter parsing,
//! CRS lookup and template rendering.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod params;
pub mod repository;
pub mod request;
pub mod resolve;
pub mod template;

pub use bbox::{AxisOrder, BoundingBox};
pub use crs::{Crs, CrsLookup, CrsLookupError, CrsResolver, EpsgRegistry};
pub use error::{ExceptionResponse, NanoError, NanoResult};
pub use params::RequestParser;
pub use repository::{
    DataRepository, Dataset, DatasetKind, MemoryDataset, MemoryRepository, MemoryWorkspace,
    Workspace,
};
pub use request::{PathMatch, PathPattern, Request};
pub use resolve::{create_path, find_workspace, find_workspace_or_dataset, Resolved};
pub use template::{render_template, TemplateStore};
