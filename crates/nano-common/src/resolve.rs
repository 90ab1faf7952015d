//! Resolution of matched path segments against the data repository.

use std::sync::Arc;

use crate::error::{NanoError, NanoResult};
use crate::repository::{DataRepository, Dataset, Workspace};
use crate::request::Request;

/// A workspace and, when one was addressed, a dataset inside it.
#[derive(Clone)]
pub struct Resolved {
    pub workspace: Arc<dyn Workspace>,
    pub dataset: Option<Arc<dyn Dataset>>,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("workspace", &self.workspace.name())
            .field("dataset", &self.dataset.as_ref().map(|d| d.name().to_string()))
            .finish()
    }
}

/// Find a workspace by key. Absence is a not-found error, never `None`.
pub fn find_workspace(key: &str, repo: &dyn DataRepository) -> NanoResult<Arc<dyn Workspace>> {
    repo.workspace(key)?
        .ok_or_else(|| NanoError::WorkspaceNotFound(key.to_string()))
}

/// Resolve the workspace and optional dataset named by the stored path match.
///
/// Returns `Ok(None)` when the match addressed no workspace at all, which
/// lets listing endpoints share a pattern with per-resource ones.
pub fn find_workspace_or_dataset(
    request: &Request,
    repo: &dyn DataRepository,
) -> NanoResult<Option<Resolved>> {
    let path_match = request.path_match().ok_or(NanoError::NoPathMatch)?;

    let Some(first) = path_match.workspace() else {
        return Ok(None);
    };

    let workspace = find_workspace(first, repo)?;
    let dataset = match path_match.dataset() {
        Some(second) => {
            let dataset = workspace
                .dataset(second)?
                .ok_or_else(|| NanoError::DatasetNotFound {
                    dataset: second.to_string(),
                    workspace: first.to_string(),
                })?;
            Some(dataset)
        }
        None => None,
    };

    tracing::debug!(
        workspace = first,
        dataset = path_match.dataset(),
        "Resolved request path"
    );

    Ok(Some(Resolved { workspace, dataset }))
}

/// `workspace` or `workspace/dataset`, from the stored path match.
pub fn create_path(request: &Request) -> NanoResult<String> {
    let path_match = request.path_match().ok_or(NanoError::NoPathMatch)?;
    let first = path_match.workspace().unwrap_or_default();
    Ok(match path_match.dataset() {
        Some(second) => format!("{}/{}", first, second),
        None => first.to_string(),
    })
}
