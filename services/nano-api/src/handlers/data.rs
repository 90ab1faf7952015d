//! Workspace and dataset listing endpoints.

use axum::{http::StatusCode, response::Response};
use nano_common::{
    create_path, find_workspace_or_dataset, Dataset, DatasetKind, NanoResult, PathPattern,
    Request, Workspace,
};
use serde::Serialize;

use super::common::{data_href, json_response};
use super::Handler;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Link {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceList {
    pub workspaces: Vec<Link>,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub path: String,
    pub datasets: Vec<Link>,
}

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub path: String,
    pub workspace: String,
    pub kind: DatasetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f64; 4]>,
}

impl DatasetSummary {
    fn new(path: String, workspace: &dyn Workspace, dataset: &dyn Dataset) -> Self {
        Self {
            name: dataset.name().to_string(),
            title: dataset.title().map(str::to_string),
            path,
            workspace: workspace.name().to_string(),
            kind: dataset.kind(),
            crs: dataset.crs().map(str::to_string),
            bounds: dataset.bounds().map(|b| b.to_array()),
        }
    }
}

/// GET /data[/{workspace}[/{dataset}]][.json]
pub struct DataHandler {
    pattern: PathPattern,
}

impl DataHandler {
    pub fn new() -> NanoResult<Self> {
        Ok(Self {
            pattern: PathPattern::new(r"/data(?:/([^/.]+)(?:/([^/.]+))?)?(?:\.json)?")?,
        })
    }
}

impl Handler for DataHandler {
    fn name(&self) -> &'static str {
        "data"
    }

    fn can_handle(&self, request: &mut Request, _state: &AppState) -> bool {
        request.method == "GET" && self.pattern.match_request(request)
    }

    fn handle(&self, request: &Request, state: &AppState) -> NanoResult<Response> {
        let Some(resolved) = find_workspace_or_dataset(request, state.repository.as_ref())? else {
            let workspaces = state
                .repository
                .workspace_names()?
                .into_iter()
                .map(|name| Link {
                    href: data_href(&[name.as_str()]),
                    name,
                })
                .collect();
            return json_response(StatusCode::OK, &WorkspaceList { workspaces });
        };

        let path = create_path(request)?;
        let workspace = resolved.workspace.as_ref();

        match resolved.dataset {
            Some(dataset) => json_response(
                StatusCode::OK,
                &DatasetSummary::new(path, workspace, dataset.as_ref()),
            ),
            None => {
                let datasets = workspace
                    .dataset_names()?
                    .into_iter()
                    .map(|name| Link {
                        href: data_href(&[workspace.name(), name.as_str()]),
                        name,
                    })
                    .collect();
                json_response(
                    StatusCode::OK,
                    &WorkspaceSummary {
                        name: workspace.name().to_string(),
                        title: workspace.title().map(str::to_string),
                        path,
                        datasets,
                    },
                )
            }
        }
    }
}
