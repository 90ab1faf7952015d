//! WMS-style map request validation.
//!
//! Rendering happens elsewhere; this endpoint checks a GetMap-like request
//! against the repository and answers with the normalized request, which
//! is what a renderer consumes.

use std::sync::Arc;

use axum::{http::StatusCode, response::Response};
use nano_common::{
    find_workspace_or_dataset, AxisOrder, CrsResolver, Dataset, DatasetKind, NanoError,
    NanoResult, PathPattern, Request, RequestParser,
};
use serde::Serialize;

use super::common::json_response;
use super::Handler;
use crate::state::AppState;

/// WMS version whose BBOX follows the CRS axis order.
const AXIS_ORDER_VERSION: &str = "1.3.0";
const DEFAULT_VERSION: &str = "1.1.1";
const DEFAULT_FORMAT: &str = "image/png";

#[derive(Debug, Serialize)]
pub struct MapLayer {
    pub name: String,
    pub kind: DatasetKind,
}

/// A validated map request.
#[derive(Debug, Serialize)]
pub struct MapRequest {
    pub workspace: String,
    pub layers: Vec<MapLayer>,
    pub srs: String,
    pub version: String,
    /// Always `[minx, miny, maxx, maxy]`, whatever order the client used.
    pub bbox: [f64; 4],
    pub axis_order: AxisOrder,
    pub width: i32,
    pub height: i32,
    pub format: String,
}

/// GET /map/{workspace}[/{dataset}]
pub struct MapHandler {
    pattern: PathPattern,
}

impl MapHandler {
    pub fn new() -> NanoResult<Self> {
        Ok(Self {
            pattern: PathPattern::new(r"/map/([^/.]+)(?:/([^/.]+))?")?,
        })
    }
}

/// Required integer in `1..=max`.
fn get_size(parser: &mut RequestParser<'_>, key: &str, max: i32) -> Option<i32> {
    let value = parser.get_integer(key, true)?;
    if !(1..=max).contains(&value) {
        parser.add_error(format!("Invalid {} value : {}", key, value));
        return None;
    }
    Some(value)
}

impl Handler for MapHandler {
    fn name(&self) -> &'static str {
        "map"
    }

    fn can_handle(&self, request: &mut Request, _state: &AppState) -> bool {
        request.method == "GET" && self.pattern.match_request(request)
    }

    fn handle(&self, request: &Request, state: &AppState) -> NanoResult<Response> {
        let resolved = find_workspace_or_dataset(request, state.repository.as_ref())?
            .ok_or_else(|| NanoError::Internal("Map pattern matched without workspace".into()))?;

        let mut parser = RequestParser::new(request);

        let srs = parser.get_parameter_or("srs", &state.settings.default_srs);
        let crs = CrsResolver::new(state.crs.as_ref())
            .resolve(Some(&srs))?
            .ok_or_else(|| NanoError::UnresolvableCrs(srs.clone()))?;

        let version = parser.get_parameter_or("version", DEFAULT_VERSION);
        let flipped = version == AXIS_ORDER_VERSION && crs.is_lat_first();

        let bbox = parser.get_bbox_with_axis(flipped);
        if bbox.is_none() && request.param("bbox") == Some("") {
            parser.missing_parameter("bbox");
        }
        let width = get_size(&mut parser, "width", state.settings.max_width);
        let height = get_size(&mut parser, "height", state.settings.max_height);
        let format = parser.get_parameter_or("format", DEFAULT_FORMAT);

        // a dataset in the path names the only layer
        let layer_names = match &resolved.dataset {
            Some(dataset) => vec![dataset.name().to_string()],
            None => {
                let names = parser.get_list("layers", true).unwrap_or_default();
                if names.is_empty() && request.param("layers").is_some() {
                    parser.missing_parameter("layers");
                }
                names
            }
        };

        let (Some(bbox), Some(width), Some(height)) = parser.finish((bbox, width, height))? else {
            return Err(NanoError::Internal("Validated map request is incomplete".into()));
        };

        let workspace = resolved.workspace.as_ref();
        let mut layers = Vec::with_capacity(layer_names.len());
        for name in layer_names {
            let dataset: Arc<dyn Dataset> =
                workspace
                    .dataset(&name)?
                    .ok_or_else(|| NanoError::DatasetNotFound {
                        dataset: name.clone(),
                        workspace: workspace.name().to_string(),
                    })?;
            layers.push(MapLayer {
                name,
                kind: dataset.kind(),
            });
        }

        tracing::debug!(
            workspace = workspace.name(),
            layers = layers.len(),
            srs = %crs,
            "Validated map request"
        );

        json_response(
            StatusCode::OK,
            &MapRequest {
                workspace: workspace.name().to_string(),
                layers,
                srs: crs.code,
                version,
                bbox: bbox.to_array(),
                axis_order: bbox.axis_order,
                width,
                height,
                format,
            },
        )
    }
}
