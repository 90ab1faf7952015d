//! End-to-end tests for request dispatch through the router.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request as HttpRequest, StatusCode},
    response::Response,
    Router,
};
use nano_api::config::{ServerConfig, ServerSettings};
use nano_api::{build_router, AppState, Handler, HandlerRegistry};
use nano_common::{
    DatasetKind, MemoryDataset, MemoryRepository, MemoryWorkspace, NanoResult, PathPattern,
    Request,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

// ============================================================================
// Fixtures
// ============================================================================

fn repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_workspace(
            MemoryWorkspace::new("states")
                .with_title("US States")
                .with_dataset(
                    MemoryDataset::new("counties", DatasetKind::Vector)
                        .with_crs("EPSG:4326")
                        .with_bounds([-125.0, 24.0, -66.0, 50.0]),
                )
                .with_dataset(MemoryDataset::new("elevation", DatasetKind::Raster)),
        )
        .with_workspace(MemoryWorkspace::new("parks"))
}

/// Workspace names that need escaping in URLs and HTML.
fn awkward_repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_workspace(
            MemoryWorkspace::new("us states")
                .with_dataset(MemoryDataset::new("big lakes", DatasetKind::Raster)),
        )
        .with_workspace(MemoryWorkspace::new("a<b>&c"))
}

fn state(templates: &TempDir) -> AppState {
    state_with(templates, repository())
}

fn state_with(templates: &TempDir, repository: MemoryRepository) -> AppState {
    AppState::new(ServerConfig {
        settings: ServerSettings {
            title: "Test Nano".to_string(),
            ..ServerSettings::default()
        },
        repository,
        template_dir: templates.path().to_path_buf(),
    })
}

fn templates() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        "<h1>%title%</h1>\n<ul>\n%workspaces%\n</ul>\n",
    )
    .unwrap();
    dir
}

fn app(templates: &TempDir) -> Router {
    app_with(templates, repository())
}

fn app_with(templates: &TempDir, repository: MemoryRepository) -> Router {
    let state = state_with(templates, repository);
    let registry = HandlerRegistry::with_defaults(&state).unwrap();
    build_router(Arc::new(state), Arc::new(registry))
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(HttpRequest::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// ============================================================================
// Index and operational endpoints
// ============================================================================

#[tokio::test]
async fn test_index_renders_template() {
    let dir = templates();
    let response = get(app(&dir), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.starts_with("<h1>Test Nano</h1>\n"));
    assert!(body.contains("<a href=\"/data/states\">states</a>"));
    assert!(body.contains("<a href=\"/data/parks\">parks</a>"));
}

#[tokio::test]
async fn test_index_missing_template_is_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    let response = get(app(&dir), "/index.html").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["detail"], "Internal server error");
}

#[tokio::test]
async fn test_health() {
    let dir = templates();
    let response = get(app(&dir), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_ready_reports_workspaces() {
    let dir = templates();
    let json = body_json(get(app(&dir), "/ready").await).await;
    assert_eq!(json["ready"], true);
    assert_eq!(json["workspaces"], 2);
}

#[tokio::test]
async fn test_unmatched_request_is_404() {
    let dir = templates();
    let response = get(app(&dir), "/nowhere/at/all").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["instance"], "/nowhere/at/all");
}

// ============================================================================
// Data listings
// ============================================================================

#[tokio::test]
async fn test_data_lists_workspaces() {
    let dir = templates();
    let json = body_json(get(app(&dir), "/data").await).await;

    assert_eq!(json["workspaces"][0]["name"], "states");
    assert_eq!(json["workspaces"][1]["href"], "/data/parks");
}

#[tokio::test]
async fn test_data_workspace_summary() {
    let dir = templates();
    let json = body_json(get(app(&dir), "/data/states.json").await).await;

    assert_eq!(json["name"], "states");
    assert_eq!(json["title"], "US States");
    assert_eq!(json["path"], "states");
    assert_eq!(json["datasets"][1]["href"], "/data/states/elevation");
}

#[tokio::test]
async fn test_data_dataset_summary() {
    let dir = templates();
    let json = body_json(get(app(&dir), "/data/states/counties").await).await;

    assert_eq!(json["path"], "states/counties");
    assert_eq!(json["workspace"], "states");
    assert_eq!(json["kind"], "vector");
    assert_eq!(json["crs"], "EPSG:4326");
    assert_eq!(json["bounds"][0], -125.0);
}

#[tokio::test]
async fn test_data_missing_workspace() {
    let dir = templates();
    let response = get(app(&dir), "/data/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "No such workspace: nope");
}

#[tokio::test]
async fn test_data_missing_dataset() {
    let dir = templates();
    let response = get(app(&dir), "/data/states/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["detail"],
        "No such dataset: missing in workspace: states"
    );
}

#[tokio::test]
async fn test_data_resolves_percent_encoded_names() {
    let dir = templates();

    let json = body_json(get(app_with(&dir, awkward_repository()), "/data").await).await;
    assert_eq!(json["workspaces"][0]["name"], "us states");
    assert_eq!(json["workspaces"][0]["href"], "/data/us%20states");

    let response = get(app_with(&dir, awkward_repository()), "/data/us%20states").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "us states");
    assert_eq!(json["datasets"][0]["href"], "/data/us%20states/big%20lakes");

    let response = get(app_with(&dir, awkward_repository()), "/data/us%20states/big%20lakes").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["path"], "us states/big lakes");
}

#[tokio::test]
async fn test_path_with_invalid_utf8_is_400() {
    let dir = templates();
    let response = get(app(&dir), "/data/%FF").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["instance"], "/data/%FF");
}

#[tokio::test]
async fn test_index_escapes_workspace_names() {
    let dir = templates();
    let body = body_text(get(app_with(&dir, awkward_repository()), "/").await).await;

    assert!(body.contains("<li><a href=\"/data/us%20states\">us states</a></li>"));
    assert!(body.contains("<li><a href=\"/data/a%3Cb%3E%26c\">a&lt;b&gt;&amp;c</a></li>"));
    assert!(!body.contains("a<b>"));
}

// ============================================================================
// Map requests
// ============================================================================

#[tokio::test]
async fn test_map_request_default_axis_order() {
    let dir = templates();
    let response = get(
        app(&dir),
        "/map/states?layers=counties,elevation&bbox=-125,24,-66,50&width=256&height=128",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["srs"], "EPSG:4326");
    assert_eq!(json["bbox"], serde_json::json!([-125.0, 24.0, -66.0, 50.0]));
    assert_eq!(json["axis_order"], "xy");
    assert_eq!(json["layers"][1]["kind"], "raster");
    assert_eq!(json["format"], "image/png");
}

#[tokio::test]
async fn test_map_request_wms13_flips_lat_first_crs() {
    let dir = templates();
    let json = body_json(
        get(
            app(&dir),
            "/map/states/counties?version=1.3.0&srs=EPSG:4326&bbox=24,-125,50,-66&width=256&height=256",
        )
        .await,
    )
    .await;

    assert_eq!(json["bbox"], serde_json::json!([-125.0, 24.0, -66.0, 50.0]));
    assert_eq!(json["axis_order"], "latlon");
    assert_eq!(json["layers"][0]["name"], "counties");
}

#[tokio::test]
async fn test_map_request_wms13_projected_crs_not_flipped() {
    let dir = templates();
    let json = body_json(
        get(
            app(&dir),
            "/map/states/elevation?version=1.3.0&srs=EPSG:3857&bbox=0,10,100,110&width=10&height=10",
        )
        .await,
    )
    .await;

    assert_eq!(json["bbox"], serde_json::json!([0.0, 10.0, 100.0, 110.0]));
    assert_eq!(json["axis_order"], "xy");
}

#[tokio::test]
async fn test_map_request_reports_every_error() {
    let dir = templates();
    let response = get(app(&dir), "/map/states?bbox=10,0,0,10&width=abc&height=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(
        json["errors"],
        serde_json::json!([
            "Invalid bbox, minx > maxx",
            "Invalid width value : abc",
            "Invalid height value : 0",
            "Missing required parameter : layers",
        ])
    );
}

#[tokio::test]
async fn test_map_request_non_finite_bbox_is_400() {
    let dir = templates();
    for bbox in ["nan,0,1,1", "0,0,NaN,1", "0,0,inf,1"] {
        let uri = format!("/map/states/counties?bbox={}&width=1&height=1", bbox);
        let response = get(app(&dir), &uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "bbox {}", bbox);
        assert_eq!(
            body_json(response).await["errors"],
            serde_json::json!(["BBOX invalid, bad number"])
        );
    }
}

#[tokio::test]
async fn test_map_request_unknown_srs() {
    let dir = templates();
    let response = get(
        app(&dir),
        "/map/states/counties?srs=EPSG:99999&bbox=0,0,1,1&width=1&height=1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["detail"],
        "Cannot locate provided srs: EPSG:99999"
    );
}

#[tokio::test]
async fn test_map_request_unknown_layer() {
    let dir = templates();
    let response = get(
        app(&dir),
        "/map/states?layers=counties,rivers&bbox=0,0,1,1&width=1&height=1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["detail"],
        "No such dataset: rivers in workspace: states"
    );
}

#[tokio::test]
async fn test_map_request_empty_bbox_is_missing() {
    let dir = templates();
    let response = get(app(&dir), "/map/states/counties?bbox=&width=1&height=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["errors"],
        serde_json::json!(["Missing required parameter : bbox"])
    );
}

// ============================================================================
// Registry ordering
// ============================================================================

struct Fixed {
    name: &'static str,
    pattern: PathPattern,
    inits: usize,
}

impl Fixed {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: PathPattern::new(pattern).unwrap(),
            inits: 0,
        }
    }
}

impl Handler for Fixed {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init(&mut self, _state: &AppState) -> NanoResult<()> {
        self.inits += 1;
        assert_eq!(self.inits, 1);
        Ok(())
    }

    fn can_handle(&self, request: &mut Request, _state: &AppState) -> bool {
        self.pattern.match_request(request)
    }

    fn handle(&self, _request: &Request, _state: &AppState) -> NanoResult<axum::response::Response> {
        Ok(axum::response::IntoResponse::into_response(self.name))
    }
}

#[tokio::test]
async fn test_first_registered_handler_wins() {
    let dir = templates();
    let state = state(&dir);

    let mut registry = HandlerRegistry::new();
    registry
        .register(Fixed::new("specific", r"/x/(a)(?:/([^/]+))?"), &state)
        .unwrap();
    registry
        .register(Fixed::new("general", r"/x/([^/]+)(?:/([^/]+))?"), &state)
        .unwrap();
    assert_eq!(registry.names(), vec!["specific", "general"]);

    let response = registry.dispatch(Request::get("/x/a"), &state).unwrap();
    assert_eq!(body_text(response).await, "specific");

    let response = registry.dispatch(Request::get("/x/b"), &state).unwrap();
    assert_eq!(body_text(response).await, "general");

    assert!(registry.dispatch(Request::get("/y"), &state).is_none());
}

#[tokio::test]
async fn test_find_stores_match_for_handle() {
    let dir = templates();
    let state = state(&dir);
    let registry = HandlerRegistry::with_defaults(&state).unwrap();

    let mut request = Request::get("/data/states/counties");
    let handler = registry.find(&mut request, &state).unwrap();
    assert_eq!(handler.name(), "data");

    let path_match = request.path_match().unwrap();
    assert_eq!(path_match.workspace(), Some("states"));
    assert_eq!(path_match.dataset(), Some("counties"));
}
