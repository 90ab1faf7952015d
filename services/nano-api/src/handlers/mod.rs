//! Request handlers and the ordered registry that dispatches to them.
//!
//! Each handler claims requests by matching the URI against its own path
//! pattern. Handlers are tried in registration order and the first claim
//! wins; a request nobody claims gets a 404 from the fallback.

pub mod common;
pub mod data;
pub mod health;
pub mod index;
pub mod map;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Extension, Query},
    http::{Method, StatusCode, Uri},
    response::Response,
};
use nano_common::{ExceptionResponse, NanoResult, Request};
use percent_encoding::percent_decode_str;
use tracing::{debug, error};

use crate::metrics;
use crate::state::AppState;

pub use data::DataHandler;
pub use index::IndexHandler;
pub use map::MapHandler;

/// One endpoint.
///
/// `can_handle` is expected to run the handler's path pattern against the
/// request, which stores the match on the request for `handle` to read.
pub trait Handler: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// One-time setup, run when the handler is registered.
    fn init(&mut self, _state: &AppState) -> NanoResult<()> {
        Ok(())
    }

    fn can_handle(&self, request: &mut Request, state: &AppState) -> bool;

    fn handle(&self, request: &Request, state: &AppState) -> NanoResult<Response>;
}

/// Handlers in registration order.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard endpoints.
    pub fn with_defaults(state: &AppState) -> NanoResult<Self> {
        let mut registry = Self::new();
        registry.register(IndexHandler::new()?, state)?;
        registry.register(DataHandler::new()?, state)?;
        registry.register(MapHandler::new()?, state)?;
        Ok(registry)
    }

    /// Initialise `handler` and append it.
    pub fn register<H>(&mut self, mut handler: H, state: &AppState) -> NanoResult<()>
    where
        H: Handler + 'static,
    {
        handler.init(state)?;
        debug!(handler = handler.name(), "Registered handler");
        self.handlers.push(Box::new(handler));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// First handler that claims `request`.
    pub fn find(&self, request: &mut Request, state: &AppState) -> Option<&dyn Handler> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(request, state))
            .map(|h| h.as_ref())
    }

    /// Serve `request`, or `None` if no handler claims it.
    pub fn dispatch(&self, mut request: Request, state: &AppState) -> Option<Response> {
        let start = Instant::now();
        let handler = self.find(&mut request, state)?;
        debug!(handler = handler.name(), uri = %request.uri, "Dispatching request");

        let response = match handler.handle(&request, state) {
            Ok(response) => response,
            Err(err) => {
                let status = err.status_code();
                let name = handler.name();
                if err.is_client_error() {
                    debug!(handler = name, uri = %request.uri, status, error = %err, "Request rejected");
                } else {
                    error!(handler = name, uri = %request.uri, status, error = %err, "Request failed");
                }
                metrics::record_error(handler.name(), status);
                common::error_response(&err, &request.uri)
            }
        };

        metrics::record_request(handler.name(), start.elapsed());
        Some(response)
    }
}

/// Router fallback: hand everything not routed explicitly to the registry.
///
/// Handlers match against the percent-decoded path.
pub async fn dispatch_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(registry): Extension<Arc<HandlerRegistry>>,
    method: Method,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let path = match percent_decode_str(uri.path()).decode_utf8() {
        Ok(path) => path,
        Err(_) => {
            debug!(uri = %uri.path(), "Request path is not valid UTF-8");
            metrics::record_unmatched();
            return common::exception_response(
                StatusCode::BAD_REQUEST,
                &ExceptionResponse::bad_request("Request path is not valid UTF-8")
                    .with_instance(uri.path()),
            );
        }
    };
    let request = Request::new(method.as_str(), path.into_owned()).with_params(params);

    match registry.dispatch(request, &state) {
        Some(response) => response,
        None => {
            debug!(uri = %uri.path(), "No handler for request");
            metrics::record_unmatched();
            common::exception_response(
                StatusCode::NOT_FOUND,
                &ExceptionResponse::not_found(format!("No handler for {}", uri.path()))
                    .with_instance(uri.path()),
            )
        }
    }
}
