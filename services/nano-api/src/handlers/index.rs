//! Index page.

use std::collections::HashMap;

use axum::response::Response;
use nano_common::{NanoResult, PathPattern, Request};

use super::common::{data_href, escape_html, html_response};
use super::Handler;
use crate::state::AppState;

const TEMPLATE: &str = "index.html";

/// GET / - HTML overview of the served workspaces.
pub struct IndexHandler {
    pattern: PathPattern,
    /// `<li>` list of workspaces, built once at registration.
    workspace_list: String,
}

impl IndexHandler {
    pub fn new() -> NanoResult<Self> {
        Ok(Self {
            pattern: PathPattern::new(r"/|/index\.html")?,
            workspace_list: String::new(),
        })
    }
}

impl Handler for IndexHandler {
    fn name(&self) -> &'static str {
        "index"
    }

    fn init(&mut self, state: &AppState) -> NanoResult<()> {
        let mut items = Vec::new();
        for name in state.repository.workspace_names()? {
            items.push(format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&data_href(&[name.as_str()])),
                escape_html(&name)
            ));
        }
        self.workspace_list = items.join("\n");
        Ok(())
    }

    fn can_handle(&self, request: &mut Request, _state: &AppState) -> bool {
        request.method == "GET" && self.pattern.match_request(request)
    }

    fn handle(&self, _request: &Request, state: &AppState) -> NanoResult<Response> {
        let vars = HashMap::from([
            ("title".to_string(), state.settings.title.clone()),
            ("workspaces".to_string(), self.workspace_list.clone()),
        ]);
        let body = state.templates.render(TEMPLATE, &vars)?;
        Ok(html_response(body))
    }
}
