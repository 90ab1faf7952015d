//! Request model and URI pattern matching.

use regex::Regex;
use std::collections::HashMap;

use crate::error::{NanoError, NanoResult};

/// An inbound request as handed over by the transport.
///
/// `params` holds the already-decoded query string. `path_match` is the only
/// per-request state: it is written by [`PathPattern::match_request`] while a
/// handler decides whether to claim the request, and read back when the same
/// handler serves it.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    pub uri: String,
    pub params: HashMap<String, String>,
    path_match: Option<PathMatch>,
}

impl Request {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            params: HashMap::new(),
            path_match: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new("GET", uri)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn path_match(&self) -> Option<&PathMatch> {
        self.path_match.as_ref()
    }

    pub fn set_path_match(&mut self, path_match: PathMatch) {
        self.path_match = Some(path_match);
    }
}

/// Capture groups of a successful URI match.
///
/// Group 1 is the workspace, group 2 the optional dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    groups: Vec<Option<String>>,
}

impl PathMatch {
    pub fn new(groups: Vec<Option<String>>) -> Self {
        Self { groups }
    }

    /// Capture group `index` (1-based, as in the pattern).
    pub fn group(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get(i))
            .and_then(|g| g.as_deref())
    }

    pub fn workspace(&self) -> Option<&str> {
        self.group(1)
    }

    pub fn dataset(&self) -> Option<&str> {
        self.group(2)
    }
}

/// A compiled, fully anchored URI pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    regex: Regex,
}

impl PathPattern {
    /// Compile `pattern`. Group 1 addresses the workspace and group 2 the
    /// dataset; a pattern that declares fewer groups simply never addresses
    /// one.
    ///
    /// The pattern always has to match the whole URI.
    pub fn new(pattern: &str) -> NanoResult<Self> {
        let anchored = format!("^(?:{})$", pattern);
        let regex = Regex::new(&anchored)
            .map_err(|e| NanoError::Internal(format!("Invalid path pattern {}: {}", pattern, e)))?;
        Ok(Self { regex })
    }

    /// Match a bare URI without touching any request.
    pub fn matches(&self, uri: &str) -> Option<PathMatch> {
        let captures = self.regex.captures(uri)?;
        let groups = (1..captures.len())
            .map(|i| captures.get(i).map(|m| m.as_str().to_string()))
            .collect();
        Some(PathMatch::new(groups))
    }

    /// Match the request URI and store the result on the request.
    ///
    /// Leaves the request untouched on mismatch.
    pub fn match_request(&self, request: &mut Request) -> bool {
        match self.matches(&request.uri) {
            Some(path_match) => {
                request.set_path_match(path_match);
                true
            }
            None => false,
        }
    }
}
