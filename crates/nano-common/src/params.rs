//! Query parameter parsing with deferred error reporting.
//!
//! Every getter records a message on failure and returns `None` instead of
//! bailing out, so one pass over the parameters collects every problem with
//! the request. [`RequestParser::finish`] turns the collected messages into a
//! single [`NanoError::Validation`].

use std::collections::HashMap;

use crate::bbox::BoundingBox;
use crate::error::{NanoError, NanoResult};
use crate::request::Request;

/// Name of the bounding box parameter.
pub const BBOX_PARAM: &str = "bbox";

pub struct RequestParser<'a> {
    params: &'a HashMap<String, String>,
    errors: Vec<String>,
}

impl<'a> RequestParser<'a> {
    pub fn new(request: &'a Request) -> Self {
        Self::from_params(&request.params)
    }

    pub fn from_params(params: &'a HashMap<String, String>) -> Self {
        Self {
            params,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Raw value of `key`, or `default` when absent. Never records an error.
    pub fn get_parameter_or(&self, key: &str, default: &str) -> String {
        self.params
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Raw value of `key`; records a missing-parameter error if `required`.
    pub fn get_parameter(&mut self, key: &str, required: bool) -> Option<String> {
        let value = self.params.get(key).cloned();
        if required && value.is_none() {
            self.missing_parameter(key);
        }
        value
    }

    /// Comma separated list. An empty value is treated as no value.
    ///
    /// Trailing empty items are dropped, so `"a,b,"` yields `[a, b]`.
    pub fn get_list(&mut self, key: &str, required: bool) -> Option<Vec<String>> {
        let value = self.get_parameter(key, required)?;
        if value.is_empty() {
            return None;
        }

        let mut items: Vec<String> = value.split(',').map(str::to_string).collect();
        while items.last().is_some_and(|s| s.is_empty()) {
            items.pop();
        }
        Some(items)
    }

    pub fn get_integer(&mut self, key: &str, required: bool) -> Option<i32> {
        let raw = self.get_parameter(key, required)?;
        match raw.parse::<i32>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.add_error(format!("Invalid {} value : {}", key, raw));
                None
            }
        }
    }

    /// Required `bbox` in the default `minx,miny,maxx,maxy` order.
    pub fn get_bbox(&mut self) -> Option<BoundingBox> {
        self.get_bbox_with_axis(false)
    }

    /// Required `bbox`; with `flipped_axis` the components are read as
    /// `miny,minx,maxy,maxx`.
    ///
    /// A box whose minimum exceeds its maximum is still returned; the
    /// ordering problem is only recorded as an error.
    pub fn get_bbox_with_axis(&mut self, flipped_axis: bool) -> Option<BoundingBox> {
        let parts = self.get_list(BBOX_PARAM, true)?;
        if parts.len() != 4 {
            self.add_error("BBOX invalid, must have 4 values");
            return None;
        }

        let mut values = [0.0_f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            // f64 parsing accepts "nan" and "inf", which no extent can hold
            match part.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => *slot = v,
                _ => {
                    self.add_error("BBOX invalid, bad number");
                    return None;
                }
            }
        }

        let bbox = BoundingBox::from_components(values, flipped_axis);
        if bbox.min_x > bbox.max_x {
            self.add_error("Invalid bbox, minx > maxx");
        }
        if bbox.min_y > bbox.max_y {
            self.add_error("Invalid bbox, miny > maxy");
        }
        Some(bbox)
    }

    pub fn missing_parameter(&mut self, key: &str) {
        self.add_error(format!("Missing required parameter : {}", key));
    }

    /// `Ok(value)` if nothing was recorded, otherwise every message at once.
    pub fn finish<T>(self, value: T) -> NanoResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(NanoError::Validation(self.errors))
        }
    }
}
