//! Response helpers shared across handlers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use nano_common::{ExceptionResponse, NanoError, NanoResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

/// Bytes escaped in a single path segment (everything but RFC 3986 unreserved).
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Link to `/data/{segments..}` with every segment percent-encoded.
pub fn data_href(segments: &[&str]) -> String {
    let mut href = String::from("/data");
    for segment in segments {
        href.push('/');
        href.extend(utf8_percent_encode(segment, SEGMENT_ENCODE_SET));
    }
    href
}

/// Escape text for use in HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize `body` as a JSON response.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> NanoResult<Response> {
    let json = serde_json::to_string(body)?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], json).into_response())
}

pub fn html_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Render an exception body with the given status.
pub fn exception_response(status: StatusCode, exception: &ExceptionResponse) -> Response {
    let json = serde_json::to_string(exception).unwrap_or_default();
    (status, [(header::CONTENT_TYPE, "application/json")], json).into_response()
}

/// Convert an error into its HTTP response.
pub fn error_response(err: &NanoError, instance: &str) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    exception_response(status, &err.to_exception().with_instance(instance))
}
