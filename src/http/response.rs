//! HTTP response building module
//!
//! `Response` is what handlers build. It is turned into a hyper response only at the
//! connection boundary, so handlers never deal with hyper builders or body types.

use crate::error::HandlerError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Response produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    content_type: String,
    /// Keys are stored lowercase
    headers: BTreeMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Empty `text/plain` response with the given status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN.to_string(),
            headers: BTreeMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::ok().with_body(body.into())
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::ok().with_content_type(TEXT_HTML).with_body(body.into())
    }

    /// Serialize `value` as the JSON body
    pub fn json<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        let json = serde_json::to_vec(value)?;
        Ok(Self::ok().with_content_type(APPLICATION_JSON).with_body(json))
    }

    /// Build 302 redirect response
    pub fn redirect(target: &str) -> Self {
        Self::new(StatusCode::FOUND).with_header("Location", target)
    }

    /// Build 400 Bad Request response
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST).with_body("400 Bad Request")
    }

    /// Build 404 Not Found response
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND).with_body("404 Not Found")
    }

    /// Build 405 Method Not Allowed response
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
            .with_header("Allow", "GET, POST")
            .with_body("405 Method Not Allowed")
    }

    /// Build 413 Payload Too Large response
    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE).with_body("413 Payload Too Large")
    }

    /// Build 500 Internal Server Error response
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_body("500 Internal Server Error")
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Finalize into a hyper response
    pub fn into_hyper(self, server_name: &str) -> hyper::Response<Full<Bytes>> {
        let status = self.status;
        let mut builder = hyper::Response::builder()
            .status(self.status)
            .header("Content-Type", self.content_type)
            .header("Content-Length", self.body.len())
            .header("Server", server_name);

        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            log_build_error(status, &e);
            let body = Full::new(Bytes::from("500 Internal Server Error"));
            let mut fallback = hyper::Response::new(body);
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
    }
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_sets_location() {
        let resp = Response::redirect("https://www.google.com");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.header("location"), Some("https://www.google.com"));
        assert!(resp.body().is_empty());
    }

    #[test]
    fn test_json_content_type() {
        let resp = Response::json(&vec![1, 2, 3]).unwrap();
        assert_eq!(resp.content_type(), "application/json");
        assert_eq!(resp.body().as_ref(), b"[1,2,3]");
    }

    #[test]
    fn test_into_hyper_copies_headers() {
        let resp = Response::ok()
            .with_content_type("application/pdf")
            .with_header("Content-Disposition", "attachment; filename=\"sample-1.pdf\"")
            .into_hyper("servlet-studies");

        assert_eq!(resp.status(), 200);
        let headers = resp.headers();
        assert_eq!(headers["content-type"], "application/pdf");
        assert_eq!(headers["content-length"], "0");
        assert_eq!(headers["server"], "servlet-studies");
        assert_eq!(
            headers["content-disposition"],
            "attachment; filename=\"sample-1.pdf\""
        );
    }

    #[test]
    fn test_invalid_header_falls_back_to_500() {
        let resp = Response::ok()
            .with_header("X-Broken", "line\nbreak")
            .into_hyper("servlet-studies");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let resp = Response::method_not_allowed();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.header("Allow"), Some("GET, POST"));
    }
}
