//! Request routing entry module
//!
//! Entry point for HTTP request processing: method validation, body limits,
//! building the dispatcher's `Request`, dispatch and access logging.

use crate::config::AppState;
use crate::http::{Method, Request, Response};
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::http::request::Parts;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn StdError + Send + Sync>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: hyper::Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<hyper::Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let mut entry = AccessLogEntry::from_parts(peer_addr, &parts);

    let response = match build_request(&parts, body, state.config.http.max_body_size).await {
        Ok(request) => state.dispatcher.dispatch(&request),
        Err(rejection) => rejection,
    };

    let response = response.into_hyper(&state.config.http.server_name);
    if state.config.logging.access_log {
        record_outcome(&mut entry, &response, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Fill the access log entry from the response actually sent
fn record_outcome(
    entry: &mut AccessLogEntry,
    response: &hyper::Response<Full<Bytes>>,
    elapsed: std::time::Duration,
) {
    let body_bytes = response
        .body()
        .size_hint()
        .exact()
        .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
    entry.finish(response.status().as_u16(), body_bytes, elapsed);
}

/// Turn the hyper request into the dispatcher's `Request`
///
/// `Err` carries the response for requests that never reach a handler.
async fn build_request<B>(parts: &Parts, body: B, max_body_size: u64) -> Result<Request, Response>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let Some(method) = Method::from_hyper(&parts.method) else {
        logger::log_warning(&format!("Method not allowed: {}", parts.method));
        return Err(Response::method_not_allowed());
    };

    if let Some(resp) = check_body_size(&parts.headers, max_body_size) {
        return Err(resp);
    }

    let mut request = Request::new(method, parts.uri.path());
    if let Some(query) = parts.uri.query() {
        request = request.with_query(query);
    }
    for (name, value) in &parts.headers {
        match value.to_str() {
            Ok(value) => request = request.with_header(name.as_str(), value),
            Err(_) => logger::log_debug(&format!("Skipping non-ASCII header: {name}")),
        }
    }

    if method == Method::Post && is_form(&parts.headers) {
        let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
        let form = read_body(body, limit).await?;
        request = request.with_form(&form);
    }

    Ok(request)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(Response::payload_too_large())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Collect the body, bounded by `limit` bytes
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, Response>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {limit} bytes"));
            Err(Response::payload_too_large())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(Response::bad_request())
        }
    }
}
