//! Error types for route registration and request dispatch

use crate::http::{Method, Response};
use hyper::StatusCode;
use thiserror::Error;

/// Returned by `Dispatcher::register` when the (method, path) key is taken
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("route already registered: {method} {path}")]
pub struct DuplicateRouteError {
    pub method: Method,
    pub path: String,
}

/// Failure raised by a handler while building its response
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Failed(String),
}

/// Why a request could not be answered by a handler
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no route for {method} {path}")]
    RouteNotFound { method: Method, path: String },
    #[error("handler for {method} {path} failed: {reason}")]
    HandlerFailure {
        method: Method,
        path: String,
        reason: String,
    },
}

impl DispatchError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::HandlerFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response sent to the client. Failure details stay in the error log.
    pub fn into_response(self) -> Response {
        match self {
            Self::RouteNotFound { .. } => Response::not_found(),
            Self::HandlerFailure { .. } => Response::internal_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let missing = DispatchError::RouteNotFound {
            method: Method::Get,
            path: "/nope".to_string(),
        };
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let failed = DispatchError::HandlerFailure {
            method: Method::Post,
            path: "/ex3".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.to_string(), "handler for POST /ex3 failed: boom");
    }

    #[test]
    fn test_handler_failure_hides_reason() {
        let failed = DispatchError::HandlerFailure {
            method: Method::Get,
            path: "/ex1".to_string(),
            reason: "secret detail".to_string(),
        };
        let response = failed.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!String::from_utf8_lossy(response.body()).contains("secret"));
    }

    #[test]
    fn test_duplicate_route_message() {
        let err = DuplicateRouteError {
            method: Method::Get,
            path: "/ex4".to_string(),
        };
        assert_eq!(err.to_string(), "route already registered: GET /ex4");
    }
}
