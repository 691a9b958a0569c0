//! Request dispatch module
//!
//! Holds the route table built at startup and maps each request to its handler.
//! The table is read-only once the server starts accepting connections, so it is
//! shared between connection tasks without locking.

use crate::error::{DispatchError, DuplicateRouteError, HandlerError};
use crate::http::{Method, Request, Response};
use crate::logger;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Handler function shared across connection tasks
pub type Handler = Arc<dyn Fn(&Request) -> Result<Response, HandlerError> + Send + Sync>;

/// Unique key of a route
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub method: Method,
    pub path: String,
}

/// Route table
#[derive(Default)]
pub struct Dispatcher {
    routes: HashMap<RouteKey, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for an exact (method, path) pair
    ///
    /// An already registered pair is left untouched and reported as `DuplicateRouteError`.
    pub fn register<F>(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: F,
    ) -> Result<(), DuplicateRouteError>
    where
        F: Fn(&Request) -> Result<Response, HandlerError> + Send + Sync + 'static,
    {
        let key = RouteKey {
            method,
            path: path.into(),
        };
        match self.routes.entry(key) {
            Entry::Occupied(existing) => {
                let key = existing.key();
                Err(DuplicateRouteError {
                    method: key.method,
                    path: key.path.clone(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(handler));
                Ok(())
            }
        }
    }

    /// Answer a request, never failing
    ///
    /// Unknown routes become 404, handler errors and panics become 500.
    pub fn dispatch(&self, request: &Request) -> Response {
        match self.try_dispatch(request) {
            Ok(response) => response,
            Err(err) => {
                let message = format!("{err} -> {}", err.status());
                match &err {
                    DispatchError::RouteNotFound { .. } => logger::log_debug(&message),
                    DispatchError::HandlerFailure { .. } => logger::log_error(&message),
                }
                err.into_response()
            }
        }
    }

    /// Look up and run the handler, reporting why no response was produced
    pub fn try_dispatch(&self, request: &Request) -> Result<Response, DispatchError> {
        let key = RouteKey {
            method: request.method(),
            path: request.path().to_string(),
        };
        let Some(handler) = self.routes.get(&key) else {
            return Err(DispatchError::RouteNotFound {
                method: key.method,
                path: key.path,
            });
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(request)));
        let reason = match outcome {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(&*payload),
        };
        Err(DispatchError::HandlerFailure {
            method: key.method,
            path: key.path,
            reason,
        })
    }

    /// Registered keys, sorted by path then method
    pub fn routes(&self) -> Vec<&RouteKey> {
        let mut keys: Vec<&RouteKey> = self.routes.keys().collect();
        keys.sort_by(|a, b| a.path.cmp(&b.path).then(a.method.cmp(&b.method)));
        keys
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
