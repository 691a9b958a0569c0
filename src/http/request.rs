//! Request model handed to handlers
//!
//! A `Request` is assembled once by the HTTP adapter and is read-only afterwards.
//! Parameters come from the query string and, for url-encoded POST bodies, from the form body.

use std::collections::HashMap;
use std::fmt;

/// HTTP methods the dispatcher routes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// Map a hyper method, `None` for anything the dispatcher does not route
    pub fn from_hyper(method: &hyper::Method) -> Option<Self> {
        match *method {
            hyper::Method::GET => Some(Self::Get),
            hyper::Method::POST => Some(Self::Post),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incoming request data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    params: HashMap<String, String>,
    /// Keys are stored lowercase
    headers: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            headers: HashMap::new(),
        }
    }

    /// Add parameters from a raw query string (without the leading `?`)
    #[must_use]
    pub fn with_query(self, query: &str) -> Self {
        self.with_urlencoded(query.as_bytes())
    }

    /// Add parameters from an `application/x-www-form-urlencoded` body
    #[must_use]
    pub fn with_form(self, body: &[u8]) -> Self {
        self.with_urlencoded(body)
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_insert_with(|| value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.into());
        self
    }

    // First occurrence of a name wins, later duplicates are ignored.
    fn with_urlencoded(mut self, input: &[u8]) -> Self {
        for (name, value) in url::form_urlencoded::parse(input) {
            self.params
                .entry(name.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        self
    }

    pub const fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Header lookup, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
