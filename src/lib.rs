//! Servlet exercises served from a single dispatch table
//!
//! Each exercise is a handler bound to a (method, path) route. The server binary
//! wires the routes into a [`dispatch::Dispatcher`], runs the lifecycle hooks and
//! serves HTTP/1.1 with hyper.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod exercises;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod logger;
pub mod server;
