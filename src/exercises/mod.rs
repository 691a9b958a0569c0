//! Exercise handlers
//!
//! Each exercise is an independent handler bound to one path. Nothing here shares
//! state between requests; the only process-wide pieces are the lifecycle hooks.

mod lista1;
mod lista2;
mod standalone;

use crate::dispatch::Dispatcher;
use crate::error::DuplicateRouteError;
use crate::http::Request;
use crate::lifecycle::Lifecycle;

/// Register every exercise route and its lifecycle hooks
pub fn register(
    dispatcher: &mut Dispatcher,
    lifecycle: &mut Lifecycle,
) -> Result<(), DuplicateRouteError> {
    lista1::register(dispatcher, lifecycle)?;
    lista2::register(dispatcher)?;
    standalone::register(dispatcher, lifecycle)?;
    Ok(())
}

/// Parameter value, or `null` when absent (what a servlet container prints)
fn param_or_null<'a>(req: &'a Request, name: &str) -> &'a str {
    req.param(name).unwrap_or("null")
}

fn header_or_null<'a>(req: &'a Request, name: &str) -> &'a str {
    req.header(name).unwrap_or("null")
}

/// Escape text before placing it in an HTML body
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
