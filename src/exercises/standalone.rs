//! Exercises outside the numbered lists: request data, redirect and lifecycle logging

use super::{escape_html, header_or_null, param_or_null};
use crate::dispatch::Dispatcher;
use crate::error::{DuplicateRouteError, HandlerError};
use crate::http::{Method, Request, Response};
use crate::lifecycle::Lifecycle;
use crate::logger;

pub const REDIRECT_TARGET: &str = "https://www.google.com";
const LIFECYCLE_PATH: &str = "/ciclo-de-vida";

pub fn register(
    dispatcher: &mut Dispatcher,
    lifecycle: &mut Lifecycle,
) -> Result<(), DuplicateRouteError> {
    dispatcher.register(Method::Get, "/dados-pessoais", personal_data)?;
    dispatcher.register(Method::Get, "/redirect", |_: &Request| {
        Ok(Response::redirect(REDIRECT_TARGET))
    })?;
    dispatcher.register(Method::Get, LIFECYCLE_PATH, |_: &Request| {
        Ok(Response::text("Servlet do ciclo de vida ativo"))
    })?;

    lifecycle.on_start(LIFECYCLE_PATH, || {
        logger::log_info("Servlet foi iniciado!");
        logger::log_info(&format!("Servlet config: path={LIFECYCLE_PATH}"));
    });
    lifecycle.on_stop(LIFECYCLE_PATH, || {
        logger::log_info("Servlet está sendo destruído...Xau!");
    });
    Ok(())
}

fn personal_data(req: &Request) -> Result<Response, HandlerError> {
    Ok(Response::html(format!(
        "<p>Nome: {}</p>\n<p>Idade: {}</p>\n<p>User Agent: {}</p>",
        escape_html(param_or_null(req, "nome")),
        escape_html(param_or_null(req, "idade")),
        escape_html(header_or_null(req, "User-Agent")),
    )))
}
