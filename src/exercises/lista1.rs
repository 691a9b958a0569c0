//! Exercise list 1: parameters, GET/POST and the servlet lifecycle

use super::{escape_html, param_or_null};
use crate::dispatch::Dispatcher;
use crate::error::{DuplicateRouteError, HandlerError};
use crate::http::{Method, Request, Response};
use crate::lifecycle::Lifecycle;
use crate::logger;

pub fn register(
    dispatcher: &mut Dispatcher,
    lifecycle: &mut Lifecycle,
) -> Result<(), DuplicateRouteError> {
    dispatcher.register(Method::Get, "/ex1", hello_world)?;
    dispatcher.register(Method::Get, "/ex2", echo_html)?;
    // Fed by an HTML form via POST, GET accepts the same fields in the query string
    dispatcher.register(Method::Get, "/ex3", echo_plain)?;
    dispatcher.register(Method::Post, "/ex3", echo_plain)?;
    dispatcher.register(Method::Get, "/ex4", |_: &Request| {
        Ok(Response::text("Recebemos uma requisicao GET no EX4"))
    })?;
    dispatcher.register(Method::Post, "/ex4", |_: &Request| {
        Ok(Response::text("Recebemos uma requisicao POST no EX4"))
    })?;
    dispatcher.register(Method::Get, "/ex5", lifecycle_service)?;
    dispatcher.register(Method::Post, "/ex5", lifecycle_service)?;

    lifecycle.on_start("/ex5", || logger::log_info("Iniciando o servlet"));
    lifecycle.on_stop("/ex5", || logger::log_info("Finalizando o servlet"));
    Ok(())
}

fn hello_world(_: &Request) -> Result<Response, HandlerError> {
    Ok(Response::html("<p>Hello, World!</p>"))
}

fn echo_html(req: &Request) -> Result<Response, HandlerError> {
    Ok(Response::html(format!(
        "<p>Nome: {}</p>\n<p>Idade: {}</p>",
        escape_html(param_or_null(req, "nome")),
        escape_html(param_or_null(req, "idade")),
    )))
}

fn echo_plain(req: &Request) -> Result<Response, HandlerError> {
    Ok(Response::text(format!(
        "Dados Recebidos!\nNome: {}\nIdade: {}",
        param_or_null(req, "nome"),
        param_or_null(req, "idade"),
    )))
}

// Logs every request and answers with an empty body.
fn lifecycle_service(req: &Request) -> Result<Response, HandlerError> {
    logger::log_info(&format!(
        "Recebendo alguma requisicao no servlet ({} {})",
        req.method(),
        req.path()
    ));
    Ok(Response::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    fn dispatcher() -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        register(&mut dispatcher, &mut Lifecycle::new()).unwrap();
        dispatcher
    }

    fn body(resp: &Response) -> String {
        String::from_utf8(resp.body().to_vec()).unwrap()
    }

    #[test]
    fn test_ex1_hello_world() {
        let resp = dispatcher().dispatch(&Request::new(Method::Get, "/ex1"));
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.content_type().starts_with("text/html"));
        assert_eq!(body(&resp), "<p>Hello, World!</p>");
    }

    #[test]
    fn test_ex2_echoes_query_params() {
        let req = Request::new(Method::Get, "/ex2").with_query("nome=Ana&idade=30");
        let resp = dispatcher().dispatch(&req);
        let text = body(&resp);
        assert!(text.contains("Nome: Ana"));
        assert!(text.contains("Idade: 30"));
    }

    #[test]
    fn test_ex2_missing_params_render_null() {
        let resp = dispatcher().dispatch(&Request::new(Method::Get, "/ex2"));
        assert_eq!(body(&resp), "<p>Nome: null</p>\n<p>Idade: null</p>");
    }

    #[test]
    fn test_ex2_escapes_markup() {
        let req = Request::new(Method::Get, "/ex2").with_param("nome", "<script>");
        let text = body(&dispatcher().dispatch(&req));
        assert!(text.contains("Nome: &lt;script&gt;"));
        assert!(!text.contains("<script>"));
    }

    #[test]
    fn test_ex3_echoes_form_body() {
        let req = Request::new(Method::Post, "/ex3").with_form(b"nome=Bruno&idade=25");
        let resp = dispatcher().dispatch(&req);
        assert!(resp.content_type().starts_with("text/plain"));
        assert_eq!(body(&resp), "Dados Recebidos!\nNome: Bruno\nIdade: 25");
    }

    #[test]
    fn test_ex4_distinct_bodies_per_method() {
        let dispatcher = dispatcher();
        let get = dispatcher.dispatch(&Request::new(Method::Get, "/ex4"));
        assert_eq!(body(&get), "Recebemos uma requisicao GET no EX4");
        let post = dispatcher.dispatch(&Request::new(Method::Post, "/ex4"));
        assert_eq!(body(&post), "Recebemos uma requisicao POST no EX4");
    }

    #[test]
    fn test_ex5_empty_body_any_method() {
        let dispatcher = dispatcher();
        for method in [Method::Get, Method::Post] {
            let resp = dispatcher.dispatch(&Request::new(method, "/ex5"));
            assert_eq!(resp.status(), StatusCode::OK);
            assert!(resp.body().is_empty());
        }
    }

    #[test]
    fn test_ex5_registers_lifecycle_hooks() {
        let mut lifecycle = Lifecycle::new();
        register(&mut Dispatcher::new(), &mut lifecycle).unwrap();
        assert_eq!(lifecycle.hook_count(), 2);
    }
}
