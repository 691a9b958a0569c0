//! Exercise list 2: HTML, JSON and download responses

use crate::dispatch::Dispatcher;
use crate::error::{DuplicateRouteError, HandlerError};
use crate::http::{Method, Request, Response};
use serde::Serialize;

const PAGE: &str = "<html>
<header>
<title>Lista 2 - Ex 1</title>
</header>
<body>
<h1>Lista 2 - Ex 1</h1>
</body>
</html>";

#[derive(Debug, Serialize)]
struct Product {
    name: &'static str,
    price: f64,
}

const PRODUCTS: [Product; 3] = [
    Product {
        name: "Product1",
        price: 10.99,
    },
    Product {
        name: "Product2",
        price: 15.49,
    },
    Product {
        name: "Product3",
        price: 7.99,
    },
];

pub fn register(dispatcher: &mut Dispatcher) -> Result<(), DuplicateRouteError> {
    dispatcher.register(Method::Get, "/lista2-ex1", |_: &Request| Ok(Response::html(PAGE)))?;
    dispatcher.register(Method::Get, "/lista2-ex2", products)?;
    dispatcher.register(Method::Get, "/lista2-ex3", pdf_download)?;
    Ok(())
}

fn products(_: &Request) -> Result<Response, HandlerError> {
    Response::json(&PRODUCTS)
}

// Only the download headers are sent, there is no file behind this route.
fn pdf_download(_: &Request) -> Result<Response, HandlerError> {
    Ok(Response::ok()
        .with_content_type("application/pdf")
        .with_header("Content-Disposition", "attachment; filename=\"sample-1.pdf\""))
}
