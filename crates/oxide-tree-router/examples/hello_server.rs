//! A small HTTP server on top of `oxide-tree-router`.
//!
//! Run with:
//!
//! ```sh
//! cargo run -p oxide-tree-router --example hello_server
//! ```
//!
//! Then try:
//!
//! ```sh
//! curl http://127.0.0.1:3000/
//! curl http://127.0.0.1:3000/hello/world
//! curl http://127.0.0.1:3000/api/v1/users/7
//! curl -d '{"name":"grace"}' http://127.0.0.1:3000/api/v2/users
//! curl -X DELETE http://127.0.0.1:3000/hello/world   # 405
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request as HyperRequest, Response as HyperResponse, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use oxide_tree_router::{Flow, HandlerError, Method, Request, Response, Router};

/// Routes shared by every API version.
fn users_app() -> Router {
    Router::build(|r| {
        r.route("users", |r| {
            r.get(|_, _| serde_json::json!([{"id": 1, "name": "ada"}]));
            r.post(|req, res| -> Result<(), HandlerError> {
                let user: serde_json::Value = req.json()?;
                res.apply(Response::json(&user).status(201));
                Ok(())
            });
            r.route("{id}", |r| {
                r.get(|req, res| -> Result<(), HandlerError> {
                    let id: u64 = req.captures.parse("id").ok_or("id must be a number")?;
                    res.set_json(&serde_json::json!({"id": id}))?;
                    Ok(())
                });
            });
        });
    })
    .expect("users routes are valid")
}

fn build_router() -> Router {
    let users = users_app();

    Router::build(|r| {
        r.before(|req, res| {
            res.set_header("X-Request-Path", req.path.clone());
        });
        r.get(|_, res| {
            res.apply(Response::html("<h1>oxide-tree-router</h1>"));
        });
        r.route("docs", |r| {
            r.get(|_, res| {
                res.apply(Response::redirect("/hello"));
            });
        });
        r.route("hello", |r| {
            r.get(|_, _| "hello");
            r.route("world", |r| {
                r.get(|_, _| "hello world");
            });
        });
        r.route("api", |r| {
            r.before(|req, res| {
                if req.get_query("token") == Some("nope") {
                    res.status = 403;
                    res.set_body("Forbidden");
                    return Flow::Halt;
                }
                Flow::Continue
            });
            r.route("v1", |r| {
                r.mount(&users);
            });
            r.route("v2", |r| {
                r.mount(&users);
            });
        });
    })
    .expect("routes are valid")
}

async fn handle_request(
    req: HyperRequest<hyper::body::Incoming>,
    router: Arc<Router>,
) -> Result<HyperResponse<Full<Bytes>>, Infallible> {
    let Some(method) = Method::parse(req.method().as_str()) else {
        return Ok(into_hyper(Response::text("Not Implemented").status(501)));
    };
    let uri = req.uri().clone();

    let mut oxide_req = Request::new(method, uri.path());
    if let Some(query) = uri.query() {
        oxide_req.query = Request::parse_query_string(query);
    }
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            oxide_req.headers.insert(key.to_string(), v.to_string());
        }
    }
    oxide_req.body = req
        .collect()
        .await
        .map(|b| b.to_bytes().to_vec())
        .unwrap_or_default();

    let response = match router.handle(oxide_req) {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "handler failed");
            err.into_internal_server_error()
        }
    };

    Ok(into_hyper(response))
}

fn into_hyper(res: Response) -> HyperResponse<Full<Bytes>> {
    let status = StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = HyperResponse::builder().status(status);
    for (key, value) in &res.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    let body = Full::new(Bytes::from(res.body.unwrap_or_default()));
    builder.body(body).unwrap_or_else(|_| {
        let mut fallback = HyperResponse::new(Full::new(Bytes::new()));
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let router = Arc::new(build_router());
    for route in router.routes() {
        info!("{:<7} {}", route.method, route.path);
    }

    let addr: SocketAddr = ([127, 0, 0, 1], 3000).into();
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = router.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let router = router.clone();
                handle_request(req, router)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!(error = ?err, "error serving connection");
            }
        });
    }
}
