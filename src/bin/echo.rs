use std::sync::Arc;

use clap::Parser;
use http::Method;
use switchback::middleware::TracingMiddleware;
use switchback::router::Router;
use switchback::server::{HttpServer, RouterService};
use switchback::{Request, Response};

/// Demo echo server: greets by the captured `[name]` segment, with a
/// dedicated greeting for names matching `admin:.+`.
#[derive(Parser)]
#[command(name = "echo", about = "switchback demo echo server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,
}

fn echo_admin(req: &Request) -> Response {
    Response::text(format!("Hello, admin {}!", req.param("name")))
}

fn echo(req: &Request) -> Response {
    Response::text(format!("Hello, {}!", req.param("name")))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let mut router = Router::new();
    router.handle_fn(Method::GET, "/hello/[name]{admin:.+}", echo_admin)?;
    router.handle_fn(Method::GET, "/hello/[name]", echo)?;
    router.with_middleware(Arc::new(TracingMiddleware));

    let server = HttpServer(RouterService::new(Arc::new(router))).start(&args.addr)?;
    println!("listening on {}", server.addr());
    server
        .join()
        .map_err(|e| anyhow::anyhow!("server exited: {e:?}"))?;
    Ok(())
}
