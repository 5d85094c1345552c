//! Development server for generated sites.
//!
//! Static files come from a `ServeDir`. When the site enables the PWA
//! integration, requests also pass through [`noop_service_worker`], which
//! stands in for the production service worker while developing.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::ui;

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub root: PathBuf,
    pub port: u16,
    /// Mount the service-worker middleware
    pub service_worker: bool,
}

/// Pass-through middleware: the request reaches the next layer unchanged.
pub async fn noop_service_worker(request: Request, next: Next) -> Response {
    tracing::trace!(path = %request.uri().path(), "service worker passthrough");
    next.run(request).await
}

pub fn router(options: &ServeOptions) -> Router {
    let app = Router::new().fallback_service(ServeDir::new(&options.root));
    if options.service_worker {
        app.layer(middleware::from_fn(noop_service_worker))
    } else {
        app
    }
}

pub async fn serve(options: ServeOptions) -> Result<()> {
    let addr: SocketAddr = ([127, 0, 0, 1], options.port).into();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    serve_on(listener, options).await
}

/// Serve on an already bound listener until Ctrl-C.
pub async fn serve_on(listener: TcpListener, options: ServeOptions) -> Result<()> {
    let addr = listener.local_addr()?;
    if !options.root.is_dir() {
        ui::warning(&format!(
            "{} does not exist yet; requests will 404 until the site is generated",
            options.root.display()
        ));
    }
    ui::info(&format!("Serving {} at http://{}", options.root.display(), addr));
    tracing::debug!(service_worker = options.service_worker, "dev server started");

    axum::serve(listener, router(&options))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
