//! HTTP front end
//!
//! Thin route adapter over [`Engine`]: every handler asks the engine for a
//! rendered view and turns engine errors into error pages.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::content::loader::{PAGES_FOLDER, POSTS_FOLDER};
use crate::engine::Engine;
use crate::error::Error;
use crate::templates::TEMPLATES_FOLDER;

/// Folder inside the blog served under `/static`
pub const STATIC_FOLDER: &str = "static";

/// How the server listens and which extras it enables
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub address: String,
    pub port: u16,
    /// Reload on changes under posts, pages and templates
    pub watch: bool,
    /// Expose `POST /admin/reload`
    pub admin_reload: bool,
}

impl ServerOptions {
    /// Options from the site configuration
    pub fn from_engine(engine: &Engine) -> Self {
        let server = &engine.config().server;
        Self {
            address: server.address.clone(),
            port: server.port,
            watch: false,
            admin_reload: server.admin_reload,
        }
    }
}

/// Build the router for `engine`
pub fn router(engine: Arc<Engine>, admin_reload: bool) -> Router {
    let config = engine.config();
    let mut app = Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler))
        .route("/:slug", get(page_handler))
        .nest_service("/static", ServeDir::new(config.base.join(STATIC_FOLDER)));

    if let Some(favicon) = config.favicon_path() {
        app = app.route_service("/favicon.ico", ServeFile::new(favicon));
    }

    if admin_reload {
        tracing::warn!("Admin reload endpoint enabled at POST /admin/reload");
        app = app.route("/admin/reload", post(reload_handler));
    }

    app.fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Serve until Ctrl+C or until `stop` fires
pub async fn start(
    engine: Arc<Engine>,
    options: ServerOptions,
    stop: Option<oneshot::Receiver<()>>,
) -> Result<()> {
    let app = router(Arc::clone(&engine), options.admin_reload);

    let bind_ip = if options.address == "localhost" {
        "127.0.0.1"
    } else {
        options.address.as_str()
    };
    let addr: SocketAddr = format!("{}:{}", bind_ip, options.port).parse()?;

    if options.watch {
        let engine = Arc::clone(&engine);
        std::thread::spawn(move || {
            if let Err(e) = watch_and_reload(&engine) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Server running at http://{}:{}", options.address, options.port);
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(stop))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(stop: Option<oneshot::Receiver<()>>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match stop {
        Some(stop) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = stop => {}
            }
        }
        None => ctrl_c.await,
    }
}

/// Block on filesystem events and reload the engine after each batch
fn watch_and_reload(engine: &Engine) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let base = &engine.config().base;
    for folder in [POSTS_FOLDER, PAGES_FOLDER, TEMPLATES_FOLDER] {
        let path = base.join(folder);
        if path.exists() {
            debouncer.watcher().watch(&path, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| {
                    let path = e.path.to_string_lossy();
                    !path.ends_with('~') && !path.contains(".DS_Store") && !path.contains(".swp")
                });
                if !relevant {
                    continue;
                }

                for event in &events {
                    tracing::debug!("File changed: {:?}", event.path);
                }
                match engine.reload() {
                    Ok(summary) => println!("Reloaded: {}", summary),
                    Err(e) => tracing::error!("Reload failed: {}", e),
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Turn an engine result into a page, rendering the error template on failure
fn respond(engine: &Engine, result: crate::error::Result<Vec<u8>>) -> Response {
    match result {
        Ok(body) => Html(body).into_response(),
        Err(e) => error_response(engine, &e),
    }
}

fn error_response(engine: &Engine, err: &Error) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!("Failed to render page: {}", err);
    } else {
        tracing::debug!("{}", err);
    }
    (status, Html(engine.render_error(err))).into_response()
}

async fn index_handler(State(engine): State<Arc<Engine>>) -> Response {
    respond(&engine, engine.render_index())
}

async fn post_handler(State(engine): State<Arc<Engine>>, Path(slug): Path<String>) -> Response {
    respond(&engine, engine.render_post(&slug))
}

async fn page_handler(State(engine): State<Arc<Engine>>, Path(slug): Path<String>) -> Response {
    respond(&engine, engine.render_page(&slug))
}

async fn fallback_handler(State(engine): State<Arc<Engine>>, uri: Uri) -> Response {
    let err = Error::page_not_found(uri.path().trim_start_matches('/'));
    error_response(&engine, &err)
}

async fn reload_handler(State(engine): State<Arc<Engine>>) -> Response {
    let result = tokio::task::spawn_blocking(move || engine.reload()).await;
    match result {
        Ok(Ok(summary)) => Json(serde_json::json!({
            "status": "ok",
            "posts": summary.posts,
            "pages": summary.pages,
            "skipped": summary.skipped,
            "templates": summary.templates,
            "generation": summary.generation,
        }))
        .into_response(),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "status": "error", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
