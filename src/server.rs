//! Dev Server
//!
//! Serves the site root over HTTP and pushes `reload` to connected pages
//! whenever an asset task finishes.

use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::broadcast::{self, error::RecvError};
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::errors::ServerError;
use crate::pipeline::ReloadEvent;

pub const LIVERELOAD_PATH: &str = "/__livereload";

/// Client injected into every served page when live reload is on.
pub const RELOAD_CLIENT: &str = "<script>(function(){\
var p=location.protocol==='https:'?'wss://':'ws://';\
var s=new WebSocket(p+location.host+'/__livereload');\
s.onmessage=function(e){if(e.data==='reload'){location.reload();}};\
})();</script>";

/// Largest page the server rewrites to inject the reload client.
const MAX_INJECT_BYTES: usize = 8 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    root: PathBuf,
    livereload: bool,
    reload: broadcast::Sender<ReloadEvent>,
}

/// Insert the reload client before the last `</body>`, or at the end when
/// the page has none.
pub fn inject_reload_client(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + RELOAD_CLIENT.len());
    match html.rfind("</body>") {
        Some(idx) => {
            out.push_str(&html[..idx]);
            out.push_str(RELOAD_CLIENT);
            out.push_str(&html[idx..]);
        }
        None => {
            out.push_str(html);
            out.push_str(RELOAD_CLIENT);
        }
    }
    out
}

pub fn router(config: &ServerConfig, reload: broadcast::Sender<ReloadEvent>) -> Router {
    let state = AppState {
        root: config.root.clone(),
        livereload: config.livereload,
        reload,
    };

    let mut router = Router::new();
    if config.livereload {
        router = router.route(LIVERELOAD_PATH, get(livereload));
    }
    router
        .fallback(serve_file)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn livereload(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let events = state.reload.subscribe();
    ws.on_upgrade(move |socket| forward_reloads(socket, events))
}

async fn forward_reloads(socket: WebSocket, mut events: broadcast::Receiver<ReloadEvent>) {
    debug!("live reload client connected");
    let (mut sender, mut incoming) = socket.split();
    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            // The page only ever closes; anything else it sends is ignored
            message = incoming.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
        };
        match event {
            Ok(event) => debug!(task = %event.task, "sending reload"),
            // Missed events still mean one reload is due
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "reload events lagged"),
            Err(RecvError::Closed) => break,
        }
        if sender.send(Message::Text("reload".to_string())).await.is_err() {
            break;
        }
    }
    debug!("live reload client gone");
}

async fn serve_file(State(state): State<AppState>, request: Request) -> Response {
    let response = match ServeDir::new(&state.root).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if !state.livereload || !is_html {
        return response.map(Body::new);
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(Body::new(body), MAX_INJECT_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "failed to read page for live reload injection");
            return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let html = inject_reload_client(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Bind the configured address.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "dev server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))
}
