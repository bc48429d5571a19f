/// HTTP routes for the chat page.
///
/// Every action takes the single chat lock and runs to completion before the
/// next one starts. Pipeline work runs on a blocking thread because the
/// embedding and completion clients block.
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Form, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::sync::Mutex as TokioMutex;
use tracing::{error, info};

use super::{ChatState, page};

/// Name of the file input on the upload form.
const UPLOAD_FIELD: &str = "document";

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<TokioMutex<ChatState>>,
}

impl AppState {
    pub fn new(chat: ChatState) -> Self {
        Self {
            chat: Arc::new(TokioMutex::new(chat)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AskForm {
    query: String,
}

pub fn app_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/upload", post(upload))
        .route("/ask", post(ask))
        .route("/reset", post(reset))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Serve the chat page until Ctrl-C.
pub async fn run_server(chat: ChatState) -> Result<()> {
    let addr = chat.config().bind_addr()?;
    let max_upload_bytes = chat.config().max_upload_bytes();
    let app = app_router(AppState::new(chat), max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Chat page available at http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Run `f` against the chat state on a blocking thread.
async fn with_chat<F>(state: &AppState, f: F)
where
    F: FnOnce(&mut ChatState) + Send + 'static,
{
    let chat = state.chat.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let mut guard = chat.blocking_lock();
        f(&mut guard);
    })
    .await;
    if let Err(e) = joined {
        error!("Pipeline task failed: {e}");
        state
            .chat
            .lock()
            .await
            .report_error("Internal error", e.to_string());
    }
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let chat = state.chat.lock().await;
    Html(page::render(&chat))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Redirect {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(UPLOAD_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((filename, bytes)),
                    Err(e) => {
                        state.chat.lock().await.report_error("Upload failed", e.body_text());
                        return Redirect::to("/");
                    }
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => {
                state.chat.lock().await.report_error("Upload failed", e.body_text());
                return Redirect::to("/");
            }
        }
    }

    match upload {
        Some((filename, bytes)) => {
            with_chat(&state, move |chat| chat.handle_upload(&filename, &bytes)).await;
        }
        None => {
            state
                .chat
                .lock()
                .await
                .report_error("Upload failed", "no file was attached");
        }
    }
    Redirect::to("/")
}

async fn ask(State(state): State<AppState>, Form(form): Form<AskForm>) -> Redirect {
    with_chat(&state, move |chat| chat.handle_query(&form.query)).await;
    Redirect::to("/")
}

async fn reset(State(state): State<AppState>) -> Redirect {
    let mut chat = state.chat.lock().await;
    if let Err(e) = chat.reset() {
        chat.report_error("Reset failed", e.to_string());
    }
    Redirect::to("/")
}
