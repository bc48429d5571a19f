//! Browser chat front-end.
//!
//! [`ChatState`] drives the session in response to page actions and keeps
//! what the page shows: the processing status and the conversation turns.
//! Turns are display-only and are never sent back to the model.
pub mod page;
pub mod server;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::Config;
use crate::document::chunker::ChunkConfigError;
use crate::embedder::Embedder;
use crate::error::PipelineError;
use crate::generator::LanguageModel;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Error,
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Pages the answer's context came from, in retrieval order.
    pub pages: Vec<u32>,
    pub at: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            pages: Vec::new(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Banner shown after the last upload or failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub title: String,
    pub message: String,
}

impl Status {
    fn error(err: &PipelineError) -> Self {
        Self {
            kind: StatusKind::Error,
            title: err.title().to_string(),
            message: err.to_string(),
        }
    }
}

pub struct ChatState {
    config: Config,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn LanguageModel>,
    session: Session,
    turns: Vec<Turn>,
    status: Option<Status>,
}

impl ChatState {
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self, ChunkConfigError> {
        let session = Session::new(&config, embedder.clone(), model.clone())?;
        Ok(Self {
            config,
            embedder,
            model,
            session,
            turns: Vec::new(),
            status: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process an uploaded file and record the outcome in the status banner.
    pub fn handle_upload(&mut self, filename: &str, bytes: &[u8]) {
        self.status = Some(match self.session.ingest(filename, bytes) {
            Ok(report) => Status {
                kind: StatusKind::Success,
                title: "Document processed successfully!".to_string(),
                message: format!(
                    "{}: {} pages, {} chunks. Ask your questions below.",
                    report.name, report.pages, report.chunks
                ),
            },
            Err(e) => {
                error!("Upload of {filename:?} failed: {e}");
                Status::error(&e)
            }
        });
    }

    /// Answer a question and append the exchange to the conversation.
    pub fn handle_query(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.status = Some(Status::error(&PipelineError::EmptyQuery));
            return;
        }

        self.turns.push(Turn::new(Role::User, query));
        match self.session.ask(query) {
            Ok(answer) => {
                let mut turn = Turn::new(Role::Assistant, answer.text);
                turn.pages = answer.sources.iter().map(|s| s.chunk.page()).collect();
                self.turns.push(turn);
            }
            Err(e) => {
                error!("Query failed: {e}");
                self.turns
                    .push(Turn::new(Role::Error, format!("{}: {e}", e.title())));
            }
        }
    }

    /// Surface a failure that happened before the pipeline ran.
    pub fn report_error(&mut self, title: &str, message: impl Into<String>) {
        self.status = Some(Status {
            kind: StatusKind::Error,
            title: title.to_string(),
            message: message.into(),
        });
    }

    /// Drop the session and conversation and start over.
    pub fn reset(&mut self) -> Result<(), ChunkConfigError> {
        self.session = Session::new(&self.config, self.embedder.clone(), self.model.clone())?;
        self.turns.clear();
        self.status = None;
        info!("Session reset");
        Ok(())
    }
}
