/// Ollama completion client (`/api/generate`, non-streaming).
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GenerationError, LanguageModel};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Blocking completion client for an Ollama server.
#[derive(Clone)]
pub struct OllamaLlm {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaLlm {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!model.trim().is_empty(), "missing language model name");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Ollama HTTP client")?;
        let endpoint = format!("{}/api/generate", base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl LanguageModel for OllamaLlm {
    fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!("Sending {} char prompt to {}", prompt.chars().count(), self.model);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout {
                        endpoint: self.endpoint.clone(),
                    }
                } else {
                    GenerationError::Unreachable {
                        endpoint: self.endpoint.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(GenerationError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = resp
            .json()
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(parsed.response)
    }
}
