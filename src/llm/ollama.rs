// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::LlmConfig;
use crate::llm::{render_transcript, ChatMessage, GenerationBackend};

/// Remote generation through the Ollama `/api/generate` endpoint
pub struct OllamaBackend {
    endpoint: String,
    model: String,
    max_tokens: usize,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("lograg/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint: format!("{}/api/generate", config.ollama_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            client,
        })
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn process(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: render_transcript(messages),
            stream: false,
            options: GenerateOptions {
                num_predict: self.max_tokens,
            },
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "Sending generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Ollama. Is the Ollama service running?")?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama returned an error status: {}", response.status());
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Malformed response from Ollama: missing 'response' field")?;

        Ok(body.response)
    }
}
