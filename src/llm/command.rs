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
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::LlmConfig;
use crate::llm::{render_transcript, ChatMessage, GenerationBackend};

/// Local model-serving process.
///
/// The rendered conversation is written to the program's stdin and its
/// stdout is the generated text.
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.command.trim().is_empty() {
            anyhow::bail!("llm.command must be set for the command backend");
        }

        Ok(Self {
            program: config.command.clone(),
            args: config.args.clone(),
        })
    }
}

#[async_trait]
impl GenerationBackend for CommandBackend {
    fn name(&self) -> &str {
        "command"
    }

    async fn process(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(program = %self.program, "Starting local generation process");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program))?;

        let transcript = render_transcript(messages);
        let stdin = child.stdin.take();
        let write_prompt = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(transcript.as_bytes()).await {
                // The process exited without reading; its status tells the story
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("Generation process closed stdin early");
                    Ok(())
                }
                // Dropping stdin closes the pipe so the process sees EOF
                result => result,
            }
        };

        // Output is drained while the prompt is written so a process that
        // echoes before reading all input cannot fill its stdout pipe
        let (written, output) = tokio::join!(write_prompt, child.wait_with_output());
        let output = output.context("Failed to read generation process output")?;
        written.context("Failed to send prompt to generation process")?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn backend(command: &str, args: &[&str]) -> CommandBackend {
        let config = LlmConfig {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..LlmConfig::default()
        };
        CommandBackend::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_process_pipes_transcript() {
        let output = backend("cat", &[])
            .process(&[ChatMessage::system("sys"), ChatMessage::user("ログ")])
            .await
            .unwrap();
        assert_eq!(output, "system: sys\nuser: ログ");
    }

    #[tokio::test]
    async fn test_large_prompt_does_not_block() {
        let prompt = "a".repeat(1_000_000);
        let output = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            backend("cat", &[]).process(&[ChatMessage::user(prompt)]),
        )
        .await
        .expect("generation process blocked")
        .unwrap();

        assert_eq!(output.len(), "user: ".len() + 1_000_000);
    }

    #[tokio::test]
    async fn test_process_failure_propagates() {
        let err = backend("sh", &["-c", "echo broken >&2; exit 3"])
            .process(&[ChatMessage::user("x")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let result = backend("lograg-definitely-missing-binary", &[])
            .process(&[ChatMessage::user("x")])
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_command_rejected() {
        let config = LlmConfig {
            command: "  ".to_string(),
            ..LlmConfig::default()
        };
        assert!(CommandBackend::new(&config).is_err());
    }
}
