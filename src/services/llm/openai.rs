// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

const PROVIDER: &str = "openai";

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

fn provider_error(message: impl Into<String>) -> Error {
    Error::Provider {
        provider: PROVIDER.into(),
        message: message.into(),
    }
}

impl OpenAiProvider {
    pub fn new(config: &Config, api_key: SecretString) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Stream a chat completion, forwarding tokens to `token_tx` as they
    /// arrive. Returns the full trimmed response.
    pub async fn generate(
        &self,
        system: &str,
        prompt: &str,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, prompt_chars = prompt.len(), "sending completion request");

        let request = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&ChatRequest {
                model: &self.model,
                messages: [
                    Message {
                        role: "system",
                        content: system,
                    },
                    Message {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                stream: true,
            })
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = request => response.map_err(|e| {
                if e.is_timeout() {
                    provider_error("request timed out")
                } else {
                    provider_error(e.to_string())
                }
            })?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(format!("HTTP {status}: {body}")));
        }

        let mut stream = response.bytes_stream();
        let mut lines = SseLines::default();
        let mut full_response = String::new();

        loop {
            let (payloads, ended) = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                chunk = stream.next() => match chunk {
                    Some(chunk) => {
                        let chunk = chunk.map_err(|e| provider_error(e.to_string()))?;
                        (lines.push(&chunk), false)
                    }
                    None => (lines.finish(), true),
                },
            };

            for data in payloads {
                let Ok(chunk) = serde_json::from_str::<ChatChunk>(&data) else {
                    debug!(%data, "skipping unparseable stream event");
                    continue;
                };
                for choice in chunk.choices {
                    if let Some(content) = choice.delta.content {
                        full_response.push_str(&content);
                        let _ = token_tx.send(content).await;
                    }
                    if choice.finish_reason.is_some() {
                        return Ok(full_response.trim().to_string());
                    }
                }
            }

            if ended {
                break;
            }
        }

        Ok(full_response.trim().to_string())
    }

    pub fn name(&self) -> &str {
        PROVIDER
    }
}

/// Splits a server-sent event byte stream into `data:` payloads.
///
/// Bytes are buffered until a full line is available, so a multi-byte char
/// split across network chunks is decoded intact.
#[derive(Default)]
struct SseLines {
    buffer: Vec<u8>,
}

impl SseLines {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            payloads.extend(data_payload(&line));
        }
        payloads
    }

    /// Flush a last line that arrived without a trailing newline.
    fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        data_payload(&rest).into_iter().collect()
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let data = line.trim().strip_prefix("data:")?.trim_start();
    (!data.is_empty() && data != "[DONE]").then(|| data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multibyte_char_split_across_chunks() {
        let event = "data: {\"x\":\"é\"}\n".as_bytes();
        let split = event.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut lines = SseLines::default();
        assert!(lines.push(&event[..split]).is_empty());
        assert_eq!(lines.push(&event[split..]), ["{\"x\":\"é\"}"]);
    }

    #[test]
    fn skips_comments_blank_lines_and_done() {
        let mut lines = SseLines::default();
        let payloads = lines.push(b": ping\n\ndata:{\"a\":1}\r\ndata: [DONE]\n");
        assert_eq!(payloads, ["{\"a\":1}"]);
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut lines = SseLines::default();
        assert!(lines.push(b"data: {\"a\":2}").is_empty());
        assert_eq!(lines.finish(), ["{\"a\":2}"]);
        assert!(lines.finish().is_empty());
    }
}
