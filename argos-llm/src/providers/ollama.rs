use crate::config::GenerateRequest;
use crate::error::{LlmError, Result};
use crate::providers::trait_impl::Provider as ProviderTrait;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// One decoded chunk of a streaming Ollama response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub text: String,
    pub done: bool,
}

/// Provider for a locally running Ollama endpoint.
///
/// Ollama streams its answer as newline-delimited JSON objects; the chunks
/// are concatenated in arrival order into a single completion string. A
/// non-streaming response is simply the single-chunk case.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProviderTrait for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let body = json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": true,
            "options": {
                "num_predict": request.max_tokens,
                "temperature": request.temperature.clamp(0.0, 2.0),
            },
        });

        let url = format!("{}/api/generate", self.base_url);
        debug!("Sending generation request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Bound the error body so a hostile endpoint cannot flood logs
            let body: String = text.chars().take(500).collect();
            return Err(LlmError::Unavailable {
                status: status.as_u16(),
                body,
            });
        }

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut answer = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            pending.extend_from_slice(&chunk);

            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                if let Some(decoded) = parse_chunk_line(&line)? {
                    answer.push_str(&decoded.text);
                    if decoded.done {
                        return Ok(answer);
                    }
                }
            }
        }

        // Transport may end without a trailing newline on the final chunk
        if let Some(decoded) = parse_chunk_line(&pending)? {
            answer.push_str(&decoded.text);
        }

        Ok(answer)
    }
}

/// Decode one NDJSON line of an Ollama generation stream.
///
/// Blank lines yield `None`. A non-empty line that is not a JSON object
/// with the expected fields is a `MalformedResponse`.
pub fn parse_chunk_line(line: &[u8]) -> Result<Option<StreamChunk>> {
    let line = std::str::from_utf8(line)
        .map_err(|e| LlmError::MalformedResponse(format!("non-UTF-8 chunk: {}", e)))?
        .trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| LlmError::MalformedResponse(format!("invalid chunk JSON: {}", e)))?;

    let text = value
        .get("response")
        .and_then(|r| r.as_str())
        .ok_or_else(|| {
            LlmError::MalformedResponse("chunk missing \"response\" field".to_string())
        })?
        .to_string();
    let done = value.get("done").and_then(|d| d.as_bool()).unwrap_or(false);

    Ok(Some(StreamChunk { text, done }))
}
