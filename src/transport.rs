use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use crate::config::GenAiConfig;
use crate::error::{Result, TutorGatewayError};
use crate::models::{
    Content, GenerateRequest, GenerateResponse, GenerationConfig, GenerationParams, RagResource,
    Retrieval, SafetySetting, ThinkingConfig, Tool, VertexRagStore,
};

/// The generative backend as the rest of the core sees it: one single-shot
/// completion and one retrieval-grounded streaming completion. The streaming
/// call is buffered into a single string before returning; no partial
/// delivery happens above this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String>;

    async fn complete_grounded(
        &self,
        model: &str,
        prompt: &str,
        corpus_id: &str,
        system_instruction: &str,
        params: &GenerationParams,
    ) -> Result<String>;
}

/// Production transport against the Vertex generative REST API. One instance
/// is constructed at startup and shared by every component; requests carry no
/// per-call client state.
pub struct GenAiTransport {
    client: Client,
    api_key: String,
    project: String,
    location: String,
}

impl GenAiTransport {
    pub fn new(cfg: &GenAiConfig) -> Result<Self> {
        if cfg.api_key.is_empty() {
            return Err(TutorGatewayError::Config(
                "generative API key is empty".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_key: cfg.api_key.clone(),
            project: cfg.project.clone(),
            location: cfg.location.clone(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "https://aiplatform.googleapis.com/v1/projects/{}/locations/{}/publishers/google/models/{}:{}",
            self.project, self.location, model, method
        )
    }
}

/// Payload of an SSE `data:` line, or `None` for blanks, comments and other
/// event fields.
fn sse_data_payload(line: &str) -> Option<&str> {
    let line = line.trim_end_matches('\r');
    let rest = line.strip_prefix("data:")?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    if rest.is_empty() { None } else { Some(rest) }
}

/// Full request body for a grounded pipeline call.
fn build_grounded_request(
    prompt: &str,
    corpus_id: &str,
    system_instruction: &str,
    params: &GenerationParams,
) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content::user_text(prompt)],
        system_instruction: Some(Content::system_text(system_instruction)),
        generation_config: Some(GenerationConfig {
            temperature: params.temperature,
            top_p: params.top_p,
            max_output_tokens: params.max_output_tokens,
            thinking_config: params
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
        }),
        safety_settings: if params.disable_safety {
            SafetySetting::all_off()
        } else {
            Vec::new()
        },
        tools: vec![Tool {
            retrieval: Retrieval {
                vertex_rag_store: VertexRagStore {
                    rag_resources: vec![RagResource {
                        rag_corpus: corpus_id.to_string(),
                    }],
                },
            },
        }],
    }
}

#[async_trait]
impl Transport for GenAiTransport {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest::from_prompt(prompt);

        let response = self
            .client
            .post(self.model_url(model, "generateContent"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TutorGatewayError::Api(format!(
                "generateContent returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TutorGatewayError::Parse(format!("generateContent response: {e}")))?;

        parsed.text().ok_or_else(|| {
            TutorGatewayError::Api("generateContent returned no usable text".to_string())
        })
    }

    async fn complete_grounded(
        &self,
        model: &str,
        prompt: &str,
        corpus_id: &str,
        system_instruction: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let request = build_grounded_request(prompt, corpus_id, system_instruction, params);

        let response = self
            .client
            .post(self.model_url(model, "streamGenerateContent"))
            .query(&[("alt", "sse")])
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TutorGatewayError::Api(format!(
                "streamGenerateContent returned {status}: {body}"
            )));
        }

        // Consume the SSE body incrementally, concatenating the usable text
        // of each chunk. Chunks without candidates or text parts are skipped.
        let mut out = String::new();
        let mut buf = String::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            let text = std::str::from_utf8(&bytes)
                .map_err(|e| TutorGatewayError::Parse(format!("non-UTF8 stream chunk: {e}")))?;
            buf.push_str(text);

            while let Some(pos) = buf.find('\n') {
                let line: String = buf.drain(..=pos).collect();
                if let Some(payload) = sse_data_payload(line.trim_end_matches('\n')) {
                    let parsed: GenerateResponse = serde_json::from_str(payload).map_err(|e| {
                        TutorGatewayError::Parse(format!("stream chunk JSON: {e}"))
                    })?;
                    if let Some(fragment) = parsed.text() {
                        out.push_str(&fragment);
                    }
                }
            }
        }

        // A final data line without a trailing newline is still a chunk.
        if let Some(payload) = sse_data_payload(&buf) {
            let parsed: GenerateResponse = serde_json::from_str(payload)
                .map_err(|e| TutorGatewayError::Parse(format!("stream chunk JSON: {e}")))?;
            if let Some(fragment) = parsed.text() {
                out.push_str(&fragment);
            }
        }

        Ok(out)
    }
}
