use serde::{Deserialize, Serialize};

/// Subject domain assigned to an incoming question. Lives for a single
/// request; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Math,
    SocialStudies,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Math => "math",
            Category::SocialStudies => "social_studies",
            Category::General => "general",
        }
    }
}

/// The structured teaching artifact returned for domain-pipeline questions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StructuredResult {
    pub script: String,
    pub prompt: String,
    pub video: bool,
}

/// The `report` payload is either a structured artifact (domain pipelines) or
/// a plain answer string (general pipeline and all error paths). Callers must
/// branch on shape, hence the untagged representation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Report {
    Structured(StructuredResult),
    Text(String),
}

/// Outer envelope for every answer. Invariant: all code paths, success or
/// failure, terminate in one of these; no fault crosses the service boundary
/// as anything else.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceResult {
    pub status: String,
    pub report: Report,
}

impl ServiceResult {
    pub fn success_structured(result: StructuredResult) -> Self {
        Self {
            status: "success".to_string(),
            report: Report::Structured(result),
        }
    }

    pub fn success_text(text: String) -> Self {
        Self {
            status: "success".to_string(),
            report: Report::Text(text),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: "error".to_string(),
            report: Report::Text(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// Sampling and reasoning settings for a grounded generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: i32,
    /// Turn every content-safety category off for this call.
    pub disable_safety: bool,
    /// Extended-reasoning token budget; -1 means unbounded.
    pub thinking_budget: Option<i32>,
}

// --- Vertex generative API wire format ---

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

impl GenerateRequest {
    /// Bare single-shot request: the prompt as one user turn, everything else
    /// left to API defaults.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: None,
            safety_settings: Vec::new(),
            tools: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    pub fn system_text(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: i32,
}

#[derive(Debug, Serialize, Clone)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    /// All four harm categories with filtering switched off.
    pub fn all_off() -> Vec<Self> {
        [
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_HARASSMENT",
        ]
        .iter()
        .map(|category| SafetySetting {
            category: category.to_string(),
            threshold: "OFF".to_string(),
        })
        .collect()
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct Tool {
    pub retrieval: Retrieval,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Retrieval {
    pub vertex_rag_store: VertexRagStore,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VertexRagStore {
    pub rag_resources: Vec<RagResource>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RagResource {
    pub rag_corpus: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate's parts; `None` when the
    /// response carries no usable text (empty candidates, partless content,
    /// or text-free parts such as pure reasoning chunks).
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let mut out = String::new();
        for part in &content.parts {
            if let Some(text) = &part.text {
                out.push_str(text);
            }
        }
        if out.is_empty() { None } else { Some(out) }
    }
}
