use std::sync::Arc;

use crate::models::{GenerationParams, ServiceResult, StructuredResult};
use crate::transport::Transport;

/// Settings shared by both grounded pipeline calls.
const GROUNDED_PARAMS: GenerationParams = GenerationParams {
    temperature: 1.0,
    top_p: 0.95,
    max_output_tokens: 5000,
    disable_safety: true,
    thinking_budget: Some(-1),
};

pub const MATH_PERSONA: &str = "You are a math teacher's assistant. Explain every mathematical topic in detail with step-by-step solutions. Use simple, layman language that students can easily understand. Include real-world examples and applications. Break down complex concepts into digestible parts.";

pub const SOCIAL_PERSONA: &str = "You are a social studies teacher's assistant. Explain every historical, geographical, political, and cultural topic in detail using storytelling and engaging narratives. Use simple, layman language that students can easily understand. Connect historical events to modern-day relevance. Make complex social concepts relatable through real-world examples and analogies.";

const MATH_PROMPT_SUFFIX: &str = "Solve this step-by-step, showing all work and explaining each mathematical concept used. Include formulas, calculations, and verify your answer.";

const SOCIAL_PROMPT_SUFFIX: &str = "Provide a comprehensive answer covering historical context, cultural significance, key figures involved, causes and effects, and modern relevance. Use storytelling to make it engaging.";

/// Everything that distinguishes one grounded subject pipeline from another.
/// The math and social-studies pipelines are the same machinery instantiated
/// with two of these.
#[derive(Debug, Clone)]
pub struct DomainProfile {
    /// Short name used in log lines and error reports ("math", "social studies").
    pub name: &'static str,
    pub persona: &'static str,
    pub prompt_suffix: &'static str,
    pub needs_video: bool,
    pub corpus_id: String,
}

impl DomainProfile {
    pub fn math(corpus_id: String) -> Self {
        Self {
            name: "math",
            persona: MATH_PERSONA,
            prompt_suffix: MATH_PROMPT_SUFFIX,
            needs_video: false,
            corpus_id,
        }
    }

    pub fn social_studies(corpus_id: String) -> Self {
        Self {
            name: "social studies",
            persona: SOCIAL_PERSONA,
            prompt_suffix: SOCIAL_PROMPT_SUFFIX,
            needs_video: true,
            corpus_id,
        }
    }
}

/// Retrieval-grounded pipeline for one subject domain: one grounded streaming
/// call, then structuring of the buffered explanation into a teaching
/// artifact.
pub struct DomainPipeline {
    tx: Arc<dyn Transport>,
    model: String,
    profile: DomainProfile,
}

impl DomainPipeline {
    pub fn new(tx: Arc<dyn Transport>, model: String, profile: DomainProfile) -> Self {
        Self { tx, model, profile }
    }

    pub async fn handle(&self, question: &str) -> ServiceResult {
        tracing::info!("{} question: {}", self.profile.name, question);

        match self
            .tx
            .complete_grounded(
                &self.model,
                question,
                &self.profile.corpus_id,
                self.profile.persona,
                &GROUNDED_PARAMS,
            )
            .await
        {
            Ok(raw) => ServiceResult::success_structured(synthesize(question, &raw, &self.profile)),
            Err(e) => {
                tracing::error!("{} pipeline retrieval failed: {e}", self.profile.name);
                ServiceResult::error(format!("Error in {} helper: {e}", self.profile.name))
            }
        }
    }
}

/// Turn a raw grounded explanation into the fixed-shape teaching artifact.
/// The script is the explanation verbatim; a second summarization round-trip
/// is deliberately not made. A retrieval that succeeded but yielded no usable
/// text is a synthesis fault and degrades to placeholder fields rather than
/// surfacing an error.
fn synthesize(question: &str, raw: &str, profile: &DomainProfile) -> StructuredResult {
    if raw.trim().is_empty() {
        tracing::warn!(
            "{} pipeline produced no usable text - returning degraded artifact",
            profile.name
        );
        return degraded_result(question);
    }

    StructuredResult {
        script: raw.to_string(),
        prompt: format!("{question}\n\n{}", profile.prompt_suffix),
        video: profile.needs_video,
    }
}

fn degraded_result(question: &str) -> StructuredResult {
    StructuredResult {
        script: "Could not generate a detailed script.".to_string(),
        prompt: format!("{question}\n\nCould not generate a detailed prompt."),
        video: false,
    }
}

/// Pass-through pipeline for questions outside both subject domains: the raw
/// question as the whole prompt, no retrieval, no persona, reply returned as
/// a plain string report.
pub struct GeneralPipeline {
    tx: Arc<dyn Transport>,
    model: String,
}

impl GeneralPipeline {
    pub fn new(tx: Arc<dyn Transport>, model: String) -> Self {
        Self { tx, model }
    }

    pub async fn handle(&self, question: &str) -> ServiceResult {
        tracing::info!("general question: {}", question);

        match self.tx.complete(&self.model, question).await {
            Ok(text) => ServiceResult::success_text(text),
            Err(e) => {
                tracing::error!("general pipeline call failed: {e}");
                ServiceResult::error(format!("Error in general AI helper: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TutorGatewayError};
    use crate::models::Report;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // Mock Transport for testing
    struct MockTransport {
        grounded: Mutex<Vec<Result<String>>>,
        single: Mutex<Vec<Result<String>>>,
    }

    impl MockTransport {
        fn grounded(responses: Vec<Result<String>>) -> Self {
            MockTransport {
                grounded: Mutex::new(responses),
                single: Mutex::new(Vec::new()),
            }
        }

        fn single(responses: Vec<Result<String>>) -> Self {
            MockTransport {
                grounded: Mutex::new(Vec::new()),
                single: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn complete(&self, _model: &str, _prompt: &str) -> Result<String> {
            self.single
                .lock()
                .expect("Mock transport mutex should not be poisoned")
                .pop()
                .unwrap_or_else(|| {
                    Err(TutorGatewayError::Internal(
                        "No more mock responses".to_string(),
                    ))
                })
        }

        async fn complete_grounded(
            &self,
            _model: &str,
            _prompt: &str,
            _corpus_id: &str,
            _system_instruction: &str,
            params: &GenerationParams,
        ) -> Result<String> {
            assert!(params.disable_safety);
            assert_eq!(params.max_output_tokens, 5000);
            self.grounded
                .lock()
                .expect("Mock transport mutex should not be poisoned")
                .pop()
                .unwrap_or_else(|| {
                    Err(TutorGatewayError::Internal(
                        "No more mock responses".to_string(),
                    ))
                })
        }
    }

    fn math_pipeline(responses: Vec<Result<String>>) -> DomainPipeline {
        DomainPipeline::new(
            Arc::new(MockTransport::grounded(responses)),
            "rag-model".to_string(),
            DomainProfile::math("projects/p/locations/l/ragCorpora/1".to_string()),
        )
    }

    fn social_pipeline(responses: Vec<Result<String>>) -> DomainPipeline {
        DomainPipeline::new(
            Arc::new(MockTransport::grounded(responses)),
            "rag-model".to_string(),
            DomainProfile::social_studies("projects/p/locations/l/ragCorpora/2".to_string()),
        )
    }

    #[tokio::test]
    async fn test_math_pipeline_structures_explanation() {
        let pipeline = math_pipeline(vec![Ok("x = 2 or x = -2, because...".to_string())]);
        let result = pipeline.handle("Solve x^2 - 4 = 0").await;

        assert_eq!(result.status, "success");
        let Report::Structured(structured) = result.report else {
            panic!("expected structured report");
        };
        assert_eq!(structured.script, "x = 2 or x = -2, because...");
        assert_eq!(
            structured.prompt,
            "Solve x^2 - 4 = 0\n\nSolve this step-by-step, showing all work and explaining each mathematical concept used. Include formulas, calculations, and verify your answer."
        );
        assert!(!structured.video);
    }

    #[tokio::test]
    async fn test_social_pipeline_sets_video() {
        let pipeline = social_pipeline(vec![Ok("Once upon a time...".to_string())]);
        let result = pipeline.handle("Who was the first president?").await;

        assert_eq!(result.status, "success");
        let Report::Structured(structured) = result.report else {
            panic!("expected structured report");
        };
        assert!(structured.video);
        assert!(structured.prompt.ends_with("Use storytelling to make it engaging."));
    }

    #[tokio::test]
    async fn test_math_pipeline_surfaces_retrieval_fault() {
        let pipeline = math_pipeline(vec![Err(TutorGatewayError::Api("corpus gone".to_string()))]);
        let result = pipeline.handle("Solve x^2 - 4 = 0").await;

        assert!(result.is_error());
        let Report::Text(message) = result.report else {
            panic!("expected text report");
        };
        assert!(message.starts_with("Error in math helper: "));
        assert!(message.contains("corpus gone"));
    }

    #[tokio::test]
    async fn test_social_pipeline_error_names_domain() {
        let pipeline = social_pipeline(vec![Err(TutorGatewayError::Api("down".to_string()))]);
        let result = pipeline.handle("describe the war").await;

        assert!(result.is_error());
        let Report::Text(message) = result.report else {
            panic!("expected text report");
        };
        assert!(message.starts_with("Error in social studies helper: "));
    }

    #[tokio::test]
    async fn test_empty_explanation_degrades_without_error() {
        let pipeline = social_pipeline(vec![Ok(String::new())]);
        let result = pipeline.handle("Who was Napoleon?").await;

        // Synthesis faults never surface as errors; the degraded placeholder
        // artifact comes back success-shaped.
        assert_eq!(result.status, "success");
        let Report::Structured(structured) = result.report else {
            panic!("expected structured report");
        };
        assert_eq!(structured.script, "Could not generate a detailed script.");
        assert_eq!(
            structured.prompt,
            "Who was Napoleon?\n\nCould not generate a detailed prompt."
        );
        assert!(!structured.video);
    }

    #[tokio::test]
    async fn test_general_pipeline_plain_text_report() {
        let pipeline = GeneralPipeline::new(
            Arc::new(MockTransport::single(vec![Ok("Here is a joke.".to_string())])),
            "flash-model".to_string(),
        );
        let result = pipeline.handle("tell me a joke").await;

        assert_eq!(result.status, "success");
        assert_eq!(result.report, Report::Text("Here is a joke.".to_string()));
    }

    #[tokio::test]
    async fn test_general_pipeline_error_shape() {
        let pipeline = GeneralPipeline::new(
            Arc::new(MockTransport::single(vec![Err(TutorGatewayError::Api(
                "quota exceeded".to_string(),
            ))])),
            "flash-model".to_string(),
        );
        let result = pipeline.handle("tell me a joke").await;

        assert!(result.is_error());
        let Report::Text(message) = result.report else {
            panic!("expected text report");
        };
        assert!(message.starts_with("Error in general AI helper: "));
        assert!(message.contains("quota exceeded"));
    }
}
