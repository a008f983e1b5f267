use async_trait::async_trait;
use std::sync::Arc;

use crate::models::Category;
use crate::transport::Transport;

const MATH_KEYWORDS: [&str; 8] = [
    "calculate",
    "solve",
    "equation",
    "formula",
    "algebra",
    "geometry",
    "math",
    "arithmetic",
];

const SOCIAL_KEYWORDS: [&str; 8] = [
    "history",
    "government",
    "politics",
    "democracy",
    "president",
    "war",
    "culture",
    "geography",
];

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Assign a subject domain to the question. Never fails: a backend fault
    /// is recovered locally via keyword scoring.
    async fn classify(&self, question: &str) -> Category;
}

pub struct GenAiClassifier {
    tx: Arc<dyn Transport>,
    model: String,
}

impl GenAiClassifier {
    pub fn new(tx: Arc<dyn Transport>, model: String) -> Self {
        Self { tx, model }
    }
}

fn classification_prompt(question: &str) -> String {
    format!(
        r#"Classify this educational question into one of these categories: "math", "social_studies", or "general"

Question: "{question}"

Guidelines:
- "math" for: arithmetic, algebra, geometry, calculus, statistics, equations, formulas, calculations, mathematical concepts
- "social_studies" for: history, government, politics, geography, culture, civics, economics, civilizations, historical events, countries, leaders
- "general" for: everything else that doesn't clearly fit math or social studies

Respond with only one word: "math", "social_studies", or "general""#
    )
}

/// Map the model's reply to a category. Substring match in priority order:
/// "math" is checked before "social", so a reply containing both is math.
fn category_from_reply(reply: &str) -> Category {
    let reply = reply.trim().to_lowercase();
    if reply.contains("math") {
        Category::Math
    } else if reply.contains("social") {
        Category::SocialStudies
    } else {
        Category::General
    }
}

/// Deterministic fallback used when the classification call fails. Counts
/// keyword hits per subject; math wins ties only when strictly ahead.
fn keyword_fallback(question: &str) -> Category {
    let question_lower = question.to_lowercase();

    let math_score = MATH_KEYWORDS
        .iter()
        .filter(|k| question_lower.contains(**k))
        .count();
    let social_score = SOCIAL_KEYWORDS
        .iter()
        .filter(|k| question_lower.contains(**k))
        .count();

    if math_score > social_score {
        Category::Math
    } else if social_score > 0 {
        Category::SocialStudies
    } else {
        Category::General
    }
}

#[async_trait]
impl Classifier for GenAiClassifier {
    async fn classify(&self, question: &str) -> Category {
        match self
            .tx
            .complete(&self.model, &classification_prompt(question))
            .await
        {
            Ok(reply) => category_from_reply(&reply),
            Err(e) => {
                tracing::warn!("Classification call failed: {e} - using keyword fallback");
                keyword_fallback(question)
            }
        }
    }
}
