pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod pipeline;
pub mod transport;

use std::sync::Arc;

use crate::classify::{Classifier, GenAiClassifier};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Category, ServiceResult};
use crate::pipeline::{DomainPipeline, DomainProfile, GeneralPipeline};
use crate::transport::{GenAiTransport, Transport};

/// The routing core: classify the question, dispatch to the matching
/// pipeline, return its result unchanged. Stateless across requests.
pub struct TutorService {
    classifier: Box<dyn Classifier>,
    math: DomainPipeline,
    social: DomainPipeline,
    general: GeneralPipeline,
}

impl TutorService {
    /// Wire the production transport into all four components. The transport
    /// is constructed once here and shared; components never build their own
    /// clients.
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(GenAiTransport::new(&cfg.genai)?);
        Ok(Self::with_transport(transport, cfg))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, cfg: &Config) -> Self {
        let classifier = GenAiClassifier::new(
            Arc::clone(&transport),
            cfg.genai.classify_model.clone(),
        );

        let math = DomainPipeline::new(
            Arc::clone(&transport),
            cfg.genai.rag_model.clone(),
            DomainProfile::math(cfg.genai.math_corpus.clone()),
        );

        let social = DomainPipeline::new(
            Arc::clone(&transport),
            cfg.genai.rag_model.clone(),
            DomainProfile::social_studies(cfg.genai.social_corpus.clone()),
        );

        let general = GeneralPipeline::new(transport, cfg.genai.classify_model.clone());

        Self {
            classifier: Box::new(classifier),
            math,
            social,
            general,
        }
    }

    pub async fn answer(&self, question: &str) -> ServiceResult {
        let category = self.classifier.classify(question).await;
        tracing::info!("Question classified as: {}", category.as_str());

        match category {
            Category::Math => self.math.handle(question).await,
            Category::SocialStudies => self.social.handle(question).await,
            Category::General => self.general.handle(question).await,
        }
    }
}
