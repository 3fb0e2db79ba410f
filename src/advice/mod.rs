pub mod composer;
pub mod gemini;
pub mod models;

use gemini::GeminiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use models::{AdviceRequest, ProviderReply};

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error: {0}")]
    Api(String),
    #[error("Invalid Response")]
    InvalidResponse,
    #[error("Rate Limited")]
    RateLimited,
}

/// Boundary to the external advice-generation service. Implementations take
/// a fully composed request and return raw text plus grounding citations;
/// everything above this trait treats the service as a black box.
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &AdviceRequest) -> Result<ProviderReply, AdviceError>;
}

/// A registry or factory trait to initialize providers from config.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Option<Arc<dyn AdviceProvider>> {
        let provider_name = config.advice.provider.as_str();

        match provider_name {
            "gemini" => {
                let cfg = config.advice.gemini.as_ref()?;
                Some(Arc::new(GeminiProvider::new(
                    cfg.api_key.clone(),
                    cfg.api_base.clone(),
                    cfg.default_model.clone(),
                    cfg.location_model.clone(),
                )))
            }
            _ => None,
        }
    }
}
