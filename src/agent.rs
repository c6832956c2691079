//! # Agent Module
//!
//! The boundary to the hosted generative model. Everything behind this module
//! is "string in, string out": the pipeline hands over an assembled prompt and
//! receives the model's free-text response verbatim: no validation, no retry,
//! no parsing of the model's claims.
//!
//! The boundary is a trait so the pipeline can be exercised in tests with a
//! scripted generator instead of a live API.

use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::gemini;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

// =============================================================================
// ERROR TYPE
// =============================================================================
/// Errors produced at the model-call boundary.
///
/// # Rust Concept: Custom Error Types with thiserror
///
/// thiserror derives std::error::Error for us; each variant is one failure
/// class the caller can match on. There is deliberately no Retryable variant:
/// a failed call is fatal to the run.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("model call failed: {0}")]
    ModelCall(String),
}

// =============================================================================
// TEXT GENERATOR TRAIT
// =============================================================================
/// A one-operation generative-text capability: prompt in, text out.
///
/// # Rust Concept: async-trait
///
/// Async functions in traits need the async-trait macro (the compiler can't
/// yet box the returned futures for us in all positions). The pipeline only
/// depends on this trait, never on a concrete provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt to the model and return its textual response verbatim.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

// =============================================================================
// GEMINI-BACKED GENERATOR
// =============================================================================
/// The production generator, backed by Google Gemini through Rig.
pub struct GeminiAgent {
    /// Configuration for the agent (model name, temperature, credential)
    config: Config,
}

impl GeminiAgent {
    /// Create a new GeminiAgent with the given configuration.
    ///
    /// The credential is expected to be present in the configuration already;
    /// `Config::validate()` rejects a missing key before we get here.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TextGenerator for GeminiAgent {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        // Rig's Gemini client reads GEMINI_API_KEY from the environment.
        // The key never appears in source or on the command line.
        std::env::set_var("GEMINI_API_KEY", &self.config.api_key);

        let client = gemini::Client::from_env();

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "Dispatching prompt to Gemini"
        );

        let agent = client
            .agent(&self.config.model)
            .temperature(self.config.temperature as f64)
            .build();

        let response = agent
            .prompt(prompt)
            .await
            .map_err(|e| GenerationError::ModelCall(e.to_string()))?;

        info!(
            model = %self.config.model,
            response_chars = response.chars().count(),
            "Model response received"
        );

        Ok(response)
    }
}
