//! # Configuration Module
//!
//! This module handles loading and managing configuration from environment
//! variables. The API credential is never embedded in source: it comes from
//! `GEMINI_API_KEY` in the process environment or a local `.env` file.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
/// Main configuration for the research agent.
///
/// # Rust Concept: Structs
/// Structs are Rust's way of creating custom data types. Each field has a
/// name and a type; there is no inheritance. Debug lets us print the struct
/// with {:?}, Clone creates a deep copy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API credential (from GEMINI_API_KEY; required to run)
    pub api_key: String,

    /// The Gemini model to use (e.g., "gemini-2.0-flash-exp")
    pub model: String,

    /// Temperature for model responses (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Pause between research phases, in milliseconds.
    /// A courtesy rate limit toward the hosted service, not adaptive.
    pub phase_delay_ms: u64,

    /// Log level for the application
    pub log_level: String,
}

// =============================================================================
// DEFAULT IMPLEMENTATION
// =============================================================================
/// # Rust Concept: The Default Trait
///
/// Default provides a baseline value that env vars and CLI flags then
/// override. The api_key default is empty on purpose: validate() turns a
/// missing credential into a clear startup error instead of a confusing
/// HTTP 401 seven prompts in.
impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),

            // Fast, inexpensive model suited to long free-text research output
            model: "gemini-2.0-flash-exp".to_string(),

            // Moderate temperature - balanced between creativity and focus
            temperature: 0.7,

            // One second between phases
            phase_delay_ms: 1_000,

            // Info level logging by default
            log_level: "info".to_string(),
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Rust Concept: The ? Operator
    ///
    /// `?` propagates errors to the caller: if a parse fails, the function
    /// returns early with that error (plus the .context() message).
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (silently ignore if not found)
        // This is useful for local development
        let _ = dotenvy::dotenv();

        // Start with default values
        let mut config = Config::default();

        // Override with environment variables if set
        if let Ok(val) = env::var("GEMINI_API_KEY") {
            config.api_key = val;
        }

        if let Ok(val) = env::var("GEMINI_MODEL") {
            config.model = val;
        }

        // Parse temperature from string to f32
        // .context() adds helpful error messages when things fail
        if let Ok(val) = env::var("TEMPERATURE") {
            config.temperature = val
                .parse()
                .context("TEMPERATURE must be a valid floating-point number (e.g., 0.7)")?;
        }

        if let Ok(val) = env::var("PHASE_DELAY_MS") {
            config.phase_delay_ms = val
                .parse()
                .context("PHASE_DELAY_MS must be a non-negative integer (milliseconds)")?;
        }

        if let Ok(val) = env::var("RUST_LOG") {
            config.log_level = val;
        }

        Ok(config)
    }

    /// The inter-phase pause as a Duration.
    pub fn phase_delay(&self) -> Duration {
        Duration::from_millis(self.phase_delay_ms)
    }

    /// Validate the configuration.
    ///
    /// It's better to fail fast with a clear error than to fail later with a
    /// confusing one!
    pub fn validate(&self) -> Result<()> {
        // Must have a credential before any model call
        if self.api_key.is_empty() {
            anyhow::bail!(
                "GEMINI_API_KEY is not set. Export it or add it to a .env file."
            );
        }

        // Temperature must be between 0 and 2 (Gemini accepts up to 2.0)
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "Temperature must be between 0.0 and 2.0, got: {}",
                self.temperature
            );
        }

        // Model name can't be empty
        if self.model.is_empty() {
            anyhow::bail!("GEMINI_MODEL cannot be empty");
        }

        Ok(())
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.model, "gemini-2.0-flash-exp");
        assert!(config.api_key.is_empty());
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.phase_delay_ms, 1_000);
        assert_eq!(config.phase_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_validation_requires_api_key() {
        let config = Config::default();
        // Default has no credential, so validation must fail
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api_key = "test-key".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_temperature() {
        let mut config = Config::default();
        config.api_key = "test-key".to_string();
        config.temperature = 3.0; // Invalid: above 2.0
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let mut config = Config::default();
        config.api_key = "test-key".to_string();
        config.model = String::new();
        assert!(config.validate().is_err());
    }
}
