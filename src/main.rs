//! # Pharma Research Agent
//!
//! AI-powered procurement intelligence for pharmaceutical materials, built
//! with the Rig framework.
//!
//! Given a material type and name, the agent runs seven ordered research
//! phases against Google Gemini (overview, supply chain, should-cost,
//! pricing, HSN codes, trade patterns, suppliers), chaining each phase's
//! output into the next prompt, then renders the findings as report cards
//! and writes a plain-text report file.
//!
//! ## Quick Start
//! ```bash
//! export GEMINI_API_KEY=...
//! cargo run -- API Ibuprofen
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Configuration management
mod config;

/// The model-call boundary (TextGenerator + Gemini implementation)
mod agent;

/// The seven-phase research pipeline
mod pipeline;

/// Report cards and plain-text export
mod report;

/// Material types and per-type research strategies
mod strategy;

// =============================================================================
// IMPORTS
// =============================================================================
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::agent::GeminiAgent;
use crate::config::Config;
use crate::pipeline::{ResearchPipeline, PHASE_COUNT};
use crate::report::{export_filename, render_cards, render_export};
use crate::strategy::{MaterialType, SearchStrategy};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
/// # Rust Concept: Derive Macros with Clap
///
/// Clap's derive feature lets us define CLI arguments as a struct; the
/// macros generate the parsing code, --help, and --version for us.
#[derive(Parser, Debug)]
#[command(
    name = "pharma-research-agent",
    version = "0.1.0",
    about = "AI-powered procurement research for pharmaceutical materials",
    long_about = r#"
Pharma Research Agent - procurement intelligence from a single command.

Runs a seven-phase research sequence against Google Gemini:
  1. Material Overview      5. HSN Codes
  2. Supply Chain Analysis  6. Trade Analysis
  3. Should-Cost Model      7. Supplier Identification
  4. Market Pricing

Each phase feeds a truncated slice of the previous phase's findings into the
next prompt. Results are rendered as report cards and saved as a plain-text
report file.

PREREQUISITES:
  Set GEMINI_API_KEY in the environment or in a local .env file.

EXAMPLES:
  # Research an active pharmaceutical ingredient
  pharma-research-agent API Ibuprofen

  # An unknown material type silently falls back to the API strategy
  pharma-research-agent intermediate "6-APA"

  # Slow down between phases and pick a different model
  pharma-research-agent --delay-ms 3000 -m gemini-1.5-pro Solvent Ethanol
"#
)]
struct Args {
    /// Material class: API, KSM, Excipient, or Solvent.
    /// Anything else falls back to the API strategy.
    #[arg(value_name = "MATERIAL_TYPE")]
    material_type: String,

    /// Name of the material to research (e.g., Ibuprofen, Paracetamol)
    #[arg(value_name = "MATERIAL_NAME")]
    material_name: String,

    /// The Gemini model to use (overrides GEMINI_MODEL env var)
    #[arg(short = 'm', long = "model", env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Pause between research phases, in milliseconds
    #[arg(long = "delay-ms", value_name = "MS")]
    delay_ms: Option<u64>,

    /// Where to write the report (defaults to a name derived from the run)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Skip writing the report file
    #[arg(long = "no-export", default_value = "false")]
    no_export: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    // Clap handles --help, --version, and error messages automatically
    let args = Args::parse();

    // A run without a material name never starts.
    if args.material_name.trim().is_empty() {
        eprintln!("Material name must not be empty.");
        std::process::exit(2);
    }

    // Initialize logging
    init_logging(args.verbose)?;

    info!("Pharma Research Agent starting up...");

    // Load configuration from environment/.env file
    let mut config = Config::from_env()?;

    // Command-line flags win over environment values
    if let Some(model) = args.model {
        info!(model = %model, "Using model from command line");
        config.model = model;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.phase_delay_ms = delay_ms;
    }

    // Validate configuration
    config.validate()?;

    // Unknown types are substituted silently, by design.
    let material_type = MaterialType::from_input(&args.material_type);
    let material_name = args.material_name.trim().to_string();

    let strategy = SearchStrategy::for_material(material_type);
    info!(
        sources = ?strategy.priority_sources,
        focus_areas = ?strategy.focus_areas,
        "Search strategy selected"
    );

    info!(
        model = %config.model,
        material_type = %material_type,
        material_name = %material_name,
        delay_ms = config.phase_delay_ms,
        "Configuration loaded"
    );

    // Wire the pipeline to the live Gemini backend
    let phase_delay = config.phase_delay();
    let generator = Arc::new(GeminiAgent::new(config));
    let pipeline = ResearchPipeline::new(generator, phase_delay);

    println!("🔬 Researching {material_type}: {material_name}\n");

    // Execute the run with a live progress indicator
    let result = pipeline
        .run(material_type, &material_name, |spec| {
            println!(
                "{} Step {}/{PHASE_COUNT} ({}%): {}...",
                spec.icon,
                spec.step,
                spec.step * 100 / PHASE_COUNT,
                spec.progress_label
            );
        })
        .await;

    // Handle the result
    let session = match result {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Research run failed");

            // Give helpful suggestions based on common errors
            eprintln!("\n❌ Research failed: {e}");

            let message = e.to_string();
            if message.contains("API key") || message.contains("401") {
                eprintln!("\n💡 Tip: Check that GEMINI_API_KEY is set and valid.");
            } else if message.contains("model") || message.contains("404") {
                eprintln!("\n💡 Tip: Check the model name (e.g., gemini-2.0-flash-exp).");
            }

            // Return the error to set non-zero exit code
            return Err(e.into());
        }
    };

    if session.is_complete() {
        println!("\n✅ Research completed!\n");
    }

    // Final card view
    println!("{}", "=".repeat(80));
    println!("RESEARCH RESULTS");
    println!("{}\n", "=".repeat(80));
    println!("{}", render_cards(&session));

    // Plain-text export
    if !args.no_export {
        let now = Local::now();
        let path = args
            .output
            .unwrap_or_else(|| PathBuf::from(export_filename(&session, now.date_naive())));
        let report = render_export(&session, now);

        std::fs::write(&path, report)
            .with_context(|| format!("failed to write report to {}", path.display()))?;

        info!(path = %path.display(), "Report written");
        println!("📥 Full report saved to {}", path.display());
    }

    info!("Research completed successfully");
    Ok(())
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Initialize the tracing subscriber for structured logging.
fn init_logging(verbose: bool) -> Result<()> {
    // Set log level based on verbose flag
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    // # Rust Concept: Builder Pattern
    // Many Rust libraries use builders for configuration.
    // Each method modifies the builder and returns it for chaining.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true) // Show the module that logged
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    // Set as the global default
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}

// =============================================================================
// INTEGRATION TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["test", "API", "Ibuprofen"]);
        assert_eq!(args.material_type, "API");
        assert_eq!(args.material_name, "Ibuprofen");
        assert!(!args.no_export);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_with_flags() {
        let args = Args::parse_from([
            "test",
            "--verbose",
            "--no-export",
            "--delay-ms",
            "2500",
            "--model",
            "gemini-1.5-pro",
            "Solvent",
            "Ethanol",
        ]);

        assert_eq!(args.material_type, "Solvent");
        assert_eq!(args.material_name, "Ethanol");
        assert!(args.verbose);
        assert!(args.no_export);
        assert_eq!(args.delay_ms, Some(2500));
        assert_eq!(args.model, Some("gemini-1.5-pro".to_string()));
    }

    #[test]
    fn test_unknown_material_type_is_accepted() {
        // The type is a free string at the CLI; parsing falls back later.
        let args = Args::parse_from(["test", "intermediate", "6-APA"]);
        assert_eq!(
            MaterialType::from_input(&args.material_type),
            MaterialType::Api
        );
    }
}
