//! # Pipeline Module
//!
//! The seven-phase research pipeline. Each phase assembles a fixed
//! natural-language prompt, sends it to the model, and stores the free-text
//! response in the session. Phases run strictly in order because every phase
//! after the first embeds a truncated slice of the previous phase's output as
//! context.
//!
//! All per-phase metadata (titles, icons, risk badges, source tags, context
//! budgets) is declarative: a static table, never derived from model output.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::agent::{GenerationError, TextGenerator};
use crate::strategy::{MaterialType, SearchStrategy};

/// Number of research phases in a run.
pub const PHASE_COUNT: usize = 7;

// =============================================================================
// RISK LEVEL
// =============================================================================
/// Qualitative badge shown on each report card.
///
/// Statically assigned per phase; there is no classifier behind it and no
/// relation to the content of the model's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Medium,
    #[allow(dead_code)] // Valid badge value; no current phase is annotated LOW
    Low,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

// =============================================================================
// PHASE METADATA TABLE
// =============================================================================
/// Static description of one research phase.
#[derive(Debug)]
pub struct PhaseSpec {
    /// 1-based step number
    pub step: usize,

    /// Card title in the final report
    pub title: &'static str,

    /// Short label shown while the phase is executing
    pub progress_label: &'static str,

    /// Decorative icon for progress lines and cards
    pub icon: &'static str,

    /// Static risk badge for the card
    pub risk: RiskLevel,

    /// Source-name tags shown on the card
    pub sources: &'static [&'static str],

    /// Character budget for the previous phase's output embedded in this
    /// phase's prompt. Zero for step 1, which consumes no context.
    pub context_limit: usize,
}

/// The seven phases, in execution order.
pub static PHASES: [PhaseSpec; PHASE_COUNT] = [
    PhaseSpec {
        step: 1,
        title: "Material Overview & Formation",
        progress_label: "Material Overview",
        icon: "🔬",
        risk: RiskLevel::High,
        sources: &["PubChem", "Google Patents"],
        context_limit: 0,
    },
    PhaseSpec {
        step: 2,
        title: "Supply Chain Structure",
        progress_label: "Supply Chain Analysis",
        icon: "🌐",
        risk: RiskLevel::High,
        sources: &["Volza", "PharmaCompass"],
        context_limit: 1500,
    },
    PhaseSpec {
        step: 3,
        title: "Should-Cost Model",
        progress_label: "Should-Cost Model",
        icon: "💰",
        risk: RiskLevel::Medium,
        sources: &["ChemAnalyst", "ICIS"],
        context_limit: 1500,
    },
    PhaseSpec {
        step: 4,
        title: "Market Pricing Analysis",
        progress_label: "Market Pricing",
        icon: "📊",
        risk: RiskLevel::High,
        sources: &["Volza", "PharmaCompass"],
        context_limit: 1500,
    },
    PhaseSpec {
        step: 5,
        title: "HSN/HS Code Intelligence",
        progress_label: "HSN Codes",
        icon: "📋",
        risk: RiskLevel::Medium,
        sources: &["Customs Database", "Volza"],
        context_limit: 1000,
    },
    PhaseSpec {
        step: 6,
        title: "International Trade Patterns",
        progress_label: "Trade Analysis",
        icon: "🌍",
        risk: RiskLevel::High,
        sources: &["Volza", "UN Comtrade"],
        context_limit: 1000,
    },
    PhaseSpec {
        step: 7,
        title: "Qualified Suppliers",
        progress_label: "Supplier Identification",
        icon: "🏭",
        risk: RiskLevel::High,
        sources: &["PharmaCompass", "FDA DMF"],
        context_limit: 1500,
    },
];

// =============================================================================
// PROMPT ASSEMBLY
// =============================================================================
/// Truncate text to at most `limit` Unicode scalar values.
///
/// Byte slicing would panic on a multi-byte boundary, so we count chars.
fn truncate_context(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Assemble the prompt for one research phase.
///
/// Pure string formatting. Step 1 embeds the material strategy's source list
/// and consumes no prior context; steps 2..7 embed a prefix of
/// `previous_context` capped at the phase's character budget. An out-of-range
/// step yields an empty prompt rather than a panic.
pub fn build_prompt(
    step: usize,
    material_type: MaterialType,
    material_name: &str,
    previous_context: &str,
) -> String {
    let strategy = SearchStrategy::for_material(material_type);
    let context = PHASES
        .get(step.wrapping_sub(1))
        .map(|spec| truncate_context(previous_context, spec.context_limit))
        .unwrap_or_default();

    match step {
        1 => format!(
            "Research {material_type}: {material_name}\n\
             \n\
             RELIABLE SOURCES ONLY:\n\
             {}\n\
             \n\
             Provide:\n\
             1. MATERIAL DEFINITION & PROPERTIES (Chemical name, CAS, formula, properties)\n\
             2. FORMATION PROCESS & SYNTHESIS (Synthesis routes, starting materials, yields)\n\
             \n\
             Be specific, cite sources.",
            strategy.priority_sources.join(", ")
        ),

        2 => format!(
            "Analyze SUPPLY CHAIN for {material_type}: {material_name}\n\
             \n\
             Context: {context}\n\
             \n\
             Provide:\n\
             1. RAW MATERIAL SOURCING (Starting materials, geographic sources)\n\
             2. MANUFACTURING LANDSCAPE (Major countries, manufacturers, concentration)\n\
             3. SUPPLY CHAIN RISKS (Dependencies, geographic risks, regulatory barriers)\n\
             4. DISTRIBUTION CHANNELS (Lead times, MOQs)"
        ),

        3 => format!(
            "Build SHOULD-COST MODEL for {material_type}: {material_name}\n\
             \n\
             Context: {context}\n\
             \n\
             Provide:\n\
             1. RAW MATERIAL COSTS (Each material + quantity per kg)\n\
             2. MANUFACTURING COSTS (Labor, energy, equipment by region)\n\
             3. OVERHEAD & QUALITY COSTS (GMP premium, QC, regulatory)\n\
             4. TOTAL COST BUILDUP (Raw + Manufacturing + Overhead + Margin)\n\
             5. REGIONAL COST VARIATIONS"
        ),

        4 => format!(
            "Research MARKET PRICING for {material_type}: {material_name}\n\
             \n\
             Should-cost: {context}\n\
             \n\
             Sources: PharmaCompass, Volza, Supplier catalogs\n\
             \n\
             Provide:\n\
             1. MARKET PRICE RANGE (Spot, bulk, contract prices)\n\
             2. VOLZA TRADE DATA (Import prices, trends, volume tiers)\n\
             3. PRICE vs SHOULD-COST COMPARISON\n\
             4. QUALITY PREMIUMS\n\
             5. PRICING RED FLAGS"
        ),

        5 => format!(
            "Identify HSN/HS CODES for {material_type}: {material_name}\n\
             \n\
             Context: {context}\n\
             \n\
             Provide:\n\
             1. PRIMARY HSN/HS CODES (6-digit HS, 8-digit HSN, 10-digit HTS)\n\
             2. ALTERNATIVE/RELATED CODES\n\
             3. TRADE CLASSIFICATION NOTES (Tariffs, restrictions)\n\
             4. CODES TO MONITOR (Related materials)\n\
             5. TRADE DATA SEARCH STRATEGY"
        ),

        6 => format!(
            "Analyze TRADE PATTERNS for {material_type}: {material_name}\n\
             \n\
             HSN context: {context}\n\
             \n\
             Sources: Volza, UN Comtrade\n\
             \n\
             Provide:\n\
             1. TOP EXPORTING COUNTRIES (Rank, market share, prices)\n\
             2. TOP IMPORTING COUNTRIES\n\
             3. TRADE FLOWS & PATTERNS\n\
             4. MARKET CONCENTRATION ANALYSIS\n\
             5. PROCUREMENT INSIGHTS"
        ),

        7 => format!(
            "Identify SUPPLIERS for {material_type}: {material_name}\n\
             \n\
             Trade context: {context}\n\
             \n\
             Sources: PharmaCompass, FDA DMF, EMA, Volza\n\
             \n\
             Provide:\n\
             1. TIER 1 SUPPLIERS (Name, location, credentials, capacity)\n\
             2. TIER 2 SUPPLIERS (Alternatives)\n\
             3. TIER 3 SUPPLIERS (Emerging)\n\
             4. SUPPLIER EVALUATION CRITERIA\n\
             5. RED FLAGS & DUE DILIGENCE\n\
             6. PROCUREMENT RECOMMENDATIONS\n\
             \n\
             List 5-10 actual suppliers."
        ),

        _ => String::new(),
    }
}

// =============================================================================
// SESSION
// =============================================================================
/// The text output of one completed phase. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseResult {
    /// 1-based step number
    pub step: usize,

    /// The model's response, verbatim
    pub text: String,
}

/// One research run for a single (material type, material name) pair.
///
/// Created fresh at the start of each run and owned by the caller of the
/// pipeline; the renderer only ever borrows it. Results are appended in step
/// order and never rewritten.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchSession {
    pub material_type: MaterialType,
    pub material_name: String,
    results: Vec<PhaseResult>,
}

impl ResearchSession {
    pub fn new(material_type: MaterialType, material_name: impl Into<String>) -> Self {
        Self {
            material_type,
            material_name: material_name.into(),
            results: Vec::with_capacity(PHASE_COUNT),
        }
    }

    /// All completed phases, in step order.
    pub fn results(&self) -> &[PhaseResult] {
        &self.results
    }

    /// Text of a completed phase, if present.
    pub fn phase_text(&self, step: usize) -> Option<&str> {
        self.results
            .iter()
            .find(|r| r.step == step)
            .map(|r| r.text.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.results.len() == PHASE_COUNT
    }

    fn push(&mut self, result: PhaseResult) {
        self.results.push(result);
    }
}

// =============================================================================
// PIPELINE
// =============================================================================
/// Errors from the pipeline driver.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A phase's model call failed. Fatal: the run aborts, nothing is stored
    /// for the failed step and no later step executes.
    #[error("research phase {step} failed: {source}")]
    Phase {
        step: usize,
        #[source]
        source: GenerationError,
    },
}

/// Sequential driver for the seven research phases.
pub struct ResearchPipeline {
    generator: Arc<dyn TextGenerator>,

    /// Courtesy pause between phases toward the hosted service's rate limits.
    phase_delay: Duration,
}

impl ResearchPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, phase_delay: Duration) -> Self {
        Self {
            generator,
            phase_delay,
        }
    }

    /// Run phases 1..7 in strict order and return the completed session.
    ///
    /// `on_progress` is invoked just before each phase starts, so a caller
    /// can render a live "step N of 7" indicator. Each result is stored
    /// before the next phase begins; a failed phase aborts the whole run.
    pub async fn run<F>(
        &self,
        material_type: MaterialType,
        material_name: &str,
        mut on_progress: F,
    ) -> Result<ResearchSession, PipelineError>
    where
        F: FnMut(&PhaseSpec),
    {
        info!(
            material_type = %material_type,
            material_name = %material_name,
            "Starting research run"
        );

        let mut session = ResearchSession::new(material_type, material_name);

        for spec in PHASES.iter() {
            on_progress(spec);

            let prompt = {
                let previous = if spec.step > 1 {
                    session.phase_text(spec.step - 1).unwrap_or("")
                } else {
                    ""
                };
                build_prompt(spec.step, material_type, material_name, previous)
            };

            debug!(
                step = spec.step,
                label = spec.progress_label,
                prompt_chars = prompt.chars().count(),
                "Executing research phase"
            );

            let text = self
                .generator
                .generate(&prompt)
                .await
                .map_err(|source| PipelineError::Phase {
                    step: spec.step,
                    source,
                })?;

            session.push(PhaseResult {
                step: spec.step,
                text,
            });

            info!(step = spec.step, "Phase completed");

            // Rate limiting toward the hosted service
            if spec.step < PHASE_COUNT {
                tokio::time::sleep(self.phase_delay).await;
            }
        }

        info!("Research run completed");
        Ok(session)
    }
}
