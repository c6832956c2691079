//! # Report Module
//!
//! Presentation layer: turns a completed research session into titled report
//! cards for the terminal and a flat plain-text export document. Rendering is
//! read-only (the session is borrowed, never mutated) and degrades gracefully
//! when the model's output lacks the expected structure.

use chrono::{DateTime, Local, NaiveDate};

use crate::pipeline::{PhaseSpec, ResearchSession, PHASES};

/// Literal marker the prompts nudge the model toward. Everything before it is
/// rendered as "Analysis", everything after as "Key Insights".
pub const KEY_INSIGHTS_MARKER: &str = "Key Insights:";

/// Width of the rule lines in cards and the export document.
const RULE_WIDTH: usize = 80;

// =============================================================================
// MARKER SPLITTING
// =============================================================================
/// Split a phase's text at the first `"Key Insights:"` marker.
///
/// Returns the analysis slice and, when the marker is present, the remainder
/// after it. The split is lossless: `analysis + marker + insights` reproduces
/// the original text exactly. A missing marker is not an error; the whole
/// text is analysis.
pub fn split_insights(text: &str) -> (&str, Option<&str>) {
    match text.find(KEY_INSIGHTS_MARKER) {
        Some(idx) => (
            &text[..idx],
            Some(&text[idx + KEY_INSIGHTS_MARKER.len()..]),
        ),
        None => (text, None),
    }
}

// =============================================================================
// CARD RENDERING
// =============================================================================
/// Render one report card for a completed phase.
fn render_card(spec: &PhaseSpec, text: &str) -> String {
    let (analysis, insights) = split_insights(text);

    let mut card = String::new();
    card.push_str(&"-".repeat(RULE_WIDTH));
    card.push('\n');
    card.push_str(&format!(
        "{} {}  [{}]\n",
        spec.icon,
        spec.title,
        spec.risk.label()
    ));
    card.push_str(&format!(
        "{} source(s) • Multiple insights\n\n",
        spec.sources.len()
    ));

    card.push_str("Analysis:\n");
    card.push_str(analysis.trim());
    card.push('\n');

    if let Some(insights) = insights {
        card.push_str("\nKey Insights:\n");
        card.push_str(insights.trim());
        card.push('\n');
    }

    card.push_str(&format!("\nData Sources: {}\n", spec.sources.join(", ")));
    card
}

/// Render the full card view for every completed phase, in step order.
pub fn render_cards(session: &ResearchSession) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Market Intelligence: {}\n",
        session.material_name
    ));
    out.push_str(
        "Comprehensive analysis covering formation, supply chain, pricing, \
         trade patterns, and qualified suppliers.\n\n",
    );

    for result in session.results() {
        if let Some(spec) = PHASES.get(result.step - 1) {
            out.push_str(&render_card(spec, &result.text));
            out.push('\n');
        }
    }
    out
}

// =============================================================================
// PLAIN-TEXT EXPORT
// =============================================================================
/// Render the downloadable report document.
///
/// A fixed banner, the run's identifiers and generation timestamp, then one
/// section per completed phase: the UPPERCASE title, an 80-character rule,
/// and the raw phase text, unmodified.
pub fn render_export(session: &ResearchSession, generated_at: DateTime<Local>) -> String {
    let rule = "=".repeat(RULE_WIDTH);

    let mut report = format!(
        "\nPHARMA PROCUREMENT RESEARCH REPORT\n\
         {rule}\n\
         \n\
         Material Type: {}\n\
         Material Name: {}\n\
         Report Generated: {}\n\
         \n\
         {rule}\n\
         \n",
        session.material_type,
        session.material_name,
        generated_at.format("%Y-%m-%d %H:%M:%S"),
    );

    for result in session.results() {
        if let Some(spec) = PHASES.get(result.step - 1) {
            report.push_str(&format!(
                "\n{}\n{rule}\n{}\n\n",
                spec.title.to_uppercase(),
                result.text
            ));
        }
    }

    report
}

/// Deterministic export filename: material type, material name, run date.
pub fn export_filename(session: &ResearchSession, date: NaiveDate) -> String {
    format!(
        "pharma_research_{}_{}_{}.txt",
        session.material_type,
        session.material_name,
        date.format("%Y%m%d")
    )
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::MaterialType;
    use chrono::TimeZone;

    fn session_with(texts: &[&str]) -> ResearchSession {
        // Sessions are only populated through the pipeline, so tests replay
        // a scripted generator through it.
        use crate::agent::{GenerationError, TextGenerator};
        use crate::pipeline::ResearchPipeline;
        use async_trait::async_trait;
        use std::sync::{Arc, Mutex};
        use std::time::Duration;

        struct Replay {
            texts: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl TextGenerator for Replay {
            async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
                Ok(self.texts.lock().unwrap().remove(0))
            }
        }

        // Pad the script to a full run; callers inspect only their phases.
        let mut script: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        while script.len() < crate::pipeline::PHASE_COUNT {
            script.push(format!("filler {}", script.len() + 1));
        }

        let generator = Arc::new(Replay {
            texts: Mutex::new(script),
        });
        let pipeline = ResearchPipeline::new(generator, Duration::ZERO);

        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(pipeline.run(MaterialType::Api, "Ibuprofen", |_| {}))
            .unwrap()
    }

    #[test]
    fn test_split_insights_round_trips() {
        let text = "Analysis of routes.\n\nKey Insights: high concentration in two regions.";
        let (analysis, insights) = split_insights(text);
        let insights = insights.expect("marker present");
        assert_eq!(
            format!("{analysis}{KEY_INSIGHTS_MARKER}{insights}"),
            text
        );
    }

    #[test]
    fn test_split_insights_without_marker() {
        let text = "Plain analysis only, no structured insights.";
        let (analysis, insights) = split_insights(text);
        assert_eq!(analysis, text);
        assert!(insights.is_none());
    }

    #[test]
    fn test_card_omits_insights_block_when_marker_absent() {
        let session = session_with(&["Only analysis here."]);
        let cards = render_cards(&session);
        assert!(cards.contains("Analysis:\nOnly analysis here."));
        // The filler phases contain no marker either, so no card may
        // carry an insights block.
        assert!(!cards.contains("\nKey Insights:\n"));
    }

    #[test]
    fn test_card_renders_both_blocks_when_marker_present() {
        let session =
            session_with(&["Synthesis routes. Key Insights: two GMP plants dominate."]);
        let cards = render_cards(&session);
        assert!(cards.contains("Analysis:\nSynthesis routes."));
        assert!(cards.contains("Key Insights:\ntwo GMP plants dominate."));
        assert!(cards.contains("🔬 Material Overview & Formation  [HIGH]"));
        assert!(cards.contains("Data Sources: PubChem, Google Patents"));
    }

    #[test]
    fn test_export_round_trip() {
        let texts = [
            "overview text",
            "supply chain text",
            "should-cost text",
            "pricing text",
            "hsn text",
            "trade text",
            "supplier text",
        ];
        let session = session_with(&texts);
        let generated_at = Local.with_ymd_and_hms(2026, 8, 23, 10, 30, 0).unwrap();
        let export = render_export(&session, generated_at);

        assert!(export.starts_with("\nPHARMA PROCUREMENT RESEARCH REPORT"));
        assert!(export.contains("Material Type: API"));
        assert!(export.contains("Material Name: Ibuprofen"));
        assert!(export.contains("Report Generated: 2026-08-23 10:30:00"));

        let rule = "=".repeat(80);
        for (spec, text) in PHASES.iter().zip(texts.iter()) {
            // Each section header is immediately followed by its rule and
            // the phase text, unmodified.
            let section = format!("{}\n{rule}\n{}\n", spec.title.to_uppercase(), text);
            assert_eq!(export.matches(&section).count(), 1);
        }

        // Exactly seven section headers: seven rules after the two banner ones.
        assert_eq!(export.matches(&rule).count(), 2 + PHASES.len());
    }

    #[test]
    fn test_export_filename_is_deterministic() {
        let session = session_with(&["x"]);
        let date = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(
            export_filename(&session, date),
            "pharma_research_API_Ibuprofen_20260823.txt"
        );
    }
}
