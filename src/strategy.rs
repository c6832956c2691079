//! # Strategy Module
//!
//! Material classification and the static research strategy attached to each
//! material class. A strategy is a priority list of named data sources plus a
//! list of focus areas, and it only influences how prompts are worded; there
//! is no lookup or validation behind it.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// MATERIAL TYPE
// =============================================================================
/// The class of pharmaceutical material under research.
///
/// # Rust Concept: Enums
///
/// Rust enums are closed sets of variants checked at compile time.
/// Every `match` over a MaterialType must handle all four classes,
/// so adding a fifth class later is a compile error until every
/// consumer is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialType {
    /// Active Pharmaceutical Ingredient
    Api,

    /// Key Starting Material
    Ksm,

    /// Inactive formulation component
    Excipient,

    /// Process/residual solvent
    Solvent,
}

impl MaterialType {
    /// Parse free-form user input into a material type.
    ///
    /// Matching is case-insensitive and total: anything that is not a
    /// recognized class silently falls back to `Api`, which carries the
    /// broadest source list. Unknown input is a soft condition here, not
    /// an error.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "api" => Self::Api,
            "ksm" => Self::Ksm,
            "excipient" => Self::Excipient,
            "solvent" => Self::Solvent,
            _ => Self::Api,
        }
    }

    /// Canonical label used in prompts, report headers, and filenames.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::Ksm => "KSM",
            Self::Excipient => "Excipient",
            Self::Solvent => "Solvent",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// SEARCH STRATEGY
// =============================================================================
/// Static research configuration for one material class.
///
/// Both lists are `&'static` tables: they never change at runtime and are
/// never derived from model output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchStrategy {
    /// Named data sources, in priority order, cited in the prompts.
    pub priority_sources: &'static [&'static str],

    /// Research topics the prompts steer the model toward.
    pub focus_areas: &'static [&'static str],
}

const API_STRATEGY: SearchStrategy = SearchStrategy {
    priority_sources: &[
        "PubChem",
        "Google Patents",
        "PharmaCompass",
        "DrugBank",
        "Volza",
        "FDA Drug Master Files",
        "ChemSpider",
    ],
    focus_areas: &[
        "Synthesis routes and manufacturing process",
        "Patent landscape and IP considerations",
        "GMP-certified manufacturers",
        "Regulatory status (DMF, CEP)",
        "Price premiums for pharma-grade quality",
    ],
};

const KSM_STRATEGY: SearchStrategy = SearchStrategy {
    priority_sources: &[
        "Google Patents",
        "PubChem",
        "Volza",
        "ChemAnalyst",
        "ICIS",
        "Supplier directories",
    ],
    focus_areas: &[
        "Upstream raw material dependencies",
        "Chinese/Indian manufacturing dominance",
        "Patent considerations for synthesis routes",
        "Scale-up challenges",
        "Backward integration opportunities",
    ],
};

const EXCIPIENT_STRATEGY: SearchStrategy = SearchStrategy {
    priority_sources: &[
        "PharmaCompass",
        "USP/EP/JP Pharmacopeia",
        "Volza",
        "IPEC",
        "PubChem",
        "Manufacturer websites",
    ],
    focus_areas: &[
        "Pharmacopeial compliance (USP/EP/JP)",
        "Functional categories and applications",
        "Allergen and safety considerations",
        "Supply chain diversity",
        "Commodity vs specialty pricing",
    ],
};

const SOLVENT_STRATEGY: SearchStrategy = SearchStrategy {
    priority_sources: &[
        "ICH Q3C guidelines",
        "PubChem",
        "ICIS/ChemAnalyst",
        "Volza",
        "Green chemistry databases",
        "Distributor catalogs",
    ],
    focus_areas: &[
        "ICH classification (Class 1/2/3)",
        "Residual solvent limits",
        "Green chemistry alternatives",
        "Bulk commodity pricing",
        "Regional availability and logistics",
    ],
};

impl SearchStrategy {
    /// Select the strategy for a material class.
    ///
    /// Pure and total: every class maps to exactly one static table,
    /// there are no side effects and no failure modes.
    pub fn for_material(material_type: MaterialType) -> &'static SearchStrategy {
        match material_type {
            MaterialType::Api => &API_STRATEGY,
            MaterialType::Ksm => &KSM_STRATEGY,
            MaterialType::Excipient => &EXCIPIENT_STRATEGY,
            MaterialType::Solvent => &SOLVENT_STRATEGY,
        }
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_known_types() {
        assert_eq!(MaterialType::from_input("API"), MaterialType::Api);
        assert_eq!(MaterialType::from_input("ksm"), MaterialType::Ksm);
        assert_eq!(MaterialType::from_input("Excipient"), MaterialType::Excipient);
        assert_eq!(MaterialType::from_input("  solvent "), MaterialType::Solvent);
    }

    #[test]
    fn test_unknown_input_falls_back_to_api() {
        // The fallback is silent and total over arbitrary strings.
        for junk in ["", "intermediate", "api2", "🔬", "Reagent"] {
            assert_eq!(MaterialType::from_input(junk), MaterialType::Api);
        }

        let fallback = SearchStrategy::for_material(MaterialType::from_input("no-such-type"));
        let api = SearchStrategy::for_material(MaterialType::Api);
        assert_eq!(fallback.priority_sources, api.priority_sources);
        assert_eq!(fallback.focus_areas, api.focus_areas);
    }

    #[test]
    fn test_every_strategy_is_populated() {
        for mt in [
            MaterialType::Api,
            MaterialType::Ksm,
            MaterialType::Excipient,
            MaterialType::Solvent,
        ] {
            let strategy = SearchStrategy::for_material(mt);
            assert!(!strategy.priority_sources.is_empty());
            assert!(!strategy.focus_areas.is_empty());
        }
    }

    #[test]
    fn test_labels_round_trip() {
        for mt in [
            MaterialType::Api,
            MaterialType::Ksm,
            MaterialType::Excipient,
            MaterialType::Solvent,
        ] {
            assert_eq!(MaterialType::from_input(mt.label()), mt);
        }
    }
}
