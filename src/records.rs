//! Record types exchanged between pipeline stages
//!
//! Both records are serialized as JSON Lines. Field names on the wire are
//! camelCase and fixed; the downstream classifier reads them record by record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One successfully fetched, in-scope, non-duplicate HTML page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// Final (post-redirect) canonical URL
    pub url: String,

    /// Document title, truncated
    pub title: String,

    /// Visible text with boilerplate removed and whitespace collapsed
    pub text: String,

    /// BFS distance from the seed (seed = 0)
    pub depth: u32,

    /// URL of the page this one was discovered on; `None` for the seed
    pub discovered_from: Option<String>,
}

/// Coarse candidate category, chosen by keyword priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateType {
    Metric,
    Risk,
    Roadmap,
    Adoption,
    Tokenomics,
    Security,
    Other,
}

impl CandidateType {
    /// Priority order used when assigning a type
    pub const PRIORITY: [CandidateType; 6] = [
        CandidateType::Metric,
        CandidateType::Risk,
        CandidateType::Roadmap,
        CandidateType::Adoption,
        CandidateType::Tokenomics,
        CandidateType::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Risk => "risk",
            Self::Roadmap => "roadmap",
            Self::Adoption => "adoption",
            Self::Tokenomics => "tokenomics",
            Self::Security => "security",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Independent topical tag; a candidate may carry several
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorSignal {
    Competition,
    Compliance,
    Governance,
    Market,
    Partnerships,
    PricingEconomics,
    Risk,
    Roadmap,
    Security,
    Team,
    Technology,
    Tokenomics,
    Traction,
}

impl InvestorSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Competition => "competition",
            Self::Compliance => "compliance",
            Self::Governance => "governance",
            Self::Market => "market",
            Self::Partnerships => "partnerships",
            Self::PricingEconomics => "pricing_economics",
            Self::Risk => "risk",
            Self::Roadmap => "roadmap",
            Self::Security => "security",
            Self::Team => "team",
            Self::Technology => "technology",
            Self::Tokenomics => "tokenomics",
            Self::Traction => "traction",
        }
    }
}

/// Where a candidate came from; only scraped text exists today
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Scraped,
}

/// A short, evidence-backed statement ready for downstream labeling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightCandidate {
    pub source_url: String,
    pub section: String,
    pub text: String,

    /// Original sentence(s) merged to form `text`, in page order
    pub evidence: Vec<String>,

    pub candidate_type: CandidateType,

    /// Heuristic quality in [0, 1]
    pub quality_score: f64,

    #[serde(default)]
    pub provenance: Provenance,

    /// Sorted, non-exclusive topical tags
    pub investor_signals: Vec<InvestorSignal>,
}
