//! Domain vocabulary and pattern banks shared by the extractor and scorer

use crate::records::{CandidateType, InvestorSignal};
use regex::Regex;
use std::sync::LazyLock;

/// Domain keywords, matched as lowercase substrings
pub const DOMAIN_KEYWORDS: &[&str] = &[
    "restake",
    "restaking",
    "validator",
    "staking",
    "operator",
    "slashing",
    "slash",
    "delegation",
    "delegate",
    "governance",
    "emission",
    "incentive",
    "tokenomics",
    "audit",
    "audited",
    "security",
    "protocol",
    "slashed",
    "risk",
    "uncertainty",
    "penalty",
    "penalties",
    "rewards",
    "reward",
    "stake",
    "tvl",
    "collateral",
    "eigenlayer",
    "eigen",
    "avs",
    "restaked",
    "delegator",
    "delegators",
    "operator set",
    "actively validated service",
];

/// Phrases marking a line as site chrome rather than content
pub const NOISE_PHRASES: &[&str] = &[
    "accept cookies",
    "subscribe to",
    "newsletter",
    "back to top",
    "all rights reserved",
    "privacy policy",
    "terms of service",
    "follow us",
    "cookie settings",
    "sign up",
    "log in",
    "javascript is not essential",
    "please turn javascript on",
    "enable javascript",
];

/// Windows-1252 mojibake of common UTF-8 punctuation and its repair
pub const MOJIBAKE: &[(&str, &str)] = &[
    ("\u{e2}\u{20ac}\u{2122}", "'"),
    ("\u{e2}\u{20ac}\u{2dc}", "'"),
    ("\u{e2}\u{20ac}\u{153}", "\""),
    ("\u{e2}\u{20ac}\u{9d}", "\""),
    ("\u{e2}\u{20ac}\u{201c}", "-"),
    ("\u{e2}\u{20ac}\u{201d}", "-"),
    ("\u{e2}\u{20ac}\u{a2}", "-"),
    ("\u{c2}\u{a9}", "\u{a9}"),
];

/// Numbers, percentages, and four-digit years
pub static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\b\d{1,3}(?:,\d{3})*(?:\.\d+)?%?\b|\b\d+%\b|\b\d{4}\b)").expect("valid regex")
});

/// Marketing superlatives that disqualify a sentence
pub static FLUFF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)world[- ]class|pioneer|innovative|cutting-edge|revolutionary|paradigm")
        .expect("valid regex")
});

/// Four-digit years from 1900 to 2199
pub static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20|21)\d{2}\b").expect("valid regex"));

/// Candidate type rules in priority order
pub static TYPE_RULES: LazyLock<Vec<(CandidateType, Regex)>> = LazyLock::new(|| {
    let rules: [(CandidateType, &[&str]); 6] = [
        (
            CandidateType::Metric,
            &[
                r"\b(users?|wallets?|validators?|tvl|apy|apr|throughput|latency|max tps|transactions?)\b",
                r"\b\d{1,3}(?:,\d{3})*(?:\.\d+)?%?\b",
            ],
        ),
        (
            CandidateType::Risk,
            &[
                r"\brisks?\b",
                r"\b(exploit|hack|outage|slashing|penalt(y|ies)|uncertaint(y|ies))\b",
            ],
        ),
        (
            CandidateType::Roadmap,
            &[
                r"\b(q[1-4]\s*20\d{2})\b",
                r"\b(launch|ship|release|upgrade|milestone)\b",
            ],
        ),
        (
            CandidateType::Adoption,
            &[r"\b(partner(ship)?|integration|adopt(ed|ion)|listing|exchange)\b"],
        ),
        (
            CandidateType::Tokenomics,
            &[r"\b(emission|emissions|inflation|supply|burn|vesting|unlock|tokenomics)\b"],
        ),
        (
            CandidateType::Security,
            &[r"\b(audit(ed)?|auditor|security|formal verification|bug bounty)\b"],
        ),
    ];

    rules
        .into_iter()
        .map(|(kind, patterns)| {
            let joined = format!("(?i)(?:{})", patterns.join("|"));
            (kind, Regex::new(&joined).expect("valid regex"))
        })
        .collect()
});

/// Investor signal bank; every matching category is reported
pub static INVESTOR_SIGNALS: LazyLock<Vec<(InvestorSignal, Regex)>> = LazyLock::new(|| {
    let bank: [(InvestorSignal, &str); 13] = [
        (
            InvestorSignal::Traction,
            r"\b(users?|wallets?|validators?|tvl|volume|delegat|adoption|growth|retention|cohort)\b",
        ),
        (
            InvestorSignal::PricingEconomics,
            r"\b(revenue|fees?|apy|yield|margin|pricing|cost|take rate|moneti[sz]ation|economic model)\b",
        ),
        (
            InvestorSignal::Market,
            r"\b(TAM|total addressable market|market size|sector|vertical|market share)\b",
        ),
        (
            InvestorSignal::Team,
            r"\b(team|founder|co-founder|lead engineer|researcher|hiring|hired|hire|ex-(google|amazon|meta|facebook|apple|openai|netflix))\b",
        ),
        (
            InvestorSignal::Technology,
            r"\b(throughput|latency|tps|scalab|performance|zk|zero-knowledge|encryption|algorithm|proof|consensus|architecture|module)\b",
        ),
        (
            InvestorSignal::Security,
            r"\b(audit|audited|bug bounty|vulnerab|exploit|attack|slash|slashing|security)\b",
        ),
        (
            InvestorSignal::Compliance,
            r"\b(regulat|compliance|legal|jurisdiction|licen[cs]e)\b",
        ),
        (
            InvestorSignal::Tokenomics,
            r"\b(emission|supply|inflation|vesting|unlock|distribution|allocation|burn|tokenomic)\b",
        ),
        (
            InvestorSignal::Governance,
            r"\b(governance|proposal|vote|quorum|delegate|dao)\b",
        ),
        (
            InvestorSignal::Partnerships,
            r"\b(partner|integration|alliance|ecosystem|collaborat)\b",
        ),
        (
            InvestorSignal::Competition,
            r"\b(competitor|competition|alternative|fragment|substitute)\b",
        ),
        (
            InvestorSignal::Risk,
            r"\b(risk|uncertain|downtime|penalty|penalties|loss)\b",
        ),
        (
            InvestorSignal::Roadmap,
            r"\b(roadmap|milestone|timeline|upcoming|planned|launch|release)\b",
        ),
    ];

    bank.into_iter()
        .map(|(signal, pattern)| {
            let regex = Regex::new(&format!("(?i){}", pattern)).expect("valid regex");
            (signal, regex)
        })
        .collect()
});

/// Number of domain keywords contained in `text`
pub fn keyword_hits(text: &str) -> usize {
    let lowered = text.to_lowercase();
    DOMAIN_KEYWORDS
        .iter()
        .filter(|k| lowered.contains(*k))
        .count()
}

pub fn has_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    DOMAIN_KEYWORDS.iter().any(|k| lowered.contains(*k))
}

/// True if some domain keyword occurs in both texts
pub fn share_keyword(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    DOMAIN_KEYWORDS
        .iter()
        .any(|k| a.contains(*k) && b.contains(*k))
}
