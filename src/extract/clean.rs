//! Line-level cleanup of page text before sentence splitting

use crate::extract::lexicon::{MOJIBAKE, NOISE_PHRASES};

/// Returns true if the line contains a site-chrome phrase
pub fn is_noise(line: &str) -> bool {
    let lowered = line.to_lowercase();
    NOISE_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Repairs common UTF-8-as-Windows-1252 mojibake
pub fn fix_mojibake(line: &str) -> String {
    let mut fixed = line.to_string();
    for (broken, repaired) in MOJIBAKE {
        if fixed.contains(broken) {
            fixed = fixed.replace(broken, repaired);
        }
    }
    fixed
}

/// Cleans raw page text line by line
///
/// Blank lines and lines containing a noise phrase are dropped, mojibake is
/// repaired, and whitespace inside each line is collapsed. Surviving lines
/// are joined with `\n`.
///
/// The noise check applies to whole lines. Crawled page text is collapsed
/// onto a single line, so one noise phrase anywhere in it drops the page.
///
/// # Example
///
/// ```
/// use insight_miner::extract::clean_text;
///
/// let raw = "Validators   earn rewards.\n\nAccept cookies to continue\n";
/// assert_eq!(clean_text(raw), "Validators earn rewards.");
/// ```
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_noise(line))
        .map(|line| {
            fix_mojibake(line)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
