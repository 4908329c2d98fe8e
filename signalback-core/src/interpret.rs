//! Keyword interpreter for free-text recommendations.
//!
//! Maps the oracle's natural-language output to a [`Decision`] with a
//! first-match-wins, case-insensitive substring search. This is a lexical
//! heuristic with known blind spots: it has no negation handling ("do not
//! buy" still reads as a buy) and keyword order matters when a text
//! mentions both directions. Both limitations are deliberate — they match
//! the upstream recommendation format, which leads with the verdict.

use crate::domain::Decision;

const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Interpret recommendation text into a structured decision.
///
/// Action: "buy"/"long" wins over "sell"/"short"; anything else is a
/// hold. Confidence is derived independently from qualifier words:
/// "strong"/"high confidence" → 0.8, "moderate" → 0.6, "weak"/"low
/// confidence" → 0.4, otherwise 0.5. Total and deterministic.
pub fn interpret(text: &str) -> Decision {
    let lower = text.to_lowercase();

    if lower.contains("buy") || lower.contains("long") {
        Decision::Buy {
            confidence: extract_confidence(&lower),
        }
    } else if lower.contains("sell") || lower.contains("short") {
        Decision::Sell {
            confidence: extract_confidence(&lower),
        }
    } else {
        Decision::Hold
    }
}

/// Confidence from qualifier language. Expects lowercased input.
fn extract_confidence(lower: &str) -> f64 {
    if lower.contains("strong") || lower.contains("high confidence") {
        0.8
    } else if lower.contains("moderate") {
        0.6
    } else if lower.contains("weak") || lower.contains("low confidence") {
        0.4
    } else {
        DEFAULT_CONFIDENCE
    }
}
