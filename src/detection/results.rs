//! Pure functions over provider result lists
//!
//! None of these reorder their input beyond what is documented: callers rely
//! on list order (priority order) for tie-breaking.

use crate::providers::DetectResult;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Threshold used when the caller leaves `min_confidence` unset or zero
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Structural check applied to every provider result before it is kept
///
/// Absent results, confidence outside `[0, 1]` (NaN included) and matched
/// results without a language are all invalid.
pub fn is_valid_detect_result(result: Option<&DetectResult>) -> bool {
    let Some(result) = result else {
        return false;
    };
    if !(0.0..=1.0).contains(&result.confidence) {
        return false;
    }
    if result.matched && result.language.is_empty() {
        return false;
    }
    true
}

/// Highest-confidence result; the first one wins on ties
pub fn best_result(results: &[DetectResult]) -> Option<&DetectResult> {
    results.iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.confidence <= current.confidence => Some(current),
        _ => Some(candidate),
    })
}

/// Keeps matched results with confidence at or above `min_confidence`
///
/// A threshold of zero or below (or NaN) is replaced by
/// [`DEFAULT_MIN_CONFIDENCE`].
pub fn filter_results(results: &[DetectResult], min_confidence: f64) -> Vec<DetectResult> {
    let threshold = effective_threshold(min_confidence);
    results
        .iter()
        .filter(|r| r.matched && r.confidence >= threshold)
        .cloned()
        .collect()
}

pub fn effective_threshold(min_confidence: f64) -> f64 {
    if min_confidence.is_nan() || min_confidence <= 0.0 {
        DEFAULT_MIN_CONFIDENCE
    } else {
        min_confidence
    }
}

/// Collapses results to one per language, keeping the strongest
///
/// Output order is the first occurrence of each language. Results with an
/// empty language are dropped.
pub fn merge_results(results: &[DetectResult]) -> Vec<DetectResult> {
    let mut order: Vec<&str> = Vec::new();
    let mut winners: HashMap<&str, &DetectResult> = HashMap::new();

    for result in results.iter().filter(|r| !r.language.is_empty()) {
        let language = result.language.as_str();
        match winners.get(language) {
            Some(current) if !outranks(result, current) => {}
            Some(_) => {
                winners.insert(language, result);
            }
            None => {
                order.push(language);
                winners.insert(language, result);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|language| winners.get(language).map(|r| (*r).clone()))
        .collect()
}

/// Total order used to pick a per-language winner independent of input order
fn outranks(candidate: &DetectResult, current: &DetectResult) -> bool {
    let by_confidence = candidate
        .confidence
        .partial_cmp(&current.confidence)
        .unwrap_or(Ordering::Equal);
    let ordering = by_confidence
        .then_with(|| current.provider.cmp(&candidate.provider))
        .then_with(|| current.framework.cmp(&candidate.framework))
        .then_with(|| current.version.cmp(&candidate.version))
        .then_with(|| current.evidence.reason.cmp(&candidate.evidence.reason));
    ordering == Ordering::Greater
}
