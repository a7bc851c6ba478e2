use crate::providers::DetectResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Read-only aggregate over a result list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub total: usize,
    pub matched: usize,
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub average_confidence: f64,
}

pub fn detection_stats(results: &[DetectResult]) -> DetectionStats {
    let matched: Vec<&DetectResult> = results.iter().filter(|r| r.matched).collect();

    let languages: BTreeSet<&str> = matched
        .iter()
        .map(|r| r.language.as_str())
        .filter(|l| !l.is_empty())
        .collect();
    let frameworks: BTreeSet<&str> = matched
        .iter()
        .map(|r| r.framework.as_str())
        .filter(|f| !f.is_empty())
        .collect();

    let average_confidence = if matched.is_empty() {
        0.0
    } else {
        matched.iter().map(|r| r.confidence).sum::<f64>() / matched.len() as f64
    };

    DetectionStats {
        total: results.len(),
        matched: matched.len(),
        languages: languages.into_iter().map(String::from).collect(),
        frameworks: frameworks.into_iter().map(String::from).collect(),
        average_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let stats = detection_stats(&[]);
        assert_eq!(stats, DetectionStats::default());
    }

    #[test]
    fn test_aggregates_matched_only() {
        let results = vec![
            DetectResult::matched("python", "python", 0.5).with_framework("flask"),
            DetectResult::matched("node", "javascript", 1.0).with_framework("express"),
            DetectResult::matched("deno", "javascript", 0.75),
            DetectResult::no_match(),
        ];
        let stats = detection_stats(&results);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.matched, 3);
        assert_eq!(stats.languages, vec!["javascript", "python"]);
        assert_eq!(stats.frameworks, vec!["express", "flask"]);
        assert_eq!(stats.average_confidence, 0.75);
    }
}
