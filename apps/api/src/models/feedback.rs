//! Canonical feedback types persisted in the `feedback` JSONB column.
//!
//! The inference service is free to reply with looser shapes (bare-string
//! improvement items, plain-text keyword analysis); the normalizer in
//! `analysis::normalize` converts those into these types, and the variant
//! forms round-trip through serde unchanged.

use serde::{Deserialize, Serialize};

/// One prioritized improvement recommendation in its canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    pub category: String,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// Missing-keyword commentary, which arrives either as prose or as a
/// structured breakdown. Both forms are kept as-is rather than flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordAnalysis {
    Text(String),
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suggestions: Option<String>,
        #[serde(default)]
        critical_missing: Vec<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_assessment: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub priority_improvements: Vec<Improvement>,
    #[serde(default, alias = "ats_optimization_tips")]
    pub ats_tips: Vec<String>,
    #[serde(
        default,
        alias = "match_score_interpretation",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_interpretation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_keywords_analysis: Option<KeywordAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_analysis_text_round_trip() {
        let original = json!("Consider adding Docker and Kubernetes experience");
        let parsed: KeywordAnalysis = serde_json::from_value(original.clone()).unwrap();
        assert!(matches!(parsed, KeywordAnalysis::Text(_)));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), original);
    }

    #[test]
    fn test_keyword_analysis_structured_round_trip() {
        let original = json!({
            "critical_missing": ["Docker", "CI/CD"],
            "suggestions": "Mention related containerization work"
        });
        let parsed: KeywordAnalysis = serde_json::from_value(original.clone()).unwrap();
        assert!(matches!(parsed, KeywordAnalysis::Structured { .. }));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), original);
    }

    #[test]
    fn test_keyword_analysis_structured_without_suggestions() {
        let original = json!({ "critical_missing": ["AWS"] });
        let parsed: KeywordAnalysis = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), original);
    }

    #[test]
    fn test_feedback_accepts_legacy_field_names() {
        let value = json!({
            "strengths": ["Solid Rust background"],
            "ats_optimization_tips": ["Use standard section headers"],
            "match_score_interpretation": "Good fit"
        });
        let parsed: StructuredFeedback = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.ats_tips.len(), 1);
        assert_eq!(parsed.score_interpretation.as_deref(), Some("Good fit"));
    }
}
