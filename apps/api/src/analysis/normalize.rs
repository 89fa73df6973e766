//! Response Validator/Normalizer.
//!
//! Turns the raw text the inference service returns into a guaranteed
//! well-formed analysis body. This module never touches persistence or
//! authorization, and it never fails: anything unparseable collapses into
//! the deterministic fallback below.
//!
//! Recovery policy:
//! - markdown code fences are stripped, then the text is decoded as JSON;
//!   if that fails, the outermost `{…}` slice is tried;
//! - a reply with no usable JSON, or with a missing/non-numeric
//!   `match_score`, becomes [`fallback_result`];
//! - a numeric score outside `[0, 100]` is clamped, not rejected;
//! - improvement items arrive as bare strings or objects and normalize to
//!   the canonical [`Improvement`] shape;
//! - keyword lists are deduplicated preserving first-occurrence order.

use serde::Deserialize;
use std::collections::HashSet;

use crate::models::feedback::{Improvement, KeywordAnalysis, StructuredFeedback};

/// Conservative score recorded when the reply cannot be interpreted.
pub const FALLBACK_SCORE: i32 = 50;
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

const DEFAULT_CATEGORY: &str = "General";

/// A fully validated analysis body, ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFeedback {
    pub match_score: i32,
    pub feedback: StructuredFeedback,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default, alias = "matchScore")]
    match_score: Option<f64>,
    #[serde(default)]
    feedback: Option<RawFeedback>,
    #[serde(default, alias = "matchedKeywords")]
    matched_keywords: Vec<String>,
    #[serde(default, alias = "missingKeywords")]
    missing_keywords: Vec<String>,
}

/// The feedback block is usually an object, but some replies send a bare
/// list of improvement items instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFeedback {
    Object(RawFeedbackObject),
    Items(Vec<RawImprovement>),
}

#[derive(Debug, Deserialize)]
struct RawFeedbackObject {
    #[serde(default)]
    overall_assessment: Option<String>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    priority_improvements: Vec<RawImprovement>,
    #[serde(default, alias = "ats_optimization_tips")]
    ats_tips: Vec<String>,
    #[serde(default, alias = "match_score_interpretation")]
    score_interpretation: Option<String>,
    #[serde(default)]
    missing_keywords_analysis: Option<KeywordAnalysis>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawImprovement {
    Text(String),
    Object {
        #[serde(default)]
        category: Option<String>,
        #[serde(default, alias = "suggestion")]
        recommendation: Option<String>,
        #[serde(default)]
        priority: Option<String>,
        #[serde(default)]
        impact: Option<String>,
    },
}

/// Converts a raw inference reply into a well-formed analysis body.
pub fn normalize_response(raw: &str) -> ScoredFeedback {
    let Some(parsed) = decode_lenient(raw) else {
        return fallback_result();
    };
    let Some(score) = parsed.match_score.filter(|s| s.is_finite()) else {
        return fallback_result();
    };

    let match_score = (score.round() as i64).clamp(MIN_SCORE as i64, MAX_SCORE as i64) as i32;

    ScoredFeedback {
        match_score,
        feedback: parsed.feedback.map(normalize_feedback).unwrap_or_default(),
        matched_keywords: dedup_preserving_order(parsed.matched_keywords),
        missing_keywords: dedup_preserving_order(parsed.missing_keywords),
    }
}

/// The fixed body recorded when the reply cannot be interpreted. Three
/// generic improvement items, a baseline score, no keyword claims.
pub fn fallback_result() -> ScoredFeedback {
    let improvements = [
        (
            "Skills Enhancement",
            "Add technical keywords from the job description that genuinely reflect your experience",
        ),
        (
            "Experience Quantification",
            "Include specific metrics and outcomes in your experience descriptions",
        ),
        (
            "Format Optimization",
            "Use standard section headers and consistent formatting throughout",
        ),
    ];

    ScoredFeedback {
        match_score: FALLBACK_SCORE,
        feedback: StructuredFeedback {
            overall_assessment: Some(
                "The analysis service returned a response that could not be interpreted, \
                 so a conservative baseline assessment was recorded."
                    .to_string(),
            ),
            strengths: vec!["Resume was received and analyzed".to_string()],
            priority_improvements: improvements
                .iter()
                .map(|(category, recommendation)| Improvement {
                    category: (*category).to_string(),
                    recommendation: (*recommendation).to_string(),
                    priority: Some("Medium".to_string()),
                    impact: None,
                })
                .collect(),
            ats_tips: vec![
                "Use standard section headers (Experience, Education, Skills)".to_string(),
                "Mirror relevant keywords from the job description naturally in your content"
                    .to_string(),
            ],
            score_interpretation: Some(
                "Baseline score assigned because the detailed assessment was unavailable."
                    .to_string(),
            ),
            missing_keywords_analysis: None,
        },
        matched_keywords: vec![],
        missing_keywords: vec![],
    }
}

fn decode_lenient(raw: &str) -> Option<RawAnalysis> {
    let text = strip_json_fences(raw);
    if let Ok(parsed) = serde_json::from_str(text) {
        return Some(parsed);
    }
    let slice = outer_object(text)?;
    serde_json::from_str(slice).ok()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from inference output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// The outermost `{…}` slice, for replies that wrap JSON in prose.
fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn normalize_feedback(raw: RawFeedback) -> StructuredFeedback {
    match raw {
        RawFeedback::Object(o) => StructuredFeedback {
            overall_assessment: o.overall_assessment,
            strengths: o.strengths,
            priority_improvements: o
                .priority_improvements
                .into_iter()
                .map(normalize_improvement)
                .collect(),
            ats_tips: o.ats_tips,
            score_interpretation: o.score_interpretation,
            missing_keywords_analysis: o.missing_keywords_analysis,
        },
        RawFeedback::Items(items) => StructuredFeedback {
            priority_improvements: items.into_iter().map(normalize_improvement).collect(),
            ..StructuredFeedback::default()
        },
    }
}

fn normalize_improvement(raw: RawImprovement) -> Improvement {
    match raw {
        RawImprovement::Text(text) => Improvement {
            category: DEFAULT_CATEGORY.to_string(),
            recommendation: text,
            priority: None,
            impact: None,
        },
        RawImprovement::Object {
            category,
            recommendation,
            priority,
            impact,
        } => Improvement {
            category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            recommendation: recommendation.unwrap_or_default(),
            priority,
            impact,
        },
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_well_formed_reply_is_preserved() {
        let raw = r#"{"matchScore":85,"feedback":{"overall_assessment":"Strong fit","strengths":["Python"],"priority_improvements":[],"ats_optimization_tips":["Use keywords"]},"matchedKeywords":["Python","SQL"],"missingKeywords":["Docker"]}"#;
        let result = normalize_response(raw);
        assert_eq!(result.match_score, 85);
        assert_eq!(result.matched_keywords, vec!["Python", "SQL"]);
        assert_eq!(result.missing_keywords, vec!["Docker"]);
        assert_eq!(
            result.feedback.overall_assessment.as_deref(),
            Some("Strong fit")
        );
        assert_eq!(result.feedback.ats_tips, vec!["Use keywords"]);
    }

    #[test]
    fn test_snake_case_field_names_accepted() {
        let raw = r#"{"match_score":42,"matched_keywords":["Go"],"missing_keywords":[]}"#;
        let result = normalize_response(raw);
        assert_eq!(result.match_score, 42);
        assert_eq!(result.matched_keywords, vec!["Go"]);
    }

    #[test]
    fn test_non_json_reply_yields_exact_fallback() {
        let result = normalize_response("I'm sorry, I can't help with that.");
        assert_eq!(result, fallback_result());
    }

    #[test]
    fn test_fallback_is_deterministic() {
        assert_eq!(
            normalize_response("not json"),
            normalize_response("also { not json")
        );
        assert_eq!(fallback_result().match_score, FALLBACK_SCORE);
        assert_eq!(fallback_result().feedback.priority_improvements.len(), 3);
    }

    #[test]
    fn test_missing_score_yields_fallback() {
        let result = normalize_response(r#"{"feedback":{"strengths":["x"]}}"#);
        assert_eq!(result, fallback_result());
    }

    #[test]
    fn test_non_numeric_score_yields_fallback() {
        let result = normalize_response(r#"{"matchScore":"eighty"}"#);
        assert_eq!(result, fallback_result());
    }

    #[test]
    fn test_negative_score_clamps_to_zero() {
        assert_eq!(normalize_response(r#"{"matchScore":-5}"#).match_score, 0);
    }

    #[test]
    fn test_overlarge_score_clamps_to_hundred() {
        assert_eq!(normalize_response(r#"{"matchScore":140}"#).match_score, 100);
    }

    proptest! {
        #[test]
        fn prop_score_always_in_range(score in -1.0e9f64..1.0e9f64) {
            let raw = format!(r#"{{"matchScore":{score}}}"#);
            let result = normalize_response(&raw);
            prop_assert!(result.match_score >= MIN_SCORE);
            prop_assert!(result.match_score <= MAX_SCORE);
        }
    }

    #[test]
    fn test_fenced_json_is_unwrapped() {
        let raw = "```json\n{\"matchScore\": 70}\n```";
        assert_eq!(normalize_response(raw).match_score, 70);
    }

    #[test]
    fn test_json_embedded_in_prose_is_recovered() {
        let raw = "Here is your analysis:\n{\"matchScore\": 61, \"matchedKeywords\": [\"Rust\"]}\nHope this helps!";
        let result = normalize_response(raw);
        assert_eq!(result.match_score, 61);
        assert_eq!(result.matched_keywords, vec!["Rust"]);
    }

    #[test]
    fn test_string_and_object_improvements_normalize_together() {
        let raw = r#"{
            "matchScore": 64,
            "feedback": {
                "priority_improvements": [
                    "Add more cloud experience",
                    {"category": "Skills", "recommendation": "Learn Kubernetes", "priority": "High", "impact": "Closes a key gap"}
                ]
            }
        }"#;
        let result = normalize_response(raw);
        let improvements = &result.feedback.priority_improvements;
        assert_eq!(improvements.len(), 2);
        assert_eq!(improvements[0].category, DEFAULT_CATEGORY);
        assert_eq!(improvements[0].recommendation, "Add more cloud experience");
        assert_eq!(improvements[0].priority, None);
        assert_eq!(improvements[1].category, "Skills");
        assert_eq!(improvements[1].priority.as_deref(), Some("High"));
    }

    #[test]
    fn test_improvement_suggestion_alias_maps_to_recommendation() {
        let raw = r#"{"matchScore":50,"feedback":{"priority_improvements":[{"category":"Skills","suggestion":"Add Docker"}]}}"#;
        let result = normalize_response(raw);
        assert_eq!(
            result.feedback.priority_improvements[0].recommendation,
            "Add Docker"
        );
    }

    #[test]
    fn test_feedback_as_bare_item_list() {
        let raw = r#"{"matchScore":85,"feedback":["Tighten the summary section"],"matchedKeywords":["Python","SQL"],"missingKeywords":["Docker"]}"#;
        let result = normalize_response(raw);
        assert_eq!(result.match_score, 85);
        assert_eq!(result.matched_keywords, vec!["Python", "SQL"]);
        assert_eq!(result.missing_keywords, vec!["Docker"]);
        assert_eq!(result.feedback.priority_improvements.len(), 1);
        assert_eq!(
            result.feedback.priority_improvements[0].recommendation,
            "Tighten the summary section"
        );
    }

    #[test]
    fn test_keyword_analysis_text_form_kept() {
        let raw = r#"{"matchScore":55,"feedback":{"missing_keywords_analysis":"Consider adding Docker"}}"#;
        let result = normalize_response(raw);
        assert_eq!(
            result.feedback.missing_keywords_analysis,
            Some(KeywordAnalysis::Text("Consider adding Docker".to_string()))
        );
    }

    #[test]
    fn test_keyword_analysis_structured_form_kept() {
        let raw = r#"{"matchScore":55,"feedback":{"missing_keywords_analysis":{"critical_missing":["Docker"],"suggestions":"Mention container work"}}}"#;
        let result = normalize_response(raw);
        match result.feedback.missing_keywords_analysis {
            Some(KeywordAnalysis::Structured {
                ref critical_missing,
                ref suggestions,
            }) => {
                assert_eq!(critical_missing, &vec!["Docker".to_string()]);
                assert_eq!(suggestions.as_deref(), Some("Mention container work"));
            }
            ref other => panic!("expected structured analysis, got {other:?}"),
        }
    }

    #[test]
    fn test_keywords_deduplicated_in_order() {
        let raw = r#"{"matchScore":70,"matchedKeywords":["SQL","Python","SQL","Rust","Python"]}"#;
        let result = normalize_response(raw);
        assert_eq!(result.matched_keywords, vec!["SQL", "Python", "Rust"]);
    }

    #[test]
    fn test_fractional_score_rounds() {
        assert_eq!(normalize_response(r#"{"matchScore":72.6}"#).match_score, 73);
    }
}
