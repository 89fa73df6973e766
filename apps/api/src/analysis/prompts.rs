//! Deterministic prompt assembly for the analysis pipeline.
//!
//! Truncation policy: resume text and job description are tail-truncated to
//! fixed character budgets; the job role is short and is never truncated.

/// Character budget for the resume body in the prompt.
pub const MAX_RESUME_PROMPT_CHARS: usize = 12_000;
/// Character budget for the job description in the prompt.
pub const MAX_JOB_DESCRIPTION_PROMPT_CHARS: usize = 8_000;

const ANALYSIS_PERSONA: &str = "\
You are an expert career coach and resume optimization specialist with deep \
experience in applicant tracking systems, keyword optimization, and \
candidate positioning. Your feedback is honest, specific, and actionable.";

const OUTPUT_CONTRACT: &str = r#"OUTPUT REQUIREMENTS:
Respond with a single valid JSON object, no surrounding prose, shaped as:
{
  "match_score": <integer 0-100, overall resume/job compatibility>,
  "feedback": {
    "overall_assessment": "<2-3 sentence summary>",
    "strengths": ["<specific strength>", ...],
    "priority_improvements": [
      {"category": "<Skills|Experience|Formatting|...>", "recommendation": "<actionable advice>", "priority": "<Critical|High|Medium|Low>", "impact": "<why it matters>"},
      ...
    ],
    "ats_optimization_tips": ["<specific ATS tip>", ...],
    "match_score_interpretation": "<what the score means for this candidacy>",
    "missing_keywords_analysis": {"critical_missing": ["<keyword>", ...], "suggestions": "<how to address them>"}
  },
  "matched_keywords": ["<keyword present in both resume and job description>", ...],
  "missing_keywords": ["<job description keyword absent from the resume>", ...]
}"#;

/// Builds the full analysis prompt. Same inputs always produce the same
/// prompt.
pub fn build_analysis_prompt(job_role: &str, job_description: &str, resume_text: &str) -> String {
    let job_description = truncate_chars(job_description, MAX_JOB_DESCRIPTION_PROMPT_CHARS);
    let resume_text = truncate_chars(resume_text, MAX_RESUME_PROMPT_CHARS);

    format!(
        "{ANALYSIS_PERSONA}\n\n\
         TARGET ROLE: {job_role}\n\n\
         JOB DESCRIPTION:\n{job_description}\n\n\
         RESUME:\n{resume_text}\n\n\
         {OUTPUT_CONTRACT}"
    )
}

/// Tail-truncates to at most `max` characters, on a character boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_analysis_prompt("Backend Engineer", "Need Python", "10 years of Python");
        let b = build_analysis_prompt("Backend Engineer", "Need Python", "10 years of Python");
        assert_eq!(a, b);
    }

    #[test]
    fn test_job_role_is_never_truncated() {
        let long_role = "Principal Distributed Systems Engineer".repeat(4);
        let prompt = build_analysis_prompt(&long_role, &"x".repeat(50_000), &"y".repeat(50_000));
        assert!(prompt.contains(&long_role));
    }

    #[test]
    fn test_long_inputs_tail_truncated() {
        // Measure each body's contribution against an empty-input baseline so
        // characters in the fixed prompt text don't skew the counts.
        let baseline = build_analysis_prompt("Role", "", "");
        let prompt = build_analysis_prompt("Role", &"q".repeat(50_000), &"z".repeat(50_000));
        let jd_chars = prompt.matches('q').count() - baseline.matches('q').count();
        let resume_chars = prompt.matches('z').count() - baseline.matches('z').count();
        assert_eq!(jd_chars, MAX_JOB_DESCRIPTION_PROMPT_CHARS);
        assert_eq!(resume_chars, MAX_RESUME_PROMPT_CHARS);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 3), "ééé");
        assert_eq!(truncate_chars(&text, 20), text.as_str());
    }

    #[test]
    fn test_short_inputs_untouched() {
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
