//! Analyzer — turns a job description into a summary plus recommended skills.
//!
//! Never fails: any upstream or parsing problem degrades to the static fallback,
//! flagged with `is_real: false`.

use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::analysis::prompts::{build_analyze_prompt, FALLBACK_SKILLS, FALLBACK_SUMMARY};
use crate::llm_client::{strip_json_fences, Completion, LlmClient};

pub const MAX_SKILLS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub recommended_skills: Vec<String>,
    /// `true` when the content came from the model, `false` for the fallback.
    pub is_real: bool,
}

impl AnalysisResult {
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            recommended_skills: FALLBACK_SKILLS.iter().map(|s| s.to_string()).collect(),
            is_real: false,
        }
    }
}

/// Asks the model about `job_description`. Errors are logged, not returned.
pub async fn analyze_job_description(job_description: &str, llm: &LlmClient) -> AnalysisResult {
    let prompt = build_analyze_prompt(job_description);

    let answer = match llm.complete(&prompt).await {
        Ok(Completion::Answer(text)) => text,
        Ok(Completion::GaveUp { status }) => {
            warn!("Analysis upstream gave up with status {status}, using fallback");
            String::new()
        }
        Err(e) => {
            error!("Analysis upstream error: {e}");
            String::new()
        }
    };

    interpret_answer(&answer)
}

/// Parses the model's text. Accepts optional Markdown fences; anything that is
/// not an object with a non-empty `summary` string and a `recommendedSkills`
/// array yields the fallback.
pub fn interpret_answer(answer: &str) -> AnalysisResult {
    let cleaned = strip_json_fences(answer);
    if cleaned.is_empty() {
        return AnalysisResult::fallback();
    }

    let parsed: Value = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(e) => {
            warn!("Model answer is not valid JSON ({e}), using fallback");
            return AnalysisResult::fallback();
        }
    };

    let summary = parsed
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let skills = parsed.get("recommendedSkills").and_then(Value::as_array);

    match (summary, skills) {
        (Some(summary), Some(skills)) => AnalysisResult {
            summary: summary.to_string(),
            recommended_skills: skills
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(MAX_SKILLS)
                .map(str::to_string)
                .collect(),
            is_real: true,
        },
        _ => {
            warn!("Model answer is missing summary or recommendedSkills, using fallback");
            AnalysisResult::fallback()
        }
    }
}
