// LLM prompt constants for the Analysis module.

/// Analysis prompt template. Replace `{job_description}` before sending.
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Analyze the following job description and return ONLY valid JSON in this format:
{
  "summary": "two–three sentence summary",
  "recommendedSkills": ["skill1", "skill2", "skill3"]
}

Job Description:
"""
{job_description}
""""#;

/// Returned when the model is unavailable or its answer is unusable.
pub const FALLBACK_SUMMARY: &str = "This role focuses on full-stack development using React and Node.js, emphasising cloud deployment and modern engineering practices.";

pub const FALLBACK_SKILLS: [&str; 3] = ["React.js", "Node.js", "TypeScript"];

pub fn build_analyze_prompt(job_description: &str) -> String {
    ANALYZE_PROMPT_TEMPLATE.replace("{job_description}", job_description)
}
