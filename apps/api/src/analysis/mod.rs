// Job description analysis: one LLM round-trip that yields a short summary and
// recommended skills, with a canned fallback whenever the model is unusable.
// All LLM calls go through llm_client.

pub mod analyzer;
pub mod handlers;
pub mod prompts;
