// Interview prep generation: prompt templates, the generator and its HTTP handler.
// All LLM calls go through llm_client. No direct HTTP calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
