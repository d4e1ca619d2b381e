// Interview engine: candidate profile intake, question generation with template
// fallback, and the turn-by-turn session state machine.
// All model calls go through llm_client::CompletionService.

pub mod commands;
pub mod handlers;
pub mod profile;
pub mod prompt_builder;
pub mod prompts;
pub mod session;
pub mod store;
pub mod tier;
