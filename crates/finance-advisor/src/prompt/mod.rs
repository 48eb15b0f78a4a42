//! Prompt Library
//!
//! Layered prompts: a profiling prompt over the raw profile, then advice
//! prompts conditioned on both the profile and the profiling result.

mod library;
mod template;

pub use library::PromptLibrary;
pub use template::{Placeholder, PromptTemplate, PromptVars, RenderedPrompt};
