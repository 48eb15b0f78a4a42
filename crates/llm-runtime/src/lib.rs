//! # llm-runtime
//!
//! Concrete gateways for the finance advisor.
//!
//! ## Providers
//!
//! - **OpenAI** (default): chat-completions API, `gpt-4o` at temperature 0
//! - **Ollama**: local inference via `ollama-rs` (feature `ollama`)
//! - **Mock**: scripted offline replies from `llm-core`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use llm_runtime::{build_provider, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_env()?;
//! let provider = build_provider(&config)?;
//! ```

pub mod config;
pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use config::{ProviderKind, RuntimeConfig, build_provider};
pub use openai::{OpenAiConfig, OpenAiProvider};

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use llm_core::{GenerationOptions, LlmError, LlmProvider, Message, Result, Role};
