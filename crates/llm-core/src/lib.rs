//! # llm-core
//!
//! Provider-agnostic LLM gateway abstraction and per-session state storage.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Request handling layer                    │
//! │  ┌─────────────────────┐        ┌─────────────────────────┐  │
//! │  │  MemorySessionStore │        │      LlmProvider        │  │
//! │  │  (one handle per    │        │      (Strategy)         │  │
//! │  │   session)          │        │  OpenAI / Ollama / Mock │  │
//! │  └─────────────────────┘        └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait is the only way domain code talks to a model:
//! a system instruction plus a user instruction in, generated text out.

pub mod provider;
pub mod message;
pub mod error;
pub mod session;
pub mod mock;

pub use error::{LlmError, Result};
pub use message::{Message, Role};
pub use mock::ScriptedProvider;
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use session::{MemorySessionStore, Session, SessionHandle, SessionId};
