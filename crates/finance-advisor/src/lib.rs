//! # finance-advisor
//!
//! Personal finance assistant built on layered prompts. A user's
//! self-reported profile is serialized once, analyzed by a profiling
//! prompt, and then reused together with that analysis for any of six
//! kinds of follow-up advice.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────┐   serialize   ┌─────────────┐   profiling prompt   ┌──────────────┐
//! │ FinancialProfile │ ────────────▶ │ ProfileText │ ───────────────────▶ │   Analysis   │
//! └──────────────────┘               └─────────────┘                      └──────────────┘
//!                                           │                                    │
//!                                           └──────────┬─────────────────────────┘
//!                                                      ▼
//!                                 advice prompt for the selected category
//!                                                      │
//!                                                      ▼
//!                                             ┌──────────────────┐
//!                                             │ Detailed feedback │
//!                                             └──────────────────┘
//! ```
//!
//! No financial arithmetic happens here. The prompts tell the model which
//! formulas to use; the crate only moves the user's raw numbers around.

pub mod advice;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod prompt;
pub mod serializer;
pub mod state;

pub use advice::AdviceCategory;
pub use error::{AdvisorError, Result, ValidationError};
pub use model::{
    Debt, DebtType, EmergencyFund, Expenses, FinancialGoal, FinancialProfile, ProfileForm,
    RiskTolerance, TimeFrame,
};
pub use orchestrator::{Advisor, SessionAction};
pub use prompt::{Placeholder, PromptLibrary, PromptTemplate, RenderedPrompt};
pub use serializer::{serialize_profile, ProfileText};
pub use state::{ActionKind, Phase, SessionState};
