//! Orchestrator
//!
//! Drives one session through the two-stage flow:
//!
//! ```text
//!   Empty ──analyze──▶ Analyzed ──select──▶ AdviceSelected ──feedback──▶ DetailedFeedbackReady
//!     ▲                   │  ▲                 │      ▲                        │
//!     └───────────────────┘  └──── analyze ────┘      └──────── select ────────┘
//! ```
//!
//! Each action is a single transition attempt. Gateway calls happen before
//! any state is touched, so a failed action leaves the session exactly as
//! it was.

use std::sync::Arc;
use std::time::Duration;

use llm_core::{GenerationOptions, LlmError, LlmProvider};

use crate::advice::AdviceCategory;
use crate::error::{Result, ValidationError};
use crate::model::FinancialProfile;
use crate::prompt::{PromptLibrary, RenderedPrompt};
use crate::serializer::serialize_profile;
use crate::state::{ActionKind, Phase, SessionState};

/// One user action with its payload
#[derive(Clone, Debug)]
pub enum SessionAction {
    Analyze(FinancialProfile),
    SelectAdvice(AdviceCategory),
    RequestFeedback,
}

impl SessionAction {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Analyze(_) => ActionKind::Analyze,
            Self::SelectAdvice(_) => ActionKind::SelectAdvice,
            Self::RequestFeedback => ActionKind::RequestFeedback,
        }
    }
}

/// Stateless coordinator; all session data lives in [`SessionState`]
pub struct Advisor {
    provider: Arc<dyn LlmProvider>,
    library: PromptLibrary,
    options: GenerationOptions,
    timeout: Option<Duration>,
}

impl Advisor {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self {
            provider,
            library: PromptLibrary::default(),
            options,
            timeout: None,
        }
    }

    /// Bound every gateway call (None = wait indefinitely)
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_library(mut self, library: PromptLibrary) -> Self {
        self.library = library;
        self
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub const fn library(&self) -> &PromptLibrary {
        &self.library
    }

    /// Apply one action to a session
    pub async fn dispatch(&self, state: &mut SessionState, action: SessionAction) -> Result<Phase> {
        match action {
            SessionAction::Analyze(profile) => self.analyze(state, &profile).await,
            SessionAction::SelectAdvice(category) => self.select_advice(state, category),
            SessionAction::RequestFeedback => self.request_feedback(state).await,
        }
    }

    /// Run the profiling prompt and cache its result
    ///
    /// Allowed from any phase. Success replaces the cached profile and
    /// analysis together and discards any detailed feedback.
    pub async fn analyze(&self, state: &mut SessionState, profile: &FinancialProfile) -> Result<Phase> {
        ensure_allowed(state, ActionKind::Analyze)?;
        profile.validate()?;

        let profile_text = serialize_profile(profile)?;
        let prompt = self.library.render_profiling(&profile_text)?;
        let analysis = self.generate("profiling", &prompt).await?;

        state.commit_analysis(profile_text, analysis);
        tracing::debug!(phase = %state.phase(), "Analysis committed");
        Ok(state.phase())
    }

    /// Choose an advice category; never calls the gateway
    pub fn select_advice(&self, state: &mut SessionState, category: AdviceCategory) -> Result<Phase> {
        ensure_allowed(state, ActionKind::SelectAdvice)?;

        state.select_advice(category);
        tracing::debug!(category = %category, phase = %state.phase(), "Advice selected");
        Ok(state.phase())
    }

    /// Run the advice prompt for the selected category
    pub async fn request_feedback(&self, state: &mut SessionState) -> Result<Phase> {
        ensure_allowed(state, ActionKind::RequestFeedback)?;

        let unavailable = || ValidationError::ActionUnavailable {
            action: ActionKind::RequestFeedback,
            phase: state.phase(),
        };
        let category = state.selected_advice().ok_or_else(unavailable)?;
        let profile_text = state.cached_profile_text().ok_or_else(unavailable)?;

        let prompt = self
            .library
            .render_advice(category, profile_text, state.analyzed_response())?;
        let feedback = self.generate(category.slug(), &prompt).await?;

        state.commit_feedback(category, feedback);
        tracing::debug!(category = %category, phase = %state.phase(), "Feedback committed");
        Ok(state.phase())
    }

    async fn generate(&self, stage: &str, prompt: &RenderedPrompt) -> Result<String> {
        let messages = prompt.messages();
        tracing::debug!(stage, prompt_bytes = prompt.len(), "Rendering complete, calling gateway");

        let call = self.provider.complete(&messages, &self.options);
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(LlmError::Timeout(limit.as_secs()))),
            None => call.await,
        };

        match result {
            Ok(completion) => {
                tracing::info!(
                    stage,
                    provider = self.provider.name(),
                    model = %completion.model,
                    response_bytes = completion.content.len(),
                    "Generation complete"
                );
                Ok(completion.content)
            }
            Err(e) => {
                tracing::warn!(stage, provider = self.provider.name(), error = %e, "Generation failed");
                Err(e.into())
            }
        }
    }
}

fn ensure_allowed(state: &SessionState, action: ActionKind) -> Result<()> {
    state.ensure_allowed(action).map_err(|e| {
        tracing::warn!(action = %action, phase = %state.phase(), "Action rejected");
        e.into()
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use llm_core::provider::{Completion, ModelInfo};
    use llm_core::{Message, Role, ScriptedProvider};

    use super::*;
    use crate::error::AdvisorError;
    use crate::model::fixtures::sample_profile;

    fn advisor(provider: &Arc<ScriptedProvider>) -> Advisor {
        let provider: Arc<dyn LlmProvider> = Arc::clone(provider) as Arc<dyn LlmProvider>;
        Advisor::new(provider, GenerationOptions::default())
    }

    fn user_message(provider: &ScriptedProvider, index: usize) -> String {
        provider.requests()[index]
            .content(Role::User)
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_profiling_prompt_carries_raw_inputs_only() {
        let provider = Arc::new(ScriptedProvider::new().reply("Savings rate: 51.0%"));
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        let phase = advisor.analyze(&mut state, &sample_profile()).await.unwrap();
        assert_eq!(phase, Phase::Analyzed);
        assert_eq!(state.analyzed_response(), Some("Savings rate: 51.0%"));

        let requests = provider.requests();
        let request = &requests[0];
        let system = request.content(Role::System).unwrap();
        let user = request.content(Role::User).unwrap();

        assert!(system.contains("savings_rate = monthly_savings / income * 100"));
        for raw in ["5000", "1500", "200", "400", "100", "150", "2000"] {
            assert!(user.contains(raw), "missing raw value {raw}");
        }
        assert!(!user.contains("2450"));
        assert!(!user.contains("2550"));
        assert!(!user.contains("savings_rate"));
        assert_eq!(request.model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_gateway_failure_on_first_analysis_stays_empty() {
        let provider = Arc::new(
            ScriptedProvider::new().fail(LlmError::ProviderUnavailable("503".into())),
        );
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        let err = advisor.analyze(&mut state, &sample_profile()).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Gateway(_)));
        assert!(err.is_retryable());
        assert_eq!(state, SessionState::new());
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn test_auth_failure_is_configuration_error() {
        let provider = Arc::new(ScriptedProvider::new().fail(LlmError::Auth("bad key".into())));
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        let err = advisor.analyze(&mut state, &sample_profile()).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Configuration(_)));
        assert!(state.analyzed_response().is_none());
    }

    #[tokio::test]
    async fn test_failed_reanalysis_keeps_previous_results() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .reply("first analysis")
                .reply("budget advice")
                .fail(LlmError::RateLimited("slow down".into())),
        );
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        advisor.analyze(&mut state, &sample_profile()).await.unwrap();
        advisor.select_advice(&mut state, AdviceCategory::BudgetBreakdown).unwrap();
        advisor.request_feedback(&mut state).await.unwrap();
        let before = state.clone();

        let mut edited = sample_profile();
        edited.income = rust_decimal_macros::dec!(6000);
        assert!(advisor.analyze(&mut state, &edited).await.is_err());
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_reanalysis_resets_feedback_from_any_phase() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .reply("first")
                .reply("debt plan")
                .reply("second"),
        );
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        advisor.analyze(&mut state, &sample_profile()).await.unwrap();
        advisor.select_advice(&mut state, AdviceCategory::DebtRepayment).unwrap();
        let phase = advisor.request_feedback(&mut state).await.unwrap();
        assert_eq!(phase, Phase::DetailedFeedbackReady);

        let mut edited = sample_profile();
        edited.misc_info = "Expecting a raise".into();
        let phase = advisor.analyze(&mut state, &edited).await.unwrap();

        assert_eq!(phase, Phase::AdviceSelected);
        assert!(state.detailed_feedback().is_none());
        assert_eq!(state.analyzed_response(), Some("second"));
        assert!(state
            .cached_profile_text()
            .unwrap()
            .as_str()
            .contains("Expecting a raise"));
    }

    #[tokio::test]
    async fn test_selection_makes_no_gateway_call() {
        let provider = Arc::new(ScriptedProvider::new().reply("analysis"));
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        advisor.analyze(&mut state, &sample_profile()).await.unwrap();
        assert_eq!(provider.call_count(), 1);

        advisor.select_advice(&mut state, AdviceCategory::DebtRepayment).unwrap();
        let phase = advisor.select_advice(&mut state, AdviceCategory::Investment).unwrap();

        assert_eq!(phase, Phase::AdviceSelected);
        assert_eq!(state.selected_advice(), Some(AdviceCategory::Investment));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_feedback_prompt_uses_cached_profile_and_analysis() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .reply("Your savings rate is 51.0%.")
                .reply("Put 60% into index funds."),
        );
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        advisor.analyze(&mut state, &sample_profile()).await.unwrap();
        advisor.select_advice(&mut state, AdviceCategory::Investment).unwrap();
        let phase = advisor.request_feedback(&mut state).await.unwrap();

        assert_eq!(phase, Phase::DetailedFeedbackReady);
        assert_eq!(state.detailed_feedback(), Some("Put 60% into index funds."));
        assert_eq!(state.feedback_category(), Some(AdviceCategory::Investment));

        let user = user_message(&provider, 1);
        assert!(user.contains(state.cached_profile_text().unwrap().as_str()));
        assert!(user.contains("Your savings rate is 51.0%."));
        let system = provider.requests()[1].content(Role::System).unwrap().to_string();
        assert!(system.contains("investment guidance"));
    }

    #[tokio::test]
    async fn test_feedback_rejected_without_selection_or_analysis() {
        let provider = Arc::new(ScriptedProvider::new().reply("analysis"));
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        let err = advisor.request_feedback(&mut state).await.unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::Validation(ValidationError::ActionUnavailable {
                action: ActionKind::RequestFeedback,
                phase: Phase::Empty,
            })
        ));

        let err = advisor
            .select_advice(&mut state, AdviceCategory::BudgetBreakdown)
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Validation(_)));
        assert!(state.selected_advice().is_none());

        advisor.analyze(&mut state, &sample_profile()).await.unwrap();
        let err = advisor.request_feedback(&mut state).await.unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::Validation(ValidationError::ActionUnavailable {
                phase: Phase::Analyzed,
                ..
            })
        ));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_feedback_keeps_previous_feedback() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .reply("analysis")
                .reply("budget advice")
                .fail(LlmError::ProviderUnavailable("down".into())),
        );
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        advisor.analyze(&mut state, &sample_profile()).await.unwrap();
        advisor.select_advice(&mut state, AdviceCategory::BudgetBreakdown).unwrap();
        advisor.request_feedback(&mut state).await.unwrap();
        advisor.select_advice(&mut state, AdviceCategory::EmergencyFund).unwrap();

        assert!(advisor.request_feedback(&mut state).await.is_err());
        assert_eq!(state.phase(), Phase::AdviceSelected);
        assert_eq!(state.detailed_feedback(), Some("budget advice"));
        assert_eq!(state.feedback_category(), Some(AdviceCategory::BudgetBreakdown));
        assert!(state.feedback_is_stale());
    }

    #[tokio::test]
    async fn test_invalid_profile_never_reaches_gateway() {
        let provider = Arc::new(ScriptedProvider::new().reply("analysis"));
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        let mut profile = sample_profile();
        profile.income = rust_decimal_macros::dec!(-10);

        let err = advisor.analyze(&mut state, &profile).await.unwrap_err();
        assert!(matches!(
            err,
            AdvisorError::Validation(ValidationError::InvalidProfile(_))
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_response_is_accepted() {
        let provider = Arc::new(ScriptedProvider::new().reply("").reply("advice"));
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        assert_eq!(
            advisor.analyze(&mut state, &sample_profile()).await.unwrap(),
            Phase::Analyzed
        );
        assert_eq!(state.analyzed_response(), Some(""));

        advisor.select_advice(&mut state, AdviceCategory::FinancialHealth).unwrap();
        advisor.request_feedback(&mut state).await.unwrap();
        assert!(user_message(&provider, 1).contains("<previous_analysis>\n\n</previous_analysis>"));
    }

    #[tokio::test]
    async fn test_dispatch_walks_the_flow() {
        let provider = Arc::new(ScriptedProvider::new().reply("analysis").reply("report"));
        let advisor = advisor(&provider);
        let mut state = SessionState::new();

        let actions = [
            (SessionAction::Analyze(sample_profile()), Phase::Analyzed),
            (
                SessionAction::SelectAdvice(AdviceCategory::FinancialHealth),
                Phase::AdviceSelected,
            ),
            (SessionAction::RequestFeedback, Phase::DetailedFeedbackReady),
        ];

        for (action, expected) in actions {
            assert!(state.allows(action.kind()));
            assert_eq!(advisor.dispatch(&mut state, action).await.unwrap(), expected);
        }
        assert_eq!(provider.call_count(), 2);
    }

    struct StalledProvider;

    #[async_trait]
    impl LlmProvider for StalledProvider {
        fn name(&self) -> &str {
            "Stalled"
        }

        async fn health_check(&self) -> llm_core::Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            _messages: &[Message],
            options: &GenerationOptions,
        ) -> llm_core::Result<Completion> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Completion {
                content: "too late".into(),
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }

        async fn list_models(&self) -> llm_core::Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_as_gateway_error() {
        let advisor = Advisor::new(Arc::new(StalledProvider), GenerationOptions::default())
            .with_timeout(Some(Duration::from_secs(30)));
        let mut state = SessionState::new();

        let err = advisor.analyze(&mut state, &sample_profile()).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Gateway(LlmError::Timeout(30))));
        assert_eq!(state.phase(), Phase::Empty);
    }
}
