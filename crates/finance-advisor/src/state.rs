//! Session State
//!
//! Everything one interactive session remembers between actions. Fields are
//! private: only the orchestrator mutates them, and only after the step that
//! produced the new values has fully succeeded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::advice::AdviceCategory;
use crate::error::ValidationError;
use crate::serializer::ProfileText;

/// Where a session stands in the two-stage flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No analysis yet
    Empty,
    /// Profile analyzed, no advice category chosen
    Analyzed,
    /// Category chosen, no feedback for it yet
    AdviceSelected,
    /// Feedback fetched for the current category
    DetailedFeedbackReady,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Analyzed => "analyzed",
            Self::AdviceSelected => "advice_selected",
            Self::DetailedFeedbackReady => "detailed_feedback_ready",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User actions, without their payloads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Analyze,
    SelectAdvice,
    RequestFeedback,
}

impl ActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::SelectAdvice => "select_advice",
            Self::RequestFeedback => "request_feedback",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    analyzed_response: Option<String>,
    cached_profile_text: Option<ProfileText>,
    selected_advice: Option<AdviceCategory>,
    detailed_feedback: Option<String>,
    /// Category whose request produced `detailed_feedback`
    feedback_category: Option<AdviceCategory>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyzed_response(&self) -> Option<&str> {
        self.analyzed_response.as_deref()
    }

    pub const fn cached_profile_text(&self) -> Option<&ProfileText> {
        self.cached_profile_text.as_ref()
    }

    pub const fn selected_advice(&self) -> Option<AdviceCategory> {
        self.selected_advice
    }

    pub fn detailed_feedback(&self) -> Option<&str> {
        self.detailed_feedback.as_deref()
    }

    pub const fn feedback_category(&self) -> Option<AdviceCategory> {
        self.feedback_category
    }

    pub fn phase(&self) -> Phase {
        match (&self.analyzed_response, self.selected_advice) {
            (None, _) => Phase::Empty,
            (Some(_), None) => Phase::Analyzed,
            (Some(_), Some(selected))
                if self.detailed_feedback.is_some() && self.feedback_category == Some(selected) =>
            {
                Phase::DetailedFeedbackReady
            }
            (Some(_), Some(_)) => Phase::AdviceSelected,
        }
    }

    /// Feedback is on display but was produced for a different category
    pub fn feedback_is_stale(&self) -> bool {
        self.detailed_feedback.is_some() && self.feedback_category != self.selected_advice
    }

    /// Actions a UI should enable right now
    pub fn available_actions(&self) -> Vec<ActionKind> {
        match self.phase() {
            Phase::Empty => vec![ActionKind::Analyze],
            Phase::Analyzed => vec![ActionKind::Analyze, ActionKind::SelectAdvice],
            Phase::AdviceSelected | Phase::DetailedFeedbackReady => vec![
                ActionKind::Analyze,
                ActionKind::SelectAdvice,
                ActionKind::RequestFeedback,
            ],
        }
    }

    pub fn allows(&self, action: ActionKind) -> bool {
        self.available_actions().contains(&action)
    }

    pub(crate) fn ensure_allowed(&self, action: ActionKind) -> Result<(), ValidationError> {
        if self.allows(action) {
            Ok(())
        } else {
            Err(ValidationError::ActionUnavailable {
                action,
                phase: self.phase(),
            })
        }
    }

    /// A new analysis replaces the cached profile and drops any feedback.
    /// The selected category is kept.
    pub(crate) fn commit_analysis(&mut self, profile: ProfileText, analysis: String) {
        self.cached_profile_text = Some(profile);
        self.analyzed_response = Some(analysis);
        self.detailed_feedback = None;
        self.feedback_category = None;
    }

    /// Selection never touches existing feedback
    pub(crate) fn select_advice(&mut self, category: AdviceCategory) {
        self.selected_advice = Some(category);
    }

    pub(crate) fn commit_feedback(&mut self, category: AdviceCategory, feedback: String) {
        self.detailed_feedback = Some(feedback);
        self.feedback_category = Some(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::sample_profile;
    use crate::serializer::serialize_profile;

    fn profile_text() -> ProfileText {
        serialize_profile(&sample_profile()).unwrap()
    }

    fn analyzed() -> SessionState {
        let mut state = SessionState::new();
        state.commit_analysis(profile_text(), "analysis".into());
        state
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::new();
        assert_eq!(state.phase(), Phase::Empty);
        assert_eq!(state.available_actions(), vec![ActionKind::Analyze]);
        assert!(state.analyzed_response().is_none());
        assert!(state.cached_profile_text().is_none());
        assert!(!state.feedback_is_stale());
    }

    #[test]
    fn test_phase_progression() {
        let mut state = analyzed();
        assert_eq!(state.phase(), Phase::Analyzed);
        assert!(!state.allows(ActionKind::RequestFeedback));

        state.select_advice(AdviceCategory::BudgetBreakdown);
        assert_eq!(state.phase(), Phase::AdviceSelected);
        assert!(state.allows(ActionKind::RequestFeedback));

        state.commit_feedback(AdviceCategory::BudgetBreakdown, "budget".into());
        assert_eq!(state.phase(), Phase::DetailedFeedbackReady);
    }

    #[test]
    fn test_changing_category_keeps_feedback_but_marks_stale() {
        let mut state = analyzed();
        state.select_advice(AdviceCategory::BudgetBreakdown);
        state.commit_feedback(AdviceCategory::BudgetBreakdown, "budget".into());

        state.select_advice(AdviceCategory::Investment);
        assert_eq!(state.phase(), Phase::AdviceSelected);
        assert_eq!(state.detailed_feedback(), Some("budget"));
        assert_eq!(state.feedback_category(), Some(AdviceCategory::BudgetBreakdown));
        assert!(state.feedback_is_stale());

        state.select_advice(AdviceCategory::BudgetBreakdown);
        assert_eq!(state.phase(), Phase::DetailedFeedbackReady);
        assert!(!state.feedback_is_stale());
    }

    #[test]
    fn test_reanalysis_clears_feedback_keeps_selection() {
        let mut state = analyzed();
        state.select_advice(AdviceCategory::DebtRepayment);
        state.commit_feedback(AdviceCategory::DebtRepayment, "debt".into());

        state.commit_analysis(profile_text(), "fresh".into());
        assert!(state.detailed_feedback().is_none());
        assert!(state.feedback_category().is_none());
        assert_eq!(state.analyzed_response(), Some("fresh"));
        assert_eq!(state.selected_advice(), Some(AdviceCategory::DebtRepayment));
        assert_eq!(state.phase(), Phase::AdviceSelected);
    }

    #[test]
    fn test_ensure_allowed_reports_phase() {
        let err = SessionState::new()
            .ensure_allowed(ActionKind::SelectAdvice)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::ActionUnavailable {
                action: ActionKind::SelectAdvice,
                phase: Phase::Empty,
            }
        );
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Phase::DetailedFeedbackReady).unwrap(),
            "\"detailed_feedback_ready\""
        );
        assert_eq!(ActionKind::RequestFeedback.to_string(), "request_feedback");
    }
}
