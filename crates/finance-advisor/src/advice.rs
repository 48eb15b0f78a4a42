//! Advice Categories
//!
//! The six kinds of follow-up advice a user can ask for once their profile
//! has been analyzed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum AdviceCategory {
    BudgetBreakdown,
    DebtRepayment,
    SavingsMilestone,
    Investment,
    EmergencyFund,
    FinancialHealth,
}

impl AdviceCategory {
    /// All categories in the order they are offered
    pub const ALL: [Self; 6] = [
        Self::BudgetBreakdown,
        Self::DebtRepayment,
        Self::SavingsMilestone,
        Self::Investment,
        Self::EmergencyFund,
        Self::FinancialHealth,
    ];

    /// Display label shown to the user
    pub const fn label(self) -> &'static str {
        match self {
            Self::BudgetBreakdown => "Budget Breakdown",
            Self::DebtRepayment => "Debt Repayment Strategy",
            Self::SavingsMilestone => "Savings Milestone Suggestion",
            Self::Investment => "Investment Advice",
            Self::EmergencyFund => "Emergency Fund Calculation",
            Self::FinancialHealth => "Financial Health Report",
        }
    }

    /// URL-safe identifier
    pub const fn slug(self) -> &'static str {
        match self {
            Self::BudgetBreakdown => "budget_breakdown",
            Self::DebtRepayment => "debt_repayment",
            Self::SavingsMilestone => "savings_milestone",
            Self::Investment => "investment",
            Self::EmergencyFund => "emergency_fund",
            Self::FinancialHealth => "financial_health",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AdviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdviceCategory {
    type Err = ValidationError;

    /// Accepts either the display label or the slug, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted) || c.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownAdviceCategory(s.to_string()))
    }
}

impl TryFrom<String> for AdviceCategory {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AdviceCategory> for &'static str {
    fn from(category: AdviceCategory) -> Self {
        category.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_and_slug() {
        assert_eq!(
            "Debt Repayment Strategy".parse::<AdviceCategory>().unwrap(),
            AdviceCategory::DebtRepayment
        );
        assert_eq!(
            "emergency_fund".parse::<AdviceCategory>().unwrap(),
            AdviceCategory::EmergencyFund
        );
        assert_eq!(
            " investment advice ".parse::<AdviceCategory>().unwrap(),
            AdviceCategory::Investment
        );
    }

    #[test]
    fn test_unknown_category() {
        let err = "Crypto Tips".parse::<AdviceCategory>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownAdviceCategory("Crypto Tips".into()));
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&AdviceCategory::SavingsMilestone).unwrap();
        assert_eq!(json, "\"Savings Milestone Suggestion\"");

        let parsed: AdviceCategory = serde_json::from_str("\"financial_health\"").unwrap();
        assert_eq!(parsed, AdviceCategory::FinancialHealth);

        assert!(serde_json::from_str::<AdviceCategory>("\"nope\"").is_err());
    }

    #[test]
    fn test_index_matches_order() {
        for (i, category) in AdviceCategory::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }
}
