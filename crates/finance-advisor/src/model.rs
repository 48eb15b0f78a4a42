//! Domain Models
//!
//! The user's self-reported financial profile, as collected by the form.
//! Amounts are held as `rust_decimal` values and written to JSON as plain
//! numbers. A profile only validates when every amount survives that
//! conversion unchanged, so the text the model reads carries exactly the
//! figures the user entered. Nothing here derives new numbers from the
//! inputs; all analysis is left to the model.

use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Monthly expenses over the fixed category set
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expenses {
    /// Rent or mortgage
    #[serde(with = "rust_decimal::serde::float")]
    pub housing: Decimal,

    /// Electricity, water, etc.
    #[serde(with = "rust_decimal::serde::float")]
    pub utilities: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub groceries: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub entertainment: Decimal,

    /// Car, bus, etc.
    #[serde(with = "rust_decimal::serde::float")]
    pub transportation: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub other_expenses: Decimal,
}

impl Expenses {
    /// Category name and amount, in serialization order
    pub const fn categories(&self) -> [(&'static str, Decimal); 6] {
        [
            ("housing", self.housing),
            ("utilities", self.utilities),
            ("groceries", self.groceries),
            ("entertainment", self.entertainment),
            ("transportation", self.transportation),
            ("other_expenses", self.other_expenses),
        ]
    }
}

/// Kind of debt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtType {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Student Loan")]
    StudentLoan,
    Mortgage,
    Other,
}

/// One outstanding debt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub debt_type: DebtType,

    /// Outstanding balance
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,

    /// Annual interest rate in percent
    #[serde(with = "rust_decimal::serde::float")]
    pub interest_rate: Decimal,
}

impl Debt {
    pub const fn new(debt_type: DebtType, balance: Decimal, interest_rate: Decimal) -> Self {
        Self {
            debt_type,
            balance,
            interest_rate,
        }
    }
}

/// Selectable financial goals
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FinancialGoal {
    #[serde(rename = "Building an Emergency Fund")]
    BuildingEmergencyFund,
    #[serde(rename = "Saving for Retirement")]
    SavingForRetirement,
    #[serde(rename = "Paying off Debt")]
    PayingOffDebt,
    #[serde(rename = "Investing for the Future")]
    InvestingForTheFuture,
    Other,
}

/// Investment risk tolerance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTolerance {
    Conservative,
    Balanced,
    Aggressive,
}

/// Time frame for savings goals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "6 months")]
    SixMonths,
    #[serde(rename = "1 year")]
    OneYear,
    #[serde(rename = "2 years")]
    TwoYears,
    #[serde(rename = "5 years")]
    FiveYears,
}

/// Emergency fund status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyFund {
    pub exists: bool,

    /// Months of living expenses covered; present exactly when `exists`
    pub months_covered: Option<u32>,
}

impl EmergencyFund {
    pub const fn none() -> Self {
        Self {
            exists: false,
            months_covered: None,
        }
    }

    pub const fn covering(months: u32) -> Self {
        Self {
            exists: true,
            months_covered: Some(months),
        }
    }
}

/// A complete, validated financial profile
///
/// Field order is the serialization order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialProfile {
    /// Monthly income after taxes
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,

    pub expenses: Expenses,

    /// Empty exactly when the user declared no debt
    pub debts: Vec<Debt>,

    /// Total current savings
    #[serde(with = "rust_decimal::serde::float")]
    pub savings: Decimal,

    /// Free-text description of current investments
    pub investments: String,

    pub financial_goals: BTreeSet<FinancialGoal>,

    /// Free-text goal, meaningful when `Other` is selected
    pub other_goal: Option<String>,

    pub risk_tolerance: RiskTolerance,

    pub emergency_fund: EmergencyFund,

    pub time_frame: TimeFrame,

    /// Anything else the user wants to share
    pub misc_info: String,
}

impl FinancialProfile {
    /// Check the invariants a profile must satisfy before analysis
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_amount("income", self.income)?;
        check_amount("savings", self.savings)?;
        for (name, amount) in self.expenses.categories() {
            check_amount(name, amount)?;
        }

        for (i, debt) in self.debts.iter().enumerate() {
            check_amount(&format!("debts[{i}].balance"), debt.balance)?;
            check_amount(&format!("debts[{i}].interest_rate"), debt.interest_rate)?;
        }

        if self.emergency_fund.exists != self.emergency_fund.months_covered.is_some() {
            return Err(ValidationError::InvalidProfile(
                "months_covered must be given exactly when an emergency fund exists".into(),
            ));
        }

        Ok(())
    }
}

/// Amounts at or above this are written in exponent notation
const AMOUNT_LIMIT: u64 = 1_000_000_000_000_000;

fn check_amount(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::InvalidProfile(format!(
            "{field} must not be negative (got {value})"
        )));
    }
    if value >= Decimal::from(AMOUNT_LIMIT) {
        return Err(ValidationError::InvalidProfile(format!(
            "{field} is too large (got {value})"
        )));
    }
    if !survives_float(value) {
        return Err(ValidationError::InvalidProfile(format!(
            "{field} has more precision than can be represented (got {value})"
        )));
    }
    Ok(())
}

/// Whether the shortest float text for `value` reads back as the same amount
fn survives_float(value: Decimal) -> bool {
    value
        .to_f64()
        .and_then(|f| f.to_string().parse::<Decimal>().ok())
        .is_some_and(|back| back == value)
}

/// The form submission as the collection layer delivers it
///
/// Carries the explicit yes/no answers that the profile itself encodes
/// structurally; converting checks they agree.
#[derive(Clone, Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,

    pub expenses: Expenses,

    pub has_debt: bool,

    #[serde(default)]
    pub debts: Vec<Debt>,

    #[serde(with = "rust_decimal::serde::float")]
    pub savings: Decimal,

    #[serde(default)]
    pub investments: String,

    #[serde(default)]
    pub financial_goals: Vec<FinancialGoal>,

    #[serde(default)]
    pub other_goal: Option<String>,

    pub risk_tolerance: RiskTolerance,

    pub has_emergency_fund: bool,

    #[serde(default)]
    pub months_covered: Option<u32>,

    pub time_frame: TimeFrame,

    #[serde(default)]
    pub misc_info: String,
}

impl TryFrom<ProfileForm> for FinancialProfile {
    type Error = ValidationError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        if form.has_debt == form.debts.is_empty() {
            return Err(ValidationError::InvalidProfile(if form.has_debt {
                "has_debt is set but no debts were listed".into()
            } else {
                "debts were listed but has_debt is not set".into()
            }));
        }

        if form.has_emergency_fund != form.months_covered.is_some() {
            return Err(ValidationError::InvalidProfile(
                "months_covered must be given exactly when has_emergency_fund is set".into(),
            ));
        }

        let profile = Self {
            income: form.income,
            expenses: form.expenses,
            debts: form.debts,
            savings: form.savings,
            investments: form.investments,
            financial_goals: form.financial_goals.into_iter().collect(),
            other_goal: form.other_goal.filter(|g| !g.trim().is_empty()),
            risk_tolerance: form.risk_tolerance,
            emergency_fund: EmergencyFund {
                exists: form.has_emergency_fund,
                months_covered: form.months_covered,
            },
            time_frame: form.time_frame,
            misc_info: form.misc_info,
        };

        profile.validate()?;
        Ok(profile)
    }
}


#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::fixtures::{sample_form, sample_profile};
    use super::*;

    #[test]
    fn test_sample_profile_is_valid() {
        assert!(sample_profile().validate().is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut profile = sample_profile();
        profile.expenses.groceries = dec!(-1);
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("groceries"));
    }

    #[test]
    fn test_negative_zero_accepted() {
        let mut profile = sample_profile();
        profile.savings = dec!(-0);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_amounts_must_serialize_exactly() {
        let mut profile = sample_profile();
        profile.income = dec!(4200.35);
        profile.expenses.groceries = dec!(0.3);
        profile.savings = dec!(123456789.25);
        assert!(profile.validate().is_ok());

        profile.savings = dec!(1234567890123456789.01);
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("savings"));

        profile.savings = dec!(2000);
        profile.expenses.housing = dec!(1500.0000000000000000001);
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("housing"));
        assert!(err.to_string().contains("precision"));
    }

    #[test]
    fn test_emergency_fund_invariant() {
        let mut profile = sample_profile();
        profile.emergency_fund = EmergencyFund {
            exists: true,
            months_covered: None,
        };
        assert!(profile.validate().is_err());

        profile.emergency_fund = EmergencyFund::covering(3);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_form_debt_declaration_must_match() {
        let mut form = sample_form();
        form.has_debt = true;
        assert!(FinancialProfile::try_from(form.clone()).is_err());

        form.debts = vec![Debt::new(DebtType::CreditCard, dec!(3000), dec!(19.9))];
        let profile = FinancialProfile::try_from(form.clone()).unwrap();
        assert_eq!(profile.debts.len(), 1);

        form.has_debt = false;
        assert!(FinancialProfile::try_from(form).is_err());
    }

    #[test]
    fn test_form_emergency_fund_must_match() {
        let mut form = sample_form();
        form.months_covered = Some(4);
        assert!(FinancialProfile::try_from(form.clone()).is_err());

        form.has_emergency_fund = true;
        let profile = FinancialProfile::try_from(form).unwrap();
        assert_eq!(profile.emergency_fund, EmergencyFund::covering(4));
    }

    #[test]
    fn test_form_goals_deduplicated_and_blank_other_dropped() {
        let mut form = sample_form();
        form.financial_goals = vec![
            FinancialGoal::Other,
            FinancialGoal::SavingForRetirement,
            FinancialGoal::Other,
        ];
        form.other_goal = Some("   ".into());

        let profile = FinancialProfile::try_from(form).unwrap();
        assert_eq!(profile.financial_goals.len(), 2);
        assert!(profile.other_goal.is_none());
    }

    #[test]
    fn test_form_deserializes_from_labels() {
        let json = r#"{
            "income": 4200,
            "expenses": {"housing": 1200, "utilities": 150, "groceries": 350,
                         "entertainment": 80, "transportation": 120, "other_expenses": 60},
            "has_debt": true,
            "debts": [{"debt_type": "Student Loan", "balance": 18000, "interest_rate": 4.5}],
            "savings": 900,
            "financial_goals": ["Paying off Debt", "Other"],
            "other_goal": "Buy a bike",
            "risk_tolerance": "Conservative",
            "has_emergency_fund": false,
            "time_frame": "2 years"
        }"#;

        let form: ProfileForm = serde_json::from_str(json).unwrap();
        let profile = FinancialProfile::try_from(form).unwrap();

        assert_eq!(profile.debts[0].debt_type, DebtType::StudentLoan);
        assert_eq!(profile.debts[0].interest_rate, dec!(4.5));
        assert_eq!(profile.time_frame, TimeFrame::TwoYears);
        assert_eq!(profile.other_goal.as_deref(), Some("Buy a bike"));
        assert!(profile.misc_info.is_empty());
    }
}
