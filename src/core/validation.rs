//! Field-level validation for founders, the SAFE, and round drafts.
//!
//! Validation never panics and never short-circuits: every offending field gets
//! a human-readable message so the form can show all of them at once. Soft
//! checks land in `warnings` and do not block admission.

use crate::{
    errors::{Error, Result},
    models::RoundDraft,
};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// Largest founder grant accepted by the input forms.
pub const MAX_FOUNDER_SHARES: u64 = 1_000_000_000;
/// Largest SAFE amount or cap accepted by the input forms.
pub const MAX_SAFE_DOLLARS: f64 = 1_000_000_000_000.0;
/// Largest round amount or pre-money valuation accepted by the input forms.
pub const MAX_ROUND_DOLLARS: f64 = 1_000_000_000_000.0;
/// Smallest valuation (cap or pre-money) that is not treated as a typo.
pub const MIN_VALUATION: f64 = 1_000.0;
/// A round raising more than this share of its pre-money valuation is flagged.
pub const SOFT_MAX_AMOUNT_TO_VALUATION: f64 = 0.5;

/// Input field a message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Founder, SAFE, or round name
    Name,
    /// Founder share grant
    Shares,
    /// Dollars invested or raised
    Amount,
    /// Round pre-money valuation
    Valuation,
    /// SAFE valuation cap
    ValuationCap,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Shares => "shares",
            Self::Amount => "amount",
            Self::Valuation => "valuation",
            Self::ValuationCap => "valuationCap",
        })
    }
}

/// Blocking errors and soft warnings, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Problems that block the operation
    pub errors: BTreeMap<Field, String>,
    /// Sanity warnings shown next to the field but not blocking
    pub warnings: BTreeMap<Field, String>,
}

impl ValidationReport {
    /// `true` when there are no blocking errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for a field, if it has an error.
    #[must_use]
    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Message for a field, if it has a warning.
    #[must_use]
    pub fn warning(&self, field: Field) -> Option<&str> {
        self.warnings.get(&field).map(String::as_str)
    }

    pub(crate) fn reject(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    fn warn(&mut self, field: Field, message: impl Into<String>) {
        self.warnings.entry(field).or_insert_with(|| message.into());
    }

    /// Turns a report with errors into `Error::Validation`; a clean report
    /// (warnings allowed) is handed back.
    ///
    /// # Errors
    /// Returns `Error::Validation` if any field has a blocking error.
    pub fn into_result(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

fn check_name(report: &mut ValidationReport, name: &str, message: &str) {
    if name.trim().is_empty() {
        report.reject(Field::Name, message);
    }
}

/// Validates a founder's name and share grant.
#[must_use]
pub fn validate_founder(name: &str, shares: u64) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_name(&mut report, name, "Name is required");

    if shares == 0 {
        report.reject(Field::Shares, "Shares must be at least 1");
    } else if shares > MAX_FOUNDER_SHARES {
        report.reject(Field::Shares, "Shares cannot exceed 1,000,000,000");
    }

    report
}

/// Validates SAFE terms before the SAFE is stored.
#[must_use]
pub fn validate_safe(name: &str, amount: f64, valuation_cap: f64) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_name(&mut report, name, "SAFE name is required");

    if !amount.is_finite() || amount < 1.0 {
        report.reject(Field::Amount, "Investment amount must be at least $1");
    } else if amount > MAX_SAFE_DOLLARS {
        report.reject(Field::Amount, "Investment amount cannot exceed $1,000,000,000,000");
    }

    if !valuation_cap.is_finite() || valuation_cap < MIN_VALUATION {
        report.reject(Field::ValuationCap, "Valuation cap must be at least $1,000");
    } else if valuation_cap > MAX_SAFE_DOLLARS {
        report.reject(
            Field::ValuationCap,
            "Valuation cap cannot exceed $1,000,000,000,000",
        );
    }

    report
}

/// Validates a funding round draft.
///
/// Raising more than half the pre-money valuation only produces a warning.
#[must_use]
pub fn validate_round_draft(draft: &RoundDraft) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_name(&mut report, &draft.name, "Please enter a round name");

    let valuation_ok = draft.valuation.is_finite() && draft.valuation > 0.0;
    if !valuation_ok {
        report.reject(Field::Valuation, "Please enter a valid valuation");
    } else if draft.valuation < MIN_VALUATION {
        report.reject(Field::Valuation, "Valuation seems too low");
    } else if draft.valuation > MAX_ROUND_DOLLARS {
        report.reject(
            Field::Valuation,
            "Valuation cannot exceed $1,000,000,000,000",
        );
    }

    if !draft.amount.is_finite() || draft.amount <= 0.0 {
        report.reject(Field::Amount, "Please enter a valid amount");
    } else if draft.amount > MAX_ROUND_DOLLARS {
        report.reject(Field::Amount, "Amount cannot exceed $1,000,000,000,000");
    } else if valuation_ok && draft.amount > draft.valuation * SOFT_MAX_AMOUNT_TO_VALUATION {
        report.warn(
            Field::Amount,
            "Investment amount should typically be less than 50% of the valuation",
        );
    }

    report
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::RoundType;
    use chrono::NaiveDate;

    fn draft(name: &str, amount: f64, valuation: f64) -> RoundDraft {
        RoundDraft {
            name: name.to_string(),
            round_type: RoundType::Seed,
            amount,
            valuation,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_valid_founder() {
        assert!(validate_founder("Ada", 4_500_000).is_valid());
    }

    #[test]
    fn test_founder_errors() {
        let report = validate_founder("  ", 0);
        assert_eq!(report.error(Field::Name), Some("Name is required"));
        assert_eq!(report.error(Field::Shares), Some("Shares must be at least 1"));

        let report = validate_founder("Ada", MAX_FOUNDER_SHARES + 1);
        assert!(report.error(Field::Shares).is_some());
        assert!(report.error(Field::Name).is_none());
    }

    #[test]
    fn test_safe_errors() {
        assert!(validate_safe("Angel", 500_000.0, 5_000_000.0).is_valid());

        let report = validate_safe("", 0.0, 500.0);
        assert!(report.error(Field::Name).is_some());
        assert!(report.error(Field::Amount).is_some());
        assert!(report.error(Field::ValuationCap).is_some());

        let report = validate_safe("Angel", f64::NAN, f64::INFINITY);
        assert!(report.error(Field::Amount).is_some());
        assert!(report.error(Field::ValuationCap).is_some());
    }

    #[test]
    fn test_round_draft_valid() {
        let report = validate_round_draft(&draft("Seed", 1_500_000.0, 6_000_000.0));
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_round_draft_errors() {
        let report = validate_round_draft(&draft("", 0.0, -1.0));
        assert_eq!(report.error(Field::Name), Some("Please enter a round name"));
        assert_eq!(report.error(Field::Amount), Some("Please enter a valid amount"));
        assert_eq!(
            report.error(Field::Valuation),
            Some("Please enter a valid valuation")
        );
    }

    #[test]
    fn test_round_draft_low_valuation_blocks() {
        let report = validate_round_draft(&draft("Seed", 100.0, 999.0));
        assert_eq!(report.error(Field::Valuation), Some("Valuation seems too low"));
    }

    #[test]
    fn test_round_draft_large_raise_only_warns() {
        let report = validate_round_draft(&draft("Bridge", 4_000_000.0, 6_000_000.0));
        assert!(report.is_valid());
        assert!(report.warning(Field::Amount).is_some());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_round_draft_upper_bounds_block() {
        let report = validate_round_draft(&draft("Huge", 1e16, 1_000.0));
        assert_eq!(
            report.error(Field::Amount),
            Some("Amount cannot exceed $1,000,000,000,000")
        );

        let report = validate_round_draft(&draft("Huge", 1_000_000.0, 2e12));
        assert!(report.error(Field::Valuation).is_some());

        let report = validate_round_draft(&draft("Edge", MAX_ROUND_DOLLARS, MAX_ROUND_DOLLARS));
        assert!(report.is_valid());
    }

    #[test]
    fn test_into_result_carries_report() {
        let err = validate_round_draft(&draft("", 1.0, 6_000_000.0))
            .into_result()
            .unwrap_err();
        match err {
            Error::Validation(report) => {
                assert!(report.error(Field::Name).is_some());
                assert_eq!(report.to_string(), "name: Please enter a round name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
