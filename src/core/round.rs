//! Funding round admission and live round previews.
//!
//! A round's share count and ownership percentage are computed once, against the
//! total share count that existed right before the round, and then frozen onto
//! the round. Later changes to founders or the SAFE never touch them.

use crate::{
    core::validation::{Field, ValidationReport, validate_round_draft},
    errors::{Error, Result},
    models::{FundingRound, RoundDraft},
};
use serde::Serialize;
use tracing::{debug, warn};

/// Share base used when the cap table is still empty, so a round can be
/// previewed and admitted before any founder exists.
pub const DEFAULT_TOTAL_SHARES: u64 = 10_000_000;

/// Ceiling on pre-pool shares after a round; keeps every total far from
/// `u64` saturation.
pub const MAX_TOTAL_SHARES: u64 = 1_000_000_000_000_000;

/// Dilution band used for the suggested raise range.
const SUGGESTED_DILUTION_LOW: f64 = 0.15;
const SUGGESTED_DILUTION_HIGH: f64 = 0.25;

/// The share count a new round is priced against.
#[must_use]
pub const fn share_base(current_total_shares: u64) -> u64 {
    if current_total_shares == 0 {
        DEFAULT_TOTAL_SHARES
    } else {
        current_total_shares
    }
}

/// `round(amount / valuation * base)`, or 0 when the terms are unusable.
#[must_use]
pub fn issued_shares(amount: f64, valuation: f64, base: u64) -> u64 {
    if !(amount.is_finite() && valuation.is_finite() && amount > 0.0 && valuation > 0.0) {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let shares = (amount / valuation * base as f64).round();
    // Cast safety: finite and non-negative; saturates on absurd inputs.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let shares = shares as u64;
    shares
}

/// Investors' ownership right after the round, against the pre-round base.
#[must_use]
pub fn post_round_percentage(new_shares: u64, base: u64) -> f64 {
    let post = base.saturating_add(new_shares);
    if post == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = new_shares as f64 / post as f64 * 100.0;
    pct
}

/// Result of admitting a draft: the frozen round plus any soft warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    /// The round with frozen `shares` and `ownership_percentage`
    pub round: FundingRound,
    /// Non-blocking validation warnings
    pub warnings: ValidationReport,
}

/// Validates a draft and freezes its share issuance against
/// `current_total_shares` (the engine's total right before this round).
///
/// # Errors
/// Returns `Error::Validation` if the draft has blocking field errors, or if
/// the round would push the cap table past [`MAX_TOTAL_SHARES`].
pub fn admit_round(
    id: impl Into<String>,
    draft: &RoundDraft,
    current_total_shares: u64,
) -> Result<Admission> {
    let report = validate_round_draft(draft).into_result()?;
    for (field, message) in &report.warnings {
        warn!(round = %draft.name, %field, "{}", message);
    }

    let base = share_base(current_total_shares);
    let shares = issued_shares(draft.amount, draft.valuation, base);
    if shares > MAX_TOTAL_SHARES.saturating_sub(base) {
        let mut overflow = ValidationReport::default();
        overflow.reject(
            Field::Amount,
            "Round would issue more shares than the cap table can hold",
        );
        return Err(Error::Validation(overflow));
    }
    let ownership_percentage = post_round_percentage(shares, base);
    debug!(
        round = %draft.name,
        base,
        shares,
        ownership_percentage,
        "Admitted funding round"
    );

    Ok(Admission {
        round: FundingRound {
            id: id.into(),
            name: draft.name.trim().to_string(),
            round_type: draft.round_type,
            amount: draft.amount,
            valuation: draft.valuation,
            date: draft.date,
            shares,
            ownership_percentage,
        },
        warnings: report,
    })
}

/// Raise amounts that would give away between 15% and 25% of the company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuggestedRange {
    /// Raise for 15% dilution
    pub min: f64,
    /// Raise for 25% dilution
    pub max: f64,
}

/// Live preview of a round while it is being entered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTerms {
    /// Pre-money valuation plus the raise
    pub post_money_valuation: f64,
    /// `amount / post_money * 100`
    pub equity_percentage: f64,
    /// Pre-money valuation over the share base
    pub share_price: f64,
    /// Shares the round would issue
    pub new_shares: u64,
    /// Suggested raise band for the same valuation
    pub suggested_range: SuggestedRange,
}

/// Computes the live preview for a raise, or `None` until both numbers are
/// positive.
#[must_use]
pub fn round_terms(amount: f64, valuation: f64, current_total_shares: u64) -> Option<RoundTerms> {
    if !(amount.is_finite() && valuation.is_finite() && amount > 0.0 && valuation > 0.0) {
        return None;
    }
    let base = share_base(current_total_shares);
    let post_money_valuation = valuation + amount;

    #[allow(clippy::cast_precision_loss)]
    let share_price = valuation / base as f64;

    Some(RoundTerms {
        post_money_valuation,
        equity_percentage: amount / post_money_valuation * 100.0,
        share_price,
        new_shares: issued_shares(amount, valuation, base),
        suggested_range: SuggestedRange {
            min: valuation * SUGGESTED_DILUTION_LOW / (1.0 - SUGGESTED_DILUTION_LOW),
            max: valuation * SUGGESTED_DILUTION_HIGH / (1.0 - SUGGESTED_DILUTION_HIGH),
        },
    })
}

/// How much of the company a round gives away, in plain terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DilutionHealth {
    /// 20% or less
    Healthy,
    /// Above 20% up to 30%
    Moderate,
    /// Above 30%
    High,
}

impl DilutionHealth {
    /// Classifies an equity percentage given away in a round.
    #[must_use]
    pub fn classify(equity_percentage: f64) -> Self {
        if equity_percentage <= 20.0 {
            Self::Healthy
        } else if equity_percentage <= 30.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Short description shown next to the preview.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Healthy => "Conservative dilution",
            Self::Moderate => "Moderate dilution",
            Self::High => "High dilution - consider reducing",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::RoundType;
    use chrono::NaiveDate;

    fn seed_draft() -> RoundDraft {
        RoundDraft {
            name: "Seed Round".to_string(),
            round_type: RoundType::Seed,
            amount: 1_500_000.0,
            valuation: 6_000_000.0,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_admit_seed_round() {
        let admission = admit_round("round-1", &seed_draft(), 10_000_000).unwrap();
        let round = admission.round;

        assert_eq!(round.id, "round-1");
        assert_eq!(round.shares, 2_500_000);
        assert!((round.ownership_percentage - 20.0).abs() < 1e-9);
        assert_eq!(round.round_type, RoundType::Seed);
        assert!(admission.warnings.warnings.is_empty());
    }

    #[test]
    fn test_admit_round_on_empty_table_uses_default_base() {
        let admission = admit_round("round-1", &seed_draft(), 0).unwrap();
        assert_eq!(admission.round.shares, 2_500_000);
    }

    #[test]
    fn test_admit_round_uses_current_total() {
        let admission = admit_round("round-1", &seed_draft(), 11_000_000).unwrap();
        assert_eq!(admission.round.shares, 2_750_000);
        assert!((admission.round.ownership_percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_admit_round_rejects_invalid_draft() {
        let mut draft = seed_draft();
        draft.name = " ".to_string();
        draft.amount = 0.0;

        let err = admit_round("round-1", &draft, 10_000_000).unwrap_err();
        match err {
            Error::Validation(report) => {
                assert!(report.error(Field::Name).is_some());
                assert!(report.error(Field::Amount).is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_admit_round_large_raise_is_admitted_with_warning() {
        let mut draft = seed_draft();
        draft.amount = 4_000_000.0;

        let admission = admit_round("round-1", &draft, 10_000_000).unwrap();
        assert!(admission.warnings.warning(Field::Amount).is_some());
        // 4M / 6M * 10M
        assert_eq!(admission.round.shares, 6_666_667);
    }

    #[test]
    fn test_admit_round_rejects_share_overflow() {
        // Passes field validation, but would issue 1e16 shares
        let mut draft = seed_draft();
        draft.amount = 1_000_000_000_000.0;
        draft.valuation = 1_000.0;
        assert!(validate_round_draft(&draft).is_valid());

        let err = admit_round("round-1", &draft, 10_000_000).unwrap_err();
        match err {
            Error::Validation(report) => assert!(report.error(Field::Amount).is_some()),
            other => panic!("unexpected error: {other:?}"),
        }

        // Exactly at the ceiling is still admitted
        let mut draft = seed_draft();
        draft.amount = 99_999_999_000.0;
        draft.valuation = 1_000.0;
        let admission = admit_round("round-1", &draft, 10_000_000).unwrap();
        assert_eq!(admission.round.shares, MAX_TOTAL_SHARES - 10_000_000);
    }

    #[test]
    fn test_round_terms_preview() {
        let terms = round_terms(1_500_000.0, 6_000_000.0, 10_000_000).unwrap();
        assert!((terms.post_money_valuation - 7_500_000.0).abs() < 1e-6);
        assert!((terms.equity_percentage - 20.0).abs() < 1e-9);
        assert!((terms.share_price - 0.6).abs() < 1e-12);
        assert_eq!(terms.new_shares, 2_500_000);
        assert!((terms.suggested_range.min - 1_058_823.529).abs() < 1e-2);
        assert!((terms.suggested_range.max - 2_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_terms_requires_positive_inputs() {
        assert!(round_terms(0.0, 6_000_000.0, 10_000_000).is_none());
        assert!(round_terms(1_000.0, 0.0, 10_000_000).is_none());
        assert!(round_terms(f64::NAN, 6_000_000.0, 10_000_000).is_none());
    }

    #[test]
    fn test_dilution_health_bands() {
        assert_eq!(DilutionHealth::classify(15.0), DilutionHealth::Healthy);
        assert_eq!(DilutionHealth::classify(20.0), DilutionHealth::Healthy);
        assert_eq!(DilutionHealth::classify(25.0), DilutionHealth::Moderate);
        assert_eq!(DilutionHealth::classify(30.0), DilutionHealth::Moderate);
        assert_eq!(DilutionHealth::classify(30.1), DilutionHealth::High);
        assert_eq!(DilutionHealth::High.message(), "High dilution - consider reducing");
    }

    #[test]
    fn test_issued_shares_guards_bad_terms() {
        assert_eq!(issued_shares(-1.0, 6_000_000.0, 10), 0);
        assert_eq!(issued_shares(1.0, f64::INFINITY, 10), 0);
    }
}
