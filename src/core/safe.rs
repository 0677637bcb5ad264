//! SAFE conversion at the valuation cap.
//!
//! A SAFE is modeled as converting immediately at its cap price. There is no
//! discount-rate comparison: the cap price is always used.

use crate::models::Safe;
use tracing::debug;

/// Returns `true` when the SAFE carries a usable price basis.
fn has_valid_terms(safe: &Safe) -> bool {
    safe.amount.is_finite()
        && safe.amount > 0.0
        && safe.valuation_cap.is_finite()
        && safe.valuation_cap > 0.0
}

/// Price per share implied by the valuation cap over `reference_shares`.
///
/// Returns `None` when there is no valid price basis (no reference shares or
/// non-positive terms).
#[must_use]
pub fn price_per_share(safe: &Safe, reference_shares: u64) -> Option<f64> {
    if reference_shares == 0 || !has_valid_terms(safe) {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let reference = reference_shares as f64;
    Some(safe.valuation_cap / reference)
}

/// Number of shares a SAFE converts into, priced at its cap.
///
/// `reference_shares` is the founder share count that defines the price basis.
/// Computed as `amount * reference_shares / valuation_cap` and rounded to the
/// nearest whole share. Returns 0 if the SAFE is absent, the reference is 0, or
/// the terms are not finite positive numbers.
#[must_use]
pub fn safe_shares(safe: Option<&Safe>, reference_shares: u64) -> u64 {
    let Some(safe) = safe else {
        return 0;
    };
    if reference_shares == 0 || !has_valid_terms(safe) {
        return 0;
    }

    #[allow(clippy::cast_precision_loss)]
    let converted = safe.amount * reference_shares as f64 / safe.valuation_cap;
    if !converted.is_finite() || converted <= 0.0 {
        return 0;
    }

    // Cast safety: `converted` is finite and positive; values beyond u64::MAX
    // saturate, which is far outside any realistic cap table.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let shares = converted.round() as u64;
    debug!(
        safe = %safe.name,
        reference_shares,
        shares,
        "Converted SAFE at valuation cap"
    );
    shares
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use proptest::prelude::*;

    fn safe(amount: f64, valuation_cap: f64) -> Safe {
        Safe {
            id: "safe-1".to_string(),
            name: "Angel SAFE".to_string(),
            amount,
            valuation_cap,
        }
    }

    #[test]
    fn test_safe_shares_at_cap() {
        // $500k at a $5M cap over 9M founder shares
        let s = safe(500_000.0, 5_000_000.0);
        assert_eq!(safe_shares(Some(&s), 9_000_000), 900_000);

        let price = price_per_share(&s, 9_000_000).unwrap();
        assert!((price - 0.555_555_555).abs() < 1e-6);
    }

    #[test]
    fn test_safe_shares_zero_reference_is_guarded() {
        let s = safe(500_000.0, 5_000_000.0);
        assert_eq!(safe_shares(Some(&s), 0), 0);
        assert!(price_per_share(&s, 0).is_none());
    }

    #[test]
    fn test_safe_shares_absent_safe() {
        assert_eq!(safe_shares(None, 9_000_000), 0);
    }

    #[test]
    fn test_safe_shares_invalid_terms() {
        assert_eq!(safe_shares(Some(&safe(0.0, 5_000_000.0)), 1_000), 0);
        assert_eq!(safe_shares(Some(&safe(-10.0, 5_000_000.0)), 1_000), 0);
        assert_eq!(safe_shares(Some(&safe(500_000.0, 0.0)), 1_000), 0);
        assert_eq!(safe_shares(Some(&safe(500_000.0, -1.0)), 1_000), 0);
        assert_eq!(safe_shares(Some(&safe(f64::NAN, 5_000_000.0)), 1_000), 0);
        assert_eq!(safe_shares(Some(&safe(500_000.0, f64::INFINITY)), 1_000), 0);
    }

    #[test]
    fn test_safe_shares_rounds_to_nearest_share() {
        // 1000 * 10 / 3 = 3333.33...
        assert_eq!(safe_shares(Some(&safe(1_000.0, 3.0)), 10), 3_333);
        // 2000 * 10 / 3 = 6666.66...
        assert_eq!(safe_shares(Some(&safe(2_000.0, 3.0)), 10), 6_667);
    }

    proptest! {
        #[test]
        fn prop_zero_reference_always_zero(
            amount in 1.0f64..1e12,
            cap in 1_000.0f64..1e12,
        ) {
            prop_assert_eq!(safe_shares(Some(&safe(amount, cap)), 0), 0);
        }

        #[test]
        fn prop_more_money_means_more_shares(
            amount in 10_000.0f64..5_000_000.0,
            cap in 1_000_000.0f64..100_000_000.0,
            reference in 1_000_000u64..100_000_000,
        ) {
            let base = safe_shares(Some(&safe(amount, cap)), reference);
            let larger = safe_shares(Some(&safe(amount * 2.0, cap)), reference);
            prop_assert!(larger > base);
        }

        #[test]
        fn prop_higher_cap_means_fewer_shares(
            amount in 10_000.0f64..5_000_000.0,
            cap in 1_000_000.0f64..100_000_000.0,
            reference in 1_000_000u64..100_000_000,
        ) {
            let base = safe_shares(Some(&safe(amount, cap)), reference);
            let higher_cap = safe_shares(Some(&safe(amount, cap * 2.0)), reference);
            prop_assert!(higher_cap < base);
        }
    }
}
