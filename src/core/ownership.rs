//! Ownership aggregation engine.
//!
//! Derives the full cap table from founders, the optional SAFE, and the admitted
//! funding rounds. The computation is pure: the same inputs always produce the
//! same snapshot, colors included.
//!
//! Order of operations:
//! 1. sum founder shares
//! 2. convert the SAFE against the founder share count
//! 3. add the frozen share counts of every round
//! 4. size the ESOP pool so it is the target share of the *post-pool* total
//! 5. emit one row per founder, the SAFE, each round, and the pool

use crate::{
    core::safe::safe_shares,
    errors::{Error, Result},
    models::{EntryKind, Founder, FundingRound, OwnershipEntry, OwnershipSnapshot, Safe},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Colors assigned to founders by index, wrapping around.
pub const FOUNDER_PALETTE: [&str; 8] = [
    "#1E40AF", // blue
    "#0D9488", // teal
    "#F97316", // orange
    "#4F46E5", // indigo
    "#9333EA", // purple
    "#10B981", // emerald
    "#EC4899", // pink
    "#F59E0B", // amber
];

/// Reserved color for the SAFE row.
pub const SAFE_COLOR: &str = "#DC2626";

/// Reserved color for the ESOP pool row.
pub const ESOP_COLOR: &str = "#6B7280";

/// Id used for the ESOP pool row.
pub const ESOP_ENTRY_ID: &str = "esop";

/// Display name of the ESOP pool row.
pub const ESOP_ENTRY_NAME: &str = "ESOP Pool";

/// Golden angle in degrees; consecutive rounds land far apart on the hue wheel.
const GOLDEN_ANGLE_DEGREES: f64 = 137.508;

const BASIS_POINTS: u64 = 10_000;

/// Sizing rule for the employee option pool.
///
/// Serializes as the bare pool percentage; deserializing re-validates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct OwnershipPolicy {
    esop_pool_percent: f64,
}

impl Default for OwnershipPolicy {
    fn default() -> Self {
        Self {
            esop_pool_percent: 10.0,
        }
    }
}

impl TryFrom<f64> for OwnershipPolicy {
    type Error = Error;

    fn try_from(esop_pool_percent: f64) -> Result<Self> {
        Self::new(esop_pool_percent)
    }
}

impl From<OwnershipPolicy> for f64 {
    fn from(policy: OwnershipPolicy) -> Self {
        policy.esop_pool_percent
    }
}

impl OwnershipPolicy {
    /// Creates a policy whose pool is `esop_pool_percent` of the post-pool total.
    ///
    /// # Errors
    /// Returns `Error::Config` unless the percentage is finite and in `(0, 100)`.
    pub fn new(esop_pool_percent: f64) -> Result<Self> {
        if !esop_pool_percent.is_finite() || esop_pool_percent <= 0.0 || esop_pool_percent >= 100.0
        {
            return Err(Error::Config {
                message: format!(
                    "ESOP pool percentage must be between 0 and 100, got {esop_pool_percent}"
                ),
            });
        }
        Ok(Self { esop_pool_percent })
    }

    /// Target pool size as a percentage of total shares.
    #[must_use]
    pub const fn esop_pool_percent(&self) -> f64 {
        self.esop_pool_percent
    }

    /// Pool size in shares for a given pre-pool share count.
    ///
    /// Solves `pool = p * (pre + pool)`, i.e. `pool = pre * p / (1 - p)`, in
    /// integer arithmetic and rounds half up. At 10% this is `pre / 9`.
    #[must_use]
    pub fn esop_shares(&self, pre_esop_shares: u64) -> u64 {
        // Cast safety: the percentage is validated to (0, 100), so basis points
        // are in [0, 10_000].
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bps = ((self.esop_pool_percent * 100.0).round() as u64).min(BASIS_POINTS - 1);
        if bps == 0 || pre_esop_shares == 0 {
            return 0;
        }

        let numerator = u128::from(pre_esop_shares) * u128::from(bps);
        let denominator = u128::from(BASIS_POINTS - bps);
        let rounded = (numerator * 2 + denominator) / (denominator * 2);
        u64::try_from(rounded).unwrap_or(u64::MAX)
    }
}

/// Deterministic color for the founder at `index`.
#[must_use]
pub fn founder_color(index: usize) -> &'static str {
    FOUNDER_PALETTE[index % FOUNDER_PALETTE.len()]
}

/// Deterministic color for the funding round at `index`.
#[must_use]
pub fn round_color(index: usize) -> String {
    #[allow(clippy::cast_precision_loss)]
    let hue = (index as f64 * GOLDEN_ANGLE_DEGREES) % 360.0;
    format!("hsl({hue:.1}, 65%, 55%)")
}

fn percentage(shares: u64, total_shares: u64) -> f64 {
    if total_shares == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = shares as f64 / total_shares as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

/// Computes the cap table with the default 10% ESOP policy.
#[must_use]
pub fn compute_ownership(
    founders: &[Founder],
    safe: Option<&Safe>,
    funding_rounds: &[FundingRound],
) -> OwnershipSnapshot {
    compute_ownership_with(&OwnershipPolicy::default(), founders, safe, funding_rounds)
}

/// Computes the cap table under an explicit pool policy.
///
/// An input with no shares at all yields an empty snapshot with
/// `total_shares == 0`.
#[must_use]
pub fn compute_ownership_with(
    policy: &OwnershipPolicy,
    founders: &[Founder],
    safe: Option<&Safe>,
    funding_rounds: &[FundingRound],
) -> OwnershipSnapshot {
    let founder_shares = founders
        .iter()
        .fold(0u64, |acc, f| acc.saturating_add(f.shares));
    let safe_shares = safe_shares(safe, founder_shares);
    let round_shares = funding_rounds
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.shares));

    let pre_esop_shares = founder_shares
        .saturating_add(safe_shares)
        .saturating_add(round_shares);
    let esop_shares = policy.esop_shares(pre_esop_shares);
    let total_shares = pre_esop_shares.saturating_add(esop_shares);

    debug!(
        founder_shares,
        safe_shares, round_shares, esop_shares, total_shares, "Computed ownership totals"
    );

    if total_shares == 0 {
        return OwnershipSnapshot::default();
    }

    let mut entries = Vec::with_capacity(founders.len() + funding_rounds.len() + 2);

    for (index, founder) in founders.iter().enumerate() {
        entries.push(OwnershipEntry {
            id: founder.id.clone(),
            name: founder.name.clone(),
            shares: founder.shares,
            ownership_percentage: percentage(founder.shares, total_shares),
            kind: EntryKind::Founder,
            color: founder_color(index).to_string(),
        });
    }

    if let Some(safe) = safe.filter(|_| safe_shares > 0) {
        entries.push(OwnershipEntry {
            id: safe.id.clone(),
            name: safe.name.clone(),
            shares: safe_shares,
            ownership_percentage: percentage(safe_shares, total_shares),
            kind: EntryKind::Safe,
            color: SAFE_COLOR.to_string(),
        });
    }

    for (index, round) in funding_rounds.iter().enumerate() {
        entries.push(OwnershipEntry {
            id: round.id.clone(),
            name: round.name.clone(),
            shares: round.shares,
            ownership_percentage: percentage(round.shares, total_shares),
            kind: EntryKind::Investor,
            color: round_color(index),
        });
    }

    // One pool row for any non-empty table, even when a tiny table rounds
    // the pool down to zero shares.
    if pre_esop_shares > 0 {
        entries.push(OwnershipEntry {
            id: ESOP_ENTRY_ID.to_string(),
            name: ESOP_ENTRY_NAME.to_string(),
            shares: esop_shares,
            ownership_percentage: percentage(esop_shares, total_shares),
            kind: EntryKind::Esop,
            color: ESOP_COLOR.to_string(),
        });
    }

    OwnershipSnapshot {
        entries,
        total_shares,
    }
}
