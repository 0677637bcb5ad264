//! Cap table session store.
//!
//! One `CapTableSession` owns every entity of a modeling session. Each
//! transition validates its input, mutates the state, and synchronously
//! re-derives the ownership snapshot before returning, so readers never see a
//! stale table.

use crate::{
    core::{
        ownership::{OwnershipPolicy, compute_ownership_with},
        round::{Admission, RoundTerms, admit_round, round_terms},
        validation::{validate_founder, validate_safe},
    },
    errors::{Error, Result},
    models::{
        CapTableSnapshot, Founder, FundingRound, OwnershipSnapshot, RoundDraft, Safe,
    },
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Serializable part of a session. The derived snapshot is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionState {
    next_id: u64,
    #[serde(default, rename = "esopPoolPercent")]
    policy: OwnershipPolicy,
    founders: Vec<Founder>,
    safe: Option<Safe>,
    funding_rounds: Vec<FundingRound>,
}

/// The whole cap table being modeled, plus its derived ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SessionState", into = "SessionState")]
pub struct CapTableSession {
    state: SessionState,
    ownership: OwnershipSnapshot,
}

impl Default for CapTableSession {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SessionState> for CapTableSession {
    fn from(state: SessionState) -> Self {
        let mut session = Self {
            state,
            ownership: OwnershipSnapshot::default(),
        };
        session.derive();
        session
    }
}

impl From<CapTableSession> for SessionState {
    fn from(session: CapTableSession) -> Self {
        session.state
    }
}

impl CapTableSession {
    /// Creates an empty session with the default 10% ESOP policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(OwnershipPolicy::default())
    }

    /// Creates an empty session with a custom ESOP policy.
    #[must_use]
    pub fn with_policy(policy: OwnershipPolicy) -> Self {
        Self {
            state: SessionState {
                policy,
                ..SessionState::default()
            },
            ownership: OwnershipSnapshot::default(),
        }
    }

    /// Swaps the ESOP policy and re-derives.
    pub fn set_policy(&mut self, policy: OwnershipPolicy) {
        self.state.policy = policy;
        self.derive();
    }

    /// The ESOP policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &OwnershipPolicy {
        &self.state.policy
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.state.next_id += 1;
        format!("{prefix}-{}", self.state.next_id)
    }

    fn derive(&mut self) {
        self.ownership = compute_ownership_with(
            &self.state.policy,
            &self.state.founders,
            self.state.safe.as_ref(),
            &self.state.funding_rounds,
        );
    }

    /// Founders in insertion order.
    #[must_use]
    pub fn founders(&self) -> &[Founder] {
        &self.state.founders
    }

    /// The SAFE, if one is modeled.
    #[must_use]
    pub const fn safe(&self) -> Option<&Safe> {
        self.state.safe.as_ref()
    }

    /// Admitted rounds in order.
    #[must_use]
    pub fn funding_rounds(&self) -> &[FundingRound] {
        &self.state.funding_rounds
    }

    /// The current derived cap table.
    #[must_use]
    pub const fn ownership(&self) -> &OwnershipSnapshot {
        &self.ownership
    }

    /// Total shares including the ESOP pool; 0 means not yet computable.
    #[must_use]
    pub const fn total_shares(&self) -> u64 {
        self.ownership.total_shares
    }

    /// `true` when there is nothing in the session at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.founders.is_empty()
            && self.state.safe.is_none()
            && self.state.funding_rounds.is_empty()
    }

    /// Adds a founder.
    ///
    /// # Errors
    /// Returns `Error::Validation` for an empty name or an out-of-range grant.
    pub fn add_founder(&mut self, name: &str, shares: u64) -> Result<Founder> {
        validate_founder(name, shares).into_result()?;
        let founder = Founder {
            id: self.next_id("founder"),
            name: name.trim().to_string(),
            shares,
        };
        info!(id = %founder.id, name = %founder.name, shares, "Added founder");
        self.state.founders.push(founder.clone());
        self.derive();
        Ok(founder)
    }

    /// Renames a founder and/or changes their grant.
    ///
    /// # Errors
    /// Returns `Error::Validation` for bad input, `Error::NotFound` for an
    /// unknown id.
    pub fn update_founder(&mut self, id: &str, name: &str, shares: u64) -> Result<Founder> {
        validate_founder(name, shares).into_result()?;
        let founder = self
            .state
            .founders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::NotFound {
                entity: "founder",
                id: id.to_string(),
            })?;
        founder.name = name.trim().to_string();
        founder.shares = shares;
        let updated = founder.clone();
        info!(id, shares, "Updated founder");
        self.derive();
        Ok(updated)
    }

    /// Removes a founder.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id.
    pub fn remove_founder(&mut self, id: &str) -> Result<Founder> {
        let index = self
            .state
            .founders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| Error::NotFound {
                entity: "founder",
                id: id.to_string(),
            })?;
        let removed = self.state.founders.remove(index);
        info!(id, "Removed founder");
        self.derive();
        Ok(removed)
    }

    /// Sets the session's single SAFE, replacing any existing one as a unit.
    /// A replaced SAFE keeps its id.
    ///
    /// # Errors
    /// Returns `Error::Validation` for bad terms; the existing SAFE is left
    /// untouched in that case.
    pub fn set_safe(&mut self, name: &str, amount: f64, valuation_cap: f64) -> Result<Safe> {
        validate_safe(name, amount, valuation_cap).into_result()?;
        let id = match &self.state.safe {
            Some(existing) => existing.id.clone(),
            None => self.next_id("safe"),
        };
        let safe = Safe {
            id,
            name: name.trim().to_string(),
            amount,
            valuation_cap,
        };
        info!(id = %safe.id, amount, valuation_cap, "Set SAFE");
        self.state.safe = Some(safe.clone());
        self.derive();
        Ok(safe)
    }

    /// Removes the SAFE, returning it if there was one.
    pub fn remove_safe(&mut self) -> Option<Safe> {
        let removed = self.state.safe.take();
        if removed.is_some() {
            info!("Removed SAFE");
            self.derive();
        }
        removed
    }

    /// Live preview of a raise against the current total.
    #[must_use]
    pub fn preview_round(&self, amount: f64, valuation: f64) -> Option<RoundTerms> {
        round_terms(amount, valuation, self.total_shares())
    }

    /// Admits a round against the total share count as it stands right now.
    ///
    /// The round's shares and ownership are frozen: later founder or SAFE
    /// changes do not recompute them.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the draft has blocking errors or would
    /// overflow the share ceiling.
    pub fn admit_round(&mut self, draft: &RoundDraft) -> Result<Admission> {
        // The id is only consumed once admission succeeds.
        let id = format!("round-{}", self.state.next_id + 1);
        let admission = admit_round(id, draft, self.total_shares())?;
        self.state.next_id += 1;
        info!(
            id = %admission.round.id,
            name = %admission.round.name,
            shares = admission.round.shares,
            "Admitted funding round"
        );
        self.state.funding_rounds.push(admission.round.clone());
        self.derive();
        Ok(admission)
    }

    /// Removes a round. Rounds admitted after it keep their frozen numbers.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id.
    pub fn remove_round(&mut self, id: &str) -> Result<FundingRound> {
        let index = self
            .state
            .funding_rounds
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound {
                entity: "funding round",
                id: id.to_string(),
            })?;
        let removed = self.state.funding_rounds.remove(index);
        info!(id, "Removed funding round");
        self.derive();
        Ok(removed)
    }

    /// Removes every founder, the SAFE, and every round. Ids are never reused.
    pub fn clear(&mut self) {
        self.state.founders.clear();
        self.state.safe = None;
        self.state.funding_rounds.clear();
        info!("Cleared cap table");
        self.derive();
    }

    /// Replaces the session with the two-founder, one-SAFE example table.
    ///
    /// # Errors
    /// Only fails if the built-in sample data stops validating.
    pub fn load_sample_data(&mut self) -> Result<()> {
        self.clear();
        self.add_founder("Founder 1 (CEO)", 4_500_000)?;
        self.add_founder("Founder 2 (CTO)", 4_500_000)?;
        self.set_safe("Angel Investor SAFE", 500_000.0, 5_000_000.0)?;
        info!("Loaded sample data");
        Ok(())
    }

    /// Timestamped copy of the session for export.
    #[must_use]
    pub fn snapshot(&self) -> CapTableSnapshot {
        CapTableSnapshot {
            timestamp: chrono::Utc::now(),
            founders: self.state.founders.clone(),
            safe: self.state.safe.clone(),
            funding_rounds: self.state.funding_rounds.clone(),
            total_shares: self.ownership.total_shares,
            ownership: self.ownership.entries.clone(),
        }
    }
}
