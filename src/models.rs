//! Domain models for the cap table: input entities and derived output.
//!
//! Field names serialize in camelCase so snapshots match the payloads the
//! presentation layer already consumes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A founder and their initial share allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Founder {
    /// Session-assigned identifier (e.g. `founder-1`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Shares held
    pub shares: u64,
}

/// A single SAFE note that converts at its valuation cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Safe {
    /// Session-assigned identifier (e.g. `safe-1`)
    pub id: String,
    /// Investor or instrument name
    pub name: String,
    /// Dollars invested
    pub amount: f64,
    /// Valuation cap in dollars
    pub valuation_cap: f64,
}

/// Stage of a priced funding round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundType {
    /// Pre-seed round
    PreSeed,
    /// Seed round
    Seed,
    /// Series A
    SeriesA,
    /// Series B
    SeriesB,
    /// Series C
    SeriesC,
    /// Series D
    SeriesD,
    /// Series E
    SeriesE,
    /// Series F
    SeriesF,
    /// Series G
    SeriesG,
    /// Series H
    SeriesH,
    /// Any other priced round, labeled "Custom"
    Other,
}

/// Typical amount and pre-money valuation for a round stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestedTerms {
    /// Suggested raise in dollars
    pub amount: f64,
    /// Suggested pre-money valuation in dollars
    pub valuation: f64,
}

impl RoundType {
    /// Every stage, in funding order.
    pub const ALL: [Self; 11] = [
        Self::PreSeed,
        Self::Seed,
        Self::SeriesA,
        Self::SeriesB,
        Self::SeriesC,
        Self::SeriesD,
        Self::SeriesE,
        Self::SeriesF,
        Self::SeriesG,
        Self::SeriesH,
        Self::Other,
    ];

    /// Human-readable label for tables and prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PreSeed => "Pre-Seed",
            Self::Seed => "Seed",
            Self::SeriesA => "Series A",
            Self::SeriesB => "Series B",
            Self::SeriesC => "Series C",
            Self::SeriesD => "Series D",
            Self::SeriesE => "Series E",
            Self::SeriesF => "Series F",
            Self::SeriesG => "Series G",
            Self::SeriesH => "Series H",
            Self::Other => "Custom",
        }
    }

    /// Default numbers offered when a founder asks for help picking terms.
    #[must_use]
    pub const fn suggested_terms(self) -> SuggestedTerms {
        let (amount, valuation) = match self {
            Self::PreSeed => (500_000.0, 2_000_000.0),
            Self::Seed => (1_500_000.0, 6_000_000.0),
            Self::SeriesA => (10_000_000.0, 40_000_000.0),
            Self::SeriesB => (30_000_000.0, 120_000_000.0),
            Self::SeriesC => (50_000_000.0, 200_000_000.0),
            Self::SeriesD => (100_000_000.0, 500_000_000.0),
            Self::SeriesE => (150_000_000.0, 1_000_000_000.0),
            Self::SeriesF => (200_000_000.0, 2_000_000_000.0),
            Self::SeriesG => (300_000_000.0, 4_000_000_000.0),
            Self::SeriesH => (400_000_000.0, 6_000_000_000.0),
            Self::Other => (5_000_000.0, 20_000_000.0),
        };
        SuggestedTerms { amount, valuation }
    }
}

impl fmt::Display for RoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User input for a round that has not been admitted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundDraft {
    /// Round name (e.g. "Seed Round")
    pub name: String,
    /// Stage
    #[serde(rename = "type")]
    pub round_type: RoundType,
    /// Dollars raised
    pub amount: f64,
    /// Pre-money valuation in dollars
    pub valuation: f64,
    /// Closing date
    pub date: NaiveDate,
}

/// An admitted round. `shares` and `ownership_percentage` are frozen at
/// admission and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRound {
    /// Session-assigned identifier (e.g. `round-1`)
    pub id: String,
    /// Round name
    pub name: String,
    /// Stage
    #[serde(rename = "type")]
    pub round_type: RoundType,
    /// Dollars raised
    pub amount: f64,
    /// Pre-money valuation in dollars
    pub valuation: f64,
    /// Closing date
    pub date: NaiveDate,
    /// New shares issued to the round's investors
    pub shares: u64,
    /// Investors' post-round ownership against the pre-round base
    pub ownership_percentage: f64,
}

/// Category of a cap table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A founder's grant
    Founder,
    /// The converted SAFE
    Safe,
    /// Shares issued in a priced round
    Investor,
    /// The employee option pool
    Esop,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Founder => "Founder",
            Self::Safe => "SAFE",
            Self::Investor => "Investor",
            Self::Esop => "ESOP",
        })
    }
}

/// One derived row of the cap table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipEntry {
    /// Id of the source entity, or `esop` for the pool
    pub id: String,
    /// Display name
    pub name: String,
    /// Shares held
    pub shares: u64,
    /// Percentage of total shares, in [0, 100]
    pub ownership_percentage: f64,
    /// Row category
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Chart color (hex or `hsl(...)`)
    pub color: String,
}

/// Immutable output of one ownership computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipSnapshot {
    /// Rows in display order: founders, SAFE, rounds, ESOP
    pub entries: Vec<OwnershipEntry>,
    /// Sum of all entry shares
    pub total_shares: u64,
}

impl OwnershipSnapshot {
    /// `false` while there are no shares at all; callers treat that as
    /// "not yet computable" rather than an error.
    #[must_use]
    pub const fn is_computable(&self) -> bool {
        self.total_shares > 0
    }

    /// Looks up a row by the id of its source entity.
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&OwnershipEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The ESOP pool row, if any.
    #[must_use]
    pub fn esop(&self) -> Option<&OwnershipEntry> {
        self.entries.iter().find(|e| e.kind == EntryKind::Esop)
    }

    /// Combined percentage of all rows of one kind.
    #[must_use]
    pub fn percentage_of(&self, kind: EntryKind) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.ownership_percentage)
            .sum()
    }

    /// Combined founder percentage.
    #[must_use]
    pub fn founder_percentage(&self) -> f64 {
        self.percentage_of(EntryKind::Founder)
    }
}

/// Timestamped copy of a whole session, suitable for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapTableSnapshot {
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
    /// Founders in insertion order
    pub founders: Vec<Founder>,
    /// The SAFE, if one is modeled
    pub safe: Option<Safe>,
    /// Admitted rounds in order
    pub funding_rounds: Vec<FundingRound>,
    /// Total shares including the ESOP pool
    pub total_shares: u64,
    /// Derived rows
    pub ownership: Vec<OwnershipEntry>,
}
