//! Text rendering of cap tables and the round summary sent for explanation.
//!
//! Everything here is pure formatting: numbers in, strings out. Callers decide
//! where the text goes (terminal, prompt, export).

use crate::{
    core::{explain::ExplanationStyle, round::DilutionHealth, session::CapTableSession},
    models::{EntryKind, FundingRound, OwnershipSnapshot},
};
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Width of the ownership bar in rendered tables.
const BAR_LENGTH: usize = 20;

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a share count with thousands separators: `11,000,000`.
#[must_use]
pub fn format_number(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Formats whole dollars: `$1,500,000`, `-$25`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$-".to_string();
    }
    let rounded = amount.abs().round();
    // Cast safety: finite, non-negative, and rounded; saturates beyond u64.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let dollars = rounded as u64;
    let sign = if amount < 0.0 && dollars > 0 { "-" } else { "" };
    format!("{sign}${}", format_number(dollars))
}

/// Formats a percentage with two decimals: `40.91%`.
#[must_use]
pub fn format_percent(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// Text bar for an ownership share, e.g. `[████░░░░░░]`.
///
/// The percentage is clamped to [0, 100] for drawing.
#[must_use]
pub fn format_ownership_bar(percentage: f64, bar_length: usize) -> String {
    let clamped = if percentage.is_finite() {
        percentage.clamp(0.0, 100.0)
    } else {
        0.0
    };

    // Cast safety: clamped ∈ [0, 100] and bar_length is small.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * bar_length as f64).round() as usize;
    let empty = bar_length.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Renders the cap table as a fixed-width text table with a total row.
///
/// An empty snapshot renders a single explanatory line.
#[must_use]
pub fn render_cap_table(snapshot: &OwnershipSnapshot) -> String {
    if !snapshot.is_computable() {
        return "No shares issued yet. Add a founder to start the cap table.\n".to_string();
    }

    let name_width = snapshot
        .entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Holder".len());

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<8}  {:>14}  {:>9}  Share",
        "Holder", "Type", "Shares", "Ownership"
    );
    let _ = writeln!(out, "{}", "-".repeat(name_width + 2 + 8 + 2 + 14 + 2 + 9 + 2 + BAR_LENGTH + 2));

    for entry in &snapshot.entries {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<8}  {:>14}  {:>9}  {}",
            entry.name,
            entry.kind.to_string(),
            format_number(entry.shares),
            format_percent(entry.ownership_percentage),
            format_ownership_bar(entry.ownership_percentage, BAR_LENGTH)
        );
    }

    let total_percent: f64 = snapshot
        .entries
        .iter()
        .map(|e| e.ownership_percentage)
        .sum();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<8}  {:>14}  {:>9}",
        "Total",
        "",
        format_number(snapshot.total_shares),
        format_percent(total_percent)
    );
    out
}

/// Plain description of one admitted round and the table it landed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    /// Round name
    pub round_name: String,
    /// Stage label, e.g. "Series A"
    pub stage: String,
    /// Dollars raised
    pub amount: f64,
    /// Pre-money valuation
    pub valuation: f64,
    /// Pre-money plus the raise
    pub post_money_valuation: f64,
    /// Shares issued in the round
    pub shares_issued: u64,
    /// Investors' frozen post-round ownership
    pub ownership_percentage: f64,
    /// How heavy the dilution is
    pub dilution: DilutionHealth,
    /// Founders in the session
    pub founder_count: usize,
    /// Combined founder ownership today
    pub founder_percentage: f64,
    /// Whether a SAFE is modeled
    pub has_safe: bool,
    /// Admitted rounds in the session
    pub round_count: usize,
    /// Current total shares including the pool
    pub total_shares: u64,
}

impl RoundSummary {
    /// Gathers the summary for `round` against the session's current state.
    #[must_use]
    pub fn new(round: &FundingRound, session: &CapTableSession) -> Self {
        let ownership = session.ownership();
        Self {
            round_name: round.name.clone(),
            stage: round.round_type.label().to_string(),
            amount: round.amount,
            valuation: round.valuation,
            post_money_valuation: round.valuation + round.amount,
            shares_issued: round.shares,
            ownership_percentage: round.ownership_percentage,
            dilution: DilutionHealth::classify(round.ownership_percentage),
            founder_count: session.founders().len(),
            founder_percentage: ownership.percentage_of(EntryKind::Founder),
            has_safe: session.safe().is_some(),
            round_count: session.funding_rounds().len(),
            total_shares: ownership.total_shares,
        }
    }
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Round: {} ({})", self.round_name, self.stage)?;
        writeln!(f, "Amount raised: {}", format_currency(self.amount))?;
        writeln!(f, "Pre-money valuation: {}", format_currency(self.valuation))?;
        writeln!(
            f,
            "Post-money valuation: {}",
            format_currency(self.post_money_valuation)
        )?;
        writeln!(f, "Shares issued: {}", format_number(self.shares_issued))?;
        writeln!(
            f,
            "Investor ownership after the round: {} ({})",
            format_percent(self.ownership_percentage),
            self.dilution.message()
        )?;
        writeln!(
            f,
            "Founders: {} holding {} combined",
            self.founder_count,
            format_percent(self.founder_percentage)
        )?;
        writeln!(
            f,
            "SAFE outstanding: {}",
            if self.has_safe { "yes" } else { "no" }
        )?;
        writeln!(f, "Funding rounds so far: {}", self.round_count)?;
        write!(f, "Total shares: {}", format_number(self.total_shares))
    }
}

/// Builds the prompt sent to the explanation service.
#[must_use]
pub fn build_explanation_prompt(summary: &RoundSummary, style: ExplanationStyle) -> String {
    format!(
        "A startup just modeled a funding round on its cap table.\n\n{summary}\n\n{}\n\
         Describe how this round changes who owns the company, in at most three short paragraphs.",
        style.instruction()
    )
}
