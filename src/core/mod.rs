//! Core business logic - framework-agnostic cap table operations.
//!
//! The SAFE calculator, ownership engine, round admission, and validation are
//! pure and synchronous. The session ties them together; the explainer and the
//! draft store are the only async parts.

/// Saved round drafts in `SQLite`
pub mod drafts;
/// Sequenced natural-language explanations
pub mod explain;
/// Ownership aggregation and the ESOP pool
pub mod ownership;
/// Text rendering and the explanation summary
pub mod report;
/// Funding round admission and previews
pub mod round;
/// SAFE conversion at the valuation cap
pub mod safe;
/// The session store
pub mod session;
/// Field-level input validation
pub mod validation;
