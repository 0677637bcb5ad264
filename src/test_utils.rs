//! Shared test utilities for `SliceWise`.
//!
//! Helpers for setting up sessions, drafts, and an in-memory draft store with
//! sensible defaults.

use crate::{
    core::session::CapTableSession,
    errors::Result,
    models::{RoundDraft, RoundType},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with the draft table initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A session loaded with the two-founder, one-SAFE example.
///
/// # Defaults
/// * two founders with 4,500,000 shares each
/// * a $500,000 SAFE at a $5,000,000 cap
#[allow(clippy::expect_used)]
pub fn sample_session() -> CapTableSession {
    let mut session = CapTableSession::new();
    session
        .load_sample_data()
        .expect("sample data always validates");
    session
}

/// A seed round draft: $1.5M at a $6M pre-money valuation.
#[allow(clippy::expect_used)]
pub fn seed_draft() -> RoundDraft {
    RoundDraft {
        name: "Seed Round".to_string(),
        round_type: RoundType::Seed,
        amount: 1_500_000.0,
        valuation: 6_000_000.0,
        date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
    }
}

/// A round draft with custom terms.
#[allow(clippy::expect_used)]
pub fn custom_draft(name: &str, round_type: RoundType, amount: f64, valuation: f64) -> RoundDraft {
    RoundDraft {
        name: name.to_string(),
        round_type,
        amount,
        valuation,
        date: NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date"),
    }
}
