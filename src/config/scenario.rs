//! Scenario loading from config.toml
//!
//! A scenario file describes a starting cap table: founders, an optional SAFE,
//! and the funding rounds to admit in order. Rounds are admitted one by one,
//! each against the total that existed right before it.

use crate::{
    core::{explain::ExplanationStyle, ownership::OwnershipPolicy, session::CapTableSession},
    errors::{Error, Result},
    models::RoundDraft,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Used when `SLICEWISE_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// The whole scenario file
#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    /// Target ESOP pool as a percentage of the post-pool total (default 10)
    #[serde(default)]
    pub esop_pool_percent: Option<f64>,
    /// Default tone for explanations
    #[serde(default)]
    pub explanation_style: Option<ExplanationStyle>,
    /// Founders in display order
    #[serde(default)]
    pub founders: Vec<FounderConfig>,
    /// The single SAFE, if any
    #[serde(default)]
    pub safe: Option<SafeConfig>,
    /// Rounds admitted in order
    #[serde(default)]
    pub rounds: Vec<RoundDraft>,
}

/// A founder entry
#[derive(Debug, Deserialize, Clone)]
pub struct FounderConfig {
    /// Display name
    pub name: String,
    /// Shares granted
    pub shares: u64,
}

/// The SAFE entry
#[derive(Debug, Deserialize, Clone)]
pub struct SafeConfig {
    /// Investor or instrument name
    pub name: String,
    /// Dollars invested
    pub amount: f64,
    /// Valuation cap in dollars
    pub valuation_cap: f64,
}

impl ScenarioConfig {
    /// Builds a session from the scenario.
    ///
    /// # Errors
    /// Returns `Error::Config` for an invalid pool percentage, or
    /// `Error::Validation` for the first entity that fails validation.
    pub fn build_session(&self) -> Result<CapTableSession> {
        let policy = match self.esop_pool_percent {
            Some(percent) => OwnershipPolicy::new(percent)?,
            None => OwnershipPolicy::default(),
        };
        let mut session = CapTableSession::with_policy(policy);

        for founder in &self.founders {
            session.add_founder(&founder.name, founder.shares)?;
        }
        if let Some(safe) = &self.safe {
            session.set_safe(&safe.name, safe.amount, safe.valuation_cap)?;
        }
        for round in &self.rounds {
            session.admit_round(round)?;
        }

        debug!(
            founders = self.founders.len(),
            rounds = self.rounds.len(),
            total_shares = session.total_shares(),
            "Built session from scenario"
        );
        Ok(session)
    }
}

/// Loads a scenario from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read scenario file {}: {e}", path.as_ref().display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse scenario file: {e}"),
    })
}

/// Resolves which scenario to load.
///
/// An explicitly named file must exist and parse. Without one, a missing
/// `default_path` yields `Ok(None)`, while a present but broken file is still
/// an error.
///
/// # Errors
/// Returns `Error::Config` if the chosen file cannot be read or parsed.
pub fn resolve_config(
    explicit_path: Option<&Path>,
    default_path: &Path,
) -> Result<Option<ScenarioConfig>> {
    match explicit_path {
        Some(path) => load_config(path).map(Some),
        None if !default_path.exists() => {
            debug!(path = %default_path.display(), "No scenario file present");
            Ok(None)
        }
        None => load_config(default_path).map(Some),
    }
}

/// Loads the scenario named by `SLICEWISE_CONFIG`, or `./config.toml` if it
/// exists. Returns `Ok(None)` when neither applies.
///
/// # Errors
/// Returns an error if the chosen file cannot be read or parsed.
pub fn load_default_config() -> Result<Option<ScenarioConfig>> {
    let explicit = std::env::var_os("SLICEWISE_CONFIG")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    resolve_config(explicit.as_deref(), Path::new(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::RoundType;

    const SCENARIO: &str = r#"
        explanation_style = "expert"

        [[founders]]
        name = "Founder 1 (CEO)"
        shares = 4500000

        [[founders]]
        name = "Founder 2 (CTO)"
        shares = 4500000

        [safe]
        name = "Angel Investor SAFE"
        amount = 500000.0
        valuation_cap = 5000000.0

        [[rounds]]
        name = "Seed Round"
        type = "seed"
        amount = 1500000.0
        valuation = 6000000.0
        date = "2024-06-01"
    "#;

    #[test]
    fn test_parse_scenario() {
        let config: ScenarioConfig = toml::from_str(SCENARIO).unwrap();
        assert_eq!(config.founders.len(), 2);
        assert_eq!(config.founders[0].shares, 4_500_000);
        assert_eq!(config.safe.as_ref().unwrap().valuation_cap, 5_000_000.0);
        assert_eq!(config.rounds[0].round_type, RoundType::Seed);
        assert_eq!(config.explanation_style, Some(ExplanationStyle::Expert));
        assert!(config.esop_pool_percent.is_none());
    }

    #[test]
    fn test_build_session_admits_rounds_in_order() {
        let config: ScenarioConfig = toml::from_str(SCENARIO).unwrap();
        let session = config.build_session().unwrap();

        assert_eq!(session.founders().len(), 2);
        assert!(session.safe().is_some());
        // Seed priced against the 11,000,000 two-founder table
        assert_eq!(session.funding_rounds()[0].shares, 2_750_000);
        assert_eq!(session.total_shares(), 14_055_556);
    }

    #[test]
    fn test_empty_scenario_builds_empty_session() {
        let config: ScenarioConfig = toml::from_str("").unwrap();
        let session = config.build_session().unwrap();
        assert!(session.is_empty());
        assert_eq!(session.total_shares(), 0);
    }

    #[test]
    fn test_custom_pool_percent() {
        let config: ScenarioConfig = toml::from_str(
            r#"
            esop_pool_percent = 20.0

            [[founders]]
            name = "Solo"
            shares = 8000000
            "#,
        )
        .unwrap();
        let session = config.build_session().unwrap();
        assert_eq!(session.total_shares(), 10_000_000);
    }

    #[test]
    fn test_invalid_entries_are_rejected() {
        let config: ScenarioConfig = toml::from_str(
            r#"
            esop_pool_percent = 100.0
            "#,
        )
        .unwrap();
        assert!(matches!(config.build_session(), Err(Error::Config { .. })));

        let config: ScenarioConfig = toml::from_str(
            r#"
            [[founders]]
            name = ""
            shares = 10
            "#,
        )
        .unwrap();
        assert!(matches!(config.build_session(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    fn scratch_file(tag: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "slicewise-{tag}-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_resolve_without_any_file_is_none() {
        let resolved = resolve_config(None, Path::new("does/not/exist.toml")).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn test_resolve_explicit_missing_file_is_an_error() {
        let missing = Path::new("does/not/exist.toml");
        let err = resolve_config(Some(missing), Path::new(DEFAULT_CONFIG_PATH)).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_resolve_broken_default_is_an_error() {
        let broken = scratch_file("broken", "[[founders]\nname = ");
        let result = resolve_config(None, &broken);
        std::fs::remove_file(&broken).unwrap();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_resolve_prefers_explicit_file() {
        let explicit = scratch_file("explicit", SCENARIO);
        let result = resolve_config(Some(explicit.as_path()), Path::new("does/not/exist.toml"));
        std::fs::remove_file(&explicit).unwrap();
        assert_eq!(result.unwrap().unwrap().founders.len(), 2);
    }
}
