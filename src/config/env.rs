//! Explanation settings from environment variables.
//!
//! `SLICEWISE_EXPLANATION_STYLE` overrides the scenario's default tone and
//! `SLICEWISE_FALLBACK_MESSAGE` replaces the text shown when the explanation
//! service fails. Both are optional and usually come from `.env`.

use crate::{
    core::explain::{DEFAULT_FALLBACK_MESSAGE, ExplanationStyle},
    errors::Result,
};

/// Environment variable selecting the explanation tone.
pub const STYLE_VAR: &str = "SLICEWISE_EXPLANATION_STYLE";
/// Environment variable replacing the fallback message.
pub const FALLBACK_VAR: &str = "SLICEWISE_FALLBACK_MESSAGE";

/// Resolved explanation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationSettings {
    /// Tone used for explanation prompts
    pub style: ExplanationStyle,
    /// Text shown when the service fails
    pub fallback_message: String,
}

impl ExplanationSettings {
    /// Reads the settings from the process environment.
    ///
    /// # Errors
    /// Returns `Error::Config` if the style variable names an unknown style.
    pub fn from_env(default_style: ExplanationStyle) -> Result<Self> {
        Self::from_lookup(default_style, |key| std::env::var(key).ok())
    }

    /// Resolves the settings with a custom variable lookup. Blank values count
    /// as unset.
    ///
    /// # Errors
    /// Returns `Error::Config` if the style variable names an unknown style.
    pub fn from_lookup<F>(default_style: ExplanationStyle, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let style = match non_blank(STYLE_VAR) {
            Some(value) => value.parse()?,
            None => default_style,
        };
        let fallback_message =
            non_blank(FALLBACK_VAR).unwrap_or_else(|| DEFAULT_FALLBACK_MESSAGE.to_string());

        Ok(Self {
            style,
            fallback_message,
        })
    }
}
