//! Natural-language explanations of cap table changes.
//!
//! The text itself comes from an external service behind the
//! [`ExplanationService`] trait. [`Explainer`] sits in front of it and owns the
//! two rules the engine cares about:
//!
//! * every request gets a monotonic sequence number, and a response is shown
//!   only if no newer request has been issued since (last initiated wins);
//! * a failing service never surfaces an error, the fallback message is shown
//!   instead.

use crate::{
    core::{
        report::{RoundSummary, build_explanation_prompt},
        session::CapTableSession,
    },
    errors::{Error, Result},
    models::FundingRound,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Shown whenever the explanation service fails.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "We couldn't generate an explanation right now. \
The ownership numbers above are still accurate; try again in a moment.";

/// Tone of the generated explanation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplanationStyle {
    /// Simple words and an everyday analogy
    #[serde(rename = "12yo")]
    TwelveYearOld,
    /// Practical advice for the founders
    #[default]
    #[serde(rename = "mentor")]
    Mentor,
    /// Precise venture-finance terminology
    #[serde(rename = "expert")]
    Expert,
}

impl ExplanationStyle {
    /// Instruction sentence placed in the prompt.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::TwelveYearOld => {
                "Explain this like I'm 12 years old, using simple words and an everyday analogy."
            }
            Self::Mentor => {
                "Explain this like a supportive startup mentor, focusing on what it means for the founders."
            }
            Self::Expert => {
                "Explain this like a venture finance expert, using precise terminology and the exact numbers."
            }
        }
    }
}

impl fmt::Display for ExplanationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TwelveYearOld => "12yo",
            Self::Mentor => "mentor",
            Self::Expert => "expert",
        })
    }
}

impl FromStr for ExplanationStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "12yo" | "simple" => Ok(Self::TwelveYearOld),
            "mentor" => Ok(Self::Mentor),
            "expert" => Ok(Self::Expert),
            other => Err(Error::Config {
                message: format!("Unknown explanation style: {other}"),
            }),
        }
    }
}

/// External text-generation endpoint.
#[async_trait]
pub trait ExplanationService: Send + Sync {
    /// Returns generated text for the prompt.
    async fn explain(&self, prompt: &str) -> Result<String>;
}

/// Default service when no endpoint is configured. Always fails, so callers
/// see the fallback message.
#[derive(Debug, Default)]
pub struct UnconfiguredService;

#[async_trait]
impl ExplanationService for UnconfiguredService {
    async fn explain(&self, _prompt: &str) -> Result<String> {
        Err(Error::Explanation {
            message: "no explanation service configured".to_string(),
        })
    }
}

/// What happened to one explanation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationOutcome {
    /// The response became the displayed explanation.
    Applied {
        /// Sequence number of the request
        sequence: u64,
        /// Text now displayed
        text: String,
        /// `true` if the text is the fallback message
        fallback: bool,
    },
    /// A newer request was issued before this one finished; discarded.
    Stale {
        /// Sequence number of the discarded request
        sequence: u64,
    },
}

#[derive(Debug)]
struct Displayed {
    sequence: u64,
    text: String,
}

/// Sequences explanation requests and keeps the displayed text.
pub struct Explainer {
    service: Arc<dyn ExplanationService>,
    fallback_message: String,
    issued: AtomicU64,
    displayed: RwLock<Option<Displayed>>,
}

impl fmt::Debug for Explainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Explainer")
            .field("fallback_message", &self.fallback_message)
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Default for Explainer {
    fn default() -> Self {
        Self::new(Arc::new(UnconfiguredService))
    }
}

impl Explainer {
    /// Wraps a service with the default fallback message.
    #[must_use]
    pub fn new(service: Arc<dyn ExplanationService>) -> Self {
        Self {
            service,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            issued: AtomicU64::new(0),
            displayed: RwLock::new(None),
        }
    }

    /// Replaces the fallback message.
    #[must_use]
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    /// Sequence number of the most recently issued request (0 before any).
    #[must_use]
    pub fn latest_sequence(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// The currently displayed explanation, if any request has been applied.
    pub async fn displayed(&self) -> Option<String> {
        self.displayed.read().await.as_ref().map(|d| d.text.clone())
    }

    /// Sends a prompt and applies the response unless a newer request was
    /// issued in the meantime. Never fails.
    pub async fn request(&self, prompt: &str) -> ExplanationOutcome {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(sequence, "Issued explanation request");

        let (text, fallback) = match self.service.explain(prompt).await {
            Ok(text) if !text.trim().is_empty() => (text, false),
            Ok(_) => {
                warn!(sequence, "Explanation service returned empty text; using fallback");
                (self.fallback_message.clone(), true)
            }
            Err(e) => {
                warn!(sequence, error = %e, "Explanation request failed; using fallback");
                (self.fallback_message.clone(), true)
            }
        };

        let mut slot = self.displayed.write().await;
        if sequence != self.latest_sequence() {
            debug!(
                sequence,
                latest = self.latest_sequence(),
                "Discarding stale explanation"
            );
            return ExplanationOutcome::Stale { sequence };
        }
        *slot = Some(Displayed {
            sequence,
            text: text.clone(),
        });
        info!(sequence, fallback, "Applied explanation");

        ExplanationOutcome::Applied {
            sequence,
            text,
            fallback,
        }
    }

    /// Builds the summary payload for an admitted round and requests an
    /// explanation of its impact.
    pub async fn explain_round(
        &self,
        round: &FundingRound,
        session: &CapTableSession,
        style: ExplanationStyle,
    ) -> ExplanationOutcome {
        let summary = RoundSummary::new(round, session);
        let prompt = build_explanation_prompt(&summary, style);
        self.request(&prompt).await
    }

    /// Sequence number of the displayed explanation.
    pub async fn displayed_sequence(&self) -> Option<u64> {
        self.displayed.read().await.as_ref().map(|d| d.sequence)
    }
}
