//! Eligibility oracle trait abstraction.
//!
//! Enables mock implementations for unit testing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Oracle answer for a single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Eligible,
    Ineligible,
    /// Unrecognised answer or transport failure. Never a rejection.
    Unknown,
}

impl Verdict {
    /// Map a verdict token from the external service.
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "ABLE_TO_VOTE" => Verdict::Eligible,
            "UNABLE_TO_VOTE" => Verdict::Ineligible,
            _ => Verdict::Unknown,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Eligible => f.write_str("eligible"),
            Verdict::Ineligible => f.write_str("ineligible"),
            Verdict::Unknown => f.write_str("unknown"),
        }
    }
}

/// Decides whether a member identifier may vote.
///
/// Implementations never retry and never fail: every transport problem
/// resolves to `Verdict::Unknown`.
#[async_trait]
pub trait EligibilityOracle: Send + Sync {
    async fn check_eligibility(&self, member_id: &str) -> Verdict;
}
