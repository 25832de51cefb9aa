//! Tally engine.
//!
//! Pure computation over a snapshot of a motion's votes. Runs exactly once per
//! motion, under the lock acquisition that closes the session.

use super::{Ballot, VoteRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Yes/No counts of a closed motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: u32,
    pub no: u32,
}

impl Tally {
    pub fn total(&self) -> u32 {
        self.yes + self.no
    }

    /// Classify the counts.
    pub fn outcome(&self) -> Outcome {
        use std::cmp::Ordering;

        match self.yes.cmp(&self.no) {
            Ordering::Equal => Outcome::Tie,
            Ordering::Greater => Outcome::Approved,
            Ordering::Less => Outcome::Rejected,
        }
    }
}

/// Result of a closed motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Tie,
    Approved,
    Rejected,
}

impl Outcome {
    /// Token used on the result topic.
    pub fn wire_token(&self) -> &'static str {
        match self {
            Outcome::Tie => "EMPATE",
            Outcome::Approved => "APROVADO",
            Outcome::Rejected => "REJEITADO",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_token())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMPATE" => Ok(Outcome::Tie),
            "APROVADO" => Ok(Outcome::Approved),
            "REJEITADO" => Ok(Outcome::Rejected),
            other => Err(format!("Unknown outcome token '{}'", other)),
        }
    }
}

/// Count ballots. Anything that is not `Yes` counts as `No`.
pub fn tally<'a, I>(votes: I) -> Tally
where
    I: IntoIterator<Item = &'a VoteRecord>,
{
    votes
        .into_iter()
        .fold(Tally::default(), |mut acc, vote| {
            match vote.ballot {
                Ballot::Yes => acc.yes += 1,
                Ballot::No => acc.no += 1,
            }
            acc
        })
}
