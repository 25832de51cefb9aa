//! Plenary - Assembly Motion Voting
//!
//! Motions are created, opened for a timed voting session, receive at most
//! one yes/no ballot per eligible member, and close lazily the first time
//! their state is read after the session window has passed. Closing computes
//! the final tally exactly once and hands the result to a publisher.
//!
//! Key principles:
//! - Closing is observed, never scheduled
//! - One vote per (motion, member), enforced under a per-motion lock
//! - Eligibility is decided by an external oracle; unclear answers reject
//! - Publication is fire-once and never rolls back a close

pub mod clock;
pub mod eligibility;
pub mod motion;
pub mod publisher;
pub mod serialization;
pub mod store;
pub mod voting;

pub use motion::{Ballot, Motion, MotionId, MotionState, Outcome, Tally, VoteRecord};
pub use voting::{ServiceConfig, VotingError, VotingResult, VotingService};
