//! Member eligibility oracle.
//!
//! The service asks an external authority whether a member may vote before
//! admitting a ballot. Any answer the client cannot interpret is
//! `Verdict::Unknown`, which the service treats as a hard error.

pub mod http;
pub mod mock;
pub mod traits;

pub use http::{HttpEligibilityOracle, HttpOracleConfig};
pub use mock::MockEligibilityOracle;
pub use traits::{EligibilityOracle, Verdict};
