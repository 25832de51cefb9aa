//! Voting session service.
//!
//! Owns the motion store and the injected collaborators, and exposes the
//! public operations. Every operation that reads closed-state-dependent
//! fields runs `Motion::close_if_elapsed` under the motion's lock first, so
//! the close transition, the tally and the publication happen exactly once.
//!
//! Vote admission runs in three steps:
//! 1. under the lock: resolve, close check, reject if not accepting votes
//! 2. without the lock: consult the eligibility oracle (bounded by a timeout)
//! 3. under the lock again: re-read, close check, duplicate check, record

pub mod error;
pub mod locks;

pub use error::{VotingError, VotingResult};
pub use locks::MotionLocks;

use crate::clock::{Clock, SystemClock};
use crate::eligibility::{EligibilityOracle, Verdict};
use crate::motion::{
    validate_member, Ballot, Motion, MotionClosed, MotionId, SessionDuration, VoteRecord,
};
use crate::publisher::{ResultPublisher, ResultRecord};
use crate::store::{MotionStore, StoreLock};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

/// Service construction settings.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on a single oracle consultation
    pub oracle_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            oracle_timeout: Duration::from_secs(5),
        }
    }
}

pub struct VotingService {
    store: Arc<dyn MotionStore>,
    oracle: Arc<dyn EligibilityOracle>,
    publisher: Arc<dyn ResultPublisher>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
    locks: MotionLocks,
}

impl VotingService {
    /// Create a service reading wall-clock time.
    pub fn new(
        store: Arc<dyn MotionStore>,
        oracle: Arc<dyn EligibilityOracle>,
        publisher: Arc<dyn ResultPublisher>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            publisher,
            clock: Arc::new(SystemClock),
            config,
            locks: MotionLocks::new(),
        }
    }

    /// Replace the clock (tests pin or advance time through this).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a new motion. Titles may repeat.
    pub async fn create_motion(
        &self,
        title: &str,
        description: Option<String>,
    ) -> VotingResult<Motion> {
        let motion = Motion::new(title, description, self.clock.now())?;
        let motion = {
            let _guard = self.exclusive(motion.id()).await?;
            self.store.save(motion).await?
        };

        info!(motion = %motion.id(), title = %motion.title(), "motion created");
        Ok(motion)
    }

    /// Open the voting session. Zero or missing durations mean one minute.
    pub async fn open_session(
        &self,
        id: MotionId,
        minutes: Option<u64>,
        hours: Option<u64>,
    ) -> VotingResult<Motion> {
        let _guard = self.exclusive(id).await?;

        let mut motion = self.load(id).await?;
        motion.open_session(self.clock.now(), SessionDuration::new(minutes, hours))?;
        let motion = self.store.save(motion).await?;

        info!(
            motion = %id,
            ends_at = ?motion.session_end(),
            "voting session opened"
        );
        Ok(motion)
    }

    /// Fetch a motion, closing it first if its window has elapsed.
    pub async fn get_motion(&self, id: MotionId) -> VotingResult<Motion> {
        let (motion, closed) = {
            let _guard = self.exclusive(id).await?;
            self.refresh(id, self.clock.now()).await?
        };

        if let Some(event) = closed {
            self.announce(event).await;
        }

        Ok(motion)
    }

    /// All motions in creation order, each brought up to date.
    pub async fn list_motions(&self) -> VotingResult<Vec<Motion>> {
        let ids: Vec<MotionId> = self
            .store
            .list_all()
            .await?
            .iter()
            .map(Motion::id)
            .collect();

        let mut motions = Vec::with_capacity(ids.len());
        for id in ids {
            motions.push(self.get_motion(id).await?);
        }
        Ok(motions)
    }

    /// Cast a ballot for `member_id`.
    pub async fn submit_vote(
        &self,
        id: MotionId,
        member_id: &str,
        ballot: Ballot,
    ) -> VotingResult<VoteRecord> {
        validate_member(member_id)?;

        let (admissible, closed) = {
            let _guard = self.exclusive(id).await?;
            let (motion, closed) = self.refresh(id, self.clock.now()).await?;
            (motion.ensure_accepting_votes(), closed)
        };
        if let Some(event) = closed {
            self.announce(event).await;
        }
        if let Err(e) = admissible {
            debug!(motion = %id, error = %e, "vote rejected before eligibility check");
            return Err(e.into());
        }

        match self.consult_oracle(member_id).await {
            Verdict::Eligible => {}
            Verdict::Ineligible => {
                info!(motion = %id, "vote rejected: member not eligible");
                return Err(VotingError::Forbidden(format!(
                    "Member '{}' is not allowed to vote",
                    member_id
                )));
            }
            Verdict::Unknown => {
                return Err(VotingError::OracleError(format!(
                    "Eligibility of member '{}' could not be determined",
                    member_id
                )));
            }
        }

        let (result, closed) = {
            let _guard = self.exclusive(id).await?;
            let now = self.clock.now();
            let (mut motion, closed) = self.refresh(id, now).await?;

            let result = match motion.record_vote(member_id, ballot, now) {
                Ok(vote) => {
                    self.store.save(motion).await?;
                    Ok(vote)
                }
                Err(e) => Err(VotingError::from(e)),
            };
            (result, closed)
        };
        if let Some(event) = closed {
            self.announce(event).await;
        }

        match &result {
            Ok(vote) => info!(motion = %id, vote = %vote.id, ballot = %vote.ballot, "vote recorded"),
            Err(e) => debug!(motion = %id, error = %e, "vote rejected"),
        }
        result
    }

    /// Per-motion lock within this process, then the store's own lock, which
    /// file-backed stores hold across processes. Released together on drop.
    async fn exclusive(
        &self,
        id: MotionId,
    ) -> VotingResult<(OwnedMutexGuard<()>, StoreLock)> {
        let local = self.locks.acquire(id).await;
        let shared = self.store.lock(id).await?;
        Ok((local, shared))
    }

    async fn load(&self, id: MotionId) -> VotingResult<Motion> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(VotingError::NotFound(id))
    }

    /// Load and run the close check. Caller must hold `exclusive(id)`.
    ///
    /// The close is persisted before the event is returned, so a failed save
    /// leaves the motion open and the next reader closes it again.
    async fn refresh(
        &self,
        id: MotionId,
        now: SystemTime,
    ) -> VotingResult<(Motion, Option<MotionClosed>)> {
        let mut motion = self.load(id).await?;

        match motion.close_if_elapsed(now) {
            Some(event) => {
                let motion = self.store.save(motion).await?;
                info!(
                    motion = %id,
                    yes = event.tally.yes,
                    no = event.tally.no,
                    outcome = %event.outcome,
                    "voting session closed"
                );
                Ok((motion, Some(event)))
            }
            None => Ok((motion, None)),
        }
    }

    async fn consult_oracle(&self, member_id: &str) -> Verdict {
        let check = self.oracle.check_eligibility(member_id);
        match tokio::time::timeout(self.config.oracle_timeout, check).await {
            Ok(verdict) => verdict,
            Err(_) => {
                warn!(
                    timeout_ms = self.config.oracle_timeout.as_millis() as u64,
                    "eligibility oracle timed out"
                );
                Verdict::Unknown
            }
        }
    }

    /// Publish a close event. Failures are logged, never propagated.
    async fn announce(&self, event: MotionClosed) {
        let record = ResultRecord::from(&event);
        match self.publisher.publish(&record).await {
            Ok(()) => info!(motion = %record.motion_id, outcome = %record.outcome, "result published"),
            Err(e) => warn!(
                motion = %record.motion_id,
                outcome = %record.outcome,
                error = %e,
                "failed to publish voting result"
            ),
        }
    }
}
