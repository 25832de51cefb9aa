//! Motion aggregate and its voting-session state machine.
//!
//! A motion moves `Created -> Open -> Closed`. Opening is explicit; closing
//! is observed lazily by `Motion::close_if_elapsed`, which every read path
//! runs under the motion's lock. The motion never talks to infrastructure:
//! closing yields a `MotionClosed` event that the owning service forwards.

pub mod tally;

pub use tally::{tally, Outcome, Tally};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Minimum title length, in characters.
pub const MIN_TITLE_CHARS: usize = 5;

/// Session length when the caller supplies no positive duration.
pub const DEFAULT_SESSION: Duration = Duration::from_secs(60);

/// Motion identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MotionId(Uuid);

impl MotionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// All-zero id, useful as a placeholder in tests.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for MotionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MotionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Vote record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteId(Uuid);

impl VoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-valued ballot. There is no abstain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ballot {
    Yes,
    No,
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ballot::Yes => f.write_str("yes"),
            Ballot::No => f.write_str("no"),
        }
    }
}

impl FromStr for Ballot {
    type Err = String;

    /// Accepts `yes`/`no` and the `sim`/`nao` tokens, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "sim" => Ok(Ballot::Yes),
            "no" | "n" | "nao" => Ok(Ballot::No),
            other => Err(format!("Invalid ballot '{}': expected yes or no", other)),
        }
    }
}

/// Immutable fact: one member cast one ballot on one motion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: VoteId,
    pub motion_id: MotionId,
    pub member_id: String,
    pub ballot: Ballot,
    pub cast_at: SystemTime,
}

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    /// No session window yet.
    Created,
    /// Window set and not yet observed closed.
    Open,
    /// Terminal. Tally is final.
    Closed,
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionState::Created => f.write_str("created"),
            MotionState::Open => f.write_str("open"),
            MotionState::Closed => f.write_str("closed"),
        }
    }
}

/// Requested session length. Zero values count as "not supplied".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionDuration {
    pub minutes: Option<u64>,
    pub hours: Option<u64>,
}

impl SessionDuration {
    pub fn new(minutes: Option<u64>, hours: Option<u64>) -> Self {
        Self { minutes, hours }
    }

    /// Sum the supplied parts, falling back to `DEFAULT_SESSION`.
    pub fn resolve(&self) -> Result<Duration, MotionError> {
        let minutes = self.minutes.unwrap_or(0);
        let hours = self.hours.unwrap_or(0);

        let secs = minutes
            .checked_mul(60)
            .and_then(|m| hours.checked_mul(3600).and_then(|h| m.checked_add(h)))
            .ok_or(MotionError::DurationOverflow)?;

        if secs == 0 {
            Ok(DEFAULT_SESSION)
        } else {
            Ok(Duration::from_secs(secs))
        }
    }
}

/// Event produced by the one-time close transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionClosed {
    pub motion_id: MotionId,
    pub title: String,
    pub tally: Tally,
    pub outcome: Outcome,
    pub closed_at: SystemTime,
}

/// Domain rule violations raised by the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MotionError {
    #[error("Title must not be blank")]
    BlankTitle,

    #[error("Title must have at least {min} characters (got {actual})")]
    TitleTooShort { min: usize, actual: usize },

    #[error("Member identifier must not be blank")]
    BlankMember,

    #[error("Session duration is too large")]
    DurationOverflow,

    #[error("Session already opened for motion {0}")]
    AlreadyOpened(MotionId),

    #[error("Session not opened yet for motion {0}")]
    NotOpened(MotionId),

    #[error("Session already closed for motion {0}")]
    Closed(MotionId),

    #[error("Member '{member_id}' already voted on motion {motion_id}")]
    DuplicateVote {
        motion_id: MotionId,
        member_id: String,
    },
}

/// Agenda item voted on within a bounded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motion {
    id: MotionId,
    title: String,
    description: Option<String>,
    created_at: SystemTime,
    session_start: Option<SystemTime>,
    session_end: Option<SystemTime>,
    closed: bool,
    yes_count: u32,
    no_count: u32,
    votes: Vec<VoteRecord>,
}

impl Motion {
    /// Create a motion after validating its title.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        now: SystemTime,
    ) -> Result<Self, MotionError> {
        let title = title.into();
        validate_title(&title)?;

        Ok(Self {
            id: MotionId::new(),
            title,
            description,
            created_at: now,
            session_start: None,
            session_end: None,
            closed: false,
            yes_count: 0,
            no_count: 0,
            votes: Vec::new(),
        })
    }

    pub fn id(&self) -> MotionId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn session_start(&self) -> Option<SystemTime> {
        self.session_start
    }

    pub fn session_end(&self) -> Option<SystemTime> {
        self.session_end
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_session_opened(&self) -> bool {
        self.session_start.is_some()
    }

    pub fn yes_count(&self) -> u32 {
        self.yes_count
    }

    pub fn no_count(&self) -> u32 {
        self.no_count
    }

    /// Cached counts. All zero until the motion closes.
    pub fn tally(&self) -> Tally {
        Tally {
            yes: self.yes_count,
            no: self.no_count,
        }
    }

    /// Final outcome, once closed.
    pub fn outcome(&self) -> Option<Outcome> {
        self.closed.then(|| self.tally().outcome())
    }

    pub fn votes(&self) -> &[VoteRecord] {
        &self.votes
    }

    pub fn has_voted(&self, member_id: &str) -> bool {
        self.votes.iter().any(|v| v.member_id == member_id)
    }

    pub fn state(&self) -> MotionState {
        if self.closed {
            MotionState::Closed
        } else if self.session_start.is_some() {
            MotionState::Open
        } else {
            MotionState::Created
        }
    }

    /// `Created -> Open`. Both bounds are set together.
    pub fn open_session(
        &mut self,
        now: SystemTime,
        duration: SessionDuration,
    ) -> Result<(), MotionError> {
        if self.session_start.is_some() {
            return Err(MotionError::AlreadyOpened(self.id));
        }

        let length = duration.resolve()?;
        let end = now
            .checked_add(length)
            .ok_or(MotionError::DurationOverflow)?;

        self.session_start = Some(now);
        self.session_end = Some(end);
        Ok(())
    }

    /// `Open -> Closed` when `now` is strictly past the session end.
    ///
    /// Returns the close event exactly once; later calls return `None`.
    /// The tally runs over the votes held at this instant.
    pub fn close_if_elapsed(&mut self, now: SystemTime) -> Option<MotionClosed> {
        if self.closed {
            return None;
        }
        let end = self.session_end?;
        if now <= end {
            return None;
        }

        let counts = tally(&self.votes);
        self.closed = true;
        self.yes_count = counts.yes;
        self.no_count = counts.no;

        Some(MotionClosed {
            motion_id: self.id,
            title: self.title.clone(),
            tally: counts,
            outcome: counts.outcome(),
            closed_at: now,
        })
    }

    /// Opened and not closed. Callers run `close_if_elapsed` first.
    pub fn ensure_accepting_votes(&self) -> Result<(), MotionError> {
        if self.session_start.is_none() {
            return Err(MotionError::NotOpened(self.id));
        }
        if self.closed {
            return Err(MotionError::Closed(self.id));
        }
        Ok(())
    }

    /// Append a vote, enforcing one vote per member.
    pub fn record_vote(
        &mut self,
        member_id: &str,
        ballot: Ballot,
        now: SystemTime,
    ) -> Result<VoteRecord, MotionError> {
        validate_member(member_id)?;
        self.ensure_accepting_votes()?;

        if self.has_voted(member_id) {
            return Err(MotionError::DuplicateVote {
                motion_id: self.id,
                member_id: member_id.to_string(),
            });
        }

        let record = VoteRecord {
            id: VoteId::new(),
            motion_id: self.id,
            member_id: member_id.to_string(),
            ballot,
            cast_at: now,
        };
        self.votes.push(record.clone());
        Ok(record)
    }
}

/// Title must be non-blank and at least `MIN_TITLE_CHARS` long.
pub fn validate_title(title: &str) -> Result<(), MotionError> {
    if title.trim().is_empty() {
        return Err(MotionError::BlankTitle);
    }

    let actual = title.chars().count();
    if actual < MIN_TITLE_CHARS {
        return Err(MotionError::TitleTooShort {
            min: MIN_TITLE_CHARS,
            actual,
        });
    }

    Ok(())
}

pub fn validate_member(member_id: &str) -> Result<(), MotionError> {
    if member_id.trim().is_empty() {
        Err(MotionError::BlankMember)
    } else {
        Ok(())
    }
}
