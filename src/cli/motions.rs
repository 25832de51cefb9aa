//! Motion commands.
//!
//! Each command runs one public operation of the voting service and renders
//! the result for the terminal (or as JSON with `--json`).

use super::config::{PlenaryConfig, PublisherKind};
use plenary::eligibility::{HttpEligibilityOracle, HttpOracleConfig};
use plenary::motion::{Ballot, Motion, MotionId, VoteRecord};
use plenary::publisher::{HttpPublisherConfig, HttpResultPublisher, LogPublisher, ResultPublisher};
use plenary::store::FileMotionStore;
use plenary::voting::{ServiceConfig, VotingService};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::SystemTime;

type CommandResult = Result<String, Box<dyn std::error::Error>>;

/// Wire the service from operator configuration.
pub async fn build_service(
    config: &PlenaryConfig,
) -> Result<VotingService, Box<dyn std::error::Error>> {
    let store = FileMotionStore::open(&config.store.path).await?;

    let oracle_timeout = config.oracle.timeout()?;
    let oracle = HttpEligibilityOracle::new(HttpOracleConfig {
        base_url: config.oracle.base_url.clone(),
        timeout: oracle_timeout,
    })?;

    let publisher: Arc<dyn ResultPublisher> = match config.publisher.kind {
        PublisherKind::Log => Arc::new(LogPublisher::new(config.publisher.topic.clone())),
        PublisherKind::Http => {
            let endpoint = config
                .publisher
                .endpoint
                .clone()
                .ok_or("publisher.endpoint is required when publisher.kind = \"http\"")?;
            Arc::new(HttpResultPublisher::new(HttpPublisherConfig {
                endpoint,
                topic: config.publisher.topic.clone(),
                ..HttpPublisherConfig::default()
            })?)
        }
    };

    Ok(VotingService::new(
        Arc::new(store),
        Arc::new(oracle),
        publisher,
        ServiceConfig { oracle_timeout },
    ))
}

/// JSON rendering of a motion
#[derive(Debug, Serialize)]
pub struct MotionView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub session_start: Option<String>,
    pub session_end: Option<String>,
    pub yes_count: u32,
    pub no_count: u32,
    pub outcome: Option<String>,
    pub votes: usize,
}

impl From<&Motion> for MotionView {
    fn from(motion: &Motion) -> Self {
        Self {
            id: motion.id().to_string(),
            title: motion.title().to_string(),
            description: motion.description().map(str::to_string),
            state: motion.state().to_string(),
            session_start: motion.session_start().map(format_instant),
            session_end: motion.session_end().map(format_instant),
            yes_count: motion.yes_count(),
            no_count: motion.no_count(),
            outcome: motion.outcome().map(|o| o.wire_token().to_string()),
            votes: motion.votes().len(),
        }
    }
}

fn format_instant(instant: SystemTime) -> String {
    humantime::format_rfc3339_seconds(instant).to_string()
}

fn parse_id(id: &str) -> Result<MotionId, Box<dyn std::error::Error>> {
    id.parse::<MotionId>()
        .map_err(|e| format!("Invalid motion id '{}': {}", id, e).into())
}

fn render(motion: &Motion, json: bool) -> CommandResult {
    if json {
        return Ok(serde_json::to_string_pretty(&MotionView::from(motion))?);
    }

    let mut out = String::new();
    writeln!(out, "Motion {}", motion.id())?;
    writeln!(out, "  Title: {}", motion.title())?;
    if let Some(description) = motion.description() {
        writeln!(out, "  Description: {}", description)?;
    }
    writeln!(out, "  State: {}", motion.state())?;
    if let (Some(start), Some(end)) = (motion.session_start(), motion.session_end()) {
        writeln!(
            out,
            "  Session: {} -> {}",
            format_instant(start),
            format_instant(end)
        )?;
    }
    writeln!(out, "  Votes cast: {}", motion.votes().len())?;
    if let Some(outcome) = motion.outcome() {
        writeln!(
            out,
            "  Result: {} (yes {}, no {})",
            outcome,
            motion.yes_count(),
            motion.no_count()
        )?;
    }
    Ok(out.trim_end().to_string())
}

pub async fn create(
    service: &VotingService,
    title: &str,
    description: Option<String>,
    json: bool,
) -> CommandResult {
    let motion = service.create_motion(title, description).await?;
    render(&motion, json)
}

pub async fn open(
    service: &VotingService,
    id: &str,
    minutes: Option<u64>,
    hours: Option<u64>,
    json: bool,
) -> CommandResult {
    let motion = service.open_session(parse_id(id)?, minutes, hours).await?;
    render(&motion, json)
}

/// JSON rendering of a cast vote
#[derive(Debug, Serialize)]
pub struct VoteView {
    pub id: String,
    pub motion_id: String,
    pub member_id: String,
    pub ballot: String,
    pub cast_at: String,
}

impl From<&VoteRecord> for VoteView {
    fn from(record: &VoteRecord) -> Self {
        Self {
            id: record.id.to_string(),
            motion_id: record.motion_id.to_string(),
            member_id: record.member_id.clone(),
            ballot: record.ballot.to_string(),
            cast_at: format_instant(record.cast_at),
        }
    }
}

pub async fn vote(
    service: &VotingService,
    id: &str,
    member: &str,
    ballot: &str,
    json: bool,
) -> CommandResult {
    let ballot: Ballot = ballot.parse()?;
    let record = service.submit_vote(parse_id(id)?, member, ballot).await?;

    if json {
        return Ok(serde_json::to_string_pretty(&VoteView::from(&record))?);
    }

    Ok(format!(
        "Vote {} recorded: member {} voted {} on motion {}",
        record.id, record.member_id, record.ballot, record.motion_id
    ))
}

pub async fn show(service: &VotingService, id: &str, json: bool) -> CommandResult {
    let motion = service.get_motion(parse_id(id)?).await?;
    render(&motion, json)
}

/// Votes cast on one motion, in the order they were recorded.
pub async fn votes(service: &VotingService, id: &str, json: bool) -> CommandResult {
    let motion = service.get_motion(parse_id(id)?).await?;

    if json {
        let views: Vec<VoteView> = motion.votes().iter().map(VoteView::from).collect();
        return Ok(serde_json::to_string_pretty(&views)?);
    }

    if motion.votes().is_empty() {
        return Ok(format!("No votes on motion {}", motion.id()));
    }

    let mut out = String::new();
    for record in motion.votes() {
        writeln!(
            out,
            "{}  {:<3}  {}",
            format_instant(record.cast_at),
            record.ballot.to_string(),
            record.member_id
        )?;
    }
    Ok(out.trim_end().to_string())
}

pub async fn list(service: &VotingService, json: bool) -> CommandResult {
    let motions = service.list_motions().await?;

    if json {
        let views: Vec<MotionView> = motions.iter().map(MotionView::from).collect();
        return Ok(serde_json::to_string_pretty(&views)?);
    }

    if motions.is_empty() {
        return Ok("No motions".to_string());
    }

    let mut out = String::new();
    for motion in &motions {
        let result = motion
            .outcome()
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{}  {:<8}  {:<9}  {}",
            motion.id(),
            motion.state().to_string(),
            result,
            motion.title()
        )?;
    }
    Ok(out.trim_end().to_string())
}
