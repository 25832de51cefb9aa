//! Mock eligibility oracle for testing.

use super::traits::{EligibilityOracle, Verdict};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Scripted oracle. Members without a scripted verdict get the default.
#[derive(Clone)]
pub struct MockEligibilityOracle {
    state: Arc<Mutex<MockState>>,
}

struct MockState {
    default: Verdict,
    verdicts: HashMap<String, Verdict>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    calls: Vec<String>,
}

impl MockEligibilityOracle {
    /// Oracle that answers `default` for everyone.
    pub fn new(default: Verdict) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                default,
                verdicts: HashMap::new(),
                delay: None,
                gate: None,
                calls: Vec::new(),
            })),
        }
    }

    pub fn always_eligible() -> Self {
        Self::new(Verdict::Eligible)
    }

    pub fn set_verdict(&self, member_id: &str, verdict: Verdict) {
        self.lock().verdicts.insert(member_id.to_string(), verdict);
    }

    /// Delay every answer, to simulate a slow oracle.
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Hold every answer until `gate` is notified.
    pub fn hold_until(&self, gate: Arc<Notify>) {
        self.lock().gate = Some(gate);
    }

    /// Member ids queried so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl EligibilityOracle for MockEligibilityOracle {
    async fn check_eligibility(&self, member_id: &str) -> Verdict {
        let (verdict, delay, gate) = {
            let mut state = self.lock();
            state.calls.push(member_id.to_string());
            let verdict = state
                .verdicts
                .get(member_id)
                .copied()
                .unwrap_or(state.default);
            (verdict, state.delay, state.gate.clone())
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        verdict
    }
}
