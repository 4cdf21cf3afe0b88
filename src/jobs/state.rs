use std::fmt;
use std::time::Duration;

use crate::core::RankedRecord;

/// Tuning for the poll loop. Both budgets are attempt counts, not wall-clock deadlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait before every attempt, including the first one after the trigger.
    pub interval: Duration,
    /// Most attempts a loop makes before giving up on a "not ready" job.
    pub max_attempts: u32,
    /// Most transport-level failures a loop tolerates before giving up.
    pub max_transport_errors: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 15,
            max_transport_errors: 5,
        }
    }
}

/// Which budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    /// Every attempt came back "not ready".
    NotReady,
    /// Too many attempts failed at the transport level.
    TransportErrors,
}

/// Observable progress of a [`PollController`](super::PollController).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PollState {
    /// Nothing has been triggered yet.
    #[default]
    Idle,
    /// A trigger request is in flight.
    Triggering,
    /// The trigger request failed; a new trigger is required.
    TriggerFailed {
        /// Why the trigger failed.
        message: String,
    },
    /// Attempt `attempt` of `max_attempts` is in flight.
    Polling {
        /// 1-based attempt number.
        attempt: u32,
        /// Attempt budget.
        max_attempts: u32,
    },
    /// The job produced real records.
    Succeeded {
        /// The job's records, in rank order.
        records: Vec<RankedRecord>,
        /// The attempt that produced them.
        attempts: u32,
    },
    /// A budget ran out; placeholder data is about to be shown.
    FailedExhausted {
        /// Attempts made.
        attempts: u32,
        /// Which budget ran out.
        reason: ExhaustReason,
    },
    /// Placeholder data is being shown in place of the job's result.
    FallbackShown {
        /// Synthesized records.
        records: Vec<RankedRecord>,
        /// Attempts made before falling back.
        attempts: u32,
        /// Which budget ran out.
        reason: ExhaustReason,
    },
}

impl PollState {
    /// Terminal states are only left by a new trigger.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Succeeded { .. }
                | PollState::FallbackShown { .. }
                | PollState::TriggerFailed { .. }
        )
    }

    /// Whether work is in flight (a spinner should be visible).
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PollState::Triggering | PollState::Polling { .. } | PollState::FailedExhausted { .. }
        )
    }

    /// Records to render, real or synthesized.
    pub fn records(&self) -> Option<&[RankedRecord]> {
        match self {
            PollState::Succeeded { records, .. } | PollState::FallbackShown { records, .. } => {
                Some(records)
            }
            _ => None,
        }
    }

    /// One-line status for display.
    pub fn status_message(&self) -> String {
        match self {
            PollState::Idle => String::new(),
            PollState::Triggering => "Triggering background job...".to_string(),
            PollState::TriggerFailed { message } => format!("Could not start job: {message}"),
            PollState::Polling {
                attempt,
                max_attempts,
            } => format!("Processing... ({attempt}/{max_attempts})"),
            PollState::Succeeded { .. } => "Data loaded successfully".to_string(),
            PollState::FailedExhausted { reason, .. } => match reason {
                ExhaustReason::NotReady => {
                    "Processing taking longer than expected. Showing demo data...".to_string()
                }
                ExhaustReason::TransportErrors => {
                    "Results endpoint unreachable. Showing demo data...".to_string()
                }
            },
            PollState::FallbackShown { .. } => {
                "Demo data displayed (background processing may still be running)".to_string()
            }
        }
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_message())
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The job's own records.
    Succeeded(Vec<RankedRecord>),
    /// Placeholder records; the job did not resolve within budget.
    Fallback {
        /// Synthesized records.
        records: Vec<RankedRecord>,
        /// Which budget ran out.
        reason: ExhaustReason,
    },
    /// A newer trigger superseded this loop. Nothing was published.
    Cancelled,
}

impl Outcome {
    /// Records carried by the outcome, if any.
    pub fn records(&self) -> Option<&[RankedRecord]> {
        match self {
            Outcome::Succeeded(records) | Outcome::Fallback { records, .. } => Some(records),
            Outcome::Cancelled => None,
        }
    }

    /// Whether the records are placeholders.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }
}
