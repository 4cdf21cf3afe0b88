use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::state::{ExhaustReason, Outcome, PollConfig, PollState};
use crate::core::schedule::{CancelToken, Wake, sleep_or_cancel};
use crate::core::services::{JobPoll, RankingService};
use crate::core::{JobHandle, RankError, RankingRequest};
use crate::synth;

#[derive(Debug, Default)]
struct Active {
    generation: u64,
    job_id: Option<String>,
    polling: bool,
    cancel: CancelToken,
}

struct Inner {
    service: Arc<dyn RankingService>,
    config: PollConfig,
    state: watch::Sender<PollState>,
    active: Mutex<Active>,
}

/// Triggers ranking jobs and polls them to a terminal state.
///
/// One controller runs at most one poll loop at a time: every [`trigger`](Self::trigger)
/// cancels whatever loop is outstanding, and a cancelled loop never publishes state again.
/// Progress is observable through [`subscribe`](Self::subscribe); the loop itself always
/// resolves to real or synthesized records, never to an error.
///
/// Cloning is cheap and clones share the same loop and state.
#[derive(Clone)]
pub struct PollController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PollController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollController")
            .field("config", &self.inner.config)
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl PollController {
    /// Controller with the default [`PollConfig`].
    pub fn new<S: RankingService + 'static>(service: S) -> Self {
        Self::with_config(Arc::new(service), PollConfig::default())
    }

    /// Controller over a shared service with explicit tuning.
    pub fn with_config(service: Arc<dyn RankingService>, config: PollConfig) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            inner: Arc::new(Inner {
                service,
                config,
                state,
                active: Mutex::new(Active::default()),
            }),
        }
    }

    /// The loop's tuning.
    pub fn config(&self) -> &PollConfig {
        &self.inner.config
    }

    /// Current state.
    pub fn state(&self) -> PollState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that sees every state the controller publishes from now on.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.inner.state.subscribe()
    }

    /// Starts a background job, cancelling any loop still running for an earlier one.
    ///
    /// # Errors
    ///
    /// [`RankError::Trigger`] when the backend rejects the request or answers without a job
    /// id (the state becomes [`PollState::TriggerFailed`]), or [`RankError::Cancelled`] if
    /// another trigger superseded this one while it was in flight.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(criterion = %request.criterion())))]
    pub async fn trigger(&self, request: RankingRequest) -> Result<JobHandle, RankError> {
        let (generation, token) = self.begin();

        let result = tokio::select! {
            r = self.inner.service.trigger_job(&request) => r,
            () = token.cancelled() => return Err(RankError::Cancelled),
        };

        match result {
            Ok(handle) => {
                let mut active = self.lock();
                if active.generation != generation {
                    return Err(RankError::Cancelled);
                }
                active.job_id = Some(handle.id().to_string());
                #[cfg(feature = "tracing")]
                tracing::debug!(job = %handle, "job triggered");
                Ok(handle)
            }
            Err(e) => {
                let message = match e {
                    RankError::Trigger(m) => m,
                    other => other.to_string(),
                };
                self.publish(
                    generation,
                    PollState::TriggerFailed {
                        message: message.clone(),
                    },
                );
                Err(RankError::Trigger(message))
            }
        }
    }

    /// Polls `handle` until it resolves, falling back to synthesized records when a budget
    /// runs out.
    ///
    /// The first attempt waits one interval after the trigger. Returns
    /// [`Outcome::Cancelled`] without publishing anything if `handle` is not the latest
    /// trigger, if a loop is already running for it, or if a newer trigger arrives mid-loop.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(job = %handle)))]
    pub async fn poll_until_resolved(&self, handle: &JobHandle) -> Outcome {
        let Some((generation, token)) = self.claim(handle) else {
            return Outcome::Cancelled;
        };
        let cfg = &self.inner.config;
        let max_attempts = cfg.max_attempts.max(1);
        let mut attempt = 0u32;
        let mut transport_errors = 0u32;

        loop {
            if sleep_or_cancel(cfg.interval, &token).await == Wake::Cancelled {
                return Outcome::Cancelled;
            }

            attempt += 1;
            if !self.publish(
                generation,
                PollState::Polling {
                    attempt,
                    max_attempts,
                },
            ) {
                return Outcome::Cancelled;
            }

            let result = tokio::select! {
                r = self.inner.service.fetch_job_result(handle) => r,
                () = token.cancelled() => return Outcome::Cancelled,
            };

            match result {
                Ok(JobPoll::Ready(records)) if !records.is_empty() => {
                    let published = self.publish(
                        generation,
                        PollState::Succeeded {
                            records: records.clone(),
                            attempts: attempt,
                        },
                    );
                    return if published {
                        Outcome::Succeeded(records)
                    } else {
                        Outcome::Cancelled
                    };
                }
                Ok(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, max_attempts, "job not ready");
                }
                Err(_e) => {
                    transport_errors += 1;
                    #[cfg(feature = "tracing")]
                    {
                        let absorbed = RankError::PollTransient {
                            attempt,
                            message: _e.to_string(),
                        };
                        tracing::warn!(transport_errors, error = %absorbed, "poll attempt failed");
                    }
                }
            }

            let exhausted = if transport_errors >= cfg.max_transport_errors.max(1) {
                Some(ExhaustReason::TransportErrors)
            } else if attempt >= max_attempts {
                Some(ExhaustReason::NotReady)
            } else {
                None
            };

            if let Some(reason) = exhausted {
                return self.fall_back(generation, handle, attempt, reason);
            }
        }
    }

    /// Trigger, then poll to resolution.
    ///
    /// # Errors
    ///
    /// Only trigger failures; the poll stage always resolves.
    pub async fn run(&self, request: RankingRequest) -> Result<Outcome, RankError> {
        let handle = self.trigger(request).await?;
        Ok(self.poll_until_resolved(&handle).await)
    }

    /// [`run`](Self::run) on a background task.
    pub fn spawn(&self, request: RankingRequest) -> JoinHandle<Result<Outcome, RankError>> {
        let this = self.clone();
        tokio::spawn(async move { this.run(request).await })
    }

    /// Cancels any outstanding trigger or loop and returns to [`PollState::Idle`].
    pub fn cancel(&self) {
        let mut active = self.lock();
        active.cancel.cancel();
        active.generation += 1;
        active.job_id = None;
        active.polling = false;
        active.cancel = CancelToken::new();
        self.inner.state.send_replace(PollState::Idle);
    }

    fn fall_back(
        &self,
        generation: u64,
        handle: &JobHandle,
        attempts: u32,
        reason: ExhaustReason,
    ) -> Outcome {
        #[cfg(feature = "tracing")]
        tracing::info!(attempts, ?reason, "poll budget exhausted, synthesizing placeholder data");

        if !self.publish(generation, PollState::FailedExhausted { attempts, reason }) {
            return Outcome::Cancelled;
        }
        let records = synth::generate(handle.request());
        if !self.publish(
            generation,
            PollState::FallbackShown {
                records: records.clone(),
                attempts,
                reason,
            },
        ) {
            return Outcome::Cancelled;
        }
        Outcome::Fallback { records, reason }
    }

    fn begin(&self) -> (u64, CancelToken) {
        let mut active = self.lock();
        active.cancel.cancel();
        active.generation += 1;
        active.job_id = None;
        active.polling = false;
        active.cancel = CancelToken::new();
        self.inner.state.send_replace(PollState::Triggering);
        (active.generation, active.cancel.clone())
    }

    fn claim(&self, handle: &JobHandle) -> Option<(u64, CancelToken)> {
        let mut active = self.lock();
        if active.polling || active.job_id.as_deref() != Some(handle.id()) {
            return None;
        }
        active.polling = true;
        Some((active.generation, active.cancel.clone()))
    }

    /// Publishes `state` only if `generation` is still current.
    fn publish(&self, generation: u64, state: PollState) -> bool {
        let active = self.lock();
        if active.generation != generation {
            return false;
        }
        self.inner.state.send_replace(state);
        true
    }

    fn lock(&self) -> MutexGuard<'_, Active> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
