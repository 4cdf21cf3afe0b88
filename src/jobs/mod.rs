//! Job trigger and poll controller.
//!
//! A ranking request starts a slow backend job; [`PollController`] waits for it under two
//! attempt budgets and, when either runs out, shows synthesized placeholder rows instead
//! of surfacing an error.

mod controller;
mod state;

pub use controller::PollController;
pub use state::{ExhaustReason, Outcome, PollConfig, PollState};
