//! Exchange lifecycle as a pure state machine.
//!
//! `Idle -> Pending -> Succeeded | Failed -> Idle`, plus `Idle -> Failed` for
//! input rejected locally. A second submission while `Pending` is refused by
//! the transition table itself.

use serde_json::Value;
use thiserror::Error;

use crate::error::ExchangeError;

/// Remote reply as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
    pub reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    Pending,
    Succeeded(Response),
    Failed(ExchangeError),
}

impl ExchangeState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ExchangeState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ExchangeState::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExchangeState::Succeeded(_) | ExchangeState::Failed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            ExchangeState::Idle => "idle",
            ExchangeState::Pending => "pending",
            ExchangeState::Succeeded(_) => "succeeded",
            ExchangeState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Input failed local validation.
    Rejected(ExchangeError),
    /// Input validated and the request is about to be sent.
    Dispatched,
    Resolved(Result<Response, ExchangeError>),
    /// The terminal outcome has been shown.
    Rendered,
}

impl Event {
    fn label(&self) -> &'static str {
        match self {
            Event::Rejected(_) => "rejected",
            Event::Dispatched => "dispatched",
            Event::Resolved(_) => "resolved",
            Event::Rendered => "rendered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("an exchange is already in flight")]
    ExchangeInFlight,
    #[error("invalid transition: {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

pub fn transition(state: &ExchangeState, event: Event) -> Result<ExchangeState, TransitionError> {
    match (state, event) {
        (ExchangeState::Pending, Event::Rejected(_) | Event::Dispatched) => {
            Err(TransitionError::ExchangeInFlight)
        }
        (ExchangeState::Idle, Event::Rejected(err)) => Ok(ExchangeState::Failed(err)),
        (ExchangeState::Idle, Event::Dispatched) => Ok(ExchangeState::Pending),
        (ExchangeState::Pending, Event::Resolved(Ok(response))) => {
            Ok(ExchangeState::Succeeded(response))
        }
        (ExchangeState::Pending, Event::Resolved(Err(err))) => Ok(ExchangeState::Failed(err)),
        (ExchangeState::Succeeded(_) | ExchangeState::Failed(_), Event::Rendered) => {
            Ok(ExchangeState::Idle)
        }
        (state, event) => Err(TransitionError::InvalidTransition {
            state: state.label(),
            event: event.label(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
