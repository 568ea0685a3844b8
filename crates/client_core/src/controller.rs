use anyhow::Result;
use serde_json::Value;
use shared::protocol::ErrorBody;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    context::ScreenContext,
    error::{ExchangeError, TransportError},
    flow::Flow,
    render::{render, DisplayMessage, DisplayModel, Presentation, Tone},
    state::{transition, Event, ExchangeState, Response, TransitionError},
    transport::{RawResponse, Transport},
    validation::{validate, RawInput, ValidationRules},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Another exchange was in flight; nothing happened.
    Ignored,
    /// The terminal state that was rendered before returning to idle.
    Resolved(ExchangeState),
}

impl Submission {
    pub fn terminal(&self) -> Option<&ExchangeState> {
        match self {
            Submission::Ignored => None,
            Submission::Resolved(state) => Some(state),
        }
    }
}

/// Drives one screen's request/response cycle. At most one exchange is in
/// flight per controller; the state lock is never held across the request.
pub struct ExchangeController<T: Transport> {
    transport: T,
    context: ScreenContext,
    presentation: Presentation,
    rules: ValidationRules,
    state: Mutex<ExchangeState>,
}

impl<T: Transport> ExchangeController<T> {
    pub fn mount(
        presentation: Presentation,
        transport: T,
        context: ScreenContext,
        rules: ValidationRules,
    ) -> Result<Self> {
        let theme = context.apply_saved_theme()?;
        let mut initial = render(&ExchangeState::Idle, &presentation);
        if let Some(greeting) = &presentation.greeting {
            initial.message = Some(DisplayMessage::new(Tone::Success, vec![greeting.clone()]));
        }
        context.sink.render(&initial);
        debug!(
            flow = presentation.flow.name(),
            theme = theme.as_str(),
            "exchange: screen mounted"
        );

        Ok(Self {
            transport,
            context,
            presentation,
            rules,
            state: Mutex::new(ExchangeState::Idle),
        })
    }

    pub fn unmount(self) -> ScreenContext {
        debug!(flow = self.flow().name(), "exchange: screen unmounted");
        self.context
    }

    pub fn flow(&self) -> Flow {
        self.presentation.flow
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub async fn state(&self) -> ExchangeState {
        self.state.lock().await.clone()
    }

    pub async fn submit(&self, input: RawInput) -> Submission {
        let flow = self.flow();
        let exchange_id = Uuid::new_v4();
        if input.flow() != flow {
            warn!(
                flow = flow.name(),
                input_flow = input.flow().name(),
                "exchange: input does not belong to this screen"
            );
            return Submission::Ignored;
        }

        let request = {
            let mut guard = self.state.lock().await;
            let validated = validate(&input, &self.rules);
            let event = match &validated {
                Ok(_) => Event::Dispatched,
                Err(err) => Event::Rejected(ExchangeError::Validation(err.clone())),
            };
            match transition(&guard, event) {
                Ok(next) => {
                    *guard = next;
                    self.render_state(&guard);
                }
                Err(TransitionError::ExchangeInFlight) => {
                    debug!(flow = flow.name(), "exchange: submission ignored while pending");
                    return Submission::Ignored;
                }
                Err(err) => {
                    error!(flow = flow.name(), error = %err, "exchange: unexpected submit state");
                    return Submission::Ignored;
                }
            }

            match validated {
                Ok(request) => request,
                Err(err) => {
                    debug!(
                        flow = flow.name(),
                        %exchange_id,
                        field = err.field().label(),
                        "exchange: input rejected"
                    );
                    return Submission::Resolved(self.finish(&mut guard));
                }
            }
        };

        debug!(flow = flow.name(), %exchange_id, path = request.path(), "exchange: dispatched");
        let outcome = match serde_json::to_value(&request) {
            Ok(body) => match self.transport.post_json(request.path(), &body).await {
                Ok(raw) => self.resolve(raw),
                Err(err) => Err(ExchangeError::Transport(err)),
            },
            Err(err) => Err(ExchangeError::Transport(TransportError::new(format!(
                "failed to encode request: {err}"
            )))),
        };

        match &outcome {
            Ok(response) => info!(
                flow = flow.name(),
                %exchange_id,
                status = response.status,
                "exchange: succeeded"
            ),
            Err(ExchangeError::Server { status, detail }) => warn!(
                flow = flow.name(),
                %exchange_id,
                status,
                detail = detail.as_deref().unwrap_or_default(),
                "exchange: server rejected request"
            ),
            Err(err) => warn!(flow = flow.name(), %exchange_id, error = %err, "exchange: failed"),
        }

        let mut guard = self.state.lock().await;
        match transition(&guard, Event::Resolved(outcome)) {
            Ok(next) => {
                *guard = next;
                self.render_state(&guard);
            }
            Err(err) => {
                error!(flow = flow.name(), error = %err, "exchange: resolution out of order");
                *guard = ExchangeState::Idle;
                return Submission::Resolved(ExchangeState::Idle);
            }
        }
        let terminal = self.finish(&mut guard);
        drop(guard);

        if let (ExchangeState::Succeeded(_), Some(redirect)) = (&terminal, self.presentation.redirect) {
            debug!(
                flow = flow.name(),
                screen = redirect.screen.path(),
                after_ms = redirect.after.as_millis() as u64,
                "exchange: redirecting"
            );
            if !redirect.after.is_zero() {
                tokio::time::sleep(redirect.after).await;
            }
            self.context.navigator.navigate(redirect);
        }
        Submission::Resolved(terminal)
    }

    pub fn render_model(&self, state: &ExchangeState) -> DisplayModel {
        render(state, &self.presentation)
    }

    fn render_state(&self, state: &ExchangeState) {
        self.context.sink.render(&self.render_model(state));
    }

    /// Moves a rendered terminal state back to idle and returns it.
    fn finish(&self, state: &mut ExchangeState) -> ExchangeState {
        let terminal = state.clone();
        *state = transition(state, Event::Rendered).unwrap_or_else(|err| {
            error!(flow = self.flow().name(), error = %err, "exchange: reset from non-terminal state");
            ExchangeState::Idle
        });
        terminal
    }

    fn resolve(&self, raw: RawResponse) -> Result<Response, ExchangeError> {
        if !raw.is_success() {
            return Err(ExchangeError::Server {
                status: raw.status,
                detail: ErrorBody::detail_from_bytes(&raw.body),
            });
        }

        let body = if raw.body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&raw.body).unwrap_or(Value::Null)
        };
        let reply = self
            .flow()
            .read_success(&body)
            .map_err(|reason| ExchangeError::MalformedResponse { reason })?;
        Ok(Response {
            status: raw.status,
            body,
            reply,
        })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
