//! Pure projection from exchange state to what a screen shows.

use std::time::Duration;

use shared::domain::Screen;

use crate::{
    context::Redirect,
    error::ExchangeError,
    flow::Flow,
    state::ExchangeState,
};

pub const CONNECTION_ERROR: &str = "Could not connect to the server. Please try again later.";

/// Per-flow wording and follow-ups. None of this affects state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub flow: Flow,
    pub pending_label: String,
    pub success_text: String,
    pub fallback_error: String,
    pub connection_error: String,
    pub greeting: Option<String>,
    pub redirect: Option<Redirect>,
}

impl Presentation {
    pub fn for_flow(flow: Flow) -> Self {
        let (pending_label, success_text, fallback_error) = match flow {
            Flow::Chat => (
                "TekBot is typing...",
                "",
                "Could not process the question. Please try again.",
            ),
            Flow::Login => (
                "Signing in...",
                "Login successful.",
                "Login failed. Please try again.",
            ),
            Flow::Register => (
                "Creating account...",
                "Registration completed successfully!",
                "Registration failed. Please try again.",
            ),
            Flow::RecoverPassword => (
                "Sending recovery e-mail...",
                "A password reset link has been sent to your email.",
                "Could not send the recovery e-mail.",
            ),
            Flow::ResetPassword => (
                "Resetting password...",
                "Password reset successfully!",
                "Could not reset the password.",
            ),
        };
        let greeting = match flow {
            Flow::Chat => Some("Hi! I'm TekBot and I'm here to help you!".to_string()),
            _ => None,
        };
        let redirect = match flow {
            Flow::Login => Some(Redirect {
                screen: Screen::Chat,
                after: Duration::ZERO,
            }),
            Flow::Register => Some(Redirect {
                screen: Screen::Login,
                after: Duration::from_secs(2),
            }),
            Flow::ResetPassword => Some(Redirect {
                screen: Screen::Login,
                after: Duration::ZERO,
            }),
            Flow::Chat | Flow::RecoverPassword => None,
        };

        Self {
            flow,
            pending_label: pending_label.to_string(),
            success_text: success_text.to_string(),
            fallback_error: fallback_error.to_string(),
            connection_error: CONNECTION_ERROR.to_string(),
            greeting,
            redirect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub tone: Tone,
    pub lines: Vec<String>,
}

impl DisplayMessage {
    pub fn new(tone: Tone, lines: Vec<String>) -> Self {
        Self { tone, lines }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Escaped markup with `<br>` between lines.
    pub fn html(&self) -> String {
        self.lines
            .iter()
            .map(|line| escape_html(line))
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub screen: Screen,
    pub pending_indicator: Option<String>,
    pub submit_enabled: bool,
    pub message: Option<DisplayMessage>,
}

impl DisplayModel {
    pub fn is_pending(&self) -> bool {
        self.pending_indicator.is_some()
    }
}

pub fn render(state: &ExchangeState, presentation: &Presentation) -> DisplayModel {
    let screen = presentation.flow.screen();
    match state {
        ExchangeState::Idle => DisplayModel {
            screen,
            pending_indicator: None,
            submit_enabled: true,
            message: None,
        },
        ExchangeState::Pending => DisplayModel {
            screen,
            pending_indicator: Some(presentation.pending_label.clone()),
            submit_enabled: false,
            message: None,
        },
        ExchangeState::Succeeded(response) => {
            let text = response
                .reply
                .as_deref()
                .unwrap_or(presentation.success_text.as_str());
            DisplayModel {
                screen,
                pending_indicator: None,
                submit_enabled: true,
                message: Some(DisplayMessage::new(
                    Tone::Success,
                    normalize_line_breaks(text),
                )),
            }
        }
        ExchangeState::Failed(err) => DisplayModel {
            screen,
            pending_indicator: None,
            submit_enabled: true,
            message: Some(DisplayMessage::new(
                Tone::Error,
                vec![error_text(err, presentation)],
            )),
        },
    }
}

pub fn error_text(err: &ExchangeError, presentation: &Presentation) -> String {
    match err {
        ExchangeError::Validation(validation) => validation.to_string(),
        ExchangeError::Transport(_) => presentation.connection_error.clone(),
        ExchangeError::Server { detail, .. } => detail
            .clone()
            .unwrap_or_else(|| presentation.fallback_error.clone()),
        ExchangeError::MalformedResponse { .. } => presentation.fallback_error.clone(),
    }
}

/// Splits text on real line breaks and on escaped `\n`, `\r\n` and `\\n`
/// sequences that some replies carry literally.
pub fn normalize_line_breaks(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace(r"\\n", "\n")
        .replace(r"\r\n", "\n")
        .replace(r"\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
