//! Stdout rendering for mounted screens.

use std::{
    io::{self, Write},
    sync::Mutex,
};

use client_core::{DisplayModel, Navigator, Redirect, RenderSink, Tone};
use shared::domain::Theme;
use tracing::info;

const RESET: &str = "\x1b[0m";

#[derive(Default)]
pub struct TerminalSink {
    theme: Mutex<Theme>,
}

impl TerminalSink {
    fn theme(&self) -> Theme {
        *self
            .theme
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn color(&self, tone: Tone) -> &'static str {
        match (self.theme(), tone) {
            (Theme::Light, Tone::Success) => "\x1b[32m",
            (Theme::Light, Tone::Error) => "\x1b[31m",
            (Theme::Dark, Tone::Success) => "\x1b[92m",
            (Theme::Dark, Tone::Error) => "\x1b[91m",
        }
    }
}

impl RenderSink for TerminalSink {
    fn render(&self, model: &DisplayModel) {
        let mut out = io::stdout().lock();
        if let Some(label) = &model.pending_indicator {
            let _ = writeln!(out, "… {label}");
            return;
        }
        if let Some(message) = &model.message {
            let color = self.color(message.tone);
            for line in &message.lines {
                let _ = writeln!(out, "{color}{line}{RESET}");
            }
        }
        let _ = out.flush();
    }

    fn apply_theme(&self, theme: Theme) {
        *self
            .theme
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = theme;
    }
}

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, redirect: Redirect) {
        info!(screen = redirect.screen.path(), "navigation requested");
        println!("-> continue at {}", redirect.screen.path());
    }
}
