//! Everything a mounted screen renders into or reaches out to.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use shared::domain::{Screen, Theme};

use crate::{
    preferences::{self, PreferenceStore},
    render::DisplayModel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub screen: Screen,
    pub after: Duration,
}

/// Receives display models. Calls must complete before returning.
pub trait RenderSink: Send + Sync {
    fn render(&self, model: &DisplayModel);

    fn apply_theme(&self, _theme: Theme) {}
}

/// Called once a redirect's delay has already elapsed.
pub trait Navigator: Send + Sync {
    fn navigate(&self, redirect: Redirect);
}

/// Navigator for screens that never leave.
pub struct StayOnScreen;

impl Navigator for StayOnScreen {
    fn navigate(&self, _redirect: Redirect) {}
}

#[derive(Clone)]
pub struct ScreenContext {
    pub sink: Arc<dyn RenderSink>,
    pub navigator: Arc<dyn Navigator>,
    pub preferences: Arc<dyn PreferenceStore>,
}

impl ScreenContext {
    pub fn new(
        sink: Arc<dyn RenderSink>,
        navigator: Arc<dyn Navigator>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            sink,
            navigator,
            preferences,
        }
    }

    pub fn apply_saved_theme(&self) -> Result<Theme> {
        let theme = preferences::load_theme(self.preferences.as_ref())?;
        self.sink.apply_theme(theme);
        Ok(theme)
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = preferences::toggle_theme(self.preferences.as_ref())?;
        self.sink.apply_theme(theme);
        Ok(theme)
    }
}
