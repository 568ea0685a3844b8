use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Chat,
    Register,
    RecoverPassword,
    ResetPassword,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Login,
        Screen::Chat,
        Screen::Register,
        Screen::RecoverPassword,
        Screen::ResetPassword,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Screen::Login => "/",
            Screen::Chat => "/chat",
            Screen::Register => "/cadastro",
            Screen::RecoverPassword => "/recuperarSenha",
            Screen::ResetPassword => "/redefinir-senha",
        }
    }

    /// Resolves a route path, ignoring any query string and trailing slash.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL
            .into_iter()
            .find(|screen| screen.path() == normalized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Key and values match what the web screens keep in local storage.
    pub const STORAGE_KEY: &'static str = "tema";

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn storage_value(self) -> &'static str {
        match self {
            Theme::Light => "claro",
            Theme::Dark => "escuro",
        }
    }

    /// Accepts stored and display names. Unknown values fall back to the
    /// default theme.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "escuro" | "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
