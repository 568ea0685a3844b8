use serde_json::Value;
use shared::{
    domain::Screen,
    protocol::{AskResponse, TokenResponse},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Chat,
    Login,
    Register,
    RecoverPassword,
    ResetPassword,
}

impl Flow {
    pub fn name(self) -> &'static str {
        match self {
            Flow::Chat => "chat",
            Flow::Login => "login",
            Flow::Register => "register",
            Flow::RecoverPassword => "recover_password",
            Flow::ResetPassword => "reset_password",
        }
    }

    pub fn screen(self) -> Screen {
        match self {
            Flow::Chat => Screen::Chat,
            Flow::Login => Screen::Login,
            Flow::Register => Screen::Register,
            Flow::RecoverPassword => Screen::RecoverPassword,
            Flow::ResetPassword => Screen::ResetPassword,
        }
    }

    /// Reads a 2xx body. `Ok(Some(_))` is a server-provided reply to display,
    /// `Ok(None)` means the flow shows its own confirmation text.
    pub fn read_success(self, body: &Value) -> Result<Option<String>, String> {
        match self {
            Flow::Chat => serde_json::from_value::<AskResponse>(body.clone())
                .map(|reply| Some(reply.answer))
                .map_err(|err| format!("chat reply without `resposta`: {err}")),
            Flow::Login => serde_json::from_value::<TokenResponse>(body.clone())
                .map(|_| None)
                .map_err(|err| format!("login reply without token: {err}")),
            Flow::Register | Flow::RecoverPassword | Flow::ResetPassword => Ok(None),
        }
    }
}
