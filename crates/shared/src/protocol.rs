use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(rename = "pergunta")]
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(rename = "resposta")]
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(rename = "nova_senha")]
    pub new_password: String,
    pub token: String,
}

/// Validated payload for one exchange. Serializes to the bare request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExchangeRequest {
    Ask(AskRequest),
    Login(CredentialsRequest),
    Register(CredentialsRequest),
    RecoverPassword(RecoveryRequest),
    ResetPassword(ResetPasswordRequest),
}

impl ExchangeRequest {
    pub fn path(&self) -> &'static str {
        match self {
            ExchangeRequest::Ask(_) => "/ia/responder",
            ExchangeRequest::Login(_) => "/login",
            ExchangeRequest::Register(_) => "/register",
            ExchangeRequest::RecoverPassword(_) => "/recuperar-senha",
            ExchangeRequest::ResetPassword(_) => "/redefinir-senha",
        }
    }
}

/// Error envelope returned by the API on non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Only a string `detail` is user-facing; field-error lists are ignored.
    pub fn detail_text(&self) -> Option<&str> {
        match &self.detail {
            Some(Value::String(text)) if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn detail_from_bytes(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.detail_text().map(str::to_owned))
    }
}
