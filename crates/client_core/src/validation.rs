//! Local input checks that run before any request is built.

use shared::{
    error::{Field, ValidationError},
    protocol::{
        AskRequest, CredentialsRequest, ExchangeRequest, RecoveryRequest, ResetPasswordRequest,
    },
};

use crate::flow::Flow;

pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub min_password_len: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

/// Form values exactly as the user entered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Chat {
        message: String,
    },
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        confirmation: String,
    },
    RecoverPassword {
        email: String,
    },
    ResetPassword {
        password: String,
        confirmation: String,
        token: Option<String>,
    },
}

impl RawInput {
    pub fn flow(&self) -> Flow {
        match self {
            RawInput::Chat { .. } => Flow::Chat,
            RawInput::Login { .. } => Flow::Login,
            RawInput::Register { .. } => Flow::Register,
            RawInput::RecoverPassword { .. } => Flow::RecoverPassword,
            RawInput::ResetPassword { .. } => Flow::ResetPassword,
        }
    }
}

/// Text fields are trimmed before sending. Login and reset passwords are
/// trimmed too; a registration password is sent as typed and only trimmed for
/// the emptiness check.
pub fn validate(input: &RawInput, rules: &ValidationRules) -> Result<ExchangeRequest, ValidationError> {
    match input {
        RawInput::Chat { message } => {
            let question = required(message, Field::Message)?;
            Ok(ExchangeRequest::Ask(AskRequest { question }))
        }
        RawInput::Login { email, password } => {
            let email = required(email, Field::Email)?;
            let password = required(password, Field::Password)?;
            Ok(ExchangeRequest::Login(CredentialsRequest { email, password }))
        }
        RawInput::Register {
            email,
            password,
            confirmation,
        } => {
            let email = required(email, Field::Email)?;
            new_password(password, confirmation, rules)?;
            Ok(ExchangeRequest::Register(CredentialsRequest {
                email,
                password: password.clone(),
            }))
        }
        RawInput::RecoverPassword { email } => {
            let email = required(email, Field::Email)?;
            Ok(ExchangeRequest::RecoverPassword(RecoveryRequest { email }))
        }
        RawInput::ResetPassword {
            password,
            confirmation,
            token,
        } => {
            let token = token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .ok_or(ValidationError::MissingToken)?;
            let password = password.trim();
            new_password(password, confirmation.trim(), rules)?;
            Ok(ExchangeRequest::ResetPassword(ResetPasswordRequest {
                new_password: password.to_string(),
                token: token.to_string(),
            }))
        }
    }
}

fn required(value: &str, field: Field) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

fn new_password(
    password: &str,
    confirmation: &str,
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    required(password, Field::Password)?;
    if password.chars().count() < rules.min_password_len {
        return Err(ValidationError::PasswordTooShort {
            min: rules.min_password_len,
        });
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
