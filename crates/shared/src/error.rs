use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Message,
    Email,
    Password,
    Confirmation,
    Token,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Message => "message",
            Field::Email => "e-mail",
            Field::Password => "password",
            Field::Confirmation => "password confirmation",
            Field::Token => "reset token",
        }
    }
}

/// Local input rejection, raised before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in the {}.", .field.label())]
    EmptyField { field: Field },
    #[error("The password must be at least {min} characters long.")]
    PasswordTooShort { min: usize },
    #[error("The passwords do not match. Please try again.")]
    PasswordMismatch,
    #[error("Invalid or expired token.")]
    MissingToken,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::EmptyField { field } => *field,
            ValidationError::PasswordTooShort { .. } => Field::Password,
            ValidationError::PasswordMismatch => Field::Confirmation,
            ValidationError::MissingToken => Field::Token,
        }
    }
}
