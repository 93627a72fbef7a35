//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use enpass_core::VaultError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (vault files, entry)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong password or PIN, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// The vault could not be opened
    OpenFailed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::OpenFailed(message) => write!(f, "could not open vault: {}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Map a core error to its user-facing form.
    ///
    /// Errors without a dedicated exit code become `OpenFailed`, so this is
    /// meant for failures while unlocking or querying the vault.
    pub fn from_vault_error(err: &VaultError) -> Self {
        match err {
            VaultError::Configuration(message) => CliError::invalid_input(message.clone()),
            VaultError::Authentication(message) => CliError::auth_failed_with_hint(
                message.clone(),
                "Hint: Check the master password and keyfile, or run `enpasscli lock` to drop a stale PIN cache.",
            ),
            VaultError::NotFound(message) => CliError::not_found(
                message.clone(),
                "Hint: Run `enpasscli list` to see which entries match.",
            ),
            VaultError::AmbiguousMatch { count } => CliError::invalid_input(format!(
                "{} entries match; narrow the filter or combine filters with --and",
                count
            )),
            other => CliError::OpenFailed(other.to_string()),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::OpenFailed(_) => exit_codes::OPEN_FAILED,
        }
    }

    /// Print error message to stderr and exit with appropriate code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}
