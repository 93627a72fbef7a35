//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: The vault could not be opened
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// The vault could not be opened for a reason other than bad secrets.
    pub const OPEN_FAILED: i32 = 2;

    /// Resource not found (vault files, entry).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments, ambiguous filters.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password, wrong PIN, too many attempts).
    pub const AUTH_FAILED: i32 = 5;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    /// Vault master password
    pub const MASTER_PASSWORD: &str = "MASTERPW";

    /// Credential cache PIN
    pub const PIN: &str = "ENP_PIN";

    /// Extra secret mixed into the PIN
    pub const PIN_PEPPER: &str = "ENP_PIN_PEPPER";

    /// PBKDF2 rounds for the credential cache
    pub const PIN_ITER_COUNT: &str = "ENP_PIN_ITER_COUNT";

    /// Config file override
    pub const CONFIG: &str = "ENP_CONFIG";
}

/// Log level when neither `--log` nor `RUST_LOG` is given.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Password prompts allowed on a terminal before giving up.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;
