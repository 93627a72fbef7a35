use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use enpass_core::{FilterField, VERSION};

/// enpasscli - read entries from an Enpass vault
#[derive(Parser)]
#[command(name = "enpasscli")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the Enpass vault directory
    #[arg(long, global = true, env = "ENP_VAULT", value_name = "DIR")]
    pub vault: Option<PathBuf>,

    /// Entry type to select (password, username, ...)
    #[arg(long = "type", global = true, default_value = "password")]
    pub entry_type: String,

    /// Path to the vault keyfile
    #[arg(long, global = true, value_name = "FILE")]
    pub keyfile: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Output data as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable prompts and fail instead
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Cache the vault key under a PIN
    #[arg(long, global = true)]
    pub pin: bool,

    /// Combine filters with AND instead of OR
    #[arg(long, global = true)]
    pub and: bool,

    /// Sort output by title, then login
    #[arg(long, global = true)]
    pub sort: bool,

    /// Include trashed entries in list and show
    #[arg(long, global = true)]
    pub trashed: bool,

    /// Field a filter is matched against; repeat for several
    #[arg(long = "field", global = true, value_enum, value_name = "FIELD")]
    pub fields: Vec<FieldArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Unlock the vault (and PIN cache) without printing anything
    Dryrun,

    /// List matching entries without secrets
    List(FilterArgs),

    /// List matching entries with their secrets
    Show(FilterArgs),

    /// Print the secret of exactly one matching entry
    Pass(FilterArgs),

    /// Remove the PIN cache for the vault
    Lock,
}

/// Positional filters shared by entry commands
#[derive(Args)]
pub struct FilterArgs {
    /// Case-insensitive substrings to match
    #[arg(value_name = "FILTER")]
    pub filters: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FieldArg {
    Title,
    #[value(alias = "login")]
    Subtitle,
    Category,
    Label,
    Note,
}

impl From<FieldArg> for FilterField {
    fn from(value: FieldArg) -> Self {
        match value {
            FieldArg::Title => FilterField::Title,
            FieldArg::Subtitle => FilterField::Subtitle,
            FieldArg::Category => FilterField::Category,
            FieldArg::Label => FilterField::Label,
            FieldArg::Note => FilterField::Note,
        }
    }
}
