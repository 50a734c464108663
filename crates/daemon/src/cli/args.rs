use std::path::PathBuf;

use clap::Parser;

use super::ops;

crate::command_enum! {
    (Init, ops::Init),
    #[cfg(feature = "fuse")]
    (Mount, ops::Mount),
    (Projects, ops::Projects),
    (Issues, ops::Issues),
    (Cat, ops::Cat),
    (Health, ops::Health),
    (Version, ops::Version),
}

/// Profile variable shared with godmine, read when no other source names one
pub const GODMINE_PROFILE_ENV: &str = "GODMINE_ENV";

/// Browse a Redmine tracker as a read-only filesystem
#[derive(Parser, Debug)]
#[command(name = "redminefs", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Settings directory (defaults to <config dir>/redminefs)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Settings profile, read from settings.<PROFILE>.toml (GODMINE_ENV is
    /// used when neither this nor REDMINEFS_PROFILE is set)
    #[arg(short, long, env = "REDMINEFS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,
}

impl Args {
    /// The selected profile, if any
    pub fn profile(&self) -> Option<String> {
        select_profile(
            self.profile.clone(),
            std::env::var(GODMINE_PROFILE_ENV).ok(),
        )
    }
}

/// An empty name selects the default profile, as an unset one does
fn select_profile(explicit: Option<String>, godmine: Option<String>) -> Option<String> {
    explicit.or(godmine).filter(|name| !name.is_empty())
}
