use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;
use url::Url;

use redminefs::state::{AppState, Settings, StateError};

/// Write the settings file for the selected profile
#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Base URL of the Redmine instance
    #[arg(long)]
    pub endpoint: Url,

    /// Redmine REST API key (My account > API access key)
    #[arg(long)]
    pub apikey: String,

    /// Default project id for `issues`
    #[arg(long)]
    pub project: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Attribute cache lifetime in seconds for mounts
    #[arg(long, default_value = "1")]
    pub attr_ttl_secs: u64,

    /// Overwrite existing settings
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug)]
pub struct InitOutput {
    pub settings_path: PathBuf,
    pub profile: Option<String>,
    pub endpoint: Url,
    pub apikey: String,
    pub project: Option<u64>,
    pub insecure: bool,
}

impl fmt::Display for InitOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} redminefs at {}",
            "Initialized".green().bold(),
            self.settings_path.display().to_string().bold()
        )?;
        writeln!(
            f,
            "  {} {}",
            "Profile:".dimmed(),
            self.profile.as_deref().unwrap_or("default")
        )?;
        writeln!(f, "  {} {}", "Endpoint:".dimmed(), self.endpoint)?;
        writeln!(f, "  {} {}", "API key:".dimmed(), mask_key(&self.apikey))?;
        if let Some(project) = self.project {
            writeln!(f, "  {} {}", "Project:".dimmed(), project)?;
        }
        if self.insecure {
            write!(f, "  {}", "TLS verification disabled".yellow())
        } else {
            write!(f, "  {} {}", "TLS:".dimmed(), "verified")
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = InitOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let settings = Settings {
            endpoint: self.endpoint.clone(),
            apikey: self.apikey.clone(),
            project: self.project,
            insecure: self.insecure,
            timeout_secs: self.timeout_secs,
            attr_ttl_secs: self.attr_ttl_secs,
        };

        let state = AppState::init(
            ctx.config_dir.clone(),
            ctx.profile.as_deref(),
            settings,
            self.force,
        )?;

        Ok(InitOutput {
            settings_path: state.settings_path,
            profile: state.profile,
            endpoint: state.settings.endpoint,
            apikey: state.settings.apikey,
            project: state.settings.project,
            insecure: state.settings.insecure,
        })
    }
}

/// Keep only the last four characters of a key
fn mask_key(key: &str) -> String {
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if visible.len() == key.len() {
        "****".to_string()
    } else {
        format!("****{}", visible)
    }
}
