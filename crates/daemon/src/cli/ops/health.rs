use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;

use common::tracker::{Tracker, TrackerError};
use redminefs::state::AppState;

/// Check the settings and whether the tracker answers
#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug)]
pub struct ConfigInfo {
    pub settings_path: PathBuf,
    pub endpoint: String,
    pub insecure: bool,
}

#[derive(Debug)]
pub enum TrackerStatus {
    /// Answered the project listing
    Ok(usize),
    /// Reachable but refused the API key
    Unauthorized(String),
    NotReachable(String),
    /// Not checked because the settings could not be loaded
    Skipped,
}

#[derive(Debug)]
pub struct HealthOutput {
    pub config: Option<ConfigInfo>,
    pub config_error: Option<String>,
    pub tracker: TrackerStatus,
}

impl fmt::Display for HealthOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", "Config".bold())?;
        match &self.config {
            Some(info) => {
                writeln!(
                    f,
                    "  {} {}",
                    "settings:".dimmed(),
                    info.settings_path.display()
                )?;
                writeln!(f, "  {} {}", "endpoint:".dimmed(), info.endpoint)?;
                if info.insecure {
                    writeln!(f, "  {} {}", "tls:".dimmed(), "NOT VERIFIED".yellow())?;
                }
            }
            None => {
                if let Some(err) = &self.config_error {
                    writeln!(f, "  {} {}", "error:".red(), err)?;
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "{}:", "Tracker".bold())?;
        let status = match &self.tracker {
            TrackerStatus::Ok(count) => format!("{} ({} projects)", "OK".green(), count),
            TrackerStatus::Unauthorized(msg) => format!("{} ({})", "UNAUTHORIZED".red(), msg),
            TrackerStatus::NotReachable(msg) => format!("{} ({})", "NOT REACHABLE".red(), msg),
            TrackerStatus::Skipped => "SKIPPED".dimmed().to_string(),
        };
        write!(f, "  {} {}", "projects:".dimmed(), status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = HealthOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = match ctx.state() {
            Ok(state) => state,
            Err(e) => {
                return Ok(HealthOutput {
                    config: None,
                    config_error: Some(e.to_string()),
                    tracker: TrackerStatus::Skipped,
                })
            }
        };

        let client = state
            .settings
            .client()
            .map_err(|e| HealthError::Failed(e.to_string()))?;

        Ok(HealthOutput {
            tracker: check_tracker(&client).await,
            config: Some(config_info(&state)),
            config_error: None,
        })
    }
}

fn config_info(state: &AppState) -> ConfigInfo {
    ConfigInfo {
        settings_path: state.settings_path.clone(),
        endpoint: state.settings.endpoint.to_string(),
        insecure: state.settings.insecure,
    }
}

async fn check_tracker(tracker: &dyn Tracker) -> TrackerStatus {
    match tracker.list_projects().await {
        Ok(projects) => TrackerStatus::Ok(projects.len()),
        Err(TrackerError::Auth(msg)) => TrackerStatus::Unauthorized(msg),
        Err(e) => TrackerStatus::NotReachable(e.to_string()),
    }
}
