use std::fmt::{Debug, Display};
use std::path::PathBuf;

use redminefs::state::{AppState, StateError};

/// Global options every command runs with
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    /// Overrides the platform config directory
    pub config_dir: Option<PathBuf>,
    /// Selected settings profile
    pub profile: Option<String>,
}

impl OpContext {
    pub fn new(config_dir: Option<PathBuf>, profile: Option<String>) -> Self {
        Self {
            config_dir,
            profile,
        }
    }

    /// Load the settings of the selected profile
    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_dir.clone(), self.profile.as_deref())
    }
}

/// A CLI command
#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
    type Output: Display + Debug;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

/// Builds a clap `Command` enum over a set of ops, plus the matching
/// `OpError` / `OpOutput` enums and an `Op` impl dispatching to the variant.
#[macro_export]
macro_rules! command_enum {
    ($( $(#[$attr:meta])* ($variant:ident, $type:ty) ),* $(,)?) => {
        #[derive(clap::Subcommand, Debug, Clone)]
        pub enum Command {
            $(
                $(#[$attr])*
                $variant($type),
            )*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                $(#[$attr])*
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $(
                $(#[$attr])*
                $variant(<$type as $crate::cli::op::Op>::Output),
            )*
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $(#[$attr])*
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Error = OpError;
            type Output = OpOutput;

            async fn execute(
                &self,
                ctx: &$crate::cli::op::OpContext,
            ) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        $(#[$attr])*
                        Command::$variant(op) => op
                            .execute(ctx)
                            .await
                            .map(OpOutput::$variant)
                            .map_err(OpError::$variant),
                    )*
                }
            }
        }
    };
}
