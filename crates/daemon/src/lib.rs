// Redmine REST client
pub mod api;
#[cfg(feature = "fuse")]
pub mod fuse;

// App state (settings, profiles, paths)
pub mod state;

pub use api::{ApiError, ClientOptions, RedmineClient};
pub use state::{AppState, Settings, StateError};
