//! Settings directory, profiles and the settings file.
//!
//! Settings live in `<config dir>/redminefs/settings.toml`, or
//! `settings.<profile>.toml` when a profile is selected:
//!
//! ```toml
//! endpoint = "https://redmine.example.com"
//! apikey = "0123456789abcdef"
//! project = 1
//! insecure = false
//! timeout_secs = 30
//! attr_ttl_secs = 1
//! ```
//!
//! When no TOML file exists for the profile, the JSON settings shared with
//! godmine are read instead: `~/.config/godmine/settings[.<profile>].json`
//! (`%APPDATA%\godmine` on Windows), or the same file names inside
//! `--config-dir` when one is given. That file is never written.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{ApiError, ClientOptions, RedmineClient};

/// Directory name under the platform config dir
pub const APP_NAME: &str = "redminefs";

/// Settings file used when no profile is selected
pub const DEFAULT_SETTINGS_FILE: &str = "settings.toml";

/// Directory of the godmine settings, a sibling of ours
pub const GODMINE_DIR: &str = "godmine";

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not determine the user config directory")]
    NoConfigDirectory,
    #[error("no settings at {0}, run `redminefs init` first")]
    NotInitialized(PathBuf),
    #[error("settings already exist at {0}, pass --force to overwrite")]
    AlreadyInitialized(PathBuf),
    #[error("invalid profile name: {0:?}")]
    InvalidProfile(String),
    #[error("failed to read settings {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to read godmine settings {path}: {source}")]
    GodmineParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_attr_ttl_secs() -> u64 {
    1
}

/// Contents of a settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the Redmine instance
    pub endpoint: Url,
    /// Redmine REST API key
    pub apikey: String,
    /// Project listed by `issues` when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<u64>,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_attr_ttl_secs")]
    pub attr_ttl_secs: u64,
}

impl Settings {
    pub fn new(endpoint: Url, apikey: impl Into<String>) -> Self {
        Self {
            endpoint,
            apikey: apikey.into(),
            project: None,
            insecure: false,
            timeout_secs: default_timeout_secs(),
            attr_ttl_secs: default_attr_ttl_secs(),
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            insecure: self.insecure,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn attr_ttl(&self) -> Duration {
        Duration::from_secs(self.attr_ttl_secs)
    }

    /// Build a client for the configured tracker
    pub fn client(&self) -> Result<RedmineClient, ApiError> {
        RedmineClient::new(&self.endpoint, &self.apikey, &self.client_options())
    }
}

/// The godmine settings file. Fields godmine alone uses, such as
/// `editor`, are ignored.
#[derive(Debug, Deserialize)]
struct GodmineSettings {
    endpoint: Url,
    apikey: String,
    /// Zero when unset
    #[serde(default)]
    project: i64,
    #[serde(default)]
    insecure: bool,
}

impl From<GodmineSettings> for Settings {
    fn from(godmine: GodmineSettings) -> Self {
        let mut settings = Settings::new(godmine.endpoint, godmine.apikey);
        settings.project = u64::try_from(godmine.project).ok().filter(|id| *id != 0);
        settings.insecure = godmine.insecure;
        settings
    }
}

/// Resolved settings location plus the loaded settings
#[derive(Debug, Clone)]
pub struct AppState {
    /// Directory holding the settings files
    pub config_dir: PathBuf,
    /// Settings file for the selected profile
    pub settings_path: PathBuf,
    pub profile: Option<String>,
    pub settings: Settings,
}

impl AppState {
    /// The settings directory, `custom` if given
    pub fn config_dir(custom: Option<PathBuf>) -> Result<PathBuf, StateError> {
        match custom {
            Some(dir) => Ok(dir),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_NAME))
                .ok_or(StateError::NoConfigDirectory),
        }
    }

    /// File name of the settings for `profile`
    pub fn settings_file_name(profile: Option<&str>) -> Result<String, StateError> {
        match profile {
            None => Ok(DEFAULT_SETTINGS_FILE.to_string()),
            Some(name) if is_valid_profile(name) => Ok(format!("settings.{}.toml", name)),
            Some(name) => Err(StateError::InvalidProfile(name.to_string())),
        }
    }

    /// Directory of the godmine settings, `custom` if given
    pub fn godmine_dir(custom: Option<PathBuf>) -> Option<PathBuf> {
        if custom.is_some() {
            return custom;
        }
        if cfg!(windows) {
            dirs::config_dir().map(|dir| dir.join(GODMINE_DIR))
        } else {
            dirs::home_dir().map(|home| home.join(".config").join(GODMINE_DIR))
        }
    }

    /// File name of the godmine settings for `profile`
    pub fn godmine_file_name(profile: Option<&str>) -> Result<String, StateError> {
        match profile {
            None => Ok("settings.json".to_string()),
            Some(name) if is_valid_profile(name) => Ok(format!("settings.{}.json", name)),
            Some(name) => Err(StateError::InvalidProfile(name.to_string())),
        }
    }

    pub fn settings_path(
        custom: Option<PathBuf>,
        profile: Option<&str>,
    ) -> Result<PathBuf, StateError> {
        let dir = Self::config_dir(custom)?;
        Ok(dir.join(Self::settings_file_name(profile)?))
    }

    /// Load the settings of `profile`, falling back to godmine's
    pub fn load(custom: Option<PathBuf>, profile: Option<&str>) -> Result<Self, StateError> {
        let config_dir = Self::config_dir(custom.clone())?;
        let toml_path = config_dir.join(Self::settings_file_name(profile)?);

        let (settings_path, settings) = if toml_path.exists() {
            let settings = read_settings(&toml_path)?;
            (toml_path, settings)
        } else {
            let godmine_path = Self::godmine_dir(custom)
                .map(|dir| Self::godmine_file_name(profile).map(|name| dir.join(name)))
                .transpose()?
                .filter(|path| path.exists())
                .ok_or(StateError::NotInitialized(toml_path))?;
            let settings = read_godmine_settings(&godmine_path)?;
            (godmine_path, settings)
        };
        tracing::debug!(path = %settings_path.display(), "loaded settings");

        Ok(Self {
            config_dir,
            settings_path,
            profile: profile.map(str::to_string),
            settings,
        })
    }

    /// Write `settings` for `profile`, creating the directory if needed.
    ///
    /// Existing settings are only replaced when `force` is set.
    pub fn init(
        custom: Option<PathBuf>,
        profile: Option<&str>,
        settings: Settings,
        force: bool,
    ) -> Result<Self, StateError> {
        let config_dir = Self::config_dir(custom)?;
        let settings_path = config_dir.join(Self::settings_file_name(profile)?);

        if settings_path.exists() && !force {
            return Err(StateError::AlreadyInitialized(settings_path));
        }

        std::fs::create_dir_all(&config_dir)?;
        write_settings(&settings_path, &settings)?;
        tracing::info!(path = %settings_path.display(), "wrote settings");

        Ok(Self {
            config_dir,
            settings_path,
            profile: profile.map(str::to_string),
            settings,
        })
    }
}

/// Profile names become part of a file name
fn is_valid_profile(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn read_settings(path: &Path) -> Result<Settings, StateError> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_godmine_settings(path: &Path) -> Result<Settings, StateError> {
    let content = std::fs::read(path)?;
    let godmine: GodmineSettings =
        serde_json::from_slice(&content).map_err(|source| StateError::GodmineParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(godmine.into())
}

/// The file holds an API key, so it is only ever readable by its owner
fn write_settings(path: &Path, settings: &Settings) -> Result<(), StateError> {
    let content = toml::to_string_pretty(settings)?;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies to new files; tighten one being overwritten
    // before the key is written into it
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::new(
            Url::parse("https://redmine.example.com").unwrap(),
            "0123456789abcdef",
        )
    }

    #[test]
    fn test_settings_file_names() {
        assert_eq!(AppState::settings_file_name(None).unwrap(), "settings.toml");
        assert_eq!(
            AppState::settings_file_name(Some("work")).unwrap(),
            "settings.work.toml"
        );
        assert!(matches!(
            AppState::settings_file_name(Some("../etc")),
            Err(StateError::InvalidProfile(_))
        ));
        assert!(matches!(
            AppState::settings_file_name(Some("")),
            Err(StateError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_custom_config_dir_wins() {
        let dir = PathBuf::from("/tmp/redminefs-test");
        assert_eq!(AppState::config_dir(Some(dir.clone())).unwrap(), dir);
    }

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("nested");

        let mut expected = settings();
        expected.project = Some(4);
        AppState::init(Some(config_dir.clone()), None, expected.clone(), false).unwrap();

        let state = AppState::load(Some(config_dir.clone()), None).unwrap();
        assert_eq!(state.settings, expected);
        assert_eq!(state.settings_path, config_dir.join("settings.toml"));
    }

    #[test]
    fn test_profiles_are_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let custom = Some(dir.path().to_path_buf());

        AppState::init(custom.clone(), Some("work"), settings(), false).unwrap();

        assert!(matches!(
            AppState::load(custom.clone(), None),
            Err(StateError::NotInitialized(_))
        ));
        let state = AppState::load(custom, Some("work")).unwrap();
        assert_eq!(state.profile.as_deref(), Some("work"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let custom = Some(dir.path().to_path_buf());

        AppState::init(custom.clone(), None, settings(), false).unwrap();
        assert!(matches!(
            AppState::init(custom.clone(), None, settings(), false),
            Err(StateError::AlreadyInitialized(_))
        ));

        let mut replaced = settings();
        replaced.insecure = true;
        let state = AppState::init(custom, None, replaced, true).unwrap();
        assert!(state.settings.insecure);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.toml"),
            "endpoint = \"https://redmine.example.com/\"\napikey = \"k\"\n",
        )
        .unwrap();

        let state = AppState::load(Some(dir.path().to_path_buf()), None).unwrap();
        assert_eq!(state.settings.project, None);
        assert!(!state.settings.insecure);
        assert_eq!(state.settings.timeout_secs, 30);
        assert_eq!(state.settings.attr_ttl(), Duration::from_secs(1));
    }

    const GODMINE_JSON: &str = r#"{
        "endpoint": "https://redmine.example.com",
        "apikey": "k",
        "project": 1,
        "editor": "vim",
        "insecure": false
    }"#;

    #[test]
    fn test_falls_back_to_godmine_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, GODMINE_JSON).unwrap();

        let state = AppState::load(Some(dir.path().to_path_buf()), None).unwrap();
        assert_eq!(state.settings_path, path);
        assert_eq!(
            state.settings.endpoint,
            Url::parse("https://redmine.example.com").unwrap()
        );
        assert_eq!(state.settings.apikey, "k");
        assert_eq!(state.settings.project, Some(1));
        assert!(!state.settings.insecure);
        assert_eq!(state.settings.timeout_secs, 30);
    }

    #[test]
    fn test_godmine_profile_and_unset_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.work.json"),
            r#"{"endpoint": "https://work.example.com", "apikey": "w", "project": 0, "insecure": true}"#,
        )
        .unwrap();

        let custom = Some(dir.path().to_path_buf());
        assert!(matches!(
            AppState::load(custom.clone(), None),
            Err(StateError::NotInitialized(_))
        ));

        let state = AppState::load(custom, Some("work")).unwrap();
        assert_eq!(state.settings.project, None);
        assert!(state.settings.insecure);
    }

    #[test]
    fn test_toml_settings_win_over_godmine() {
        let dir = tempfile::tempdir().unwrap();
        let custom = Some(dir.path().to_path_buf());
        std::fs::write(dir.path().join("settings.json"), GODMINE_JSON).unwrap();
        AppState::init(custom.clone(), None, settings(), false).unwrap();

        let state = AppState::load(custom, None).unwrap();
        assert_eq!(state.settings_path, dir.path().join("settings.toml"));
        assert_eq!(state.settings.apikey, "0123456789abcdef");
    }

    #[test]
    fn test_malformed_godmine_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{\"apikey\": 1}").unwrap();

        let err = AppState::load(Some(dir.path().to_path_buf()), None).unwrap_err();
        assert!(matches!(err, StateError::GodmineParse { .. }));
        assert!(err.to_string().contains("settings.json"));
    }

    #[cfg(unix)]
    #[test]
    fn test_settings_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let custom = Some(dir.path().to_path_buf());
        let path = dir.path().join("settings.toml");

        AppState::init(custom.clone(), None, settings(), false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // Overwriting a file created with looser permissions tightens it
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        AppState::init(custom, None, settings(), true).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.toml"), "endpoint = 3").unwrap();

        let err = AppState::load(Some(dir.path().to_path_buf()), None).unwrap_err();
        assert!(matches!(err, StateError::Parse { .. }));
        assert!(err.to_string().contains("settings.toml"));
    }
}
