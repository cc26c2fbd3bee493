/// CLI configuration
use crate::error::{CliError, Result};
use lyra_core::{Role, Session};
use lyra_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Catalog service base URL
    #[serde(default = "default_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default)]
    pub repeat: bool,

    #[serde(default)]
    pub shuffle: bool,

    #[serde(default = "default_allow_anonymous")]
    pub allow_anonymous_preferences: bool,
}

/// Credential handed over by whatever performed the login
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub role: Role,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `lyra.toml` in the working
    /// directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from("lyra.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. LYRA_SERVER__URL
        settings = settings.add_source(
            config::Environment::with_prefix("LYRA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(CliError::Config(
                "Server URL is required (set LYRA_SERVER__URL)".to_string(),
            ));
        }

        if self.storage.database_url.trim().is_empty() {
            return Err(CliError::Config(
                "Database URL is required (set LYRA_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        let volume = self.playback.volume;
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(CliError::Config(format!(
                "Volume must be between 0.0 and 1.0, got {}",
                volume
            )));
        }

        Ok(())
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            volume: self.playback.volume,
            repeat: self.playback.repeat,
            shuffle: self.playback.shuffle,
            allow_anonymous_preferences: self.playback.allow_anonymous_preferences,
        }
    }

    /// Session from the configured credential; blank tokens mean signed out
    pub fn session(&self) -> Option<Session> {
        self.session
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Session::new(t, self.session.role))
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings { url: default_url() }
}

fn default_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/lyra.db".to_string()
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        volume: default_volume(),
        repeat: false,
        shuffle: false,
        allow_anonymous_preferences: default_allow_anonymous(),
    }
}

fn default_volume() -> f32 {
    0.8
}

fn default_allow_anonymous() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            playback: default_playback(),
            session: SessionSettings::default(),
        }
    }
}
