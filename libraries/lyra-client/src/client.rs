//! Main catalog service client.

use crate::error::{ClientError, Result};
use crate::playlists::PlaylistsClient;
use crate::preferences::PreferencesClient;
use crate::tracks::TracksClient;
use crate::types::ClientConfig;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Main client for the catalog service.
///
/// The client holds the service URL and the optional bearer credential and
/// hands out sub-clients for tracks, preferences and playlists. Cloning is
/// cheap and clones share the credential.
///
/// # Example
///
/// ```ignore
/// use lyra_client::{ClientConfig, LyraClient};
/// use lyra_core::TrackQuery;
///
/// let client = LyraClient::new(ClientConfig::new("https://music.example.com/api"))?;
///
/// let handle = client.tracks().await;
/// let tracks = handle.client().list(&TrackQuery::new().with_genre(Some("Jazz"))).await?;
/// println!("Found {} tracks", tracks.len());
/// ```
#[derive(Clone)]
pub struct LyraClient {
    http: Client,
    config: Arc<RwLock<ClientConfig>>,
}

impl LyraClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Validate URL
        if config.url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        // Parse and normalize URL
        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let normalized_config = ClientConfig {
            url,
            access_token: config.access_token,
        };

        // Create HTTP client with reasonable defaults
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Lyra/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the service URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client has a bearer credential.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Attach or clear the bearer credential.
    pub async fn set_access_token(&self, access_token: Option<String>) {
        let mut config = self.config.write().await;
        let was_authenticated = config.access_token.is_some();
        config.access_token = access_token;

        match (was_authenticated, config.access_token.is_some()) {
            (false, true) => info!("Credential attached"),
            (true, false) => info!("Credential cleared"),
            _ => {}
        }
    }

    /// Get a tracks client.
    ///
    /// Works with or without a credential; when one is present it is sent so
    /// the service can fill in per-user preference flags.
    pub async fn tracks(&self) -> TracksClientHandle {
        let config = self.config.read().await;
        TracksClientHandle {
            http: self.http.clone(),
            url: config.url.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Get a preferences client.
    ///
    /// Returns an error if not authenticated.
    pub async fn preferences(&self) -> Result<PreferencesClientHandle> {
        let config = self.config.read().await;
        let access_token = config
            .access_token
            .clone()
            .ok_or(ClientError::AuthRequired)?;

        Ok(PreferencesClientHandle {
            http: self.http.clone(),
            url: config.url.clone(),
            access_token,
        })
    }

    /// Get a playlists client.
    ///
    /// Returns an error if not authenticated.
    pub async fn playlists(&self) -> Result<PlaylistsClientHandle> {
        let config = self.config.read().await;
        let access_token = config
            .access_token
            .clone()
            .ok_or(ClientError::AuthRequired)?;

        Ok(PlaylistsClientHandle {
            http: self.http.clone(),
            url: config.url.clone(),
            access_token,
        })
    }
}

/// Attach the bearer header when a credential is present.
pub(crate) fn authorize(request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
    match access_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Handle for track operations.
pub struct TracksClientHandle {
    http: Client,
    url: String,
    access_token: Option<String>,
}

impl TracksClientHandle {
    /// Get the tracks client.
    pub fn client(&self) -> TracksClient<'_> {
        TracksClient::new(&self.http, &self.url, self.access_token.as_deref())
    }
}

/// Handle for preference operations.
pub struct PreferencesClientHandle {
    http: Client,
    url: String,
    access_token: String,
}

impl PreferencesClientHandle {
    /// Get the preferences client.
    pub fn client(&self) -> PreferencesClient<'_> {
        PreferencesClient::new(&self.http, &self.url, &self.access_token)
    }
}

/// Handle for playlist operations.
pub struct PlaylistsClientHandle {
    http: Client,
    url: String,
    access_token: String,
}

impl PlaylistsClientHandle {
    /// Get the playlists client.
    pub fn client(&self) -> PlaylistsClient<'_> {
        PlaylistsClient::new(&self.http, &self.url, &self.access_token)
    }
}
