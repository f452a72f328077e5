//! Client configuration: where to connect and how the session behaves.

use std::path::Path;

use murmur_session::{EventReceiver, Session, SessionConfig};
use serde::{Deserialize, Serialize};

use crate::MurmurError;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 47007;

/// Everything a client needs to open a session.
///
/// Loads from JSON. Every field is optional, so `{}` is a valid config and
/// `{"port": 9000}` changes only the port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session: SessionConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Reads a config from a JSON file.
    ///
    /// # Errors
    /// - [`MurmurError::ConfigRead`] if the file can't be read.
    /// - [`MurmurError::ConfigParse`] if it isn't a valid config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MurmurError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            MurmurError::ConfigRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded client config");
        Ok(config)
    }

    /// Creates a session from this config and connects it to
    /// `host:port`.
    ///
    /// # Errors
    /// Returns [`MurmurError::Session`] if the connection can't be made.
    pub async fn connect(&self) -> Result<(Session, EventReceiver), MurmurError> {
        let (session, events) = Session::new(self.session.clone());
        session.connect(&self.host, self.port).await?;
        Ok((session, events))
    }
}
