//! # Session Store
//!
//! Persists the signed-in [`Credentials`] as JSON so the next run starts
//! authenticated. Signing out deletes the file.
//!
//! The file holds a bearer token, so on unix it is created owner-only
//! (`0600`) and an existing file is narrowed back to that mode on save.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use evently_core::session::{AuthSession, Credentials};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Session shared between the HTTP client and its callers.
pub type SharedSession = Arc<RwLock<AuthSession>>;

/// A session file on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads stored credentials. A missing file means signed out; an
    /// unreadable one is logged and treated the same way.
    pub async fn load(&self) -> ClientResult<Option<Credentials>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No stored session");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Credentials>(&bytes) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring corrupt session file");
                Ok(None)
            }
        }
    }

    /// Writes the session, or removes the file when signed out.
    pub async fn save(&self, session: &AuthSession) -> ClientResult<()> {
        match session.credentials() {
            Some(credentials) => {
                if let Some(parent) = self.path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let json = serde_json::to_vec_pretty(credentials)
                    .map_err(|e| ClientError::Io(e.to_string()))?;
                write_private(&self.path, &json).await?;
                info!(path = ?self.path, "Session saved");
            }
            None => self.clear().await?,
        }
        Ok(())
    }

    /// Deletes the session file if present.
    pub async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = ?self.path, "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Builds a shared session hydrated from this store.
    pub async fn hydrate(&self) -> ClientResult<SharedSession> {
        let mut session = AuthSession::new();
        session.hydrate(self.load().await?);
        Ok(Arc::new(RwLock::new(session)))
    }
}

/// Owner read/write only.
#[cfg(unix)]
const SESSION_FILE_MODE: u32 = 0o600;

async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(SESSION_FILE_MODE);

    let mut file = options.open(path).await?;

    // `mode` only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(SESSION_FILE_MODE))
            .await?;
    }

    file.write_all(contents).await?;
    file.flush().await
}
