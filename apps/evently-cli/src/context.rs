//! Shared state for one CLI invocation.

use std::path::PathBuf;
use std::sync::Arc;

use evently_client::{ClientConfig, HttpApi, SessionStore, SharedSession};
use evently_core::session::AuthSession;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{CliError, CliResult, ErrorCode};
use crate::render::Output;

/// Config, API handle and session file for the running command.
pub struct AppContext {
    pub config: ClientConfig,
    pub api: HttpApi,
    pub output: Output,
    store: Option<SessionStore>,
}

impl AppContext {
    /// Loads config, hydrates the stored session and builds the API client.
    pub async fn init(config_path: Option<PathBuf>, output: Output) -> CliResult<Self> {
        let config = ClientConfig::load(config_path)?;
        let store = config.session_path().map(SessionStore::new);

        let session: SharedSession = match &store {
            Some(store) => store.hydrate().await?,
            None => {
                debug!("No session path available, session will not persist");
                let mut session = AuthSession::new();
                session.hydrate(None);
                Arc::new(RwLock::new(session))
            }
        };

        AppContext::from_parts(config, session, store, output)
    }

    /// Builds the context around an already hydrated session.
    pub fn from_parts(
        config: ClientConfig,
        session: SharedSession,
        store: Option<SessionStore>,
        output: Output,
    ) -> CliResult<Self> {
        let api = HttpApi::new(&config, session)?;
        Ok(AppContext {
            config,
            api,
            output,
            store,
        })
    }

    /// Writes the current session back to disk.
    pub async fn persist_session(&self) -> CliResult<()> {
        if let Some(store) = &self.store {
            let session = self.api.session().read().await;
            store.save(&session).await?;
        }
        Ok(())
    }

    /// Fails with `Unauthorized` unless an organizer is signed in.
    pub async fn require_organizer(&self) -> CliResult<()> {
        self.require_login().await?;
        let session = self.api.session().read().await;
        if session.user().is_some_and(|u| u.is_organizer()) {
            Ok(())
        } else {
            Err(CliError::new(
                ErrorCode::Unauthorized,
                "This command needs an organizer account",
            ))
        }
    }

    /// Fails with `Unauthorized` unless someone is signed in.
    pub async fn require_login(&self) -> CliResult<()> {
        if self.api.session().read().await.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::new(ErrorCode::Unauthorized, "Please log in first"))
        }
    }
}
