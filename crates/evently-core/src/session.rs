//! # Auth Session Context
//!
//! Who is signed in, held as an explicit value and handed to whatever needs
//! it. There is no global session.
//!
//! ```text
//!                 hydrate(None)
//! Uninitialized ─────────────────► Anonymous ◄──────────┐
//!       │                              │                 │ logout()
//!       │ hydrate(Some(credentials))   │ login(user, tok)│
//!       └──────────────────────────────┴──► Authenticated┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::User;

/// Lifecycle state of an [`AuthSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing read from storage yet.
    Uninitialized,
    Anonymous,
    Authenticated,
}

/// Token and profile of a signed-in user. This is what gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    hydrated: bool,
    credentials: Option<Credentials>,
}

impl AuthSession {
    /// A session that has not been hydrated yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match (self.hydrated, &self.credentials) {
            (false, _) => SessionState::Uninitialized,
            (true, None) => SessionState::Anonymous,
            (true, Some(_)) => SessionState::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Restores whatever was stored. Only the first call has an effect;
    /// returns whether this call hydrated the session.
    pub fn hydrate(&mut self, stored: Option<Credentials>) -> bool {
        if self.hydrated {
            return false;
        }
        self.hydrated = true;
        self.credentials = stored.filter(|c| !c.token.trim().is_empty());
        true
    }

    /// Signs in, replacing any previous user.
    pub fn login(&mut self, user: User, token: impl Into<String>) -> Result<(), ValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::required("token"));
        }
        self.hydrated = true;
        self.credentials = Some(Credentials { token, user });
        Ok(())
    }

    /// Signs out. The session stays hydrated.
    pub fn logout(&mut self) {
        self.hydrated = true;
        self.credentials = None;
    }

    /// Replaces the cached profile after an update. No-op when signed out.
    pub fn update_user(&mut self, user: User) {
        if let Some(credentials) = self.credentials.as_mut() {
            credentials.user = user;
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.credentials.as_ref().map(|c| &c.user)
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn user() -> User {
        User {
            id: "u-1".into(),
            email: "rina@example.com".into(),
            full_name: "Rina Putri".into(),
            role: Role::Customer,
            phone_number: None,
            profile_picture: None,
            referral_code: Some("RINA01".into()),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut session = AuthSession::new();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.token().is_none());

        assert!(session.hydrate(None));
        assert_eq!(session.state(), SessionState::Anonymous);

        session.login(user(), "jwt-abc").unwrap();
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.token(), Some("jwt-abc"));
        assert_eq!(session.user().map(|u| u.full_name.as_str()), Some("Rina Putri"));

        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.user().is_none());
    }

    #[test]
    fn test_hydrate_only_once() {
        let mut session = AuthSession::new();
        let stored = Credentials {
            token: "jwt-stored".into(),
            user: user(),
        };
        assert!(session.hydrate(Some(stored)));
        assert!(session.is_authenticated());

        assert!(!session.hydrate(None));
        assert_eq!(session.token(), Some("jwt-stored"));
    }

    #[test]
    fn test_blank_token_rejected() {
        let mut session = AuthSession::new();
        assert_eq!(
            session.login(user(), "  "),
            Err(ValidationError::required("token"))
        );
        assert_eq!(session.state(), SessionState::Uninitialized);

        let stored = Credentials {
            token: String::new(),
            user: user(),
        };
        session.hydrate(Some(stored));
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_update_user() {
        let mut session = AuthSession::new();
        let mut renamed = user();
        renamed.full_name = "Rina P.".into();

        session.update_user(renamed.clone());
        assert!(session.user().is_none());

        session.login(user(), "jwt").unwrap();
        session.update_user(renamed);
        assert_eq!(session.user().unwrap().full_name, "Rina P.");
    }

    #[test]
    fn test_credentials_json() {
        let credentials = Credentials {
            token: "jwt".into(),
            user: user(),
        };
        let json = serde_json::to_string(&credentials).unwrap();
        let back: Credentials = serde_json::from_str(&json).unwrap();
        assert_eq!(back, credentials);
    }
}
