//! Authentication state shared by services, records and users
//!
//! A [`Session`] is a cheap, cloneable handle. Every instance created from the
//! same [`NetmeraClient`](crate::NetmeraClient) sees the same tokens, and the
//! token is read when a request is dispatched, not when it is configured.

use netmera_client::{NetmeraError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Profile of a user as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    /// Application token, initialised from the API key
    token: String,
    /// Security token of the logged-in user
    user_token: Option<String>,
    user: Option<UserProfile>,
}

/// Session token plus the optional logged-in user
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl Session {
    /// Create a session authenticated with the application API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState {
                token: api_key.into(),
                ..Default::default()
            })),
        }
    }

    /// Application token used for ordinary requests
    pub fn token(&self) -> String {
        self.read(|state| state.token.clone())
    }

    /// Token of the logged-in user, for owner-scoped requests
    pub fn owner_token(&self) -> Result<String> {
        self.read(|state| state.user_token.clone())
            .ok_or(NetmeraError::NotLoggedIn)
    }

    pub fn is_logged_in(&self) -> bool {
        self.read(|state| state.user_token.is_some())
    }

    /// Fail with the authorization error unless a user is logged in
    pub fn require_login(&self) -> Result<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(NetmeraError::NotLoggedIn)
        }
    }

    /// Token for a request, owner-scoped or not
    pub fn token_for(&self, owner_scoped: bool) -> Result<String> {
        if owner_scoped {
            self.owner_token()
        } else {
            Ok(self.token())
        }
    }

    /// Profile of the logged-in user, if any
    pub fn current_user(&self) -> Option<UserProfile> {
        self.read(|state| state.user.clone())
    }

    /// Install a logged-in user
    pub fn login(&self, user_token: Option<String>, profile: UserProfile) {
        self.write(|state| {
            if user_token.is_some() {
                state.user_token = user_token;
            }
            state.user = Some(profile);
        });
    }

    /// Forget the logged-in user; the application token stays
    pub fn logout(&self) {
        self.write(|state| {
            state.user_token = None;
            state.user = None;
        });
    }

    fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut SessionState)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmera_client::ErrorCode;

    #[test]
    fn test_owner_token_requires_login() {
        let session = Session::new("app-key");
        assert_eq!(session.token(), "app-key");
        assert!(!session.is_logged_in());

        let err = session.owner_token().unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserLoginError);
        assert!(err.is_local());
    }

    #[test]
    fn test_login_logout() {
        let session = Session::new("app-key");
        let profile = UserProfile {
            email: Some("ada@example.com".into()),
            ..Default::default()
        };
        session.login(Some("user-token".into()), profile.clone());

        assert_eq!(session.owner_token().unwrap(), "user-token");
        assert_eq!(session.token_for(true).unwrap(), "user-token");
        assert_eq!(session.token_for(false).unwrap(), "app-key");
        assert_eq!(session.current_user(), Some(profile));

        session.logout();
        assert!(session.current_user().is_none());
        assert!(session.owner_token().is_err());
        assert_eq!(session.token(), "app-key");
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::new("app-key");
        let other = session.clone();
        other.login(Some("t".into()), UserProfile::default());
        assert!(session.is_logged_in());
    }
}
