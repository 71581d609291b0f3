use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::{
    api::ApiClient,
    credential::{Credential, CredentialStore},
    error::SessionError,
};

/// Shared view of the current credential.
///
/// Cloning yields another handle to the same slot. Anyone holding a handle may
/// read it; only [`SessionController`] writes it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl Session {
    pub fn credential(&self) -> Option<Credential> {
        self.slot.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.slot.read().is_some()
    }

    fn activate(&self, credential: Credential) {
        *self.slot.write() = Some(credential);
    }

    fn deactivate(&self) {
        *self.slot.write() = None;
    }
}

/// Owns login, registration and logout, and is the only writer of [`Session`].
pub struct SessionController {
    api: ApiClient,
    store: Arc<dyn CredentialStore>,
    session: Session,
}

impl SessionController {
    /// Build a controller over `api`'s session, restoring a persisted credential.
    ///
    /// A restored credential is trusted as-is; an expired one only shows up when
    /// a later request is rejected.
    pub fn new(api: ApiClient, store: Arc<dyn CredentialStore>) -> Result<Self, SessionError> {
        let session = api.session().clone();

        if let Some(credential) = store.load().map_err(SessionError::Storage)? {
            info!("restored persisted session");
            session.activate(credential);
        }

        Ok(Self { api, store, session })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Credential, SessionError> {
        let credential = self
            .api
            .register(username, password)
            .await
            .map_err(SessionError::RegistrationFailed)?;

        self.activate(credential.clone())?;
        info!(username, "registered new account");
        Ok(credential)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, SessionError> {
        let credential = self
            .api
            .login(username, password)
            .await
            .map_err(SessionError::LoginFailed)?;

        self.activate(credential.clone())?;
        info!(username, "logged in");
        Ok(credential)
    }

    /// Drop the credential. Safe to call when already logged out.
    ///
    /// The in-memory session is cleared before storage is touched, so readers
    /// see the logged-out state even if removing the file fails.
    pub fn logout(&self) -> Result<(), SessionError> {
        let was_active = self.session.is_authenticated();
        self.session.deactivate();
        self.store.clear().map_err(SessionError::Storage)?;

        if was_active {
            info!("logged out");
        }
        Ok(())
    }

    fn activate(&self, credential: Credential) -> Result<(), SessionError> {
        self.store.save(&credential).map_err(SessionError::Storage)?;
        self.session.activate(credential);
        Ok(())
    }
}
