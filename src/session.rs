//! Session lifecycle
//!
//! The upstream service issues an opaque session cookie on login. There
//! is no dedicated whoami endpoint; `GET /dogs/breeds` doubles as the
//! probe (401 means the session is gone). The authenticated flag here is
//! what a frontend's top-level guard would consult.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::CatalogApi;
use crate::error::ApiError;

pub struct SessionManager {
    api: Arc<dyn CatalogApi>,
    authenticated: AtomicBool,
}

impl SessionManager {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            authenticated: AtomicBool::new(false),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Called when any authenticated call answers 401, so the top level
    /// re-runs its session check instead of showing a generic error.
    pub fn mark_unauthenticated(&self) {
        if self.authenticated.swap(false, Ordering::SeqCst) {
            log::warn!("Session expired, marking unauthenticated");
        }
    }

    pub async fn login(&self, name: &str, email: &str) -> Result<(), ApiError> {
        self.api.login(name, email).await?;
        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Favorites and search state survive logout in-memory; only the
    /// session cookie and the flag are dropped.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.api.logout().await?;
        self.authenticated.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Probe the session once. A 401 is a normal `false`, not an error;
    /// anything else non-transport-related means the session holds.
    pub async fn verify(&self) -> Result<bool, ApiError> {
        match self.api.list_breeds().await {
            Ok(_) => {
                self.authenticated.store(true, Ordering::SeqCst);
                Ok(true)
            }
            Err(ApiError::AuthRequired) => {
                self.authenticated.store(false, Ordering::SeqCst);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
