//! Reloadable store handle
//!
//! Readers take a snapshot `Arc` and work against it; a reload builds a new
//! store off to the side and swaps it in, so nobody observes a half-loaded
//! table.

use super::store::CredentialsStore;
use crate::error::LoadError;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to the active store. `None` means auth is disabled.
#[derive(Debug, Clone, Default)]
pub struct SharedCredentials {
    inner: Arc<RwLock<Option<Arc<CredentialsStore>>>>,
}

impl SharedCredentials {
    pub fn new(store: Option<CredentialsStore>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store.map(Arc::new))),
        }
    }

    /// Handle with authorization turned off.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// The store currently in effect.
    pub async fn snapshot(&self) -> Option<Arc<CredentialsStore>> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, store: Option<CredentialsStore>) {
        *self.inner.write().await = store.map(Arc::new);
    }

    /// Loads `path` into a fresh store and installs it. On failure the
    /// previous store stays in place.
    pub async fn reload_from_file(&self, path: &Path, use_cache: bool) -> Result<(), LoadError> {
        let contents = match tokio::fs::read(path).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Reload of {} failed: {}", path.display(), e);
                return Err(e.into());
            }
        };

        let mut store = match CredentialsStore::from_reader(contents.as_slice()) {
            Ok(store) => store,
            Err(e) => {
                warn!("Reload of {} failed: {}", path.display(), e);
                return Err(e);
            }
        };
        store.set_use_cache(use_cache);

        info!(
            "Reloaded {} credential(s) from {}",
            store.len(),
            path.display()
        );
        self.replace(Some(store)).await;
        Ok(())
    }
}
