//! API key authorization
//!
//! The key list is fetched from its source on every check. There is no
//! cache: a key added to or removed from the file is honoured by the very
//! next request.

use crate::gateway::KeyStoreError;
use crate::logger;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

pub type KeysFuture = Pin<Box<dyn Future<Output = Result<Vec<String>, KeyStoreError>> + Send>>;

/// Where the authorized key list lives
pub trait KeySource: Send + Sync {
    fn fetch(&self) -> KeysFuture;
}

/// JSON array of strings on disk
#[derive(Debug, Clone)]
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeySource for FileKeySource {
    fn fetch(&self) -> KeysFuture {
        let path = self.path.clone();
        Box::pin(async move {
            let raw = tokio::fs::read(&path)
                .await
                .map_err(|source| KeyStoreError::Io {
                    path: path.clone(),
                    source,
                })?;
            serde_json::from_slice(&raw).map_err(|source| KeyStoreError::Parse { path, source })
        })
    }
}

pub struct KeyStore {
    source: Box<dyn KeySource>,
}

impl KeyStore {
    pub fn new(source: impl KeySource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Exact match against the current key list; unreadable lists fail closed
    pub async fn is_authorized(&self, candidate: Option<&str>) -> bool {
        let Some(candidate) = candidate.filter(|k| !k.is_empty()) else {
            return false;
        };

        match self.source.fetch().await {
            Ok(keys) => keys.iter().any(|k| k == candidate),
            Err(e) => {
                logger::log_warning(&format!("Key list unavailable, rejecting request: {e}"));
                false
            }
        }
    }
}
