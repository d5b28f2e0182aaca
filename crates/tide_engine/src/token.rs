use std::fs;
use std::path::PathBuf;
use std::sync::{mpsc, Mutex, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tide_logging::{tide_debug, tide_error, tide_info, tide_warn};

use crate::persist::{AtomicFileWriter, PersistError};

pub const TOKEN_FILENAME: &str = "device_token.ron";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to encode token cache: {0}")]
    Encode(#[from] ron::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedToken {
    token: String,
    updated_utc: String,
}

/// On-disk cache of the last device token, so a new session can start
/// with it before the push subsystem re-delivers one.
#[derive(Debug, Clone)]
pub struct TokenStore {
    writer: AtomicFileWriter,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(TOKEN_FILENAME)
    }

    /// Missing or unreadable caches read as "no token".
    pub fn load(&self) -> Option<String> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tide_warn!("Failed to read token cache from {:?}: {}", path, err);
                return None;
            }
        };
        match ron::from_str::<CachedToken>(&content) {
            Ok(cached) if !cached.token.is_empty() => {
                tide_debug!("Loaded cached token from {:?} ({})", path, cached.updated_utc);
                Some(cached.token)
            }
            Ok(_) => None,
            Err(err) => {
                tide_warn!("Failed to parse token cache {:?}: {}", path, err);
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> Result<PathBuf, TokenStoreError> {
        let cached = CachedToken {
            token: token.to_string(),
            updated_utc: Utc::now().to_rfc3339(),
        };
        let content = ron::ser::to_string_pretty(&cached, ron::ser::PrettyConfig::new())?;
        Ok(self.writer.write(TOKEN_FILENAME, content.as_bytes())?)
    }
}

/// Receives device tokens from the push subsystem, caches the latest one
/// and fans it out to subscribers.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    store: Option<TokenStore>,
    cached: Mutex<Option<String>>,
    subscribers: Mutex<Vec<mpsc::Sender<String>>>,
}

impl TokenRegistry {
    pub fn new(store: TokenStore) -> Self {
        let cached = store.load();
        Self {
            store: Some(store),
            cached: Mutex::new(cached),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// A registry that forgets its token when dropped.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<String> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tokens received after this call; the cached one is not replayed.
    pub fn subscribe(&self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn receive(&self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            tide_debug!("Ignoring empty device token");
            return;
        }
        tide_info!("Device token received (len={})", token.len());

        if let Some(store) = &self.store {
            if let Err(err) = store.save(&token) {
                tide_error!("Failed to persist device token to {:?}: {}", store.path(), err);
            }
        }
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());

        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(token.clone()).is_ok());
    }
}
