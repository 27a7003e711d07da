//! Session token storage
//!
//! The bearer token is the one piece of process-wide state. It is written at
//! login, read by the HTTP client on every authenticated request, and cleared
//! at logout. Nothing else touches the store.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::TOKEN_STORAGE_KEY;
use crate::error::{ClientError, ClientResult};

/// Persistent storage for the session token
pub trait TokenStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<String>>;
    fn save(&self, token: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// In-memory store, used by tests and short-lived tools
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        self.token
            .read()
            .map(|t| t.clone())
            .map_err(|e| ClientError::TokenStore(e.to_string()))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ClientError::TokenStore(e.to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ClientError::TokenStore(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// JSON file store keyed by [`TOKEN_STORAGE_KEY`]
///
/// Other keys in the file are preserved on save and clear.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> ClientResult<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(entries) => Ok(entries),
            _ => Err(ClientError::TokenStore(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_entries(&self, entries: Map<String, Value>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(&Value::Object(entries))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(entries)
    }

    fn clear(&self) -> ClientResult<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_STORAGE_KEY).is_some() {
            self.write_entries(entries)?;
        }
        Ok(())
    }
}

/// Single accessor for the bearer token
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Session backed by memory, already signed in with `token`
    pub fn in_memory(token: Option<&str>) -> Self {
        let store = match token {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::new(),
        };
        Self::new(Arc::new(store))
    }

    pub fn login(&self, token: &str) -> ClientResult<()> {
        if token.trim().is_empty() {
            return Err(ClientError::validation("Token must not be empty"));
        }
        self.store.save(token)?;
        tracing::info!("Session token stored");
        Ok(())
    }

    pub fn token(&self) -> ClientResult<Option<String>> {
        self.store.load()
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.store.clear()?;
        tracing::info!("Session token cleared");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}
