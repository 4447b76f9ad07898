//! Durable session identity.
//!
//! The session identifier is created once per user profile and stored in a
//! small key/value store so it survives restarts.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use grokchat_core::{IdGenerator, SessionId};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Persistent string key/value storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&mut self, key: &str) -> Result<(), ClientError>;
}

/// Key/value store backed by a JSON object file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Map<String, Value>, ClientError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(ClientError::InvalidStore(self.path.display().to_string())),
        }
    }

    /// Like `load`, but an unparseable file counts as empty so the next save
    /// replaces it.
    fn load_or_repair(&self) -> Result<Map<String, Value>, ClientError> {
        match self.load() {
            Err(e @ (ClientError::Serialization(_) | ClientError::InvalidStore(_))) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Store file is corrupt, replacing it"
                );
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self
            .load()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut map = self.load_or_repair()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        let mut map = self.load_or_repair()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

/// In-memory store, for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Obtains or creates the persisted session identifier.
pub struct IdentityStore {
    store: Box<dyn KeyValueStore>,
    key: String,
    generator: IdGenerator,
}

impl IdentityStore {
    pub fn new(store: impl KeyValueStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
            generator: IdGenerator::default(),
        }
    }

    /// Open the file store named by the configuration.
    pub fn open(config: &ClientConfig) -> Self {
        Self::new(
            FileStore::new(config.storage_path.clone()),
            config.storage_key.clone(),
        )
    }

    /// Replace the identifier generation policy.
    pub fn with_generator(mut self, generator: IdGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Return the stored session id, creating and persisting one if absent.
    ///
    /// Never fails: an unreadable store counts as empty, and a failed write
    /// still returns the new identifier.
    pub fn get_or_create_session_id(&mut self) -> SessionId {
        match self.store.get(&self.key) {
            Ok(Some(stored)) if !stored.is_empty() => {
                debug!(key = %self.key, "Reusing stored session id");
                return SessionId::new(stored);
            }
            Ok(_) => {}
            Err(e) => warn!(key = %self.key, error = %e, "Failed to read session store"),
        }

        let id = self.generator.generate();
        match self.store.set(&self.key, id.as_str()) {
            Ok(()) => info!(session_id = %id, "Created new session id"),
            Err(e) => warn!(error = %e, "Failed to persist session id"),
        }
        id
    }

    /// Forget the stored identifier; the next lookup creates a fresh one.
    pub fn reset(&mut self) -> Result<(), ClientError> {
        info!(key = %self.key, "Clearing stored session id");
        self.store.remove(&self.key)
    }
}
