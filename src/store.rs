//src/store.rs
use crate::db;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Preference store database error: {0}")]
    Db(#[from] db::Error),
    #[error("Stored value for '{key}' is not a boolean: {value}")]
    InvalidBool { key: String, value: String },
}

/// Minimal key-value persistence, modelled on a platform preference store.
pub trait KeyValueStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, Error>;

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), Error>;

    fn get_bool(&self, key: &str) -> Result<Option<bool>, Error> {
        match self.get_string(key)? {
            None => Ok(None),
            Some(value) => match value.as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(Error::InvalidBool {
                    key: key.to_string(),
                    value,
                }),
            },
        }
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), Error> {
        self.put_string(key, if value { "true" } else { "false" })
    }
}

/// Store backed by the `preferences` table of the application database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wraps a connection, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self, Error> {
        db::init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn open(path: &Path) -> Result<Self, Error> {
        Self::new(db::open_db(path)?)
    }
}

impl KeyValueStore for SqliteStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(db::get_preference(&self.conn, key)?)
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        Ok(db::set_preference(&self.conn, key, value)?)
    }
}

/// In-process store. Clones share the same map, so a clone handed to a fresh
/// manager sees everything written through the original.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, Error> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
