//src/catalog.rs
use crate::db;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Reference dataset shipped with the binary, loaded on first run.
const BUNDLED_DATASET: &str = include_str!("../data/exercises.json");

#[derive(Error, Debug)]
pub enum Error {
    #[error("Exercise catalog database error: {0}")]
    Db(#[from] db::Error),
    #[error("Failed to parse exercise dataset (JSON): {0}")]
    Dataset(#[from] serde_json::Error),
}

/// Catalog metadata for one exercise. Field names follow the
/// free-exercise-db JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Read-only exercise reference data.
pub trait ExerciseCatalog {
    /// Case-insensitive lookup by exact name.
    fn lookup_by_name(&self, name: &str) -> Result<Option<Exercise>, Error>;

    /// Keyword search. A blank query returns nothing.
    fn search(&self, query: &str) -> Result<Vec<Exercise>, Error>;

    /// Called once while the schedule manager initializes.
    fn prepare(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Catalog stored in the `exercises` table of the application database.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Wraps a connection, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self, Error> {
        db::init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &Path) -> Result<Self, Error> {
        Self::new(db::open_db(path)?)
    }

    pub fn len(&self) -> Result<usize, Error> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(db::count_exercises(&conn)?)
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Imports a JSON array of exercises, replacing rows with the same name.
    /// Returns the number of exercises written.
    pub fn import_json(&self, json: &str) -> Result<usize, Error> {
        let exercises: Vec<Exercise> = serde_json::from_str(json)?;
        let exercises: Vec<Exercise> = exercises
            .into_iter()
            .filter(|e| !e.name.trim().is_empty())
            .collect();
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(db::upsert_exercises(&mut conn, &exercises)?)
    }

    /// Loads the bundled dataset when the table is empty.
    /// Returns the number of exercises imported (0 if already populated).
    pub fn seed_if_empty(&self) -> Result<usize, Error> {
        if !self.is_empty()? {
            debug!("Exercise catalog already populated");
            return Ok(0);
        }
        let imported = self.import_json(BUNDLED_DATASET)?;
        info!(imported, "Seeded exercise catalog from bundled dataset");
        Ok(imported)
    }
}

impl ExerciseCatalog for SqliteCatalog {
    fn lookup_by_name(&self, name: &str) -> Result<Option<Exercise>, Error> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(db::get_exercise_by_name(&conn, name)?)
    }

    fn search(&self, query: &str) -> Result<Vec<Exercise>, Error> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(db::search_exercises(&conn, query)?)
    }

    fn prepare(&self) -> Result<(), Error> {
        self.seed_if_empty().map(|_| ())
    }
}
