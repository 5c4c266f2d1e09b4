//src/db.rs
use crate::catalog::Exercise;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DB_FILE_NAME: &str = "schedule.sqlite";
const APP_DATA_DIR: &str = "workout-schedule"; // Same dir name as config for consistency

// Custom Error type for DB operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Failed to encode list column (JSON): {0}")]
    Encode(#[from] serde_json::Error),
}

/// Determines the path to the database file, creating the data directory if needed.
pub fn get_db_path() -> Result<PathBuf, Error> {
    let data_dir = dirs::data_dir().ok_or(Error::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::Connection)
}

/// Creates the tables used by the preference store and the exercise catalog.
pub fn init_db(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(Error::Connection)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE, -- Ensure name uniqueness (case-insensitive)
            category TEXT NOT NULL DEFAULT '',
            level TEXT NOT NULL DEFAULT '',
            equipment TEXT,
            primary_muscles TEXT NOT NULL DEFAULT '[]',   -- JSON array
            secondary_muscles TEXT NOT NULL DEFAULT '[]', -- JSON array
            instructions TEXT NOT NULL DEFAULT '[]'       -- JSON array, one step each
        )",
        [],
    )
    .map_err(Error::Connection)?;

    Ok(())
}

// --- Preferences ---

pub fn get_preference(conn: &Connection, key: &str) -> Result<Option<String>, Error> {
    conn.query_row(
        "SELECT value FROM preferences WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(Error::QueryFailed)
}

pub fn set_preference(conn: &Connection, key: &str, value: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO preferences (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(Error::InsertFailed)?;
    Ok(())
}

// --- Exercises ---

// List columns hold JSON arrays of strings.
fn get_list(row: &Row, idx: usize) -> Result<Vec<String>, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_row_to_exercise(row: &Row) -> Result<Exercise, rusqlite::Error> {
    Ok(Exercise {
        name: row.get(0)?,
        category: row.get(1)?,
        level: row.get(2)?,
        equipment: row.get(3)?,
        primary_muscles: get_list(row, 4)?,
        secondary_muscles: get_list(row, 5)?,
        instructions: get_list(row, 6)?,
    })
}

const EXERCISE_COLUMNS: &str =
    "name, category, level, equipment, primary_muscles, secondary_muscles, instructions";

pub fn count_exercises(conn: &Connection) -> Result<usize, Error> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))
        .map_err(Error::QueryFailed)?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Inserts exercises in one transaction, replacing rows with the same name.
/// Returns the number of rows written.
pub fn upsert_exercises(conn: &mut Connection, exercises: &[Exercise]) -> Result<usize, Error> {
    let tx = conn.transaction().map_err(Error::Connection)?;
    let mut written = 0;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO exercises ({EXERCISE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(name) DO UPDATE SET
                    category = excluded.category,
                    level = excluded.level,
                    equipment = excluded.equipment,
                    primary_muscles = excluded.primary_muscles,
                    secondary_muscles = excluded.secondary_muscles,
                    instructions = excluded.instructions"
            ))
            .map_err(Error::QueryFailed)?;
        for exercise in exercises {
            written += stmt
                .execute(params![
                    exercise.name.trim(),
                    exercise.category,
                    exercise.level,
                    exercise.equipment,
                    serde_json::to_string(&exercise.primary_muscles)?,
                    serde_json::to_string(&exercise.secondary_muscles)?,
                    serde_json::to_string(&exercise.instructions)?,
                ])
                .map_err(Error::InsertFailed)?;
        }
    }
    tx.commit().map_err(Error::Connection)?;
    Ok(written)
}

/// Retrieves an exercise by its name (case-insensitive).
pub fn get_exercise_by_name(conn: &Connection, name: &str) -> Result<Option<Exercise>, Error> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE name = ?1 COLLATE NOCASE"
        ))
        .map_err(Error::QueryFailed)?;
    stmt.query_row(params![name.trim()], map_row_to_exercise)
        .optional()
        .map_err(Error::QueryFailed)
}

// Escapes LIKE wildcards so user input only ever matches literally.
fn like_pattern(fragment: &str, suffix_only: bool) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    if suffix_only {
        format!("{escaped}%")
    } else {
        format!("%{escaped}%")
    }
}

/// Keyword search: every whitespace-separated token must appear in the name,
/// category, equipment or muscle columns. Name-prefix matches sort first.
pub fn search_exercises(conn: &Connection, query: &str) -> Result<Vec<Exercise>, Error> {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE 1=1");
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    for token in &tokens {
        let n = params_vec.len() + 1;
        sql.push_str(&format!(
            " AND (name LIKE ?{n} ESCAPE '\\' OR category LIKE ?{n} ESCAPE '\\' \
             OR IFNULL(equipment, '') LIKE ?{n} ESCAPE '\\' \
             OR primary_muscles LIKE ?{n} ESCAPE '\\' OR secondary_muscles LIKE ?{n} ESCAPE '\\')"
        ));
        params_vec.push(Box::new(like_pattern(token, false)));
    }

    let prefix_param = params_vec.len() + 1;
    sql.push_str(&format!(
        " ORDER BY CASE WHEN name LIKE ?{prefix_param} ESCAPE '\\' THEN 0 ELSE 1 END, name ASC"
    ));
    params_vec.push(Box::new(like_pattern(&tokens.join(" "), true)));

    let params_slice: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();

    let mut stmt = conn.prepare(&sql).map_err(Error::QueryFailed)?;
    let exercise_iter = stmt
        .query_map(params_slice.as_slice(), map_row_to_exercise)
        .map_err(Error::QueryFailed)?;

    exercise_iter
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::QueryFailed)
}
