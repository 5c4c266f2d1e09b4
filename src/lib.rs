use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

// --- Declare modules ---
pub mod catalog;
mod config;
pub mod db;
pub mod manager;
mod sample;
pub mod schedule;
pub mod store;

// --- Expose public types ---
pub use catalog::{Error as CatalogError, Exercise, ExerciseCatalog, SqliteCatalog};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, Error as ConfigError, StandardColor, Theme,
};
pub use db::{get_db_path as get_db_path_util, Error as DbError};
pub use manager::{DayWatch, Error as ScheduleError, ScheduleManager};
pub use sample::{SampleItem, SAMPLE_PLAN};
pub use schedule::{Schedule, Weekday, WorkoutEntry, MAX_SETS};
pub use store::{Error as StoreError, KeyValueStore, MemoryStore, SqliteStore};

/// The application's composition root: configuration plus a schedule manager
/// wired to the SQLite preference store and exercise catalog.
pub struct AppService {
    pub config: Config,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub manager: ScheduleManager<SqliteStore, SqliteCatalog>,
}

impl AppService {
    /// Initializes the application service from the default locations.
    /// # Errors
    /// Returns `anyhow::Error` if path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let db_path = db::get_db_path().context("Failed to determine database path")?;
        Self::with_paths(config_path, db_path)
    }

    /// Initializes the application service against explicit files.
    /// # Errors
    /// Returns `anyhow::Error` if loading or initialization fails.
    pub fn with_paths(config_path: PathBuf, db_path: PathBuf) -> Result<Self> {
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open preference store at {db_path:?}"))?;
        let catalog = SqliteCatalog::open(&db_path)
            .with_context(|| format!("Failed to open exercise catalog at {db_path:?}"))?;

        let manager = ScheduleManager::new(store, catalog);
        manager
            .initialize()
            .context("Failed to initialize workout schedule")?;

        Ok(Self {
            config,
            config_path,
            db_path,
            manager,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Sets or clears the display nickname of a day.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn set_day_nickname(&mut self, day: Weekday, nickname: Option<&str>) -> Result<(), ConfigError> {
        self.config.set_nickname(day, nickname);
        self.save_config()
    }

    /// Sets the table header colour.
    /// # Errors
    /// - `ConfigError::InvalidColor` if the name is not a standard colour.
    /// - `ConfigError` variants if saving fails.
    pub fn set_header_color(&mut self, color: &str) -> Result<(), ConfigError> {
        let parsed = parse_color(color)?;
        self.config.theme.header_color = format!("{parsed:?}");
        self.save_config()
    }

    pub fn day_label(&self, day: Weekday) -> String {
        self.config.day_label(day)
    }

    /// Resolves user input to a day: `today`, a day name, a display label
    /// like `"Monday (leg day)"`, or a configured nickname.
    /// # Errors
    /// Returns `anyhow::Error` if nothing matches.
    pub fn parse_day(&self, input: &str) -> Result<Weekday> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("today") {
            return Ok(today());
        }
        if let Some(day) = Weekday::from_label(trimmed) {
            return Ok(day);
        }
        self.config
            .day_nicknames
            .iter()
            .find(|(_, nick)| nick.trim().eq_ignore_ascii_case(trimmed))
            .and_then(|(key, _)| Weekday::from_label(key))
            .with_context(|| format!("'{trimmed}' is not a weekday or day nickname"))
    }

    /// Fails while the first-launch choice between the sample week and an
    /// empty schedule is still pending. A schedule written before that choice
    /// would be discarded by the next restore.
    /// # Errors
    /// Returns `anyhow::Error` while the first-launch flag is set.
    pub fn require_schedule_decision(&self) -> Result<()> {
        if *self.manager.first_launch().borrow() {
            bail!("No schedule yet. Run 'sample' to start from the sample week, or 'sample --decline' to start empty.");
        }
        Ok(())
    }

    /// Looks up catalog exercises by name and appends them to `day`.
    /// Nothing is added if any name is unknown.
    /// # Errors
    /// Returns `anyhow::Error` if the first-launch choice is pending, a name is
    /// unknown or the schedule can't be saved.
    pub fn add_exercises_by_name(&self, day: Weekday, names: &[String]) -> Result<Vec<u64>> {
        self.require_schedule_decision()?;
        let mut exercises = Vec::with_capacity(names.len());
        for name in names {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                bail!("Exercise name cannot be empty.");
            }
            match self.manager.catalog().lookup_by_name(trimmed)? {
                Some(exercise) => exercises.push(exercise),
                None => bail!(
                    "Exercise '{trimmed}' not found in the catalog. Use 'search' to find its exact name."
                ),
            }
        }
        self.manager
            .add_workouts(day, exercises)
            .with_context(|| format!("Failed to add workouts to {day}"))
    }

    /// Finds an entry of `day` by id.
    /// # Errors
    /// Returns `anyhow::Error` if `day` has no entry with that id.
    pub fn entry_on_day(&self, day: Weekday, id: u64) -> Result<WorkoutEntry> {
        self.manager
            .snapshot()
            .day(day)
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .with_context(|| format!("No workout with ID {id} on {day}"))
    }

    /// Moves an entry of `day` to a zero-based position, clamped to the list end.
    /// # Errors
    /// Returns `anyhow::Error` if the first-launch choice is pending, the entry
    /// doesn't exist or saving fails.
    pub fn move_workout(&self, day: Weekday, id: u64, position: usize) -> Result<()> {
        self.require_schedule_decision()?;
        let mut entries = self.manager.snapshot().day(day).to_vec();
        let from = entries
            .iter()
            .position(|e| e.id == id)
            .with_context(|| format!("No workout with ID {id} on {day}"))?;
        let entry = entries.remove(from);
        let to = position.min(entries.len());
        entries.insert(to, entry);
        self.manager
            .reorder_workouts(day, entries)
            .context("Failed to reorder workouts")
    }

    /// Imports a free-exercise-db style JSON file into the catalog.
    /// # Errors
    /// Returns `anyhow::Error` if the file can't be read or parsed.
    pub fn import_catalog(&self, path: &Path) -> Result<usize> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read exercise dataset {path:?}"))?;
        self.manager
            .catalog()
            .import_json(&json)
            .with_context(|| format!("Failed to import exercise dataset {path:?}"))
    }
}

/// Today's weekday in local time.
pub fn today() -> Weekday {
    use chrono::Datelike;
    chrono::Local::now().weekday().into()
}
