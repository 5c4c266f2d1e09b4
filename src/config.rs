//src/config.rs
use crate::schedule::Weekday;
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;
use tracing::warn;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "workout-schedule";
const CONFIG_ENV_VAR: &str = "WORKOUT_SCHEDULE_CONFIG_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
}

// Define standard colors using strum for easy iteration/parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
}

// Helper to convert our enum to comfy_table::Color
impl From<StandardColor> for Color {
    fn from(value: StandardColor) -> Self {
        match value {
            StandardColor::Black => Self::Black,
            StandardColor::Red => Self::Red,
            StandardColor::Green => Self::Green,
            StandardColor::Yellow => Self::Yellow,
            StandardColor::Blue => Self::Blue,
            StandardColor::Magenta => Self::Magenta,
            StandardColor::Cyan => Self::Cyan,
            StandardColor::White => Self::White,
            StandardColor::DarkGrey => Self::DarkGrey,
            StandardColor::DarkRed => Self::DarkRed,
            StandardColor::DarkGreen => Self::DarkGreen,
            StandardColor::DarkYellow => Self::DarkYellow,
            StandardColor::DarkBlue => Self::DarkBlue,
            StandardColor::DarkMagenta => Self::DarkMagenta,
            StandardColor::DarkCyan => Self::DarkCyan,
            StandardColor::Grey => Self::Grey,
        }
    }
}

/// Parses a colour name case-insensitively.
/// # Errors
/// Returns `Error::InvalidColor` if no standard colour matches.
pub fn parse_color(color_str: &str) -> Result<StandardColor, Error> {
    StandardColor::iter()
        .find(|color| format!("{color:?}").eq_ignore_ascii_case(color_str))
        .ok_or_else(|| Error::InvalidColor(color_str.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Theme {
    pub header_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_color: "Green".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    pub theme: Theme,
    /// Display nicknames keyed by day name, e.g. `Monday = "leg day"`.
    pub day_nicknames: BTreeMap<String, String>,
}

impl Config {
    /// Nickname for `day`. Keys written by hand are matched case-insensitively.
    pub fn nickname(&self, day: Weekday) -> Option<&str> {
        self.day_nicknames
            .iter()
            .find(|(key, _)| Weekday::from_label(key) == Some(day))
            .map(|(_, nick)| nick.as_str())
            .filter(|nick| !nick.trim().is_empty())
    }

    /// Sets or clears (`None` or blank) the nickname for `day`.
    pub fn set_nickname(&mut self, day: Weekday, nickname: Option<&str>) {
        self.day_nicknames
            .retain(|key, _| Weekday::from_label(key) != Some(day));
        if let Some(nick) = nickname.map(str::trim).filter(|n| !n.is_empty()) {
            self.day_nicknames.insert(day.to_string(), nick.to_string());
        }
    }

    /// Display label for `day`, e.g. `"Monday (leg day)"`.
    pub fn day_label(&self, day: Weekday) -> String {
        day.label(self.nickname(day))
    }

    /// Header colour for tables. Falls back to the default theme colour on a bad name.
    pub fn header_color(&self) -> Color {
        parse_color(&self.theme.header_color).map_or(Color::Green, Color::from)
    }
}

/// Determines the path to the configuration file.
/// # Errors
/// Returns `Error` if the directory can't be determined or created.
pub fn get_config_path() -> Result<PathBuf, Error> {
    let config_dir_override = std::env::var(CONFIG_ENV_VAR).ok();

    let config_dir_path = match config_dir_override {
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if !path.is_dir() {
                warn!(
                    var = CONFIG_ENV_VAR,
                    path = %path.display(),
                    "Config directory override is not a directory, trying to create it"
                );
                fs::create_dir_all(&path)?;
            }
            path
        }
        None => {
            let base_config_dir = dirs::config_dir().ok_or(Error::CannotDetermineConfigDir)?;
            base_config_dir.join(APP_CONFIG_DIR)
        }
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration, writing defaults if the file doesn't exist yet.
/// # Errors
/// Returns `Error` on I/O or TOML failures.
pub fn load(config_path: &Path) -> Result<Config, Error> {
    if !config_path.exists() {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        return Ok(default_config);
    }
    let config_content = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&config_content)?;
    if parse_color(&config.theme.header_color).is_err() {
        warn!(color = %config.theme.header_color, "Unknown header colour in config, using default");
    }
    Ok(config)
}

/// Saves the configuration to the TOML file.
/// # Errors
/// Returns `Error` on I/O or TOML failures.
pub fn save(config_path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config)?;
    fs::write(config_path, config_content)?;
    Ok(())
}
