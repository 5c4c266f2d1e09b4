//src/schedule.rs
use crate::catalog::Exercise;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::warn;

/// Separator between a day name and its nickname in display labels.
const NICKNAME_SEPARATOR: &str = " (";

/// Upper bound for the set count of one entry.
pub const MAX_SETS: u32 = 100;

/// One of the seven fixed day keys of the schedule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Resolves a display label such as `"Monday (leg day)"` to its day key.
    /// Anything from the first `" ("` onwards is ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let key = label
            .split_once(NICKNAME_SEPARATOR)
            .map_or(label, |(day, _)| day);
        Self::from_str(key.trim()).ok()
    }

    /// Display label with an optional nickname suffix.
    pub fn label(self, nickname: Option<&str>) -> String {
        match nickname.map(str::trim).filter(|n| !n.is_empty()) {
            Some(nick) => format!("{self}{NICKNAME_SEPARATOR}{nick})"),
            None => self.to_string(),
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// A scheduled exercise occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    pub id: u64,
    /// Copied in when the entry is created; later catalog changes don't touch it.
    pub exercise: Exercise,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<Vec<u32>>,
    #[serde(default)]
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub is_done: bool,
}

impl WorkoutEntry {
    pub const fn new(id: u64, exercise: Exercise) -> Self {
        Self {
            id,
            exercise,
            sets: None,
            reps: None,
            duration_secs: None,
            is_done: false,
        }
    }

    /// Sets the set count and resizes the per-set reps to match.
    /// Existing counts are kept; new sets repeat the last count (or 0).
    /// Counts above [`MAX_SETS`] are clamped.
    #[must_use]
    pub fn with_sets(mut self, sets: u32) -> Self {
        let sets = sets.min(MAX_SETS);
        let mut reps = self.reps.take().unwrap_or_default();
        let fill = reps.last().copied().unwrap_or(0);
        reps.resize(sets as usize, fill);
        self.sets = Some(sets);
        self.reps = Some(reps);
        self
    }

    /// True when both sets and reps are present and disagree in length.
    pub fn reps_mismatch(&self) -> bool {
        match (self.sets, &self.reps) {
            (Some(sets), Some(reps)) => reps.len() != sets as usize,
            _ => false,
        }
    }
}

/// The weekly plan. Always holds all seven days, rest days as empty lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    days: BTreeMap<Weekday, Vec<WorkoutEntry>>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::empty()
    }
}

impl Schedule {
    pub fn empty() -> Self {
        Self {
            days: Weekday::iter().map(|day| (day, Vec::new())).collect(),
        }
    }

    pub fn day(&self, day: Weekday) -> &[WorkoutEntry] {
        self.days.get(&day).map_or(&[], Vec::as_slice)
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut Vec<WorkoutEntry> {
        self.days.entry(day).or_default()
    }

    /// Iterates over every day in Monday-first order.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &[WorkoutEntry])> {
        self.days.iter().map(|(day, entries)| (*day, entries.as_slice()))
    }

    pub fn entries(&self) -> impl Iterator<Item = &WorkoutEntry> {
        self.days.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_id(&self) -> Option<u64> {
        self.entries().map(|e| e.id).max()
    }

    /// Finds an entry by id across all days.
    pub fn find(&self, id: u64) -> Option<(Weekday, &WorkoutEntry)> {
        self.days
            .iter()
            .find_map(|(day, entries)| entries.iter().find(|e| e.id == id).map(|e| (*day, e)))
    }

    pub(crate) fn find_mut(&mut self, id: u64) -> Option<&mut WorkoutEntry> {
        self.days.values_mut().flatten().find(|e| e.id == id)
    }

    /// Serializes the whole schedule into the persisted JSON blob.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.days)
    }

    /// Parses a persisted blob.
    ///
    /// Day keys are normalized with [`Weekday::from_label`]; lists under labels
    /// that resolve to the same day are appended in key order. Unknown
    /// keys are skipped and missing days come back empty.
    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, Vec<WorkoutEntry>> = serde_json::from_str(blob)?;

        let mut schedule = Self::empty();
        for (label, entries) in raw {
            match Weekday::from_label(&label) {
                Some(day) => schedule.day_mut(day).extend(entries),
                None => warn!(label = %label, "Skipping unknown day key in stored schedule"),
            }
        }
        Ok(schedule)
    }
}
