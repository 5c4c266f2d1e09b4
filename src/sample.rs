//src/sample.rs
use crate::catalog::Exercise;
use crate::schedule::{Weekday, WorkoutEntry};

/// One curated line of the first-launch sample schedule.
#[derive(Debug, Clone, Copy)]
pub struct SampleItem {
    pub name: &'static str,
    pub sets: Option<u32>,
    pub reps: u32,
    pub duration_secs: Option<u32>,
}

impl SampleItem {
    const fn strength(name: &'static str, sets: u32, reps: u32) -> Self {
        Self {
            name,
            sets: Some(sets),
            reps,
            duration_secs: None,
        }
    }

    const fn timed(name: &'static str, duration_secs: u32) -> Self {
        Self {
            name,
            sets: None,
            reps: 0,
            duration_secs: Some(duration_secs),
        }
    }

    pub fn to_entry(self, id: u64, exercise: Exercise) -> WorkoutEntry {
        let mut entry = WorkoutEntry::new(id, exercise);
        if let Some(sets) = self.sets {
            entry.sets = Some(sets);
            entry.reps = Some(vec![self.reps; sets as usize]);
        }
        entry.duration_secs = self.duration_secs;
        entry
    }
}

/// Two catalog exercises per day. Names must match the bundled dataset.
pub const SAMPLE_PLAN: &[(Weekday, &[SampleItem])] = &[
    (
        Weekday::Monday,
        &[
            SampleItem::strength("Barbell Squat", 4, 8),
            SampleItem::strength("Romanian Deadlift", 3, 10),
        ],
    ),
    (
        Weekday::Tuesday,
        &[
            SampleItem::strength("Barbell Bench Press - Medium Grip", 4, 8),
            SampleItem::strength("Pushups", 3, 15),
        ],
    ),
    (
        Weekday::Wednesday,
        &[
            SampleItem::timed("Running, Treadmill", 1200),
            SampleItem::timed("Plank", 60),
        ],
    ),
    (
        Weekday::Thursday,
        &[
            SampleItem::strength("Pullups", 3, 8),
            SampleItem::strength("Bent Over Barbell Row", 4, 10),
        ],
    ),
    (
        Weekday::Friday,
        &[
            SampleItem::strength("Standing Military Press", 4, 8),
            SampleItem::strength("Side Lateral Raise", 3, 12),
        ],
    ),
    (
        Weekday::Saturday,
        &[
            SampleItem::strength("Barbell Curl", 3, 10),
            SampleItem::strength("Dips - Triceps Version", 3, 10),
        ],
    ),
    (
        Weekday::Sunday,
        &[
            SampleItem::timed("Walking, Treadmill", 1800),
            SampleItem::timed("Cat Stretch", 300),
        ],
    ),
];
