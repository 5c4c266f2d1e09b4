//src/manager.rs
use crate::catalog::{self, Exercise, ExerciseCatalog};
use crate::sample::SAMPLE_PLAN;
use crate::schedule::{Schedule, Weekday, WorkoutEntry};
use crate::store::{self, KeyValueStore};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Store key of the serialized schedule.
pub const SCHEDULE_KEY: &str = "workout_schedule";
/// Store key of the first-launch flag.
pub const FIRST_LAUNCH_KEY: &str = "first_launch";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to persist schedule: {0}")]
    Store(#[from] store::Error),
    #[error(transparent)]
    Catalog(#[from] catalog::Error),
    #[error("Failed to encode schedule: {0}")]
    Encode(#[from] serde_json::Error),
}

struct State<S> {
    store: S,
    schedule: Schedule,
    next_id: u64,
}

impl<S: KeyValueStore> State<S> {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn persist(&mut self) -> Result<(), Error> {
        let blob = self.schedule.to_blob()?;
        self.store.put_string(SCHEDULE_KEY, &blob)?;
        Ok(())
    }

    // Missing, corrupt or unreadable blobs all come back as an empty schedule.
    fn restore(&self) -> Schedule {
        match self.store.get_string(SCHEDULE_KEY) {
            Ok(Some(blob)) => Schedule::from_blob(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "Stored schedule is unreadable, starting empty");
                Schedule::empty()
            }),
            Ok(None) => {
                debug!("No stored schedule, starting empty");
                Schedule::empty()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored schedule, starting empty");
                Schedule::empty()
            }
        }
    }

    fn first_launch(&self) -> Result<bool, Error> {
        match self.store.get_bool(FIRST_LAUNCH_KEY) {
            Ok(flag) => Ok(flag.unwrap_or(true)),
            Err(e @ store::Error::InvalidBool { .. }) => {
                warn!(error = %e, "Treating unreadable first-launch flag as set");
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Owns the weekly schedule.
///
/// Every mutation runs under one lock: the schedule is changed, the new
/// snapshot is published to subscribers and the whole schedule is written to
/// the store before the lock is released, so stored blobs follow mutation order.
///
/// Lookups that miss (unknown id, entry not present) leave the schedule
/// untouched and write nothing.
pub struct ScheduleManager<S, C> {
    state: Mutex<State<S>>,
    catalog: C,
    schedule_tx: watch::Sender<Schedule>,
    loading_tx: watch::Sender<bool>,
    first_launch_tx: watch::Sender<bool>,
}

impl<S: KeyValueStore, C: ExerciseCatalog> ScheduleManager<S, C> {
    /// Builds a manager with an empty schedule. Call [`Self::initialize`] before use.
    pub fn new(store: S, catalog: C) -> Self {
        let (schedule_tx, _) = watch::channel(Schedule::empty());
        let (loading_tx, _) = watch::channel(false);
        let (first_launch_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(State {
                store,
                schedule: Schedule::empty(),
                next_id: 1,
            }),
            catalog,
            schedule_tx,
            loading_tx,
            first_launch_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Publishes first so observers always match the in-memory schedule, even
    // if the write fails.
    fn commit(&self, state: &mut State<S>) -> Result<(), Error> {
        self.schedule_tx.send_replace(state.schedule.clone());
        state.persist()
    }

    fn mutate<F>(&self, operation: &str, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut State<S>) -> bool,
    {
        let mut state = self.lock();
        if !f(&mut state) {
            debug!(operation, "Nothing matched, schedule unchanged");
            return Ok(());
        }
        self.commit(&mut state)
    }

    /// Prepares the catalog and restores the schedule.
    ///
    /// On first launch the schedule stays empty until [`Self::generate_sample`]
    /// or [`Self::decline_sample`] is called. Otherwise the stored schedule is
    /// loaded; an absent or unreadable one yields an empty schedule.
    ///
    /// # Errors
    /// Returns `Error` only when the catalog cannot be prepared or the store
    /// cannot be queried for the first-launch flag.
    pub fn initialize(&self) -> Result<(), Error> {
        self.loading_tx.send_replace(true);
        let result = self.load();
        self.loading_tx.send_replace(false);
        result
    }

    fn load(&self) -> Result<(), Error> {
        self.catalog.prepare()?;

        let mut state = self.lock();
        let first_launch = state.first_launch()?;
        let schedule = if first_launch {
            debug!("First launch, waiting for sample schedule decision");
            Schedule::empty()
        } else {
            state.restore()
        };

        let seed = schedule.max_id().map_or(1, |max| max + 1);
        state.next_id = state.next_id.max(seed);
        state.schedule = schedule;
        debug!(
            entries = state.schedule.len(),
            next_id = state.next_id,
            "Schedule loaded"
        );

        self.first_launch_tx.send_replace(first_launch);
        self.schedule_tx.send_replace(state.schedule.clone());
        Ok(())
    }

    /// Replaces the schedule with the curated sample plan and clears the
    /// first-launch flag. Sample exercises missing from the catalog are skipped.
    ///
    /// # Errors
    /// Returns `Error` if a catalog lookup or the store write fails.
    pub fn generate_sample(&self) -> Result<(), Error> {
        let mut state = self.lock();
        let mut schedule = Schedule::empty();
        for (day, items) in SAMPLE_PLAN {
            for item in *items {
                match self.catalog.lookup_by_name(item.name)? {
                    Some(exercise) => {
                        let id = state.allocate_id();
                        schedule.day_mut(*day).push(item.to_entry(id, exercise));
                    }
                    None => debug!(exercise = item.name, %day, "Sample exercise not in catalog, skipping"),
                }
            }
        }
        state.schedule = schedule;
        self.commit(&mut state)?;
        state.store.put_bool(FIRST_LAUNCH_KEY, false)?;
        self.first_launch_tx.send_replace(false);
        info!(entries = state.schedule.len(), "Generated sample schedule");
        Ok(())
    }

    /// Clears the first-launch flag without touching the schedule.
    ///
    /// # Errors
    /// Returns `Error` if the store write fails.
    pub fn decline_sample(&self) -> Result<(), Error> {
        let mut state = self.lock();
        state.store.put_bool(FIRST_LAUNCH_KEY, false)?;
        self.first_launch_tx.send_replace(false);
        debug!("Sample schedule declined");
        Ok(())
    }

    /// Live view of one day's entries.
    pub fn workouts_for_day(&self, day: Weekday) -> DayWatch {
        DayWatch::new(day, self.schedule_tx.subscribe())
    }

    /// Like [`Self::workouts_for_day`], accepting a display label such as
    /// `"Monday (leg day)"`. Returns `None` if the label names no weekday.
    pub fn workouts_for_label(&self, label: &str) -> Option<DayWatch> {
        Weekday::from_label(label).map(|day| self.workouts_for_day(day))
    }

    /// Marks the entry with `id` (on any day) as done or not done.
    ///
    /// # Errors
    /// Returns `Error` if the store write fails.
    pub fn set_done(&self, id: u64, is_checked: bool) -> Result<(), Error> {
        self.mutate("set_done", |state| {
            state
                .schedule
                .find_mut(id)
                .map(|entry| entry.is_done = is_checked)
                .is_some()
        })
    }

    /// Marks every entry of `day` as done or not done.
    ///
    /// # Errors
    /// Returns `Error` if the store write fails.
    pub fn set_all_done(&self, day: Weekday, is_checked: bool) -> Result<(), Error> {
        self.mutate("set_all_done", |state| {
            for entry in state.schedule.day_mut(day) {
                entry.is_done = is_checked;
            }
            true
        })
    }

    /// Appends one entry per exercise to `day`. Returns the new ids in order.
    ///
    /// # Errors
    /// Returns `Error` if the store write fails.
    pub fn add_workouts<I>(&self, day: Weekday, exercises: I) -> Result<Vec<u64>, Error>
    where
        I: IntoIterator<Item = Exercise>,
    {
        let mut state = self.lock();
        let mut ids = Vec::new();
        for exercise in exercises {
            let id = state.allocate_id();
            state.schedule.day_mut(day).push(WorkoutEntry::new(id, exercise));
            ids.push(id);
        }
        if ids.is_empty() {
            return Ok(ids);
        }
        self.commit(&mut state)?;
        Ok(ids)
    }

    /// Removes the first entry of `day` equal to `entry`.
    ///
    /// # Errors
    /// Returns `Error` if the store write fails.
    pub fn remove_workout(&self, day: Weekday, entry: &WorkoutEntry) -> Result<(), Error> {
        self.mutate("remove_workout", |state| {
            let entries = state.schedule.day_mut(day);
            match entries.iter().position(|e| e == entry) {
                Some(index) => {
                    entries.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Replaces the entry of `day` that has the same id as `updated`.
    /// A reps list whose length differs from the set count is stored as given.
    ///
    /// # Errors
    /// Returns `Error` if the store write fails.
    pub fn update_workout(&self, day: Weekday, updated: WorkoutEntry) -> Result<(), Error> {
        if updated.reps_mismatch() {
            debug!(id = updated.id, "Updating entry whose reps don't match its set count");
        }
        self.mutate("update_workout", |state| {
            match state
                .schedule
                .day_mut(day)
                .iter_mut()
                .find(|e| e.id == updated.id)
            {
                Some(slot) => {
                    *slot = updated;
                    true
                }
                None => false,
            }
        })
    }

    /// Replaces the order of `day`'s entries. `new_order` must hold exactly the
    /// ids already scheduled on that day; anything else is ignored.
    ///
    /// # Errors
    /// Returns `Error` if the store write fails.
    pub fn reorder_workouts(&self, day: Weekday, new_order: Vec<WorkoutEntry>) -> Result<(), Error> {
        self.mutate("reorder_workouts", |state| {
            let entries = state.schedule.day_mut(day);
            let mut current: Vec<u64> = entries.iter().map(|e| e.id).collect();
            let mut proposed: Vec<u64> = new_order.iter().map(|e| e.id).collect();
            current.sort_unstable();
            proposed.sort_unstable();
            if current != proposed {
                warn!(%day, "Rejected reorder that changes the day's entries");
                return false;
            }
            *entries = new_order;
            true
        })
    }

    /// Keyword search over the exercise catalog.
    ///
    /// # Errors
    /// Returns `Error` if the catalog query fails.
    pub fn search_catalog(&self, query: &str) -> Result<Vec<Exercise>, Error> {
        Ok(self.catalog.search(query)?)
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Point-in-time copy of the whole schedule.
    pub fn snapshot(&self) -> Schedule {
        self.schedule_tx.borrow().clone()
    }

    /// Receives a new snapshot after every completed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Schedule> {
        self.schedule_tx.subscribe()
    }

    /// True while [`Self::initialize`] is running.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }

    pub fn first_launch(&self) -> watch::Receiver<bool> {
        self.first_launch_tx.subscribe()
    }

    /// Shuts the manager down. Open [`DayWatch`]es and receivers see their
    /// channels close.
    pub fn dispose(self) {
        debug!(entries = self.lock().schedule.len(), "Disposing schedule manager");
    }
}

/// Observes one day of the schedule.
pub struct DayWatch {
    day: Weekday,
    rx: watch::Receiver<Schedule>,
    last: Vec<WorkoutEntry>,
}

impl DayWatch {
    fn new(day: Weekday, rx: watch::Receiver<Schedule>) -> Self {
        let last = rx.borrow().day(day).to_vec();
        Self { day, rx, last }
    }

    pub const fn day(&self) -> Weekday {
        self.day
    }

    /// The day's list as of the latest published snapshot.
    pub fn current(&self) -> Vec<WorkoutEntry> {
        self.rx.borrow().day(self.day).to_vec()
    }

    /// Waits until this day's list differs from the last emission and returns it.
    /// Mutations that only touch other days are skipped.
    ///
    /// # Errors
    /// Returns `RecvError` once the manager has been disposed.
    pub async fn changed(&mut self) -> Result<Vec<WorkoutEntry>, watch::error::RecvError> {
        loop {
            self.rx.changed().await?;
            let entries = self.rx.borrow_and_update().day(self.day).to_vec();
            if entries != self.last {
                self.last.clone_from(&entries);
                return Ok(entries);
            }
        }
    }
}
