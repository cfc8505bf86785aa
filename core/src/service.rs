use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::aggregate::{Bucket, Granularity, aggregate};
use crate::error::TrackerError;
use crate::estimate::{ExerciseEstimate, FoodEstimate};
use crate::models::{
    BackupData, BackupMetadata, ExerciseEntry, FoodEntry, Gender, Macros, MeasurementEntry,
    Measurements, Profile, Reminder, RestoreSummary, WeightEntry, entry_date, new_entry_id,
    timestamp_for, validate_profile, validate_reminder_days, validate_reminder_time,
};
use crate::reminders::ReminderScheduler;
use crate::stats::{
    self, KCAL_PER_EXERCISE_MINUTE, calories_from_steps, compute_daily_stats, minutes_from_steps,
    weight_for_date,
};
use crate::store::{
    ACTIVE_PROFILE_KEY, EXERCISE_COLLECTION, EntryLog, FOOD_COLLECTION, MEASUREMENT_COLLECTION,
    NAMESPACE, PROFILES_KEY, Store, WEIGHT_COLLECTION,
};

pub const BACKUP_VERSION: i64 = 1;
pub const BACKUP_PLATFORM: &str = "vital-cli";

/// Platform-native estimation provider.
///
/// The CLI implements this with reqwest against a generative-AI endpoint;
/// tests use mocks. Called synchronously — async callers bridge with a
/// runtime handle.
pub trait EstimationProvider {
    fn estimate_food(
        &self,
        image_jpeg: Option<&[u8]>,
        description: Option<&str>,
    ) -> std::result::Result<FoodEstimate, TrackerError>;

    fn estimate_exercise(
        &self,
        activity: &str,
        duration_minutes: f64,
    ) -> std::result::Result<ExerciseEstimate, TrackerError>;
}

/// Application context: the active profile plus its four entry collections.
///
/// There is no global mutable state; every derivation and aggregation goes
/// through this object, and [`Tracker::switch_profile`] atomically reloads
/// the collections for the new profile id.
pub struct Tracker {
    store: Store,
    profiles: Vec<Profile>,
    active_profile_id: String,
    foods: EntryLog<FoodEntry>,
    exercises: EntryLog<ExerciseEntry>,
    weights: EntryLog<WeightEntry>,
    measurements: EntryLog<MeasurementEntry>,
    scheduler: ReminderScheduler,
}

impl Tracker {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_store(Store::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_store(Store::open_in_memory()?)
    }

    fn from_store(store: Store) -> Result<Self> {
        let mut profiles: Vec<Profile> = match store.get_raw(PROFILES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).context("Corrupt profile list")?,
            None => Vec::new(),
        };

        // First run: create a starter profile so every entry collection has
        // an owner. The user edits it via `profile` commands.
        if profiles.is_empty() {
            profiles.push(Profile {
                id: new_entry_id(),
                name: "default".to_string(),
                gender: Gender::Female,
                age: 30,
                height_cm: 165,
                target_weight_kg: None,
                reminders: vec![],
            });
            let raw = serde_json::to_string(&profiles)?;
            store.set_raw(PROFILES_KEY, &raw)?;
        }

        let active_profile_id = match store.get_raw(ACTIVE_PROFILE_KEY)? {
            Some(id) if profiles.iter().any(|p| p.id == id) => id,
            _ => {
                let id = profiles[0].id.clone();
                store.set_raw(ACTIVE_PROFILE_KEY, &id)?;
                id
            }
        };

        let foods = EntryLog::load(&store, FOOD_COLLECTION, &active_profile_id);
        let exercises = EntryLog::load(&store, EXERCISE_COLLECTION, &active_profile_id);
        let weights = EntryLog::load(&store, WEIGHT_COLLECTION, &active_profile_id);
        let measurements = EntryLog::load(&store, MEASUREMENT_COLLECTION, &active_profile_id);

        Ok(Self {
            store,
            profiles,
            active_profile_id,
            foods,
            exercises,
            weights,
            measurements,
            scheduler: ReminderScheduler::new(),
        })
    }

    fn persist_profiles(&self) {
        match serde_json::to_string(&self.profiles) {
            Ok(raw) => {
                if let Err(e) = self.store.set_raw(PROFILES_KEY, &raw) {
                    eprintln!("Warning: could not persist profiles: {e:#}");
                }
            }
            Err(e) => eprintln!("Warning: could not serialize profiles: {e}"),
        }
    }

    // --- Profiles ---

    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    #[must_use]
    pub fn active_profile(&self) -> &Profile {
        self.profiles
            .iter()
            .find(|p| p.id == self.active_profile_id)
            .expect("active profile always exists")
    }

    pub fn add_profile(
        &mut self,
        name: &str,
        gender: Gender,
        age: u32,
        height_cm: u32,
        target_weight_kg: Option<f64>,
    ) -> Result<Profile> {
        validate_profile(name, age, height_cm)?;
        let profile = Profile {
            id: new_entry_id(),
            name: name.trim().to_string(),
            gender,
            age,
            height_cm,
            target_weight_kg,
            reminders: vec![],
        };
        self.profiles.push(profile.clone());
        self.persist_profiles();
        Ok(profile)
    }

    pub fn update_active_profile(
        &mut self,
        name: Option<&str>,
        gender: Option<Gender>,
        age: Option<u32>,
        height_cm: Option<u32>,
        target_weight_kg: Option<f64>,
    ) -> Result<Profile> {
        let current = self.active_profile().clone();
        let new_name = name.unwrap_or(&current.name);
        let new_age = age.unwrap_or(current.age);
        let new_height = height_cm.unwrap_or(current.height_cm);
        validate_profile(new_name, new_age, new_height)?;

        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.id == current.id)
            .expect("active profile always exists");
        profile.name = new_name.trim().to_string();
        profile.gender = gender.unwrap_or(current.gender);
        profile.age = new_age;
        profile.height_cm = new_height;
        if target_weight_kg.is_some() {
            profile.target_weight_kg = target_weight_kg;
        }
        let updated = profile.clone();
        self.persist_profiles();
        Ok(updated)
    }

    /// Switch the active profile and reload its four entry collections.
    pub fn switch_profile(&mut self, id: &str) -> Result<()> {
        if !self.profiles.iter().any(|p| p.id == id) {
            return Err(TrackerError::validation(format!("No profile with id '{id}'")).into());
        }
        self.store.set_raw(ACTIVE_PROFILE_KEY, id)?;
        self.active_profile_id = id.to_string();
        self.reload_collections();
        Ok(())
    }

    fn reload_collections(&mut self) {
        self.foods = EntryLog::load(&self.store, FOOD_COLLECTION, &self.active_profile_id);
        self.exercises = EntryLog::load(&self.store, EXERCISE_COLLECTION, &self.active_profile_id);
        self.weights = EntryLog::load(&self.store, WEIGHT_COLLECTION, &self.active_profile_id);
        self.measurements =
            EntryLog::load(&self.store, MEASUREMENT_COLLECTION, &self.active_profile_id);
    }

    // --- Reminders ---

    pub fn add_reminder(&mut self, time: &str, days: Vec<u8>) -> Result<Reminder> {
        validate_reminder_time(time)?;
        validate_reminder_days(&days)?;
        let reminder = Reminder {
            id: new_entry_id(),
            time: time.to_string(),
            days,
            enabled: true,
        };
        let active_id = self.active_profile_id.clone();
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.id == active_id)
            .expect("active profile always exists");
        profile.reminders.push(reminder.clone());
        self.persist_profiles();
        Ok(reminder)
    }

    /// Flip a reminder's enabled flag. Returns the new state.
    pub fn toggle_reminder(&mut self, reminder_id: &str) -> Result<bool> {
        let active_id = self.active_profile_id.clone();
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.id == active_id)
            .expect("active profile always exists");
        let Some(reminder) = profile.reminders.iter_mut().find(|r| r.id == reminder_id) else {
            return Err(
                TrackerError::validation(format!("No reminder with id '{reminder_id}'")).into(),
            );
        };
        reminder.enabled = !reminder.enabled;
        let enabled = reminder.enabled;
        self.persist_profiles();
        Ok(enabled)
    }

    /// Reminders of the active profile due at `now`, at most one fire per
    /// exact HH:MM per day.
    pub fn due_reminders(&mut self, now: NaiveDateTime) -> Vec<Reminder> {
        let profile = self
            .profiles
            .iter()
            .find(|p| p.id == self.active_profile_id)
            .expect("active profile always exists")
            .clone();
        self.scheduler.due_reminders(&profile, now)
    }

    // --- Food ---

    pub fn log_food(
        &mut self,
        name: &str,
        calories: f64,
        macros: Option<Macros>,
        meal_type: Option<String>,
        date: Option<NaiveDate>,
    ) -> Result<FoodEntry> {
        if name.trim().is_empty() {
            return Err(TrackerError::validation("Food name must not be empty").into());
        }
        if calories < 0.0 {
            return Err(TrackerError::validation("Calories must not be negative").into());
        }
        let entry = FoodEntry {
            id: new_entry_id(),
            date: timestamp_for(date),
            name: name.trim().to_string(),
            calories,
            macros,
            image_url: None,
            meal_type,
        };
        Ok(self.foods.append(&self.store, entry).clone())
    }

    /// Accept an AI estimate into the food log.
    pub fn log_estimated_food(
        &mut self,
        estimate: &FoodEstimate,
        date: Option<NaiveDate>,
    ) -> Result<FoodEntry> {
        self.log_food(
            &estimate.food_name,
            estimate.calories,
            estimate.macros,
            None,
            date,
        )
    }

    pub fn delete_food(&mut self, id: &str) -> bool {
        self.foods.remove(&self.store, id)
    }

    #[must_use]
    pub fn foods(&self) -> &[FoodEntry] {
        self.foods.list()
    }

    // --- Exercise ---

    pub fn log_exercise(
        &mut self,
        name: &str,
        duration_minutes: f64,
        calories_burned: f64,
        date: Option<NaiveDate>,
    ) -> Result<ExerciseEntry> {
        if name.trim().is_empty() {
            return Err(TrackerError::validation("Exercise name must not be empty").into());
        }
        if duration_minutes <= 0.0 {
            return Err(TrackerError::validation("Duration must be greater than 0").into());
        }
        if calories_burned < 0.0 {
            return Err(TrackerError::validation("Calories burned must not be negative").into());
        }
        let entry = ExerciseEntry {
            id: new_entry_id(),
            date: timestamp_for(date),
            name: name.trim().to_string(),
            duration_minutes,
            calories_burned,
            steps: None,
        };
        Ok(self.exercises.append(&self.store, entry).clone())
    }

    pub fn delete_exercise(&mut self, id: &str) -> bool {
        self.exercises.remove(&self.store, id)
    }

    #[must_use]
    pub fn exercises(&self) -> &[ExerciseEntry] {
        self.exercises.list()
    }

    /// Steps already logged for `date` across pedometer-synced entries.
    #[must_use]
    pub fn steps_logged(&self, date: NaiveDate) -> u32 {
        self.exercises
            .list()
            .iter()
            .filter(|e| entry_date(&e.date) == Some(date))
            .filter_map(|e| e.steps)
            .sum()
    }

    /// Sync a cumulative pedometer total for `date`. Only the delta since
    /// the previously logged total is recorded, so re-syncing the same
    /// reading is rejected rather than double counted.
    pub fn sync_steps(&mut self, new_total: u32, date: Option<NaiveDate>) -> Result<ExerciseEntry> {
        let day = date.unwrap_or_else(|| Local::now().date_naive());
        let logged = self.steps_logged(day);
        if new_total <= logged {
            return Err(TrackerError::validation(format!(
                "Step total {new_total} is not greater than the {logged} already logged for {day}"
            ))
            .into());
        }
        let delta = new_total - logged;
        let entry = ExerciseEntry {
            id: new_entry_id(),
            date: timestamp_for(Some(day)),
            name: "Walking (steps)".to_string(),
            duration_minutes: minutes_from_steps(delta),
            calories_burned: calories_from_steps(delta),
            steps: Some(delta),
        };
        Ok(self.exercises.append(&self.store, entry).clone())
    }

    // --- Weight ---

    pub fn log_weight(&mut self, weight_kg: f64, date: Option<NaiveDate>) -> Result<WeightEntry> {
        if weight_kg <= 0.0 {
            return Err(TrackerError::validation("Weight must be greater than 0").into());
        }
        let entry = WeightEntry {
            id: new_entry_id(),
            date: timestamp_for(date),
            weight_kg,
        };
        Ok(self.weights.append(&self.store, entry).clone())
    }

    pub fn delete_weight(&mut self, id: &str) -> bool {
        self.weights.remove(&self.store, id)
    }

    #[must_use]
    pub fn weights(&self) -> &[WeightEntry] {
        self.weights.list()
    }

    // --- Measurements ---

    pub fn log_measurement(
        &mut self,
        measurements: Measurements,
        synced_weight_kg: Option<f64>,
        date: Option<NaiveDate>,
    ) -> Result<MeasurementEntry> {
        let entry = MeasurementEntry {
            id: new_entry_id(),
            date: timestamp_for(date),
            measurements,
            synced_weight_kg,
        };
        Ok(self.measurements.append(&self.store, entry).clone())
    }

    pub fn delete_measurement(&mut self, id: &str) -> bool {
        self.measurements.remove(&self.store, id)
    }

    #[must_use]
    pub fn measurements(&self) -> &[MeasurementEntry] {
        self.measurements.list()
    }

    // --- Derivation ---

    /// Daily calorie balance for `date`, using the documented
    /// weight-for-date policy (latest sample on or before the day, else the
    /// earliest sample, else 70 kg).
    #[must_use]
    pub fn daily_stats(&self, date: NaiveDate) -> crate::models::DailyStats {
        let weight_kg = weight_for_date(self.weights.list(), date);
        let foods: Vec<&FoodEntry> = self
            .foods
            .list()
            .iter()
            .filter(|f| entry_date(&f.date) == Some(date))
            .collect();
        let exercises: Vec<&ExerciseEntry> = self
            .exercises
            .list()
            .iter()
            .filter(|e| entry_date(&e.date) == Some(date))
            .collect();
        compute_daily_stats(self.active_profile(), weight_kg, &foods, &exercises, date)
    }

    // --- Aggregation (chart series) ---

    #[must_use]
    pub fn intake_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> Vec<Bucket> {
        aggregate(
            self.foods.list(),
            |f| entry_date(&f.date),
            |f| f.calories,
            start,
            end,
            granularity,
        )
    }

    #[must_use]
    pub fn burned_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> Vec<Bucket> {
        aggregate(
            self.exercises.list(),
            |e| entry_date(&e.date),
            |e| e.calories_burned,
            start,
            end,
            granularity,
        )
    }

    #[must_use]
    pub fn exercise_minutes_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> Vec<Bucket> {
        aggregate(
            self.exercises.list(),
            |e| entry_date(&e.date),
            |e| e.duration_minutes,
            start,
            end,
            granularity,
        )
    }

    // --- Estimation orchestration ---

    /// Estimate food nutrition via the provider. Requires an image or a
    /// non-empty description. Remote failures propagate as retryable errors
    /// — there is no offline heuristic for arbitrary food.
    pub fn estimate_food(
        &self,
        provider: &dyn EstimationProvider,
        image_jpeg: Option<&[u8]>,
        description: Option<&str>,
    ) -> Result<FoodEstimate> {
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        if image_jpeg.is_none() && description.is_none() {
            return Err(
                TrackerError::validation("Provide an image or a description of the food").into(),
            );
        }
        Ok(provider.estimate_food(image_jpeg, description)?)
    }

    /// Estimate calories burned for an activity. Any provider failure falls
    /// back to the deterministic local heuristic (5 kcal/min).
    pub fn estimate_exercise(
        &self,
        provider: &dyn EstimationProvider,
        activity: &str,
        duration_minutes: f64,
    ) -> Result<ExerciseEstimate> {
        if activity.trim().is_empty() {
            return Err(TrackerError::validation("Activity name must not be empty").into());
        }
        if duration_minutes <= 0.0 {
            return Err(TrackerError::validation("Duration must be greater than 0").into());
        }
        match provider.estimate_exercise(activity.trim(), duration_minutes) {
            Ok(estimate) => Ok(estimate),
            Err(e) => {
                eprintln!("Warning: estimation unavailable ({e}), using local heuristic");
                Ok(ExerciseEstimate {
                    calories: duration_minutes * KCAL_PER_EXERCISE_MINUTE,
                })
            }
        }
    }

    // --- Backup / restore ---

    /// Export every namespaced key plus metadata as one JSON document.
    pub fn export_backup(&self) -> Result<BackupData> {
        let prefix = format!("{NAMESPACE}_");
        let mut entries = std::collections::BTreeMap::new();
        let mut entry_count: i64 = 0;

        for key in self.store.keys_with_prefix(&prefix)? {
            let Some(raw) = self.store.get_raw(&key)? else {
                continue;
            };
            let value: serde_json::Value = serde_json::from_str(&raw)
                .unwrap_or(serde_json::Value::String(raw));
            if key != PROFILES_KEY && key != ACTIVE_PROFILE_KEY {
                if let Some(arr) = value.as_array() {
                    entry_count += arr.len() as i64;
                }
            }
            entries.insert(key, value);
        }

        Ok(BackupData {
            metadata: BackupMetadata {
                version: BACKUP_VERSION,
                timestamp: Local::now().to_rfc3339(),
                platform: BACKUP_PLATFORM.to_string(),
                entry_count,
            },
            entries,
        })
    }

    /// Restore from a backup. This is a destructive overwrite, not a merge:
    /// every existing namespaced key is deleted, then the backup's keys are
    /// written verbatim.
    ///
    /// The payload is validated *before* anything is cleared, so a
    /// corrupt-but-parseable file cannot wipe existing data. A backup with
    /// no namespaced keys restores nothing and leaves data untouched.
    pub fn import_backup(&mut self, data: &BackupData) -> Result<RestoreSummary> {
        if data.metadata.version > BACKUP_VERSION {
            return Err(TrackerError::Parse(format!(
                "Unsupported backup version {}",
                data.metadata.version
            ))
            .into());
        }

        let prefix = format!("{NAMESPACE}_");
        let namespaced: Vec<(&String, &serde_json::Value)> = data
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .collect();

        if namespaced.is_empty() {
            return Ok(RestoreSummary {
                keys_restored: 0,
                entries_restored: 0,
            });
        }

        // Validate shapes before clearing anything.
        for (key, value) in &namespaced {
            if key.as_str() == PROFILES_KEY {
                let _: Vec<Profile> = serde_json::from_value((*value).clone())
                    .map_err(|e| TrackerError::Parse(format!("Invalid profile list: {e}")))?;
            } else if key.as_str() == ACTIVE_PROFILE_KEY {
                if !value.is_string() {
                    return Err(TrackerError::Parse(
                        "Active profile id must be a string".to_string(),
                    )
                    .into());
                }
            } else if !value.is_array() {
                return Err(TrackerError::Parse(format!(
                    "Collection under '{key}' must be a JSON array"
                ))
                .into());
            }
        }

        // Destructive clear, then restore verbatim.
        for key in self.store.keys_with_prefix(&prefix)? {
            self.store.delete(&key)?;
        }

        let mut entries_restored: i64 = 0;
        for (key, value) in &namespaced {
            let raw = match value {
                // The active-profile key is stored as a bare string, not a
                // JSON document.
                serde_json::Value::String(s) if key.as_str() == ACTIVE_PROFILE_KEY => s.clone(),
                other => other.to_string(),
            };
            self.store.set_raw(key, &raw)?;
            if key.as_str() != PROFILES_KEY && key.as_str() != ACTIVE_PROFILE_KEY {
                if let Some(arr) = value.as_array() {
                    entries_restored += arr.len() as i64;
                }
            }
        }

        if data.metadata.entry_count != entries_restored {
            eprintln!(
                "Warning: backup metadata reports {} entries, restored {entries_restored}",
                data.metadata.entry_count
            );
        }

        self.reload_after_restore()?;

        Ok(RestoreSummary {
            keys_restored: namespaced.len() as i64,
            entries_restored,
        })
    }

    fn reload_after_restore(&mut self) -> Result<()> {
        self.profiles = match self.store.get_raw(PROFILES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).context("Corrupt restored profile list")?,
            None => Vec::new(),
        };
        if self.profiles.is_empty() {
            // Backup carried entries but no profiles; keep a usable context.
            self.profiles.push(Profile {
                id: new_entry_id(),
                name: "default".to_string(),
                gender: Gender::Female,
                age: 30,
                height_cm: 165,
                target_weight_kg: None,
                reminders: vec![],
            });
            self.persist_profiles();
        }

        self.active_profile_id = match self.store.get_raw(ACTIVE_PROFILE_KEY)? {
            Some(id) if self.profiles.iter().any(|p| p.id == id) => id,
            _ => {
                let id = self.profiles[0].id.clone();
                self.store.set_raw(ACTIVE_PROFILE_KEY, &id)?;
                id
            }
        };
        self.reload_collections();
        Ok(())
    }

    // --- Raw stats building blocks, exposed for the CLI ---

    #[must_use]
    pub fn bmr_today(&self) -> f64 {
        let today = Local::now().date_naive();
        let weight = weight_for_date(self.weights.list(), today);
        stats::compute_bmr(self.active_profile(), weight)
    }
}
