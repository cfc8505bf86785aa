use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub age: u32,
    pub height_cm: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_weight_kg: Option<f64>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    /// Time of day in "HH:MM" (24h).
    pub time: String,
    /// Days of week the reminder is active, 0 = Sunday .. 6 = Saturday.
    pub days: Vec<u8>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: String,
    /// RFC 3339 timestamp with local offset; the leading `YYYY-MM-DD` is the
    /// local calendar date the entry belongs to.
    pub date: String,
    pub name: String,
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub macros: Option<Macros>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meal_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: String,
    pub date: String,
    pub name: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    /// For pedometer-synced entries: the *delta* steps since the previously
    /// logged total for the day, never the raw cumulative reading.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub steps: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: String,
    pub date: String,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bust: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub waist: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tummy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hips: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thigh_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thigh_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub arm_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub arm_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calf_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calf_right: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementEntry {
    pub id: String,
    pub date: String,
    pub measurements: Measurements,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub synced_weight_kg: Option<f64>,
}

/// Derived per-day calorie balance. Never persisted.
///
/// Invariant: `net == intake - (bmr + burned)`.
#[derive(Debug, Clone, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub intake: f64,
    pub burned: f64,
    pub bmr: f64,
    pub net: f64,
    pub exercise_minutes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

// --- Backup / restore types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub version: i64,
    pub timestamp: String,
    pub platform: String,
    pub entry_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupData {
    pub metadata: BackupMetadata,
    /// Every namespaced key verbatim, value as raw JSON.
    pub entries: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreSummary {
    pub keys_restored: i64,
    pub entries_restored: i64,
}

// --- ID / timestamp helpers ---

#[must_use]
pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Timestamp for a new entry: now for `None`, midday local time for an
/// explicit backdated date. Always carries the local offset so the leading
/// date component is the local calendar date.
#[must_use]
pub fn timestamp_for(date: Option<NaiveDate>) -> String {
    match date {
        None => Local::now().to_rfc3339(),
        Some(d) => d
            .and_hms_opt(12, 0, 0)
            .and_then(|dt| dt.and_local_timezone(Local).single())
            .map_or_else(|| Local::now().to_rfc3339(), |dt| dt.to_rfc3339()),
    }
}

/// Local calendar date of an entry timestamp (the `YYYY-MM-DD` prefix).
#[must_use]
pub fn entry_date(timestamp: &str) -> Option<NaiveDate> {
    let prefix = timestamp.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

// --- Validation ---

pub fn validate_profile(name: &str, age: u32, height_cm: u32) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Profile name must not be empty");
    }
    if !(1..=150).contains(&age) {
        bail!("Age must be between 1 and 150 (got {age})");
    }
    if !(30..=300).contains(&height_cm) {
        bail!("Height must be between 30 and 300 cm (got {height_cm})");
    }
    Ok(())
}

pub fn validate_reminder_time(time: &str) -> Result<()> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 2 || parts[0].len() != 2 || parts[1].len() != 2 {
        bail!("Invalid reminder time '{time}'. Use HH:MM (24h)");
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid reminder time '{time}'. Use HH:MM (24h)"))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid reminder time '{time}'. Use HH:MM (24h)"))?;
    if hour > 23 || minute > 59 {
        bail!("Invalid reminder time '{time}'. Hour must be 00-23, minute 00-59");
    }
    Ok(())
}

pub fn validate_reminder_days(days: &[u8]) -> Result<()> {
    if days.is_empty() {
        bail!("Reminder must be active on at least one day");
    }
    for d in days {
        if *d > 6 {
            bail!("Invalid day {d}. Days are 0 (Sunday) through 6 (Saturday)");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_profile_ok() {
        assert!(validate_profile("Ada", 30, 165).is_ok());
    }

    #[test]
    fn test_validate_profile_empty_name() {
        assert!(validate_profile("  ", 30, 165).is_err());
    }

    #[test]
    fn test_validate_profile_age_bounds() {
        assert!(validate_profile("Ada", 0, 165).is_err());
        assert!(validate_profile("Ada", 151, 165).is_err());
        assert!(validate_profile("Ada", 1, 165).is_ok());
        assert!(validate_profile("Ada", 150, 165).is_ok());
    }

    #[test]
    fn test_validate_profile_height_bounds() {
        assert!(validate_profile("Ada", 30, 29).is_err());
        assert!(validate_profile("Ada", 30, 301).is_err());
        assert!(validate_profile("Ada", 30, 30).is_ok());
    }

    #[test]
    fn test_validate_reminder_time() {
        assert!(validate_reminder_time("07:30").is_ok());
        assert!(validate_reminder_time("00:00").is_ok());
        assert!(validate_reminder_time("23:59").is_ok());
        assert!(validate_reminder_time("24:00").is_err());
        assert!(validate_reminder_time("12:60").is_err());
        assert!(validate_reminder_time("7:30").is_err());
        assert!(validate_reminder_time("0730").is_err());
        assert!(validate_reminder_time("ab:cd").is_err());
    }

    #[test]
    fn test_validate_reminder_days() {
        assert!(validate_reminder_days(&[0, 6]).is_ok());
        assert!(validate_reminder_days(&[]).is_err());
        assert!(validate_reminder_days(&[7]).is_err());
    }

    #[test]
    fn test_timestamp_for_backdated_has_date_prefix() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let ts = timestamp_for(Some(d));
        assert!(ts.starts_with("2024-03-05"));
        assert_eq!(entry_date(&ts), Some(d));
    }

    #[test]
    fn test_timestamp_for_now_roundtrips() {
        let ts = timestamp_for(None);
        assert_eq!(entry_date(&ts), Some(Local::now().date_naive()));
    }

    #[test]
    fn test_entry_date_malformed() {
        assert!(entry_date("not a date").is_none());
        assert!(entry_date("").is_none());
        assert!(entry_date("2024-13-99T00:00:00Z").is_none());
    }

    #[test]
    fn test_gender_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"male\"");
        let g: Gender = serde_json::from_str("\"female\"").unwrap();
        assert_eq!(g, Gender::Female);
    }

    #[test]
    fn test_food_entry_optional_fields_omitted() {
        let e = FoodEntry {
            id: "x".to_string(),
            date: "2024-01-01T12:00:00+00:00".to_string(),
            name: "Oats".to_string(),
            calories: 389.0,
            macros: None,
            image_url: None,
            meal_type: None,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(!json.contains("macros"));
        assert!(!json.contains("image_url"));
    }
}
