//! Calorie balance derivation.
//!
//! BMR uses the Mifflin-St Jeor equation (1990):
//! `BMR = 10*weight_kg + 6.25*height_cm - 5*age + offset`, offset +5 for men
//! and -161 for women.

use chrono::NaiveDate;

use crate::models::{DailyStats, ExerciseEntry, FoodEntry, Gender, Profile};

/// Weight used when a profile has no weight entries at all. Documented
/// policy: reported balance for such days assumes an average adult body.
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// kcal per step for pedometer-synced exercise entries.
pub const KCAL_PER_STEP: f64 = 0.04;

/// Steps walked per minute assumed when deriving duration from a step count.
pub const STEPS_PER_MINUTE: f64 = 100.0;

/// Offline fallback when the estimation service is unreachable: a flat
/// kcal-per-minute burn for an arbitrary activity.
pub const KCAL_PER_EXERCISE_MINUTE: f64 = 5.0;

#[must_use]
pub fn compute_bmr(profile: &Profile, weight_kg: f64) -> f64 {
    let offset = match profile.gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * f64::from(profile.height_cm) - 5.0 * f64::from(profile.age) + offset
}

/// Build the daily balance for `date` from the entries already filtered to
/// that date. An empty day is still valid: `intake = 0`, `burned = 0`,
/// `net = -bmr`.
#[must_use]
pub fn compute_daily_stats(
    profile: &Profile,
    weight_kg: f64,
    foods: &[&FoodEntry],
    exercises: &[&ExerciseEntry],
    date: NaiveDate,
) -> DailyStats {
    let intake: f64 = foods.iter().map(|f| f.calories).sum();
    let burned: f64 = exercises.iter().map(|e| e.calories_burned).sum();
    let exercise_minutes: f64 = exercises.iter().map(|e| e.duration_minutes).sum();
    let bmr = compute_bmr(profile, weight_kg);

    let mut protein = None;
    let mut carbs = None;
    let mut fat = None;
    for m in foods.iter().filter_map(|f| f.macros) {
        *protein.get_or_insert(0.0) += m.protein;
        *carbs.get_or_insert(0.0) += m.carbs;
        *fat.get_or_insert(0.0) += m.fat;
    }

    DailyStats {
        date,
        intake,
        burned,
        bmr,
        net: intake - (bmr + burned),
        exercise_minutes,
        protein,
        carbs,
        fat,
    }
}

/// Resolve the weight applicable to `date`: the latest entry dated on or
/// before the end of that day, else the earliest known entry, else
/// [`DEFAULT_WEIGHT_KG`]. This is a policy, not an inference — it directly
/// changes reported balance for historical dates.
#[must_use]
pub fn weight_for_date(weights: &[crate::models::WeightEntry], date: NaiveDate) -> f64 {
    let mut dated: Vec<(NaiveDate, f64)> = weights
        .iter()
        .filter_map(|w| crate::models::entry_date(&w.date).map(|d| (d, w.weight_kg)))
        .collect();
    dated.sort_by_key(|(d, _)| *d);

    if let Some((_, kg)) = dated.iter().rev().find(|(d, _)| *d <= date) {
        return *kg;
    }
    dated.first().map_or(DEFAULT_WEIGHT_KG, |(_, kg)| *kg)
}

#[must_use]
pub fn calories_from_steps(steps: u32) -> f64 {
    (f64::from(steps) * KCAL_PER_STEP).round()
}

#[must_use]
pub fn minutes_from_steps(steps: u32) -> f64 {
    (f64::from(steps) / STEPS_PER_MINUTE).ceil()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Macros, WeightEntry};

    fn profile(gender: Gender, age: u32, height_cm: u32) -> Profile {
        Profile {
            id: "p1".to_string(),
            name: "Test".to_string(),
            gender,
            age,
            height_cm,
            target_weight_kg: None,
            reminders: vec![],
        }
    }

    fn food(date: &str, calories: f64, macros: Option<Macros>) -> FoodEntry {
        FoodEntry {
            id: crate::models::new_entry_id(),
            date: date.to_string(),
            name: "food".to_string(),
            calories,
            macros,
            image_url: None,
            meal_type: None,
        }
    }

    fn exercise(date: &str, minutes: f64, burned: f64) -> ExerciseEntry {
        ExerciseEntry {
            id: crate::models::new_entry_id(),
            date: date.to_string(),
            name: "run".to_string(),
            duration_minutes: minutes,
            calories_burned: burned,
            steps: None,
        }
    }

    fn weight(date: &str, kg: f64) -> WeightEntry {
        WeightEntry {
            id: crate::models::new_entry_id(),
            date: date.to_string(),
            weight_kg: kg,
        }
    }

    #[test]
    fn test_bmr_formula_exact() {
        // 10*60 + 6.25*165 - 5*30 - 161 = 1320.25
        let p = profile(Gender::Female, 30, 165);
        assert!((compute_bmr(&p, 60.0) - 1320.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bmr_male_offset() {
        let p = profile(Gender::Male, 40, 180);
        // 10*80 + 6.25*180 - 5*40 + 5 = 800 + 1125 - 200 + 5 = 1730
        assert!((compute_bmr(&p, 80.0) - 1730.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_daily_stats_surplus_example() {
        let p = profile(Gender::Female, 30, 165);
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let f1 = food("2024-06-15T08:00:00+00:00", 800.0, None);
        let f2 = food("2024-06-15T13:00:00+00:00", 1000.0, None);
        let e1 = exercise("2024-06-15T18:00:00+00:00", 45.0, 300.0);
        let stats = compute_daily_stats(&p, 60.0, &[&f1, &f2], &[&e1], date);
        assert!((stats.intake - 1800.0).abs() < f64::EPSILON);
        assert!((stats.burned - 300.0).abs() < f64::EPSILON);
        assert!((stats.bmr - 1320.25).abs() < f64::EPSILON);
        // 1800 - (1320.25 + 300) = 179.75 surplus
        assert!((stats.net - 179.75).abs() < 1e-9);
        assert!((stats.exercise_minutes - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_daily_stats_empty_day() {
        let p = profile(Gender::Female, 30, 165);
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let stats = compute_daily_stats(&p, 60.0, &[], &[], date);
        assert!((stats.intake - 0.0).abs() < f64::EPSILON);
        assert!((stats.burned - 0.0).abs() < f64::EPSILON);
        assert!((stats.net - (-stats.bmr)).abs() < f64::EPSILON);
        assert!(stats.protein.is_none());
    }

    #[test]
    fn test_daily_stats_macro_totals() {
        let p = profile(Gender::Male, 25, 175);
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let with = food(
            "2024-06-15T08:00:00+00:00",
            400.0,
            Some(Macros {
                protein: 30.0,
                carbs: 40.0,
                fat: 10.0,
            }),
        );
        let without = food("2024-06-15T12:00:00+00:00", 300.0, None);
        let stats = compute_daily_stats(&p, 75.0, &[&with, &without], &[], date);
        assert!((stats.protein.unwrap() - 30.0).abs() < f64::EPSILON);
        assert!((stats.carbs.unwrap() - 40.0).abs() < f64::EPSILON);
        assert!((stats.fat.unwrap() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_net_invariant() {
        let p = profile(Gender::Male, 35, 182);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let f = food("2024-01-01T08:00:00+00:00", 2500.0, None);
        let e = exercise("2024-01-01T18:00:00+00:00", 30.0, 250.0);
        let stats = compute_daily_stats(&p, 90.0, &[&f], &[&e], date);
        assert!((stats.net - (stats.intake - (stats.bmr + stats.burned))).abs() < 1e-9);
    }

    #[test]
    fn test_weight_for_date_latest_on_or_before() {
        let weights = vec![
            weight("2024-06-01T12:00:00+00:00", 62.0),
            weight("2024-06-10T12:00:00+00:00", 61.0),
            weight("2024-06-20T12:00:00+00:00", 60.0),
        ];
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!((weight_for_date(&weights, d) - 61.0).abs() < f64::EPSILON);
        // On the exact day the sample counts
        let d = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        assert!((weight_for_date(&weights, d) - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weight_for_date_falls_back_to_earliest() {
        let weights = vec![
            weight("2024-06-10T12:00:00+00:00", 61.0),
            weight("2024-06-01T12:00:00+00:00", 62.0),
        ];
        let before_all = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!((weight_for_date(&weights, before_all) - 62.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weight_for_date_default_when_empty() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!((weight_for_date(&[], d) - DEFAULT_WEIGHT_KG).abs() < f64::EPSILON);
    }

    #[test]
    fn test_step_heuristics() {
        assert!((calories_from_steps(2500) - 100.0).abs() < f64::EPSILON);
        assert!((calories_from_steps(13) - 1.0).abs() < f64::EPSILON); // 0.52 rounds to 1
        assert!((minutes_from_steps(2500) - 25.0).abs() < f64::EPSILON);
        assert!((minutes_from_steps(2501) - 26.0).abs() < f64::EPSILON); // ceil
        assert!((minutes_from_steps(1) - 1.0).abs() < f64::EPSILON);
    }
}
