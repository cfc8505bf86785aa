//! Local reminder scheduling.
//!
//! There is no background process; the caller polls [`ReminderScheduler::due_reminders`]
//! on whatever interval it likes. The fired-set guarantees at most one fire
//! per profile per exact HH:MM per day even when polled faster than once a
//! minute.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::models::{Profile, Reminder};

/// Day of week with Sunday = 0, matching [`Reminder::days`].
#[must_use]
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

#[derive(Default)]
pub struct ReminderScheduler {
    fired: HashSet<(String, NaiveDate, String)>,
}

impl ReminderScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reminders of `profile` due at `now`: enabled, active on today's
    /// weekday, HH:MM equal to the current minute, and not already fired
    /// today at that exact time.
    pub fn due_reminders(&mut self, profile: &Profile, now: NaiveDateTime) -> Vec<Reminder> {
        let today = now.date();
        let weekday = weekday_index(today);
        let hhmm = format!("{:02}:{:02}", now.hour(), now.minute());

        let mut due = Vec::new();
        for reminder in &profile.reminders {
            if !reminder.enabled
                || reminder.time != hhmm
                || !reminder.days.contains(&weekday)
            {
                continue;
            }
            let fire_key = (profile.id.clone(), today, reminder.time.clone());
            if self.fired.insert(fire_key) {
                due.push(reminder.clone());
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, new_entry_id};

    fn profile_with(reminders: Vec<Reminder>) -> Profile {
        Profile {
            id: "p1".to_string(),
            name: "Test".to_string(),
            gender: Gender::Female,
            age: 30,
            height_cm: 165,
            target_weight_kg: None,
            reminders,
        }
    }

    fn reminder(time: &str, days: Vec<u8>, enabled: bool) -> Reminder {
        Reminder {
            id: new_entry_id(),
            time: time.to_string(),
            days,
            enabled,
        }
    }

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    #[test]
    fn test_weekday_index_sunday_is_zero() {
        // 2024-06-09 was a Sunday, 2024-06-15 a Saturday.
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()), 0);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()), 6);
    }

    #[test]
    fn test_due_at_matching_minute() {
        let mut sched = ReminderScheduler::new();
        // 2024-06-10 is a Monday (day 1)
        let p = profile_with(vec![reminder("07:30", vec![1], true)]);
        let due = sched.due_reminders(&p, at(2024, 6, 10, 7, 30));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].time, "07:30");
    }

    #[test]
    fn test_fires_at_most_once_per_day() {
        let mut sched = ReminderScheduler::new();
        let p = profile_with(vec![reminder("07:30", vec![1], true)]);
        assert_eq!(sched.due_reminders(&p, at(2024, 6, 10, 7, 30)).len(), 1);
        // Polled again within the same minute: already fired.
        assert!(sched.due_reminders(&p, at(2024, 6, 10, 7, 30)).is_empty());
        // Next week, same minute: fires again.
        assert_eq!(sched.due_reminders(&p, at(2024, 6, 17, 7, 30)).len(), 1);
    }

    #[test]
    fn test_disabled_and_wrong_day_skipped() {
        let mut sched = ReminderScheduler::new();
        let p = profile_with(vec![
            reminder("07:30", vec![1], false),
            reminder("07:30", vec![3], true), // Wednesday only
        ]);
        assert!(sched.due_reminders(&p, at(2024, 6, 10, 7, 30)).is_empty());
    }

    #[test]
    fn test_wrong_minute_not_due() {
        let mut sched = ReminderScheduler::new();
        let p = profile_with(vec![reminder("07:30", vec![1], true)]);
        assert!(sched.due_reminders(&p, at(2024, 6, 10, 7, 29)).is_empty());
        assert!(sched.due_reminders(&p, at(2024, 6, 10, 7, 31)).is_empty());
    }

    #[test]
    fn test_per_profile_dedup_is_independent() {
        let mut sched = ReminderScheduler::new();
        let p1 = profile_with(vec![reminder("07:30", vec![1], true)]);
        let mut p2 = profile_with(vec![reminder("07:30", vec![1], true)]);
        p2.id = "p2".to_string();

        assert_eq!(sched.due_reminders(&p1, at(2024, 6, 10, 7, 30)).len(), 1);
        assert_eq!(sched.due_reminders(&p2, at(2024, 6, 10, 7, 30)).len(), 1);
    }
}
