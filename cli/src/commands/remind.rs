use anyhow::Result;
use chrono::Local;
use tabled::{Table, Tabled, settings::Style};

use vital_core::service::Tracker;

use super::helpers::{format_days, parse_days, resolve_id, short_id};

pub(crate) fn cmd_remind_add(
    tracker: &mut Tracker,
    time: &str,
    days: &str,
    json: bool,
) -> Result<()> {
    let days = parse_days(days)?;
    let reminder = tracker.add_reminder(time, days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reminder)?);
    } else {
        println!(
            "Added reminder at {} on {} [{}]",
            reminder.time,
            format_days(&reminder.days),
            short_id(&reminder.id)
        );
    }
    Ok(())
}

pub(crate) fn cmd_remind_list(tracker: &Tracker, json: bool) -> Result<()> {
    let reminders = &tracker.active_profile().reminders;

    if json {
        println!("{}", serde_json::to_string_pretty(reminders)?);
    } else if reminders.is_empty() {
        eprintln!("No reminders set. Use `vital remind add` to create one.");
    } else {
        #[derive(Tabled)]
        struct ReminderRow {
            #[tabled(rename = "ID")]
            id: String,
            #[tabled(rename = "Time")]
            time: String,
            #[tabled(rename = "Days")]
            days: String,
            #[tabled(rename = "Enabled")]
            enabled: &'static str,
        }

        let rows: Vec<ReminderRow> = reminders
            .iter()
            .map(|r| ReminderRow {
                id: short_id(&r.id),
                time: r.time.clone(),
                days: format_days(&r.days),
                enabled: if r.enabled { "yes" } else { "no" },
            })
            .collect();

        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
    Ok(())
}

pub(crate) fn cmd_remind_toggle(tracker: &mut Tracker, id: &str, json: bool) -> Result<()> {
    let full_id = resolve_id(
        tracker
            .active_profile()
            .reminders
            .iter()
            .map(|r| r.id.as_str()),
        id,
    )?;
    let enabled = tracker.toggle_reminder(&full_id)?;

    if json {
        println!("{}", serde_json::json!({ "id": full_id, "enabled": enabled }));
    } else {
        println!(
            "Reminder {} is now {}",
            short_id(&full_id),
            if enabled { "enabled" } else { "disabled" }
        );
    }
    Ok(())
}

/// Print reminders due right now. Meant to be run from cron or a shell
/// prompt hook; exits quietly when nothing is due.
pub(crate) fn cmd_remind_check(tracker: &mut Tracker, json: bool) -> Result<()> {
    let due = tracker.due_reminders(Local::now().naive_local());

    if json {
        println!("{}", serde_json::to_string_pretty(&due)?);
    } else {
        for reminder in &due {
            println!("Reminder: log your meals and weight ({})", reminder.time);
        }
    }
    Ok(())
}
