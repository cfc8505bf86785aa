use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use vital_core::service::Tracker;

use super::helpers::{parse_date, resolve_id, short_id, truncate};

pub(crate) fn cmd_exercise_log(
    tracker: &mut Tracker,
    name: &str,
    minutes: f64,
    calories: f64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = date.map(|s| parse_date(Some(s))).transpose()?;
    let entry = tracker.log_exercise(name, minutes, calories, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Logged '{}' ({:.0} min, {:.0} kcal burned) [{}]",
            entry.name,
            entry.duration_minutes,
            entry.calories_burned,
            short_id(&entry.id)
        );
    }
    Ok(())
}

pub(crate) fn cmd_exercise_list(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let entries: Vec<_> = tracker
        .exercises()
        .iter()
        .filter(|e| vital_core::models::entry_date(&e.date) == Some(date))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No exercise logged for {date}. Use `vital exercise log` to add an entry.");
    } else {
        #[derive(Tabled)]
        struct ExerciseRow {
            #[tabled(rename = "ID")]
            id: String,
            #[tabled(rename = "Name")]
            name: String,
            #[tabled(rename = "Minutes")]
            minutes: String,
            #[tabled(rename = "Burned")]
            burned: String,
            #[tabled(rename = "Steps")]
            steps: String,
        }

        let rows: Vec<ExerciseRow> = entries
            .iter()
            .map(|e| ExerciseRow {
                id: short_id(&e.id),
                name: truncate(&e.name, 35),
                minutes: format!("{:.0}", e.duration_minutes),
                burned: format!("{:.0}", e.calories_burned),
                steps: e.steps.map_or(String::new(), |s| s.to_string()),
            })
            .collect();

        let burned: f64 = entries.iter().map(|e| e.calories_burned).sum();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
            .to_string();
        println!("{table}");
        println!("Total burned: {burned:.0} kcal");
    }
    Ok(())
}

pub(crate) fn cmd_exercise_delete(tracker: &mut Tracker, id: &str, json: bool) -> Result<()> {
    let full_id = resolve_id(tracker.exercises().iter().map(|e| e.id.as_str()), id)?;
    tracker.delete_exercise(&full_id);

    if json {
        println!("{}", serde_json::json!({ "deleted": full_id }));
    } else {
        println!("Deleted exercise entry {}", short_id(&full_id));
    }
    Ok(())
}

/// Sync a cumulative pedometer reading; only the delta gets logged.
pub(crate) fn cmd_exercise_steps(
    tracker: &mut Tracker,
    total: u32,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = date.map(|s| parse_date(Some(s))).transpose()?;
    let entry = tracker.sync_steps(total, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Synced {} steps ({:.0} kcal, {:.0} min) [{}]",
            entry.steps.unwrap_or(0),
            entry.calories_burned,
            entry.duration_minutes,
            short_id(&entry.id)
        );
    }
    Ok(())
}
