use anyhow::{Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use vital_core::service::Tracker;

use super::helpers::{parse_date, resolve_id, short_id};

const LBS_PER_KG: f64 = 2.204_622_621_8;

/// Parse a weight like "72.5", "72.5kg", or "160lbs" into kilograms.
pub(crate) fn parse_weight_kg(s: &str) -> Result<f64> {
    let trimmed = s.trim().to_lowercase();
    let (number, factor) = if let Some(n) = trimmed.strip_suffix("kg") {
        (n.trim().to_string(), 1.0)
    } else if let Some(n) = trimmed.strip_suffix("lbs") {
        (n.trim().to_string(), 1.0 / LBS_PER_KG)
    } else if let Some(n) = trimmed.strip_suffix("lb") {
        (n.trim().to_string(), 1.0 / LBS_PER_KG)
    } else {
        (trimmed, 1.0)
    };
    let Ok(value) = number.parse::<f64>() else {
        bail!("Invalid weight '{s}'. Use a number, optionally suffixed kg or lbs");
    };
    Ok(value * factor)
}

pub(crate) fn cmd_weight_log(
    tracker: &mut Tracker,
    weight: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = date.map(|s| parse_date(Some(s))).transpose()?;
    let weight_kg = parse_weight_kg(weight)?;
    let entry = tracker.log_weight(weight_kg, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Logged weight {:.1} kg [{}]",
            entry.weight_kg,
            short_id(&entry.id)
        );
        if let Some(target) = tracker.active_profile().target_weight_kg {
            let diff = entry.weight_kg - target;
            println!("Target: {target:.1} kg ({diff:+.1} kg)");
        }
    }
    Ok(())
}

pub(crate) fn cmd_weight_history(tracker: &Tracker, limit: usize, json: bool) -> Result<()> {
    let all = tracker.weights();
    let start = all.len().saturating_sub(limit);
    let entries = &all[start..];

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No weight logged yet. Use `vital weight log` to add an entry.");
    } else {
        #[derive(Tabled)]
        struct WeightRow {
            #[tabled(rename = "ID")]
            id: String,
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Weight (kg)")]
            weight: String,
            #[tabled(rename = "Change")]
            change: String,
        }

        let rows: Vec<WeightRow> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| WeightRow {
                id: short_id(&e.id),
                date: e.date.chars().take(10).collect(),
                weight: format!("{:.1}", e.weight_kg),
                change: if i == 0 && start == 0 {
                    String::new()
                } else {
                    let prev = if i == 0 {
                        all[start - 1].weight_kg
                    } else {
                        entries[i - 1].weight_kg
                    };
                    format!("{:+.1}", e.weight_kg - prev)
                },
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }
    Ok(())
}

pub(crate) fn cmd_weight_delete(tracker: &mut Tracker, id: &str, json: bool) -> Result<()> {
    let full_id = resolve_id(tracker.weights().iter().map(|w| w.id.as_str()), id)?;
    tracker.delete_weight(&full_id);

    if json {
        println!("{}", serde_json::json!({ "deleted": full_id }));
    } else {
        println!("Deleted weight entry {}", short_id(&full_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight_plain_is_kg() {
        assert!((parse_weight_kg("72.5").unwrap() - 72.5).abs() < f64::EPSILON);
        assert!((parse_weight_kg("72.5kg").unwrap() - 72.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_weight_lbs_converts() {
        let kg = parse_weight_kg("160lbs").unwrap();
        assert!((kg - 72.57).abs() < 0.01);
        assert!((parse_weight_kg("160 lb").unwrap() - kg).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_weight_invalid() {
        assert!(parse_weight_kg("heavy").is_err());
        assert!(parse_weight_kg("kg").is_err());
    }
}
