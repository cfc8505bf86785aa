use anyhow::{Result, bail};
use tabled::{Table, Tabled, settings::Style};

use vital_core::models::Measurements;
use vital_core::service::Tracker;

use super::helpers::{parse_date, resolve_id, short_id};

pub(crate) struct MeasureArgs {
    pub bust: Option<f64>,
    pub waist: Option<f64>,
    pub tummy: Option<f64>,
    pub hips: Option<f64>,
    pub thigh_left: Option<f64>,
    pub thigh_right: Option<f64>,
    pub arm_left: Option<f64>,
    pub arm_right: Option<f64>,
    pub calf_left: Option<f64>,
    pub calf_right: Option<f64>,
    pub weight_kg: Option<f64>,
}

pub(crate) fn cmd_measure_log(
    tracker: &mut Tracker,
    args: MeasureArgs,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = date.map(|s| parse_date(Some(s))).transpose()?;
    let measurements = Measurements {
        bust: args.bust,
        waist: args.waist,
        tummy: args.tummy,
        hips: args.hips,
        thigh_left: args.thigh_left,
        thigh_right: args.thigh_right,
        arm_left: args.arm_left,
        arm_right: args.arm_right,
        calf_left: args.calf_left,
        calf_right: args.calf_right,
    };
    // All sites optional, but an entry with nothing in it is useless.
    let any_site = serde_json::to_value(&measurements)?
        .as_object()
        .is_some_and(|m| !m.is_empty());
    if !any_site && args.weight_kg.is_none() {
        bail!("Give at least one measurement (e.g. --waist 80)");
    }

    // A weight reading taken alongside a tape session also lands in the
    // weight log so stats pick it up.
    if let Some(kg) = args.weight_kg {
        tracker.log_weight(kg, date)?;
    }
    let entry = tracker.log_measurement(measurements, args.weight_kg, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("Logged measurements [{}]", short_id(&entry.id));
    }
    Ok(())
}

fn fmt_cm(v: Option<f64>) -> String {
    v.map_or("-".to_string(), |x| format!("{x:.1}"))
}

pub(crate) fn cmd_measure_list(tracker: &Tracker, limit: usize, json: bool) -> Result<()> {
    let all = tracker.measurements();
    let start = all.len().saturating_sub(limit);
    let entries = &all[start..];

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No measurements logged yet. Use `vital measure log` to add an entry.");
    } else {
        #[derive(Tabled)]
        struct MeasureRow {
            #[tabled(rename = "ID")]
            id: String,
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Bust")]
            bust: String,
            #[tabled(rename = "Waist")]
            waist: String,
            #[tabled(rename = "Tummy")]
            tummy: String,
            #[tabled(rename = "Hips")]
            hips: String,
            #[tabled(rename = "Thigh L/R")]
            thigh: String,
            #[tabled(rename = "Arm L/R")]
            arm: String,
            #[tabled(rename = "Calf L/R")]
            calf: String,
            #[tabled(rename = "Weight")]
            weight: String,
        }

        let rows: Vec<MeasureRow> = entries
            .iter()
            .map(|e| {
                let m = &e.measurements;
                MeasureRow {
                    id: short_id(&e.id),
                    date: e.date.chars().take(10).collect(),
                    bust: fmt_cm(m.bust),
                    waist: fmt_cm(m.waist),
                    tummy: fmt_cm(m.tummy),
                    hips: fmt_cm(m.hips),
                    thigh: format!("{}/{}", fmt_cm(m.thigh_left), fmt_cm(m.thigh_right)),
                    arm: format!("{}/{}", fmt_cm(m.arm_left), fmt_cm(m.arm_right)),
                    calf: format!("{}/{}", fmt_cm(m.calf_left), fmt_cm(m.calf_right)),
                    weight: fmt_cm(e.synced_weight_kg),
                }
            })
            .collect();

        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!("{table}");
        println!("Measurements in cm, weight in kg.");
    }
    Ok(())
}

pub(crate) fn cmd_measure_delete(tracker: &mut Tracker, id: &str, json: bool) -> Result<()> {
    let full_id = resolve_id(tracker.measurements().iter().map(|m| m.id.as_str()), id)?;
    tracker.delete_measurement(&full_id);

    if json {
        println!("{}", serde_json::json!({ "deleted": full_id }));
    } else {
        println!("Deleted measurement entry {}", short_id(&full_id));
    }
    Ok(())
}
