use anyhow::{Result, bail};
use tabled::{Table, Tabled, settings::Style};

use vital_core::models::Gender;
use vital_core::service::Tracker;

use super::helpers::{resolve_id, short_id};

pub(crate) fn parse_gender(s: &str) -> Result<Gender> {
    match s.to_lowercase().as_str() {
        "male" | "m" => Ok(Gender::Male),
        "female" | "f" => Ok(Gender::Female),
        _ => bail!("Invalid gender '{s}'. Use male or female"),
    }
}

fn gender_label(g: Gender) -> &'static str {
    match g {
        Gender::Male => "male",
        Gender::Female => "female",
    }
}

#[allow(clippy::fn_params_excessive_bools)]
pub(crate) fn cmd_profile_add(
    tracker: &mut Tracker,
    name: &str,
    gender: &str,
    age: u32,
    height_cm: u32,
    target_weight: Option<f64>,
    switch: bool,
    json: bool,
) -> Result<()> {
    let gender = parse_gender(gender)?;
    let profile = tracker.add_profile(name, gender, age, height_cm, target_weight)?;
    if switch {
        tracker.switch_profile(&profile.id)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Added profile '{}' ({})", profile.name, short_id(&profile.id));
        if switch {
            println!("Switched to '{}'", profile.name);
        }
    }
    Ok(())
}

pub(crate) fn cmd_profile_list(tracker: &Tracker, json: bool) -> Result<()> {
    let profiles = tracker.profiles();

    if json {
        println!("{}", serde_json::to_string_pretty(profiles)?);
    } else {
        #[derive(Tabled)]
        struct ProfileRow {
            #[tabled(rename = "ID")]
            id: String,
            #[tabled(rename = "Name")]
            name: String,
            #[tabled(rename = "Gender")]
            gender: &'static str,
            #[tabled(rename = "Age")]
            age: u32,
            #[tabled(rename = "Height (cm)")]
            height: u32,
            #[tabled(rename = "Active")]
            active: &'static str,
        }

        let active_id = tracker.active_profile().id.clone();
        let rows: Vec<ProfileRow> = profiles
            .iter()
            .map(|p| ProfileRow {
                id: short_id(&p.id),
                name: p.name.clone(),
                gender: gender_label(p.gender),
                age: p.age,
                height: p.height_cm,
                active: if p.id == active_id { "*" } else { "" },
            })
            .collect();

        let table = Table::new(&rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
    Ok(())
}

pub(crate) fn cmd_profile_switch(tracker: &mut Tracker, id: &str, json: bool) -> Result<()> {
    let full_id = resolve_id(tracker.profiles().iter().map(|p| p.id.as_str()), id)?;
    tracker.switch_profile(&full_id)?;

    let name = tracker.active_profile().name.clone();
    if json {
        println!("{}", serde_json::json!({ "active": full_id, "name": name }));
    } else {
        println!("Switched to '{name}'");
    }
    Ok(())
}

pub(crate) fn cmd_profile_show(tracker: &Tracker, json: bool) -> Result<()> {
    let profile = tracker.active_profile();

    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
    } else {
        println!("{} ({})", profile.name, short_id(&profile.id));
        println!("  Gender: {}", gender_label(profile.gender));
        println!("  Age: {}", profile.age);
        println!("  Height: {} cm", profile.height_cm);
        if let Some(tw) = profile.target_weight_kg {
            println!("  Target weight: {tw:.1} kg");
        }
        println!("  Reminders: {}", profile.reminders.len());
        println!("  BMR today: {:.0} kcal", tracker.bmr_today());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_profile_edit(
    tracker: &mut Tracker,
    name: Option<String>,
    gender: Option<String>,
    age: Option<u32>,
    height_cm: Option<u32>,
    target_weight: Option<f64>,
    json: bool,
) -> Result<()> {
    let gender = gender.as_deref().map(parse_gender).transpose()?;
    let profile =
        tracker.update_active_profile(name.as_deref(), gender, age, height_cm, target_weight)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Updated profile '{}'", profile.name);
    }
    Ok(())
}
