use std::path::Path;

use anyhow::{Context, Result};

use vital_core::estimate::Confidence;
use vital_core::service::{EstimationProvider, Tracker};

use super::helpers::{parse_date, short_id};

fn confidence_label(c: Confidence) -> &'static str {
    match c {
        Confidence::High => "high",
        Confidence::Medium => "medium",
        Confidence::Low => "low",
    }
}

pub(crate) fn cmd_estimate_food(
    tracker: &mut Tracker,
    provider: &dyn EstimationProvider,
    image: Option<String>,
    description: Option<String>,
    log: bool,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = date.map(|s| parse_date(Some(s))).transpose()?;
    let image_bytes = image
        .map(|p| {
            std::fs::read(Path::new(&p)).with_context(|| format!("Could not read image '{p}'"))
        })
        .transpose()?;

    let estimate = tracker.estimate_food(
        provider,
        image_bytes.as_deref(),
        description.as_deref(),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        println!("{}", estimate.food_name);
        if let Some(serving) = &estimate.serving_size {
            println!("  Serving:    {serving}");
        }
        println!("  Calories:   {:.0} kcal", estimate.calories);
        if let Some(m) = estimate.macros {
            println!(
                "  Macros:     {:.0}g protein / {:.0}g carbs / {:.0}g fat",
                m.protein, m.carbs, m.fat
            );
        }
        println!("  Confidence: {}", confidence_label(estimate.confidence));
        if estimate.confidence == Confidence::Low {
            eprintln!("Low confidence; double-check before logging.");
        }
    }

    if log {
        let entry = tracker.log_estimated_food(&estimate, date)?;
        if !json {
            println!("Logged '{}' [{}]", entry.name, short_id(&entry.id));
        }
    }
    Ok(())
}

pub(crate) fn cmd_estimate_exercise(
    tracker: &mut Tracker,
    provider: &dyn EstimationProvider,
    activity: &str,
    minutes: f64,
    log: bool,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = date.map(|s| parse_date(Some(s))).transpose()?;
    let estimate = tracker.estimate_exercise(provider, activity, minutes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        println!(
            "{activity} for {minutes:.0} min: ~{:.0} kcal burned",
            estimate.calories
        );
    }

    if log {
        let entry = tracker.log_exercise(activity, minutes, estimate.calories, date)?;
        if !json {
            println!("Logged '{}' [{}]", entry.name, short_id(&entry.id));
        }
    }
    Ok(())
}
