use anyhow::{Result, bail};
use chrono::Duration;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use vital_core::aggregate::Bucket;
use vital_core::service::Tracker;

use super::helpers::{parse_date, parse_granularity};

const BAR_WIDTH: usize = 40;

pub(crate) fn cmd_stats_day(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let stats = tracker.daily_stats(date);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Stats for {date}");
        println!("  Intake:   {:>7.0} kcal", stats.intake);
        println!("  BMR:      {:>7.0} kcal", stats.bmr);
        println!("  Exercise: {:>7.0} kcal ({:.0} min)", stats.burned, stats.exercise_minutes);
        let label = if stats.net > 0.0 { "surplus" } else { "deficit" };
        println!("  Net:      {:>7.0} kcal {label}", stats.net.abs());
        if let (Some(p), Some(c), Some(f)) = (stats.protein, stats.carbs, stats.fat) {
            println!("  Macros:   {p:.0}g protein / {c:.0}g carbs / {f:.0}g fat");
        }
    }
    Ok(())
}

pub(crate) fn cmd_stats_chart(
    tracker: &Tracker,
    metric: &str,
    days: i64,
    granularity: &str,
    json: bool,
) -> Result<()> {
    if days < 1 {
        bail!("--days must be at least 1");
    }
    let granularity = parse_granularity(granularity)?;
    let end = chrono::Local::now().date_naive();
    let start = end - Duration::days(days - 1);

    let (series, unit) = match metric.to_lowercase().as_str() {
        "intake" => (tracker.intake_series(start, end, granularity), "kcal"),
        "burned" => (tracker.burned_series(start, end, granularity), "kcal"),
        "minutes" => (
            tracker.exercise_minutes_series(start, end, granularity),
            "min",
        ),
        _ => bail!("Invalid metric '{metric}'. Use intake, burned, or minutes"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        print_chart(&series, unit);
    }
    Ok(())
}

fn print_chart(series: &[Bucket], unit: &str) {
    let max = series.iter().map(|b| b.value).fold(0.0_f64, f64::max);

    #[derive(Tabled)]
    struct ChartRow {
        #[tabled(rename = "Bucket")]
        label: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "")]
        bar: String,
    }

    let rows: Vec<ChartRow> = series
        .iter()
        .map(|b| {
            let width = if max > 0.0 {
                ((b.value / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            ChartRow {
                label: b.label.clone(),
                value: format!("{:.0} {unit}", b.value),
                bar: "█".repeat(width),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}
