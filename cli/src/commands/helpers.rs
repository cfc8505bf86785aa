use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};

use vital_core::aggregate::Granularity;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday")),
        },
    }
}

pub(crate) fn parse_granularity(s: &str) -> Result<Granularity> {
    match s.to_lowercase().as_str() {
        "day" | "daily" => Ok(Granularity::Day),
        "week" | "weekly" => Ok(Granularity::Week),
        "month" | "monthly" => Ok(Granularity::Month),
        _ => bail!("Invalid granularity '{s}'. Use day, week, or month"),
    }
}

/// Parse a reminder day spec: "all", "weekdays", "weekends", or a
/// comma-separated list of day names/numbers (Sunday = 0).
pub(crate) fn parse_days(spec: &str) -> Result<Vec<u8>> {
    match spec.to_lowercase().as_str() {
        "all" => return Ok((0..=6).collect()),
        "weekdays" => return Ok(vec![1, 2, 3, 4, 5]),
        "weekends" => return Ok(vec![0, 6]),
        _ => {}
    }

    let mut days = Vec::new();
    for part in spec.split(',') {
        let day = match part.trim().to_lowercase().as_str() {
            "sun" | "sunday" | "0" => 0,
            "mon" | "monday" | "1" => 1,
            "tue" | "tuesday" | "2" => 2,
            "wed" | "wednesday" | "3" => 3,
            "thu" | "thursday" | "4" => 4,
            "fri" | "friday" | "5" => 5,
            "sat" | "saturday" | "6" => 6,
            other => bail!("Invalid day '{other}'. Use sun-sat, 0-6, all, weekdays, or weekends"),
        };
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        bail!("No days given");
    }
    Ok(days)
}

pub(crate) const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub(crate) fn format_days(days: &[u8]) -> String {
    if days.len() == 7 {
        return "every day".to_string();
    }
    days.iter()
        .filter(|d| **d <= 6)
        .map(|d| DAY_NAMES[*d as usize])
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

/// Short id prefix for table display.
pub(crate) fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Resolve a possibly-abbreviated id against a set of known ids.
pub(crate) fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, given: &str) -> Result<String> {
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(given)).collect();
    match matches.len() {
        0 => bail!("No entry matching id '{given}'"),
        1 => Ok(matches[0].to_string()),
        n => bail!("Id '{given}' is ambiguous ({n} matches); give more characters"),
    }
}
