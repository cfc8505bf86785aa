use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use vital_core::models::Macros;
use vital_core::service::Tracker;

use super::helpers::{parse_date, resolve_id, short_id, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_food_log(
    tracker: &mut Tracker,
    name: &str,
    calories: f64,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    meal: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = date.map(|s| parse_date(Some(s))).transpose()?;
    let macros = match (protein, carbs, fat) {
        (None, None, None) => None,
        (p, c, f) => Some(Macros {
            protein: p.unwrap_or(0.0),
            carbs: c.unwrap_or(0.0),
            fat: f.unwrap_or(0.0),
        }),
    };

    let entry = tracker.log_food(name, calories, macros, meal, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Logged '{}' ({:.0} kcal) [{}]",
            entry.name,
            entry.calories,
            short_id(&entry.id)
        );
    }
    Ok(())
}

pub(crate) fn cmd_food_list(tracker: &Tracker, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let entries: Vec<_> = tracker
        .foods()
        .iter()
        .filter(|f| vital_core::models::entry_date(&f.date) == Some(date))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No food logged for {date}. Use `vital food log` to add an entry.");
    } else {
        #[derive(Tabled)]
        struct FoodRow {
            #[tabled(rename = "ID")]
            id: String,
            #[tabled(rename = "Name")]
            name: String,
            #[tabled(rename = "Meal")]
            meal: String,
            #[tabled(rename = "Calories")]
            calories: String,
            #[tabled(rename = "P (g)")]
            protein: String,
            #[tabled(rename = "C (g)")]
            carbs: String,
            #[tabled(rename = "F (g)")]
            fat: String,
        }

        let rows: Vec<FoodRow> = entries
            .iter()
            .map(|f| FoodRow {
                id: short_id(&f.id),
                name: truncate(&f.name, 35),
                meal: f.meal_type.clone().unwrap_or_default(),
                calories: format!("{:.0}", f.calories),
                protein: f.macros.map_or("-".into(), |m| format!("{:.1}", m.protein)),
                carbs: f.macros.map_or("-".into(), |m| format!("{:.1}", m.carbs)),
                fat: f.macros.map_or("-".into(), |m| format!("{:.1}", m.fat)),
            })
            .collect();

        let total: f64 = entries.iter().map(|f| f.calories).sum();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(3..7)).with(Alignment::right()))
            .to_string();
        println!("{table}");
        println!("Total: {total:.0} kcal");
    }
    Ok(())
}

pub(crate) fn cmd_food_delete(tracker: &mut Tracker, id: &str, json: bool) -> Result<()> {
    let full_id = resolve_id(tracker.foods().iter().map(|f| f.id.as_str()), id)?;
    tracker.delete_food(&full_id);

    if json {
        println!("{}", serde_json::json!({ "deleted": full_id }));
    } else {
        println!("Deleted food entry {}", short_id(&full_id));
    }
    Ok(())
}
