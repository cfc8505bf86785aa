mod commands;
mod config;
mod gemini;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    MeasureArgs, cmd_estimate_exercise, cmd_estimate_food, cmd_exercise_delete, cmd_exercise_list,
    cmd_exercise_log, cmd_exercise_steps, cmd_export, cmd_food_delete, cmd_food_list, cmd_food_log,
    cmd_import, cmd_measure_delete, cmd_measure_list, cmd_measure_log, cmd_profile_add,
    cmd_profile_edit, cmd_profile_list, cmd_profile_show, cmd_profile_switch, cmd_remind_add,
    cmd_remind_check, cmd_remind_list, cmd_remind_toggle, cmd_stats_chart, cmd_stats_day,
    cmd_weight_delete, cmd_weight_history, cmd_weight_log,
};
use crate::config::Config;
use crate::gemini::GeminiClient;
use vital_core::service::Tracker;

#[derive(Parser)]
#[command(
    name = "vital",
    version,
    about = "A personal health tracker CLI",
    long_about = "\n\n  ██╗   ██╗██╗████████╗ █████╗ ██╗
  ██║   ██║██║╚══██╔══╝██╔══██╗██║
  ██║   ██║██║   ██║   ███████║██║
  ╚██╗ ██╔╝██║   ██║   ██╔══██║██║
   ╚████╔╝ ██║   ██║   ██║  ██║███████╗
    ╚═══╝  ╚═╝   ╚═╝   ╚═╝  ╚═╝╚══════╝
        know how your day adds up.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tracking profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Log and review food intake
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Log and review exercise
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Track body measurements
    Measure {
        #[command(subcommand)]
        command: MeasureCommands,
    },
    /// Daily calorie balance and chart series
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },
    /// AI calorie estimation for food and exercise
    Estimate {
        #[command(subcommand)]
        command: EstimateCommands,
    },
    /// Logging reminders
    Remind {
        #[command(subcommand)]
        command: RemindCommands,
    },
    /// Export all data to a JSON backup file
    Export {
        /// Output path
        #[arg(default_value = "vital-backup.json")]
        output: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore from a JSON backup file (replaces ALL existing data)
    Import {
        /// Backup file path
        input: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Add a new profile
    Add {
        /// Profile name
        name: String,
        /// Gender: male or female (drives the BMR formula)
        #[arg(short, long)]
        gender: String,
        /// Age in years
        #[arg(short, long)]
        age: u32,
        /// Height in centimetres
        #[arg(long)]
        height: u32,
        /// Target weight in kg
        #[arg(long)]
        target: Option<f64>,
        /// Switch to the new profile immediately
        #[arg(long)]
        switch: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all profiles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Switch the active profile
    Switch {
        /// Profile ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the active profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit the active profile
    Edit {
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New gender: male or female
        #[arg(short, long)]
        gender: Option<String>,
        /// New age in years
        #[arg(short, long)]
        age: Option<u32>,
        /// New height in centimetres
        #[arg(long)]
        height: Option<u32>,
        /// New target weight in kg
        #[arg(long)]
        target: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Log a food entry
    Log {
        /// Food name
        name: String,
        /// Calories (kcal)
        calories: f64,
        /// Protein in grams
        #[arg(short, long)]
        protein: Option<f64>,
        /// Carbs in grams
        #[arg(short, long)]
        carbs: Option<f64>,
        /// Fat in grams
        #[arg(short, long)]
        fat: Option<f64>,
        /// Meal type: breakfast, lunch, dinner, snack
        #[arg(short, long)]
        meal: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List food entries for a day
    List {
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food entry
    Delete {
        /// Entry ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommands {
    /// Log an exercise entry
    Log {
        /// Activity name
        name: String,
        /// Duration in minutes
        minutes: f64,
        /// Calories burned (kcal)
        calories: f64,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List exercise entries for a day
    List {
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an exercise entry
    Delete {
        /// Entry ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sync a cumulative step-counter total for a day
    Steps {
        /// Today's total step count from your pedometer
        total: u32,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log a weight entry
    Log {
        /// Weight, optionally suffixed with kg or lbs (default: kg)
        weight: String,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weight history
    History {
        /// Number of most recent entries to show
        #[arg(short, long, default_value = "30")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a weight entry
    Delete {
        /// Entry ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MeasureCommands {
    /// Log body measurements (cm)
    Log {
        #[arg(long)]
        bust: Option<f64>,
        #[arg(long)]
        waist: Option<f64>,
        #[arg(long)]
        tummy: Option<f64>,
        #[arg(long)]
        hips: Option<f64>,
        #[arg(long)]
        thigh_left: Option<f64>,
        #[arg(long)]
        thigh_right: Option<f64>,
        #[arg(long)]
        arm_left: Option<f64>,
        #[arg(long)]
        arm_right: Option<f64>,
        #[arg(long)]
        calf_left: Option<f64>,
        #[arg(long)]
        calf_right: Option<f64>,
        /// Weight in kg taken during the same session (also logged to weight)
        #[arg(long)]
        weight: Option<f64>,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List measurement entries
    List {
        /// Number of most recent entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a measurement entry
    Delete {
        /// Entry ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Daily calorie balance (defaults to today)
    Day {
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chart a metric over a trailing window
    Chart {
        /// Metric: intake, burned, or minutes
        #[arg(default_value = "intake")]
        metric: String,
        /// Window size in days, ending today
        #[arg(short, long, default_value = "7")]
        days: i64,
        /// Bucket granularity: day, week, or month
        #[arg(short, long, default_value = "day")]
        granularity: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum EstimateCommands {
    /// Estimate nutrition from a photo and/or description
    Food {
        /// Path to a JPEG photo of the food
        #[arg(short, long)]
        image: Option<String>,
        /// Text description of the food
        #[arg(short, long)]
        desc: Option<String>,
        /// Log the estimate as a food entry
        #[arg(long)]
        log: bool,
        /// Date for the logged entry (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate calories burned for an activity
    Exercise {
        /// Activity description (e.g. "brisk walking")
        activity: String,
        /// Duration in minutes
        minutes: f64,
        /// Log the estimate as an exercise entry
        #[arg(long)]
        log: bool,
        /// Date for the logged entry (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RemindCommands {
    /// Add a logging reminder
    Add {
        /// Time of day, HH:MM (24h)
        time: String,
        /// Days: all, weekdays, weekends, or e.g. "mon,wed,fri"
        #[arg(short, long, default_value = "all")]
        days: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List reminders for the active profile
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enable/disable a reminder
    Toggle {
        /// Reminder ID (or unique prefix)
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print reminders due right now (for cron or shell hooks)
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let mut tracker = Tracker::open(&config.db_path)?;

    match cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Add {
                name,
                gender,
                age,
                height,
                target,
                switch,
                json,
            } => cmd_profile_add(&mut tracker, &name, &gender, age, height, target, switch, json),
            ProfileCommands::List { json } => cmd_profile_list(&tracker, json),
            ProfileCommands::Switch { id, json } => cmd_profile_switch(&mut tracker, &id, json),
            ProfileCommands::Show { json } => cmd_profile_show(&tracker, json),
            ProfileCommands::Edit {
                name,
                gender,
                age,
                height,
                target,
                json,
            } => cmd_profile_edit(&mut tracker, name, gender, age, height, target, json),
        },
        Commands::Food { command } => match command {
            FoodCommands::Log {
                name,
                calories,
                protein,
                carbs,
                fat,
                meal,
                date,
                json,
            } => cmd_food_log(
                &mut tracker,
                &name,
                calories,
                protein,
                carbs,
                fat,
                meal,
                date,
                json,
            ),
            FoodCommands::List { date, json } => cmd_food_list(&tracker, date, json),
            FoodCommands::Delete { id, json } => cmd_food_delete(&mut tracker, &id, json),
        },
        Commands::Exercise { command } => match command {
            ExerciseCommands::Log {
                name,
                minutes,
                calories,
                date,
                json,
            } => cmd_exercise_log(&mut tracker, &name, minutes, calories, date, json),
            ExerciseCommands::List { date, json } => cmd_exercise_list(&tracker, date, json),
            ExerciseCommands::Delete { id, json } => cmd_exercise_delete(&mut tracker, &id, json),
            ExerciseCommands::Steps { total, date, json } => {
                cmd_exercise_steps(&mut tracker, total, date, json)
            }
        },
        Commands::Weight { command } => match command {
            WeightCommands::Log { weight, date, json } => {
                cmd_weight_log(&mut tracker, &weight, date, json)
            }
            WeightCommands::History { limit, json } => cmd_weight_history(&tracker, limit, json),
            WeightCommands::Delete { id, json } => cmd_weight_delete(&mut tracker, &id, json),
        },
        Commands::Measure { command } => match command {
            MeasureCommands::Log {
                bust,
                waist,
                tummy,
                hips,
                thigh_left,
                thigh_right,
                arm_left,
                arm_right,
                calf_left,
                calf_right,
                weight,
                date,
                json,
            } => cmd_measure_log(
                &mut tracker,
                MeasureArgs {
                    bust,
                    waist,
                    tummy,
                    hips,
                    thigh_left,
                    thigh_right,
                    arm_left,
                    arm_right,
                    calf_left,
                    calf_right,
                    weight_kg: weight,
                },
                date,
                json,
            ),
            MeasureCommands::List { limit, json } => cmd_measure_list(&tracker, limit, json),
            MeasureCommands::Delete { id, json } => cmd_measure_delete(&mut tracker, &id, json),
        },
        Commands::Stats { command } => match command {
            StatsCommands::Day { date, json } => cmd_stats_day(&tracker, date, json),
            StatsCommands::Chart {
                metric,
                days,
                granularity,
                json,
            } => cmd_stats_chart(&tracker, &metric, days, &granularity, json),
        },
        Commands::Estimate { command } => {
            let provider = GeminiClient::new(config.load_api_key()?);
            match command {
                EstimateCommands::Food {
                    image,
                    desc,
                    log,
                    date,
                    json,
                } => cmd_estimate_food(&mut tracker, &provider, image, desc, log, date, json),
                EstimateCommands::Exercise {
                    activity,
                    minutes,
                    log,
                    date,
                    json,
                } => cmd_estimate_exercise(
                    &mut tracker,
                    &provider,
                    &activity,
                    minutes,
                    log,
                    date,
                    json,
                ),
            }
        }
        Commands::Remind { command } => match command {
            RemindCommands::Add { time, days, json } => {
                cmd_remind_add(&mut tracker, &time, &days, json)
            }
            RemindCommands::List { json } => cmd_remind_list(&tracker, json),
            RemindCommands::Toggle { id, json } => cmd_remind_toggle(&mut tracker, &id, json),
            RemindCommands::Check { json } => cmd_remind_check(&mut tracker, json),
        },
        Commands::Export { output, json } => cmd_export(&tracker, &output, json),
        Commands::Import { input, yes, json } => cmd_import(&mut tracker, &input, yes, json),
    }
}
