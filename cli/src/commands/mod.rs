mod backup;
mod estimate;
mod exercise;
mod food;
mod helpers;
mod measure;
mod profile;
mod remind;
mod stats;
mod weight;

pub(crate) use backup::{cmd_export, cmd_import};
pub(crate) use estimate::{cmd_estimate_exercise, cmd_estimate_food};
pub(crate) use exercise::{
    cmd_exercise_delete, cmd_exercise_list, cmd_exercise_log, cmd_exercise_steps,
};
pub(crate) use food::{cmd_food_delete, cmd_food_list, cmd_food_log};
pub(crate) use measure::{MeasureArgs, cmd_measure_delete, cmd_measure_list, cmd_measure_log};
pub(crate) use profile::{
    cmd_profile_add, cmd_profile_edit, cmd_profile_list, cmd_profile_show, cmd_profile_switch,
};
pub(crate) use remind::{cmd_remind_add, cmd_remind_check, cmd_remind_list, cmd_remind_toggle};
pub(crate) use stats::{cmd_stats_chart, cmd_stats_day};
pub(crate) use weight::{cmd_weight_delete, cmd_weight_history, cmd_weight_log};
