pub mod checkin;
pub mod completions;
pub mod config;
pub mod plan;
pub mod reflect;

use chrono::{Local, NaiveDate};
use dayplan_core::{Config, DayPlanner, PlanBlock, SqliteStore, TimeOfDay};

/// Planner over the on-disk store, plus the user id from config.
pub fn open_planner() -> Result<(DayPlanner<SqliteStore>, String), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = SqliteStore::open()?;
    Ok((DayPlanner::with_config(store, config.planner), config.user.id))
}

pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

pub fn now_or_clock(now: Option<TimeOfDay>) -> TimeOfDay {
    now.unwrap_or_else(|| TimeOfDay::from(Local::now().time()))
}

pub fn format_block(block: &PlanBlock) -> String {
    format!(
        "{}-{}  {:<5}  {} ({} min)",
        block.start, block.end, block.kind, block.title, block.duration
    )
}
