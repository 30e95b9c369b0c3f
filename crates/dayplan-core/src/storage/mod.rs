//! Persistence for check-ins, day plans and reflections, plus TOML config.
//!
//! The plan generator and tracker never touch storage; [`PlanStore`] is the
//! collaborator the [`crate::DayPlanner`] reads from and commits to.

mod config;
pub mod migrations;
pub mod sqlite;

pub use config::{Config, UserConfig};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::checkin::CheckIn;
use crate::error::{ConfigError, Result};
use crate::plan::DayPlan;
use crate::reflection::Reflection;

/// Records keyed by (user, date).
///
/// Upserts replace the day's record in place and keep its id.
pub trait PlanStore {
    fn fetch_check_in(&self, user_id: &str, date: NaiveDate) -> Result<Option<CheckIn>>;

    fn upsert_check_in(&self, check_in: &CheckIn) -> Result<CheckIn>;

    fn fetch_plan(&self, user_id: &str, date: NaiveDate) -> Result<Option<DayPlan>>;

    /// Store a freshly generated plan.
    ///
    /// An existing plan for the same (user, date) keeps its id and gets the
    /// new blocks and window with the cursor reset to zero.
    fn upsert_plan(&self, plan: &DayPlan) -> Result<DayPlan>;

    /// Plans for a user, most recent date first.
    fn list_plans(&self, user_id: &str, limit: usize) -> Result<Vec<DayPlan>>;

    /// Move the cursor from `expected` to `new_step` atomically.
    ///
    /// # Errors
    /// [`crate::error::DatabaseError::StaleStep`] if the stored cursor is no
    /// longer `expected`, so two concurrent completions cannot both apply.
    fn update_current_step(&self, plan_id: &str, expected: usize, new_step: usize) -> Result<DayPlan>;

    fn fetch_reflection(&self, user_id: &str, date: NaiveDate) -> Result<Option<Reflection>>;

    fn upsert_reflection(&self, reflection: &Reflection) -> Result<Reflection>;

    /// Run `f` so that either all of its writes land or none do.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>;
}

/// Returns the data directory.
///
/// `DAYPLAN_HOME` wins when set. Otherwise `~/.config/dayplan[-dev]/`, where
/// `DAYPLAN_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DAYPLAN_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAYPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dayplan-dev")
            } else {
                base_dir.join("dayplan")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
