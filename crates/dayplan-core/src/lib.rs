//! # Dayplan Core Library
//!
//! Core logic for dayplan, a personal day-planning assistant. The CLI binary
//! is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Plan generation**: a morning check-in's energy level plus the day's
//!   calendar events become an ordered list of event, focus and break blocks
//! - **Progress tracking**: the next block is derived from the clock, while
//!   completion is a cursor the user advances one block at a time
//! - **Storage**: SQLite records keyed by (user, date) and TOML configuration
//!
//! ## Key Components
//!
//! - [`PlanGenerator`]: Greedy energy-based block generator
//! - [`plan::tracker`]: Next block, cursor advance, progress and checklist
//! - [`DayPlanner`]: Check-in, completion and reflection over a [`PlanStore`]
//! - [`Config`]: Application configuration management

mod scale;

pub mod checkin;
pub mod error;
pub mod plan;
pub mod planner;
pub mod reflection;
pub mod storage;
pub mod time_of_day;

pub use checkin::{CheckIn, EnergyBand, EnergyLevel, Mood};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use plan::{
    generate, BlockKind, BlockStatus, CalendarEvent, ChecklistItem, DayPlan, PlanBlock,
    PlanGenerator, PlanSummary, PlannerConfig, Progress,
};
pub use planner::{DayPlanner, TodayView};
pub use reflection::{Rating, Reflection};
pub use storage::{Config, PlanStore, SqliteStore};
pub use time_of_day::TimeOfDay;
