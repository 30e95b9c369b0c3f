//! Day plan types: calendar events in, time blocks out.
//!
//! - [`generator`] turns a check-in's energy and the day's calendar into blocks
//! - [`tracker`] reports the next block by clock and advances the completion cursor
//! - [`summary`] derives read-only totals (including unscheduled trailing slack)

pub mod generator;
pub mod summary;
pub mod tracker;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time_of_day::TimeOfDay;

pub use generator::{generate, PlanGenerator, PlannerConfig};
pub use summary::PlanSummary;
pub use tracker::{BlockStatus, ChecklistItem, Progress};

pub const FOCUS_TITLE: &str = "Focus Block";
pub const BREAK_TITLE: &str = "Break";

/// Kind of plan block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Fixed calendar event, copied verbatim
    Event,
    /// Energy-sized deep work
    Focus,
    /// Rest between focus blocks
    Break,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Event => "event",
            BlockKind::Focus => "focus",
            BlockKind::Break => "break",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A fixed, immovable reservation on the user's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl CalendarEvent {
    /// Create an event, rejecting empty or inverted ranges.
    pub fn new(
        title: impl Into<String>,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<Self, ValidationError> {
        let event = Self {
            title: title.into(),
            start,
            end,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end <= self.start {
            return Err(ValidationError::InvalidTimeRange {
                title: self.title.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> u16 {
        self.start.minutes_until(self.end)
    }
}

/// Parses `HH:MM-HH:MM Title`, e.g. `09:00-09:30 Standup`.
impl FromStr for CalendarEvent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ValidationError::InvalidValue {
            field: "event".to_string(),
            message: format!("{message} in '{s}' (expected 'HH:MM-HH:MM Title')"),
        };

        let (range, title) = s
            .trim()
            .split_once(char::is_whitespace)
            .ok_or_else(|| invalid("missing title"))?;
        let title = title.trim();
        if title.is_empty() {
            return Err(invalid("missing title"));
        }
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| invalid("missing '-' between start and end"))?;

        Self::new(title, start.parse()?, end.parse()?)
    }
}

/// One scheduled interval of a day plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub title: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// Minutes, always `end - start`.
    pub duration: u16,
}

impl PlanBlock {
    fn new(kind: BlockKind, title: impl Into<String>, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            kind,
            title: title.into(),
            start,
            end,
            duration: start.minutes_until(end),
        }
    }

    pub fn focus(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self::new(BlockKind::Focus, FOCUS_TITLE, start, end)
    }

    pub fn rest(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self::new(BlockKind::Break, BREAK_TITLE, start, end)
    }

    pub fn from_event(event: &CalendarEvent) -> Self {
        Self::new(BlockKind::Event, event.title.clone(), event.start, event.end)
    }

    /// True while `now` is inside `[start, end)`.
    pub fn is_active_at(&self, now: TimeOfDay) -> bool {
        self.start <= now && now < self.end
    }
}

/// A user's plan for one calendar date.
///
/// `plan` is fixed once generated; only `current_step` moves, and only
/// forward (see [`tracker::advance`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub id: String,
    pub user_id: String,
    pub check_in_id: String,
    pub date: NaiveDate,
    pub plan: Vec<PlanBlock>,
    /// Number of blocks marked complete, `0..=plan.len()`.
    pub current_step: usize,
    /// Work window the blocks were generated for.
    pub work_start: TimeOfDay,
    pub work_end: TimeOfDay,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DayPlan {
    /// Wrap blocks generated for `[work_start, work_end)` with the cursor at zero.
    pub fn new(
        user_id: impl Into<String>,
        check_in_id: impl Into<String>,
        date: NaiveDate,
        plan: Vec<PlanBlock>,
        work_start: TimeOfDay,
        work_end: TimeOfDay,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            check_in_id: check_in_id.into(),
            date,
            plan,
            current_step: 0,
            work_start,
            work_end,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn progress(&self) -> Progress {
        tracker::progress(self)
    }

    pub fn next_block(&self, now: TimeOfDay) -> Option<&PlanBlock> {
        tracker::next_block(self, now)
    }

    /// Totals against the window this plan was generated for.
    pub fn summary(&self) -> PlanSummary {
        PlanSummary::new(&self.plan, self.work_start, self.work_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn event_rejects_inverted_range() {
        assert!(CalendarEvent::new("Standup", t("10:00"), t("10:00")).is_err());
        assert!(CalendarEvent::new("Standup", t("10:00"), t("09:30")).is_err());
        assert!(CalendarEvent::new("Standup", t("09:30"), t("10:00")).is_ok());
    }

    #[test]
    fn event_parses_range_and_title() {
        let event: CalendarEvent = "09:00-10:15 Design review".parse().unwrap();
        assert_eq!(event.title, "Design review");
        assert_eq!(event.start, t("09:00"));
        assert_eq!(event.end, t("10:15"));
        assert_eq!(event.duration_minutes(), 75);
    }

    #[test]
    fn event_parse_errors() {
        assert!("09:00-10:00".parse::<CalendarEvent>().is_err());
        assert!("09:00 Lunch".parse::<CalendarEvent>().is_err());
        assert!("9:00-10:00 Lunch".parse::<CalendarEvent>().is_err());
        assert!("11:00-10:00 Lunch".parse::<CalendarEvent>().is_err());
    }

    #[test]
    fn block_serializes_with_type_key() {
        let block = PlanBlock::focus(t("09:00"), t("10:30"));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "focus");
        assert_eq!(json["title"], "Focus Block");
        assert_eq!(json["start"], "09:00");
        assert_eq!(json["end"], "10:30");
        assert_eq!(json["duration"], 90);
    }

    #[test]
    fn event_block_copies_event_verbatim() {
        let event = CalendarEvent::new("1:1", t("14:00"), t("14:30")).unwrap();
        let block = PlanBlock::from_event(&event);
        assert_eq!(block.kind, BlockKind::Event);
        assert_eq!(block.title, "1:1");
        assert_eq!((block.start, block.end, block.duration), (event.start, event.end, 30));
    }

    #[test]
    fn new_day_plan_starts_at_step_zero() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let plan = DayPlan::new(
            "u1",
            "c1",
            date,
            vec![PlanBlock::rest(t("10:00"), t("10:15"))],
            t("09:00"),
            t("11:00"),
        );
        assert_eq!(plan.current_step, 0);
        assert_eq!(plan.created_at, plan.updated_at);
    }

    #[test]
    fn summary_uses_the_plan_window() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let blocks = vec![PlanBlock::focus(t("09:00"), t("10:00"))];
        let plan = DayPlan::new("u1", "c1", date, blocks, t("09:00"), t("12:00"));
        assert_eq!(plan.summary().trailing_slack_minutes, 120);
    }
}
