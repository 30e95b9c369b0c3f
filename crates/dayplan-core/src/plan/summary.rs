//! Read-only totals for a generated plan.
//!
//! Trailing slack (work-window time after the last block) is never emitted
//! as a block; it is reported here instead.

use serde::Serialize;

use super::{BlockKind, PlanBlock};
use crate::time_of_day::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlanSummary {
    pub focus_blocks: usize,
    pub focus_minutes: u32,
    pub break_minutes: u32,
    pub event_minutes: u32,
    /// Minutes between the end of the last block and `work_end`.
    pub trailing_slack_minutes: u16,
}

impl PlanSummary {
    pub fn new(blocks: &[PlanBlock], work_start: TimeOfDay, work_end: TimeOfDay) -> Self {
        let mut summary = Self::default();
        for block in blocks {
            let minutes = u32::from(block.duration);
            match block.kind {
                BlockKind::Focus => {
                    summary.focus_blocks += 1;
                    summary.focus_minutes += minutes;
                }
                BlockKind::Break => summary.break_minutes += minutes,
                BlockKind::Event => summary.event_minutes += minutes,
            }
        }

        let last_end = blocks
            .iter()
            .map(|b| b.end)
            .max()
            .map_or(work_start, |end| end.max(work_start));
        summary.trailing_slack_minutes = last_end.minutes_until(work_end);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::EnergyLevel;
    use crate::plan::{generate, CalendarEvent};

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn high_energy_day_leaves_an_hour() {
        let blocks = generate(EnergyLevel::new(5).unwrap(), &[], t("09:00"), t("17:00")).unwrap();
        let summary = PlanSummary::new(&blocks, t("09:00"), t("17:00"));
        assert_eq!(summary.focus_blocks, 4);
        assert_eq!(summary.focus_minutes, 360);
        assert_eq!(summary.break_minutes, 60);
        assert_eq!(summary.event_minutes, 0);
        assert_eq!(summary.trailing_slack_minutes, 60);
    }

    #[test]
    fn counts_event_minutes() {
        let events = vec![CalendarEvent::new("Lunch", t("12:00"), t("13:00")).unwrap()];
        let blocks = generate(EnergyLevel::new(3).unwrap(), &events, t("09:00"), t("17:00")).unwrap();
        let summary = PlanSummary::new(&blocks, t("09:00"), t("17:00"));
        assert_eq!(summary.event_minutes, 60);
    }

    #[test]
    fn empty_plan_is_all_slack() {
        let summary = PlanSummary::new(&[], t("09:00"), t("09:40"));
        assert_eq!(summary.trailing_slack_minutes, 40);
        assert_eq!(summary.focus_blocks, 0);
    }

    #[test]
    fn no_slack_when_events_run_past_window() {
        let events = vec![CalendarEvent::new("Dinner", t("19:00"), t("20:00")).unwrap()];
        let blocks = generate(EnergyLevel::new(3).unwrap(), &events, t("09:00"), t("17:00")).unwrap();
        assert_eq!(PlanSummary::new(&blocks, t("09:00"), t("17:00")).trailing_slack_minutes, 0);
    }
}
