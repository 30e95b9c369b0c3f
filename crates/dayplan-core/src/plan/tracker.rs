//! Progress tracking over a [`DayPlan`].
//!
//! Two independent notions of progress:
//! - **clock**: [`next_block`] compares `now` against block end times, so it
//!   keeps working when the user is ahead of or behind schedule
//! - **cursor**: [`advance`] counts blocks the user marked complete
//!
//! Neither reads the wall clock; callers pass `now` in.

use serde::Serialize;

use super::{DayPlan, PlanBlock};
use crate::time_of_day::TimeOfDay;

/// Index of the first block that has not ended by `now`.
pub fn next_block_index(plan: &DayPlan, now: TimeOfDay) -> Option<usize> {
    plan.plan.iter().position(|block| block.end > now)
}

/// The block the user should be doing, or about to start, at `now`.
///
/// Returns `None` once every block has ended, or for an empty plan.
pub fn next_block(plan: &DayPlan, now: TimeOfDay) -> Option<&PlanBlock> {
    next_block_index(plan, now).map(|i| &plan.plan[i])
}

/// Mark one more block complete.
///
/// The cursor never passes the number of blocks, so calling this on a
/// finished (or empty) plan returns an unchanged copy.
pub fn advance(plan: &DayPlan) -> DayPlan {
    let mut next = plan.clone();
    next.current_step = plan.current_step.saturating_add(1).min(plan.plan.len());
    next
}

/// Completion counts derived from the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub all_done: bool,
    /// `completed / total`; `None` for a plan with no blocks.
    pub fraction: Option<f64>,
}

impl Progress {
    /// Whole percent for display. An empty plan counts as finished.
    pub fn percent(&self) -> u8 {
        self.fraction
            .map(|f| (f * 100.0).round().clamp(0.0, 100.0) as u8)
            .unwrap_or(100)
    }
}

pub fn progress(plan: &DayPlan) -> Progress {
    let total = plan.plan.len();
    let completed = plan.current_step.min(total);
    Progress {
        completed,
        total,
        all_done: completed >= total,
        fraction: (total > 0).then(|| completed as f64 / total as f64),
    }
}

/// Checklist state of one block, relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    Done,
    Current,
    Pending,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItem<'a> {
    pub index: usize,
    pub status: BlockStatus,
    #[serde(flatten)]
    pub block: &'a PlanBlock,
}

/// Every block paired with its cursor-derived status.
pub fn checklist(plan: &DayPlan) -> Vec<ChecklistItem<'_>> {
    plan.plan
        .iter()
        .enumerate()
        .map(|(index, block)| ChecklistItem {
            index,
            status: match index.cmp(&plan.current_step) {
                std::cmp::Ordering::Less => BlockStatus::Done,
                std::cmp::Ordering::Equal => BlockStatus::Current,
                std::cmp::Ordering::Greater => BlockStatus::Pending,
            },
            block,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::EnergyLevel;
    use crate::plan::generate;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn full_day(level: u8) -> DayPlan {
        let blocks = generate(EnergyLevel::new(level).unwrap(), &[], t("09:00"), t("17:00")).unwrap();
        DayPlan::new("u1", "c1", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), blocks, t("09:00"), t("17:00"))
    }

    fn empty_plan() -> DayPlan {
        DayPlan::new("u1", "c1", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), Vec::new(), t("09:00"), t("17:00"))
    }

    #[test]
    fn next_block_before_day_starts_is_first_block() {
        let plan = full_day(5);
        assert_eq!(next_block_index(&plan, t("07:00")), Some(0));
    }

    #[test]
    fn next_block_is_active_block() {
        let plan = full_day(5);
        let block = next_block(&plan, t("10:00")).unwrap();
        assert_eq!((block.start, block.end), (t("09:00"), t("10:30")));
        assert!(block.is_active_at(t("10:00")));
    }

    #[test]
    fn block_end_is_exclusive() {
        let plan = full_day(5);
        let block = next_block(&plan, t("10:30")).unwrap();
        assert_eq!(block.title, "Break");
    }

    #[test]
    fn next_block_none_after_last_end() {
        let plan = full_day(5);
        assert!(next_block(&plan, t("16:00")).is_none());
        assert!(next_block(&plan, t("23:59")).is_none());
    }

    #[test]
    fn next_block_ignores_cursor() {
        let mut plan = full_day(5);
        plan.current_step = 6;
        assert_eq!(next_block_index(&plan, t("09:05")), Some(0));
    }

    #[test]
    fn advance_increments_by_one() {
        let plan = full_day(5);
        let next = advance(&plan);
        assert_eq!(next.current_step, 1);
        assert_eq!(plan.current_step, 0, "input is left untouched");
        assert_eq!(next.plan, plan.plan);
    }

    #[test]
    fn advance_clamps_at_plan_length() {
        let mut plan = full_day(5);
        let len = plan.plan.len();
        for _ in 0..len {
            plan = advance(&plan);
        }
        assert_eq!(plan.current_step, len);
        plan = advance(&plan);
        assert_eq!(plan.current_step, len);
    }

    #[test]
    fn empty_plan_does_not_fault() {
        let plan = empty_plan();
        assert!(next_block(&plan, t("12:00")).is_none());
        assert_eq!(advance(&plan).current_step, 0);

        let p = progress(&plan);
        assert_eq!((p.completed, p.total), (0, 0));
        assert!(p.all_done);
        assert!(p.fraction.is_none());
        assert_eq!(p.percent(), 100);
    }

    #[test]
    fn eight_completed_blocks_are_all_done() {
        let mut plan = full_day(5);
        assert_eq!(plan.plan.len(), 8);
        plan.current_step = 8;

        let p = plan.progress();
        assert!(p.all_done);
        assert_eq!(p.fraction, Some(1.0));
        assert!(plan.next_block(t("16:30")).is_none());
    }

    #[test]
    fn progress_fraction() {
        let mut plan = full_day(5);
        plan.current_step = 2;
        let p = progress(&plan);
        assert_eq!(p.completed, 2);
        assert!(!p.all_done);
        assert_eq!(p.fraction, Some(0.25));
        assert_eq!(p.percent(), 25);
    }

    #[test]
    fn checklist_marks_done_current_pending() {
        let mut plan = full_day(5);
        plan.current_step = 1;
        let items = checklist(&plan);
        assert_eq!(items[0].status, BlockStatus::Done);
        assert_eq!(items[1].status, BlockStatus::Current);
        assert!(items[2..].iter().all(|i| i.status == BlockStatus::Pending));
    }

    #[test]
    fn checklist_has_no_current_when_finished() {
        let mut plan = full_day(3);
        plan.current_step = plan.plan.len();
        assert!(checklist(&plan).iter().all(|i| i.status == BlockStatus::Done));
    }

    #[test]
    fn checklist_item_serializes_flat() {
        let plan = full_day(3);
        let items = checklist(&plan);
        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["status"], "current");
        assert_eq!(json["type"], "focus");
        assert_eq!(json["start"], "09:00");
    }

    proptest! {
        #[test]
        fn next_block_index_is_monotonic(level in 1u8..=5, a in 0u16..1440, b in 0u16..1440) {
            let plan = full_day(level);
            let (early, late) = (a.min(b), a.max(b));
            let i = next_block_index(&plan, TimeOfDay::from_minutes(early).unwrap());
            let j = next_block_index(&plan, TimeOfDay::from_minutes(late).unwrap());
            // None means "past the end", which sorts after every index.
            let rank = |x: Option<usize>| x.unwrap_or(usize::MAX);
            prop_assert!(rank(i) <= rank(j));
        }

        #[test]
        fn cursor_never_exceeds_length(level in 1u8..=5, taps in 0usize..30) {
            let mut plan = full_day(level);
            for _ in 0..taps {
                plan = advance(&plan);
            }
            prop_assert_eq!(plan.current_step, taps.min(plan.plan.len()));
        }
    }
}
