//! Daily flow over a [`PlanStore`]: check in, follow the plan, reflect.
//!
//! The generator and tracker stay pure; this is the only place that reads
//! a stored plan, applies a tracker operation and commits the result.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::checkin::{CheckIn, EnergyLevel, Mood};
use crate::error::{CoreError, Result};
use crate::plan::tracker::{self, ChecklistItem, Progress};
use crate::plan::{CalendarEvent, DayPlan, PlanBlock, PlanGenerator, PlanSummary, PlannerConfig};
use crate::reflection::{Rating, Reflection};
use crate::storage::PlanStore;
use crate::time_of_day::TimeOfDay;

/// Snapshot of one day's plan at a given time of day.
#[derive(Debug, Clone, Serialize)]
pub struct TodayView {
    pub plan: DayPlan,
    pub progress: Progress,
    /// Index into `plan.plan` of the block implied by the clock.
    pub next_index: Option<usize>,
    pub summary: PlanSummary,
}

impl TodayView {
    pub fn next_block(&self) -> Option<&PlanBlock> {
        self.next_index.map(|i| &self.plan.plan[i])
    }

    pub fn checklist(&self) -> Vec<ChecklistItem<'_>> {
        tracker::checklist(&self.plan)
    }
}

/// Ties plan generation and progress tracking to persisted records.
pub struct DayPlanner<S: PlanStore> {
    store: S,
    generator: PlanGenerator,
}

impl<S: PlanStore> DayPlanner<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, PlannerConfig::default())
    }

    pub fn with_config(store: S, config: PlannerConfig) -> Self {
        Self {
            store,
            generator: PlanGenerator::with_config(config),
        }
    }

    pub fn generator(&self) -> &PlanGenerator {
        &self.generator
    }

    pub fn config(&self) -> &PlannerConfig {
        self.generator.config()
    }

    /// Blocks the configured work window would get, without saving anything.
    pub fn preview(&self, energy: EnergyLevel, events: &[CalendarEvent]) -> Result<Vec<PlanBlock>> {
        let cfg = self.config();
        Ok(self
            .generator
            .generate(energy, events, cfg.work_start, cfg.work_end)?)
    }

    /// Record the day's check-in and (re)generate its plan.
    ///
    /// Checking in again on the same date replaces both records and resets
    /// the plan's cursor. Both records are written in one transaction, and
    /// nothing is written if the events are invalid.
    pub fn check_in(
        &self,
        user_id: &str,
        date: NaiveDate,
        mood: Mood,
        energy: EnergyLevel,
        note: Option<String>,
        events: &[CalendarEvent],
    ) -> Result<(CheckIn, DayPlan)> {
        let blocks = self.preview(energy, events)?;
        let (work_start, work_end) = (self.config().work_start, self.config().work_end);

        let (check_in, plan) = self.store.atomically(|store| {
            let check_in = store.upsert_check_in(&CheckIn::new(user_id, date, mood, energy, note))?;
            let fresh = DayPlan::new(user_id, &check_in.id, date, blocks, work_start, work_end);
            let plan = store.upsert_plan(&fresh)?;
            Ok((check_in, plan))
        })?;
        info!(
            user = %user_id,
            %date,
            energy = energy.value(),
            blocks = plan.plan.len(),
            "checked in"
        );
        Ok((check_in, plan))
    }

    pub fn check_in_for(&self, user_id: &str, date: NaiveDate) -> Result<Option<CheckIn>> {
        self.store.fetch_check_in(user_id, date)
    }

    pub fn plan_for(&self, user_id: &str, date: NaiveDate) -> Result<Option<DayPlan>> {
        self.store.fetch_plan(user_id, date)
    }

    /// Plan, progress and next block for `date` as of `now`.
    pub fn today(&self, user_id: &str, date: NaiveDate, now: TimeOfDay) -> Result<Option<TodayView>> {
        let Some(plan) = self.store.fetch_plan(user_id, date)? else {
            return Ok(None);
        };
        Ok(Some(TodayView {
            progress: tracker::progress(&plan),
            next_index: tracker::next_block_index(&plan, now),
            summary: plan.summary(),
            plan,
        }))
    }

    /// The user's most recent plans, newest date first.
    pub fn history(&self, user_id: &str, limit: usize) -> Result<Vec<DayPlan>> {
        self.store.list_plans(user_id, limit)
    }

    /// Mark the next block of the day complete.
    ///
    /// A finished plan is returned unchanged.
    ///
    /// # Errors
    /// [`CoreError::MissingRecord`] when there is no plan for the date, and
    /// [`crate::error::DatabaseError::StaleStep`] when another completion
    /// landed after the plan was read.
    pub fn complete_step(&self, user_id: &str, date: NaiveDate) -> Result<DayPlan> {
        let plan = self
            .store
            .fetch_plan(user_id, date)?
            .ok_or_else(|| CoreError::MissingRecord {
                kind: "day plan",
                user_id: user_id.to_string(),
                date,
            })?;

        if plan.progress().all_done {
            debug!(plan = %plan.id, "all blocks already complete");
            return Ok(plan);
        }

        let next = tracker::advance(&plan);
        self.store
            .update_current_step(&plan.id, plan.current_step, next.current_step)
    }

    /// Record the end-of-day reflection, linked to the day's plan if any.
    pub fn reflect(
        &self,
        user_id: &str,
        date: NaiveDate,
        rating: Option<Rating>,
        notes: Option<String>,
    ) -> Result<Reflection> {
        let plan_id = self.store.fetch_plan(user_id, date)?.map(|p| p.id);
        let reflection = self
            .store
            .upsert_reflection(&Reflection::new(user_id, date, plan_id, rating, notes))?;
        info!(user = %user_id, %date, rating = ?reflection.rating.map(Rating::value), "reflected");
        Ok(reflection)
    }

    pub fn reflection_for(&self, user_id: &str, date: NaiveDate) -> Result<Option<Reflection>> {
        self.store.fetch_reflection(user_id, date)
    }
}
