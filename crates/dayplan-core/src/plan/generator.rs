//! Greedy day-plan generator.
//!
//! A single left-to-right sweep over the work window:
//! - events are sorted by start time and always emitted verbatim
//! - before each event, one focus block (plus a break) is inserted if it fits
//! - after the last event, focus/break pairs fill the window until no focus
//!   block fits before `work_end`
//!
//! Leftover time shorter than one focus block is left unscheduled.
//! Focus length is picked from the check-in's [`EnergyBand`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CalendarEvent, PlanBlock};
use crate::checkin::{EnergyBand, EnergyLevel};
use crate::error::ValidationError;
use crate::time_of_day::TimeOfDay;

/// Planner tuning. Serialized as the `[planner]` section of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Start of the work window used when a plan is created from a check-in
    #[serde(default = "default_work_start")]
    pub work_start: TimeOfDay,
    /// End of the work window
    #[serde(default = "default_work_end")]
    pub work_end: TimeOfDay,
    /// Break after each focus block (minutes)
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u16,
    /// Focus length for energy 1-2 (minutes)
    #[serde(default = "default_focus_low")]
    pub focus_low_minutes: u16,
    /// Focus length for energy 3 (minutes)
    #[serde(default = "default_focus_medium")]
    pub focus_medium_minutes: u16,
    /// Focus length for energy 4-5 (minutes)
    #[serde(default = "default_focus_high")]
    pub focus_high_minutes: u16,
}

fn default_work_start() -> TimeOfDay {
    TimeOfDay::from_hm(9, 0).unwrap_or(TimeOfDay::MIDNIGHT)
}
fn default_work_end() -> TimeOfDay {
    TimeOfDay::from_hm(17, 0).unwrap_or(TimeOfDay::LAST_MINUTE)
}
fn default_break_minutes() -> u16 {
    15
}
fn default_focus_low() -> u16 {
    45
}
fn default_focus_medium() -> u16 {
    60
}
fn default_focus_high() -> u16 {
    90
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            work_start: default_work_start(),
            work_end: default_work_end(),
            break_minutes: default_break_minutes(),
            focus_low_minutes: default_focus_low(),
            focus_medium_minutes: default_focus_medium(),
            focus_high_minutes: default_focus_high(),
        }
    }
}

impl PlannerConfig {
    pub fn focus_minutes(&self, energy: EnergyLevel) -> u16 {
        match energy.band() {
            EnergyBand::Low => self.focus_low_minutes,
            EnergyBand::Medium => self.focus_medium_minutes,
            EnergyBand::High => self.focus_high_minutes,
        }
    }

    /// Reject settings the generator cannot work with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_durations()?;
        if self.work_start >= self.work_end {
            return Err(ValidationError::InvalidValue {
                field: "planner.work_end".to_string(),
                message: format!(
                    "must be after planner.work_start ({} >= {})",
                    self.work_start, self.work_end
                ),
            });
        }
        Ok(())
    }

    fn validate_durations(&self) -> Result<(), ValidationError> {
        for (field, minutes) in [
            ("planner.break_minutes", self.break_minutes),
            ("planner.focus_low_minutes", self.focus_low_minutes),
            ("planner.focus_medium_minutes", self.focus_medium_minutes),
            ("planner.focus_high_minutes", self.focus_high_minutes),
        ] {
            if minutes == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must be at least 1 minute".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Day plan generator.
///
/// Stateless apart from its configuration; the same inputs always give the
/// same blocks.
#[derive(Debug, Clone, Default)]
pub struct PlanGenerator {
    config: PlannerConfig,
}

impl PlanGenerator {
    /// Create a generator with default durations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Generate blocks for `[work_start, work_end)`.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when an event has `end <= start`, when
    /// two events overlap, when events are supplied for an empty work window,
    /// or when the configured durations are zero.
    pub fn generate(
        &self,
        energy: EnergyLevel,
        events: &[CalendarEvent],
        work_start: TimeOfDay,
        work_end: TimeOfDay,
    ) -> Result<Vec<PlanBlock>, ValidationError> {
        self.config.validate_durations()?;

        if work_start >= work_end {
            if events.is_empty() {
                debug!(%work_start, %work_end, "empty work window, nothing to plan");
                return Ok(Vec::new());
            }
            return Err(ValidationError::EmptyWorkWindow {
                start: work_start,
                end: work_end,
                events: events.len(),
            });
        }

        let sorted = sorted_events(events)?;
        let focus = self.config.focus_minutes(energy);
        let rest = self.config.break_minutes;
        debug!(
            energy = energy.value(),
            focus_minutes = focus,
            events = sorted.len(),
            %work_start,
            %work_end,
            "generating day plan"
        );

        let mut blocks = Vec::new();
        let mut cursor = work_start;

        for event in sorted {
            if let Some(focus_end) = fits_before(cursor, focus, event.start) {
                blocks.push(PlanBlock::focus(cursor, focus_end));
                cursor = focus_end;
                // A break that would run into the event is skipped.
                if let Some(break_end) = fits_before(cursor, rest, event.start) {
                    blocks.push(PlanBlock::rest(cursor, break_end));
                    cursor = break_end;
                }
            }

            blocks.push(PlanBlock::from_event(event));
            // Always resume after the event, even one that ended before `work_start`.
            cursor = event.end;
        }

        while let Some(focus_end) = fits_before(cursor, focus, work_end) {
            blocks.push(PlanBlock::focus(cursor, focus_end));
            cursor = focus_end;
            if let Some(break_end) = fits_before(cursor, rest, work_end) {
                blocks.push(PlanBlock::rest(cursor, break_end));
                cursor = break_end;
            }
        }

        debug!(
            blocks = blocks.len(),
            unscheduled_minutes = cursor.minutes_until(work_end),
            "day plan generated"
        );
        Ok(blocks)
    }
}

/// Generate with the default durations (45/60/90 minute focus, 15 minute breaks).
pub fn generate(
    energy: EnergyLevel,
    events: &[CalendarEvent],
    work_start: TimeOfDay,
    work_end: TimeOfDay,
) -> Result<Vec<PlanBlock>, ValidationError> {
    PlanGenerator::new().generate(energy, events, work_start, work_end)
}

/// End of a `minutes` long block starting at `cursor`, if it ends by `limit`.
fn fits_before(cursor: TimeOfDay, minutes: u16, limit: TimeOfDay) -> Option<TimeOfDay> {
    cursor.checked_add(minutes).filter(|end| *end <= limit)
}

/// Validate events and sort them by start time, keeping input order on ties.
fn sorted_events(events: &[CalendarEvent]) -> Result<Vec<&CalendarEvent>, ValidationError> {
    for event in events {
        event.validate()?;
    }

    let mut sorted: Vec<&CalendarEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.start);

    for pair in sorted.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        if second.start < first.end {
            return Err(ValidationError::OverlappingEvents {
                first: first.title.clone(),
                first_end: first.end,
                second: second.title.clone(),
                second_start: second.start,
            });
        }
    }
    Ok(sorted)
}
