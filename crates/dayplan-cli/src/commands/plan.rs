//! Plan viewing and progress commands.

use chrono::NaiveDate;
use clap::Subcommand;
use dayplan_core::{BlockStatus, CalendarEvent, EnergyLevel, PlanSummary, TimeOfDay};

use super::{date_or_today, format_block, now_or_clock, open_planner};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Show the day's checklist, progress and next block
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Time of day (HH:MM) used to pick the next block, defaults to now
        #[arg(long)]
        now: Option<TimeOfDay>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a plan without saving it
    Preview {
        /// Energy, 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        energy: u8,
        /// Calendar event as "HH:MM-HH:MM Title" (repeatable)
        #[arg(long = "event")]
        events: Vec<CalendarEvent>,
        /// Work window start (HH:MM), defaults to config
        #[arg(long)]
        start: Option<TimeOfDay>,
        /// Work window end (HH:MM), defaults to config
        #[arg(long)]
        end: Option<TimeOfDay>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the block for the current time
    Next {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        now: Option<TimeOfDay>,
    },
    /// Mark the next block complete
    Complete {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List recent plans with their completion
    History {
        /// Number of days to show
        #[arg(long, default_value_t = 7)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PlanAction::Show { date, now, json } => show(date, now, json),
        PlanAction::Preview {
            energy,
            events,
            start,
            end,
            json,
        } => preview(energy, &events, start, end, json),
        PlanAction::Next { date, now } => next(date, now),
        PlanAction::Complete { date } => complete(date),
        PlanAction::History { limit, json } => history(limit, json),
    }
}

fn no_plan(date: NaiveDate) -> Box<dyn std::error::Error> {
    format!("no plan for {date}; run `dayplan checkin` first").into()
}

fn show(date: Option<NaiveDate>, now: Option<TimeOfDay>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (planner, user_id) = open_planner()?;
    let date = date_or_today(date);
    let now = now_or_clock(now);
    let view = planner.today(&user_id, date, now)?.ok_or_else(|| no_plan(date))?;

    if json {
        let out = serde_json::json!({
            "date": view.plan.date,
            "now": now,
            "progress": view.progress,
            "next": view.next_block(),
            "summary": view.summary,
            "checklist": view.checklist(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let p = view.progress;
    println!(
        "Plan for {date}: {}/{} done ({}%)",
        p.completed,
        p.total,
        p.percent()
    );
    println!();
    for item in view.checklist() {
        let mark = match item.status {
            BlockStatus::Done => "[x]",
            BlockStatus::Current => "[>]",
            BlockStatus::Pending => "[ ]",
        };
        println!("  {mark} {}", format_block(item.block));
    }
    println!();
    match view.next_block() {
        Some(block) if block.is_active_at(now) => println!("Now: {}", format_block(block)),
        Some(block) => println!("Up next: {}", format_block(block)),
        None => println!("Nothing left on the schedule."),
    }
    if p.all_done {
        println!("All blocks complete.");
    }
    Ok(())
}

fn preview(
    energy: u8,
    events: &[CalendarEvent],
    start: Option<TimeOfDay>,
    end: Option<TimeOfDay>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (planner, _) = open_planner()?;
    let cfg = planner.config();
    let start = start.unwrap_or(cfg.work_start);
    let end = end.unwrap_or(cfg.work_end);
    let energy = EnergyLevel::new(energy)?;

    let blocks = planner.generator().generate(energy, events, start, end)?;
    let summary = PlanSummary::new(&blocks, start, end);

    if json {
        let out = serde_json::json!({ "blocks": blocks, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Preview for energy {energy} ({}), {start}-{end}:", energy.label());
    for block in &blocks {
        println!("  {}", format_block(block));
    }
    println!("{} min unscheduled", summary.trailing_slack_minutes);
    Ok(())
}

fn next(date: Option<NaiveDate>, now: Option<TimeOfDay>) -> Result<(), Box<dyn std::error::Error>> {
    let (planner, user_id) = open_planner()?;
    let date = date_or_today(date);
    let now = now_or_clock(now);
    let view = planner.today(&user_id, date, now)?.ok_or_else(|| no_plan(date))?;

    match view.next_block() {
        Some(block) => println!("{}", format_block(block)),
        None => println!("Nothing left on the schedule."),
    }
    Ok(())
}

fn complete(date: Option<NaiveDate>) -> Result<(), Box<dyn std::error::Error>> {
    let (planner, user_id) = open_planner()?;
    let date = date_or_today(date);
    let before = planner.plan_for(&user_id, date)?.ok_or_else(|| no_plan(date))?;
    let plan = planner.complete_step(&user_id, date)?;

    let p = plan.progress();
    if plan.current_step == before.current_step {
        println!("All {} blocks already complete.", p.total);
        return Ok(());
    }

    let done = &plan.plan[plan.current_step - 1];
    println!("Completed: {}", format_block(done));
    println!("{}/{} done ({}%)", p.completed, p.total, p.percent());
    if p.all_done {
        println!("All blocks complete.");
    }
    Ok(())
}

fn history(limit: usize, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (planner, user_id) = open_planner()?;
    let plans = planner.history(&user_id, limit)?;

    if json {
        let out: Vec<_> = plans
            .iter()
            .map(|plan| {
                serde_json::json!({
                    "date": plan.date,
                    "progress": plan.progress(),
                    "summary": plan.summary(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if plans.is_empty() {
        println!("No plans yet.");
        return Ok(());
    }
    for plan in &plans {
        let p = plan.progress();
        let summary = plan.summary();
        println!(
            "{}  {:>2}/{:<2} done  {:>3} min focus  {}-{}",
            plan.date, p.completed, p.total, summary.focus_minutes, plan.work_start, plan.work_end
        );
    }
    Ok(())
}
