//! Morning check-in.

use chrono::NaiveDate;
use clap::Args;
use dayplan_core::{CalendarEvent, EnergyLevel, Mood};

use super::{date_or_today, format_block, open_planner};

#[derive(Args)]
pub struct CheckinArgs {
    /// Mood, 1 (awful) to 5 (great)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    mood: u8,
    /// Energy, 1 (drained) to 5 (energized)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    energy: u8,
    /// Free-form note
    #[arg(long)]
    note: Option<String>,
    /// Calendar event as "HH:MM-HH:MM Title" (repeatable)
    #[arg(long = "event")]
    events: Vec<CalendarEvent>,
    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CheckinArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (planner, user_id) = open_planner()?;
    let date = date_or_today(args.date);
    let mood = Mood::new(args.mood)?;
    let energy = EnergyLevel::new(args.energy)?;

    let (check_in, plan) = planner.check_in(&user_id, date, mood, energy, args.note, &args.events)?;

    if args.json {
        let out = serde_json::json!({ "check_in": check_in, "plan": plan });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let summary = plan.summary();
    println!(
        "Checked in for {date}: mood {} ({}), energy {} ({})",
        mood,
        mood.label(),
        energy,
        energy.label()
    );
    println!();
    if plan.plan.is_empty() {
        println!("No blocks fit in {}-{}.", plan.work_start, plan.work_end);
    }
    for block in &plan.plan {
        println!("  {}", format_block(block));
    }
    println!();
    println!(
        "{} focus blocks ({} min), {} min of breaks, {} min unscheduled",
        summary.focus_blocks, summary.focus_minutes, summary.break_minutes, summary.trailing_slack_minutes
    );
    Ok(())
}
