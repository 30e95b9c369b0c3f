//! End-of-day reflection.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use dayplan_core::{Rating, TimeOfDay};

use super::{date_or_today, open_planner};

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ReflectCommand {
    #[command(subcommand)]
    action: Option<ReflectAction>,
    /// How the day went, 1 (terrible) to 5 (excellent)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    rating: Option<u8>,
    /// What went well, what to change
    #[arg(long)]
    notes: Option<String>,
    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum ReflectAction {
    /// Show the recorded reflection
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(cmd: ReflectCommand) -> Result<(), Box<dyn std::error::Error>> {
    let (planner, user_id) = open_planner()?;

    if let Some(ReflectAction::Show { date, json }) = cmd.action {
        let date = date_or_today(date);
        let reflection = planner
            .reflection_for(&user_id, date)?
            .ok_or_else(|| format!("no reflection for {date}"))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&reflection)?);
            return Ok(());
        }
        println!("Reflection for {date}");
        match reflection.rating {
            Some(rating) => println!("  Rating: {rating} ({})", rating.label()),
            None => println!("  Rating: -"),
        }
        if let Some(notes) = &reflection.notes {
            println!("  Notes:  {notes}");
        }
        return Ok(());
    }

    if cmd.rating.is_none() && cmd.notes.is_none() {
        return Err("provide --rating and/or --notes".into());
    }

    let date = date_or_today(cmd.date);
    let rating = cmd.rating.map(Rating::new).transpose()?;
    let reflection = planner.reflect(&user_id, date, rating, cmd.notes)?;

    print!("Reflection saved for {date}");
    match reflection.rating {
        Some(rating) => println!(": {rating} ({})", rating.label()),
        None => println!(),
    }
    if let Some(plan) = planner.today(&user_id, date, TimeOfDay::LAST_MINUTE)? {
        println!(
            "Plan progress: {}/{} blocks",
            plan.progress.completed, plan.progress.total
        );
    }
    Ok(())
}
