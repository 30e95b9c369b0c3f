//! `config.toml` inspection and editing.

use clap::Subcommand;
use dayplan_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `planner.work_start`
    Get { key: String },
    /// Change one value; rejected if it leaves the planner settings invalid
    Set { key: String, value: String },
    /// Print the whole configuration
    List {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Restore the defaults
    Reset,
    /// Print where the configuration file lives
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    if let ConfigAction::Reset = action {
        Config::default().save()?;
        println!("config reset to defaults");
        return Ok(());
    }
    if let ConfigAction::Path = action {
        println!("{}", Config::path()?.display());
        return Ok(());
    }

    let mut config = Config::load()?;
    match action {
        ConfigAction::Get { key } => {
            let value = config.get(&key).ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let before = config.get(&key);
            config.set(&key, &value)?;
            match before {
                Some(old) if old != value => println!("{key}: {old} -> {value}"),
                _ => println!("{key} = {value}"),
            }
        }
        ConfigAction::List { json: true } => println!("{}", serde_json::to_string_pretty(&config)?),
        ConfigAction::List { json: false } => print!("{}", toml::to_string_pretty(&config)?),
        ConfigAction::Reset | ConfigAction::Path => {}
    }
    Ok(())
}
