use clap::{CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dayplan", version, about = "Plan your day around your energy")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Morning check-in: record mood and energy and generate today's plan
    Checkin(commands::checkin::CheckinArgs),
    /// View and work through the day's plan
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// End-of-day reflection
    Reflect(commands::reflect::ReflectCommand),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Checkin(args) => commands::checkin::run(args),
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Reflect(cmd) => commands::reflect::run(cmd),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
