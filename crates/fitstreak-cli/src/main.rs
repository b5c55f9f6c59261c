use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod store;

#[derive(Parser)]
#[command(name = "fitstreak", version, about = "Fitstreak workout tracker CLI")]
struct Cli {
    /// Whose plan, session and progress to use
    #[arg(long, global = true, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Workout plan resolution
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Guided workout session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Streak, XP and level
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Badge catalog and unlocks
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let user = cli.user.as_str();
    let result = match cli.command {
        Commands::Plan { action } => commands::plan::run(action, user),
        Commands::Session { action } => commands::session::run(action, user),
        Commands::Profile { action } => commands::profile::run(action, user),
        Commands::Badges { action } => commands::badges::run(action, user),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
