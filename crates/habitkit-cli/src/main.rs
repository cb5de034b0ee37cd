use clap::{Parser, Subcommand};
use habitkit_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitkit", version, about = "habitkit: habit streaks from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Revert the last habit change
    Undo,
    /// Sort, filter and day-rollover settings
    View {
        #[command(subcommand)]
        action: commands::view::ViewAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Filter precedence: `HABITKIT_LOG`, then `RUST_LOG`, then `logging.filter`.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env("HABITKIT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action, &config),
        Commands::Undo => commands::undo::run(&config),
        Commands::View { action } => commands::view::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
