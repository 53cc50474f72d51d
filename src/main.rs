use clap::{Parser, Subcommand};

use wavesim::cli::commands;

#[derive(Parser)]
#[command(name = "wavesim")]
#[command(about = "An offline balance-simulation engine for wave-based defense games")]
#[command(version)]
struct Cli {
    /// Path to the enemy roster file
    #[arg(short, long, default_value = "enemies.toml")]
    enemies: String,

    /// Path to the balance parameter file
    #[arg(short, long, default_value = "balance.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project the full wave horizon and write a run report
    Run,

    /// Compose and time a single wave for inspection
    Compose {
        /// Wave index (1-based)
        #[arg(short, long)]
        wave: u32,
    },

    /// Manage run reports
    Reports {
        #[command(subcommand)]
        action: ReportAction,
    },
}

#[derive(Subcommand)]
enum ReportAction {
    /// List available run reports
    List {
        /// Report directory
        #[arg(short, long, default_value = "reports")]
        dir: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => commands::run(&cli.enemies, &cli.config),
        Commands::Compose { wave } => commands::compose(&cli.enemies, &cli.config, wave),
        Commands::Reports { action } => match action {
            ReportAction::List { dir } => commands::list_reports(&dir),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
