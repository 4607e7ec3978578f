//! Kinship CLI
//!
//! Command-line front end over the kinship engine

use clap::{Parser, Subcommand};

mod commands;

use commands::Context;

#[derive(Debug, Parser)]
#[command(name = "kinship")]
#[command(about = "Kinship - Family trees with cross-tree ancestor matching", long_about = None)]
struct Cli {
    /// SQLite database path (overrides config and KINSHIP_DB_PATH)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// User registration
    User(commands::user::UserArgs),
    /// Tree operations (create, list, render)
    Tree(commands::tree::TreeArgs),
    /// Member operations (add, show, update, delete)
    Member(commands::member::MemberArgs),
    /// Spouse operations (link, end)
    Spouse(commands::spouse::SpouseArgs),
    /// Ancestor matching (index, list)
    Match(commands::matching::MatchArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::open(cli.db.as_deref())?;

    let result = match cli.command {
        Commands::User(args) => commands::user::execute(args, &mut ctx),
        Commands::Tree(args) => commands::tree::execute(args, &mut ctx),
        Commands::Member(args) => commands::member::execute(args, &mut ctx),
        Commands::Spouse(args) => commands::spouse::execute(args, &mut ctx),
        Commands::Match(args) => commands::matching::execute(args, &mut ctx),
    };

    // Queued indexing jobs finish even when the command failed
    ctx.finish();
    result
}
