//! Spouse commands: link, end

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use kinship_engine::commands::spouse::{spouse_end, spouse_link};

use super::{print_json, Context};

#[derive(Debug, Args)]
pub struct SpouseArgs {
    #[command(subcommand)]
    pub command: SpouseCommand,
}

#[derive(Debug, Subcommand)]
pub enum SpouseCommand {
    /// Link two members of the same tree as spouses
    Link(PairArgs),
    /// Record the end of a spouse relationship
    End(EndArgs),
}

#[derive(Debug, Args)]
pub struct PairArgs {
    #[arg(long)]
    pub a: String,

    #[arg(long)]
    pub b: String,
}

#[derive(Debug, Args)]
pub struct EndArgs {
    #[command(flatten)]
    pub pair: PairArgs,

    /// End date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn execute(args: SpouseArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        SpouseCommand::Link(pair) => print_json(&spouse_link(&pair.a, &pair.b, &mut ctx.conn)?),
        SpouseCommand::End(end) => print_json(&spouse_end(
            &end.pair.a,
            &end.pair.b,
            end.date,
            &mut ctx.conn,
        )?),
    }
}
