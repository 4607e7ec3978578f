//! Matching commands: index a member now, list matches

use clap::{Args, Subcommand};
use kinship_engine::commands::matching::{index_member, matches_for_tree, matches_for_user};
use kinship_engine::TracingNotifier;

use super::{print_json, Context};

#[derive(Debug, Args)]
pub struct MatchArgs {
    #[command(subcommand)]
    pub command: MatchCommand,
}

#[derive(Debug, Subcommand)]
pub enum MatchCommand {
    /// Index one member synchronously
    Index(IndexArgs),
    /// List live matches for a user or a tree
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    #[arg(long)]
    pub member: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, conflicts_with = "tree")]
    pub user: Option<String>,

    #[arg(long, conflicts_with = "user")]
    pub tree: Option<String>,
}

pub fn execute(args: MatchArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        MatchCommand::Index(index) => {
            let policy = ctx.config.match_policy();
            print_json(&index_member(&index.member, &policy, &TracingNotifier, &ctx.conn)?)
        }
        MatchCommand::List(list) => {
            let records = match (list.user, list.tree) {
                (Some(user), _) => matches_for_user(&user, &ctx.conn)?,
                (None, Some(tree)) => matches_for_tree(&tree, &ctx.conn)?,
                (None, None) => return Err("Must specify either --user or --tree".into()),
            };
            print_json(&records)
        }
    }
}
