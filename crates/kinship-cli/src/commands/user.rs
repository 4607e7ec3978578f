//! User registration command

use clap::{Args, Subcommand};
use kinship_engine::commands::user::user_create;
use serde_json::json;

use super::{print_json, Context};

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a user that can own trees
    Add(AddArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub name: Option<String>,
}

pub fn execute(args: UserArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        UserCommand::Add(add) => {
            let user = user_create(add.name, add.email, &ctx.conn)?;
            // The e-mail is never echoed back
            print_json(&json!({ "id": user.id, "name": user.name }))
        }
    }
}
