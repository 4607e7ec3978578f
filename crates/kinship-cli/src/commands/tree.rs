//! Tree commands: create, list, render

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use kinship_core::model::{Gender, NewMember};
use kinship_engine::commands::tree::{tree_create, tree_list_for_user, tree_render};

use super::{print_json, Context};

#[derive(Debug, Args)]
pub struct TreeArgs {
    #[command(subcommand)]
    pub command: TreeCommand,
}

#[derive(Debug, Subcommand)]
pub enum TreeCommand {
    /// Create a tree with its first member
    Create(CreateArgs),
    /// List a user's trees, newest first
    List(ListArgs),
    /// Render a tree as nested JSON
    Render(RenderArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub user: String,

    #[arg(long)]
    pub title: String,

    /// Name of the first member
    #[arg(long)]
    pub root_name: String,

    /// male | female | other | unknown
    #[arg(long, default_value = "unknown")]
    pub root_gender: String,

    /// Birth date of the first member (YYYY-MM-DD)
    #[arg(long)]
    pub root_birth: Option<NaiveDate>,

    #[arg(long)]
    pub root_location: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub user: String,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[arg(long)]
    pub tree: String,

    /// Override the configured depth bound
    #[arg(long)]
    pub max_depth: Option<usize>,
}

pub fn execute(args: TreeArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        TreeCommand::Create(create) => execute_create(create, ctx),
        TreeCommand::List(list) => print_json(&tree_list_for_user(&list.user, &ctx.conn)?),
        TreeCommand::Render(render) => {
            let mut limits = ctx.config.render_limits();
            if let Some(depth) = render.max_depth {
                limits.max_depth = depth.max(1);
            }
            print_json(&tree_render(&render.tree, limits, &ctx.conn)?)
        }
    }
}

fn execute_create(args: CreateArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    let gender: Gender = args.root_gender.parse()?;
    let mut root = NewMember::new(args.root_name, gender);
    root.birth_date = args.root_birth;
    root.location = args.root_location;

    let (conn, queue) = ctx.parts();
    let tree = tree_create(&args.user, args.title, root, conn, queue)?;
    print_json(&tree)
}
