//! Member commands: add, show, update, delete

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use kinship_engine::commands::member::{
    member_add_with_relation, member_delete, member_get, member_update_profile, AddMemberRequest,
};

use super::{print_json, Context};

#[derive(Debug, Args)]
pub struct MemberArgs {
    #[command(subcommand)]
    pub command: MemberCommand,
}

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// Add a member related to an existing one
    Add(AddArgs),
    /// Show a member with parents, children and spouses
    Show(ShowArgs),
    /// Update location and/or image reference
    Update(UpdateArgs),
    /// Delete a member and every link touching it
    Delete(ShowArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub tree: String,

    /// Existing member the new one is related to
    #[arg(long)]
    pub related: String,

    /// parent | child | spouse | sibling
    #[arg(long)]
    pub relation: String,

    #[arg(long)]
    pub name: String,

    /// male | female | other | unknown
    #[arg(long, default_value = "unknown")]
    pub gender: String,

    #[arg(long)]
    pub birth: Option<NaiveDate>,

    #[arg(long)]
    pub death: Option<NaiveDate>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub image: Option<String>,

    /// father | mother | parent (defaults from gender)
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub member: String,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub member: String,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub image: Option<String>,
}

pub fn execute(args: MemberArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        MemberCommand::Add(add) => {
            let request = AddMemberRequest {
                tree_id: add.tree,
                related_member_id: add.related,
                relation_type: add.relation,
                name: add.name,
                gender: add.gender,
                birth_date: add.birth,
                death_date: add.death,
                location: add.location,
                image_ref: add.image,
                role: add.role,
            };
            let (conn, queue) = ctx.parts();
            print_json(&member_add_with_relation(request, conn, queue)?)
        }
        MemberCommand::Show(show) => print_json(&member_get(&show.member, &ctx.conn)?),
        MemberCommand::Update(update) => {
            if update.location.is_none() && update.image.is_none() {
                return Err("Must specify --location and/or --image".into());
            }
            let (conn, queue) = ctx.parts();
            let member =
                member_update_profile(&update.member, update.location, update.image, conn, queue)?;
            print_json(&member)
        }
        MemberCommand::Delete(delete) => print_json(&member_delete(&delete.member, &mut ctx.conn)?),
    }
}
