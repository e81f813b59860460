//! `lax publish`

use clap::Args;
use lax_core::datetime::Timestamp;
use lax_engine::{apply_engine_command, EngineCommand, EngineCommandResult, PublishOptions};
use lax_store::errors::Result;
use serde_json::Value;

use super::{unexpected, version_response, Context};

pub const STATUS_PUBLISHED: &str = "published";

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Manuscript id
    #[arg(long)]
    pub id: i64,

    #[arg(long)]
    pub version: u32,

    /// Publication time; naive values are read as UTC. Defaults to now.
    #[arg(long)]
    pub datetime: Option<String>,

    /// Re-stamp a version that is already published
    #[arg(long)]
    pub force: bool,

    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: PublishArgs, ctx: &mut Context) -> Result<Value> {
    let cmd = EngineCommand::Publish {
        msid: args.id,
        version: args.version,
        published_at: args.datetime.map(Timestamp::from),
        options: PublishOptions {
            force: args.force,
            dry_run: args.dry_run,
        },
    };

    match apply_engine_command(cmd, &mut ctx.conn, ctx.schemas)? {
        EngineCommandResult::Published(av) => Ok(version_response(
            STATUS_PUBLISHED,
            args.id,
            &av,
            args.dry_run,
        )),
        other => Err(unexpected(&other)),
    }
}
