//! `lax merge`

use clap::Args;
use lax_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use lax_store::errors::Result;
use serde_json::{json, Value};

use super::{unexpected, Context};

pub const STATUS_MERGED: &str = "merged";

#[derive(Debug, Args)]
pub struct MergeArgs {
    #[arg(long)]
    pub id: i64,

    #[arg(long)]
    pub version: u32,
}

/// A merge that fails validation is reported with `"valid": false`; the
/// stored version is left as it was.
pub fn execute(args: MergeArgs, ctx: &mut Context) -> Result<Value> {
    let cmd = EngineCommand::Merge {
        msid: args.id,
        version: args.version,
    };

    match apply_engine_command(cmd, &mut ctx.conn, ctx.schemas)? {
        EngineCommandResult::Merged(merged) => Ok(json!({
            "status": STATUS_MERGED,
            "id": args.id,
            "version": args.version,
            "valid": merged.is_some(),
        })),
        other => Err(unexpected(&other)),
    }
}
