//! `lax ingest`

use std::path::PathBuf;

use clap::Args;
use lax_engine::{apply_engine_command, EngineCommand, EngineCommandResult, IngestOptions};
use lax_store::errors::Result;
use serde_json::Value;

use super::{read_json, unexpected, version_response, Context};

pub const STATUS_INGESTED: &str = "ingested";

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// article-json file, or `-` for stdin
    pub path: PathBuf,

    /// Overwrite the data of an already published version
    #[arg(long)]
    pub force: bool,

    #[arg(long)]
    pub dry_run: bool,

    /// Merge and validate the version's fragments after writing it
    #[arg(long)]
    pub merge: bool,
}

pub fn execute(args: IngestArgs, ctx: &mut Context) -> Result<Value> {
    let data = read_json(&args.path)?;
    let cmd = EngineCommand::Ingest {
        data,
        options: IngestOptions {
            force: args.force,
            dry_run: args.dry_run,
        },
        merge: args.merge,
    };

    match apply_engine_command(cmd, &mut ctx.conn, ctx.schemas)? {
        EngineCommandResult::Ingested(r) => Ok(version_response(
            STATUS_INGESTED,
            r.article.manuscript_id,
            &r.article_version,
            args.dry_run,
        )),
        other => Err(unexpected(&other)),
    }
}
