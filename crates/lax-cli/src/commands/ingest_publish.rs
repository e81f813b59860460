//! `lax ingest-publish`: ingest then publish, committed together or not at all

use std::path::PathBuf;

use clap::Args;
use lax_engine::{apply_engine_command, EngineCommand, EngineCommandResult, IngestOptions};
use lax_store::errors::Result;
use serde_json::Value;

use super::publish::STATUS_PUBLISHED;
use super::{read_json, unexpected, version_response, Context};

#[derive(Debug, Args)]
pub struct IngestPublishArgs {
    /// article-json file, or `-` for stdin
    pub path: PathBuf,

    #[arg(long)]
    pub force: bool,

    /// Run both steps, report the outcome, keep nothing
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub merge: bool,
}

pub fn execute(args: IngestPublishArgs, ctx: &mut Context) -> Result<Value> {
    let data = read_json(&args.path)?;
    let cmd = EngineCommand::IngestPublish {
        data,
        options: IngestOptions {
            force: args.force,
            dry_run: args.dry_run,
        },
        merge: args.merge,
    };

    match apply_engine_command(cmd, &mut ctx.conn, ctx.schemas)? {
        EngineCommandResult::IngestedPublished(r) => Ok(version_response(
            STATUS_PUBLISHED,
            r.article.manuscript_id,
            &r.article_version,
            args.dry_run,
        )),
        other => Err(unexpected(&other)),
    }
}
