//! `lax fragment add|get|rm`

use std::path::PathBuf;

use clap::{Args, Subcommand};
use lax_core::model::fragment::DEFAULT_POSITION;
use lax_engine::commands::fragments::FragmentTarget;
use lax_engine::{apply_engine_command, EngineCommand, EngineCommandResult};
use lax_store::errors::Result;
use serde_json::{json, Value};

use super::{read_json, unexpected, Context};

#[derive(Debug, Args)]
pub struct FragmentArgs {
    #[command(subcommand)]
    pub command: FragmentCommand,
}

#[derive(Debug, Subcommand)]
pub enum FragmentCommand {
    /// Store a fragment from a JSON file
    Add(AddArgs),
    /// Print a stored fragment
    Get(TargetArgs),
    /// Delete a stored fragment
    Rm(TargetArgs),
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Manuscript id
    #[arg(long)]
    pub id: i64,

    /// Scope to one version; omitted means article-wide
    #[arg(long)]
    pub version: Option<u32>,

    #[arg(long = "type")]
    pub fragment_type: String,
}

impl TargetArgs {
    fn target(&self) -> FragmentTarget {
        FragmentTarget::new(self.id, self.version)
    }

    fn response(&self, status: &str) -> Value {
        json!({
            "status": status,
            "id": self.id,
            "version": self.version,
            "type": self.fragment_type,
        })
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Merge order; lower positions are merged first
    #[arg(long, default_value_t = DEFAULT_POSITION)]
    pub position: i64,

    /// Overwrite an existing fragment of the same type
    #[arg(long)]
    pub update: bool,

    /// JSON object file, or `-` for stdin
    pub path: PathBuf,
}

pub fn execute(args: FragmentArgs, ctx: &mut Context) -> Result<Value> {
    match args.command {
        FragmentCommand::Add(add_args) => execute_add(add_args, ctx),
        FragmentCommand::Get(target_args) => execute_get(target_args, ctx),
        FragmentCommand::Rm(target_args) => execute_rm(target_args, ctx),
    }
}

fn execute_add(args: AddArgs, ctx: &mut Context) -> Result<Value> {
    let fragment = read_json(&args.path)?;
    let cmd = EngineCommand::FragmentAdd {
        target: args.target.target(),
        fragment_type: args.target.fragment_type.clone(),
        fragment,
        position: args.position,
        update: args.update,
    };

    match apply_engine_command(cmd, &mut ctx.conn, ctx.schemas)? {
        EngineCommandResult::FragmentAdded(stored) => {
            let mut response = args.target.response("added");
            response["position"] = json!(stored.position);
            Ok(response)
        }
        other => Err(unexpected(&other)),
    }
}

fn execute_get(args: TargetArgs, ctx: &mut Context) -> Result<Value> {
    let cmd = EngineCommand::FragmentGet {
        target: args.target(),
        fragment_type: args.fragment_type.clone(),
    };

    match apply_engine_command(cmd, &mut ctx.conn, ctx.schemas)? {
        EngineCommandResult::Fragment(fragment) => {
            let mut response = args.response("found");
            response["fragment"] = fragment;
            Ok(response)
        }
        other => Err(unexpected(&other)),
    }
}

fn execute_rm(args: TargetArgs, ctx: &mut Context) -> Result<Value> {
    let cmd = EngineCommand::FragmentRemove {
        target: args.target(),
        fragment_type: args.fragment_type.clone(),
    };

    match apply_engine_command(cmd, &mut ctx.conn, ctx.schemas)? {
        EngineCommandResult::FragmentRemoved => Ok(args.response("removed")),
        other => Err(unexpected(&other)),
    }
}
