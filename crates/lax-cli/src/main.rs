//! lax CLI
//!
//! Command-line interface for article-json ingestion and publication.
//! Every command prints one JSON object on stdout.

use clap::{Parser, Subcommand};
use lax_core::lax_core_types::RequestId;
use lax_core::logging_facility;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "lax")]
#[command(about = "lax - article-json ingestion and publication", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest an article-json document without publishing it
    Ingest(commands::ingest::IngestArgs),
    /// Publish an ingested article version
    Publish(commands::publish::PublishArgs),
    /// Ingest and publish in one transaction
    IngestPublish(commands::ingest_publish::IngestPublishArgs),
    /// Fragment operations (add, get, rm)
    Fragment(commands::fragment::FragmentArgs),
    /// Merge, validate and store an article version's fragments
    Merge(commands::merge::MergeArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.global.log_format.profile());

    let request_id = RequestId::new();
    let span = tracing::info_span!("lax", request_id = %request_id);
    let _entered = span.enter();

    let result = commands::Context::open(&cli.global)
        .and_then(|mut ctx| match cli.command {
            Commands::Ingest(args) => commands::ingest::execute(args, &mut ctx),
            Commands::Publish(args) => commands::publish::execute(args, &mut ctx),
            Commands::IngestPublish(args) => commands::ingest_publish::execute(args, &mut ctx),
            Commands::Fragment(args) => commands::fragment::execute(args, &mut ctx),
            Commands::Merge(args) => commands::merge::execute(args, &mut ctx),
        })
        .map_err(|e| e.with_request_id(request_id.clone()));

    match result {
        Ok(response) => println!("{}", response),
        Err(e) => {
            println!("{}", commands::error_response(&e));
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
