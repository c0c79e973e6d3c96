// crates/file-search/src/cli/file.rs
// File commands: list, get, delete, upload

use super::{Context, StoreFlags, complete, finish_batch, run_batch, single_success};
use anyhow::{Result, bail};
use clap::Subcommand;
use clap_complete::engine::ArgValueCompleter;
use file_search::FileSearchError;
use file_search::batch::DEFAULT_CONCURRENCY;
use file_search::gemini::{ChunkingOptions, StoreUpload, default_display_name};
use file_search::operation::Poller;
use file_search::resolve::resolve_file;
use file_search::transfer::{self, parse_metadata_pairs};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Subcommand)]
pub enum FileAction {
    /// List files in the Files API
    #[command(visible_alias = "ls")]
    List,

    /// Show one file
    Get {
        /// Display name or resource name
        #[arg(add = ArgValueCompleter::new(complete::files))]
        name: String,
    },

    /// Delete a file
    #[command(visible_aliases = ["rm", "del"])]
    Delete {
        /// Display name or resource name
        #[arg(add = ArgValueCompleter::new(complete::files))]
        name: String,
    },

    /// Upload local files, optionally indexing them into a store
    Upload(UploadArgs),
}

#[derive(clap::Args)]
pub struct UploadArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub store: StoreFlags,

    /// Display name (single file only; defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,

    /// MIME type (guessed from the extension when omitted)
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Max tokens per chunk (store uploads)
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Overlap tokens between chunks (store uploads)
    #[arg(long)]
    pub chunk_overlap: Option<u32>,

    /// Custom metadata as key=value (repeatable)
    #[arg(long = "metadata")]
    pub metadata: Vec<String>,

    /// Number of parallel uploads
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

pub async fn run(ctx: &Context, action: FileAction) -> Result<()> {
    match action {
        FileAction::List => {
            let gateway = ctx.gateway()?;
            let files = gateway.list_files().await?;
            ctx.print(files.as_slice())
        }
        FileAction::Get { name } => {
            let gateway = ctx.gateway()?;
            let file = resolve_file(gateway.as_ref(), &name).await?;
            let file = gateway.get_file(&file).await?;
            ctx.print(&file)
        }
        FileAction::Delete { name } => {
            let gateway = ctx.gateway()?;
            let file = resolve_file(gateway.as_ref(), &name).await?;
            gateway.delete_file(&file).await?;
            ctx.ack(
                &format!("Deleted file: {}", name),
                json!({ "status": "deleted", "file": file }),
            )
        }
        FileAction::Upload(args) => upload(ctx, args).await,
    }
}

fn base_name(path: &str) -> String {
    default_display_name(Path::new(path))
}

async fn upload(ctx: &Context, args: UploadArgs) -> Result<()> {
    if args.paths.len() > 1 && args.name.is_some() {
        bail!("cannot use --name with multiple files");
    }
    let gateway = ctx.gateway()?;
    let store = args.store.resolve_optional(gateway.as_ref()).await?;

    let template = Arc::new(StoreUpload {
        display_name: args.name,
        mime_type: args.mime_type.filter(|m| !m.is_empty()),
        chunking: ChunkingOptions {
            max_tokens_per_chunk: args.chunk_size.filter(|n| *n > 0),
            max_overlap_tokens: args.chunk_overlap.filter(|n| *n > 0),
        },
        metadata: parse_metadata_pairs(&args.metadata),
    });

    let cancel = CancellationToken::new();
    let op = {
        let gateway = gateway.clone();
        let store = store.clone();
        let cancel = cancel.clone();
        let reporter = ctx.reporter();
        move |path: String| {
            let gateway = gateway.clone();
            let store = store.clone();
            let template = template.clone();
            let cancel = cancel.clone();
            async move {
                let path = PathBuf::from(path);
                let mut opts = (*template).clone();
                let display_name = opts
                    .display_name
                    .get_or_insert_with(|| default_display_name(&path))
                    .clone();
                reporter.line(&format!("[+] Starting upload: {}", display_name));

                let poller = Poller::new("Indexing").quiet(true).with_cancel(cancel);
                transfer::upload(gateway.as_ref(), &path, store.as_deref(), &opts, &poller)
                    .await?;
                Ok::<(), FileSearchError>(())
            }
        }
    };

    let items = args
        .paths
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let result = run_batch(ctx, items, args.concurrency, cancel, base_name, op).await;
    finish_batch(ctx, &result, store.as_deref(), "some files failed to upload")?;

    if let Some(path) = single_success(ctx, &result) {
        println!("Uploaded file: {}", path);
    }
    Ok(())
}
