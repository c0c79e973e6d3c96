// crates/file-search/src/cli/store.rs
// Store commands: list, get, create, delete, import-file

use super::{Context, StoreFlags, complete, finish_batch, run_batch, single_success};
use anyhow::Result;
use clap::Subcommand;
use clap_complete::engine::ArgValueCompleter;
use file_search::FileSearchError;
use file_search::batch::DEFAULT_CONCURRENCY;
use file_search::operation::Poller;
use file_search::resolve::{resolve_file, resolve_store};
use file_search::transfer;
use serde_json::json;
use tokio_util::sync::CancellationToken;

#[derive(Subcommand)]
pub enum StoreAction {
    /// List all File Search stores
    #[command(visible_alias = "ls")]
    List,

    /// Show one store
    Get {
        /// Display name or resource name
        #[arg(add = ArgValueCompleter::new(complete::stores))]
        name: String,
    },

    /// Create a store
    #[command(visible_aliases = ["new", "add"])]
    Create {
        display_name: String,
    },

    /// Delete a store
    #[command(visible_aliases = ["rm", "del"])]
    Delete {
        /// Display name or resource name
        #[arg(add = ArgValueCompleter::new(complete::stores))]
        name: String,

        /// Delete even if the store still holds documents
        #[arg(long)]
        force: bool,
    },

    /// Import files from the Files API into a store
    ImportFile {
        /// File display names or resource names
        #[arg(required = true, add = ArgValueCompleter::new(complete::files))]
        files: Vec<String>,

        #[command(flatten)]
        store: StoreFlags,

        /// Number of parallel imports
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
}

pub async fn run(ctx: &Context, action: StoreAction) -> Result<()> {
    match action {
        StoreAction::List => {
            let gateway = ctx.gateway()?;
            let stores = gateway.list_stores().await?;
            ctx.print(stores.as_slice())
        }
        StoreAction::Get { name } => {
            let gateway = ctx.gateway()?;
            let store = resolve_store(gateway.as_ref(), &name).await?;
            let store = gateway.get_store(&store).await?;
            ctx.print(&store)
        }
        StoreAction::Create { display_name } => {
            let gateway = ctx.gateway()?;
            let store = gateway.create_store(&display_name).await?;
            if ctx.is_json() {
                return ctx.print(&store);
            }
            println!("Created store: {} ({})", store.display_name, store.name);
            Ok(())
        }
        StoreAction::Delete { name, force } => {
            let gateway = ctx.gateway()?;
            let store = resolve_store(gateway.as_ref(), &name).await?;
            gateway.delete_store(&store, force).await?;
            ctx.ack(
                &format!("Deleted store: {}", name),
                json!({ "status": "deleted", "name": store }),
            )
        }
        StoreAction::ImportFile {
            files,
            store,
            concurrency,
        } => import_files(ctx, files, store, concurrency).await,
    }
}

async fn import_files(
    ctx: &Context,
    files: Vec<String>,
    flags: StoreFlags,
    concurrency: usize,
) -> Result<()> {
    if !flags.is_set() {
        anyhow::bail!("either --store or --store-id is required");
    }
    let gateway = ctx.gateway()?;
    let store = flags.resolve(gateway.as_ref()).await?;

    let cancel = CancellationToken::new();
    let op = {
        let gateway = gateway.clone();
        let store = store.clone();
        let cancel = cancel.clone();
        let reporter = ctx.reporter();
        move |reference: String| {
            let gateway = gateway.clone();
            let store = store.clone();
            let cancel = cancel.clone();
            async move {
                let file = resolve_file(gateway.as_ref(), &reference).await?;
                reporter.line(&format!("[+] Starting import: {}", reference));
                // Per-item indicators would interleave; progress lines cover it
                let poller = Poller::new("Importing").quiet(true).with_cancel(cancel);
                transfer::import(gateway.as_ref(), &file, &store, &poller).await?;
                Ok::<(), FileSearchError>(())
            }
        }
    };

    let result = run_batch(ctx, files, concurrency, cancel, str::to_string, op).await;
    finish_batch(ctx, &result, Some(&store), "some files failed to import")?;

    if let Some(file) = single_success(ctx, &result) {
        println!("Imported file: {} to store: {}", file, store);
    }
    Ok(())
}
