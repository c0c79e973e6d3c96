// crates/file-search/src/cli/document.rs
// Document commands: list, get, delete

use super::{Context, StoreFlags, complete};
use anyhow::Result;
use clap::Subcommand;
use clap_complete::engine::ArgValueCompleter;
use file_search::constants::ResourceKind;
use file_search::resolve::resolve;
use serde_json::json;

#[derive(Subcommand)]
pub enum DocumentAction {
    /// List the documents in a store
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        store: StoreFlags,
    },

    /// Show one document
    Get {
        /// Display name (needs --store or --store-id) or resource name
        #[arg(add = ArgValueCompleter::new(complete::documents))]
        name: String,

        #[command(flatten)]
        store: StoreFlags,
    },

    /// Delete a document
    #[command(visible_aliases = ["rm", "del"])]
    Delete {
        /// Display name (needs --store or --store-id) or resource name
        #[arg(add = ArgValueCompleter::new(complete::documents))]
        name: String,

        #[command(flatten)]
        store: StoreFlags,

        /// Delete the document's chunks too
        #[arg(long)]
        force: bool,
    },
}

/// The store reference used to scope a document lookup. A display name
/// wins over an id, and either one goes through store resolution.
fn scope(flags: &StoreFlags) -> Option<&str> {
    flags
        .store
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(flags.store_id.as_deref().filter(|s| !s.is_empty()))
}

pub async fn run(ctx: &Context, action: DocumentAction) -> Result<()> {
    let gateway = ctx.gateway()?;
    let gateway = gateway.as_ref();

    match action {
        DocumentAction::List { store } => {
            let store = store.resolve(gateway).await?;
            let documents = gateway.list_documents(&store).await?;
            ctx.print(documents.as_slice())
        }
        DocumentAction::Get { name, store } => {
            let document = resolve(gateway, ResourceKind::Document, &name, scope(&store)).await?;
            let document = gateway.get_document(&document).await?;
            ctx.print(&document)
        }
        DocumentAction::Delete { name, store, force } => {
            let document = resolve(gateway, ResourceKind::Document, &name, scope(&store)).await?;
            gateway.delete_document(&document, force).await?;
            ctx.ack(
                &format!("Deleted document: {}", name),
                json!({ "status": "deleted", "document": document }),
            )
        }
    }
}
