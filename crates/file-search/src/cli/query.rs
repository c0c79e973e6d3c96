// crates/file-search/src/cli/query.rs
// Grounded question answering

use super::{Context, StoreFlags, complete};
use anyhow::Result;
use clap::Args;
use clap_complete::engine::ArgValueCompleter;
use file_search::constants::DEFAULT_MODEL;
use file_search::gemini::QueryRequest;

#[derive(Args)]
pub struct QueryArgs {
    /// The question
    pub text: String,

    /// Store to ground the answer in (optional)
    #[command(flatten)]
    pub store: StoreFlags,

    /// Model name
    #[arg(long, default_value = DEFAULT_MODEL, add = ArgValueCompleter::new(complete::models))]
    pub model: String,

    /// Metadata filter expression (optional)
    #[arg(long)]
    pub metadata_filter: Option<String>,
}

pub async fn run(ctx: &Context, args: QueryArgs) -> Result<()> {
    let gateway = ctx.gateway()?;
    let store = args.store.resolve_optional(gateway.as_ref()).await?;

    let model = if args.model.is_empty() {
        DEFAULT_MODEL.to_string()
    } else {
        args.model
    };
    let request = QueryRequest {
        text: args.text,
        store,
        model,
        metadata_filter: args.metadata_filter.filter(|f| !f.is_empty()),
    };

    let response = gateway.query(&request).await?;
    ctx.print(&response)
}
