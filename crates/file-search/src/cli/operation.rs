// crates/file-search/src/cli/operation.rs
// Long-running operation inspection

use super::Context;
use anyhow::Result;
use clap::Subcommand;
use file_search::gemini::OperationKind;
use file_search::operation::get_operation_status;

#[derive(Subcommand)]
pub enum OperationAction {
    /// Get the status of an upload or import operation
    ///
    /// Operation names look like fileSearchStores/{store}/operations/{id}.
    /// Without --type the import kind is tried first, then upload.
    Get {
        name: String,

        /// Operation type: import or upload (auto-detected when omitted)
        #[arg(long = "type")]
        kind: Option<OperationKind>,
    },
}

pub async fn run(ctx: &Context, action: OperationAction) -> Result<()> {
    match action {
        OperationAction::Get { name, kind } => {
            let gateway = ctx.gateway()?;
            let status = get_operation_status(gateway.as_ref(), &name, kind).await?;
            ctx.print(&status)
        }
    }
}
