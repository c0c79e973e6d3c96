// crates/file-search/src/cli/mod.rs
// CLI module for file-search commands

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use clap_complete::engine::ArgValueCompleter;
use file_search::FileSearchError;
use file_search::batch::{self, BatchProgress, BatchResult};
use file_search::config::{Overrides, Settings};
use file_search::gemini::{GeminiClient, Gateway};
use file_search::http::create_shared_client;
use file_search::output::{BatchReport, OutputFormat, RenderText, TextStyle, progress_line, render};
use file_search::resolve::resolve_store_flags;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub mod complete;
pub mod document;
pub mod file;
pub mod operation;
pub mod query;
pub mod serve;
pub mod store;

#[derive(Parser)]
#[command(name = "file-search")]
#[command(about = "Manage Gemini File Search stores and query them from the command line")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.file-search/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Gemini API key
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[arg(long, global = true)]
    pub api_key_env: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (full source text for queries, debug logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Debug output (raw grounding metadata, trace logs)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        let mcp_tools = match &self.command {
            Commands::Mcp { mcp_tools } => mcp_tools.clone(),
            _ => None,
        };
        Overrides {
            config_path: self.config.clone(),
            api_key: self.api_key.clone(),
            api_key_env: self.api_key_env.clone(),
            mcp_tools,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage File Search stores
    Store {
        #[command(subcommand)]
        action: store::StoreAction,
    },

    /// Manage files in the Files API
    File {
        #[command(subcommand)]
        action: file::FileAction,
    },

    /// Manage documents inside a store
    #[command(visible_alias = "doc")]
    Document {
        #[command(subcommand)]
        action: document::DocumentAction,
    },

    /// Ask a question grounded in a store
    Query(query::QueryArgs),

    /// Inspect long-running operations
    #[command(visible_aliases = ["op", "operations"])]
    Operation {
        #[command(subcommand)]
        action: operation::OperationAction,
    },

    /// Run as MCP server over stdio
    Mcp {
        /// Comma-separated tools to expose (names or aliases: all, query, upload, delete)
        #[arg(long)]
        mcp_tools: Option<String>,
    },

    /// Print a shell completion script
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print name suggestions, one per line
    #[command(hide = true)]
    Complete {
        #[arg(value_enum)]
        kind: complete::CompleteKind,

        /// Store to list documents from
        #[arg(long)]
        store: Option<String>,
    },

    /// Print version information
    Version,
}

/// `--store NAME` / `--store-id ID`
#[derive(Args, Debug, Clone, Default)]
pub struct StoreFlags {
    /// Store display name
    #[arg(long, add = ArgValueCompleter::new(complete::stores))]
    pub store: Option<String>,

    /// Store resource ID (fileSearchStores/xxx)
    #[arg(long, add = ArgValueCompleter::new(complete::stores))]
    pub store_id: Option<String>,
}

impl StoreFlags {
    pub fn is_set(&self) -> bool {
        self.store.as_deref().is_some_and(|s| !s.is_empty())
            || self.store_id.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Resolve to a store resource name; errors when neither flag is given
    pub async fn resolve(&self, gateway: &dyn Gateway) -> Result<String> {
        Ok(resolve_store_flags(gateway, self.store.as_deref(), self.store_id.as_deref()).await?)
    }

    /// Like `resolve`, but `None` when neither flag is given
    pub async fn resolve_optional(&self, gateway: &dyn Gateway) -> Result<Option<String>> {
        if !self.is_set() {
            return Ok(None);
        }
        self.resolve(gateway).await.map(Some)
    }
}

fn build_gateway(key: &str) -> Arc<dyn Gateway> {
    Arc::new(GeminiClient::with_http_client(key, create_shared_client()))
}

/// Gateway for `settings`, or `None` without an API key
pub fn gateway_for(settings: &Settings) -> Option<Arc<dyn Gateway>> {
    settings.api_key.as_deref().map(build_gateway)
}

/// Everything a command handler needs from the global flags
pub struct Context {
    pub settings: Settings,
    pub format: OutputFormat,
    pub style: TextStyle,
    pub quiet: bool,
}

impl Context {
    pub fn new(cli: &Cli, settings: Settings) -> Self {
        Self {
            settings,
            format: cli.format,
            style: TextStyle {
                verbose: cli.verbose,
                debug: cli.debug,
            },
            quiet: cli.quiet,
        }
    }

    /// Gateway for commands that talk to the API; requires a key
    pub fn gateway(&self) -> Result<Arc<dyn Gateway>> {
        let key = self.settings.require_api_key()?;
        Ok(build_gateway(key))
    }

    /// Gateway if a key is configured
    pub fn optional_gateway(&self) -> Option<Arc<dyn Gateway>> {
        gateway_for(&self.settings)
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print a result in the selected format
    pub fn print<T>(&self, value: &T) -> Result<()>
    where
        T: Serialize + RenderText + ?Sized,
    {
        let out = render(value, self.format, &self.style)?;
        println!("{}", out.trim_end_matches('\n'));
        Ok(())
    }

    /// Print a short acknowledgement: `text` in text mode, `json` otherwise
    pub fn ack(&self, text: &str, json: serde_json::Value) -> Result<()> {
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!("{}", text);
        }
        Ok(())
    }

    pub fn reporter(&self) -> Reporter {
        Reporter {
            quiet: self.quiet,
            json: self.is_json(),
        }
    }
}

/// Progress chatter. Suppressed by `--quiet`; kept off stdout in JSON mode.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    quiet: bool,
    json: bool,
}

impl Reporter {
    pub fn line(&self, line: &str) {
        if self.quiet {
            return;
        }
        if self.json {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Cancel `cancel` on Ctrl-C. Abort the returned handle once the work is done.
pub fn cancel_on_interrupt(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, no new items will be started");
            cancel.cancel();
        }
    })
}

/// Run a batch command with one progress line per finished item.
/// `label` turns an item into the name shown in those lines.
pub async fn run_batch<F, Fut>(
    ctx: &Context,
    items: Vec<String>,
    concurrency: usize,
    cancel: CancellationToken,
    label: fn(&str) -> String,
    op: F,
) -> BatchResult<FileSearchError>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = file_search::Result<()>> + Send + 'static,
{
    let interrupt = cancel_on_interrupt(cancel.clone());
    let reporter = ctx.reporter();
    let result = batch::run(
        items,
        concurrency,
        cancel,
        op,
        move |p: BatchProgress<'_, FileSearchError>| {
            reporter.line(&progress_line(p.current, p.total, &label(p.item), p.error));
        },
    )
    .await;
    interrupt.abort();
    result
}

/// Report a finished batch: JSON aggregate, or the text summary and failure
/// breakdown. Errors when any item failed or was never started.
pub fn finish_batch(
    ctx: &Context,
    result: &BatchResult<FileSearchError>,
    store: Option<&str>,
    failure: &str,
) -> Result<()> {
    let report = BatchReport::new(result, store);
    if ctx.is_json() {
        ctx.print(&report)?;
    } else if !ctx.quiet {
        let text = report.render_text(&ctx.style);
        if !text.is_empty() {
            print!("{}", text);
        }
    }

    if result.has_failures() {
        bail!("{}", failure);
    }
    if result.processed() < result.total {
        bail!(
            "interrupted: {} of {} items processed",
            result.processed(),
            result.total
        );
    }
    Ok(())
}

/// The one success, when a single-item batch succeeded and chatter is wanted
pub fn single_success<'a>(ctx: &Context, result: &'a BatchResult<FileSearchError>) -> Option<&'a str> {
    if ctx.quiet || ctx.is_json() || result.total != 1 {
        return None;
    }
    result.succeeded.first().map(String::as_str)
}
