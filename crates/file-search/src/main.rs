// crates/file-search/src/main.rs
// file-search - CLI and MCP server for Gemini File Search stores

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use file_search::config::Settings;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Tab-completion requests are answered here and exit; their lookups
    // drive their own small runtime
    cli::complete::handle_env_request();

    let cli = Cli::parse();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    // Stdout belongs to the protocol while serving; keep logs quiet on stderr
    let log_level = match &cli.command {
        Commands::Mcp { .. } => Level::WARN,
        _ if cli.debug => Level::TRACE,
        _ if cli.verbose => Level::DEBUG,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Nothing below needs the network or the config
    match &cli.command {
        Commands::Version => {
            println!("file-search {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Completion { shell } => {
            return cli::complete::print_script(*shell);
        }
        _ => {}
    }

    let settings = match Settings::load(&cli.overrides()) {
        Ok(settings) => settings,
        // Completion must never break the shell
        Err(_) if matches!(cli.command, Commands::Complete { .. }) => Settings::default(),
        Err(e) => return Err(e.into()),
    };
    let ctx = cli::Context::new(&cli, settings);

    match cli.command {
        Commands::Store { action } => cli::store::run(&ctx, action).await?,
        Commands::File { action } => cli::file::run(&ctx, action).await?,
        Commands::Document { action } => cli::document::run(&ctx, action).await?,
        Commands::Query(args) => cli::query::run(&ctx, args).await?,
        Commands::Operation { action } => cli::operation::run(&ctx, action).await?,
        Commands::Mcp { .. } => cli::serve::run_mcp_server(&ctx).await?,
        Commands::Complete { kind, store } => {
            cli::complete::run_complete(&ctx, kind, store.as_deref()).await
        }
        Commands::Version | Commands::Completion { .. } => {}
    }

    Ok(())
}
