// crates/file-search/src/cli/complete.rs
// Shell completion: registration scripts plus dynamic name suggestions

use super::{Cli, Context, gateway_for};
use anyhow::{Result, anyhow};
use clap::{CommandFactory, ValueEnum};
use clap_complete::engine::CompletionCandidate;
use clap_complete::env::Shells;
use file_search::completion::Completer;
use file_search::config::{Overrides, Settings};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Variable the shell sets when it asks for candidates
pub const COMPLETE_VAR: &str = "COMPLETE";

const BIN_NAME: &str = "file-search";

/// Which names to suggest
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompleteKind {
    Stores,
    Files,
    Documents,
    Models,
}

/// Answer a pending completion request and exit, if the shell sent one
pub fn handle_env_request() {
    clap_complete::CompleteEnv::with_factory(Cli::command)
        .var(COMPLETE_VAR)
        .complete();
}

/// Print the registration script for `shell`. The script calls back into
/// this binary, so names come from the live completer.
pub fn print_script(shell: clap_complete::Shell) -> Result<()> {
    let shell_name = shell.to_string();
    let shells = Shells::builtins();
    let env_shell = shells
        .completer(&shell_name)
        .ok_or_else(|| anyhow!("unsupported shell: {}", shell_name))?;
    let program = std::env::current_exe()
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| BIN_NAME.to_string());
    env_shell.write_registration(
        COMPLETE_VAR,
        BIN_NAME,
        BIN_NAME,
        &program,
        &mut std::io::stdout(),
    )?;
    Ok(())
}

/// Print suggestions one per line. Never fails: lookups that cannot be
/// served print nothing (models fall back to the built-in list).
pub async fn run_complete(ctx: &Context, kind: CompleteKind, store: Option<&str>) {
    let completer = Completer::new(
        ctx.optional_gateway(),
        ctx.settings.completion_enabled,
        ctx.settings.completion_cache_ttl,
    );
    for name in names(&completer, kind, store).await {
        println!("{}", name);
    }
}

async fn names(completer: &Completer, kind: CompleteKind, store: Option<&str>) -> Vec<String> {
    match kind {
        CompleteKind::Stores => completer.store_names().await,
        CompleteKind::Files => completer.file_names().await,
        CompleteKind::Documents => completer.document_names(store.unwrap_or_default()).await,
        CompleteKind::Models => completer.model_names().await,
    }
}

// Value completers registered on arguments via `ArgValueCompleter`

pub fn stores(current: &OsStr) -> Vec<CompletionCandidate> {
    suggest(CompleteKind::Stores, current)
}

pub fn files(current: &OsStr) -> Vec<CompletionCandidate> {
    suggest(CompleteKind::Files, current)
}

/// Scoped by the `--store`/`--store-id` already on the command line
pub fn documents(current: &OsStr) -> Vec<CompletionCandidate> {
    suggest(CompleteKind::Documents, current)
}

pub fn models(current: &OsStr) -> Vec<CompletionCandidate> {
    suggest(CompleteKind::Models, current)
}

static COMPLETER: OnceLock<Completer> = OnceLock::new();

/// One completer per process, configured from the words being completed
fn shared_completer(words: &[String]) -> &'static Completer {
    COMPLETER.get_or_init(|| {
        let overrides = Overrides {
            config_path: flag_value(words, "config").map(PathBuf::from),
            api_key: flag_value(words, "api-key"),
            api_key_env: flag_value(words, "api-key-env"),
            mcp_tools: None,
        };
        let settings = Settings::load(&overrides).unwrap_or_default();
        Completer::new(
            gateway_for(&settings),
            settings.completion_enabled,
            settings.completion_cache_ttl,
        )
    })
}

fn suggest(kind: CompleteKind, current: &OsStr) -> Vec<CompletionCandidate> {
    let words: Vec<String> = std::env::args().collect();
    let store = flag_value(&words, "store").or_else(|| flag_value(&words, "store-id"));
    let completer = shared_completer(&words);

    // Completion runs before the main runtime exists
    let names = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime.block_on(names(completer, kind, store.as_deref())),
        Err(_) => Vec::new(),
    };

    let prefix = current.to_string_lossy();
    names
        .into_iter()
        .filter(|name| name.starts_with(prefix.as_ref()))
        .map(CompletionCandidate::new)
        .collect()
}

/// Value of `--flag VALUE` or `--flag=VALUE` among the command-line words
fn flag_value(words: &[String], flag: &str) -> Option<String> {
    let long = format!("--{}", flag);
    let inline = format!("--{}=", flag);
    words
        .iter()
        .enumerate()
        .find_map(|(i, word)| {
            if let Some(value) = word.strip_prefix(&inline) {
                Some(value.to_string())
            } else if *word == long {
                words.get(i + 1).cloned()
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty())
}
