// crates/file-search/src/output.rs
// Text and JSON rendering for command results

use crate::batch::BatchResult;
use crate::error::Result;
use crate::gemini::{
    ChunkSource, Document, File, FileSearchStore, GroundingChunk, OperationStatus, QueryResponse,
};
use regex::Regex;
use serde::Serialize;
use std::fmt::{Display, Write};
use std::sync::LazyLock;

const SNIPPET_MAX_CHARS: usize = 200;

static PAGE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: This is a static literal regex pattern; compilation cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"--- PAGE (\d+) ---").expect("page marker regex")
});

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: This is a static literal regex pattern; compilation cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"\n{3,}").expect("blank line regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Knobs that change text rendering only
#[derive(Debug, Clone, Copy, Default)]
pub struct TextStyle {
    /// Full chunk text instead of one-line snippets
    pub verbose: bool,
    /// Dump raw grounding metadata
    pub debug: bool,
}

/// Human-readable rendering of a result
pub trait RenderText {
    fn render_text(&self, style: &TextStyle) -> String;
}

/// Render `value` in the requested format. JSON is pretty-printed.
pub fn render<T>(value: &T, format: OutputFormat, style: &TextStyle) -> Result<String>
where
    T: Serialize + RenderText + ?Sized,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(value.render_text(style)),
    }
}

impl RenderText for [FileSearchStore] {
    fn render_text(&self, _style: &TextStyle) -> String {
        self.iter()
            .map(|s| format!("{} ({})\n", s.display_name, s.name))
            .collect()
    }
}

impl RenderText for FileSearchStore {
    fn render_text(&self, _style: &TextStyle) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "Display Name: {}", self.display_name);
        let _ = writeln!(out, "Create Time: {}", self.create_time.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Update Time: {}", self.update_time.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Active Documents: {}", self.active_documents_count);
        let _ = writeln!(out, "Pending Documents: {}", self.pending_documents_count);
        let _ = writeln!(out, "Failed Documents: {}", self.failed_documents_count);
        let _ = writeln!(out, "Total Size: {} bytes", self.size_bytes);
        out
    }
}

impl RenderText for [File] {
    fn render_text(&self, _style: &TextStyle) -> String {
        self.iter()
            .map(|f| format!("{} ({}) - {}\n", f.display_name, f.name, f.uri))
            .collect()
    }
}

impl RenderText for File {
    fn render_text(&self, _style: &TextStyle) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "Display Name: {}", self.display_name);
        let _ = writeln!(out, "URI: {}", self.uri);
        let _ = writeln!(out, "MIME Type: {}", self.mime_type);
        let _ = writeln!(out, "Size: {} bytes", self.size_bytes);
        let _ = writeln!(out, "Create Time: {}", self.create_time.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Update Time: {}", self.update_time.as_deref().unwrap_or(""));
        if let Some(expires) = &self.expiration_time {
            let _ = writeln!(out, "Expiration Time: {}", expires);
        }
        let _ = writeln!(out, "State: {}", self.state);
        out
    }
}

impl RenderText for [Document] {
    fn render_text(&self, _style: &TextStyle) -> String {
        self.iter()
            .map(|d| {
                format!(
                    "{} ({}) - {} - {} bytes\n",
                    d.display_name, d.name, d.state, d.size_bytes
                )
            })
            .collect()
    }
}

impl RenderText for Document {
    fn render_text(&self, _style: &TextStyle) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "Display Name: {}", self.display_name);
        let _ = writeln!(out, "State: {}", self.state);
        let _ = writeln!(out, "Size: {} bytes", self.size_bytes);
        let _ = writeln!(out, "MIME Type: {}", self.mime_type);
        let _ = writeln!(out, "Create Time: {}", self.create_time.as_deref().unwrap_or(""));
        let _ = writeln!(out, "Update Time: {}", self.update_time.as_deref().unwrap_or(""));
        if !self.custom_metadata.is_empty() {
            out.push_str("Custom Metadata:\n");
            for meta in &self.custom_metadata {
                let _ = writeln!(out, "  {}: {}", meta.key, meta.display_value());
            }
        }
        out
    }
}

impl RenderText for QueryResponse {
    fn render_text(&self, style: &TextStyle) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.answer);

        if style.debug {
            if let Some(meta) = &self.grounding_metadata {
                out.push_str("\n[Grounding Metadata]\n");
                let _ = writeln!(
                    out,
                    "{}",
                    serde_json::to_string_pretty(meta).unwrap_or_default()
                );
            }
        }

        if !self.grounding_chunks.is_empty() {
            out.push_str("\nSources:\n");
            for (i, chunk) in self.grounding_chunks.iter().enumerate() {
                render_source(&mut out, i + 1, chunk, style);
            }
        }
        out
    }
}

fn render_source(out: &mut String, index: usize, chunk: &GroundingChunk, style: &TextStyle) {
    if chunk.source == ChunkSource::Web {
        let _ = writeln!(
            out,
            "  {}. [Web] {} ({})",
            index,
            chunk.title,
            chunk.uri.as_deref().unwrap_or("")
        );
        return;
    }

    let mut location = Vec::new();
    if let Some(uri) = &chunk.uri {
        location.push(format!("URI: {}", uri));
    }
    if let Some(page) = page_label(chunk) {
        location.push(page);
    }
    let location = if location.is_empty() {
        String::new()
    } else {
        format!(" ({})", location.join(", "))
    };
    let _ = writeln!(out, "  {}. [Doc] {}{}", index, chunk.title, location);

    if chunk.text.is_empty() {
        return;
    }
    if style.verbose {
        let text = BLANK_RUN_RE.replace_all(&chunk.text, "\n\n");
        let _ = writeln!(out, "     Full Text:\n{}", text);
    } else {
        let _ = writeln!(out, "     Snippet: {}", snippet(&chunk.text));
    }
}

/// `Page N` / `Pages A-B` from the page span, else from a `--- PAGE N ---`
/// marker in the chunk text
pub fn page_label(chunk: &GroundingChunk) -> Option<String> {
    if let Some(span) = chunk.page_span.filter(|s| s.first_page > 0) {
        return Some(
            if span.last_page == 0 || span.last_page == span.first_page {
                format!("Page {}", span.first_page)
            } else {
                format!("Pages {}-{}", span.first_page, span.last_page)
            },
        );
    }
    PAGE_MARKER_RE
        .captures(&chunk.text)
        .and_then(|c| c.get(1))
        .map(|m| format!("Page {}", m.as_str()))
}

/// Collapse whitespace to single spaces and cap the length
pub fn snippet(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > SNIPPET_MAX_CHARS {
        let cut: String = collapsed.chars().take(SNIPPET_MAX_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        collapsed
    }
}

impl RenderText for OperationStatus {
    fn render_text(&self, _style: &TextStyle) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Operation: {}", self.name);
        let _ = writeln!(out, "Type: {}", self.kind);

        if self.failed {
            out.push_str("Status: FAILED\n");
            let _ = writeln!(out, "Error: {}", self.error_message.as_deref().unwrap_or(""));
        } else if self.done {
            out.push_str("Status: DONE\n");
            if let Some(parent) = &self.parent {
                let _ = writeln!(out, "Store: {}", parent);
            }
            if let Some(doc) = &self.document_name {
                let _ = writeln!(out, "Document: {}", doc);
            }
        } else {
            out.push_str("Status: PENDING\n");
        }

        if !self.metadata.is_empty() {
            out.push_str("\nMetadata:\n");
            for (k, v) in &self.metadata {
                let value = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let _ = writeln!(out, "  {}: {}", k, value);
            }
        }
        out
    }
}

// ============================================================================
// Batch reports
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub file: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

/// Aggregate view of a batch, for the JSON output and the text summary
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub files: Vec<ItemReport>,
}

impl BatchReport {
    pub fn new<E: Display>(result: &BatchResult<E>, store: Option<&str>) -> Self {
        let store = store.map(str::to_string);
        let mut files: Vec<ItemReport> = result
            .succeeded
            .iter()
            .map(|f| ItemReport {
                file: f.clone(),
                status: ItemStatus::Success,
                error: None,
                store: store.clone(),
            })
            .collect();
        files.extend(result.failed.iter().map(|(f, e)| ItemReport {
            file: f.clone(),
            status: ItemStatus::Failed,
            error: Some(e.to_string()),
            store: store.clone(),
        }));
        Self {
            total: result.total,
            succeeded: result.succeeded.len(),
            failed: result.failed.len(),
            files,
        }
    }

    fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, ItemStatus::Failed))
    }
}

impl RenderText for BatchReport {
    /// Summary block (only for more than one item) and the failure breakdown
    fn render_text(&self, _style: &TextStyle) -> String {
        let mut out = String::new();
        if self.total > 1 {
            out.push_str("\nSummary:\n");
            let _ = writeln!(out, "  ✓ Succeeded: {}", self.succeeded);
            let _ = writeln!(out, "  ✗ Failed: {}", self.failed);
        }
        if self.failed > 0 {
            out.push_str("\nFailed files:\n");
            for item in self.failures() {
                let _ = writeln!(
                    out,
                    "  - {}: {}",
                    item.file,
                    item.error.as_deref().unwrap_or("")
                );
            }
        }
        out
    }
}

/// One progress line, printed as each item finishes
pub fn progress_line<E: Display>(current: usize, total: usize, item: &str, error: Option<&E>) -> String {
    match error {
        Some(e) => format!("[{}/{}] ✗ Failed: {} ({})", current, total, item, e),
        None => format!("[{}/{}] ✓ Finished: {}", current, total, item),
    }
}
