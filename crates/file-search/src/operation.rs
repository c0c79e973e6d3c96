// crates/file-search/src/operation.rs
// Long-running operation polling, name validation and kind auto-detection

use crate::constants::{OPERATION_RESOURCE_INFIX, STORE_RESOURCE_PREFIX};
use crate::error::{FileSearchError, Result};
use crate::gemini::{Gateway, Operation, OperationKind, OperationStatus};
use std::io::Write;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Fixed wait between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Drives one operation to a terminal state.
///
/// Unless quiet, a single self-overwriting elapsed-time line is written to
/// stderr on every iteration.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    quiet: bool,
    label: String,
    cancel: Option<CancellationToken>,
}

impl Poller {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            quiet: false,
            label: label.into(),
            cancel: None,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop waiting (with `Cancelled`) once `cancel` fires
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Poll until `initial` is done. A polling error aborts immediately and
    /// is returned as-is; a done-but-failed operation becomes
    /// `OperationFailed`.
    pub async fn wait(
        &self,
        gateway: &dyn Gateway,
        initial: Operation,
        kind: OperationKind,
    ) -> Result<Operation> {
        let start = Instant::now();
        let mut op = initial;
        let mut polls = 0u32;

        while !op.done {
            self.indicator(start);
            self.sleep().await.inspect_err(|_| self.finish_line())?;
            polls += 1;
            op = gateway
                .get_operation(&op.name, kind)
                .await
                .inspect_err(|_| self.finish_line())?;
        }
        if polls > 0 {
            self.finish_line();
        }

        debug!(
            operation = %op.name,
            polls,
            elapsed_ms = start.elapsed().as_millis() as u64,
            failed = op.failed(),
            "Operation finished"
        );

        match op.error_message() {
            Some(message) => Err(FileSearchError::OperationFailed {
                name: op.name.clone(),
                message,
            }),
            None => Ok(op),
        }
    }

    async fn sleep(&self) -> Result<()> {
        match &self.cancel {
            Some(cancel) => tokio::select! {
                _ = cancel.cancelled() => Err(FileSearchError::Cancelled),
                _ = tokio::time::sleep(self.interval) => Ok(()),
            },
            None => {
                tokio::time::sleep(self.interval).await;
                Ok(())
            }
        }
    }

    fn indicator(&self, start: Instant) {
        if self.quiet {
            return;
        }
        let mut stderr = std::io::stderr();
        let _ = write!(
            stderr,
            "\r{}... ({}s elapsed)",
            self.label,
            start.elapsed().as_secs()
        );
        let _ = stderr.flush();
    }

    fn finish_line(&self) {
        if !self.quiet {
            eprintln!();
        }
    }
}

/// Local shape check, done before any remote call: the store prefix first,
/// then the operations infix.
pub fn validate_operation_name(name: &str) -> Result<()> {
    if !name.starts_with(STORE_RESOURCE_PREFIX) {
        return Err(FileSearchError::InvalidOperationName(format!(
            "must start with '{}'",
            STORE_RESOURCE_PREFIX
        )));
    }
    if !name.contains(OPERATION_RESOURCE_INFIX) {
        return Err(FileSearchError::InvalidOperationName(format!(
            "must contain '{}'",
            OPERATION_RESOURCE_INFIX
        )));
    }
    Ok(())
}

/// Fetch one snapshot of an operation, without waiting.
///
/// With no declared kind the import kind is tried first. The upload kind is
/// tried only if the backend rejected that attempt; transport errors are
/// surfaced straight away.
pub async fn get_operation_status(
    gateway: &dyn Gateway,
    name: &str,
    kind: Option<OperationKind>,
) -> Result<OperationStatus> {
    validate_operation_name(name)?;

    if let Some(kind) = kind {
        let op = gateway.get_operation(name, kind).await?;
        return Ok(op.status(kind));
    }

    match gateway.get_operation(name, OperationKind::Import).await {
        Ok(op) => Ok(op.status(OperationKind::Import)),
        Err(e) if e.is_rejection() => {
            debug!(operation = name, error = %e, "Not an import operation, trying upload");
            let op = gateway.get_operation(name, OperationKind::Upload).await?;
            Ok(op.status(OperationKind::Upload))
        }
        Err(e) => Err(e),
    }
}
