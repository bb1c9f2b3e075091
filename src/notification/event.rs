use crate::server::{Direction, TransferMode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Display;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Whether a transfer ran to the end or was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Completion {
    /// All bytes were moved.
    #[display("c")]
    Complete,
    /// The transfer was cancelled or failed halfway.
    #[display("i")]
    Incomplete,
}

/// How the user logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AccessMode {
    /// Anonymous login
    #[display("a")]
    Anonymous,
    /// Real account
    #[display("r")]
    Real,
}

/// One transfer, as it ended up. The `Display` implementation renders a line in the classic
/// xferlog format so that implementations can simply write it to a file:
///
/// ```text
/// Fri Oct 16 12:00:01 2026 3 - 1024 /srv/ftp/report.txt b _ i r alice ftp 0 * c
/// ```
#[derive(Debug, Clone)]
pub struct TransferRecord {
    /// The direction of the transfer as seen from the server.
    pub direction: Direction,
    /// Bytes moved, including a restart offset the transfer started at.
    pub bytes: u64,
    /// The resolved path of the file.
    pub path: String,
    /// The representation type that was in effect.
    pub mode: TransferMode,
    /// Whether the transfer completed.
    pub completion: Completion,
    /// The identity of the user, as rendered by its `Display` implementation.
    pub identity: String,
    /// How the user logged in.
    pub access_mode: AccessMode,
    /// How long the transfer took.
    pub elapsed: Duration,
    /// When the transfer ended.
    pub finished_at: DateTime<Utc>,
    /// Identifies the session the transfer happened in.
    pub trace_id: String,
}

impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            TransferMode::Ascii => 'a',
            TransferMode::Binary => 'b',
        };
        write!(
            f,
            "{} {} - {} {} {} _ {} {} {} ftp 0 * {}",
            self.finished_at.format("%a %b %e %H:%M:%S %Y"),
            self.elapsed.as_secs(),
            self.bytes,
            self.path,
            mode,
            self.direction,
            self.access_mode,
            self.identity,
            self.completion
        )
    }
}

/// Progress of a running download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// The resolved path of the file being sent.
    pub path: String,
    /// Bytes delivered so far, counting from the start of the file.
    pub bytes: u64,
    /// The size of the file.
    pub total: u64,
}

/// A listener for transfer accounting. Implementations can be passed to
/// [`SessionBuilder::listener`](crate::server::SessionBuilder::listener) in order to receive
/// notifications.
#[async_trait]
pub trait TransferListener: Sync + Send + Debug {
    /// Called once per transfer, after the data connection was closed.
    async fn record_transfer(&self, record: TransferRecord);

    /// Called while a download is running whenever another percent of the file went out.
    async fn record_progress(&self, progress: Progress);
}

#[async_trait]
impl TransferListener for Box<dyn TransferListener> {
    async fn record_transfer(&self, record: TransferRecord) {
        self.as_ref().record_transfer(record).await
    }

    async fn record_progress(&self, progress: Progress) {
        self.as_ref().record_progress(progress).await
    }
}

#[async_trait]
impl TransferListener for Arc<dyn TransferListener> {
    async fn record_transfer(&self, record: TransferRecord) {
        self.as_ref().record_transfer(record).await
    }

    async fn record_progress(&self, progress: Progress) {
        self.as_ref().record_progress(progress).await
    }
}
