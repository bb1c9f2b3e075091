//! The per-session transfer state: what REST, APPE and TYPE left behind for the next transfer, the
//! abort flags and the transfer that is currently running.

use chrono::{DateTime, Utc};
use derive_more::Display;
use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// The direction of a transfer as seen from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Direction {
    /// Client to server (STOR, APPE)
    #[display("i")]
    Inbound,
    /// Server to client (RETR)
    #[display("o")]
    Outbound,
}

/// The representation type set with TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum TransferMode {
    /// `TYPE A`
    #[display("A")]
    Ascii,
    /// `TYPE I`
    #[default]
    #[display("I")]
    Binary,
}

impl TransferMode {
    /// The name used in the preliminary reply, e.g. `Opening BINARY mode data connection`.
    pub fn name(self) -> &'static str {
        match self {
            TransferMode::Ascii => "ASCII",
            TransferMode::Binary => "BINARY",
        }
    }
}

/// The transfer that is running, or just ended and has not been logged yet.
#[derive(Debug, Clone)]
pub struct ActiveTransfer {
    /// The resolved path of the file.
    pub path: PathBuf,
    /// Which way the bytes go.
    pub direction: Direction,
    /// Bytes moved so far, counting from the start of the file.
    pub bytes_transferred: u64,
    /// For uploads the restart offset, for downloads the size of the file.
    pub file_size: u64,
    /// When the transfer started, for measuring elapsed time.
    pub start_time: Instant,
    /// When the transfer started, as wall clock time.
    pub started_at: DateTime<Utc>,
}

impl ActiveTransfer {
    pub(crate) fn new(path: PathBuf, direction: Direction, initial: u64, file_size: u64) -> Self {
        ActiveTransfer {
            path,
            direction,
            bytes_transferred: initial,
            file_size,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

/// The abort flag of a session. ABOR arrives out of band while a transfer holds the session, so
/// the flag is shared: clones handed out through
/// [`Session::abort_handle`](crate::server::Session::abort_handle) set it, the copy loop polls it
/// once per chunk and the ABOR command clears it again.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    token: Arc<Mutex<CancellationToken>>,
}

impl AbortSignal {
    /// Asks the running transfer, if any, to stop.
    pub fn request(&self) {
        self.current().cancel();
    }

    /// True if an abort was requested and not cleared yet.
    pub fn is_requested(&self) -> bool {
        self.current().is_cancelled()
    }

    /// A token that is cancelled when an abort is requested. Requests made after a later
    /// [`clear`](Self::clear) do not reach it.
    pub fn token(&self) -> CancellationToken {
        self.current()
    }

    pub(crate) fn clear(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = CancellationToken::new();
    }

    fn current(&self) -> CancellationToken {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Transfer state kept for the lifetime of a session.
#[derive(Debug, Default)]
pub struct TransferState {
    pub(crate) restart_offset: u64,
    pub(crate) append_mode: bool,
    pub(crate) mode: TransferMode,
    pub(crate) abort: AbortSignal,
    pub(crate) abort_acknowledged: bool,
    pub(crate) active: Option<ActiveTransfer>,
}

impl TransferState {
    /// The offset set by the last REST that was not consumed yet.
    pub fn restart_offset(&self) -> u64 {
        self.restart_offset
    }

    /// True between APPE validation and the execution that consumes it.
    pub fn append_mode(&self) -> bool {
        self.append_mode
    }

    /// The representation type.
    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// True once the engine stopped a transfer because of an abort, until ABOR clears it.
    pub fn abort_acknowledged(&self) -> bool {
        self.abort_acknowledged
    }

    /// True if an abort was requested and ABOR did not clear it yet.
    pub fn abort_requested(&self) -> bool {
        self.abort.is_requested()
    }

    /// The transfer in progress.
    pub fn active(&self) -> Option<&ActiveTransfer> {
        self.active.as_ref()
    }

    pub(crate) fn reset_restart(&mut self) {
        self.restart_offset = 0;
        self.append_mode = false;
    }

    // Hands out restart offset and append flag and resets both.
    pub(crate) fn take_restart(&mut self) -> (u64, bool) {
        let taken = (self.restart_offset, self.append_mode);
        self.reset_restart();
        taken
    }

    // ABOR has something to do.
    pub(crate) fn abort_pending(&self) -> bool {
        self.active.is_some() || self.abort.is_requested() || self.abort_acknowledged
    }

    pub(crate) fn clear_abort(&mut self) {
        self.abort.clear();
        self.abort_acknowledged = false;
    }
}

/// Tracks when bytes last moved in a session and whether a transfer is running. The idle timer
/// reads it without taking the session lock.
#[derive(Debug, Clone)]
pub struct Activity {
    inner: Arc<ActivityInner>,
}

#[derive(Debug)]
struct ActivityInner {
    base: Instant,
    last_millis: AtomicU64,
    transferring: AtomicBool,
}

impl Default for Activity {
    fn default() -> Self {
        Activity {
            inner: Arc::new(ActivityInner {
                base: Instant::now(),
                last_millis: AtomicU64::new(0),
                transferring: AtomicBool::new(false),
            }),
        }
    }
}

impl Activity {
    /// Records that bytes moved just now.
    pub fn touch(&self) {
        let millis = u64::try_from(self.inner.base.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.inner.last_millis.store(millis, Ordering::Relaxed);
    }

    /// How long ago bytes last moved.
    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.inner.last_millis.load(Ordering::Relaxed));
        self.inner.base.elapsed().saturating_sub(last)
    }

    /// True while a transfer is running.
    pub fn is_transferring(&self) -> bool {
        self.inner.transferring.load(Ordering::Relaxed)
    }

    /// Marks the session as transferring until the returned guard is dropped.
    pub fn begin_transfer(&self) -> TransferGuard {
        self.inner.transferring.store(true, Ordering::Relaxed);
        self.touch();
        TransferGuard { activity: self.clone() }
    }
}

/// Clears the transferring flag of an [`Activity`] on drop.
#[derive(Debug)]
pub struct TransferGuard {
    activity: Activity,
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        self.activity.touch();
        self.activity.inner.transferring.store(false, Ordering::Relaxed);
    }
}
