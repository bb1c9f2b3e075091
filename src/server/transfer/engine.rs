//! The copy loops of STOR, APPE and RETR.

use super::{
    error::{TransferError, TransferErrorKind},
    registry::{OpenHandle, Slot},
    state::{ActiveTransfer, Direction},
    validate::{Intent, ResolvedTarget},
};
use crate::{
    auth::UserDetail,
    notification::{AccessMode, Completion, Progress, TransferRecord},
    server::{
        datachan::{CloseStatus, DataConnection},
        session::Session,
    },
    storage::{self, Metadata, OpenFlags, StorageBackend},
};
use chrono::Utc;
use derive_more::Display;
use std::{
    io::{self, SeekFrom},
    path::Path,
};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// How an executed transfer ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Outcome {
    /// All data was moved. `bytes` includes a restart offset.
    #[display("completed after {bytes} bytes")]
    Completed {
        /// Position in the file the transfer ended at.
        bytes: u64,
    },
    /// The transfer was stopped by an abort request.
    #[display("cancelled after {bytes} bytes")]
    Cancelled {
        /// Position in the file the transfer stopped at.
        bytes: u64,
    },
}

impl Outcome {
    /// The position in the file the transfer ended at.
    pub fn bytes(&self) -> u64 {
        match self {
            Outcome::Completed { bytes } | Outcome::Cancelled { bytes } => *bytes,
        }
    }
}

// Why a copy loop stopped.
enum CopyEnd {
    Finished,
    Aborted,
    Local(io::Error),
    Transport(io::Error),
}

impl<Storage, User> Session<Storage, User>
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
{
    /// Runs a validated STOR or APPE: receives the file over the attached data connection. The
    /// restart offset and append flag are consumed whatever the result.
    #[tracing_attributes::instrument(skip(self))]
    pub async fn execute_store(&mut self, target: ResolvedTarget) -> Result<Outcome, TransferError> {
        let (restart_offset, append) = self.state.take_restart();
        let ResolvedTarget {
            canonical_path: path,
            existing_mode,
            intent,
            subject,
        } = target;
        if intent == Intent::Retrieve {
            return Err(TransferError::new(TransferErrorKind::InternalInconsistency, subject));
        }
        let append = append || intent == Intent::Append;
        let mut conn = self
            .data_connection
            .take()
            .ok_or_else(|| TransferError::new(TransferErrorKind::NoDataConnection, subject.as_str()))?;

        let flags = if append {
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::APPEND
        } else if restart_offset > 0 {
            OpenFlags::WRITE
        } else {
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE
        };
        let file = match self.open_at(&path, flags, restart_offset).await {
            Ok(file) => file,
            Err(err) => {
                conn.close(CloseStatus::Error).await;
                return Err(TransferError::with_source(TransferErrorKind::FileUnavailable, subject, err));
            }
        };
        if let Err(err) = self.handles.register(Slot::Upload, OpenHandle::new(file, path.clone())) {
            conn.close(CloseStatus::Error).await;
            return Err(err);
        }

        conn.begin(Direction::Inbound, &subject, self.state.mode).await;
        self.state.active = Some(ActiveTransfer::new(path.clone(), Direction::Inbound, restart_offset, restart_offset));
        let _busy = self.activity.begin_transfer();

        if let Err(err) = conn.open(None).await {
            slog::warn!(self.logger, "Could not open data connection for {}: {}", subject, err);
            conn.close(CloseStatus::Error).await;
            // A truncated or freshly created file holds nothing worth keeping.
            if existing_mode.is_none() || flags.contains(OpenFlags::TRUNCATE) {
                self.store_abort().await;
            } else {
                self.close_handle(Slot::Upload).await;
            }
            self.state.active = None;
            return Err(TransferError::with_source(TransferErrorKind::DataConnectionUnavailable, subject, err));
        }

        let token = self.state.abort.token();
        let mut buf = vec![0u8; self.options.recv_window.max(1)];
        let mut end = loop {
            let n = tokio::select! {
                biased;
                _ = token.cancelled() => break CopyEnd::Aborted,
                read = conn.read_chunk(&mut buf) => match read {
                    Ok(0) => break CopyEnd::Finished,
                    Ok(n) => n,
                    Err(err) => break CopyEnd::Transport(err),
                },
            };
            let Some(handle) = self.handles.get_mut(Slot::Upload) else {
                break CopyEnd::Local(io::Error::other("upload handle vanished"));
            };
            if let Err(err) = handle.file.write_all(&buf[..n]).await {
                break CopyEnd::Local(err);
            }
            if let Some(active) = self.state.active.as_mut() {
                active.bytes_transferred += n as u64;
            }
            self.activity.touch();
        };
        if let CopyEnd::Finished = end {
            let flushed = match self.handles.get_mut(Slot::Upload) {
                Some(handle) => handle.file.flush().await,
                None => Ok(()),
            };
            if let Err(err) = flushed {
                end = CopyEnd::Local(err);
            }
        }

        let bytes = self.state.active.as_ref().map_or(restart_offset, |a| a.bytes_transferred);
        match end {
            CopyEnd::Finished => {
                self.store_done().await;
                conn.close(CloseStatus::Success).await;
                Ok(Outcome::Completed { bytes })
            }
            CopyEnd::Aborted => {
                self.store_abort().await;
                self.state.abort_acknowledged = true;
                conn.close(CloseStatus::Cancelled).await;
                Ok(Outcome::Cancelled { bytes })
            }
            CopyEnd::Local(err) => {
                self.store_abort().await;
                conn.close(CloseStatus::Error).await;
                Err(TransferError::with_source(TransferErrorKind::LocalIo, subject, storage::Error::from(err)))
            }
            CopyEnd::Transport(err) => {
                self.store_abort().await;
                conn.close(CloseStatus::Error).await;
                Err(TransferError::with_source(TransferErrorKind::DataConnection, subject, err))
            }
        }
    }

    /// Runs a validated RETR: sends the file over the attached data connection, reporting progress
    /// to the listener. The restart offset is consumed whatever the result.
    #[tracing_attributes::instrument(skip(self))]
    pub async fn execute_retrieve(&mut self, target: ResolvedTarget) -> Result<Outcome, TransferError> {
        let (restart_offset, _) = self.state.take_restart();
        let ResolvedTarget {
            canonical_path: path,
            intent,
            subject,
            ..
        } = target;
        if intent != Intent::Retrieve {
            return Err(TransferError::new(TransferErrorKind::InternalInconsistency, subject));
        }
        let mut conn = self
            .data_connection
            .take()
            .ok_or_else(|| TransferError::new(TransferErrorKind::NoDataConnection, subject.as_str()))?;

        let file = match self.open_at(&path, OpenFlags::READ, restart_offset).await {
            Ok(file) => file,
            Err(err) => {
                conn.close(CloseStatus::Error).await;
                return Err(TransferError::with_source(TransferErrorKind::FileUnavailable, subject, err));
            }
        };
        let file_size = match self.storage.metadata(&self.user, &path).await {
            Ok(meta) => meta.len(),
            Err(err) => {
                drop(file);
                conn.close(CloseStatus::Error).await;
                return Err(TransferError::with_source(TransferErrorKind::FileUnavailable, subject, err));
            }
        };
        if let Err(err) = self.handles.register(Slot::Download, OpenHandle::new(file, path.clone())) {
            conn.close(CloseStatus::Error).await;
            return Err(err);
        }

        conn.begin(Direction::Outbound, &subject, self.state.mode).await;
        self.state.active = Some(ActiveTransfer::new(path.clone(), Direction::Outbound, restart_offset, file_size));
        let _busy = self.activity.begin_transfer();

        if let Err(err) = conn.open(Some(file_size.saturating_sub(restart_offset))).await {
            slog::warn!(self.logger, "Could not open data connection for {}: {}", subject, err);
            conn.close(CloseStatus::Error).await;
            self.retrieve_abort().await;
            self.state.active = None;
            return Err(TransferError::with_source(TransferErrorKind::DataConnectionUnavailable, subject, err));
        }

        let progress_path = path.to_string_lossy().into_owned();
        let step = (file_size / 100).max(1);
        let mut count = restart_offset;
        let mut next = count / step;
        let mut reported = count;
        self.report_progress(&progress_path, count, file_size).await;

        let token = self.state.abort.token();
        let mut buf = vec![0u8; self.options.send_window.max(1)];
        let end = loop {
            if token.is_cancelled() {
                break CopyEnd::Aborted;
            }
            let Some(handle) = self.handles.get_mut(Slot::Download) else {
                break CopyEnd::Local(io::Error::other("download handle vanished"));
            };
            let n = match handle.file.read(&mut buf).await {
                Ok(0) => break CopyEnd::Finished,
                Ok(n) => n,
                Err(err) => break CopyEnd::Local(err),
            };
            tokio::select! {
                biased;
                _ = token.cancelled() => break CopyEnd::Aborted,
                written = conn.write_chunk(&buf[..n]) => {
                    if let Err(err) = written {
                        break CopyEnd::Transport(err);
                    }
                }
            }
            count += n as u64;
            if let Some(active) = self.state.active.as_mut() {
                active.bytes_transferred = count;
            }
            self.activity.touch();
            if count / step != next {
                next = count / step;
                self.report_progress(&progress_path, count, file_size).await;
                reported = count;
            }
        };

        match end {
            CopyEnd::Finished => {
                if reported != count {
                    self.report_progress(&progress_path, count, file_size).await;
                }
                self.retrieve_done().await;
                conn.close(CloseStatus::Success).await;
                Ok(Outcome::Completed { bytes: count })
            }
            CopyEnd::Aborted => {
                self.retrieve_abort().await;
                self.state.abort_acknowledged = true;
                conn.close(CloseStatus::Cancelled).await;
                Ok(Outcome::Cancelled { bytes: count })
            }
            CopyEnd::Local(err) => {
                self.retrieve_abort().await;
                conn.close(CloseStatus::Error).await;
                Err(TransferError::with_source(TransferErrorKind::LocalIo, subject, storage::Error::from(err)))
            }
            CopyEnd::Transport(err) => {
                self.retrieve_abort().await;
                conn.close(CloseStatus::Error).await;
                Err(TransferError::with_source(TransferErrorKind::DataConnection, subject, err))
            }
        }
    }

    /// Ends a transfer after execution: completed and cancelled transfers are recorded with the
    /// listener and the metrics, failed ones are not. Either way the session is left without an
    /// active transfer.
    pub async fn log_transfer(&mut self, result: &Result<Outcome, TransferError>) {
        let Some(active) = self.state.active.take() else {
            return;
        };
        let completion = match result {
            Ok(Outcome::Completed { .. }) => Completion::Complete,
            Ok(Outcome::Cancelled { .. }) => Completion::Incomplete,
            Err(_) => return,
        };
        let elapsed = active.start_time.elapsed();
        slog::debug!(
            self.logger,
            "Transfer completed: {} bytes in {}.{:02} seconds.",
            active.bytes_transferred,
            elapsed.as_secs(),
            elapsed.subsec_millis() / 10
        );

        #[cfg(feature = "prometheus")]
        crate::metrics::add_transfer_metric(active.direction, completion, active.bytes_transferred);

        let record = TransferRecord {
            direction: active.direction,
            bytes: active.bytes_transferred,
            path: active.path.to_string_lossy().into_owned(),
            mode: self.state.mode,
            completion,
            identity: self.user.to_string(),
            access_mode: if self.user.is_anonymous() { AccessMode::Anonymous } else { AccessMode::Real },
            elapsed,
            finished_at: Utc::now(),
            trace_id: self.trace_id.to_string(),
        };
        self.listener.record_transfer(record).await;
    }

    async fn open_at(&self, path: &Path, flags: OpenFlags, offset: u64) -> storage::Result<Storage::File> {
        let mut file = self.storage.open(&self.user, path, flags).await?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(file)
    }

    async fn report_progress(&self, path: &str, bytes: u64, total: u64) {
        let progress = Progress {
            path: path.to_string(),
            bytes,
            total,
        };
        self.listener.record_progress(progress).await;
    }
}
