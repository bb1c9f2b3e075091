//! The handlers that end a transfer. Each exit path of the engine runs exactly one of them once the
//! file is open, and each is a no-op when its handle slot is already empty.

use super::registry::Slot;
use crate::{
    auth::UserDetail,
    server::session::Session,
    storage::{Metadata, StorageBackend},
};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

impl<Storage, User> Session<Storage, User>
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
{
    /// Closes the upload and, if configured, hands the file to the forced group.
    pub(crate) async fn store_done(&mut self) {
        let Some(path) = self.close_handle(Slot::Upload).await else {
            return;
        };
        if let Some(gid) = self.options.force_group {
            self.force_group(&path, gid).await;
        }
    }

    /// Closes the upload and removes the partial file.
    ///
    /// The whole file goes, so an aborted APPE or restarted STOR also loses the content it was
    /// extending. A half-written file is never left behind.
    pub(crate) async fn store_abort(&mut self) {
        if let Some(path) = self.close_handle(Slot::Upload).await {
            self.remove_quietly(&path).await;
        }
    }

    /// Closes the download.
    pub(crate) async fn retrieve_done(&mut self) {
        self.close_handle(Slot::Download).await;
    }

    /// Closes the download. Nothing to undo on disk.
    pub(crate) async fn retrieve_abort(&mut self) {
        self.close_handle(Slot::Download).await;
    }

    // Takes the handle out of the registry, flushes and drops it. Returns where it was open.
    pub(crate) async fn close_handle(&mut self, slot: Slot) -> Option<PathBuf> {
        let mut handle = self.handles.take(slot)?;
        if let Err(err) = handle.file.flush().await {
            slog::debug!(self.logger, "Flush on close of {:?} failed: {}", handle.path, err);
        }
        Some(handle.path)
    }

    pub(crate) async fn remove_quietly(&self, path: &Path) {
        if let Err(err) = self.storage.unlink(&self.user, path).await {
            slog::warn!(self.logger, "Could not remove partial file {:?}: {}", path, err);
        }
    }

    // Changing the group may reset the permission bits on some filesystems, so they are put back.
    async fn force_group(&self, path: &Path, gid: u32) {
        let mode = match self.storage.metadata(&self.user, path).await {
            Ok(meta) => meta.mode(),
            Err(err) => {
                slog::warn!(self.logger, "stat({:?}) failed: {}", path, err);
                return;
            }
        };
        match self.storage.chown_group(&self.user, path, gid).await {
            Ok(()) => {
                if let Err(err) = self.storage.chmod(&self.user, path, mode).await {
                    slog::warn!(self.logger, "chmod({:?}) failed: {}", path, err);
                }
            }
            Err(err) => slog::warn!(self.logger, "chown({:?}) failed: {}", path, err),
        }
    }
}
