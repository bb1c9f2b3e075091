//! Keeps the files a session has open for transferring.

use super::error::{TransferError, TransferErrorKind};
use std::path::PathBuf;

/// A file opened by the engine together with the path it was opened at.
#[derive(Debug)]
pub struct OpenHandle<F> {
    pub(crate) file: F,
    pub(crate) path: PathBuf,
}

impl<F> OpenHandle<F> {
    pub(crate) fn new(file: F, path: PathBuf) -> Self {
        OpenHandle { file, path }
    }
}

/// The two slots of a [`HandleRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The file being written by STOR or APPE.
    Upload,
    /// The file being read by RETR.
    Download,
}

/// Holds at most one upload and one download handle per session. Handles leave the registry by
/// being taken, so a handle can be closed only once.
#[derive(Debug)]
pub struct HandleRegistry<F> {
    upload: Option<OpenHandle<F>>,
    download: Option<OpenHandle<F>>,
}

impl<F> Default for HandleRegistry<F> {
    fn default() -> Self {
        HandleRegistry { upload: None, download: None }
    }
}

impl<F> HandleRegistry<F> {
    pub(crate) fn register(&mut self, slot: Slot, handle: OpenHandle<F>) -> Result<(), TransferError> {
        let entry = self.slot_mut(slot);
        if let Some(existing) = entry.as_ref() {
            return Err(TransferError::new(
                TransferErrorKind::InternalInconsistency,
                existing.path.to_string_lossy().into_owned(),
            ));
        }
        *entry = Some(handle);
        Ok(())
    }

    pub(crate) fn get_mut(&mut self, slot: Slot) -> Option<&mut OpenHandle<F>> {
        self.slot_mut(slot).as_mut()
    }

    pub(crate) fn take(&mut self, slot: Slot) -> Option<OpenHandle<F>> {
        self.slot_mut(slot).take()
    }

    /// True if the given slot holds a handle.
    pub fn is_occupied(&self, slot: Slot) -> bool {
        match slot {
            Slot::Upload => self.upload.is_some(),
            Slot::Download => self.download.is_some(),
        }
    }

    /// True if no handles are open.
    pub fn is_empty(&self) -> bool {
        self.upload.is_none() && self.download.is_none()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<OpenHandle<F>> {
        match slot {
            Slot::Upload => &mut self.upload,
            Slot::Download => &mut self.download,
        }
    }
}
