use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The Error returned by storage backends. Storage backend implementations should choose the
/// `ErrorKind` carefully since it determines the reply the FTP client gets when a transfer cannot
/// be started or fails halfway.
#[derive(Debug, Error)]
#[error("storage error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new storage error
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// Detailed information about what the FTP server should do with the failure
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Attempts to get a reference to the inner `std::io::Error` if there is one.
    pub fn get_io_error(&self) -> Option<&std::io::Error> {
        self.source.as_ref()?.downcast_ref::<std::io::Error>()
    }

    /// A short human readable description of the underlying cause, preferring the OS error text
    /// when there is one. This is what ends up after the file name in the client reply.
    pub fn detail(&self) -> String {
        match self.get_io_error() {
            Some(io) => io.to_string(),
            None => match &self.source {
                Some(source) => source.to_string(),
                None => self.kind.description().to_string(),
            },
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::PermanentFileNotAvailable,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::StorageFull => ErrorKind::InsufficientStorageSpaceError,
            std::io::ErrorKind::QuotaExceeded => ErrorKind::ExceededStorageAllocationError,
            std::io::ErrorKind::WouldBlock => ErrorKind::TransientFileNotAvailable,
            _ => ErrorKind::LocalError,
        };
        Error::new(kind, err)
    }
}

/// The `ErrorKind` variants that can be produced by the [`StorageBackend`] implementations.
///
/// [`StorageBackend`]: trait.StorageBackend.html
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// The file is temporarily unavailable, for example because it is locked. A retry may succeed.
    #[display("450 Transient file not available")]
    TransientFileNotAvailable,
    /// The file does not exist or can never be made available.
    #[display("550 Permanent file not available")]
    PermanentFileNotAvailable,
    /// Access to the file was denied by the underlying storage.
    #[display("550 Permission denied")]
    PermissionDenied,
    /// The storage ran out of space while writing.
    #[display("452 Insufficient storage space error")]
    InsufficientStorageSpaceError,
    /// A quota or allocation limit was hit while writing.
    #[display("552 Exceeded storage allocation error")]
    ExceededStorageAllocationError,
    /// Any other local failure of the storage back-end.
    #[display("451 Local error")]
    LocalError,
}

impl ErrorKind {
    fn description(self) -> &'static str {
        match self {
            ErrorKind::TransientFileNotAvailable => "File temporarily unavailable",
            ErrorKind::PermanentFileNotAvailable => "No such file or directory",
            ErrorKind::PermissionDenied => "Permission denied",
            ErrorKind::InsufficientStorageSpaceError => "No space left on device",
            ErrorKind::ExceededStorageAllocationError => "Disk quota exceeded",
            ErrorKind::LocalError => "Local error",
        }
    }
}
