//! Contains the error type of the transfer commands and its mapping onto FTP replies.

use super::state::Direction;
use crate::{
    BoxError,
    server::reply::{Reply, ReplyCode},
    storage,
};
use derive_more::Display;
use thiserror::Error;

/// Why a transfer command failed. Cancellation is not in here: a transfer stopped by ABOR ends
/// with [`Outcome::Cancelled`](crate::server::Outcome::Cancelled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransferErrorKind {
    /// Path resolution or access control refused the path.
    #[display("Permission denied")]
    Unauthorized,
    /// STOR would replace an existing file.
    #[display("Overwrite permission denied")]
    OverwriteDenied,
    /// The target exists but is not a plain file.
    #[display("Not a regular file")]
    NotRegularFile,
    /// A restart or append into an existing file is not allowed.
    #[display("Restart not permitted")]
    RestartNotPermitted(Direction),
    /// The name did not pass the configured filename filters.
    #[display("Forbidden filename")]
    ForbiddenName,
    /// The file to download does not exist.
    #[display("No such file or directory")]
    NotFound,
    /// Missing or surplus arguments, or a parameter that is not understood.
    #[display("Command not understood")]
    SyntaxError,
    /// A syntactically valid argument with a value that is out of range.
    #[display("Invalid argument")]
    InvalidArgument,
    /// ABOR while nothing was running.
    #[display("No command to abort")]
    NothingToAbort,
    /// The storage back-end could not open or position the file.
    #[display("File unavailable")]
    FileUnavailable,
    /// Reading or writing the file failed halfway.
    #[display("Local I/O error")]
    LocalIo,
    /// No data connection was attached to the session.
    #[display("No data connection established")]
    NoDataConnection,
    /// The data connection could not be opened.
    #[display("Unable to build data connection")]
    DataConnectionUnavailable,
    /// The data connection failed during the transfer.
    #[display("Data connection failed")]
    DataConnection,
    /// The engine was used against its contract.
    #[display("Internal error")]
    InternalInconsistency,
}

/// The error returned by the transfer commands. `subject` is what the client sent: the file name
/// for STOR, APPE and RETR or the full command line for syntax errors.
#[derive(Debug, Error)]
#[error("{subject}: {kind}")]
pub struct TransferError {
    kind: TransferErrorKind,
    subject: String,
    #[source]
    source: Option<BoxError>,
}

impl TransferError {
    /// Creates an error without an underlying cause.
    pub fn new(kind: TransferErrorKind, subject: impl Into<String>) -> Self {
        TransferError {
            kind,
            subject: subject.into(),
            source: None,
        }
    }

    /// Creates an error caused by `source`.
    pub fn with_source<E>(kind: TransferErrorKind, subject: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        TransferError {
            kind,
            subject: subject.into(),
            source: Some(source.into()),
        }
    }

    /// The kind of failure.
    pub fn kind(&self) -> TransferErrorKind {
        self.kind
    }

    /// The name or command line the error is about.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    // The OS level explanation if there is one.
    fn detail(&self) -> String {
        match &self.source {
            Some(source) => match source.downcast_ref::<storage::Error>() {
                Some(storage) => storage.detail(),
                None => source.to_string(),
            },
            None => self.kind.to_string(),
        }
    }

    fn storage_kind(&self) -> Option<storage::ErrorKind> {
        self.source.as_ref()?.downcast_ref::<storage::Error>().map(|e| e.kind())
    }
}

impl From<&TransferError> for Reply {
    fn from(err: &TransferError) -> Self {
        use TransferErrorKind::*;
        let subject = &err.subject;
        match err.kind {
            Unauthorized | OverwriteDenied | ForbiddenName | NotFound => {
                Reply::new_with_string(ReplyCode::FileError, format!("{}: {}", subject, err.kind))
            }
            NotRegularFile => Reply::new_with_string(ReplyCode::BadFileName, format!("{}: {}", subject, err.kind)),
            RestartNotPermitted(Direction::Inbound) => {
                Reply::new_with_string(ReplyCode::LocalError, format!("{}: Append/Restart not permitted, try again.", subject))
            }
            RestartNotPermitted(Direction::Outbound) => {
                Reply::new_with_string(ReplyCode::LocalError, format!("{}: Restart not permitted, try again.", subject))
            }
            SyntaxError => Reply::new_with_string(ReplyCode::CommandSyntaxError, format!("'{}' not understood.", subject)),
            InvalidArgument => Reply::new_with_string(
                ReplyCode::ParameterSyntaxError,
                format!("{} requires a value greater than or equal to 0.", subject),
            ),
            NothingToAbort => Reply::new(ReplyCode::CommandSyntaxError, "No command to abort."),
            FileUnavailable => Reply::new_with_string(ReplyCode::FileError, format!("{}: {}", subject, err.detail())),
            LocalIo => {
                let code = match err.storage_kind() {
                    Some(storage::ErrorKind::InsufficientStorageSpaceError) => ReplyCode::OutOfSpace,
                    Some(storage::ErrorKind::ExceededStorageAllocationError) => ReplyCode::ExceededStorageAllocation,
                    Some(storage::ErrorKind::TransientFileNotAvailable) => ReplyCode::TransientFileError,
                    _ => ReplyCode::LocalError,
                };
                Reply::new_with_string(code, format!("{}: {}", subject, err.detail()))
            }
            NoDataConnection => Reply::new(ReplyCode::CantOpenDataConnection, "No data connection established"),
            DataConnectionUnavailable => {
                Reply::new_with_string(ReplyCode::CantOpenDataConnection, format!("Unable to build data connection: {}", err.detail()))
            }
            DataConnection => Reply::new_with_string(ReplyCode::ConnectionClosed, format!("Data connection closed: {}", err.detail())),
            InternalInconsistency => Reply::new_with_string(ReplyCode::FileError, format!("{}: internal error", subject)),
        }
    }
}

impl From<TransferError> for Reply {
    fn from(err: TransferError) -> Self {
        Reply::from(&err)
    }
}
