//! The transfer engine: validation of STOR, APPE and RETR targets, the copy loops that execute
//! them and the cleanup that runs when they end.
//!
//! A transfer goes through two phases. A `validate_*` method of the
//! [`Session`](crate::server::Session) resolves and checks the requested name without touching
//! the file and returns a [`ResolvedTarget`]. That target is then moved into the matching
//! `execute_*` method, which opens the file, copies it over the data connection and always runs
//! one of the cleanup handlers before returning.

mod cleanup;
mod engine;
mod error;
mod registry;
mod state;
mod validate;

pub use engine::Outcome;
pub use error::{TransferError, TransferErrorKind};
pub use registry::{HandleRegistry, OpenHandle, Slot};
pub use state::{AbortSignal, ActiveTransfer, Activity, Direction, TransferGuard, TransferMode, TransferState};
pub use validate::{Intent, ResolvedTarget};
