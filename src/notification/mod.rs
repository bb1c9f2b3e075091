//! Allows users to listen to the transfer accounting emitted by the engine.
//!
//! Every STOR, APPE and RETR that got as far as moving bytes produces one [`TransferRecord`] when
//! it ends, whether it completed or was cut short. Downloads additionally report their progress
//! through [`Progress`] values while the copy is running.
//!
//! To receive them implement the [`TransferListener`] trait and hand it to
//! [`SessionBuilder::listener`](crate::server::SessionBuilder::listener).

pub(crate) mod event;
pub(crate) mod nop;

pub use event::{AccessMode, Completion, Progress, TransferListener, TransferRecord};
pub use nop::NopListener;
