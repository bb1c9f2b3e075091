//! Contains the [`Session`] and everything that runs in it: the transfer commands, the transfer
//! engine behind them, the data connection abstraction and the idle timer.

pub(crate) mod chancomms;
pub mod commands;
mod datachan;
mod idle;
mod reply;
mod session;
pub mod transfer;

pub use chancomms::{ControlChanMsg, ControlChanReceiver, ControlChanSender};
pub use commands::CommandContext;
pub use datachan::{CloseStatus, DataConnection, StreamConnection};
pub use idle::IdleTimer;
pub use reply::{Reply, ReplyCode};
pub use session::{Session, SessionBuilder, SharedSession, TraceId};
pub use transfer::{AbortSignal, Activity, Direction, Outcome, TransferError, TransferErrorKind, TransferMode};
