//! The RFC 959 Abort (`ABOR`) command
//
// This command tells the server to abort the previous FTP
// service command and any associated transfer of data. The
// abort command may require "special action", as discussed in
// the Section on FTP Commands, to force recognition by the
// server.  No action is to be taken if the previous command
// has been completed (including data transfer).  The control
// connection is not to be closed by the server, but the data
// connection must be closed.
//
// The special action is the control loop calling `AbortSignal::request` on the session's abort
// handle as soon as it sees ABOR, while the transfer still holds the session. This command runs
// afterwards and clears the flags.

use super::handler::{CommandContext, CommandHandler};
use crate::{
    auth::UserDetail,
    server::{
        reply::{Reply, ReplyCode},
        transfer::{TransferError, TransferErrorKind},
    },
    storage::StorageBackend,
};
use async_trait::async_trait;

/// `ABOR`
#[derive(Debug)]
pub struct Abor {
    arg: String,
}

impl Abor {
    /// An ABOR with the argument as the client sent it, which should be empty.
    pub fn new(arg: impl Into<String>) -> Self {
        Abor { arg: arg.into() }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Abor
where
    User: UserDetail + 'static,
    Storage: StorageBackend<User> + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, TransferError> {
        let arg = self.arg.trim();
        if !arg.is_empty() {
            return Err(TransferError::new(TransferErrorKind::SyntaxError, format!("ABOR {}", arg)));
        }
        let mut session = args.session.lock().await;
        if !session.state.abort_pending() {
            return Err(TransferError::new(TransferErrorKind::NothingToAbort, "ABOR"));
        }
        session.state.clear_abort();
        slog::info!(session.logger, "Abort acknowledged");
        Ok(Reply::new(ReplyCode::ClosingDataConnection, "Abort successful"))
    }
}
