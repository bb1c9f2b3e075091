//! This module contains the implementations of the transfer related FTP commands defined in
//! [RFC 959 - FTP](https://tools.ietf.org/html/rfc959):
//!
//! `STOR`, `APPE`, `RETR`, `REST`, `ABOR` and `TYPE`.
//!
//! Each command is a [`CommandHandler`]. Run them through [`dispatch`] to get the reply for the
//! client whatever the outcome.

mod abor;
mod appe;
mod handler;
mod rest;
mod retr;
mod stor;
mod type_;

pub use abor::Abor;
pub use appe::Appe;
pub use handler::{CommandContext, CommandHandler};
pub use rest::{Rest, parse_offset};
pub use retr::Retr;
pub use stor::Stor;
pub use type_::{Type, parse_type};

use crate::{
    auth::UserDetail,
    server::{
        reply::{Reply, ReplyCode},
        transfer::{Outcome, TransferError},
    },
    storage::StorageBackend,
};

/// Runs `handler` and turns its result into the reply for the client. Failures are logged.
pub async fn dispatch<Storage, User, H>(handler: &H, args: CommandContext<Storage, User>) -> Reply
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
    H: CommandHandler<Storage, User> + ?Sized,
{
    let session = args.session.clone();
    match handler.handle(args).await {
        Ok(reply) => reply,
        Err(err) => {
            let logger = session.lock().await.logger().clone();
            slog::warn!(logger, "{:?} failed: {}", handler, err);
            Reply::from(&err)
        }
    }
}

fn transfer_reply(result: Result<Outcome, TransferError>) -> Result<Reply, TransferError> {
    match result? {
        Outcome::Completed { .. } => Ok(Reply::new(ReplyCode::ClosingDataConnection, "Transfer complete.")),
        Outcome::Cancelled { .. } => Ok(Reply::new(ReplyCode::ConnectionClosed, "Transfer aborted. Data connection closed.")),
    }
}
