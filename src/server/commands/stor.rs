//! The RFC 959 Store (`STOR`) command
//
// This command causes the server-DTP to accept the data
// transferred via the data connection and to store the data as
// a file at the server site.  If the file specified in the
// pathname exists at the server site, then its contents shall
// be replaced by the data being transferred.  A new file is
// created at the server site if the file specified in the
// pathname does not already exist.

use super::{
    handler::{CommandContext, CommandHandler},
    transfer_reply,
};
use crate::{
    auth::UserDetail,
    server::{reply::Reply, transfer::TransferError},
    storage::StorageBackend,
};
use async_trait::async_trait;

/// `STOR <name>`
#[derive(Debug)]
pub struct Stor {
    path: String,
}

impl Stor {
    /// A STOR of `path` as the client sent it.
    pub fn new(path: impl Into<String>) -> Self {
        Stor { path: path.into() }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Stor
where
    User: UserDetail + 'static,
    Storage: StorageBackend<User> + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, TransferError> {
        let mut session = args.session.lock().await;
        let target = session.validate_store(&self.path).await?;
        let result = session.execute_store(target).await;
        session.log_transfer(&result).await;
        transfer_reply(result)
    }
}
