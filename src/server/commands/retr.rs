//! The RFC 959 Retrieve (`RETR`) command
//
// This command causes the server-DTP to transfer a copy of the
// file, specified in the pathname, to the server- or user-DTP
// at the other end of the data connection.  The status and
// contents of the file at the server site shall be unaffected.

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

/// `RETR <name>`
#[derive(Debug)]
pub struct Retr {
    path: String,
}

impl Retr {
    /// A RETR of `path` as the client sent it.
    pub fn new(path: impl Into<String>) -> Self {
        Retr { path: path.into() }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Retr
where
    User: UserDetail + 'static,
    Storage: StorageBackend<User> + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, TransferError> {
        let mut session = args.session.lock().await;
        let target = session.validate_retrieve(&self.path).await?;
        let result = session.execute_retrieve(target).await;
        session.log_transfer(&result).await;
        transfer_reply(result)
    }
}
