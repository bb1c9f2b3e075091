//! The RFC 959 Append (`APPE`) command
//
// This command causes the server-DTP to accept the data
// transferred via the data connection and to store the data in
// a file at the server site.  If the file specified in the
// pathname exists at the server site, the data shall be
// appended to that file; otherwise the file shall be created.

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

/// `APPE <name>`
#[derive(Debug)]
pub struct Appe {
    path: String,
}

impl Appe {
    /// An APPE to `path` as the client sent it.
    pub fn new(path: impl Into<String>) -> Self {
        Appe { path: path.into() }
    }
}

#[async_trait]
impl<Storage, User> CommandHandler<Storage, User> for Appe
where
    User: UserDetail + 'static,
    Storage: StorageBackend<User> + 'static,
{
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, TransferError> {
        let mut session = args.session.lock().await;
        let target = session.validate_append(&self.path).await?;
        let result = session.execute_store(target).await;
        session.log_transfer(&result).await;
        transfer_reply(result)
    }
}
