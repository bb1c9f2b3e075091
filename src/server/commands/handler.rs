use crate::{
    auth::UserDetail,
    server::{reply::Reply, session::SharedSession, transfer::TransferError},
    storage::StorageBackend,
};
use async_trait::async_trait;
use std::fmt::Debug;

/// A transfer command ready to run against a session.
#[async_trait]
pub trait CommandHandler<Storage, User>: Send + Sync + Debug
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
{
    /// Runs the command. Errors are turned into replies by [`dispatch`](super::dispatch).
    async fn handle(&self, args: CommandContext<Storage, User>) -> Result<Reply, TransferError>;
}

/// Convenience struct to group command args
#[derive(Debug)]
pub struct CommandContext<Storage, User>
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
{
    /// The session the command runs in.
    pub session: SharedSession<Storage, User>,
}

impl<Storage, User> CommandContext<Storage, User>
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
{
    /// Creates the context for running a command in `session`.
    pub fn new(session: SharedSession<Storage, User>) -> Self {
        CommandContext { session }
    }
}
