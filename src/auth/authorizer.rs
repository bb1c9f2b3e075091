use super::UserDetail;
use async_trait::async_trait;
use derive_more::Display;
use std::{fmt::Debug, path::Path};

/// The kind of access a transfer command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    /// RETR
    #[display("RETR")]
    Read,
    /// STOR
    #[display("STOR")]
    Write,
    /// APPE
    #[display("APPE")]
    Append,
}

/// Decides whether a user may perform an [`Operation`] on a resolved path. This is where
/// directory-level access control lists plug in. It is consulted after path resolution and before
/// anything touches the file.
#[async_trait]
pub trait Authorizer<User: UserDetail>: Sync + Send + Debug {
    /// Returns true if `user` may perform `operation` on `path`.
    async fn authorize(&self, user: &User, operation: Operation, path: &Path) -> bool;
}

/// [`Authorizer`] implementation that simply allows everything.
///
/// # Example
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use unftp_xfer::auth::{AllowAll, Authorizer, DefaultUser, Operation};
///
/// let authorizer = AllowAll;
/// assert!(authorizer.authorize(&DefaultUser, Operation::Write, "/srv/ftp/a.txt".as_ref()).await);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct AllowAll;

#[async_trait]
impl<User: UserDetail> Authorizer<User> for AllowAll {
    #[tracing_attributes::instrument]
    async fn authorize(&self, _user: &User, _operation: Operation, _path: &Path) -> bool {
        true
    }
}
