//! Contains the [`UserDetail`] and [`Authorizer`] traits that connect the transfer engine to the
//! server's notion of users and access control.
//!
//! Authentication itself happens elsewhere; by the time a transfer command runs the session holds
//! an authenticated user. To restrict where that user may read or write, implement [`Authorizer`]:
//!
//! ```no_run
//! use unftp_xfer::auth::{Authorizer, DefaultUser, Operation};
//! use async_trait::async_trait;
//! use std::path::Path;
//!
//! #[derive(Debug)]
//! struct ReadOnlyIncoming;
//!
//! #[async_trait]
//! impl Authorizer<DefaultUser> for ReadOnlyIncoming {
//!     async fn authorize(&self, _user: &DefaultUser, operation: Operation, path: &Path) -> bool {
//!         operation == Operation::Read || !path.starts_with("/srv/ftp/incoming")
//!     }
//! }
//! ```

mod authorizer;
pub use authorizer::{AllowAll, Authorizer, Operation};

mod user;
pub use user::{DefaultUser, UserDetail};
