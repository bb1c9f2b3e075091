//! The session struct holds everything the transfer commands work on for one connected client.

use super::{
    datachan::DataConnection,
    transfer::{AbortSignal, Activity, HandleRegistry, TransferState},
};
use crate::{
    auth::{AllowAll, Authorizer, UserDetail},
    notification::{NopListener, TransferListener},
    options::TransferOptions,
    storage::StorageBackend,
};
use slog::Drain;
use std::{fmt, sync::Arc};

/// A session shared between the control loop and the commands it runs. Commands hold the lock for
/// their whole duration, transfers included.
pub type SharedSession<Storage, User> = Arc<tokio::sync::Mutex<Session<Storage, User>>>;

/// Identifies a session in logs and transfer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(uuid::Uuid);

impl TraceId {
    /// A new random trace id.
    pub fn new() -> Self {
        TraceId(uuid::Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        TraceId::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// The transfer side of an FTP session: who is logged in, where files live, which policy applies
/// and what REST, APPE, TYPE and ABOR left behind.
pub struct Session<Storage, User>
where
    Storage: StorageBackend<User>,
    User: UserDetail,
{
    pub(crate) storage: Arc<Storage>,
    pub(crate) user: Arc<User>,
    pub(crate) authorizer: Arc<dyn Authorizer<User>>,
    pub(crate) options: Arc<TransferOptions>,
    pub(crate) listener: Arc<dyn TransferListener>,
    pub(crate) logger: slog::Logger,
    pub(crate) state: TransferState,
    pub(crate) handles: HandleRegistry<Storage::File>,
    pub(crate) data_connection: Option<Box<dyn DataConnection>>,
    pub(crate) activity: Activity,
    pub(crate) trace_id: TraceId,
}

impl<Storage, User> fmt::Debug for Session<Storage, User>
where
    Storage: StorageBackend<User>,
    User: UserDetail,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("storage", &self.storage.name())
            .field("user", &self.user)
            .field("state", &self.state)
            .field("handles", &self.handles)
            .field("data_connection", &self.data_connection.is_some())
            .field("trace_id", &self.trace_id)
            .finish()
    }
}

impl<Storage, User> Session<Storage, User>
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
{
    /// Attaches the established data connection the next transfer will use. A transfer command
    /// consumes it.
    pub fn attach_data_connection(&mut self, conn: Box<dyn DataConnection>) {
        self.data_connection = Some(conn);
    }

    /// True if a data connection is attached and waiting for a transfer.
    pub fn has_data_connection(&self) -> bool {
        self.data_connection.is_some()
    }

    /// A handle to request an abort of the running transfer without taking the session lock.
    pub fn abort_handle(&self) -> AbortSignal {
        self.state.abort.clone()
    }

    /// The activity monitor the idle timer watches.
    pub fn activity(&self) -> Activity {
        self.activity.clone()
    }

    /// The transfer state.
    pub fn state(&self) -> &TransferState {
        &self.state
    }

    /// The files this session has open.
    pub fn handles(&self) -> &HandleRegistry<Storage::File> {
        &self.handles
    }

    /// The policy in effect.
    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    /// The logged in user.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Identifies this session.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The logger of this session.
    pub fn logger(&self) -> &slog::Logger {
        &self.logger
    }
}

/// Builds a [`Session`].
///
/// ```no_run
/// use std::sync::Arc;
/// use unftp_xfer::auth::DefaultUser;
/// use unftp_xfer::server::SessionBuilder;
/// use unftp_xfer::storage::Filesystem;
///
/// let session = SessionBuilder::new(Arc::new(Filesystem::new("/srv/ftp").unwrap()), Arc::new(DefaultUser))
///     .logger(slog::Logger::root(slog::Discard, slog::o!()))
///     .build();
/// ```
pub struct SessionBuilder<Storage, User>
where
    Storage: StorageBackend<User>,
    User: UserDetail,
{
    storage: Arc<Storage>,
    user: Arc<User>,
    authorizer: Arc<dyn Authorizer<User>>,
    options: TransferOptions,
    listener: Arc<dyn TransferListener>,
    logger: Option<slog::Logger>,
}

impl<Storage, User> SessionBuilder<Storage, User>
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
{
    /// Starts a session for `user` on `storage`, allowing everything the default
    /// [`TransferOptions`] allow.
    pub fn new(storage: Arc<Storage>, user: Arc<User>) -> Self {
        SessionBuilder {
            storage,
            user,
            authorizer: Arc::new(AllowAll),
            options: TransferOptions::default(),
            listener: Arc::new(NopListener {}),
            logger: None,
        }
    }

    /// Sets the access control.
    pub fn authorizer(mut self, authorizer: Arc<dyn Authorizer<User>>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Sets the transfer policy.
    pub fn options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the receiver of transfer records and progress.
    pub fn listener(mut self, listener: Arc<dyn TransferListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Sets the logger. Without one, logging goes through the `log` crate.
    pub fn logger(mut self, logger: slog::Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Creates the session.
    pub fn build(self) -> Session<Storage, User> {
        let trace_id = TraceId::new();
        let logger = self
            .logger
            .unwrap_or_else(|| slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()))
            .new(slog::o!("trace-id" => format!("{}", trace_id), "username" => format!("{}", self.user)));
        Session {
            storage: self.storage,
            user: self.user,
            authorizer: self.authorizer,
            options: Arc::new(self.options),
            listener: self.listener,
            logger,
            state: TransferState::default(),
            handles: HandleRegistry::default(),
            data_connection: None,
            activity: Activity::default(),
            trace_id,
        }
    }

    /// Creates the session, ready to be shared with the control loop.
    pub fn build_shared(self) -> SharedSession<Storage, User> {
        Arc::new(tokio::sync::Mutex::new(self.build()))
    }
}
