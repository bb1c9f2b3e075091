//! The no-transfer timeout: closes a session that sits logged in without moving any bytes.

use super::{
    chancomms::{ControlChanMsg, ControlChanSender},
    reply::{Reply, ReplyCode},
    session::Session,
    transfer::Activity,
};
use crate::{auth::UserDetail, storage::StorageBackend};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A re-arming timer over the [`Activity`] of a session. While a transfer runs it keeps re-arming.
/// Once no bytes moved for the whole timeout it tells the client, asks the control loop to exit,
/// cancels the login grace timer and stops. Dropping the timer disarms it.
#[derive(Debug)]
pub struct IdleTimer {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl IdleTimer {
    /// Starts the timer.
    pub fn arm(
        timeout: Duration,
        activity: Activity,
        control_tx: ControlChanSender,
        login_grace: Option<CancellationToken>,
        logger: slog::Logger,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(watch(timeout, activity, control_tx, login_grace, logger, cancel.clone()));
        IdleTimer { cancel, task }
    }

    /// Starts the timer with the timeout configured for `session`. Returns `None` when the timeout
    /// is disabled.
    pub fn for_session<Storage, User>(
        session: &Session<Storage, User>,
        control_tx: ControlChanSender,
        login_grace: Option<CancellationToken>,
    ) -> Option<Self>
    where
        Storage: StorageBackend<User> + 'static,
        User: UserDetail + 'static,
    {
        let timeout = session.options().no_transfer_timeout?;
        Some(Self::arm(timeout, session.activity(), control_tx, login_grace, session.logger().clone()))
    }

    /// Stops the timer.
    pub fn disarm(&self) {
        self.cancel.cancel();
    }

    /// True until the timer was disarmed or fired.
    pub fn is_armed(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn watch(
    timeout: Duration,
    activity: Activity,
    control_tx: ControlChanSender,
    login_grace: Option<CancellationToken>,
    logger: slog::Logger,
    cancel: CancellationToken,
) {
    let mut wait = timeout.saturating_sub(activity.idle_for());
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(wait) => {}
        }
        if activity.is_transferring() {
            wait = timeout;
            continue;
        }
        let idle = activity.idle_for();
        if idle < timeout {
            wait = timeout - idle;
            continue;
        }
        break;
    }

    slog::info!(logger, "FTP no transfer time out, disconnected.");
    let reply = Reply::new_with_string(
        ReplyCode::ServiceNotAvailable,
        format!("No Transfer Timeout ({} seconds): closing control connection.", timeout.as_secs()),
    );
    if let Err(err) = control_tx.send(ControlChanMsg::CommandChannelReply(reply)).await {
        slog::warn!(logger, "Could not send the idle timeout reply: {}", err);
    }
    if let Err(err) = control_tx.send(ControlChanMsg::ExitControlLoop).await {
        slog::warn!(logger, "Could not ask the control loop to close the idle session: {}", err);
    }
    if let Some(login_grace) = login_grace {
        login_grace.cancel();
    }
    cancel.cancel();
}
