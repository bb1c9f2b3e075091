//! Contains code pertaining to the communication between the transfer engine and the control
//! channel loop that owns the client connection.

use super::reply::Reply;
use std::fmt;
use tokio::sync::mpsc::{Receiver, Sender};

/// Messages that can be sent to the control channel loop.
#[derive(Debug)]
pub enum ControlChanMsg {
    /// Reply on the command channel, outside of the request/response cycle.
    CommandChannelReply(Reply),
    /// Quit the client connection
    ExitControlLoop,
}

impl fmt::Display for ControlChanMsg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The sending half of the control channel.
pub type ControlChanSender = Sender<ControlChanMsg>;
/// The receiving half of the control channel.
pub type ControlChanReceiver = Receiver<ControlChanMsg>;
