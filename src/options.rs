//! Contains the policy options that govern STOR, APPE and RETR.

use regex::Regex;
use std::time::Duration;

/// The default size of the buffer an upload is copied through.
pub const DEFAULT_RECV_WINDOW: usize = 1024;
/// The default size of the buffer a download is copied through.
pub const DEFAULT_SEND_WINDOW: usize = 1024;
/// The default number of seconds a logged in session may sit without moving any bytes.
pub const DEFAULT_NO_TRANSFER_TIMEOUT_SECS: u64 = 300;

/// Transfer policy for a session. Everything is denied by default except plain uploads of new files
/// and plain downloads.
///
/// # Example
///
/// ```rust
/// use unftp_xfer::options::TransferOptions;
///
/// let options = TransferOptions::default()
///     .allow_overwrite(true)
///     .allow_retrieve_restart(true)
///     .path_deny_filter(r"\.exe$")
///     .unwrap()
///     .recv_window(8192);
/// assert!(options.allow_overwrite);
/// ```
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// May STOR replace an existing file.
    pub allow_overwrite: bool,
    /// May REST followed by STOR, or APPE, write into an existing file.
    pub allow_store_restart: bool,
    /// May REST followed by RETR start a download halfway.
    pub allow_retrieve_restart: bool,
    /// If set, upload names must match this pattern.
    pub path_allow_filter: Option<Regex>,
    /// If set, upload names must not match this pattern.
    pub path_deny_filter: Option<Regex>,
    /// Size of the buffer uploads are copied through.
    pub recv_window: usize,
    /// Size of the buffer downloads are copied through.
    pub send_window: usize,
    /// When set, uploaded files are handed to this group after they were stored.
    pub force_group: Option<u32>,
    /// Close the session after this long without a transfer. `None` disables the timer.
    pub no_transfer_timeout: Option<Duration>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        TransferOptions {
            allow_overwrite: false,
            allow_store_restart: false,
            allow_retrieve_restart: false,
            path_allow_filter: None,
            path_deny_filter: None,
            recv_window: DEFAULT_RECV_WINDOW,
            send_window: DEFAULT_SEND_WINDOW,
            force_group: None,
            no_transfer_timeout: Some(Duration::from_secs(DEFAULT_NO_TRANSFER_TIMEOUT_SECS)),
        }
    }
}

impl TransferOptions {
    /// Allows STOR to replace existing files.
    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    /// Allows uploads to resume into, or append to, existing files.
    pub fn allow_store_restart(mut self, allow: bool) -> Self {
        self.allow_store_restart = allow;
        self
    }

    /// Allows downloads to start at a REST offset.
    pub fn allow_retrieve_restart(mut self, allow: bool) -> Self {
        self.allow_retrieve_restart = allow;
        self
    }

    /// Only accept upload names matching `pattern`.
    pub fn path_allow_filter(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.path_allow_filter = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Reject upload names matching `pattern`.
    pub fn path_deny_filter(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.path_deny_filter = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Sets the upload buffer size. Zero is taken as one.
    pub fn recv_window(mut self, size: usize) -> Self {
        self.recv_window = size.max(1);
        self
    }

    /// Sets the download buffer size. Zero is taken as one.
    pub fn send_window(mut self, size: usize) -> Self {
        self.send_window = size.max(1);
        self
    }

    /// Hands uploaded files to the given group.
    pub fn force_group(mut self, gid: u32) -> Self {
        self.force_group = Some(gid);
        self
    }

    /// Sets the no-transfer timeout. `None` disables it.
    pub fn no_transfer_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.no_transfer_timeout = timeout;
        self
    }

    /// True if `name` passes the configured allow and deny filters.
    pub fn name_permitted(&self, name: &str) -> bool {
        let allowed = self.path_allow_filter.as_ref().is_none_or(|allow| allow.is_match(name));
        let denied = self.path_deny_filter.as_ref().is_some_and(|deny| deny.is_match(name));
        allowed && !denied
    }
}
