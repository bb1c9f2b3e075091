//! Defines the service provider interface for storage back-end implementors.

use super::error::Error;
use crate::auth::UserDetail;
use async_trait::async_trait;
use bitflags::bitflags;
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    result,
};

/// Result type used by traits in this module
pub type Result<T> = result::Result<T, Error>;

bitflags! {
    /// The flags a file is opened with. They follow the `open(2)` flags the transfer engine needs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u8 {
        /// Open for reading.
        const READ = 0b0000_0001;
        /// Open for writing.
        const WRITE = 0b0000_0010;
        /// Every write goes to the end of the file.
        const APPEND = 0b0000_0100;
        /// Create the file if it does not exist.
        const CREATE = 0b0000_1000;
        /// Truncate an existing file to zero length.
        const TRUNCATE = 0b0001_0000;
    }
}

/// Represents the metadata of a _FTP File_
pub trait Metadata {
    /// Returns the length (size) of the file in bytes.
    fn len(&self) -> u64;

    /// Returns `self.len() == 0`.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the path is a directory.
    fn is_dir(&self) -> bool;

    /// Returns true if the path is a plain file.
    fn is_file(&self) -> bool;

    /// Returns true if the path is a symbolic link.
    fn is_symlink(&self) -> bool;

    /// Returns the `gid` of the file.
    fn gid(&self) -> u32;

    /// Returns the `uid` of the file.
    fn uid(&self) -> u32;

    /// Returns the permission bits of the file. The default implementation assumes unix permissions
    /// and defaults to "rw-r--r--" (octal 644)
    fn mode(&self) -> u32 {
        0o644
    }
}

/// The `StorageBackend` trait is the filesystem as seen by the transfer engine. It resolves client
/// supplied names to authoritative paths and provides the handful of file operations the STOR,
/// APPE and RETR commands need.
///
/// Implementations must make sure that resolution never yields a path outside of the area the user
/// is allowed to see.
#[async_trait]
pub trait StorageBackend<User: UserDetail>: Send + Sync + Debug {
    /// The concrete type of the _metadata_ used by this storage backend.
    type Metadata: Metadata + Sync + Send;

    /// An open file. Reads, writes and seeks go through the tokio I/O traits; dropping it closes it.
    type File: tokio::io::AsyncRead + tokio::io::AsyncWrite + tokio::io::AsyncSeek + Send + Sync + Unpin + Debug;

    /// Implement to set the name of the storage back-end. By default it returns the type signature.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Resolves the path a file named `raw` would be written to. The file itself does not have to
    /// exist but its directory does. Returns `None` if no such path can be produced.
    async fn resolve_best_path(&self, user: &User, raw: &str) -> Option<PathBuf>;

    /// Resolves `raw` to the real path of an existing entry, following symbolic links. Returns
    /// `None` if the entry does not exist or resolves outside of the user's area.
    async fn resolve_real_path(&self, user: &User, raw: &str) -> Option<PathBuf>;

    /// Returns the `Metadata` for the given file.
    ///
    /// [`Metadata`]: ./trait.Metadata.html
    async fn metadata<P: AsRef<Path> + Send + Debug>(&self, user: &User, path: P) -> Result<Self::Metadata>;

    /// Opens the file at the given resolved path.
    async fn open<P: AsRef<Path> + Send + Debug>(&self, user: &User, path: P, flags: OpenFlags) -> Result<Self::File>;

    /// Sets the permission bits of the given file.
    async fn chmod<P: AsRef<Path> + Send + Debug>(&self, user: &User, path: P, mode: u32) -> Result<()>;

    /// Changes the group ownership of the given file, leaving the owner as it is.
    async fn chown_group<P: AsRef<Path> + Send + Debug>(&self, user: &User, path: P, gid: u32) -> Result<()>;

    /// Removes the given file.
    async fn unlink<P: AsRef<Path> + Send + Debug>(&self, user: &User, path: P) -> Result<()>;
}
