//! Contains the [`StorageBackend`] trait through which the transfer engine reaches the filesystem,
//! and [`Filesystem`], an implementation that keeps its files under a root directory on local disk.
//!
//! To plug in another storage mechanism, implement [`StorageBackend`] and optionally [`Metadata`]:
//!
//! ```no_run
//! use async_trait::async_trait;
//! use unftp_xfer::{
//!   storage::{Metadata, OpenFlags, Result, StorageBackend},
//!   auth::DefaultUser,
//! };
//! use std::{fmt::Debug, path::{Path, PathBuf}};
//!
//! #[derive(Debug)]
//! pub struct Vfs {}
//!
//! #[derive(Debug)]
//! pub struct Meta {
//!     inner: std::fs::Metadata,
//! }
//!
//! #[async_trait]
//! impl StorageBackend<DefaultUser> for Vfs {
//!     type Metadata = Meta;
//!     type File = tokio::fs::File;
//!
//!     async fn resolve_best_path(&self, user: &DefaultUser, raw: &str) -> Option<PathBuf> {
//!         unimplemented!()
//!     }
//!
//!     async fn resolve_real_path(&self, user: &DefaultUser, raw: &str) -> Option<PathBuf> {
//!         unimplemented!()
//!     }
//!
//!     async fn metadata<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P) -> Result<Self::Metadata> {
//!         unimplemented!()
//!     }
//!
//!     async fn open<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P, flags: OpenFlags) -> Result<Self::File> {
//!         unimplemented!()
//!     }
//!
//!     async fn chmod<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P, mode: u32) -> Result<()> {
//!         unimplemented!()
//!     }
//!
//!     async fn chown_group<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P, gid: u32) -> Result<()> {
//!         unimplemented!()
//!     }
//!
//!     async fn unlink<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P) -> Result<()> {
//!         unimplemented!()
//!     }
//! }
//!
//! impl Metadata for Meta {
//!     fn len(&self) -> u64 {
//!         self.inner.len()
//!     }
//!
//!     fn is_dir(&self) -> bool {
//!         self.inner.is_dir()
//!     }
//!
//!     fn is_file(&self) -> bool {
//!         self.inner.is_file()
//!     }
//!
//!     fn is_symlink(&self) -> bool {
//!        self.inner.file_type().is_symlink()
//!     }
//!
//!     fn gid(&self) -> u32 {
//!         0
//!     }
//!
//!     fn uid(&self) -> u32 {
//!         0
//!     }
//! }
//! ```

mod error;
pub use error::{Error, ErrorKind};

mod storage_backend;
pub use storage_backend::{Metadata, OpenFlags, Result, StorageBackend};

mod filesystem;
pub use filesystem::{Filesystem, Meta};
