//! A [`StorageBackend`] that uses a local filesystem, like a traditional FTP server.

use super::{Error, ErrorKind, Metadata, OpenFlags, Result, StorageBackend};
use crate::auth::UserDetail;
use async_trait::async_trait;
use std::{
    fmt::Debug,
    io,
    path::{Component, Path, PathBuf},
};

#[cfg(unix)]
use std::os::unix::fs::{MetadataExt, PermissionsExt};

/// The Filesystem struct is an implementation of the StorageBackend trait that keeps its files
/// inside a specific root directory on local disk. Client supplied names are interpreted relative
/// to that root and can never resolve to a path outside of it.
#[derive(Debug)]
pub struct Filesystem {
    root: PathBuf,
}

/// Metadata for the storage back-end
#[derive(Debug)]
pub struct Meta {
    inner: std::fs::Metadata,
}

impl Filesystem {
    /// Create a new Filesystem backend, with the given root. No operations can take place outside
    /// of the root. For example, when the `Filesystem` root is set to `/srv/ftp`, and a client
    /// asks for `hello.txt`, the server will send it `/srv/ftp/hello.txt`.
    pub fn new<P: Into<PathBuf>>(root: P) -> io::Result<Self> {
        let root = std::fs::canonicalize(root.into())?;
        Ok(Filesystem { root })
    }

    /// The canonical root directory of this back-end.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // Maps the client supplied name onto the host filesystem. Leading slashes are relative to the
    // root and `..` never climbs above it, the way a chrooted server sees things.
    fn host_path(&self, raw: &str) -> PathBuf {
        let mut rel = PathBuf::new();
        for component in Path::new(raw).components() {
            match component {
                Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
                Component::ParentDir => {
                    rel.pop();
                }
                Component::Normal(part) => rel.push(part),
            }
        }
        self.root.join(rel)
    }

    fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

#[async_trait]
impl<User: UserDetail> StorageBackend<User> for Filesystem {
    type Metadata = Meta;
    type File = tokio::fs::File;

    #[tracing_attributes::instrument]
    async fn resolve_best_path(&self, _user: &User, raw: &str) -> Option<PathBuf> {
        let candidate = self.host_path(raw);
        if candidate == self.root {
            return None;
        }
        if let Ok(real) = tokio::fs::canonicalize(&candidate).await {
            return self.contains(&real).then_some(real);
        }
        // A dangling symlink would be followed on create, possibly out of the root.
        if tokio::fs::symlink_metadata(&candidate).await.is_ok() {
            return None;
        }
        let file_name = candidate.file_name()?.to_owned();
        let dir = tokio::fs::canonicalize(candidate.parent()?).await.ok()?;
        if !self.contains(&dir) || !tokio::fs::metadata(&dir).await.ok()?.is_dir() {
            return None;
        }
        Some(dir.join(file_name))
    }

    #[tracing_attributes::instrument]
    async fn resolve_real_path(&self, _user: &User, raw: &str) -> Option<PathBuf> {
        let real = tokio::fs::canonicalize(self.host_path(raw)).await.ok()?;
        self.contains(&real).then_some(real)
    }

    #[tracing_attributes::instrument]
    async fn metadata<P: AsRef<Path> + Send + Debug>(&self, _user: &User, path: P) -> Result<Self::Metadata> {
        let inner = tokio::fs::metadata(path.as_ref()).await?;
        Ok(Meta { inner })
    }

    #[tracing_attributes::instrument]
    async fn open<P: AsRef<Path> + Send + Debug>(&self, _user: &User, path: P, flags: OpenFlags) -> Result<Self::File> {
        let mut oo = tokio::fs::OpenOptions::new();
        oo.read(flags.contains(OpenFlags::READ))
            .write(flags.contains(OpenFlags::WRITE))
            .append(flags.contains(OpenFlags::APPEND))
            .create(flags.contains(OpenFlags::CREATE))
            .truncate(flags.contains(OpenFlags::TRUNCATE));
        Ok(oo.open(path.as_ref()).await?)
    }

    #[tracing_attributes::instrument]
    async fn chmod<P: AsRef<Path> + Send + Debug>(&self, _user: &User, path: P, mode: u32) -> Result<()> {
        #[cfg(unix)]
        {
            let permissions = std::fs::Permissions::from_mode(mode);
            tokio::fs::set_permissions(path.as_ref(), permissions).await?;
        }
        #[cfg(not(unix))]
        let _ = (path, mode);
        Ok(())
    }

    #[tracing_attributes::instrument]
    async fn chown_group<P: AsRef<Path> + Send + Debug>(&self, _user: &User, path: P, gid: u32) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || nix::unistd::chown(&path, None, Some(nix::unistd::Gid::from_raw(gid))))
            .await
            .map_err(|e| Error::new(ErrorKind::LocalError, e))?
            .map_err(|errno| Error::from(io::Error::from(errno)))
    }

    #[tracing_attributes::instrument]
    async fn unlink<P: AsRef<Path> + Send + Debug>(&self, _user: &User, path: P) -> Result<()> {
        tokio::fs::remove_file(path.as_ref()).await.map_err(|error: std::io::Error| error.into())
    }
}

impl Metadata for Meta {
    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn is_dir(&self) -> bool {
        self.inner.is_dir()
    }

    fn is_file(&self) -> bool {
        self.inner.is_file()
    }

    fn is_symlink(&self) -> bool {
        self.inner.file_type().is_symlink()
    }

    #[cfg(unix)]
    fn gid(&self) -> u32 {
        self.inner.gid()
    }

    #[cfg(not(unix))]
    fn gid(&self) -> u32 {
        0
    }

    #[cfg(unix)]
    fn uid(&self) -> u32 {
        self.inner.uid()
    }

    #[cfg(not(unix))]
    fn uid(&self) -> u32 {
        0
    }

    #[cfg(unix)]
    fn mode(&self) -> u32 {
        self.inner.mode() & 0o7777
    }
}
