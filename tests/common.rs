#![allow(missing_docs)]
#![allow(dead_code)]

use async_trait::async_trait;
use std::{
    collections::VecDeque,
    fmt::Debug,
    io,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite, ReadBuf};
use unftp_xfer::{
    auth::DefaultUser,
    notification::{Progress, TransferListener, TransferRecord},
    options::TransferOptions,
    server::{
        AbortSignal, CloseStatus, CommandContext, DataConnection, Direction, Reply, SessionBuilder, SharedSession,
        TransferMode, commands,
    },
    storage::{Filesystem, Meta, OpenFlags, Result, StorageBackend},
};

/// What a [`MockConnection`] saw, shared with the test after the engine consumed the connection.
#[derive(Debug, Default)]
pub struct ConnLog {
    pub begun: Option<(Direction, String, TransferMode)>,
    pub opened: Option<Option<u64>>,
    pub sent: Vec<u8>,
    pub writes: usize,
    pub closed: Option<CloseStatus>,
}

/// A scripted data connection.
#[derive(Debug, Default)]
pub struct MockConnection {
    inbound: VecDeque<Vec<u8>>,
    log: Arc<Mutex<ConnLog>>,
    fail_open: bool,
    fail_read_after: Option<usize>,
    fail_write_after: Option<usize>,
    abort_after: Option<(usize, AbortSignal)>,
    chunks: usize,
}

impl MockConnection {
    /// A connection over which the client sends `chunks`, then closes.
    pub fn uploading<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        MockConnection {
            inbound: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
            ..Default::default()
        }
    }

    /// A connection the client only reads from.
    pub fn downloading() -> Self {
        MockConnection::default()
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_read_after(mut self, chunks: usize) -> Self {
        self.fail_read_after = Some(chunks);
        self
    }

    /// The client stops reading once `chunks` chunks were sent.
    pub fn failing_write_after(mut self, chunks: usize) -> Self {
        self.fail_write_after = Some(chunks);
        self
    }

    /// Requests an abort through `signal` once `chunks` chunks went over the connection.
    pub fn aborting_after(mut self, chunks: usize, signal: AbortSignal) -> Self {
        self.abort_after = Some((chunks, signal));
        self
    }

    pub fn log(&self) -> Arc<Mutex<ConnLog>> {
        self.log.clone()
    }

    fn count_chunk(&mut self) {
        self.chunks += 1;
        let chunks = self.chunks;
        if let Some((_, signal)) = self.abort_after.as_ref().filter(|(after, _)| chunks >= *after) {
            signal.request();
        }
    }
}

#[async_trait]
impl DataConnection for MockConnection {
    async fn begin(&mut self, direction: Direction, subject: &str, mode: TransferMode) {
        self.log.lock().unwrap().begun = Some((direction, subject.to_string(), mode));
    }

    async fn open(&mut self, expected_len: Option<u64>) -> io::Result<()> {
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "no route to client"));
        }
        self.log.lock().unwrap().opened = Some(expected_len);
        Ok(())
    }

    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_read_after == Some(self.chunks) {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away"));
        }
        let Some(mut chunk) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.inbound.push_front(chunk.split_off(n));
        }
        self.count_chunk();
        Ok(n)
    }

    async fn write_chunk(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.fail_write_after == Some(self.chunks) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "client stopped reading"));
        }
        {
            let mut log = self.log.lock().unwrap();
            log.sent.extend_from_slice(buf);
            log.writes += 1;
        }
        self.count_chunk();
        Ok(())
    }

    async fn close(&mut self, status: CloseStatus) {
        self.log.lock().unwrap().closed = Some(status);
    }
}

/// Keeps every record and progress report it gets.
#[derive(Debug, Default)]
pub struct RecordingListener {
    pub records: Mutex<Vec<TransferRecord>>,
    pub progress: Mutex<Vec<Progress>>,
}

impl RecordingListener {
    pub fn records(&self) -> Vec<TransferRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<Progress> {
        self.progress.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransferListener for RecordingListener {
    async fn record_transfer(&self, record: TransferRecord) {
        self.records.lock().unwrap().push(record);
    }

    async fn record_progress(&self, progress: Progress) {
        self.progress.lock().unwrap().push(progress);
    }
}

/// A file whose writes start failing once `budget` bytes were written, and whose seeks fail when
/// `seek_fails` is set.
#[derive(Debug)]
pub struct FlakyFile {
    inner: tokio::fs::File,
    budget: Option<usize>,
    seek_fails: bool,
}

impl AsyncRead for FlakyFile {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for FlakyFile {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let Some(budget) = this.budget else {
            return Pin::new(&mut this.inner).poll_write(cx, buf);
        };
        if budget == 0 {
            return Poll::Ready(Err(io::Error::other("disk on fire")));
        }
        let n = buf.len().min(budget);
        match Pin::new(&mut this.inner).poll_write(cx, &buf[..n]) {
            Poll::Ready(Ok(written)) => {
                this.budget = Some(budget - written);
                Poll::Ready(Ok(written))
            }
            other => other,
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

impl AsyncSeek for FlakyFile {
    fn start_seek(mut self: Pin<&mut Self>, position: io::SeekFrom) -> io::Result<()> {
        if self.seek_fails {
            return Err(io::Error::other("seek went wrong"));
        }
        Pin::new(&mut self.inner).start_seek(position)
    }

    fn poll_complete(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Pin::new(&mut self.inner).poll_complete(cx)
    }
}

/// A [`Filesystem`] that counts what is done to it.
#[derive(Debug)]
pub struct RecordingStorage {
    inner: Filesystem,
    pub opens: AtomicUsize,
    pub unlinks: AtomicUsize,
    pub chowns: AtomicUsize,
    pub chmods: AtomicUsize,
    write_budget: Option<usize>,
    seek_fails: bool,
}

impl RecordingStorage {
    pub fn new(root: &Path) -> Self {
        RecordingStorage {
            inner: Filesystem::new(root).unwrap(),
            opens: AtomicUsize::new(0),
            unlinks: AtomicUsize::new(0),
            chowns: AtomicUsize::new(0),
            chmods: AtomicUsize::new(0),
            write_budget: None,
            seek_fails: false,
        }
    }

    /// Files opened from now on fail to write past `bytes` bytes.
    pub fn with_write_budget(mut self, bytes: usize) -> Self {
        self.write_budget = Some(bytes);
        self
    }

    /// Files opened from now on cannot seek.
    pub fn with_failing_seek(mut self) -> Self {
        self.seek_fails = true;
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn unlinks(&self) -> usize {
        self.unlinks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend<DefaultUser> for RecordingStorage {
    type Metadata = Meta;
    type File = FlakyFile;

    async fn resolve_best_path(&self, user: &DefaultUser, raw: &str) -> Option<PathBuf> {
        self.inner.resolve_best_path(user, raw).await
    }

    async fn resolve_real_path(&self, user: &DefaultUser, raw: &str) -> Option<PathBuf> {
        self.inner.resolve_real_path(user, raw).await
    }

    async fn metadata<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P) -> Result<Self::Metadata> {
        self.inner.metadata(user, path).await
    }

    async fn open<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P, flags: OpenFlags) -> Result<Self::File> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.open(user, path, flags).await?;
        Ok(FlakyFile {
            inner,
            budget: self.write_budget,
            seek_fails: self.seek_fails,
        })
    }

    async fn chmod<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P, mode: u32) -> Result<()> {
        self.chmods.fetch_add(1, Ordering::SeqCst);
        self.inner.chmod(user, path, mode).await
    }

    async fn chown_group<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P, gid: u32) -> Result<()> {
        self.chowns.fetch_add(1, Ordering::SeqCst);
        self.inner.chown_group(user, path, gid).await
    }

    async fn unlink<P: AsRef<Path> + Send + Debug>(&self, user: &DefaultUser, path: P) -> Result<()> {
        self.unlinks.fetch_add(1, Ordering::SeqCst);
        self.inner.unlink(user, path).await
    }
}

/// A session on a fresh temporary directory.
pub struct Harness {
    pub dir: TempDir,
    pub storage: Arc<RecordingStorage>,
    pub listener: Arc<RecordingListener>,
    pub session: SharedSession<RecordingStorage, DefaultUser>,
}

impl Harness {
    pub fn new(options: TransferOptions) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = RecordingStorage::new(dir.path());
        Harness::with_storage(dir, storage, options)
    }

    pub fn with_storage(dir: TempDir, storage: RecordingStorage, options: TransferOptions) -> Self {
        let storage = Arc::new(storage);
        let listener = Arc::new(RecordingListener::default());
        let session = SessionBuilder::new(storage.clone(), Arc::new(DefaultUser))
            .options(options)
            .listener(listener.clone())
            .logger(slog::Logger::root(slog::Discard, slog::o!()))
            .build_shared();
        Harness {
            dir,
            storage,
            listener,
            session,
        }
    }

    /// Replaces the session with a fresh one under `options`, on the same directory.
    pub fn reconfigure(&mut self, options: TransferOptions) {
        self.session = SessionBuilder::new(self.storage.clone(), Arc::new(DefaultUser))
            .options(options)
            .listener(self.listener.clone())
            .logger(slog::Logger::root(slog::Discard, slog::o!()))
            .build_shared();
    }

    /// The host path of `name` in the session root.
    pub fn path(&self, name: &str) -> PathBuf {
        std::fs::canonicalize(self.dir.path()).unwrap().join(name)
    }

    pub fn write(&self, name: &str, content: &[u8]) {
        std::fs::write(self.path(name), content).unwrap();
    }

    pub fn read(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.path(name)).unwrap()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Attaches `conn` and returns what it will log.
    pub async fn attach(&self, conn: MockConnection) -> Arc<Mutex<ConnLog>> {
        let log = conn.log();
        self.session.lock().await.attach_data_connection(Box::new(conn));
        log
    }

    pub async fn abort_handle(&self) -> AbortSignal {
        self.session.lock().await.abort_handle()
    }

    pub async fn run<H>(&self, handler: H) -> Reply
    where
        H: commands::CommandHandler<RecordingStorage, DefaultUser>,
    {
        commands::dispatch(&handler, CommandContext::new(self.session.clone())).await
    }
}
