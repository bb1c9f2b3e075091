#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/unftp-xfer/0.1.0")]

//! unftp-xfer is the data transfer core of an FTP server. It implements the commands that move
//! file content over a data connection:
//!
//! - `STOR` and `APPE` to upload, with overwrite, append and restart policy
//! - `RETR` to download, with restart policy and progress reporting
//! - `REST` to resume at a byte offset
//! - `ABOR` to cancel an in-flight transfer
//! - `TYPE` to switch between ASCII and binary representation
//!
//! Everything around it is pluggable: the filesystem is a [`StorageBackend`](crate::storage::StorageBackend),
//! access control is an [`Authorizer`](crate::auth::Authorizer), the data channel is a
//! [`DataConnection`](crate::server::DataConnection) and transfer accounting goes to a
//! [`TransferListener`](crate::notification::TransferListener).
//!
//! ```no_run
//! use std::sync::Arc;
//! use unftp_xfer::auth::DefaultUser;
//! use unftp_xfer::options::TransferOptions;
//! use unftp_xfer::server::{commands, CommandContext, SessionBuilder, StreamConnection};
//! use unftp_xfer::storage::Filesystem;
//!
//! # async fn demo(data_socket: tokio::net::TcpStream) {
//! let storage = Filesystem::new("/srv/ftp").unwrap();
//! let session = SessionBuilder::new(Arc::new(storage), Arc::new(DefaultUser {}))
//!     .options(TransferOptions::default().allow_overwrite(true))
//!     .build_shared();
//!
//! session.lock().await.attach_data_connection(Box::new(StreamConnection::new(data_socket)));
//! let ctx = CommandContext::new(session.clone());
//! let reply = commands::dispatch(&commands::Stor::new("report.txt"), ctx).await;
//! println!("{}", reply);
//! # }
//! ```

pub mod auth;
#[cfg(feature = "prometheus")]
pub(crate) mod metrics;
pub mod notification;
pub mod options;
pub mod server;
pub mod storage;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
