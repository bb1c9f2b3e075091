//! Path resolution and policy checks that run before a transfer touches the filesystem. Nothing
//! in here opens, creates, writes or removes files: paths are resolved and stat-ed, no more.

use super::{
    error::{TransferError, TransferErrorKind},
    state::Direction,
};
use crate::{
    auth::{Operation, UserDetail},
    server::session::Session,
    storage::{Metadata, StorageBackend},
};
use std::path::PathBuf;

/// What a validated command is going to do with its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// STOR
    Store,
    /// APPE
    Append,
    /// RETR
    Retrieve,
}

/// A path that passed validation, ready for exactly one execution. It is produced by one of the
/// `validate_*` methods of a [`Session`] and consumed by the matching `execute_*` method.
#[derive(Debug)]
pub struct ResolvedTarget {
    pub(crate) canonical_path: PathBuf,
    pub(crate) existing_mode: Option<u32>,
    pub(crate) intent: Intent,
    pub(crate) subject: String,
}

impl ResolvedTarget {
    /// The resolved path on the storage back-end.
    pub fn path(&self) -> &std::path::Path {
        &self.canonical_path
    }

    /// The permission bits of the file if it existed at validation time.
    pub fn existing_mode(&self) -> Option<u32> {
        self.existing_mode
    }

    /// What the target was validated for.
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// The name as the client sent it.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl<Storage, User> Session<Storage, User>
where
    Storage: StorageBackend<User> + 'static,
    User: UserDetail + 'static,
{
    /// Validates a STOR. On failure the restart offset and append flag are reset, so they cannot
    /// leak into a later command.
    pub async fn validate_store(&mut self, requested: &str) -> Result<ResolvedTarget, TransferError> {
        let result = self.check_store(requested).await;
        if result.is_err() {
            self.state.reset_restart();
        }
        result
    }

    /// Validates an APPE: a STOR that appends to the target.
    pub async fn validate_append(&mut self, requested: &str) -> Result<ResolvedTarget, TransferError> {
        self.state.append_mode = true;
        self.state.restart_offset = 0;
        self.validate_store(requested).await
    }

    /// Validates a RETR. On failure the restart offset is reset.
    pub async fn validate_retrieve(&mut self, requested: &str) -> Result<ResolvedTarget, TransferError> {
        let result = self.check_retrieve(requested).await;
        if result.is_err() {
            self.state.reset_restart();
        }
        result
    }

    async fn check_store(&self, requested: &str) -> Result<ResolvedTarget, TransferError> {
        let append = self.state.append_mode;
        let (command, operation, intent) = if append {
            ("APPE", Operation::Append, Intent::Append)
        } else {
            ("STOR", Operation::Write, Intent::Store)
        };
        if requested.is_empty() {
            return Err(TransferError::new(TransferErrorKind::SyntaxError, command));
        }

        let path = self
            .storage
            .resolve_best_path(&self.user, requested)
            .await
            .ok_or_else(|| TransferError::new(TransferErrorKind::Unauthorized, requested))?;
        if !self.authorizer.authorize(&self.user, operation, &path).await {
            return Err(TransferError::new(TransferErrorKind::Unauthorized, requested));
        }

        let existing = self.storage.metadata(&self.user, &path).await.ok();
        if let Some(meta) = &existing {
            if !append && !self.options.allow_overwrite {
                return Err(TransferError::new(TransferErrorKind::OverwriteDenied, requested));
            }
            if !meta.is_file() {
                return Err(TransferError::new(TransferErrorKind::NotRegularFile, requested));
            }
            if (self.state.restart_offset > 0 || append) && !self.options.allow_store_restart {
                return Err(TransferError::new(TransferErrorKind::RestartNotPermitted(Direction::Inbound), requested));
            }
        }

        if !self.options.name_permitted(requested) {
            slog::debug!(self.logger, "'{}' didn't pass the filename filters", requested);
            return Err(TransferError::new(TransferErrorKind::ForbiddenName, requested));
        }

        Ok(ResolvedTarget {
            canonical_path: path,
            existing_mode: existing.map(|meta| meta.mode()),
            intent,
            subject: requested.to_string(),
        })
    }

    async fn check_retrieve(&self, requested: &str) -> Result<ResolvedTarget, TransferError> {
        if requested.is_empty() {
            return Err(TransferError::new(TransferErrorKind::SyntaxError, "RETR"));
        }

        let path = self
            .storage
            .resolve_real_path(&self.user, requested)
            .await
            .ok_or_else(|| TransferError::new(TransferErrorKind::NotFound, requested))?;
        if !self.authorizer.authorize(&self.user, Operation::Read, &path).await {
            return Err(TransferError::new(TransferErrorKind::Unauthorized, requested));
        }

        let meta = self
            .storage
            .metadata(&self.user, &path)
            .await
            .map_err(|_| TransferError::new(TransferErrorKind::NotFound, requested))?;
        if !meta.is_file() {
            return Err(TransferError::new(TransferErrorKind::NotRegularFile, requested));
        }

        if self.state.restart_offset > 0 && !self.options.allow_retrieve_restart {
            return Err(TransferError::new(TransferErrorKind::RestartNotPermitted(Direction::Outbound), requested));
        }

        Ok(ResolvedTarget {
            canonical_path: path,
            existing_mode: Some(meta.mode()),
            intent: Intent::Retrieve,
            subject: requested.to_string(),
        })
    }
}
