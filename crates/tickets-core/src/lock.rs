//! Advisory file locks for the `.tickets/` directory.
//!
//! Two kinds of lock coordinate writers across processes:
//!
//! - one exclusive lock per ticket under `locks/`, held for a whole
//!   read-modify-write of that ticket, so different tickets never wait on
//!   each other;
//! - the snapshot lock `lock`, shared for reads and exclusive for writes,
//!   held only while `tickets.json` itself is read or replaced.
//!
//! A ticket lock is always taken before the snapshot lock and never while
//! holding it.

use crate::error::ErrorCode;
use crate::model::TicketId;
use fs2::FileExt;
use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::trace;
use uuid::Uuid;

/// Snapshot lock file name inside the store directory.
pub const SNAPSHOT_LOCK_FILE: &str = "lock";

/// Directory of per-ticket lock files inside the store directory.
pub const TICKET_LOCK_DIR: &str = "locks";

const FIRST_BACKOFF: Duration = Duration::from_millis(2);
const MAX_BACKOFF: Duration = Duration::from_millis(50);
const MAX_PLAIN_NAME: usize = 64;

/// What a lock protects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockScope {
    Snapshot,
    Ticket(TicketId),
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot => f.write_str("ticket snapshot"),
            Self::Ticket(id) => write!(f, "ticket '{id}'"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("{scope} is locked by another writer (waited {waited:?})")]
    Contended { scope: LockScope, waited: Duration },

    #[error("failed to lock {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Contended { .. } => ErrorCode::LockContention,
            Self::Io { .. } => ErrorCode::StoreWriteFailed,
        }
    }
}

/// File name of a ticket's lock. Plain ids are used as-is; anything else is
/// mapped to a name-based UUID so the name stays filesystem-safe.
#[must_use]
pub fn ticket_lock_name(id: &TicketId) -> String {
    let raw = id.as_str();
    let plain = raw.len() <= MAX_PLAIN_NAME
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if plain {
        format!("{raw}.lock")
    } else {
        let named = Uuid::new_v5(&Uuid::NAMESPACE_OID, raw.as_bytes());
        format!("id-{}.lock", named.simple())
    }
}

/// Held lock. Released when dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    scope: LockScope,
}

impl LockGuard {
    #[must_use]
    pub const fn scope(&self) -> &LockScope {
        &self.scope
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        trace!(scope = %self.scope, "lock released");
    }
}

/// Lock factory for one store directory.
#[derive(Debug, Clone)]
pub struct StoreLocks {
    dir: PathBuf,
    timeout: Duration,
}

impl StoreLocks {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn path_for(&self, scope: &LockScope) -> PathBuf {
        match scope {
            LockScope::Snapshot => self.dir.join(SNAPSHOT_LOCK_FILE),
            LockScope::Ticket(id) => self.dir.join(TICKET_LOCK_DIR).join(ticket_lock_name(id)),
        }
    }

    /// Exclusive lock on one ticket.
    ///
    /// # Errors
    ///
    /// [`LockError::Contended`] when another writer holds the ticket past the
    /// timeout, or [`LockError::Io`] when the lock file cannot be opened.
    pub fn ticket(&self, id: &TicketId) -> Result<LockGuard, LockError> {
        self.acquire(LockScope::Ticket(id.clone()), false)
    }

    /// Shared lock for reading the snapshot.
    ///
    /// # Errors
    ///
    /// See [`StoreLocks::ticket`].
    pub fn read_snapshot(&self) -> Result<LockGuard, LockError> {
        self.acquire(LockScope::Snapshot, true)
    }

    /// Exclusive lock for replacing the snapshot.
    ///
    /// # Errors
    ///
    /// See [`StoreLocks::ticket`].
    pub fn write_snapshot(&self) -> Result<LockGuard, LockError> {
        self.acquire(LockScope::Snapshot, false)
    }

    fn acquire(&self, scope: LockScope, shared: bool) -> Result<LockGuard, LockError> {
        let path = self.path_for(&scope);
        let io_err = |source: io::Error| LockError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = open_lock_file(&path).map_err(io_err)?;

        let started = Instant::now();
        let mut backoff = FIRST_BACKOFF;
        loop {
            let attempt = if shared {
                FileExt::try_lock_shared(&file)
            } else {
                FileExt::try_lock_exclusive(&file)
            };
            match attempt {
                Ok(()) => {
                    trace!(%scope, shared, "lock acquired");
                    return Ok(LockGuard { file, scope });
                }
                Err(err) if is_contended(&err) => {}
                Err(source) => return Err(io_err(source)),
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(LockError::Contended { scope, waited });
            }
            thread::sleep(backoff.min(self.timeout - waited));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
