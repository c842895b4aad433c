use super::TicketStore;
use crate::error::TicketError;
use crate::lock::StoreLocks;
use crate::model::{Ticket, TicketId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

/// Snapshot file name inside the `.tickets/` directory.
pub const SNAPSHOT_FILE: &str = "tickets.json";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(default)]
    tickets: BTreeMap<TicketId, Ticket>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tickets: BTreeMap::new(),
        }
    }
}

/// Store backed by a JSON snapshot in a `.tickets/` directory.
///
/// ```text
/// .tickets/
///   tickets.json     { "version": 1, "tickets": { "<id>": <ticket>, ... } }
///   lock             snapshot lock, held only while the file is read or replaced
///   locks/<id>.lock  per-ticket lock, held for a whole update
/// ```
///
/// An update works on a draft outside the snapshot lock, then rereads the
/// snapshot and replaces only its own ticket, so writers of other tickets
/// are neither blocked nor overwritten.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    locks: StoreLocks,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        let dir = dir.into();
        let locks = StoreLocks::new(dir.clone(), lock_timeout);
        Self { dir, locks }
    }

    /// Directory that holds the snapshot and lock files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    /// Write an empty snapshot if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns a lock or I/O error.
    pub fn initialize(&self) -> Result<(), TicketError> {
        let _snapshot = self.locks.write_snapshot()?;
        if self.snapshot_path().exists() {
            return Ok(());
        }
        self.save(&Snapshot::default())
    }

    /// All stored tickets in id order.
    ///
    /// # Errors
    ///
    /// Returns a lock, I/O, or corrupt-snapshot error.
    pub fn list(&self) -> Result<Vec<Ticket>, TicketError> {
        let _snapshot = self.locks.read_snapshot()?;
        Ok(self.load()?.tickets.into_values().collect())
    }

    fn read(&self, id: &TicketId) -> Result<Ticket, TicketError> {
        let _snapshot = self.locks.read_snapshot()?;
        self.load()?
            .tickets
            .remove(id)
            .ok_or_else(|| TicketError::TicketNotFound { id: id.clone() })
    }

    fn load(&self) -> Result<Snapshot, TicketError> {
        let path = self.snapshot_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                trace!(path = %path.display(), "no snapshot yet; starting empty");
                return Ok(Snapshot::default());
            }
            Err(source) => return Err(TicketError::Io { path, source }),
        };

        serde_json::from_str(&raw).map_err(|source| TicketError::Corrupt { path, source })
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), TicketError> {
        let path = self.snapshot_path();
        let tmp = self.dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| TicketError::Io { path, source }
        };

        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let mut body = serde_json::to_string_pretty(snapshot).map_err(|source| {
            TicketError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        body.push('\n');
        fs::write(&tmp, body).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        debug!(path = %path.display(), tickets = snapshot.tickets.len(), "snapshot written");
        Ok(())
    }
}

impl TicketStore for FileStore {
    fn insert(&self, ticket: Ticket) -> Result<Ticket, TicketError> {
        let _ticket = self.locks.ticket(ticket.id())?;
        let _snapshot = self.locks.write_snapshot()?;
        let mut snapshot = self.load()?;
        if snapshot.tickets.contains_key(ticket.id()) {
            return Err(TicketError::Conflict {
                what: "ticket",
                id: ticket.id().to_string(),
            });
        }
        snapshot.tickets.insert(ticket.id().clone(), ticket.clone());
        self.save(&snapshot)?;
        Ok(ticket)
    }

    fn get(&self, id: &TicketId) -> Result<Ticket, TicketError> {
        self.read(id)
    }

    fn update<R, F>(&self, id: &TicketId, apply: F) -> Result<(Ticket, R), TicketError>
    where
        F: FnOnce(&mut Ticket) -> Result<R, TicketError>,
    {
        let _ticket = self.locks.ticket(id)?;
        let mut draft = self.read(id)?;
        let output = apply(&mut draft)?;

        let _snapshot = self.locks.write_snapshot()?;
        let mut snapshot = self.load()?;
        snapshot.tickets.insert(id.clone(), draft.clone());
        self.save(&snapshot)?;
        Ok((draft, output))
    }
}
