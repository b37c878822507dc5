///
/// Transactions and savepoints.
///
/// The engine decides whether a transaction is open (`is_autocommit()` on
/// the connection); the session keeps the client-side autocommit flag and
/// the savepoint stack. A savepoint handle remembers its depth in the
/// stack and the stack generation it was created in; it is valid only
/// while the marker at that depth is still its own.
///
/// Caller-chosen names and ids stay on the client. The engine sees every
/// savepoint under a name drawn from a per-session sequence, so equal
/// labels never resolve to the wrong savepoint.
///

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::{Session, TransactionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SavepointLabel {
    Named(String),
    Anonymous(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SavepointMarker {
    label: SavepointLabel,
    seq: u64,
}

impl SavepointMarker {
    fn sql_name(&self) -> String {
        format!("lightsql_sp_{}", self.seq)
    }
}

/// Handle to a savepoint. Exposes either a name or an id, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Savepoint {
    marker: SavepointMarker,
    depth: usize,
    generation: u64,
}

impl Savepoint {
    pub fn name(&self) -> Result<&str> {
        match &self.marker.label {
            SavepointLabel::Named(name) => Ok(name),
            SavepointLabel::Anonymous(_) => Err(Error::state("anonymous savepoint has no name")),
        }
    }

    pub fn id(&self) -> Result<u32> {
        match &self.marker.label {
            SavepointLabel::Anonymous(id) => Ok(*id),
            SavepointLabel::Named(_) => Err(Error::state("named savepoint has no id")),
        }
    }
}

impl Session {
    /// Drops client-side savepoints once the engine has left its
    /// transaction, e.g. after a COMMIT issued as plain SQL.
    fn sync_transaction(&self, conn: &Connection) {
        let mut state = self.state.borrow_mut();
        if conn.is_autocommit() && !state.savepoints.is_empty() {
            state.savepoints.clear();
            state.generation += 1;
        }
    }

    fn end_transaction(&self, conn: &Connection, sql: &str) -> Result<()> {
        conn.execute_batch(sql)?;
        let mut state = self.state.borrow_mut();
        state.savepoints.clear();
        state.generation += 1;
        debug!(statement = sql, "transaction ended");
        Ok(())
    }

    pub fn autocommit(&self) -> Result<bool> {
        self.connection()?;
        Ok(self.state.borrow().autocommit)
    }

    /// Enabling autocommit commits whatever transaction is open. Disabling
    /// it makes the next data-modifying statement open a transaction.
    pub fn set_autocommit(&self, autocommit: bool) -> Result<()> {
        self.with_conn(|conn| {
            if self.state.borrow().autocommit == autocommit {
                return Ok(());
            }
            if autocommit && !conn.is_autocommit() {
                self.end_transaction(conn, "COMMIT")?;
            }
            self.state.borrow_mut().autocommit = autocommit;
            debug!(autocommit, "autocommit changed");
            Ok(())
        })
    }

    pub fn transaction_state(&self) -> Result<TransactionState> {
        self.with_conn(|conn| {
            self.sync_transaction(conn);
            if conn.is_autocommit() {
                Ok(TransactionState::Autocommit)
            } else {
                Ok(TransactionState::InTransaction {
                    savepoints: self.state.borrow().savepoints.len(),
                })
            }
        })
    }

    pub fn commit(&self) -> Result<()> {
        self.finish("COMMIT")
    }

    pub fn rollback(&self) -> Result<()> {
        self.finish("ROLLBACK")
    }

    fn finish(&self, sql: &str) -> Result<()> {
        self.with_conn(|conn| {
            self.sync_transaction(conn);
            if conn.is_autocommit() {
                // Nothing written yet under manual commit: nothing to end.
                if !self.state.borrow().autocommit {
                    return Ok(());
                }
                return Err(Error::state("no transaction in progress"));
            }
            self.end_transaction(conn, sql)
        })
    }

    pub fn set_savepoint(&self) -> Result<Savepoint> {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_savepoint_id;
            state.next_savepoint_id = state.next_savepoint_id.wrapping_add(1);
            id
        };
        self.push_savepoint(SavepointLabel::Anonymous(id))
    }

    pub fn set_named_savepoint(&self, name: &str) -> Result<Savepoint> {
        self.push_savepoint(SavepointLabel::Named(name.to_string()))
    }

    fn push_savepoint(&self, label: SavepointLabel) -> Result<Savepoint> {
        self.with_conn(|conn| {
            self.sync_transaction(conn);
            let marker = {
                let mut state = self.state.borrow_mut();
                let seq = state.next_marker_seq;
                state.next_marker_seq += 1;
                SavepointMarker { label, seq }
            };
            if conn.is_autocommit() {
                conn.execute_batch("BEGIN")?;
            }
            conn.execute_batch(&format!("SAVEPOINT {}", marker.sql_name()))?;
            let mut state = self.state.borrow_mut();
            state.savepoints.push(marker.clone());
            debug!(depth = state.savepoints.len(), "savepoint set");
            Ok(Savepoint {
                marker,
                depth: state.savepoints.len() - 1,
                generation: state.generation,
            })
        })
    }

    fn check_savepoint(&self, conn: &Connection, savepoint: &Savepoint) -> Result<()> {
        self.sync_transaction(conn);
        let state = self.state.borrow();
        let live = savepoint.generation == state.generation
            && state.savepoints.get(savepoint.depth) == Some(&savepoint.marker);
        if live {
            Ok(())
        } else {
            Err(Error::state("savepoint is no longer valid"))
        }
    }

    /// Undoes everything since `savepoint` and removes it and every newer
    /// savepoint. The transaction stays open.
    pub fn rollback_to(&self, savepoint: &Savepoint) -> Result<()> {
        self.with_conn(|conn| {
            self.check_savepoint(conn, savepoint)?;
            let name = savepoint.marker.sql_name();
            conn.execute_batch(&format!(
                "ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}"
            ))?;
            self.state.borrow_mut().savepoints.truncate(savepoint.depth);
            debug!(depth = savepoint.depth, "rolled back to savepoint");
            Ok(())
        })
    }

    /// Removes `savepoint` and every newer one, keeping their writes in the
    /// enclosing transaction.
    pub fn release_savepoint(&self, savepoint: &Savepoint) -> Result<()> {
        self.with_conn(|conn| {
            self.check_savepoint(conn, savepoint)?;
            conn.execute_batch(&format!("RELEASE SAVEPOINT {}", savepoint.marker.sql_name()))?;
            self.state.borrow_mut().savepoints.truncate(savepoint.depth);
            debug!(depth = savepoint.depth, "savepoint released");
            Ok(())
        })
    }

    /// Opens a transaction before a write when autocommit is off.
    pub(crate) fn begin_implicit(&self, conn: &Connection) -> Result<()> {
        if !self.state.borrow().autocommit && conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
            debug!("implicit transaction started");
        }
        Ok(())
    }
}
