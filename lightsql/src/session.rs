///
/// # Sessions
///
/// A `Session` owns one engine connection plus the client-side state the
/// engine does not track: the autocommit flag, read-only mode, isolation
/// level, the savepoint stack and an ordered list of advisory warnings.
///
/// Commands, cursors and catalog handles borrow the session; once it is
/// closed every one of them fails with a `State` error. Access must be
/// serialized per session (the type is `Send` but not `Sync`); distinct
/// sessions are independent.
///

use std::cell::{Ref, RefCell};
use std::fmt;
use std::path::PathBuf;

use rusqlite::{Connection, InterruptHandle};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::command::Command;
use crate::config::SessionOptions;
use crate::error::{Error, Result};
use crate::registry::MemoryRegistry;
use crate::transaction::SavepointMarker;

/// Where a session's database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    File(PathBuf),
    /// A private in-memory database, gone when the session closes.
    Memory,
    /// A named in-memory database shared by every session that opens it.
    SharedMemory(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::File(path) => write!(f, "{}", path.display()),
            Locator::Memory => f.write_str(":memory:"),
            Locator::SharedMemory(name) => write!(f, "shared:{name}"),
        }
    }
}

impl From<PathBuf> for Locator {
    fn from(path: PathBuf) -> Self {
        Locator::File(path)
    }
}

impl From<&std::path::Path> for Locator {
    fn from(path: &std::path::Path) -> Self {
        Locator::File(path.to_path_buf())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Autocommit,
    InTransaction { savepoints: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scroll {
    #[default]
    ForwardOnly,
    Scrollable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    #[default]
    ReadOnly,
    Updatable,
}

/// Cursor behaviour requested for a command. Only forward-only, read-only
/// cursors exist; other requests are downgraded with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorOptions {
    pub scroll: Scroll,
    pub concurrency: Concurrency,
}

/// A non-fatal condition recorded on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub autocommit: bool,
    pub read_only: bool,
    pub isolation: IsolationLevel,
    pub warnings: Vec<Warning>,
    pub savepoints: Vec<SavepointMarker>,
    pub next_savepoint_id: u32,
    /// Source of engine-side savepoint names.
    pub next_marker_seq: u64,
    /// Bumped whenever the savepoint stack is discarded wholesale, so
    /// handles from an earlier transaction can not match a reused depth.
    pub generation: u64,
}

pub struct Session {
    conn: RefCell<Option<Connection>>,
    pub(crate) state: RefCell<SessionState>,
    options: SessionOptions,
    locator: Locator,
}

impl Session {
    pub fn open(locator: impl Into<Locator>, options: SessionOptions) -> Result<Session> {
        let locator = locator.into();
        let flags = options.open_flags();
        let conn = match &locator {
            Locator::File(path) => Connection::open_with_flags(path, flags)?,
            Locator::Memory => Connection::open_in_memory_with_flags(flags)?,
            Locator::SharedMemory(name) => {
                Connection::open_with_flags(MemoryRegistry::uri(name), flags)?
            }
        };
        if let Locator::SharedMemory(name) = &locator {
            MemoryRegistry::global().acquire(name);
        }

        // From here on, Drop releases the registry entry if setup fails.
        let session = Session {
            conn: RefCell::new(Some(conn)),
            state: RefCell::new(SessionState {
                autocommit: true,
                read_only: false,
                isolation: IsolationLevel::Serializable,
                warnings: Vec::new(),
                savepoints: Vec::new(),
                next_savepoint_id: 0,
                next_marker_seq: 0,
                generation: 0,
            }),
            options,
            locator,
        };
        session.with_conn(|conn| {
            conn.busy_timeout(session.options.busy_timeout())?;
            conn.pragma_update(None, "foreign_keys", session.options.foreign_keys)?;
            Ok(())
        })?;

        debug!(locator = %session.locator, read_only = session.options.read_only, "session opened");
        Ok(session)
    }

    pub fn open_in_memory() -> Result<Session> {
        Session::open(Locator::Memory, SessionOptions::default())
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn is_closed(&self) -> bool {
        self.conn
            .try_borrow()
            .map(|conn| conn.is_none())
            .unwrap_or(false)
    }

    /// Closes the connection. Any open transaction is rolled back by the
    /// engine. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        let conn = self
            .conn
            .try_borrow_mut()
            .map_err(|_| Error::state("session is in use"))?
            .take();
        let Some(conn) = conn else {
            return Ok(());
        };
        {
            let mut state = self.state.borrow_mut();
            state.savepoints.clear();
            state.generation += 1;
        }
        let result = conn.close().map_err(|(_, err)| Error::from(err));
        self.release_store();
        debug!(locator = %self.locator, "session closed");
        result
    }

    fn release_store(&self) {
        if let Locator::SharedMemory(name) = &self.locator {
            MemoryRegistry::global().release(name);
        }
    }

    pub(crate) fn connection(&self) -> Result<Ref<'_, Connection>> {
        let conn = self
            .conn
            .try_borrow()
            .map_err(|_| Error::state("session is in use"))?;
        Ref::filter_map(conn, Option::as_ref).map_err(|_| Error::state("session is closed"))
    }

    pub(crate) fn with_conn<R>(&self, f: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        let conn = self.connection()?;
        f(&conn)
    }

    pub fn prepare(&self, sql: &str) -> Result<Command<'_>> {
        Command::prepared(self, sql)
    }

    pub fn prepare_with(&self, sql: &str, cursor: CursorOptions) -> Result<Command<'_>> {
        self.check_cursor_options(cursor);
        Command::prepared(self, sql)
    }

    pub fn create_command(&self) -> Result<Command<'_>> {
        Command::plain(self)
    }

    pub fn create_command_with(&self, cursor: CursorOptions) -> Result<Command<'_>> {
        self.check_cursor_options(cursor);
        Command::plain(self)
    }

    fn check_cursor_options(&self, cursor: CursorOptions) {
        if cursor.scroll != Scroll::ForwardOnly {
            self.add_warning("scrollable cursors are not supported; using forward-only");
        }
        if cursor.concurrency != Concurrency::ReadOnly {
            self.add_warning("updatable cursors are not supported; using read-only");
        }
    }

    /// Runs every statement in `sql` and returns the total rows modified.
    pub fn execute(&self, sql: &str) -> Result<i64> {
        let mut command = self.create_command()?;
        command.execute_update_sql(sql)
    }

    pub fn catalog(&self) -> Result<Catalog<'_>> {
        self.connection()?;
        Ok(Catalog::new(self))
    }

    pub fn last_insert_rowid(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.last_insert_rowid()))
    }

    /// A handle that can interrupt the running statement from another thread.
    pub fn interrupt_handle(&self) -> Result<InterruptHandle> {
        self.with_conn(|conn| Ok(conn.get_interrupt_handle()))
    }

    pub fn is_read_only(&self) -> bool {
        self.options.read_only || self.state.borrow().read_only
    }

    /// Switches read-only mode. Refused mid-transaction. A session opened
    /// read-only stays read-only; asking otherwise only records a warning.
    pub fn set_read_only(&self, read_only: bool) -> Result<()> {
        self.with_conn(|conn| {
            if !conn.is_autocommit() {
                return Err(Error::state("cannot change read-only mode during a transaction"));
            }
            if self.options.read_only && !read_only {
                self.add_warning("read-only mode cannot be reset on a session opened read-only");
                return Ok(());
            }
            conn.pragma_update(None, "query_only", read_only)?;
            self.state.borrow_mut().read_only = read_only;
            debug!(read_only, "read-only mode changed");
            Ok(())
        })
    }

    pub fn isolation_level(&self) -> IsolationLevel {
        self.state.borrow().isolation
    }

    /// Only `ReadUncommitted` and `Serializable` are accepted; they toggle
    /// shared-cache read visibility. Anything else is rejected before the
    /// engine is touched and leaves the current level in place.
    pub fn set_isolation_level(&self, level: IsolationLevel) -> Result<()> {
        let read_uncommitted = match level {
            IsolationLevel::ReadUncommitted => true,
            IsolationLevel::Serializable => false,
            other => {
                return Err(Error::unsupported(format!("isolation level {other:?}")));
            }
        };
        self.with_conn(|conn| {
            conn.pragma_update(None, "read_uncommitted", read_uncommitted)?;
            Ok(())
        })?;
        self.state.borrow_mut().isolation = level;
        Ok(())
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.state.borrow().warnings.clone()
    }

    pub fn clear_warnings(&self) {
        self.state.borrow_mut().warnings.clear();
    }

    pub(crate) fn add_warning(&self, message: &str) {
        warn!(locator = %self.locator, "{message}");
        self.state.borrow_mut().warnings.push(Warning {
            message: message.to_string(),
        });
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.conn.get_mut().take().is_some() {
            self.release_store();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("locator", &self.locator)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_close_is_idempotent() {
        let session = Session::open_in_memory().unwrap();
        assert!(!session.is_closed());
        session.close().unwrap();
        session.close().unwrap();
        assert!(session.is_closed());
        assert_eq!(session.prepare("SELECT 1").unwrap_err().kind(), ErrorKind::State);
    }

    #[test]
    fn test_isolation_levels() {
        let session = Session::open_in_memory().unwrap();
        assert_eq!(session.isolation_level(), IsolationLevel::Serializable);
        session.set_isolation_level(IsolationLevel::ReadUncommitted).unwrap();
        assert_eq!(session.isolation_level(), IsolationLevel::ReadUncommitted);
        for level in [IsolationLevel::ReadCommitted, IsolationLevel::RepeatableRead] {
            let err = session.set_isolation_level(level).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unsupported);
            assert_eq!(session.isolation_level(), IsolationLevel::ReadUncommitted);
        }
    }

    #[test]
    fn test_cursor_option_downgrade_warns() {
        let session = Session::open_in_memory().unwrap();
        session
            .prepare_with(
                "SELECT 1",
                CursorOptions {
                    scroll: Scroll::Scrollable,
                    concurrency: Concurrency::Updatable,
                },
            )
            .unwrap();
        let warnings = session.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("forward-only"));
        assert!(warnings[1].message.contains("read-only"));
        session.clear_warnings();
        assert!(session.warnings().is_empty());
    }

    #[test]
    fn test_shared_memory_registry_tracks_sessions() {
        let name = "session_registry_test";
        let a = Session::open(Locator::SharedMemory(name.into()), SessionOptions::default()).unwrap();
        let b = Session::open(Locator::SharedMemory(name.into()), SessionOptions::default()).unwrap();
        assert_eq!(MemoryRegistry::global().session_count(name), 2);
        a.execute("CREATE TABLE t (x); INSERT INTO t VALUES (1)").unwrap();
        let mut count = b.prepare("SELECT count(*) FROM t").unwrap();
        let mut cursor = count.execute_query().unwrap();
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.get::<i64>(1).unwrap(), 1);
        drop(cursor);
        drop(count);
        a.close().unwrap();
        assert_eq!(MemoryRegistry::global().session_count(name), 1);
        drop(b);
        assert_eq!(MemoryRegistry::global().session_count(name), 0);
    }
}
