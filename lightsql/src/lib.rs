///
/// # lightsql: a typed client access layer over embedded SQLite
///
/// A call-level SQL client API on top of rusqlite: sessions with explicit
/// transaction control, prepared and plain commands, forward-only cursors
/// with typed reads, batches and catalog introspection.
///
/// ## Usage
///
/// ```rust,ignore
/// use std::path::Path;
/// use lightsql::{Session, SessionOptions};
///
/// let session = Session::open(Path::new("app.db"), SessionOptions::default())?;
/// session.execute("CREATE TABLE IF NOT EXISTS t (id INTEGER PRIMARY KEY, name TEXT)")?;
///
/// let mut insert = session.prepare("INSERT INTO t (name) VALUES (?)")?;
/// insert.set_parameter(1, "first")?;
/// insert.execute_update()?;
///
/// let mut query = session.prepare("SELECT id, name FROM t")?;
/// let mut cursor = query.execute_query()?;
/// while cursor.advance()? {
///     let id: i64 = cursor.get(1)?;
///     let name: Option<String> = cursor.get("name")?;
/// }
/// ```
///
/// Architecture:
/// - `session`: connection ownership, autocommit/read-only/isolation
///   state and the warning list. `transaction` adds commit, rollback and
///   the savepoint stack.
/// - `command`: statement execution and the multi-result protocol;
///   `batch` queues parameter sets or SQL texts on a command.
/// - `cursor`: materialized rows and typed reads through
///   `lightsql_value::FromValue`.
/// - `catalog`: listings of tables, columns, keys and indexes.
/// - `registry`: process-wide reference counts for shared in-memory
///   databases.
///

mod batch;
pub mod catalog;
pub mod command;
pub mod config;
pub mod cursor;
pub mod error;
mod native;
pub mod registry;
pub mod session;
mod sql;
pub mod transaction;

pub use catalog::{CATALOG_LAYOUT_VERSION, Catalog};
pub use command::Command;
pub use config::SessionOptions;
pub use cursor::{ColumnInfo, ColumnRef, Cursor, CursorMutation, CursorState, Nullability};
pub use error::{Error, ErrorKind, Result};
pub use registry::MemoryRegistry;
pub use session::{
    Concurrency, CursorOptions, IsolationLevel, Locator, Scroll, Session, TransactionState, Warning,
};
pub use transaction::Savepoint;

pub use lightsql_value::{
    Affinity, BindEncoding, Coerced, ColumnValue, Decimal, FromValue, NaiveDate, NaiveDateTime,
    NaiveTime, ParamValue, SqlType, StorageClass, TemporalConfig,
};
