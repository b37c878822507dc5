///
/// # Command execution
///
/// A `Command` runs SQL text on its session, one statement at a time.
/// After each statement exactly one of two results is current: a cursor
/// (the statement produced rows) or an update count. `next_result()`
/// moves on to the next statement of multi-statement text; once none
/// remain the update count reads -1 and there is no cursor.
///
/// Prepared commands (`Session::prepare`) own their text and a slot per
/// parameter marker of the first statement. Every slot must be set before
/// the command runs. Plain commands (`Session::create_command`) take text
/// per call and have no parameters.
///
/// ## Statement lifecycle
///
/// 1. compile, bind, and check the result shape the caller asked for
/// 2. refuse writes on a read-only session
/// 3. open a transaction first if autocommit is off and this is a write
/// 4. step: rows are materialized, otherwise the change count is taken
///
/// A step failure before the first row fails the call. One after it is
/// held back and raised by the cursor's `advance()` that reaches it.
///
/// A query timeout is enforced by a progress handler that aborts the
/// statement once the deadline passes; the command is unusable afterwards.
///

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use lightsql_value::{Affinity, ColumnValue, ParamValue};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, Statement};
use tracing::{debug, trace};

use crate::batch::BatchItem;
use crate::cursor::{ColumnInfo, Cursor, CursorLink, Nullability};
use crate::error::{Error, Result};
use crate::native;
use crate::session::Session;
use crate::sql::split_statements;

/// Virtual machine steps between deadline checks.
const PROGRESS_STEPS: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    Any,
    Rows,
    Count,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Limits {
    pub max_rows: usize,
    pub timeout: Option<Duration>,
}

pub(crate) struct Materialized {
    pub columns: Rc<[ColumnInfo]>,
    pub rows: Vec<Vec<ColumnValue>>,
    /// Step failure hit after at least one row; reported once the rows
    /// before it have been read.
    pub failure: Option<Error>,
}

pub(crate) enum Outcome {
    Rows(Materialized),
    Count(i64),
}

fn to_sql(value: &ColumnValue) -> ToSqlOutput<'_> {
    ToSqlOutput::Borrowed(match value {
        ColumnValue::Null => ValueRef::Null,
        ColumnValue::Integer(i) => ValueRef::Integer(*i),
        ColumnValue::Real(r) => ValueRef::Real(*r),
        ColumnValue::Text(t) => ValueRef::Text(t.as_bytes()),
        ColumnValue::Blob(b) => ValueRef::Blob(b),
    })
}

fn from_engine(value: ValueRef<'_>) -> ColumnValue {
    match value {
        ValueRef::Null => ColumnValue::Null,
        ValueRef::Integer(i) => ColumnValue::Integer(i),
        ValueRef::Real(r) => ColumnValue::Real(r),
        ValueRef::Text(t) => ColumnValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => ColumnValue::Blob(b.to_vec()),
    }
}

fn column_infos(conn: &Connection, sql: &str, stmt: &Statement<'_>) -> Vec<ColumnInfo> {
    let origins = native::column_origins(conn, sql);
    stmt.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let origin = origins.get(i).cloned().unwrap_or_default();
            ColumnInfo {
                label: column.name().to_string(),
                declared_type: column.decl_type().map(str::to_string),
                affinity: Affinity::from_declared_type(column.decl_type()),
                database: origin.database,
                table: origin.table,
                origin_column: origin.column,
                nullability: match origin.not_null {
                    Some(true) => Nullability::NoNulls,
                    Some(false) => Nullability::Nullable,
                    None => Nullability::Unknown,
                },
            }
        })
        .collect()
}

fn read_rows(
    conn: &Connection,
    sql: &str,
    stmt: &mut Statement<'_>,
    max_rows: usize,
) -> Result<Materialized> {
    let columns = column_infos(conn, sql, stmt);
    let width = columns.len();
    let mut rows = Vec::new();
    let mut failure = None;
    let mut raw = stmt.raw_query();
    while max_rows == 0 || rows.len() < max_rows {
        let row = match raw.next() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            // Nothing to hand out yet: the statement itself failed.
            Err(err) if rows.is_empty() => return Err(Error::from_step(err)),
            Err(err) => {
                failure = Some(Error::from_step(err));
                break;
            }
        };
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(from_engine(row.get_ref(i)?));
        }
        rows.push(values);
    }
    trace!(rows = rows.len(), failed = failure.is_some(), "rows materialized");
    Ok(Materialized {
        columns: columns.into(),
        rows,
        failure,
    })
}

fn count_changes(conn: &Connection, stmt: &mut Statement<'_>) -> Result<i64> {
    let before = native::total_changes(conn);
    stmt.raw_execute().map_err(Error::from_step)?;
    Ok(native::total_changes(conn) - before)
}

impl Session {
    /// Runs one statement to completion.
    pub(crate) fn run_statement(
        &self,
        sql: &str,
        params: &[ColumnValue],
        expect: Expect,
        limits: Limits,
    ) -> Result<Outcome> {
        self.with_conn(|conn| {
            debug!(sql, "executing statement");
            let mut stmt = conn.prepare(sql)?;
            let expected = stmt.parameter_count();
            if params.len() < expected {
                return Err(Error::NotBound(params.len() + 1));
            }
            for (i, value) in params.iter().take(expected).enumerate() {
                trace!(index = i + 1, value = ?value, "binding parameter");
                stmt.raw_bind_parameter(i + 1, to_sql(value))?;
            }

            let yields_rows = stmt.column_count() > 0;
            match expect {
                Expect::Rows if !yields_rows => {
                    return Err(Error::ResultShape("statement does not return a cursor"));
                }
                Expect::Count if yields_rows => {
                    return Err(Error::ResultShape("statement returns a cursor"));
                }
                _ => {}
            }

            if !stmt.readonly() {
                if self.is_read_only() {
                    return Err(Error::ReadOnly {
                        message: "session is read-only".to_string(),
                        code: None,
                    });
                }
                self.begin_implicit(conn)?;
            }

            if let Some(timeout) = limits.timeout {
                let deadline = Instant::now() + timeout;
                conn.progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));
            }
            let outcome = if yields_rows {
                read_rows(conn, sql, &mut stmt, limits.max_rows).map(Outcome::Rows)
            } else {
                count_changes(conn, &mut stmt).map(Outcome::Count)
            };
            if limits.timeout.is_some() {
                conn.progress_handler(0, None::<fn() -> bool>);
            }
            outcome
        })
    }
}

enum Source {
    Prepared {
        statements: Vec<String>,
        names: Vec<Option<String>>,
    },
    Plain,
}

pub struct Command<'s> {
    session: &'s Session,
    source: Source,
    params: Vec<Option<ParamValue>>,
    pending: VecDeque<String>,
    cursor: Option<Cursor<'s>>,
    link: Option<Rc<CursorLink>>,
    update_count: i64,
    pub(crate) batch: Vec<BatchItem>,
    max_rows: usize,
    timeout: Option<Duration>,
    close_on_completion: bool,
    closed: bool,
    aborted: bool,
}

impl<'s> Command<'s> {
    fn new(session: &'s Session, source: Source, parameter_count: usize) -> Command<'s> {
        Command {
            session,
            source,
            params: vec![None; parameter_count],
            pending: VecDeque::new(),
            cursor: None,
            link: None,
            update_count: -1,
            batch: Vec::new(),
            max_rows: 0,
            timeout: None,
            close_on_completion: false,
            closed: false,
            aborted: false,
        }
    }

    pub(crate) fn plain(session: &'s Session) -> Result<Command<'s>> {
        session.connection()?;
        Ok(Command::new(session, Source::Plain, 0))
    }

    /// Compiles the first statement up front so syntax errors and the
    /// parameter count are known before any value is bound.
    pub(crate) fn prepared(session: &'s Session, sql: &str) -> Result<Command<'s>> {
        let statements = split_statements(sql);
        let names = match statements.first() {
            Some(first) => session.with_conn(|conn| {
                let stmt = conn.prepare(first)?;
                Ok((1..=stmt.parameter_count())
                    .map(|i| stmt.parameter_name(i).map(str::to_string))
                    .collect::<Vec<_>>())
            })?,
            None => {
                session.connection()?;
                Vec::new()
            }
        };
        let count = names.len();
        Ok(Command::new(session, Source::Prepared { statements, names }, count))
    }

    pub(crate) fn session(&self) -> &'s Session {
        self.session
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.session.is_closed() {
            return Err(Error::state("session is closed"));
        }
        if self.closed || self.completed() {
            return Err(Error::state("command is closed"));
        }
        if self.aborted {
            return Err(Error::state("command was aborted by its query timeout and must be closed"));
        }
        Ok(())
    }

    fn completed(&self) -> bool {
        self.close_on_completion
            && self.pending.is_empty()
            && self.cursor.is_none()
            && self.link.as_ref().is_some_and(|link| link.consumed.get())
    }

    pub fn is_closed(&self) -> bool {
        self.closed || self.completed() || self.session.is_closed()
    }

    /// Closes the command and the cursor it handed out last.
    pub fn close(&mut self) {
        self.reset_results();
        self.pending.clear();
        self.batch.clear();
        self.closed = true;
    }

    /// Close the command once the cursor it produces has been consumed.
    pub fn close_on_completion(&mut self) {
        self.close_on_completion = true;
    }

    pub fn is_close_on_completion(&self) -> bool {
        self.close_on_completion
    }

    pub fn set_max_rows(&mut self, max_rows: usize) {
        self.max_rows = max_rows;
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn set_query_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout.filter(|t| !t.is_zero());
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn limits(&self) -> Limits {
        Limits {
            max_rows: self.max_rows,
            timeout: self.timeout,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// 1-based index of a named marker; the prefix (`:`, `@`, `$`) is optional.
    pub fn parameter_index(&self, name: &str) -> Result<usize> {
        let Source::Prepared { names, .. } = &self.source else {
            return Err(Error::state("plain commands have no parameters"));
        };
        names
            .iter()
            .position(|n| {
                n.as_deref().is_some_and(|n| {
                    n == name || n.get(1..).is_some_and(|bare| bare == name)
                })
            })
            .map(|i| i + 1)
            .ok_or_else(|| Error::Range {
                what: "parameter",
                index: 0,
                max: self.params.len(),
            })
    }

    pub fn set_parameter(&mut self, index: usize, value: impl Into<ParamValue>) -> Result<()> {
        self.ensure_open()?;
        if index == 0 || index > self.params.len() {
            return Err(Error::Range {
                what: "parameter",
                index,
                max: self.params.len(),
            });
        }
        self.params[index - 1] = Some(value.into());
        Ok(())
    }

    pub fn set_null(&mut self, index: usize) -> Result<()> {
        self.set_parameter(index, ParamValue::Null)
    }

    pub fn set_named(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        let index = self.parameter_index(name)?;
        self.set_parameter(index, value)
    }

    /// Unsets every slot. Queued batch entries are left alone.
    pub fn clear_parameters(&mut self) {
        self.params.iter_mut().for_each(|slot| *slot = None);
    }

    pub(crate) fn snapshot_parameters(&self) -> Result<Vec<ParamValue>> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, slot)| slot.clone().ok_or(Error::NotBound(i + 1)))
            .collect()
    }

    pub(crate) fn lower(&self, params: &[ParamValue]) -> Vec<ColumnValue> {
        let temporal = &self.session.options().temporal;
        params.iter().map(|p| p.lower(temporal)).collect()
    }

    pub(crate) fn prepared_statements(&self) -> Result<&[String]> {
        match &self.source {
            Source::Prepared { statements, .. } => Ok(statements),
            Source::Plain => Err(Error::state("plain commands take their SQL per call")),
        }
    }

    fn plain_only(&self) -> Result<()> {
        match self.source {
            Source::Plain => Ok(()),
            Source::Prepared { .. } => Err(Error::unsupported(
                "passing SQL text to a prepared command",
            )),
        }
    }

    fn reset_results(&mut self) {
        if let Some(link) = self.link.take() {
            link.closed.set(true);
        }
        self.cursor = None;
        self.update_count = -1;
    }

    fn start(&mut self, statements: Vec<String>, params: Vec<ColumnValue>, expect: Expect) -> Result<bool> {
        self.ensure_open()?;
        self.reset_results();
        self.pending = statements.into();
        self.run_next(&params, expect)
    }

    fn run_next(&mut self, params: &[ColumnValue], expect: Expect) -> Result<bool> {
        let Some(sql) = self.pending.pop_front() else {
            self.update_count = -1;
            return Ok(false);
        };
        match self.session.run_statement(&sql, params, expect, self.limits()) {
            Ok(Outcome::Rows(Materialized { columns, rows, failure })) => {
                if let Some(err) = &failure {
                    self.note_failure(err);
                }
                let link = Rc::new(CursorLink::default());
                let cursor = Cursor::new(self.session, columns, rows, Rc::clone(&link));
                self.cursor = Some(cursor.with_failure(failure));
                self.link = Some(link);
                self.update_count = -1;
                Ok(true)
            }
            Ok(Outcome::Count(count)) => {
                self.update_count = count;
                Ok(false)
            }
            Err(err) => {
                self.pending.clear();
                self.note_failure(&err);
                Err(err)
            }
        }
    }

    /// A statement cut short by the query timeout leaves the command
    /// unusable until it is closed.
    pub(crate) fn note_failure(&mut self, err: &Error) {
        let interrupted = err
            .engine_code()
            .is_some_and(|code| code & 0xff == rusqlite::ffi::SQLITE_INTERRUPT);
        if interrupted && self.timeout.is_some() {
            self.aborted = true;
        }
    }

    /// Runs the command; true when the first result is a cursor.
    pub fn execute(&mut self) -> Result<bool> {
        let statements = self.prepared_statements()?.to_vec();
        let params = self.snapshot_parameters()?;
        let params = self.lower(&params);
        self.start(statements, params, Expect::Any)
    }

    /// Runs the command, requiring its first statement to produce rows.
    pub fn execute_query(&mut self) -> Result<Cursor<'s>> {
        let statements = self.prepared_statements()?.to_vec();
        let params = self.snapshot_parameters()?;
        let params = self.lower(&params);
        self.start(statements, params, Expect::Rows)?;
        self.cursor
            .take()
            .ok_or(Error::ResultShape("statement does not return a cursor"))
    }

    /// Runs every statement, none of which may produce rows, and returns
    /// the total number of rows changed.
    pub fn execute_update(&mut self) -> Result<i64> {
        let statements = self.prepared_statements()?.to_vec();
        let params = self.snapshot_parameters()?;
        let params = self.lower(&params);
        self.run_updates(statements, params)
    }

    pub fn execute_sql(&mut self, sql: &str) -> Result<bool> {
        self.plain_only()?;
        self.start(split_statements(sql), Vec::new(), Expect::Any)
    }

    pub fn execute_query_sql(&mut self, sql: &str) -> Result<Cursor<'s>> {
        self.plain_only()?;
        self.start(split_statements(sql), Vec::new(), Expect::Rows)?;
        self.cursor
            .take()
            .ok_or(Error::ResultShape("statement does not return a cursor"))
    }

    pub fn execute_update_sql(&mut self, sql: &str) -> Result<i64> {
        self.plain_only()?;
        self.run_updates(split_statements(sql), Vec::new())
    }

    fn run_updates(&mut self, statements: Vec<String>, params: Vec<ColumnValue>) -> Result<i64> {
        self.start(statements, params, Expect::Count)?;
        let mut total = self.update_count.max(0);
        while !self.pending.is_empty() {
            self.run_next(&[], Expect::Count)?;
            total += self.update_count.max(0);
        }
        self.update_count = total;
        Ok(total)
    }

    /// Moves to the next statement's result, closing the current cursor.
    /// Returns true when the new result is a cursor.
    pub fn next_result(&mut self) -> Result<bool> {
        self.ensure_open()?;
        self.reset_results();
        self.run_next(&[], Expect::Any)
    }

    /// The current cursor; handed out once per result.
    pub fn cursor(&mut self) -> Result<Option<Cursor<'s>>> {
        self.ensure_open()?;
        Ok(self.cursor.take())
    }

    /// Rows changed by the current statement; -1 when the current result
    /// is a cursor or there is none.
    pub fn update_count(&self) -> i64 {
        self.update_count
    }

    /// A one-column cursor holding the rowid of the last insert.
    pub fn generated_keys(&self) -> Result<Cursor<'s>> {
        self.ensure_open()?;
        match self.session.run_statement(
            "SELECT last_insert_rowid()",
            &[],
            Expect::Rows,
            Limits::default(),
        )? {
            Outcome::Rows(Materialized { columns, rows, .. }) => {
                Ok(Cursor::new(self.session, columns, rows, Rc::default()))
            }
            Outcome::Count(_) => Err(Error::ResultShape("statement does not return a cursor")),
        }
    }
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.source {
            Source::Prepared { .. } => "prepared",
            Source::Plain => "plain",
        };
        f.debug_struct("Command")
            .field("kind", &kind)
            .field("parameters", &self.params.len())
            .field("pending", &self.pending.len())
            .field("update_count", &self.update_count)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn session() -> Session {
        let session = Session::open_in_memory().unwrap();
        session
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)")
            .unwrap();
        session
    }

    #[test]
    fn test_select_parameters_round_trip() {
        let session = session();
        let mut cmd = session.prepare("select ?, ?, ?").unwrap();
        assert_eq!(cmd.parameter_count(), 3);
        cmd.set_parameter(1, i32::MIN).unwrap();
        cmd.set_parameter(2, i32::MAX).unwrap();
        cmd.set_parameter(3, 0).unwrap();
        assert!(cmd.execute().unwrap());
        assert_eq!(cmd.update_count(), -1);
        let mut cursor = cmd.cursor().unwrap().unwrap();
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.get::<i32>(1).unwrap(), i32::MIN);
        assert_eq!(cursor.get::<i32>(2).unwrap(), i32::MAX);
        assert_eq!(cursor.get::<i32>(3).unwrap(), 0);
        assert!(!cursor.advance().unwrap());
    }

    #[test]
    fn test_unbound_parameter_is_reported() {
        let session = session();
        let mut cmd = session.prepare("INSERT INTO t (id, name) VALUES (?, ?)").unwrap();
        cmd.set_parameter(1, 1).unwrap();
        let err = cmd.execute().unwrap_err();
        assert!(matches!(err, Error::NotBound(2)));
        assert_eq!(err.kind(), ErrorKind::NotBound);
        assert_eq!(cmd.set_parameter(3, 1).unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn test_multiple_results() {
        let session = session();
        let mut cmd = session.create_command().unwrap();
        let first = cmd
            .execute_sql("INSERT INTO t VALUES (1, 'a'); SELECT name FROM t; UPDATE t SET name = 'b'")
            .unwrap();
        assert!(!first);
        assert_eq!(cmd.update_count(), 1);
        assert!(cmd.next_result().unwrap());
        assert_eq!(cmd.update_count(), -1);
        let mut cursor = cmd.cursor().unwrap().unwrap();
        assert!(cmd.cursor().unwrap().is_none());
        assert!(cursor.advance().unwrap());
        assert_eq!(cursor.get::<String>("name").unwrap(), "a");
        assert!(!cmd.next_result().unwrap());
        assert_eq!(cmd.update_count(), 1);
        // The cursor of the previous result is closed by moving on.
        assert!(cursor.is_closed());
        assert!(!cmd.next_result().unwrap());
        assert_eq!(cmd.update_count(), -1);
    }

    #[test]
    fn test_result_shape_contracts() {
        let session = session();
        let mut cmd = session.create_command().unwrap();
        let err = cmd.execute_update_sql("SELECT 1").unwrap_err();
        assert!(matches!(err, Error::ResultShape(_)));
        let err = cmd.execute_query_sql("DELETE FROM t").unwrap_err();
        assert!(matches!(err, Error::ResultShape(_)));
        assert_eq!(cmd.execute_update_sql("CREATE TABLE u (x)").unwrap(), 0);
    }

    #[test]
    fn test_engine_errors_are_classified() {
        let session = session();
        let err = session.prepare("SELEC 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        session.execute("INSERT INTO t VALUES (1, 'a')").unwrap();
        let err = session.execute("INSERT INTO t VALUES (2, 'a')").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
        assert_eq!(err.engine_code(), Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE));
    }

    #[test]
    fn test_named_parameters() {
        let session = session();
        let mut cmd = session
            .prepare("INSERT INTO t (id, name) VALUES (:id, :name)")
            .unwrap();
        assert_eq!(cmd.parameter_index(":name").unwrap(), 2);
        cmd.set_named("id", 7).unwrap();
        cmd.set_named("name", "seven").unwrap();
        assert_eq!(cmd.execute_update().unwrap(), 1);
        assert_eq!(cmd.parameter_index("missing").unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn test_generated_keys() {
        let session = session();
        let mut cmd = session.prepare("INSERT INTO t (name) VALUES (?)").unwrap();
        cmd.set_parameter(1, "x").unwrap();
        cmd.execute_update().unwrap();
        let mut keys = cmd.generated_keys().unwrap();
        assert_eq!(keys.columns()[0].label, "last_insert_rowid()");
        assert!(keys.advance().unwrap());
        assert_eq!(keys.get::<i64>(1).unwrap(), 1);
    }

    #[test]
    fn test_max_rows_caps_cursor() {
        let session = session();
        session
            .execute("INSERT INTO t VALUES (1, 'a'), (2, 'b'), (3, 'c')")
            .unwrap();
        let mut cmd = session.prepare("SELECT id FROM t ORDER BY id").unwrap();
        cmd.set_max_rows(2);
        let mut cursor = cmd.execute_query().unwrap();
        let mut seen = 0;
        while cursor.advance().unwrap() {
            seen += 1;
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_close_on_completion() {
        let session = session();
        let mut cmd = session.prepare("SELECT 1").unwrap();
        cmd.close_on_completion();
        let mut cursor = cmd.execute_query().unwrap();
        assert!(!cmd.is_closed());
        assert!(cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
        assert!(cmd.is_closed());
        assert_eq!(cmd.execute().unwrap_err().kind(), ErrorKind::State);
    }

    #[test]
    fn test_query_timeout_aborts_command() {
        let session = session();
        let mut cmd = session
            .prepare(
                "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) \
                 SELECT count(*) FROM c",
            )
            .unwrap();
        cmd.set_query_timeout(Some(Duration::from_millis(50)));
        let err = cmd.execute().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LockedOrTimeout);
        assert_eq!(cmd.execute().unwrap_err().kind(), ErrorKind::State);
        cmd.close();
        assert!(cmd.is_closed());
    }

    #[test]
    fn test_column_metadata_from_statement() {
        let session = session();
        let mut cmd = session.prepare("SELECT id, name AS label, 42 FROM t").unwrap();
        let cursor = cmd.execute_query().unwrap();
        let columns = cursor.columns();
        assert_eq!(columns[0].label, "id");
        assert_eq!(columns[0].table.as_deref(), Some("t"));
        assert_eq!(columns[1].label, "label");
        assert_eq!(columns[1].origin_column.as_deref(), Some("name"));
        assert_eq!(columns[1].nullability, Nullability::NoNulls);
        assert_eq!(columns[1].declared_type.as_deref(), Some("TEXT"));
        assert_eq!(columns[2].nullability, Nullability::Unknown);
        assert_eq!(columns[2].declared_type, None);
    }
}
