///
/// # Forward-only cursors
///
/// A `Cursor` walks the rows one executed statement produced. Rows are
/// materialized when the statement runs (rusqlite's `Rows` borrow their
/// statement), so the cursor owns its data and its column metadata and
/// only borrows the `Session` to notice when it has been closed.
///
/// ## States
///
/// `BeforeFirst` → `advance()` → `OnRow` → ... → `AfterLast`. Values can
/// only be read `OnRow`. Column indices are 1-based and range checked
/// before the row state, so an out-of-range index is always a `Range`
/// error, even before the first `advance()`.
///
/// ## Column lookup by label
///
/// Exact match first, then ASCII case-insensitive, first declared column
/// winning in both passes. Qualified labels (`t.c`) are not resolved.
///

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use lightsql_value::{Affinity, Coerced, ColumnValue, FromValue, SqlType, TemporalConfig, coerce};

use crate::error::{Error, Result};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    BeforeFirst,
    OnRow,
    AfterLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    NoNulls,
    Nullable,
    Unknown,
}

/// Metadata for one result column, fixed when the statement is compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub label: String,
    pub declared_type: Option<String>,
    pub affinity: Affinity,
    pub database: Option<String>,
    pub table: Option<String>,
    pub origin_column: Option<String>,
    pub nullability: Nullability,
}

impl ColumnInfo {
    /// A column with no table origin, as produced by catalog listings.
    pub(crate) fn computed(label: &str, declared_type: &str) -> ColumnInfo {
        ColumnInfo {
            label: label.to_string(),
            declared_type: Some(declared_type.to_string()),
            affinity: Affinity::from_declared_type(Some(declared_type)),
            database: None,
            table: None,
            origin_column: None,
            nullability: Nullability::Unknown,
        }
    }
}

/// Liveness shared between a cursor and the command that produced it.
#[derive(Debug, Default)]
pub(crate) struct CursorLink {
    pub closed: Cell<bool>,
    pub consumed: Cell<bool>,
}

/// Mutation and repositioning entry points a cursor could expose. None
/// are available on forward-only read-only cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMutation {
    InsertRow,
    UpdateRow,
    DeleteRow,
    RefreshRow,
    UpdateValue,
    CancelRowUpdates,
    MoveToInsertRow,
    MoveToCurrentRow,
    Previous,
    First,
    Last,
    Absolute,
    Relative,
    BeforeFirst,
    AfterLast,
}

impl CursorMutation {
    pub const ALL: [CursorMutation; 15] = [
        CursorMutation::InsertRow,
        CursorMutation::UpdateRow,
        CursorMutation::DeleteRow,
        CursorMutation::RefreshRow,
        CursorMutation::UpdateValue,
        CursorMutation::CancelRowUpdates,
        CursorMutation::MoveToInsertRow,
        CursorMutation::MoveToCurrentRow,
        CursorMutation::Previous,
        CursorMutation::First,
        CursorMutation::Last,
        CursorMutation::Absolute,
        CursorMutation::Relative,
        CursorMutation::BeforeFirst,
        CursorMutation::AfterLast,
    ];

    pub fn is_supported(self) -> bool {
        false
    }
}

impl fmt::Display for CursorMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Something that names a column: a 1-based index or a label.
pub trait ColumnRef {
    fn resolve(&self, cursor: &mut Cursor<'_>) -> Result<usize>;
}

impl ColumnRef for usize {
    fn resolve(&self, cursor: &mut Cursor<'_>) -> Result<usize> {
        cursor.check_index(*self)?;
        Ok(*self)
    }
}

impl ColumnRef for i32 {
    fn resolve(&self, cursor: &mut Cursor<'_>) -> Result<usize> {
        let index = usize::try_from(*self).unwrap_or(0);
        cursor.check_index(index)?;
        Ok(index)
    }
}

impl ColumnRef for &str {
    fn resolve(&self, cursor: &mut Cursor<'_>) -> Result<usize> {
        cursor.find_column(self)
    }
}

impl ColumnRef for String {
    fn resolve(&self, cursor: &mut Cursor<'_>) -> Result<usize> {
        cursor.find_column(self)
    }
}

pub struct Cursor<'s> {
    session: &'s Session,
    columns: Rc<[ColumnInfo]>,
    rows: std::vec::IntoIter<Vec<ColumnValue>>,
    current: Option<Vec<ColumnValue>>,
    state: CursorState,
    row_number: usize,
    last_read_null: Option<bool>,
    labels: HashMap<String, usize>,
    temporal: TemporalConfig,
    link: Rc<CursorLink>,
    failure: Option<Error>,
}

impl<'s> Cursor<'s> {
    pub(crate) fn new(
        session: &'s Session,
        columns: Rc<[ColumnInfo]>,
        rows: Vec<Vec<ColumnValue>>,
        link: Rc<CursorLink>,
    ) -> Cursor<'s> {
        Cursor {
            session,
            columns,
            rows: rows.into_iter(),
            current: None,
            state: CursorState::BeforeFirst,
            row_number: 0,
            last_read_null: None,
            labels: HashMap::new(),
            temporal: session.options().temporal,
            link,
            failure: None,
        }
    }

    /// Error to raise when the rows run out, in place of the end of data.
    pub(crate) fn with_failure(mut self, failure: Option<Error>) -> Cursor<'s> {
        self.failure = failure;
        self
    }

    /// A cursor over rows built in memory rather than read from a statement.
    pub(crate) fn detached(
        session: &'s Session,
        columns: Vec<ColumnInfo>,
        rows: Vec<Vec<ColumnValue>>,
    ) -> Cursor<'s> {
        Cursor::new(session, columns.into(), rows, Rc::default())
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.session.is_closed() {
            return Err(Error::state("session is closed"));
        }
        if self.link.closed.get() {
            return Err(Error::state("cursor is closed"));
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index == 0 || index > self.columns.len() {
            return Err(Error::Range {
                what: "column",
                index,
                max: self.columns.len(),
            });
        }
        Ok(())
    }

    pub fn advance(&mut self) -> Result<bool> {
        self.ensure_usable()?;
        self.last_read_null = None;
        if self.state == CursorState::AfterLast {
            return Ok(false);
        }
        match self.rows.next() {
            Some(row) => {
                self.current = Some(row);
                self.state = CursorState::OnRow;
                self.row_number += 1;
                Ok(true)
            }
            None => {
                self.current = None;
                self.state = CursorState::AfterLast;
                self.link.consumed.set(true);
                match self.failure.take() {
                    Some(err) => Err(err),
                    None => Ok(false),
                }
            }
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// 1-based number of the current row; 0 when not on a row.
    pub fn row_number(&self) -> usize {
        match self.state {
            CursorState::OnRow => self.row_number,
            _ => 0,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Metadata snapshot that stays valid after the cursor is closed.
    pub fn metadata(&self) -> Rc<[ColumnInfo]> {
        Rc::clone(&self.columns)
    }

    /// 1-based index of the column labelled `label`.
    pub fn find_column(&mut self, label: &str) -> Result<usize> {
        if let Some(index) = self.labels.get(label) {
            return Ok(*index);
        }
        let found = self
            .columns
            .iter()
            .position(|c| c.label == label)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.label.eq_ignore_ascii_case(label))
            })
            .map(|i| i + 1)
            .ok_or_else(|| Error::NoSuchColumn(label.to_string()))?;
        self.labels.insert(label.to_string(), found);
        Ok(found)
    }

    fn value_at(&self, index: usize) -> Result<&ColumnValue> {
        match (&self.state, &self.current) {
            (CursorState::OnRow, Some(row)) => row
                .get(index - 1)
                .ok_or_else(|| Error::state("row is shorter than its metadata")),
            (CursorState::AfterLast, _) => Err(Error::state("cursor is positioned after the last row")),
            _ => Err(Error::state("no data available until advance() is called")),
        }
    }

    /// Reads a column as `T`. Records whether the stored value was NULL.
    pub fn get<T: FromValue>(&mut self, column: impl ColumnRef) -> Result<T> {
        self.ensure_usable()?;
        let index = column.resolve(self)?;
        let value = self.value_at(index)?;
        let is_null = value.is_null();
        let result = T::from_value(value, &self.temporal).map_err(Error::from);
        self.last_read_null = Some(is_null);
        result
    }

    /// Reads a column as the requested SQL type.
    pub fn get_as(&mut self, column: impl ColumnRef, to: SqlType) -> Result<Coerced> {
        self.ensure_usable()?;
        let index = column.resolve(self)?;
        let value = self.value_at(index)?;
        let is_null = value.is_null();
        let result = coerce(value, to, &self.temporal).map_err(Error::from);
        self.last_read_null = Some(is_null);
        result
    }

    pub fn get_value(&mut self, column: impl ColumnRef) -> Result<ColumnValue> {
        self.get::<ColumnValue>(column)
    }

    /// Whether the last column read on the current row was NULL.
    pub fn was_null(&self) -> Result<bool> {
        self.ensure_usable()?;
        self.last_read_null
            .ok_or_else(|| Error::state("no column has been read on the current row"))
    }

    pub fn apply(&mut self, op: CursorMutation) -> Result<()> {
        self.ensure_usable()?;
        Err(Error::unsupported(format!(
            "{op} on a forward-only, read-only cursor"
        )))
    }

    pub fn close(&mut self) {
        self.current = None;
        self.state = CursorState::AfterLast;
        self.link.closed.set(true);
        self.link.consumed.set(true);
    }

    pub fn is_closed(&self) -> bool {
        self.link.closed.get() || self.session.is_closed()
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("columns", &self.columns.len())
            .field("state", &self.state)
            .field("row_number", &self.row_number)
            .finish()
    }
}
