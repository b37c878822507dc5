///
/// Direct calls into the engine's C interface for what rusqlite does not
/// surface: column origin metadata, total change counting and statement
/// completeness. Each call works on the raw handle of a live
/// `Connection` and releases anything it allocates before returning.
///

use std::ffi::{CStr, CString, c_char, c_int};
use std::ptr;

use rusqlite::{Connection, ffi};

/// Where a result column comes from, when it maps to a table column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ColumnOrigin {
    pub database: Option<String>,
    pub table: Option<String>,
    pub column: Option<String>,
    pub not_null: Option<bool>,
}

/// Origin metadata for every result column of `sql` (a single statement).
/// Returns an empty list when the statement does not compile.
pub(crate) fn column_origins(conn: &Connection, sql: &str) -> Vec<ColumnOrigin> {
    let Ok(c_sql) = CString::new(sql) else {
        return Vec::new();
    };
    unsafe {
        let db = conn.handle();
        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let rc = ffi::sqlite3_prepare_v2(db, c_sql.as_ptr(), -1, &mut stmt, ptr::null_mut());
        if rc != ffi::SQLITE_OK || stmt.is_null() {
            return Vec::new();
        }

        let count = ffi::sqlite3_column_count(stmt);
        let mut origins = Vec::with_capacity(count.max(0) as usize);
        for i in 0..count {
            let database = owned(ffi::sqlite3_column_database_name(stmt, i));
            let table = owned(ffi::sqlite3_column_table_name(stmt, i));
            let column = owned(ffi::sqlite3_column_origin_name(stmt, i));
            let not_null = match (&database, &table, &column) {
                (Some(d), Some(t), Some(c)) => table_column_not_null(db, d, t, c),
                _ => None,
            };
            origins.push(ColumnOrigin {
                database,
                table,
                column,
                not_null,
            });
        }
        ffi::sqlite3_finalize(stmt);
        origins
    }
}

/// Running count of rows changed through this connection, triggers included.
pub(crate) fn total_changes(conn: &Connection) -> i64 {
    unsafe { i64::from(ffi::sqlite3_total_changes(conn.handle())) }
}

/// True when `sql` ends in a complete statement (a `;` outside of any
/// string, comment or trigger body).
pub(crate) fn is_complete(sql: &str) -> bool {
    match CString::new(sql) {
        Ok(c_sql) => unsafe { ffi::sqlite3_complete(c_sql.as_ptr()) != 0 },
        Err(_) => true,
    }
}

unsafe fn owned(text: *const c_char) -> Option<String> {
    if text.is_null() {
        return None;
    }
    unsafe { Some(CStr::from_ptr(text).to_string_lossy().into_owned()) }
}

unsafe fn table_column_not_null(
    db: *mut ffi::sqlite3,
    database: &str,
    table: &str,
    column: &str,
) -> Option<bool> {
    let database = CString::new(database).ok()?;
    let table = CString::new(table).ok()?;
    let column = CString::new(column).ok()?;
    let mut not_null: c_int = 0;
    let rc = unsafe {
        ffi::sqlite3_table_column_metadata(
            db,
            database.as_ptr(),
            table.as_ptr(),
            column.as_ptr(),
            ptr::null_mut(),
            ptr::null_mut(),
            &mut not_null,
            ptr::null_mut(),
            ptr::null_mut(),
        )
    };
    (rc == ffi::SQLITE_OK).then_some(not_null != 0)
}
