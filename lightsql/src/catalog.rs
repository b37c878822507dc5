///
/// # Catalog introspection
///
/// Structural questions about the databases attached to a session,
/// answered as cursors with fixed column layouts (layout version
/// `CATALOG_LAYOUT_VERSION`). Listings are built from the schema table
/// and the engine's table-valued pragmas, then handed out as detached
/// cursors: the rows are a snapshot taken when the listing was made.
///
/// Catalogs are the engine's database names (`main`, `temp`, attached
/// databases). Schema arguments are accepted and ignored. Name patterns
/// follow `LIKE`: `%` and `_` wildcards, ASCII case-insensitive, `None`
/// (or empty) matches everything.
///
/// Key listings keep the engine's reporting order. For composite keys
/// that is the order of the child/parent columns as the engine lists
/// them, not necessarily ascending `KEY_SEQ`.
///

use indexmap::IndexMap;
use lightsql_value::{Affinity, ColumnValue};
use tracing::debug;

use crate::command::{Expect, Limits, Outcome};
use crate::cursor::{ColumnInfo, Cursor};
use crate::error::Result;
use crate::session::Session;
use crate::sql::{quote_identifier, table_constraints};

pub const CATALOG_LAYOUT_VERSION: u32 = 1;

const TYPE_NULL: i64 = 0;
const TYPE_INTEGER: i64 = 4;
const TYPE_NUMERIC: i64 = 2;
const TYPE_REAL: i64 = 7;
const TYPE_VARCHAR: i64 = 12;
const TYPE_OTHER: i64 = 1111;

const NO_NULLS: i64 = 0;
const NULLABLE: i64 = 1;
const INDEX_OTHER: i64 = 3;
const INITIALLY_DEFERRED: i64 = 5;
const NOT_DEFERRABLE: i64 = 7;

type Layout = &'static [(&'static str, &'static str)];

const CATALOGS: Layout = &[("TABLE_CAT", "TEXT")];

const TABLE_TYPES: Layout = &[("TABLE_TYPE", "TEXT")];

const TABLES: Layout = &[
    ("TABLE_CAT", "TEXT"),
    ("TABLE_SCHEM", "TEXT"),
    ("TABLE_NAME", "TEXT"),
    ("TABLE_TYPE", "TEXT"),
    ("REMARKS", "TEXT"),
    ("TYPE_CAT", "TEXT"),
    ("TYPE_SCHEM", "TEXT"),
    ("TYPE_NAME", "TEXT"),
    ("SELF_REFERENCING_COL_NAME", "TEXT"),
    ("REF_GENERATION", "TEXT"),
];

const COLUMNS: Layout = &[
    ("TABLE_CAT", "TEXT"),
    ("TABLE_SCHEM", "TEXT"),
    ("TABLE_NAME", "TEXT"),
    ("COLUMN_NAME", "TEXT"),
    ("DATA_TYPE", "INTEGER"),
    ("TYPE_NAME", "TEXT"),
    ("COLUMN_SIZE", "INTEGER"),
    ("BUFFER_LENGTH", "INTEGER"),
    ("DECIMAL_DIGITS", "INTEGER"),
    ("NUM_PREC_RADIX", "INTEGER"),
    ("NULLABLE", "INTEGER"),
    ("REMARKS", "TEXT"),
    ("COLUMN_DEF", "TEXT"),
    ("SQL_DATA_TYPE", "INTEGER"),
    ("SQL_DATETIME_SUB", "INTEGER"),
    ("CHAR_OCTET_LENGTH", "INTEGER"),
    ("ORDINAL_POSITION", "INTEGER"),
    ("IS_NULLABLE", "TEXT"),
    ("SCOPE_CATALOG", "TEXT"),
    ("SCOPE_SCHEMA", "TEXT"),
    ("SCOPE_TABLE", "TEXT"),
    ("SOURCE_DATA_TYPE", "INTEGER"),
    ("IS_AUTOINCREMENT", "TEXT"),
    ("IS_GENERATEDCOLUMN", "TEXT"),
];

const PRIMARY_KEYS: Layout = &[
    ("TABLE_CAT", "TEXT"),
    ("TABLE_SCHEM", "TEXT"),
    ("TABLE_NAME", "TEXT"),
    ("COLUMN_NAME", "TEXT"),
    ("KEY_SEQ", "INTEGER"),
    ("PK_NAME", "TEXT"),
];

const FOREIGN_KEYS: Layout = &[
    ("PKTABLE_CAT", "TEXT"),
    ("PKTABLE_SCHEM", "TEXT"),
    ("PKTABLE_NAME", "TEXT"),
    ("PKCOLUMN_NAME", "TEXT"),
    ("FKTABLE_CAT", "TEXT"),
    ("FKTABLE_SCHEM", "TEXT"),
    ("FKTABLE_NAME", "TEXT"),
    ("FKCOLUMN_NAME", "TEXT"),
    ("KEY_SEQ", "INTEGER"),
    ("UPDATE_RULE", "INTEGER"),
    ("DELETE_RULE", "INTEGER"),
    ("FK_NAME", "TEXT"),
    ("PK_NAME", "TEXT"),
    ("DEFERRABILITY", "INTEGER"),
];

const INDEXES: Layout = &[
    ("TABLE_CAT", "TEXT"),
    ("TABLE_SCHEM", "TEXT"),
    ("TABLE_NAME", "TEXT"),
    ("NON_UNIQUE", "INTEGER"),
    ("INDEX_QUALIFIER", "TEXT"),
    ("INDEX_NAME", "TEXT"),
    ("TYPE", "INTEGER"),
    ("ORDINAL_POSITION", "INTEGER"),
    ("COLUMN_NAME", "TEXT"),
    ("ASC_OR_DESC", "TEXT"),
    ("CARDINALITY", "INTEGER"),
    ("PAGES", "INTEGER"),
    ("FILTER_CONDITION", "TEXT"),
];

const TYPE_INFO: Layout = &[
    ("TYPE_NAME", "TEXT"),
    ("DATA_TYPE", "INTEGER"),
    ("PRECISION", "INTEGER"),
    ("LITERAL_PREFIX", "TEXT"),
    ("LITERAL_SUFFIX", "TEXT"),
    ("CREATE_PARAMS", "TEXT"),
    ("NULLABLE", "INTEGER"),
    ("CASE_SENSITIVE", "INTEGER"),
    ("SEARCHABLE", "INTEGER"),
    ("UNSIGNED_ATTRIBUTE", "INTEGER"),
    ("FIXED_PREC_SCALE", "INTEGER"),
    ("AUTO_INCREMENT", "INTEGER"),
    ("LOCAL_TYPE_NAME", "TEXT"),
    ("MINIMUM_SCALE", "INTEGER"),
    ("MAXIMUM_SCALE", "INTEGER"),
    ("SQL_DATA_TYPE", "INTEGER"),
    ("SQL_DATETIME_SUB", "INTEGER"),
    ("NUM_PREC_RADIX", "INTEGER"),
];

/// `LIKE` matching: `%` any run, `_` any one character, ASCII case folded.
/// Engine-owned objects: the `sqlite_` prefix taken literally.
fn is_internal_name(name: &str) -> bool {
    name.get(..7).is_some_and(|prefix| prefix.eq_ignore_ascii_case("sqlite_"))
}

fn like(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && p[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '_' || p[pi].eq_ignore_ascii_case(&t[ti])) {
            pi += 1;
            ti += 1;
        } else if let Some((star, from)) = backtrack {
            pi = star + 1;
            ti = from + 1;
            backtrack = Some((star, from + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '%')
}

fn matches(pattern: Option<&str>, text: &str) -> bool {
    match pattern {
        None | Some("") => true,
        Some(pattern) => like(pattern, text),
    }
}

fn layout(columns: Layout) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|(label, ty)| ColumnInfo::computed(label, ty))
        .collect()
}

fn text(value: &str) -> ColumnValue {
    ColumnValue::Text(value.to_string())
}

fn int(value: i64) -> ColumnValue {
    ColumnValue::Integer(value)
}

fn as_text(value: &ColumnValue) -> Option<String> {
    match value {
        ColumnValue::Text(t) => Some(t.clone()),
        ColumnValue::Integer(i) => Some(i.to_string()),
        ColumnValue::Real(r) => Some(r.to_string()),
        ColumnValue::Null | ColumnValue::Blob(_) => None,
    }
}

fn as_int(value: &ColumnValue) -> i64 {
    match value {
        ColumnValue::Integer(i) => *i,
        ColumnValue::Real(r) => *r as i64,
        ColumnValue::Text(t) => t.trim().parse().unwrap_or(0),
        ColumnValue::Null | ColumnValue::Blob(_) => 0,
    }
}

fn type_code(affinity: Affinity) -> i64 {
    match affinity {
        Affinity::Integer => TYPE_INTEGER,
        Affinity::Text => TYPE_VARCHAR,
        Affinity::Real => TYPE_REAL,
        Affinity::Blob => TYPE_OTHER,
        Affinity::Numeric => TYPE_NUMERIC,
    }
}

fn rule_code(action: Option<&str>) -> i64 {
    match action.map(str::to_ascii_uppercase).as_deref() {
        Some("CASCADE") => 0,
        Some("RESTRICT") => 1,
        Some("SET NULL") => 2,
        Some("SET DEFAULT") => 4,
        _ => 3,
    }
}

#[derive(Debug, Clone)]
struct TableEntry {
    catalog: String,
    name: String,
    kind: &'static str,
    sql: Option<String>,
}

#[derive(Debug)]
pub struct Catalog<'s> {
    session: &'s Session,
}

impl<'s> Catalog<'s> {
    pub(crate) fn new(session: &'s Session) -> Catalog<'s> {
        Catalog { session }
    }

    pub fn layout_version(&self) -> u32 {
        CATALOG_LAYOUT_VERSION
    }

    fn query(&self, sql: &str, params: &[ColumnValue]) -> Result<Vec<Vec<ColumnValue>>> {
        match self
            .session
            .run_statement(sql, params, Expect::Rows, Limits::default())?
        {
            Outcome::Rows(materialized) => match materialized.failure {
                Some(err) => Err(err),
                None => Ok(materialized.rows),
            },
            Outcome::Count(_) => Ok(Vec::new()),
        }
    }

    fn cursor(&self, columns: Layout, rows: Vec<Vec<ColumnValue>>) -> Cursor<'s> {
        debug!(rows = rows.len(), "catalog listing built");
        Cursor::detached(self.session, layout(columns), rows)
    }

    fn databases(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        let rows = self.query("SELECT name FROM pragma_database_list ORDER BY seq", &[])?;
        Ok(rows
            .iter()
            .filter_map(|row| row.first().and_then(as_text))
            .filter(|name| matches(pattern, name))
            .collect())
    }

    /// Tables and views per database, name-ordered, with the schema table
    /// itself listed as a system table.
    fn tables(&self, catalog: Option<&str>, pattern: Option<&str>) -> Result<Vec<TableEntry>> {
        let mut entries = Vec::new();
        for db in self.databases(catalog)? {
            let sql = format!(
                "SELECT name, type, sql FROM {}.sqlite_master WHERE type IN ('table', 'view')",
                quote_identifier(&db)
            );
            let master = if db.eq_ignore_ascii_case("temp") {
                "sqlite_temp_master"
            } else {
                "sqlite_master"
            };
            let mut found = vec![TableEntry {
                catalog: db.clone(),
                name: master.to_string(),
                kind: "SYSTEM TABLE",
                sql: None,
            }];
            for row in self.query(&sql, &[])? {
                let Some(name) = row.first().and_then(as_text) else {
                    continue;
                };
                let kind = if is_internal_name(&name) {
                    "SYSTEM TABLE"
                } else if row.get(1).and_then(as_text).as_deref() == Some("view") {
                    "VIEW"
                } else {
                    "TABLE"
                };
                found.push(TableEntry {
                    catalog: db.clone(),
                    name,
                    kind,
                    sql: row.get(2).and_then(as_text),
                });
            }
            found.retain(|entry| matches(pattern, &entry.name));
            found.sort_by(|a, b| a.name.cmp(&b.name));
            entries.extend(found);
        }
        Ok(entries)
    }

    /// The table named `table`; exact spelling wins over a case-folded match.
    fn locate(&self, catalog: Option<&str>, table: &str) -> Result<Option<TableEntry>> {
        let entries = self.tables(catalog, None)?;
        let exact = entries.iter().find(|e| e.name == table);
        let found = exact.or_else(|| entries.iter().find(|e| e.name.eq_ignore_ascii_case(table)));
        Ok(found.cloned())
    }

    pub fn list_catalogs(&self) -> Result<Cursor<'s>> {
        let mut names = self.databases(None)?;
        names.sort();
        let rows = names.iter().map(|name| vec![text(name)]).collect();
        Ok(self.cursor(CATALOGS, rows))
    }

    pub fn list_table_types(&self) -> Result<Cursor<'s>> {
        let rows = ["SYSTEM TABLE", "TABLE", "VIEW"]
            .iter()
            .map(|kind| vec![text(kind)])
            .collect();
        Ok(self.cursor(TABLE_TYPES, rows))
    }

    /// Tables matching the patterns, ordered by type then name. `types`
    /// restricts the listing to `TABLE`, `VIEW` and/or `SYSTEM TABLE`.
    pub fn list_tables(
        &self,
        catalog: Option<&str>,
        _schema: Option<&str>,
        table: Option<&str>,
        types: Option<&[&str]>,
    ) -> Result<Cursor<'s>> {
        let mut entries = self.tables(catalog, table)?;
        if let Some(types) = types {
            entries.retain(|e| types.iter().any(|t| t.eq_ignore_ascii_case(e.kind)));
        }
        entries.sort_by(|a, b| a.kind.cmp(b.kind).then_with(|| a.name.cmp(&b.name)));
        let rows = entries
            .iter()
            .map(|e| {
                let mut row = vec![text(&e.catalog), ColumnValue::Null, text(&e.name), text(e.kind)];
                row.resize(TABLES.len(), ColumnValue::Null);
                row
            })
            .collect();
        Ok(self.cursor(TABLES, rows))
    }

    pub fn list_columns(
        &self,
        catalog: Option<&str>,
        _schema: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Result<Cursor<'s>> {
        let mut rows = Vec::new();
        for entry in self.tables(catalog, table)? {
            let info = self.query(
                "SELECT cid, name, type, \"notnull\", dflt_value, pk, hidden \
                 FROM pragma_table_xinfo(?1, ?2)",
                &[text(&entry.name), text(&entry.catalog)],
            )?;
            let key_columns = info.iter().filter(|r| as_int(&r[5]) > 0).count();
            let autoincrement = entry
                .sql
                .as_deref()
                .is_some_and(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT"));

            for col in &info {
                let hidden = as_int(&col[6]);
                let name = as_text(&col[1]).unwrap_or_default();
                if hidden == 1 || !matches(column, &name) {
                    continue;
                }
                let declared = as_text(&col[2]).unwrap_or_default().to_ascii_uppercase();
                let affinity = Affinity::from_declared_type(Some(&declared));
                let not_null = as_int(&col[3]) != 0;
                let is_rowid_alias =
                    key_columns == 1 && as_int(&col[5]) == 1 && affinity == Affinity::Integer && declared == "INTEGER";
                rows.push(vec![
                    text(&entry.catalog),
                    ColumnValue::Null,
                    text(&entry.name),
                    text(&name),
                    int(type_code(affinity)),
                    text(&declared),
                    int(10),
                    ColumnValue::Null,
                    int(10),
                    int(10),
                    int(if not_null { NO_NULLS } else { NULLABLE }),
                    ColumnValue::Null,
                    as_text(&col[4]).map_or(ColumnValue::Null, |d| text(&d)),
                    ColumnValue::Null,
                    ColumnValue::Null,
                    int(10),
                    int(as_int(&col[0]) + 1),
                    text(if not_null { "NO" } else { "YES" }),
                    ColumnValue::Null,
                    ColumnValue::Null,
                    ColumnValue::Null,
                    ColumnValue::Null,
                    text(if autoincrement && is_rowid_alias { "YES" } else { "NO" }),
                    text(if hidden >= 2 { "YES" } else { "NO" }),
                ]);
            }
        }
        Ok(self.cursor(COLUMNS, rows))
    }

    /// Primary key columns of a table in key order.
    fn key_columns(&self, entry: &TableEntry) -> Result<Vec<(String, i64)>> {
        let mut keys: Vec<(String, i64)> = self
            .query(
                "SELECT name, pk FROM pragma_table_info(?1, ?2) WHERE pk > 0",
                &[text(&entry.name), text(&entry.catalog)],
            )?
            .iter()
            .map(|r| (as_text(&r[0]).unwrap_or_default(), as_int(&r[1])))
            .collect();
        keys.sort_by_key(|(_, seq)| *seq);
        Ok(keys)
    }

    /// One row per primary key column, in the engine's column order.
    /// `PK_NAME` is the declared constraint name; otherwise the column
    /// name for a single-column key and `PK` for a composite one.
    pub fn list_primary_keys(
        &self,
        catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Cursor<'s>> {
        let Some(entry) = self.locate(catalog, table)? else {
            return Ok(self.cursor(PRIMARY_KEYS, Vec::new()));
        };
        let columns = self.query(
            "SELECT name, pk FROM pragma_table_info(?1, ?2) WHERE pk > 0",
            &[text(&entry.name), text(&entry.catalog)],
        )?;
        let declared = entry
            .sql
            .as_deref()
            .and_then(|sql| table_constraints(sql).primary_key_name);
        let pk_name = match (declared, columns.as_slice()) {
            (Some(name), _) => name,
            (None, [only]) => as_text(&only[0]).unwrap_or_default(),
            (None, _) => "PK".to_string(),
        };
        let rows = columns
            .iter()
            .map(|col| {
                vec![
                    text(&entry.catalog),
                    ColumnValue::Null,
                    text(&entry.name),
                    col[0].clone(),
                    int(as_int(&col[1])),
                    text(&pk_name),
                ]
            })
            .collect();
        Ok(self.cursor(PRIMARY_KEYS, rows))
    }

    /// Foreign key rows declared by `child`, in the engine's order.
    fn foreign_keys(&self, child: &TableEntry) -> Result<Vec<Vec<ColumnValue>>> {
        let fks = self.query(
            "SELECT id, seq, \"table\", \"from\", \"to\", on_update, on_delete \
             FROM pragma_foreign_key_list(?1, ?2)",
            &[text(&child.name), text(&child.catalog)],
        )?;
        if fks.is_empty() {
            return Ok(Vec::new());
        }
        let declared = child
            .sql
            .as_deref()
            .map(|sql| table_constraints(sql).foreign_keys)
            .unwrap_or_default();
        let count = fks.iter().map(|r| as_int(&r[0])).max().unwrap_or(0) + 1;
        let mut parent_keys: IndexMap<String, Vec<(String, i64)>> = IndexMap::new();

        let mut rows = Vec::with_capacity(fks.len());
        for fk in &fks {
            let id = as_int(&fk[0]);
            let seq = as_int(&fk[1]);
            let parent = as_text(&fk[2]).unwrap_or_default();
            // The engine numbers the last declared key 0.
            let ordinal = count - 1 - id;
            let decl = usize::try_from(ordinal).ok().and_then(|i| declared.get(i));

            let parent_column = match as_text(&fk[4]) {
                Some(column) => text(&column),
                None => {
                    if !parent_keys.contains_key(&parent) {
                        let keys = match self.locate(Some(&child.catalog), &parent)? {
                            Some(entry) => self.key_columns(&entry)?,
                            None => Vec::new(),
                        };
                        parent_keys.insert(parent.clone(), keys);
                    }
                    parent_keys
                        .get(&parent)
                        .and_then(|keys| usize::try_from(seq).ok().and_then(|s| keys.get(s)))
                        .map_or(ColumnValue::Null, |(name, _)| text(name))
                }
            };
            let fk_name = decl
                .and_then(|d| d.name.clone())
                .unwrap_or_else(|| format!("{}_{}_{}", child.name, parent, ordinal));
            let deferrability = if decl.is_some_and(|d| d.initially_deferred) {
                INITIALLY_DEFERRED
            } else {
                NOT_DEFERRABLE
            };

            rows.push(vec![
                text(&child.catalog),
                ColumnValue::Null,
                text(&parent),
                parent_column,
                text(&child.catalog),
                ColumnValue::Null,
                text(&child.name),
                fk[3].clone(),
                int(seq + 1),
                int(rule_code(as_text(&fk[5]).as_deref())),
                int(rule_code(as_text(&fk[6]).as_deref())),
                text(&fk_name),
                ColumnValue::Null,
                int(deferrability),
            ]);
        }
        Ok(rows)
    }

    /// Foreign keys declared by `table`.
    pub fn list_imported_keys(
        &self,
        catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Cursor<'s>> {
        let rows = match self.locate(catalog, table)? {
            Some(child) => self.foreign_keys(&child)?,
            None => Vec::new(),
        };
        Ok(self.cursor(FOREIGN_KEYS, rows))
    }

    /// Foreign keys in other tables that reference `table`, grouped by
    /// referencing table name.
    pub fn list_exported_keys(
        &self,
        catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
    ) -> Result<Cursor<'s>> {
        let Some(parent) = self.locate(catalog, table)? else {
            return Ok(self.cursor(FOREIGN_KEYS, Vec::new()));
        };
        let mut rows = Vec::new();
        for child in self.tables(Some(&parent.catalog), None)? {
            if child.kind != "TABLE" {
                continue;
            }
            rows.extend(self.foreign_keys(&child)?.into_iter().filter(|row| {
                as_text(&row[2]).is_some_and(|name| name.eq_ignore_ascii_case(&parent.name))
            }));
        }
        Ok(self.cursor(FOREIGN_KEYS, rows))
    }

    /// Index columns of `table`, ordered by `NON_UNIQUE`, index name and
    /// position within the index.
    pub fn list_indexes(
        &self,
        catalog: Option<&str>,
        _schema: Option<&str>,
        table: &str,
        unique_only: bool,
    ) -> Result<Cursor<'s>> {
        let Some(entry) = self.locate(catalog, table)? else {
            return Ok(self.cursor(INDEXES, Vec::new()));
        };
        let list = self.query(
            "SELECT name, \"unique\" FROM pragma_index_list(?1, ?2)",
            &[text(&entry.name), text(&entry.catalog)],
        )?;

        let mut indexes: IndexMap<String, (i64, Vec<Vec<ColumnValue>>)> = IndexMap::new();
        for index in &list {
            let Some(name) = as_text(&index[0]) else {
                continue;
            };
            let non_unique = i64::from(as_int(&index[1]) == 0);
            if unique_only && non_unique == 1 {
                continue;
            }
            let columns = self.query(
                "SELECT seqno, name, \"desc\" FROM pragma_index_xinfo(?1, ?2) WHERE key = 1",
                &[text(&name), text(&entry.catalog)],
            )?;
            let rows = columns
                .iter()
                .map(|col| {
                    vec![
                        text(&entry.catalog),
                        ColumnValue::Null,
                        text(&entry.name),
                        int(non_unique),
                        text(&entry.catalog),
                        text(&name),
                        int(INDEX_OTHER),
                        int(as_int(&col[0]) + 1),
                        col[1].clone(),
                        text(if as_int(&col[2]) != 0 { "D" } else { "A" }),
                        int(0),
                        int(0),
                        ColumnValue::Null,
                    ]
                })
                .collect();
            indexes.insert(name, (non_unique, rows));
        }
        indexes.sort_by(|a_name, a, b_name, b| a.0.cmp(&b.0).then_with(|| a_name.cmp(b_name)));
        let rows = indexes.into_values().flat_map(|(_, rows)| rows).collect();
        Ok(self.cursor(INDEXES, rows))
    }

    /// The engine's storage classes with their type codes.
    pub fn list_type_info(&self) -> Result<Cursor<'s>> {
        self.session.connection()?;
        let rows = [
            ("NULL", TYPE_NULL),
            ("INTEGER", TYPE_INTEGER),
            ("REAL", TYPE_REAL),
            ("TEXT", TYPE_VARCHAR),
            ("BLOB", TYPE_OTHER),
        ]
        .iter()
        .map(|(name, code)| {
            vec![
                text(name),
                int(*code),
                int(0),
                ColumnValue::Null,
                ColumnValue::Null,
                ColumnValue::Null,
                int(NULLABLE),
                int(1),
                int(3),
                int(0),
                int(0),
                int(0),
                ColumnValue::Null,
                int(0),
                int(0),
                int(0),
                int(0),
                int(10),
            ]
        })
        .collect();
        Ok(self.cursor(TYPE_INFO, rows))
    }
}
