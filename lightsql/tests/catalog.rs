///
/// # Catalog listings
///
/// Renders listing cursors as pipe-separated lines and compares them
/// against inline snapshots.
///

use lightsql::{ColumnValue, Cursor, Session};
use tempfile::TempDir;

fn render(value: &ColumnValue) -> String {
    match value {
        ColumnValue::Null => "null".to_string(),
        ColumnValue::Integer(i) => i.to_string(),
        ColumnValue::Real(f) => f.to_string(),
        ColumnValue::Text(s) => s.clone(),
        ColumnValue::Blob(b) => format!("x'{}'", b.iter().map(|byte| format!("{byte:02x}")).collect::<String>()),
    }
}

fn dump(mut cursor: Cursor<'_>) -> String {
    let mut out = String::from("|");
    for column in cursor.columns() {
        out.push_str(&column.label);
        out.push('|');
    }
    out.push('\n');
    while cursor.advance().unwrap() {
        out.push('|');
        for i in 1..=cursor.column_count() {
            out.push_str(&render(&cursor.get_value(i).unwrap()));
            out.push('|');
        }
        out.push('\n');
    }
    out
}

fn session_with(ddl: &str) -> Session {
    let session = Session::open_in_memory().expect("Failed to open session");
    session.execute(ddl).expect("Failed to create schema");
    session
}

#[test]
fn test_imported_keys_of_column_reference() {
    let session = session_with(
        "CREATE TABLE artist (artistid INTEGER PRIMARY KEY, artistname TEXT);
         CREATE TABLE track (
             trackid INTEGER,
             trackname TEXT,
             trackartist INTEGER REFERENCES artist(artistid)
         );",
    );
    let catalog = session.catalog().unwrap();
    insta::assert_snapshot!(dump(catalog.list_imported_keys(None, None, "track").unwrap()), @r"
    |PKTABLE_CAT|PKTABLE_SCHEM|PKTABLE_NAME|PKCOLUMN_NAME|FKTABLE_CAT|FKTABLE_SCHEM|FKTABLE_NAME|FKCOLUMN_NAME|KEY_SEQ|UPDATE_RULE|DELETE_RULE|FK_NAME|PK_NAME|DEFERRABILITY|
    |main|null|artist|artistid|main|null|track|trackartist|1|3|3|track_artist_0|null|7|
    ");

    let exported = dump(catalog.list_exported_keys(None, None, "ARTIST").unwrap());
    let imported = dump(catalog.list_imported_keys(None, None, "track").unwrap());
    assert_eq!(exported, imported);
}

#[test]
fn test_implicit_parent_key_and_rules() {
    let session = session_with(
        "CREATE TABLE owner (a INTEGER, b TEXT, PRIMARY KEY (a, b));
         CREATE TABLE pet (
             id INTEGER PRIMARY KEY,
             oa INTEGER,
             ob TEXT,
             FOREIGN KEY (oa, ob) REFERENCES owner ON DELETE CASCADE ON UPDATE SET NULL
         );",
    );
    let catalog = session.catalog().unwrap();
    insta::assert_snapshot!(dump(catalog.list_imported_keys(None, None, "pet").unwrap()), @r"
    |PKTABLE_CAT|PKTABLE_SCHEM|PKTABLE_NAME|PKCOLUMN_NAME|FKTABLE_CAT|FKTABLE_SCHEM|FKTABLE_NAME|FKCOLUMN_NAME|KEY_SEQ|UPDATE_RULE|DELETE_RULE|FK_NAME|PK_NAME|DEFERRABILITY|
    |main|null|owner|a|main|null|pet|oa|1|2|0|pet_owner_0|null|7|
    |main|null|owner|b|main|null|pet|ob|2|2|0|pet_owner_0|null|7|
    ");
}

#[test]
fn test_index_info() {
    let session = session_with(
        "CREATE TABLE test_table (id INTEGER, name TEXT);
         CREATE INDEX test_index ON test_table (id);
         CREATE UNIQUE INDEX name_index ON test_table (name DESC, id);",
    );
    let catalog = session.catalog().unwrap();
    insta::assert_snapshot!(dump(catalog.list_indexes(None, None, "test_table", false).unwrap()), @r"
    |TABLE_CAT|TABLE_SCHEM|TABLE_NAME|NON_UNIQUE|INDEX_QUALIFIER|INDEX_NAME|TYPE|ORDINAL_POSITION|COLUMN_NAME|ASC_OR_DESC|CARDINALITY|PAGES|FILTER_CONDITION|
    |main|null|test_table|0|main|name_index|3|1|name|D|0|0|null|
    |main|null|test_table|0|main|name_index|3|2|id|A|0|0|null|
    |main|null|test_table|1|main|test_index|3|1|id|A|0|0|null|
    ");

    let unique = dump(catalog.list_indexes(None, None, "test_table", true).unwrap());
    assert_eq!(unique.lines().count(), 3);
    assert!(!unique.contains("test_index"));
}

#[test]
fn test_type_info() {
    let session = Session::open_in_memory().unwrap();
    let catalog = session.catalog().unwrap();
    insta::assert_snapshot!(dump(catalog.list_type_info().unwrap()), @r"
    |TYPE_NAME|DATA_TYPE|PRECISION|LITERAL_PREFIX|LITERAL_SUFFIX|CREATE_PARAMS|NULLABLE|CASE_SENSITIVE|SEARCHABLE|UNSIGNED_ATTRIBUTE|FIXED_PREC_SCALE|AUTO_INCREMENT|LOCAL_TYPE_NAME|MINIMUM_SCALE|MAXIMUM_SCALE|SQL_DATA_TYPE|SQL_DATETIME_SUB|NUM_PREC_RADIX|
    |NULL|0|0|null|null|null|1|1|3|0|0|0|null|0|0|0|0|10|
    |INTEGER|4|0|null|null|null|1|1|3|0|0|0|null|0|0|0|0|10|
    |REAL|7|0|null|null|null|1|1|3|0|0|0|null|0|0|0|0|10|
    |TEXT|12|0|null|null|null|1|1|3|0|0|0|null|0|0|0|0|10|
    |BLOB|1111|0|null|null|null|1|1|3|0|0|0|null|0|0|0|0|10|
    ");
}

#[test]
fn test_attached_database_is_its_own_catalog() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let other = dir.path().join("other.db");
    let session = session_with("CREATE TABLE local_t (x INTEGER)");
    session
        .execute(&format!("ATTACH DATABASE '{}' AS other", other.display()))
        .unwrap();
    session.execute("CREATE TABLE other.remote_t (y INTEGER PRIMARY KEY)").unwrap();

    let catalog = session.catalog().unwrap();
    let catalogs = dump(catalog.list_catalogs().unwrap());
    assert!(catalogs.contains("|main|"));
    assert!(catalogs.contains("|other|"));

    let mut tables = catalog.list_tables(Some("other"), None, Some("%"), Some(&["TABLE"])).unwrap();
    let mut names = Vec::new();
    while tables.advance().unwrap() {
        names.push((tables.get::<String>("TABLE_CAT").unwrap(), tables.get::<String>("TABLE_NAME").unwrap()));
    }
    assert_eq!(names, vec![("other".to_string(), "remote_t".to_string())]);

    insta::assert_snapshot!(dump(catalog.list_primary_keys(Some("other"), None, "remote_t").unwrap()), @r"
    |TABLE_CAT|TABLE_SCHEM|TABLE_NAME|COLUMN_NAME|KEY_SEQ|PK_NAME|
    |other|null|remote_t|y|1|y|
    ");
}
