///
/// # Command protocol
///
/// Multi-statement results, result-shape contracts, timeouts, session
/// configuration from TOML and error classification as seen by callers.
///

use std::fs;
use std::time::Duration;

use lightsql::{ErrorKind, Session, SessionOptions};
use tempfile::TempDir;

#[test]
fn test_script_results_in_order() {
    let session = Session::open_in_memory().unwrap();
    let mut cmd = session.create_command().unwrap();
    let script = "CREATE TABLE t (x INTEGER);
                  INSERT INTO t VALUES (1), (2), (3);
                  SELECT x FROM t ORDER BY x;
                  DELETE FROM t WHERE x > 1;
                  SELECT count(*) AS n FROM t;";

    assert!(!cmd.execute_sql(script).unwrap());
    assert_eq!(cmd.update_count(), 0);

    assert!(!cmd.next_result().unwrap());
    assert_eq!(cmd.update_count(), 3);

    assert!(cmd.next_result().unwrap());
    let mut values = cmd.cursor().unwrap().unwrap();
    let mut seen = Vec::new();
    while values.advance().unwrap() {
        seen.push(values.get::<i64>("x").unwrap());
    }
    assert_eq!(seen, [1, 2, 3]);

    assert!(!cmd.next_result().unwrap());
    assert_eq!(cmd.update_count(), 2);

    assert!(cmd.next_result().unwrap());
    let mut total = cmd.cursor().unwrap().unwrap();
    assert!(total.advance().unwrap());
    assert_eq!(total.get::<i64>("N").unwrap(), 1);

    assert!(!cmd.next_result().unwrap());
    assert_eq!(cmd.update_count(), -1);
    assert!(cmd.cursor().unwrap().is_none());
}

#[test]
fn test_trigger_bodies_are_not_split() {
    let session = Session::open_in_memory().unwrap();
    session
        .execute(
            "CREATE TABLE t (x INTEGER);
             CREATE TABLE audit (x INTEGER);
             CREATE TRIGGER t_audit AFTER INSERT ON t BEGIN
                 INSERT INTO audit VALUES (new.x);
                 INSERT INTO audit VALUES (new.x * 10);
             END;",
        )
        .unwrap();
    // Changes made by the trigger are counted with the statement.
    assert_eq!(session.execute("INSERT INTO t VALUES (7)").unwrap(), 3);
    let mut cmd = session.prepare("SELECT sum(x) FROM audit").unwrap();
    let mut cursor = cmd.execute_query().unwrap();
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.get::<i64>(1).unwrap(), 77);
}

#[test]
fn test_shape_errors_and_parameters() {
    let session = Session::open_in_memory().unwrap();
    session.execute("CREATE TABLE t (x INTEGER NOT NULL)").unwrap();

    let mut query = session.prepare("INSERT INTO t VALUES (?)").unwrap();
    query.set_parameter(1, 1).unwrap();
    assert_eq!(query.execute_query().unwrap_err().kind(), ErrorKind::State);

    let mut update = session.prepare("SELECT x FROM t").unwrap();
    assert_eq!(update.execute_update().unwrap_err().kind(), ErrorKind::State);

    let mut insert = session.prepare("INSERT INTO t VALUES (?)").unwrap();
    assert_eq!(insert.execute().unwrap_err().kind(), ErrorKind::NotBound);
    insert.set_null(1).unwrap();
    let err = insert.execute().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    assert!(err.engine_code().is_some());

    insert.set_parameter(1, 5).unwrap();
    insert.clear_parameters();
    assert_eq!(insert.execute().unwrap_err().kind(), ErrorKind::NotBound);

    let mut plain = session.create_command().unwrap();
    assert_eq!(plain.set_parameter(1, 1).unwrap_err().kind(), ErrorKind::Range);
    assert_eq!(plain.execute().unwrap_err().kind(), ErrorKind::State);
    assert_eq!(query.execute_sql("SELECT 1").unwrap_err().kind(), ErrorKind::Unsupported);
}

#[test]
fn test_syntax_errors_surface_at_prepare() {
    let session = Session::open_in_memory().unwrap();
    let err = session.prepare("SELECT FROM WHERE").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    let err = session.prepare("SELECT * FROM missing_table").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_runtime_failures_are_engine_errors() {
    let session = Session::open_in_memory().unwrap();
    session.execute("CREATE TABLE t (x INTEGER)").unwrap();

    let mut query = session.prepare("SELECT abs(-9223372036854775808)").unwrap();
    let err = query.execute_query().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Engine);
    assert!(err.to_string().contains("integer overflow"));

    let err = session
        .execute("INSERT INTO t VALUES (abs(-9223372036854775808))")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Engine);
}

#[test]
fn test_row_failure_reaches_the_advance_that_hits_it() {
    let session = Session::open_in_memory().unwrap();
    let mut cmd = session
        .prepare(
            "SELECT CASE WHEN column1 = 3 THEN abs(-9223372036854775808) ELSE column1 END \
             FROM (VALUES (1), (2), (3))",
        )
        .unwrap();
    let mut cursor = cmd.execute_query().unwrap();
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.get::<i64>(1).unwrap(), 1);
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.get::<i64>(1).unwrap(), 2);
    assert_eq!(cursor.advance().unwrap_err().kind(), ErrorKind::Engine);
    assert!(!cursor.advance().unwrap());

    // A plain failure does not retire the command.
    assert!(cmd.execute_query().is_ok());
}

#[test]
fn test_unbounded_query_yields_rows_before_timing_out() {
    let session = Session::open_in_memory().unwrap();
    let sql = "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n) SELECT i FROM n";

    let mut capped = session.prepare(sql).unwrap();
    capped.set_max_rows(3);
    let mut cursor = capped.execute_query().unwrap();
    let mut seen = Vec::new();
    while cursor.advance().unwrap() {
        seen.push(cursor.get::<i64>(1).unwrap());
    }
    assert_eq!(seen, [1, 2, 3]);

    let mut timed = session.prepare(sql).unwrap();
    timed.set_query_timeout(Some(Duration::from_millis(20)));
    let mut cursor = timed.execute_query().unwrap();
    let mut read = 0;
    let err = loop {
        match cursor.advance() {
            Ok(true) => read += 1,
            Ok(false) => panic!("an unbounded query cannot run out of rows"),
            Err(err) => break err,
        }
    };
    assert!(read > 0);
    assert_eq!(err.kind(), ErrorKind::LockedOrTimeout);
    assert_eq!(timed.execute_query().unwrap_err().kind(), ErrorKind::State);
}

#[test]
fn test_timed_out_command_must_be_closed() {
    let session = Session::open_in_memory().unwrap();
    let mut cmd = session
        .prepare(
            "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n) \
             SELECT max(i) FROM n",
        )
        .unwrap();
    cmd.set_query_timeout(Some(Duration::from_millis(20)));
    assert_eq!(cmd.query_timeout(), Some(Duration::from_millis(20)));
    assert_eq!(cmd.execute_query().unwrap_err().kind(), ErrorKind::LockedOrTimeout);
    assert_eq!(cmd.execute_query().unwrap_err().kind(), ErrorKind::State);
    cmd.close();
    assert!(cmd.is_closed());

    // The session itself is unaffected.
    assert_eq!(session.execute("CREATE TABLE after_timeout (x)").unwrap(), 0);
}

#[test]
fn test_options_from_config_file() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = dir.path().join("lightsql.toml");
    fs::write(
        &config,
        r#"[session]
busy_timeout_ms = 250
foreign_keys = false

[session.temporal]
bind_encoding = "julian_day"
"#,
    )
    .unwrap();

    let options = SessionOptions::from_path(&config).unwrap();
    assert_eq!(options.busy_timeout_ms, 250);
    assert!(!options.foreign_keys);

    let session = Session::open(dir.path().join("db.sqlite"), options).unwrap();
    session
        .execute("CREATE TABLE p (id INTEGER PRIMARY KEY); CREATE TABLE c (p INTEGER REFERENCES p(id))")
        .unwrap();
    // Foreign keys are off, so the dangling reference is accepted.
    assert_eq!(session.execute("INSERT INTO c VALUES (42)").unwrap(), 1);

    let err = SessionOptions::from_toml_str("[session]\nbusy_timeout_ms = \"soon\"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Engine);
}

#[test]
fn test_interrupt_handle_from_another_thread() {
    let session = Session::open_in_memory().unwrap();
    let handle = session.interrupt_handle().unwrap();
    let mut cmd = session
        .prepare(
            "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n) \
             SELECT max(i) FROM n",
        )
        .unwrap();
    let interrupter = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        handle.interrupt();
    });
    let err = cmd.execute_query().unwrap_err();
    interrupter.join().unwrap();
    assert_eq!(err.kind(), ErrorKind::LockedOrTimeout);
    // Without a query timeout the command stays usable.
    assert_eq!(cmd.parameter_count(), 0);
}
