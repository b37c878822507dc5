///
/// Batches: queued parameter sets (prepared commands) or SQL texts (plain
/// commands), run in order by `execute_batch`.
///
/// Execution stops at the first failing item. The error carries the
/// update counts of the items that succeeded before it, so callers know
/// exactly which prefix was applied. The queue is emptied either way.
///

use std::mem;

use lightsql_value::ParamValue;
use tracing::{debug, warn};

use crate::command::{Command, Expect, Outcome};
use crate::error::{Error, Result};
use crate::sql::split_statements;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BatchItem {
    Parameters(Vec<ParamValue>),
    Sql(String),
}

impl Command<'_> {
    /// Queues a snapshot of the current parameter slots. The slots keep
    /// their values, so the next entry only needs to set what changes.
    pub fn add_to_batch(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.prepared_statements()?.len() > 1 {
            return Err(Error::unsupported("batching multi-statement commands"));
        }
        let params = self.snapshot_parameters()?;
        self.batch.push(BatchItem::Parameters(params));
        Ok(())
    }

    /// Queues SQL text on a plain command.
    pub fn add_batch_sql(&mut self, sql: &str) -> Result<()> {
        self.ensure_open()?;
        if self.prepared_statements().is_ok() {
            return Err(Error::unsupported("passing SQL text to a prepared command"));
        }
        self.batch.push(BatchItem::Sql(sql.to_string()));
        Ok(())
    }

    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Runs every queued item and returns one update count per item.
    pub fn execute_batch(&mut self) -> Result<Vec<i64>> {
        self.ensure_open()?;
        let items = mem::take(&mut self.batch);
        debug!(items = items.len(), "executing batch");
        let mut counts = Vec::with_capacity(items.len());
        for item in &items {
            match self.run_batch_item(item) {
                Ok(count) => counts.push(count),
                Err(cause) => {
                    self.note_failure(&cause);
                    warn!(applied = counts.len(), error = %cause, "batch stopped");
                    return Err(Error::BatchPartialFailure {
                        counts,
                        cause: Box::new(cause),
                    });
                }
            }
        }
        Ok(counts)
    }

    fn run_batch_item(&self, item: &BatchItem) -> Result<i64> {
        let session = self.session();
        let limits = self.limits();
        match item {
            BatchItem::Parameters(params) => {
                let sql = self
                    .prepared_statements()?
                    .first()
                    .cloned()
                    .ok_or_else(|| Error::state("command has no statement"))?;
                let params = self.lower(params);
                count_of(session.run_statement(&sql, &params, Expect::Count, limits)?)
            }
            BatchItem::Sql(text) => {
                let mut total = 0;
                for sql in split_statements(text) {
                    total += count_of(session.run_statement(&sql, &[], Expect::Count, limits)?)?;
                }
                Ok(total)
            }
        }
    }
}

fn count_of(outcome: Outcome) -> Result<i64> {
    match outcome {
        Outcome::Count(count) => Ok(count),
        Outcome::Rows(_) => Err(Error::ResultShape("batch items must not return rows")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::error::{Error, ErrorKind};
    use crate::session::Session;

    fn session() -> Session {
        let session = Session::open_in_memory().unwrap();
        session
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        session
    }

    #[test]
    fn test_prepared_batch_counts() {
        let session = session();
        let mut cmd = session.prepare("INSERT INTO t (id, name) VALUES (?, ?)").unwrap();
        for id in 1..=3 {
            cmd.set_parameter(1, id).unwrap();
            cmd.set_parameter(2, format!("row {id}")).unwrap();
            cmd.add_to_batch().unwrap();
        }
        assert_eq!(cmd.batch_len(), 3);
        assert_eq!(cmd.execute_batch().unwrap(), vec![1, 1, 1]);
        assert_eq!(cmd.batch_len(), 0);
        assert!(cmd.execute_batch().unwrap().is_empty());
    }

    #[test]
    fn test_partial_failure_reports_applied_prefix() {
        let session = session();
        let mut cmd = session.create_command().unwrap();
        cmd.add_batch_sql("INSERT INTO t VALUES (1, 'a')").unwrap();
        cmd.add_batch_sql("INSERT INTO t VALUES (2, 'b'); INSERT INTO t VALUES (3, 'c')").unwrap();
        cmd.add_batch_sql("INSERT INTO t VALUES (1, 'dup')").unwrap();
        cmd.add_batch_sql("INSERT INTO t VALUES (4, 'd')").unwrap();
        let err = cmd.execute_batch().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BatchPartialFailure);
        let Error::BatchPartialFailure { counts, cause } = err else {
            panic!("expected a batch failure");
        };
        assert_eq!(counts, vec![1, 2]);
        assert_eq!(cause.kind(), ErrorKind::ConstraintViolation);
        assert!(cmd.execute_batch().unwrap().is_empty());
    }

    #[test]
    fn test_batch_requires_bound_slots() {
        let session = session();
        let mut cmd = session.prepare("INSERT INTO t (id, name) VALUES (?, ?)").unwrap();
        cmd.set_parameter(1, 1).unwrap();
        assert_eq!(cmd.add_to_batch().unwrap_err().kind(), ErrorKind::NotBound);
        assert_eq!(cmd.add_batch_sql("DELETE FROM t").unwrap_err().kind(), ErrorKind::Unsupported);

        let mut plain = session.create_command().unwrap();
        assert_eq!(plain.add_to_batch().unwrap_err().kind(), ErrorKind::State);
    }

    #[test]
    fn test_rows_in_batch_fail_the_item() {
        let session = session();
        let mut cmd = session.create_command().unwrap();
        cmd.add_batch_sql("SELECT 1").unwrap();
        let err = cmd.execute_batch().unwrap_err();
        let Error::BatchPartialFailure { counts, cause } = err else {
            panic!("expected a batch failure");
        };
        assert!(counts.is_empty());
        assert_eq!(cause.kind(), ErrorKind::State);
    }

    #[test]
    fn test_timed_out_batch_retires_the_command() {
        let session = session();
        let mut cmd = session.create_command().unwrap();
        cmd.set_query_timeout(Some(Duration::from_millis(50)));
        cmd.add_batch_sql("INSERT INTO t (id) VALUES (1)").unwrap();
        cmd.add_batch_sql(
            "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n) \
             INSERT INTO t (id) SELECT max(i) FROM n",
        )
        .unwrap();
        let err = cmd.execute_batch().unwrap_err();
        let Error::BatchPartialFailure { counts, cause } = err else {
            panic!("expected a batch failure");
        };
        assert_eq!(counts, vec![1]);
        assert_eq!(cause.kind(), ErrorKind::LockedOrTimeout);
        assert_eq!(cmd.execute_batch().unwrap_err().kind(), ErrorKind::State);
        assert_eq!(cmd.add_batch_sql("SELECT 1").unwrap_err().kind(), ErrorKind::State);
    }

    #[test]
    fn test_clear_parameters_keeps_batch() {
        let session = session();
        let mut cmd = session.prepare("INSERT INTO t (id, name) VALUES (?, ?)").unwrap();
        cmd.set_parameter(1, 10).unwrap();
        cmd.set_parameter(2, "ten").unwrap();
        cmd.add_to_batch().unwrap();
        cmd.clear_parameters();
        assert_eq!(cmd.batch_len(), 1);
        cmd.clear_batch();
        assert_eq!(cmd.batch_len(), 0);
    }
}
