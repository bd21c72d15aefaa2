///
/// Multi-statement script execution.
///
/// Statements are prepared incrementally from the script text; the engine's
/// prepare consumes one statement and reports the remaining tail. A
/// one-statement lookahead decides each statement's role: intermediate when
/// another statement can be prepared after it, final otherwise. Intermediate
/// statements run with their placeholders unbound and their rows discarded;
/// the final statement alone receives the caller's parameters and its rows
/// alone are captured. Encoding the roles as an explicit state machine makes
/// that policy a transition rather than a loop artifact.
///

use rusqlite::{Batch, Statement};
use tracing::{debug, trace};

use crate::error::Error;
use crate::rows::{Row, Rows};
use crate::value::Value;

/// Where the executor stands within a script. Statements live inside the
/// state that runs them, so each one is released when its state is left.
enum ScriptState<'conn> {
    Preparing,
    ExecutingIntermediate {
        stmt: Statement<'conn>,
        next: Statement<'conn>,
    },
    ExecutingFinal {
        stmt: Statement<'conn>,
    },
    Done,
}

/// Run a script of semicolon-separated statements, binding `params` to the
/// final statement only and capturing the final statement's rows.
///
/// A prepare, bind, or step failure anywhere aborts the whole script with
/// the engine's diagnostic; in-flight statement handles are released on the
/// error path, and effects already applied stand per the engine's own
/// transaction rules.
pub(crate) fn run(
    engine: &rusqlite::Connection,
    script: &str,
    params: &[Value],
) -> Result<Rows, Error> {
    let mut batch = Batch::new(engine, script);
    let mut out = Rows::new();
    let mut state = ScriptState::Preparing;

    loop {
        state = match state {
            ScriptState::Preparing => match prepare_next(&mut batch)? {
                // Statement-free script: whitespace, comments, bare semicolons.
                None => ScriptState::Done,
                Some(stmt) => match prepare_next(&mut batch)? {
                    Some(next) => ScriptState::ExecutingIntermediate { stmt, next },
                    None => ScriptState::ExecutingFinal { stmt },
                },
            },
            ScriptState::ExecutingIntermediate { stmt, next } => {
                step_discard(stmt)?;
                match prepare_next(&mut batch)? {
                    Some(after) => ScriptState::ExecutingIntermediate { stmt: next, next: after },
                    None => ScriptState::ExecutingFinal { stmt: next },
                }
            }
            ScriptState::ExecutingFinal { stmt } => {
                step_capture(stmt, params, &mut out)?;
                ScriptState::Done
            }
            ScriptState::Done => break,
        };
    }

    out.finish();
    Ok(out)
}

/// Prepare the next statement of the script, skipping empty statements and
/// trailing whitespace, comments, and semicolons.
fn prepare_next<'conn>(batch: &mut Batch<'conn, '_>) -> Result<Option<Statement<'conn>>, Error> {
    batch.next().map_err(|e| {
        debug!(code = crate::error::engine_code(&e), "prepare rejected by engine");
        Error::prepare(e)
    })
}

/// Step an intermediate statement to completion, discarding its rows.
/// Parameters are never bound here; placeholders run unbound (NULL per
/// engine semantics).
fn step_discard(mut stmt: Statement<'_>) -> Result<(), Error> {
    debug!(
        columns = stmt.column_count(),
        role = "intermediate",
        "executing statement"
    );
    let mut discarded = 0usize;
    let mut rows = stmt.raw_query();
    while rows.next().map_err(Error::step)?.is_some() {
        discarded += 1;
    }
    trace!(discarded, "intermediate statement complete");
    Ok(())
}

/// Bind the caller's parameters to the final statement, then step it to
/// completion, capturing every produced row.
fn step_capture(mut stmt: Statement<'_>, params: &[Value], out: &mut Rows) -> Result<(), Error> {
    debug!(
        columns = stmt.column_count(),
        role = "final",
        params = params.len(),
        "executing statement"
    );
    bind(&mut stmt, params)?;

    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next().map_err(Error::step)? {
        let count = row.as_ref().column_count();
        let mut columns = Vec::with_capacity(count);
        for i in 0..count {
            let cell = row.get_ref(i).map_err(Error::step)?;
            columns.push(Value::from_column(cell));
        }
        out.push(Row::new(columns));
    }
    trace!(captured = out.len(), "final statement complete");
    Ok(())
}

/// Bind positional parameters by 1-based index, tag-directed. Text and blob
/// payloads are bound as views valid for the duration of the call; the
/// engine copies what it keeps. The first failure short-circuits the rest.
fn bind(stmt: &mut Statement<'_>, params: &[Value]) -> Result<(), Error> {
    for (i, param) in params.iter().enumerate() {
        let index = i + 1;
        let bound = match param {
            Value::Null => stmt.raw_bind_parameter(index, rusqlite::types::Null),
            Value::Integer(v) => stmt.raw_bind_parameter(index, v),
            Value::Float(v) => stmt.raw_bind_parameter(index, v),
            Value::Text(v) => stmt.raw_bind_parameter(index, v.as_str()),
            Value::Blob(v) => stmt.raw_bind_parameter(index, v.as_slice()),
        };
        bound.map_err(Error::bind)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> rusqlite::Connection {
        rusqlite::Connection::open_in_memory().expect("in-memory open")
    }

    #[test]
    fn test_empty_script_yields_no_rows() {
        let conn = engine();
        let rows = run(&conn, "", &[]).expect("empty script");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_statement_free_script_yields_no_rows() {
        let conn = engine();
        let rows = run(&conn, "  ;; -- just a comment\n;  ", &[]).expect("statement-free script");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_trailing_semicolon_does_not_create_phantom_final() {
        let conn = engine();
        let rows = run(&conn, "SELECT 1;", &[]).expect("single statement");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Value::Integer(1));
    }

    #[test]
    fn test_intermediate_rows_are_discarded() {
        let conn = engine();
        let rows = run(&conn, "SELECT 1; SELECT 2; SELECT 3", &[]).expect("three selects");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Value::Integer(3));
    }

    #[test]
    fn test_bind_overflow_is_a_bind_error() {
        let conn = engine();
        let err = run(&conn, "SELECT 1", &[Value::Integer(7)]).unwrap_err();
        assert!(matches!(err, Error::Bind { .. }), "got {err:?}");
        assert!(!err.message().is_empty());
    }

    #[test]
    fn test_prepare_failure_carries_engine_diagnostic() {
        let conn = engine();
        let err = run(&conn, "SELEC 1", &[]).unwrap_err();
        assert!(matches!(err, Error::Prepare { .. }), "got {err:?}");
        assert!(err.message().contains("syntax error"));
    }

    #[test]
    fn test_lookahead_prepare_failure_stops_before_pending_statement() {
        // S1 runs once S2 prepares; the failing prepare of S3 aborts the
        // script before S2 executes, so the table exists but stays empty.
        let conn = engine();
        let err = run(
            &conn,
            "CREATE TABLE t(a); INSERT INTO t VALUES (1); INSERT INTO nosuch VALUES (2)",
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Prepare { .. }), "got {err:?}");

        let rows = run(&conn, "SELECT count(*) FROM t", &[]).expect("t must exist");
        assert_eq!(rows[0][0], Value::Integer(0));
    }
}
