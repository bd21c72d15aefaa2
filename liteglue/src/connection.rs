///
/// Connection lifecycle and the execute entry point.
///

use std::cell::RefCell;
use std::path::Path;

use tracing::debug;

use crate::error::{ExecResult, engine_code};
use crate::script;
use crate::value::Value;

/// One engine connection.
///
/// Synchronous and blocking: every operation runs to completion on the
/// caller's thread with no suspension points, no background work, and no
/// retry logic. A `Connection` is `Send` but not `Sync`; concurrent use
/// from several threads requires external serialization or separate
/// connections.
pub struct Connection {
    engine: rusqlite::Connection,
    last_error: RefCell<String>,
}

impl Connection {
    /// Open a database file.
    ///
    /// The status code is the engine's own result code, surfaced without
    /// translation: 0 means success and the connection is present; any
    /// other value is the engine's open failure and no connection is
    /// returned.
    pub fn open<P: AsRef<Path>>(path: P) -> (Option<Connection>, i64) {
        match rusqlite::Connection::open(path) {
            Ok(engine) => (Some(Connection::wrap(engine)), 0),
            Err(e) => {
                debug!(code = engine_code(&e), "open rejected by engine");
                (None, engine_code(&e))
            }
        }
    }

    /// Open a transient in-memory database, same status contract as
    /// [`Connection::open`].
    pub fn open_in_memory() -> (Option<Connection>, i64) {
        match rusqlite::Connection::open_in_memory() {
            Ok(engine) => (Some(Connection::wrap(engine)), 0),
            Err(e) => {
                debug!(code = engine_code(&e), "open rejected by engine");
                (None, engine_code(&e))
            }
        }
    }

    fn wrap(engine: rusqlite::Connection) -> Connection {
        Connection {
            engine,
            last_error: RefCell::new(String::new()),
        }
    }

    /// Execute a script of one or more semicolon-separated statements.
    ///
    /// Positional parameters bind to the final statement only; placeholders
    /// in earlier statements run unbound (NULL per engine semantics). Rows
    /// produced by intermediate statements are discarded, and only the final
    /// statement's rows are returned. Any prepare, bind, or step failure
    /// aborts the whole script with the engine's diagnostic; effects already
    /// applied stand per the engine's own transaction rules, with no
    /// compensating rollback.
    pub fn execute(&self, script: &str, params: &[Value]) -> ExecResult {
        match script::run(&self.engine, script, params) {
            Ok(rows) => Ok(rows),
            Err(err) => {
                debug!(
                    code = err.code(),
                    message = err.message(),
                    "script execution failed"
                );
                *self.last_error.borrow_mut() = err.message().to_string();
                Err(err)
            }
        }
    }

    /// Diagnostic of the most recent failed operation on this connection.
    /// Empty before any failure; replaced by the next failure.
    pub fn last_error(&self) -> String {
        self.last_error.borrow().clone()
    }

    /// Rows changed by the most recently completed INSERT, UPDATE, or
    /// DELETE on this connection.
    pub fn changes(&self) -> i64 {
        self.engine.changes() as i64
    }

    /// Rowid of the most recent successful INSERT on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.engine.last_insert_rowid()
    }

    /// Close the connection. Outstanding-statement cleanup follows the
    /// engine's own close contract and is not re-verified here.
    pub fn close(self) {
        let _ = self.engine.close();
    }
}
