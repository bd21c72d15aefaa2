///
/// Engine error surface.
///
/// Every failure carries the phase that rejected it, an owned copy of the
/// engine's diagnostic (engine buffers are only valid until the next engine
/// call, so the text is copied eagerly), and the engine's extended result
/// code passed through verbatim, -1 when the engine provided none.
///

use thiserror::Error;

use crate::rows::Rows;

/// Result of `Connection::execute`: the final statement's rows, or the
/// engine's diagnostic. No partial success is ever surfaced.
pub type ExecResult = Result<Rows, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("prepare failed: {message} (engine code {code})")]
    Prepare { message: String, code: i64 },

    #[error("bind failed: {message} (engine code {code})")]
    Bind { message: String, code: i64 },

    #[error("step failed: {message} (engine code {code})")]
    Step { message: String, code: i64 },
}

impl Error {
    /// The engine's diagnostic text.
    pub fn message(&self) -> &str {
        match self {
            Error::Prepare { message, .. }
            | Error::Bind { message, .. }
            | Error::Step { message, .. } => message,
        }
    }

    /// The engine's extended result code, untranslated; -1 when the engine
    /// provided none.
    pub fn code(&self) -> i64 {
        match self {
            Error::Prepare { code, .. }
            | Error::Bind { code, .. }
            | Error::Step { code, .. } => *code,
        }
    }

    pub(crate) fn prepare(e: rusqlite::Error) -> Error {
        Error::Prepare {
            message: e.to_string(),
            code: engine_code(&e),
        }
    }

    pub(crate) fn bind(e: rusqlite::Error) -> Error {
        Error::Bind {
            message: e.to_string(),
            code: engine_code(&e),
        }
    }

    pub(crate) fn step(e: rusqlite::Error) -> Error {
        Error::Step {
            message: e.to_string(),
            code: engine_code(&e),
        }
    }
}

/// Extended result code of an engine failure, -1 for errors the engine
/// reports without a code.
pub(crate) fn engine_code(e: &rusqlite::Error) -> i64 {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => err.extended_code as i64,
        _ => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_phase_and_diagnostic() {
        let err = Error::Prepare {
            message: "near \"SELEC\": syntax error".to_string(),
            code: 1,
        };
        assert!(err.to_string().contains("prepare failed"));
        assert!(err.to_string().contains("syntax error"));
        assert!(err.to_string().contains("engine code 1"));
    }

    #[test]
    fn test_message_and_code_accessors() {
        let err = Error::Bind {
            message: "column index out of range".to_string(),
            code: 25,
        };
        assert_eq!(err.message(), "column index out of range");
        assert_eq!(err.code(), 25);

        let err = Error::Step {
            message: "no such table: t".to_string(),
            code: -1,
        };
        assert_eq!(err.code(), -1);
    }
}
