///
/// C ABI for the liteglue script-execution bridge.
///
/// Uses three handle registries behind LazyLock<Mutex<Registry>>:
/// - CONNECTIONS: i64 handle -> open connection (+ its last-error buffer)
/// - RESULTS: i64 handle -> one materialized execution result
/// - PARAMS: i64 handle -> a parameter list under construction
///
/// Conventions:
/// - Functions returning a status code return 0 on success; engine failures
///   pass the engine's code through, and null/non-UTF-8 arguments or unknown
///   handles return SQLITE_MISUSE (21).
/// - `liteglue_exec` always returns a result handle; the result is either
///   ok (rows) or error (diagnostic + code) and is inspected through the
///   `liteglue_result_*` accessors until freed.
/// - Returned pointers reference registry-owned memory: a last-error pointer
///   is valid until the next operation on that connection, result text and
///   error pointers until the result is freed.
/// - Wrong-tag and out-of-range cell reads return defined zero values,
///   never undefined behavior.
///

use std::collections::HashMap;
use std::ffi::{CStr, CString, c_char};
use std::sync::{LazyLock, Mutex};

use liteglue::{Connection, Rows, Value};

/// Engine misuse code, returned for null pointers, non-UTF-8 arguments,
/// and unknown handles.
pub const SQLITE_MISUSE: i64 = 21;

struct Registry<T> {
    entries: HashMap<i64, T>,
    next_id: i64,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    fn insert(&mut self, value: T) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, value);
        id
    }
}

struct ConnEntry {
    conn: Connection,
    /// Owned copy of the connection's diagnostic, refreshed by
    /// `liteglue_last_error`; the pointer handed out stays valid until the
    /// next operation on this connection.
    last_error: CString,
}

enum ResultEntry {
    Ok(Rows),
    Err { message: CString, code: i64 },
}

static CONNECTIONS: LazyLock<Mutex<Registry<ConnEntry>>> =
    LazyLock::new(|| Mutex::new(Registry::new()));

static RESULTS: LazyLock<Mutex<Registry<ResultEntry>>> =
    LazyLock::new(|| Mutex::new(Registry::new()));

static PARAMS: LazyLock<Mutex<Registry<Vec<Value>>>> =
    LazyLock::new(|| Mutex::new(Registry::new()));

fn insert_connection(conn: Connection) -> i64 {
    CONNECTIONS.lock().unwrap().insert(ConnEntry {
        conn,
        last_error: CString::default(),
    })
}

fn error_result(message: &str, code: i64) -> i64 {
    let entry = ResultEntry::Err {
        message: CString::new(message).unwrap_or_default(),
        code,
    };
    RESULTS.lock().unwrap().insert(entry)
}

fn with_cell<R>(res: i64, row: i64, col: i64, default: R, read: impl FnOnce(&Value) -> R) -> R {
    if row < 0 || col < 0 {
        return default;
    }
    let reg = RESULTS.lock().unwrap();
    match reg.entries.get(&res) {
        Some(ResultEntry::Ok(rows)) => {
            match rows.get(row as usize).and_then(|r| r.get(col as usize)) {
                Some(value) => read(value),
                None => default,
            }
        }
        _ => default,
    }
}

/// Open a database file. Writes a connection handle through `out_conn` and
/// returns the engine's open status verbatim (0 = success). On failure the
/// handle is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_open(path: *const c_char, out_conn: *mut i64) -> i64 {
    if path.is_null() || out_conn.is_null() {
        return SQLITE_MISUSE;
    }
    let path = match unsafe { CStr::from_ptr(path) }.to_str() {
        Ok(p) => p,
        Err(_) => {
            unsafe { *out_conn = 0 };
            return SQLITE_MISUSE;
        }
    };
    let (conn, status) = Connection::open(path);
    match conn {
        Some(conn) => {
            unsafe { *out_conn = insert_connection(conn) };
            status
        }
        None => {
            unsafe { *out_conn = 0 };
            status
        }
    }
}

/// Open a transient in-memory database, same contract as `liteglue_open`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_open_memory(out_conn: *mut i64) -> i64 {
    if out_conn.is_null() {
        return SQLITE_MISUSE;
    }
    let (conn, status) = Connection::open_in_memory();
    match conn {
        Some(conn) => {
            unsafe { *out_conn = insert_connection(conn) };
            status
        }
        None => {
            unsafe { *out_conn = 0 };
            status
        }
    }
}

/// Close and drop a connection. Unknown handles are ignored, so a double
/// close is safe.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_close(conn: i64) {
    let removed = CONNECTIONS.lock().unwrap().entries.remove(&conn);
    if let Some(entry) = removed {
        entry.conn.close();
    }
}

/// Diagnostic of the most recent failed operation on `conn`, empty before
/// any failure. The pointer references connection-owned memory and is valid
/// until the next operation on that connection; null for unknown handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_last_error(conn: i64, out_len: *mut usize) -> *const c_char {
    let mut reg = CONNECTIONS.lock().unwrap();
    match reg.entries.get_mut(&conn) {
        Some(entry) => {
            entry.last_error = CString::new(entry.conn.last_error()).unwrap_or_default();
            if !out_len.is_null() {
                unsafe { *out_len = entry.last_error.as_bytes().len() };
            }
            entry.last_error.as_ptr()
        }
        None => {
            if !out_len.is_null() {
                unsafe { *out_len = 0 };
            }
            std::ptr::null()
        }
    }
}

/// Rows changed by the most recently completed statement; 0 for unknown
/// handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_changes(conn: i64) -> i64 {
    let reg = CONNECTIONS.lock().unwrap();
    match reg.entries.get(&conn) {
        Some(entry) => entry.conn.changes(),
        None => 0,
    }
}

/// Rowid of the most recent successful INSERT; 0 for unknown handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_last_insert_rowid(conn: i64) -> i64 {
    let reg = CONNECTIONS.lock().unwrap();
    match reg.entries.get(&conn) {
        Some(entry) => entry.conn.last_insert_rowid(),
        None => 0,
    }
}

/// Start building a parameter list.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_params_new() -> i64 {
    PARAMS.lock().unwrap().insert(Vec::new())
}

fn params_push(params: i64, value: Value) -> i64 {
    let mut reg = PARAMS.lock().unwrap();
    match reg.entries.get_mut(&params) {
        Some(list) => {
            list.push(value);
            0
        }
        None => SQLITE_MISUSE,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_params_push_null(params: i64) -> i64 {
    params_push(params, Value::Null)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_params_push_int(params: i64, value: i64) -> i64 {
    params_push(params, Value::Integer(value))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_params_push_float(params: i64, value: f64) -> i64 {
    params_push(params, Value::Float(value))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_params_push_text(params: i64, text: *const c_char) -> i64 {
    if text.is_null() {
        return SQLITE_MISUSE;
    }
    match unsafe { CStr::from_ptr(text) }.to_str() {
        Ok(text) => params_push(params, Value::from(text)),
        Err(_) => SQLITE_MISUSE,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_params_push_blob(
    params: i64,
    bytes: *const u8,
    len: usize,
) -> i64 {
    let payload = if len == 0 {
        Vec::new()
    } else if bytes.is_null() {
        return SQLITE_MISUSE;
    } else {
        unsafe { std::slice::from_raw_parts(bytes, len) }.to_vec()
    };
    params_push(params, Value::Blob(payload))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_params_len(params: i64) -> i64 {
    let reg = PARAMS.lock().unwrap();
    match reg.entries.get(&params) {
        Some(list) => list.len() as i64,
        None => 0,
    }
}

/// Drop a parameter list without executing. Unknown handles are ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_params_free(params: i64) {
    PARAMS.lock().unwrap().entries.remove(&params);
}

/// Execute a script against a connection. `params` is a handle from
/// `liteglue_params_new` (0 for no parameters) and is consumed regardless of
/// outcome. Always returns a result handle; inspect it with the
/// `liteglue_result_*` accessors and release it with `liteglue_result_free`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_exec(conn: i64, script: *const c_char, params: i64) -> i64 {
    let bound = if params != 0 {
        PARAMS
            .lock()
            .unwrap()
            .entries
            .remove(&params)
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    if script.is_null() {
        return error_result("script pointer is null", SQLITE_MISUSE);
    }
    let script = match unsafe { CStr::from_ptr(script) }.to_str() {
        Ok(s) => s,
        Err(_) => return error_result("script is not valid UTF-8", SQLITE_MISUSE),
    };

    let outcome = {
        let reg = CONNECTIONS.lock().unwrap();
        match reg.entries.get(&conn) {
            Some(entry) => entry.conn.execute(script, &bound),
            None => return error_result("unknown connection handle", SQLITE_MISUSE),
        }
    };

    let entry = match outcome {
        Ok(rows) => ResultEntry::Ok(rows),
        Err(err) => ResultEntry::Err {
            message: CString::new(err.message()).unwrap_or_default(),
            code: err.code(),
        },
    };
    RESULTS.lock().unwrap().insert(entry)
}

/// 1 when the result carries rows, 0 for error results and unknown handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_ok(res: i64) -> i64 {
    let reg = RESULTS.lock().unwrap();
    match reg.entries.get(&res) {
        Some(ResultEntry::Ok(_)) => 1,
        _ => 0,
    }
}

/// Diagnostic of an error result. The pointer references result-owned bytes
/// valid until the result is freed; null for ok results and unknown handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_error(res: i64, out_len: *mut usize) -> *const c_char {
    let reg = RESULTS.lock().unwrap();
    match reg.entries.get(&res) {
        Some(ResultEntry::Err { message, .. }) => {
            if !out_len.is_null() {
                unsafe { *out_len = message.as_bytes().len() };
            }
            message.as_ptr()
        }
        _ => {
            if !out_len.is_null() {
                unsafe { *out_len = 0 };
            }
            std::ptr::null()
        }
    }
}

/// Engine code of an error result; 0 for ok results and unknown handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_error_code(res: i64) -> i64 {
    let reg = RESULTS.lock().unwrap();
    match reg.entries.get(&res) {
        Some(ResultEntry::Err { code, .. }) => *code,
        _ => 0,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_row_count(res: i64) -> i64 {
    let reg = RESULTS.lock().unwrap();
    match reg.entries.get(&res) {
        Some(ResultEntry::Ok(rows)) => rows.len() as i64,
        _ => 0,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_column_count(res: i64, row: i64) -> i64 {
    if row < 0 {
        return 0;
    }
    let reg = RESULTS.lock().unwrap();
    match reg.entries.get(&res) {
        Some(ResultEntry::Ok(rows)) => match rows.get(row as usize) {
            Some(row) => row.len() as i64,
            None => 0,
        },
        _ => 0,
    }
}

/// Engine type code of one cell (INTEGER=1, FLOAT=2, TEXT=3, BLOB=4,
/// NULL=5); 0 for out-of-range indexes and unknown handles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_tag(res: i64, row: i64, col: i64) -> i64 {
    with_cell(res, row, col, 0, |value| value.tag().code())
}

/// Integer payload of one cell; 0 for wrong-tag or out-of-range reads.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_int(res: i64, row: i64, col: i64) -> i64 {
    with_cell(res, row, col, 0, |value| value.as_integer().unwrap_or(0))
}

/// Float payload of one cell; 0.0 for wrong-tag or out-of-range reads.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_float(res: i64, row: i64, col: i64) -> f64 {
    with_cell(res, row, col, 0.0, |value| value.as_float().unwrap_or(0.0))
}

/// Byte payload of a text or blob cell. The pointer references result-owned
/// bytes valid until the result is freed; null when the cell is neither text
/// nor blob or the indexes are out of range.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_text(
    res: i64,
    row: i64,
    col: i64,
    out_len: *mut usize,
) -> *const u8 {
    let (ptr, len) = with_cell(res, row, col, (std::ptr::null(), 0), |value| {
        match (value.as_text(), value.as_blob()) {
            (Some(text), _) => (text.as_ptr(), text.len()),
            (_, Some(blob)) => (blob.as_ptr(), blob.len()),
            _ => (std::ptr::null(), 0),
        }
    });
    if !out_len.is_null() {
        unsafe { *out_len = len };
    }
    ptr
}

/// Release one execution result. Unknown handles are ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn liteglue_result_free(res: i64) {
    RESULTS.lock().unwrap().entries.remove(&res);
}
