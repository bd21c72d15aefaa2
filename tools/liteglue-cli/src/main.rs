///
/// liteglue CLI - run SQL scripts against a SQLite database
///
/// Provides commands for exercising the bridge end to end:
/// - liteglue run [--db PATH] [--param SPEC ...] <SCRIPT>: execute a script
///   (inline SQL, or a path to a .sql file) and print the final statement's
///   rows, one per line, as tagged values
/// - liteglue tags: print the engine type-code table
///

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use liteglue::{Connection, Value, ValueTag};

#[derive(Parser)]
#[command(name = "liteglue")]
#[command(author, version, about = "SQLite script runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a SQL script and print the final statement's rows
    Run {
        /// Inline SQL, or a path to a .sql file
        script: String,

        /// Database file (defaults to an in-memory database)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Positional parameter for the final statement:
        /// null, int:N, float:X, text:S, or blob:HEX
        #[arg(long = "param")]
        params: Vec<String>,
    },

    /// Print the engine type-code table
    Tags,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { script, db, params } => {
            run_script(&script, db.as_deref(), &params);
        }
        Commands::Tags => {
            print_tags();
        }
    }
}

fn run_script(script: &str, db: Option<&Path>, params: &[String]) {
    let sql = load_script(script);

    let mut values = Vec::with_capacity(params.len());
    for spec in params {
        match parse_param(spec) {
            Ok(value) => values.push(value),
            Err(reason) => {
                eprintln!("Error: {}", reason);
                std::process::exit(1);
            }
        }
    }

    let (conn, status) = match db {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    };
    let Some(conn) = conn else {
        eprintln!("Error opening database (engine code {})", status);
        std::process::exit(1);
    };

    match conn.execute(&sql, &values) {
        Ok(rows) => {
            for row in &rows {
                let cells: Vec<String> = row.iter().map(render_value).collect();
                println!("{}", cells.join("  "));
            }
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
    conn.close();
}

fn load_script(arg: &str) -> String {
    let path = Path::new(arg);
    if path.extension().is_some_and(|ext| ext == "sql") {
        match std::fs::read_to_string(path) {
            Ok(sql) => sql,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    } else {
        arg.to_string()
    }
}

fn parse_param(spec: &str) -> Result<Value, String> {
    if spec == "null" {
        return Ok(Value::Null);
    }
    match spec.split_once(':') {
        Some(("int", v)) => v
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| format!("invalid int '{}': {}", v, e)),
        Some(("float", v)) => v
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| format!("invalid float '{}': {}", v, e)),
        Some(("text", v)) => Ok(Value::from(v)),
        Some(("blob", v)) => decode_hex(v).map(Value::Blob),
        _ => Err(format!(
            "unrecognized parameter '{}' (expected null, int:N, float:X, text:S, or blob:HEX)",
            spec
        )),
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    // Decode over raw bytes: indexing the str would panic on multi-byte
    // input, and from_str_radix tolerates a leading sign.
    let digits = s.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(format!("blob hex '{}' has odd length", s));
    }
    let mut bytes = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks_exact(2) {
        match (hex_digit(pair[0]), hex_digit(pair[1])) {
            (Some(hi), Some(lo)) => bytes.push(hi << 4 | lo),
            _ => {
                return Err(format!(
                    "blob hex '{}' has invalid digit pair '{}'",
                    s,
                    String::from_utf8_lossy(pair)
                ));
            }
        }
    }
    Ok(bytes)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Integer(v) => format!("int:{}", v),
        Value::Float(v) => format!("float:{}", v),
        Value::Text(v) => format!("text:{}", v),
        Value::Blob(v) => format!("blob:{}", encode_hex(v)),
    }
}

fn print_tags() {
    for tag in [
        ValueTag::Integer,
        ValueTag::Float,
        ValueTag::Text,
        ValueTag::Blob,
        ValueTag::Null,
    ] {
        println!("{}  {}", tag.code(), tag.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_specs() {
        assert_eq!(parse_param("null"), Ok(Value::Null));
        assert_eq!(parse_param("int:42"), Ok(Value::Integer(42)));
        assert_eq!(parse_param("int:-7"), Ok(Value::Integer(-7)));
        assert_eq!(parse_param("float:2.5"), Ok(Value::Float(2.5)));
        assert_eq!(parse_param("text:abc"), Ok(Value::Text("abc".to_string())));
        assert_eq!(
            parse_param("text:with:colons"),
            Ok(Value::Text("with:colons".to_string()))
        );
        assert_eq!(
            parse_param("blob:68656c6c6f"),
            Ok(Value::Blob(b"hello".to_vec()))
        );
    }

    #[test]
    fn test_parse_param_rejects_malformed_specs() {
        assert!(parse_param("int:abc").is_err());
        assert!(parse_param("blob:abc").is_err());
        assert!(parse_param("blob:zz").is_err());
        assert!(parse_param("blob:€a").is_err());
        assert!(parse_param("bogus").is_err());
        assert!(parse_param("bogus:1").is_err());
    }

    #[test]
    fn test_decode_hex_rejects_non_hex_bytes() {
        // Multi-byte UTF-8 of even byte length must take the Err path,
        // not panic on a char boundary.
        assert!(decode_hex("€a").is_err());
        assert!(decode_hex("日本").is_err());
        // Sign characters are not hex digits.
        assert!(decode_hex("+f").is_err());
        assert!(decode_hex("f+").is_err());
        assert!(decode_hex("-1").is_err());
        // Whitespace is not either.
        assert!(decode_hex(" f").is_err());
    }

    #[test]
    fn test_decode_hex_accepts_mixed_case() {
        assert_eq!(decode_hex("DEadBEef"), Ok(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(decode_hex(""), Ok(Vec::new()));
    }

    #[test]
    fn test_hex_round_trip() {
        let bytes = vec![0x00, 0xde, 0xad, 0xff];
        assert_eq!(decode_hex(&encode_hex(&bytes)), Ok(bytes));
    }

    #[test]
    fn test_render_value_is_tagged() {
        assert_eq!(render_value(&Value::Null), "null");
        assert_eq!(render_value(&Value::Integer(3)), "int:3");
        assert_eq!(render_value(&Value::from("x")), "text:x");
        assert_eq!(render_value(&Value::Blob(vec![0xab])), "blob:ab");
    }
}
