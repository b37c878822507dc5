///
/// lightsql shell - run SQL scripts against an embedded database
///
/// Usage:
/// - lightsql-shell app.db -c "SELECT * FROM t"
/// - lightsql-shell app.db -f schema.sql -c "SELECT count(*) FROM t"
/// - lightsql-shell :memory: < script.sql
///
/// Scripts given with `-c` run first, in order, then the `-f` file. With
/// neither, the script is read from stdin.
///

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use lightsql::{ColumnValue, Command, Cursor, Locator, Session, SessionOptions};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "lightsql-shell")]
#[command(author, version, about = "Run SQL scripts through lightsql", long_about = None)]
struct Cli {
    /// Database file, `:memory:` or `shared:<name>`
    database: String,

    /// SQL text to run; may be given more than once
    #[arg(short = 'c', long = "command")]
    commands: Vec<String>,

    /// File holding a SQL script
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// TOML file with a [session] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log statement execution to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn locator(database: &str) -> Locator {
    match database {
        ":memory:" => Locator::Memory,
        _ => match database.strip_prefix("shared:") {
            Some(name) => Locator::SharedMemory(name.to_string()),
            None => Locator::File(PathBuf::from(database)),
        },
    }
}

fn scripts(cli: &Cli) -> Result<Vec<String>, String> {
    let mut scripts = cli.commands.clone();
    if let Some(path) = &cli.file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {}", path.display(), e))?;
        scripts.push(text);
    }
    if scripts.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("reading stdin: {}", e))?;
        scripts.push(text);
    }
    Ok(scripts)
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = match &cli.config {
        Some(path) => SessionOptions::from_path(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => SessionOptions::default(),
    };
    let session = Session::open(locator(&cli.database), options).map_err(|e| e.to_string())?;
    debug!(database = %session.locator(), "session ready");

    let mut command = session.create_command().map_err(|e| e.to_string())?;
    for script in scripts(cli)? {
        run_script(&mut command, &script).map_err(|e| e.to_string())?;
    }
    for warning in session.warnings() {
        eprintln!("warning: {}", warning);
    }
    session.close().map_err(|e| e.to_string())
}

/// Walks every result of `script`, printing cursors and update counts.
fn run_script(command: &mut Command<'_>, script: &str) -> lightsql::Result<()> {
    let mut is_cursor = command.execute_sql(script)?;
    loop {
        if is_cursor {
            if let Some(cursor) = command.cursor()? {
                print_cursor(cursor)?;
            }
        } else {
            let count = command.update_count();
            if count < 0 {
                return Ok(());
            }
            println!("updated {}", count);
        }
        is_cursor = command.next_result()?;
    }
}

fn print_cursor(mut cursor: Cursor<'_>) -> lightsql::Result<()> {
    let header: Vec<&str> = cursor.columns().iter().map(|c| c.label.as_str()).collect();
    println!("{}", header.join("\t"));
    let width = cursor.column_count();
    while cursor.advance()? {
        let mut fields = Vec::with_capacity(width);
        for i in 1..=width {
            fields.push(render(&cursor.get_value(i)?));
        }
        println!("{}", fields.join("\t"));
    }
    Ok(())
}

fn render(value: &ColumnValue) -> String {
    match value {
        ColumnValue::Null => "NULL".to_string(),
        ColumnValue::Integer(i) => i.to_string(),
        ColumnValue::Real(f) => f.to_string(),
        ColumnValue::Text(s) => s.clone(),
        ColumnValue::Blob(b) => {
            let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
            format!("X'{}'", hex)
        }
    }
}
