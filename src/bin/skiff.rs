use std::{
    io::{Write, stdout},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing::Level;

use skiff_db::{
    Database, DatabaseConfig, JsonFileBackend, MemoryBackend, Row, StorageBackend,
    split_statements,
};

#[derive(Parser)]
#[command(name = "skiff", version, about = "Interactive shell for skiff-db")]
struct Cli {
    /// JSON file holding the database. Omit to keep everything in memory.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Give up on a statement after waiting this long for its table.
    #[arg(long)]
    lock_timeout_ms: Option<u64>,

    /// Most verbose tracing level written to stderr.
    #[arg(long, default_value = "warn")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let mut config = DatabaseConfig::default();
    if let Some(ms) = cli.lock_timeout_ms {
        config = config.with_lock_timeout(Duration::from_millis(ms));
    }

    let backend: Arc<dyn StorageBackend> = match &cli.data {
        Some(path) => Arc::new(JsonFileBackend::new(path)),
        None => Arc::new(MemoryBackend::new()),
    };
    let db = Database::with_backend(backend, config).await?;

    match &cli.data {
        Some(path) => println!("Connected to {}", path.display()),
        None => println!("Connected to a transient in-memory database"),
    }
    println!("Statements end with ';'. Type .tables, .schema <table> or exit.");

    let mut lines = BufReader::new(stdin()).lines();
    let mut buf = String::new();

    loop {
        prompt(buf.is_empty())?;

        let Some(line) = lines.next_line().await.into_diagnostic()? else {
            break;
        };

        let input = line.trim();
        if buf.is_empty() {
            if input.is_empty() {
                continue;
            }

            if input == "exit" {
                break;
            }

            if input.starts_with('.') {
                if let Err(err) = meta_command(&db, input).await {
                    println!("{err:?}");
                }
                continue;
            }
        }

        buf.push_str(&line);
        buf.push('\n');

        if !input.ends_with(';') {
            continue;
        }

        for statement in split_statements(&buf) {
            match db.run(&statement, &[]).await {
                Ok(rows) => print_rows(&rows)?,
                Err(err) => {
                    println!("{:?}", miette::Report::new(err).with_source_code(statement));
                    break;
                }
            }
        }

        buf.clear();
    }

    println!("Exiting skiff");

    Ok(())
}

fn prompt(fresh: bool) -> Result<()> {
    let mut stdout = stdout().lock();
    stdout
        .write_all(if fresh { b"skiff> " } else { b"   ... " })
        .into_diagnostic()?;
    stdout.flush().into_diagnostic()
}

async fn meta_command(db: &Database, input: &str) -> Result<()> {
    let mut parts = input.split_whitespace();

    match (parts.next(), parts.next()) {
        (Some(".tables"), None) => {
            for name in db.table_names().await? {
                println!("{name}");
            }
        }
        (Some(".schema"), Some(table)) => {
            for column in db.schema(table).await?.columns {
                println!("{: <16} {}", column.name, column.data_type);
            }
        }
        _ => println!("Unknown command: {input}"),
    }

    Ok(())
}

fn print_rows(rows: &[Row]) -> Result<()> {
    let mut stdout = stdout().lock();

    let Some(first) = rows.first() else {
        writeln!(stdout, "OK").into_diagnostic()?;
        return Ok(());
    };

    write!(stdout, "{: <8}", "#").into_diagnostic()?;
    for (name, _) in first.iter() {
        write!(stdout, " | {name: <8}").into_diagnostic()?;
    }
    writeln!(stdout).into_diagnostic()?;

    for (idx, row) in rows.iter().enumerate() {
        write!(stdout, "{idx: <8}").into_diagnostic()?;
        for (_, value) in row.iter() {
            write!(stdout, " | {: <8}", value.to_string()).into_diagnostic()?;
        }
        writeln!(stdout).into_diagnostic()?;
    }

    writeln!(stdout, "({} rows)", rows.len()).into_diagnostic()?;
    stdout.flush().into_diagnostic()
}
