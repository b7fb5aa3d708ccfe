use anyhow::Result;
use clap::Parser;
use prism_core::translate::DEFAULT_MODEL;
use prism_core::viz::render::{RenderSurface, VegaLiteRenderer};
use prism_core::{ExportFormat, QueryResult, Session, SessionConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "natural language SQL with automatic charts", long_about = None)]
struct Cli {
    /// Database file (defaults to in-memory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Data file to load on startup (csv, json, or sql)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Table name for the loaded file (defaults to the file stem)
    #[arg(long)]
    name: Option<String>,

    /// One-shot question; skips the interactive shell
    #[arg(short, long)]
    question: Option<String>,

    /// Select a chart for each successful result
    #[arg(short, long, default_value = "false")]
    visualize: bool,

    /// Write the last selected chart as a Vega-Lite document
    #[arg(long)]
    chart_out: Option<PathBuf>,

    /// API key for the language model service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "PRISM_MODEL")]
    model: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Cli::parse();

    println!("PRISM v0.2.0 - Natural Language SQL with Automatic Charts");

    let mut session = Session::new(SessionConfig {
        db_path: args.db.clone(),
        api_key: args.api_key.clone(),
        model: args.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        ..SessionConfig::default()
    })?;

    if !session.has_translator() {
        println!("Warning: no API key configured - direct SQL only");
    }

    if let Some(input) = &args.input {
        let summary = session.upload(input, args.name.as_deref())?;
        match summary.table {
            Some(table) => println!(
                "Loaded {} ({} rows x {} columns)",
                table, summary.rows, summary.columns
            ),
            None => println!("Executed script {}", input.display()),
        }
    }

    if let Some(question) = &args.question {
        let result = session.ask(question, args.visualize, None);
        print_result(&result);
        write_chart(&result, args.chart_out.as_deref())?;
        session.close();
        return Ok(());
    }

    println!("Ready. Commands:");
    println!("  - SQL: type any SQL query");
    println!("  - ASK: type 'ASK <question>' for natural language queries");
    println!("  - .tables / .schema [table] / .peek [table]");
    println!("  - .upload <path> [name]");
    println!("  - .export <path> <csv|tsv|json>  (exports the last result)");
    println!("  - EXIT: type 'exit' or 'quit' to exit\n");

    let mut last_result: Option<QueryResult> = None;

    loop {
        print!("prism> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        if let Some(question) = strip_ask_prefix(input) {
            let result = session.ask(question, args.visualize, None);
            print_result(&result);
            if let Err(e) = write_chart(&result, args.chart_out.as_deref()) {
                eprintln!("Chart error: {e}");
            }
            last_result = Some(result);
            continue;
        }

        if let Some(rest) = input.strip_prefix('.') {
            match run_command(&mut session, rest, last_result.as_ref()) {
                Ok(()) => {}
                Err(e) => eprintln!("Error: {e}"),
            }
            continue;
        }

        let result = session.sql(input, args.visualize);
        print_result(&result);
        last_result = Some(result);
    }

    session.close();
    Ok(())
}

fn strip_ask_prefix(input: &str) -> Option<&str> {
    match input.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("ask ") => Some(input[4..].trim()),
        _ => None,
    }
}

fn run_command(
    session: &mut Session,
    command: &str,
    last_result: Option<&QueryResult>,
) -> Result<()> {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("tables") => {
            for table in session.tables() {
                println!("{table}");
            }
        }
        Some("schema") => {
            let tables = match parts.next() {
                Some(t) => vec![t.to_string()],
                None => session.tables(),
            };
            for table in tables {
                let schema = session.schema(&table)?;
                println!("{table}");
                for column in &schema.columns {
                    println!("  {:<24} {}", column.name, column.data_type);
                }
            }
        }
        Some("peek") => {
            let result = session.peek(parts.next(), 5);
            print_result(&result);
        }
        Some("upload") => {
            let path = parts
                .next()
                .ok_or_else(|| anyhow::anyhow!("usage: .upload <path> [name]"))?;
            let summary = session.upload(path, parts.next())?;
            match summary.table {
                Some(table) => println!(
                    "Loaded {} ({} rows x {} columns)",
                    table, summary.rows, summary.columns
                ),
                None => println!("Executed script {path}"),
            }
        }
        Some("export") => {
            let path = parts
                .next()
                .ok_or_else(|| anyhow::anyhow!("usage: .export <path> <csv|tsv|json>"))?;
            let format: ExportFormat = parts
                .next()
                .ok_or_else(|| anyhow::anyhow!("usage: .export <path> <csv|tsv|json>"))?
                .parse()?;
            let result =
                last_result.ok_or_else(|| anyhow::anyhow!("nothing to export yet"))?;
            session.export(result, path.as_ref(), format)?;
            println!("Exported to {path}");
        }
        Some(other) => eprintln!("Unknown command: .{other}"),
        None => {}
    }
    Ok(())
}

fn print_result(result: &QueryResult) {
    if !result.success {
        eprintln!(
            "Error: {}",
            result.error.as_deref().unwrap_or("unknown failure")
        );
        return;
    }

    let names: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
    println!("{}", names.join(" | "));
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", cells.join(" | "));
    }
    println!("({} rows)", result.rows.len());

    if let Some(chart) = &result.chart {
        let axes = match (&chart.x, &chart.y) {
            (Some(x), Some(y)) => format!(" (x={x}, y={y})"),
            (Some(x), None) => format!(" (x={x})"),
            (None, Some(y)) => format!(" (y={y})"),
            (None, None) => String::new(),
        };
        println!("Chart: {}{axes}", chart.kind);
    }
}

fn write_chart(result: &QueryResult, path: Option<&std::path::Path>) -> Result<()> {
    let (Some(chart), Some(path)) = (&result.chart, path) else {
        return Ok(());
    };
    let document = VegaLiteRenderer::new().render(chart, &result.columns, &result.rows)?;
    std::fs::write(path, document)?;
    println!("Wrote chart to {}", path.display());
    Ok(())
}
