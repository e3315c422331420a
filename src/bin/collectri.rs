//! collectri CLI - builds gene regulatory graph records from the CollecTRI table
//!
//! Loads the CollecTRI CSV, runs the adapter and writes NDJSON node/edge files
//! plus a run summary for an external bulk import.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use collectri::config::{parse_delimiter, RunOverrides};
use collectri::{
    CollectriAdapter, ColumnKind, Extractor, GraphWriter, RunConfig, SchemaDeclaration, Table,
};

#[derive(Parser)]
#[command(name = "collectri")]
#[command(version, about = "Build gene regulatory graph records from the CollecTRI table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform the table and write nodes, edges and a run summary
    Build {
        /// Path to the CollecTRI CSV (overrides COLLECTRI_INPUT and the config file)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (overrides COLLECTRI_OUTPUT and the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a collectri.yaml run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Identifier namespace, e.g. hgnc.symbol; empty disables prefixing
        #[arg(long)]
        id_prefix: Option<String>,

        /// Field delimiter (single character, or \t)
        #[arg(short, long)]
        delimiter: Option<String>,
    },

    /// Show columns, row count and the first rows of a table
    Inspect {
        /// Path to the CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Number of rows to print
        #[arg(short = 'n', long, default_value = "5")]
        rows: usize,

        /// Field delimiter (single character, or \t)
        #[arg(short, long, default_value = ",")]
        delimiter: String,
    },

    /// Print or write the schema_config.yaml declaration
    Schema {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build { input, output, config, id_prefix, delimiter } => {
            build(input, output, config, id_prefix, delimiter)
        }
        Commands::Inspect { input, rows, delimiter } => inspect(input, rows, delimiter),
        Commands::Schema { output } => schema(output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn build(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    id_prefix: Option<String>,
    delimiter: Option<String>,
) -> Result<(), String> {
    let overrides = RunOverrides {
        input,
        output,
        id_prefix,
        delimiter,
    };
    let run = RunConfig::resolve(config.as_deref(), overrides).map_err(|e| e.to_string())?;
    let input = run.require_input().map_err(|e| e.to_string())?;
    let delimiter = run.delimiter_byte().map_err(|e| e.to_string())?;

    println!("🔧 Building graph from {}...", input.display());

    let adapter = CollectriAdapter::from_path(input, delimiter, run.adapter_config())
        .map_err(|e| format!("Failed to load {}: {}", input.display(), e))?;
    println!("  ✓ Loaded {} rows", adapter.table().len());

    let writer = GraphWriter::new(&run.output)
        .map_err(|e| format!("Failed to create output directory: {}", e))?;

    let node_files = writer
        .write_nodes(&adapter)
        .map_err(|e| format!("Failed to write nodes: {}", e))?;
    let edge_files = writer
        .write_edges(&adapter)
        .map_err(|e| format!("Failed to write edges: {}", e))?;
    for (path, count) in node_files.iter().chain(edge_files.iter()) {
        println!("  ✓ Wrote {} records to {}", count, path.display());
    }

    let summary = adapter.summary();
    let summary_path = writer
        .write_summary(&summary)
        .map_err(|e| format!("Failed to write summary: {}", e))?;

    tracing::info!(
        rows = summary.rows_read,
        transcription_factors = summary.transcription_factors,
        genes = summary.genes,
        edges = summary.edges,
        skipped = summary.skipped_rows(),
        "run finished"
    );
    if summary.skipped_rows() > 0 {
        println!(
            "  ⚠ Skipped {} rows ({} without identifiers, {} with invalid values)",
            summary.skipped_rows(),
            summary.rows_missing_identifier,
            summary.row_errors
        );
    }
    println!("  ✓ Summary written to {}", summary_path.display());
    println!("  ℹ Import files are in {}", writer.output_dir().display());
    println!("✨ Graph build complete!");
    Ok(())
}

fn inspect(input: PathBuf, rows: usize, delimiter: String) -> Result<(), String> {
    let delimiter = parse_delimiter(&delimiter).map_err(|e| e.to_string())?;
    let table = Table::load(&input, delimiter)
        .map_err(|e| format!("Failed to load {}: {}", input.display(), e))?;

    println!("{} ({} rows)", input.display(), table.len());
    println!("Columns:");
    for column in table.columns() {
        let kind = match table.column_kind(column) {
            Some(ColumnKind::Numeric) => "numeric",
            _ => "text",
        };
        println!("  - {} ({})", column, kind);
    }

    let columns: Vec<&str> = table.columns().collect();
    println!("{}", columns.join("\t"));
    for row in table.rows().take(rows) {
        let cells: Vec<&str> = columns
            .iter()
            .map(|column| row.extract(column).unwrap_or(""))
            .collect();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}

fn schema(output: Option<PathBuf>) -> Result<(), String> {
    let declaration = SchemaDeclaration::from_registry();
    match output {
        Some(path) => {
            declaration
                .write_to_file(&path)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!("  ✓ Schema written to {}", path.display());
        }
        None => {
            let yaml = declaration.to_yaml().map_err(|e| e.to_string())?;
            print!("{}", yaml);
        }
    }
    Ok(())
}
