//! Sigload CLI - import WiGLE SQLite exports into PostGIS
//!
//! # Main Commands
//!
//! ```bash
//! sigload import export.sqlite              # Import into the configured database
//! sigload import export.sqlite --pg <dsn>   # Import with an explicit DSN
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! sigload inspect export.sqlite             # Show source columns and row count
//! sigload import export.sqlite --dry-run    # Normalize only, write nothing
//! ```

use clap::{Parser, Subcommand};
use sigload::{run_import, ImportOptions, SqliteSource, TIMESTAMP_COLUMNS};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sigload")]
#[command(about = "Import WiGLE SQLite exports into a PostGIS device catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a WiGLE export into the destination database
    Import {
        /// Path to the WiGLE .sqlite file
        input: PathBuf,

        /// PostgreSQL DSN (overrides the POSTGRES_* environment settings)
        #[arg(long)]
        pg: Option<String>,

        /// Normalize every row but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Stop after this many source rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a source file's columns and row count without writing
    Inspect {
        /// Path to the WiGLE .sqlite file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            input,
            pg,
            dry_run,
            limit,
        } => cmd_import(&input, pg, dry_run, limit).await,

        Commands::Inspect { input } => cmd_inspect(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_import(
    input: &Path,
    pg: Option<String>,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = ImportOptions {
        dsn: pg,
        dry_run,
        limit,
    };

    let summary = run_import(input, options).await?;

    eprintln!("\n📊 Results:");
    eprintln!("   Rows read: {}", summary.rows_read);
    eprintln!("   ✅ Imported: {}", summary.imported);
    eprintln!("   Devices created: {}", summary.devices_created);
    if summary.skipped() > 0 {
        eprintln!("   ⚠️  Skipped: {}", summary.skipped());
        eprintln!("      - no timestamp: {}", summary.skipped_no_timestamp);
        eprintln!("      - no coordinates: {}", summary.skipped_no_coordinates);
        eprintln!(
            "      - unresolved device: {}",
            summary.skipped_unresolved_device
        );
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", input.display());

    let source = SqliteSource::open(input)?;
    let columns = source.columns()?;

    eprintln!("   Columns: {}", columns.join(", "));
    eprintln!("   Rows: {}", source.row_count()?);

    match TIMESTAMP_COLUMNS
        .iter()
        .find(|c| columns.iter().any(|col| col == *c))
    {
        Some(col) => eprintln!("   Timestamp column: {}", col),
        None => eprintln!("   ⚠️  No recognized timestamp column - every row would be skipped"),
    }

    Ok(())
}
