//! Credit Reconcile - CLI tool for reconciling a bank credit feed against an accounting ledger.

use clap::Parser;
use credit_recon::{
    csv_format::{BankTable, CsvReport, LedgerTable},
    options::OptionsFile,
    reconcile_records,
    spreadsheet_xml::XmlWorkbook,
    Format, ReconcileOptions, Report, Result, Sheet,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "credit_reconcile")]
#[command(about = "Reconcile a bank credit CSV against an accounting ledger CSV", long_about = None)]
struct Cli {
    /// Bank credit feed (Post Date, Check, Description, Debit, Credit)
    #[arg(long)]
    bank: PathBuf,

    /// Accounting ledger export (Type, Date, Num, Name, Memo, Clr, Split, Amount)
    #[arg(long)]
    ledger: PathBuf,

    /// Report file to write
    #[arg(short, long)]
    output: PathBuf,

    /// Report format (csv, xml); guessed from the output extension if omitted
    #[arg(long)]
    format: Option<String>,

    /// TOML file with reconciliation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Regex for file-reference splits, kept in preference when removing extras
    #[arg(long = "file-ref-pattern")]
    file_ref_pattern: Option<String>,

    /// Width cap for the Split and Description columns
    #[arg(long = "max-text-width")]
    max_text_width: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("credit_recon=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let options = resolve_options(&cli)?;
    let format = match cli.format {
        Some(ref name) => name.parse::<Format>()?,
        None => Format::from_path(&cli.output),
    };

    let bank = BankTable::from_read(&mut File::open(&cli.bank)?)?;
    let ledger = LedgerTable::from_read(&mut File::open(&cli.ledger)?)?;

    let report = reconcile_records(&bank.records, &ledger.records, &options);
    let sheet = Sheet::layout(&report, options.max_text_width);

    let mut output = BufWriter::new(File::create(&cli.output)?);
    match format {
        Format::Csv => CsvReport { sheet: &sheet }.write_to(&mut output)?,
        Format::Xml => XmlWorkbook { sheet: &sheet }.write_to(&mut output)?,
    }
    output.flush()?;

    println!("{}", summary(&report));
    println!("Saved to {}", cli.output.display());

    Ok(())
}

/// Defaults, then the config file, then command-line flags.
fn resolve_options(cli: &Cli) -> Result<ReconcileOptions> {
    let mut options = ReconcileOptions::new()?;
    if let Some(ref path) = cli.config {
        options = options.merge(&OptionsFile::load(path)?)?;
    }
    if let Some(ref pattern) = cli.file_ref_pattern {
        options = options.with_file_reference_pattern(pattern)?;
    }
    if let Some(width) = cli.max_text_width {
        options = options.with_max_text_width(width);
    }
    Ok(options)
}

fn summary(report: &Report) -> String {
    let mut line = format!(
        "Reconciliation complete: {} extras removed ({:.2}), {} entries added, bank total {:.2}, ledger total {:.2}",
        report.extras.len(),
        report.totals.extras_amount,
        report.added_count(),
        report.totals.bank_credit,
        report.totals.ledger_amount,
    );
    let padded = report.padded_count();
    if padded > 0 {
        line.push_str(&format!(" ({} added by reusing bank rows, review them)", padded));
    }
    line
}
