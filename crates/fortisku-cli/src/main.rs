//! FortiSKU CLI - inspect workbooks, ingest catalogs, build BOMs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fortisku::bom::{bom_filename, export_bom, BomExportOptions, BomItem};
use fortisku::ingest::{ingest_workbook, Catalog};
use fortisku::prelude::*;
use fortisku::{ReadOptions, SheetErrorPolicy, ZipArchive, DEFAULT_MAX_CELLS};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fortisku")]
#[command(
    author,
    version,
    about = "Price catalog ingestion and BOM workbook tool"
)]
struct Cli {
    /// More output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Decoder switches shared by the workbook-reading commands
#[derive(clap::Args, Clone, Copy)]
struct DecodeArgs {
    /// Leave out sheets that fail to decode instead of failing
    #[arg(long)]
    skip_bad_sheets: bool,

    /// Do not check entry CRC-32 values
    #[arg(long)]
    no_verify_crc: bool,

    /// Largest sheet extent (rows x columns) to decode
    #[arg(long, default_value_t = DEFAULT_MAX_CELLS)]
    max_cells: usize,
}

impl DecodeArgs {
    fn options(self) -> ReadOptions {
        ReadOptions {
            verify_crc: !self.no_verify_crc,
            sheet_errors: if self.skip_bad_sheets {
                SheetErrorPolicy::Skip
            } else {
                SheetErrorPolicy::Abort
            },
            max_cells: self.max_cells,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a workbook
    Info {
        /// Input workbook (xlsx)
        input: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input workbook (xlsx)
        input: PathBuf,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// List the entries of a ZIP archive without extracting them
    Entries {
        /// Input archive (xlsx or any zip)
        input: PathBuf,
    },

    /// Convert a sheet to CSV and output to stdout or file
    #[command(alias = "csv")]
    ToCsv {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sheet index to convert (0-based, default: 0)
        #[arg(short, long, default_value = "0")]
        sheet: usize,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Normalise a price catalog into sku/description/price rows
    Ingest {
        /// Input catalog workbook (xlsx)
        input: PathBuf,

        /// Sheet to read (default: "DataSet", else the first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Emit JSON instead of CSV
        #[arg(long)]
        json: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Build a BOM workbook from line items (CSV with headers, or JSON)
    Bom {
        /// Items file: columns sku, description, description2, comments,
        /// price, quantity, discount_percent
        items: PathBuf,

        /// Output workbook (default: fortisku-bom-<timestamp>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sheet name
        #[arg(long, default_value = "BOM")]
        sheet_name: String,

        /// Omit the number-format style sheet
        #[arg(long)]
        no_styles: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input, decode } => show_info(&input, decode),
        Commands::Sheets { input, decode } => list_sheets(&input, decode),
        Commands::Entries { input } => list_entries(&input),
        Commands::ToCsv {
            input,
            output,
            sheet,
            delimiter,
            decode,
        } => to_csv(&input, output.as_deref(), sheet, delimiter, decode),
        Commands::Ingest {
            input,
            sheet,
            json,
            output,
            decode,
        } => ingest(&input, sheet.as_deref(), json, output.as_deref(), decode),
        Commands::Bom {
            items,
            output,
            sheet_name,
            no_styles,
        } => build_bom(&items, output, sheet_name, no_styles),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

fn open_workbook(input: &Path, decode: DecodeArgs) -> Result<Workbook> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read '{}'", input.display()))?;
    let workbook = fortisku::decode_xlsx_with_options(&bytes, &decode.options())
        .with_context(|| format!("Failed to decode '{}'", input.display()))?;
    for failure in workbook.failed_sheets() {
        eprintln!("Warning: skipped sheet \"{}\": {}", failure.name, failure.message);
    }
    Ok(workbook)
}

fn show_info(input: &Path, decode: DecodeArgs) -> Result<()> {
    let workbook = open_workbook(input, decode)?;

    println!("File: {}", input.display());
    println!("Sheets: {}", workbook.sheet_count());

    for (i, sheet) in workbook.worksheets().iter().enumerate() {
        let formula_count = sheet.formula_cells().count();

        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name());
        if sheet.is_empty() {
            println!("    Used range: empty");
        } else {
            println!(
                "    Used range: {} ({} rows x {} columns)",
                sheet.dimension_ref(),
                sheet.row_count(),
                sheet.col_count()
            );
        }
        println!("    Formulas: {}", formula_count);
    }

    if !workbook.failed_sheets().is_empty() {
        println!();
        println!("Failed sheets: {}", workbook.failed_sheets().len());
    }

    Ok(())
}

fn list_sheets(input: &Path, decode: DecodeArgs) -> Result<()> {
    let workbook = open_workbook(input, decode)?;

    for (i, name) in workbook.sheet_names().enumerate() {
        println!("{}\t{}", i, name);
    }

    Ok(())
}

fn list_entries(input: &Path) -> Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read '{}'", input.display()))?;
    let archive = ZipArchive::new(&bytes)
        .with_context(|| format!("Failed to read the ZIP directory of '{}'", input.display()))?;

    println!("{:>10}  {:>10}  {:<8}  {:<8}  name", "size", "packed", "method", "crc32");
    for entry in archive.entries() {
        println!(
            "{:>10}  {:>10}  {:<8}  {:08x}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            format!("{:?}", entry.method),
            entry.crc32,
            entry.name
        );
    }
    eprintln!("{} entries", archive.len());

    Ok(())
}

fn to_csv(
    input: &Path,
    output: Option<&Path>,
    sheet_idx: usize,
    delimiter: char,
    decode: DecodeArgs,
) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }
    let workbook = open_workbook(input, decode)?;
    let sheet = workbook
        .worksheet(sheet_idx)
        .with_context(|| format!("Sheet index {} not found", sheet_idx))?;

    if sheet.is_empty() {
        eprintln!("Warning: Sheet appears to be empty");
        return Ok(());
    }

    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(sink);

    for row in sheet.rows() {
        writer
            .write_record(row.iter().map(cell_value_to_csv_string))
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;

    if let Some(path) = output {
        eprintln!("Wrote {} rows to '{}'", sheet.row_count(), path.display());
    }
    Ok(())
}

/// Cached value for formulas; formulas never evaluated export as empty
fn cell_value_to_csv_string(value: &CellValue) -> String {
    match value.effective_value() {
        CellValue::Formula { .. } => String::new(),
        other => other.to_string(),
    }
}

fn ingest(
    input: &Path,
    sheet: Option<&str>,
    json: bool,
    output: Option<&Path>,
    decode: DecodeArgs,
) -> Result<()> {
    let workbook = open_workbook(input, decode)?;
    let catalog = ingest_workbook(&workbook, sheet)
        .with_context(|| format!("Failed to ingest '{}'", input.display()))?;

    eprintln!(
        "Sheet \"{}\": {} rows (header at row {}, {} skipped)",
        catalog.sheet_name,
        catalog.rows.len(),
        catalog.stats.header_row,
        catalog.stats.skipped_rows
    );
    if let Some(label) = &catalog.cover_info {
        eprintln!("Price list: {}", label);
    }

    let text = if json {
        serde_json::to_string_pretty(&catalog).context("Failed to serialize catalog")?
    } else {
        catalog_csv(&catalog)?
    };

    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// `sku,description_1,description_2,price,category` with CRLF line ends
fn catalog_csv(catalog: &Catalog) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(["sku", "description_1", "description_2", "price", "category"])?;
    for row in &catalog.rows {
        let price = match row.price {
            Some(price) => format!("{:.2}", price),
            None => row.price_display.clone(),
        };
        writer.write_record([
            row.sku.as_str(),
            row.description.as_str(),
            row.description2.as_str(),
            price.as_str(),
            row.category.as_str(),
        ])?;
    }
    let bytes = writer.into_inner().context("Failed to finish CSV output")?;
    let text = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    Ok(text.trim_end_matches("\r\n").to_string())
}

fn read_items(path: &Path) -> Result<Vec<BomItem>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse items in '{}'", path.display()));
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let mut items = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        let item: BomItem =
            record.with_context(|| format!("Bad item on line {} of '{}'", i + 2, path.display()))?;
        items.push(item);
    }
    Ok(items)
}

fn build_bom(
    items_path: &Path,
    output: Option<PathBuf>,
    sheet_name: String,
    no_styles: bool,
) -> Result<()> {
    let items = read_items(items_path)?;
    let options = BomExportOptions {
        sheet_name,
        include_styles: !no_styles,
    };
    let bytes = export_bom(&items, &options).context("Failed to encode BOM workbook")?;

    let output = output.unwrap_or_else(|| PathBuf::from(bom_filename(chrono::Utc::now())));
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    eprintln!(
        "Wrote {} items ({} bytes) to '{}'",
        items.len(),
        bytes.len(),
        output.display()
    );
    Ok(())
}
