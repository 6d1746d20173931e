//! qrsheet - encode selected columns of every spreadsheet row as a QR code

mod config;
mod logger;

use anyhow::{Context, Result};
use qrsheet_core::storage::write_images;
use qrsheet_core::{ErrorCorrection, QrBatchProducer, QrCodeEncoder, QrSheetError, Sheet};
use qrsheet_engine::engine::CellRef;
use std::env;
use std::path::{Path, PathBuf};

fn print_usage() {
    eprintln!("Usage: qrsheet [OPTIONS] <INPUT>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <INPUT>                   Spreadsheet to read (.xlsx, .xlsm or .csv)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --column <NAME>       Column to encode (can be repeated, order kept)");
    eprintln!("  -o, --output <FILE>       Output .xlsx or .csv (default: <input>_with_qr.xlsx)");
    eprintln!("  -s, --sheet <NAME>        Sheet to read (xlsx only)");
    eprintln!("  --images-dir <DIR>        Also write qr_<row>.png files");
    eprintln!("  --ec <L|M|Q|H>            Error-correction level");
    eprintln!("  --size-mm <MM>            Printed QR size in millimetres");
    eprintln!("  --config <FILE>           Load settings from TOML file");
    eprintln!("  --list-columns            Print the header row and exit");
    eprintln!("  -v, --verbose             Increase log verbosity (can be repeated)");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default, PartialEq)]
struct Cli {
    input: PathBuf,
    columns: Vec<String>,
    output: Option<PathBuf>,
    sheet: Option<String>,
    images_dir: Option<PathBuf>,
    error_correction: Option<ErrorCorrection>,
    size_mm: Option<f64>,
    config: Option<PathBuf>,
    list_columns: bool,
    verbosity: u8,
}

/// Parse command-line arguments (without the program name).
/// `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Cli>, String> {
    let mut cli = Cli::default();
    let mut input: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = |name: &str| -> Result<String, String> {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{} requires a value", name))
        };
        match arg {
            "-h" | "--help" => return Ok(None),
            "-c" | "--column" => cli.columns.push(value("--column")?),
            "-o" | "--output" => cli.output = Some(PathBuf::from(value("--output")?)),
            "-s" | "--sheet" => cli.sheet = Some(value("--sheet")?),
            "--images-dir" => cli.images_dir = Some(PathBuf::from(value("--images-dir")?)),
            "--ec" => cli.error_correction = Some(value("--ec")?.parse()?),
            "--size-mm" => {
                let raw = value("--size-mm")?;
                let size = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .ok_or_else(|| format!("Invalid --size-mm value: {}", raw))?;
                cli.size_mm = Some(size);
            }
            "--config" => cli.config = Some(PathBuf::from(value("--config")?)),
            "--list-columns" => cli.list_columns = true,
            "-v" | "--verbose" => cli.verbosity = cli.verbosity.saturating_add(1),
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                if input.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                input = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    cli.input = input.ok_or_else(|| "missing <INPUT> file".to_string())?;
    if cli.columns.is_empty() && !cli.list_columns {
        return Err("at least one --column is required".to_string());
    }
    Ok(Some(cli))
}

/// `<dir>/<stem>_with_qr.xlsx` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_with_qr.xlsx", stem))
}

fn run(cli: Cli) -> Result<()> {
    let (mut settings, warnings) = config::load_settings(cli.config.as_ref());
    for warning in warnings {
        log::warn!("{}", warning);
    }
    if let Some(level) = cli.error_correction {
        settings.qr.error_correction = level;
    }
    if let Some(size_mm) = cli.size_mm {
        settings.set_size_mm(size_mm);
    }

    let sheet = Sheet::open(&cli.input, cli.sheet.as_deref())
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    if cli.list_columns {
        for (col, header) in sheet.headers.iter().enumerate() {
            println!("{}\t{}", CellRef::col_to_letters(col), header);
        }
        return Ok(());
    }
    if cli.columns.is_empty() {
        return Err(QrSheetError::NoColumnsSelected.into());
    }

    let producer = QrBatchProducer::new(QrCodeEncoder, settings.qr);
    let outcome = producer.run(&sheet, &cli.columns);

    let images = match &cli.images_dir {
        Some(dir) => write_images(dir, &outcome, settings.embed.box_size)
            .with_context(|| format!("failed to write images to {}", dir.display()))?,
        None => Vec::new(),
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    if output == cli.input {
        anyhow::bail!("output would overwrite the input file {}", output.display());
    }
    let written = sheet
        .save_with_qr(&output, &outcome, &images, &settings.embed)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Wrote {} QR codes to {}",
        outcome.records.len(),
        written.display()
    );
    if !outcome.is_complete() {
        println!("{} rows skipped", outcome.warnings.len());
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    logger::init(cli.verbosity);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
