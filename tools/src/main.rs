use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tickwire_tools::{
    decode_delta, encode_delta, fingerprints, format_report_pretty, size_report, Coder,
    RecordKind,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tickwire-tools",
    version,
    about = "tickwire delta encoding and inspection tools"
)]
struct Cli {
    /// Log codec decisions at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a record as a delta and print its size and bytes.
    Encode {
        #[arg(long, value_enum)]
        kind: RecordKind,
        /// Reference record JSON; omitted means an all-zero record.
        #[arg(long)]
        from: Option<PathBuf>,
        /// Target record JSON.
        #[arg(long)]
        to: PathBuf,
        /// Send an entity even when nothing changed.
        #[arg(long)]
        force: bool,
        /// Train a Huffman coder on this file instead of sending raw bits.
        #[arg(long)]
        huffman: Option<PathBuf>,
    },
    /// Decode a hex delta into JSON.
    Decode {
        #[arg(long, value_enum)]
        kind: RecordKind,
        /// Reference record JSON; omitted means an all-zero record.
        #[arg(long)]
        from: Option<PathBuf>,
        /// Delta bytes as hex.
        #[arg(long)]
        hex: String,
        /// Huffman training file used when encoding.
        #[arg(long)]
        huffman: Option<PathBuf>,
    },
    /// Encode a JSON array of records in sequence and report field changes.
    Report {
        #[arg(long, value_enum)]
        kind: RecordKind,
        /// JSON array of successive records.
        records: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = ReportFormat::Pretty)]
        format: ReportFormat,
        /// Huffman training file.
        #[arg(long)]
        huffman: Option<PathBuf>,
    },
    /// Print field table fingerprints.
    Fingerprint,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Encode {
            kind,
            from,
            to,
            force,
            huffman,
        } => {
            let coder = load_coder(huffman.as_deref())?;
            let from = from.as_deref().map(read_text).transpose()?;
            let to = read_text(&to)?;
            let report = encode_delta(kind, from.as_deref(), &to, force, &coder)?;
            println!("bits: {} bytes: {}", report.bits, report.bytes.len());
            println!("{}", report.hex());
        }
        Command::Decode {
            kind,
            from,
            hex,
            huffman,
        } => {
            let coder = load_coder(huffman.as_deref())?;
            let from = from.as_deref().map(read_text).transpose()?;
            println!("{}", decode_delta(kind, from.as_deref(), &hex, &coder)?);
        }
        Command::Report {
            kind,
            records,
            format,
            huffman,
        } => {
            let coder = load_coder(huffman.as_deref())?;
            let records = read_text(&records)?;
            let report = size_report(kind, &records, &coder)?;
            match format {
                ReportFormat::Json => {
                    let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                    println!("{json}");
                }
                ReportFormat::Pretty => print!("{}", format_report_pretty(&report)),
            }
        }
        Command::Fingerprint => {
            for table in fingerprints() {
                println!("{}: {} fields 0x{:016x}", table.name, table.fields, table.hash);
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn load_coder(sample: Option<&Path>) -> Result<Coder> {
    let sample = sample
        .map(|path| fs::read(path).with_context(|| format!("read huffman sample {}", path.display())))
        .transpose()?;
    Ok(Coder::from_sample(sample.as_deref()))
}
