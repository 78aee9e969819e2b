use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use tinycpu::decoder::{Decoder, TableDecoder};
use tinycpu::disasm::fmt_word;

use tinycpu_disasm::analyze;
use tinycpu_disasm::{load_raw_bin, read_u8};

#[derive(Parser, Debug)]
#[command(author, version, about = "Tiny CPU disassembler CLI", long_about=None)]
struct Cli {
    /// Load address for the image in target address space
    #[arg(long, default_value_t = 0usize)]
    base: usize,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded segments (simple single-segment for raw .bin)
    Sections,
    /// Disassemble a range [start, end) word by word
    Range {
        /// Start address (hex or dec)
        start: String,
        /// End address (hex or dec, exclusive)
        end: String,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Fold lowered jump sequences back into pseudo jumps and label their targets
    Analyze {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Show instruction bytes in listing (text format only)
        #[arg(long)]
        show_bytes: bool,
        /// Write analysis output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

fn parse_addr(s: &str) -> Result<usize> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(usize::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<usize>()?)
    }
}

fn emit(out: Option<String>, text: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(&path, text).with_context(|| format!("writing {path}")),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let img = load_raw_bin(Path::new(&cli.input), cli.base, cli.skip, cli.len)
        .with_context(|| format!("loading {}", cli.input))?;
    tracing::debug!(segments = img.segments.len(), "image loaded");

    match cli.cmd {
        Command::Sections => {
            println!("{:<10} {:<6} {:<6}", "name", "start", "end");
            for s in &img.segments {
                let start = s.base;
                let end = s.base + s.bytes.len();
                println!("{:<10} {start:#06x} {end:#06x}", s.name);
            }
        }
        Command::Range { start, end, show_bytes, out } => {
            let start = parse_addr(&start)?;
            let end = parse_addr(&end)?;
            anyhow::ensure!(end >= start, "end must be >= start");

            let dec = TableDecoder::new();
            let mut buf = String::new();
            for pc in start..end {
                let Some(byte) = read_u8(&img, pc) else {
                    let _ = writeln!(buf, "{pc:#04x}: <oob>");
                    break;
                };
                let text = fmt_word(&dec.decode(byte));
                if show_bytes {
                    let _ = writeln!(buf, "{pc:#04x}: {byte:02x}  {text}");
                } else {
                    let _ = writeln!(buf, "{pc:#04x}: {text}");
                }
            }
            emit(out, &buf)?;
        }
        Command::Analyze { format, show_bytes, out } => {
            let report = analyze::analyze(&img, show_bytes);
            match format {
                OutputFormat::Json => emit(out, &serde_json::to_string_pretty(&report)?)?,
                OutputFormat::Text => {
                    let mut buf = String::new();
                    let _ = writeln!(buf, "Analysis summary:");
                    let _ = writeln!(buf, "  jumps  : {}", report.jumps.len());
                    let _ = writeln!(buf, "  labels : {}", report.labels.len());
                    for j in &report.jumps {
                        let _ = writeln!(buf, "  {:#04x} -> {:#04x} ({})", j.addr, j.target, j.mnemonic);
                    }
                    let _ = writeln!(buf, "\nListing:");
                    for line in &report.lines {
                        let _ = writeln!(buf, "{line}");
                    }
                    emit(out, &buf)?;
                }
            }
        }
    }

    Ok(())
}
