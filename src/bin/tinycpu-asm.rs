use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tinycpu::disasm::fmt_word;
use tinycpu::{assemble_source, Program};

#[derive(Parser, Debug)]
#[command(author, version, about = "Assembler for the tiny 8-bit-word CPU")]
struct Opts {
    /// Input assembly file (one statement per line)
    #[arg(value_name = "SRCFILE")]
    input: PathBuf,
    /// Output image (default: input with .bin extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Image format
    #[arg(long, value_enum, default_value_t = ImageFormat::Raw)]
    format: ImageFormat,
    /// Print address, byte and disassembly for every word
    #[arg(long)]
    listing: bool,
    /// Export labels to JSON (Vec<{ addr, name }>)
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ImageFormat {
    /// Bytes verbatim, no header
    Raw,
    /// Logisim "v2.0 raw" hex memory image
    Logisim,
}

fn logisim_image(bytes: &[u8]) -> String {
    let mut out = String::from("v2.0 raw\n");
    for row in bytes.chunks(16) {
        let hex: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
        let _ = writeln!(out, "{}", hex.join(" "));
    }
    out
}

fn listing(prog: &Program) -> String {
    let mut buf = String::new();
    let labels = prog.labels.to_sorted();
    for (addr, (w, byte)) in prog.words.iter().zip(&prog.bytes).enumerate() {
        for l in labels.iter().filter(|l| l.addr == addr) {
            let _ = writeln!(buf, "{}:", l.name);
        }
        let _ = writeln!(buf, "{addr:#04x}:  {byte:02x}  {}", fmt_word(w));
    }
    buf
}

fn labels_json(prog: &Program) -> Result<String> {
    Ok(serde_json::to_string_pretty(&prog.labels.to_sorted())?)
}

fn output_path(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let out = output.map_or_else(|| input.with_extension("bin"), Path::to_path_buf);
    anyhow::ensure!(
        out != input,
        "output {} would overwrite the input; pass -o",
        out.display()
    );
    Ok(out)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let prog = assemble_source(&text).with_context(|| format!("{}", opts.input.display()))?;

    let output = output_path(&opts.input, opts.output.as_deref())?;
    match opts.format {
        ImageFormat::Raw => fs::write(&output, &prog.bytes),
        ImageFormat::Logisim => fs::write(&output, logisim_image(&prog.bytes)),
    }
    .with_context(|| format!("writing {}", output.display()))?;
    info!(bytes = prog.bytes.len(), output = %output.display(), "image written");

    if let Some(path) = &opts.labels_out {
        fs::write(path, labels_json(&prog)?).with_context(|| format!("writing {}", path.display()))?;
    }

    if opts.listing {
        print!("{}", listing(&prog));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logisim_rows_of_sixteen() {
        let bytes: Vec<u8> = (0..18).collect();
        let text = logisim_image(&bytes);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], "v2.0 raw");
        assert_eq!(rows[1].split(' ').count(), 16);
        assert!(rows[1].starts_with("00 01 02"));
        assert_eq!(rows[2], "10 11");
    }

    #[test]
    fn labels_json_sorted_by_address() {
        let prog = assemble_source("jmp end\nstart: halt\nend: halt").unwrap();
        let v: serde_json::Value = serde_json::from_str(&labels_json(&prog).unwrap()).unwrap();
        assert_eq!(
            v,
            serde_json::json!([
                { "addr": 3, "name": "start" },
                { "addr": 4, "name": "end" }
            ])
        );
    }

    #[test]
    fn default_output_never_overwrites_input() {
        let out = output_path(Path::new("prog.s"), None).unwrap();
        assert_eq!(out, PathBuf::from("prog.bin"));
        assert!(output_path(Path::new("prog.bin"), None).is_err());
        assert!(output_path(Path::new("a.s"), Some(Path::new("a.s"))).is_err());
        let out = output_path(Path::new("prog.bin"), Some(Path::new("out.bin"))).unwrap();
        assert_eq!(out, PathBuf::from("out.bin"));
    }
}
