mod output;
mod telemetry;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use otzip_convert::otlp::decode_bytes;
use otzip_convert::{encode_json, to_zipkin_span_models};
use otzip_core::config::{Config, InputFormat};
use otzip_core::model::span::SpanRecord;
use otzip_core::model::zipkin::SpanModel;
use tracing::info;

use crate::output::print_spans_human;
use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "otzip")]
#[command(about = "Convert OpenTelemetry span batches into Zipkin v2 spans")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Convert a span batch and print Zipkin v2 JSON")]
    Convert {
        #[arg(help = "Input file; stdin when omitted or '-'")]
        input: Option<PathBuf>,
        #[arg(long, help = "records (JSON span records) or otlp (OTLP protobuf)")]
        format: Option<String>,
        #[arg(long)]
        pretty: bool,
        #[arg(long, help = "Drop malformed OTLP spans instead of failing")]
        skip_invalid: bool,
    },
    #[command(about = "Print converted spans in human-readable form")]
    Inspect {
        #[arg(help = "Input file; stdin when omitted or '-'")]
        input: Option<PathBuf>,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        skip_invalid: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing();
    let mut cfg = Config::load().context("load otzip config")?;

    match cli.command {
        Commands::Convert {
            input,
            format,
            pretty,
            skip_invalid,
        } => {
            apply_flags(&mut cfg, format.as_deref(), pretty, skip_invalid)?;
            let models = convert_input(input.as_deref(), &cfg)?;
            println!("{}", encode_json(&models, cfg.pretty)?);
            Ok(())
        }
        Commands::Inspect {
            input,
            format,
            skip_invalid,
        } => {
            apply_flags(&mut cfg, format.as_deref(), false, skip_invalid)?;
            let models = convert_input(input.as_deref(), &cfg)?;
            print_spans_human(&models);
            Ok(())
        }
    }
}

/// Flags only ever switch behaviour on; the config file and environment
/// supply the baseline.
fn apply_flags(
    cfg: &mut Config,
    format: Option<&str>,
    pretty: bool,
    skip_invalid: bool,
) -> anyhow::Result<()> {
    if let Some(format) = format {
        cfg.input_format = InputFormat::parse(format)?;
    }
    cfg.pretty |= pretty;
    cfg.skip_invalid |= skip_invalid;
    Ok(())
}

fn convert_input(input: Option<&Path>, cfg: &Config) -> anyhow::Result<Vec<SpanModel>> {
    let raw = read_input(input)?;
    let records = decode_input(&raw, cfg)?;
    info!(
        spans = records.len(),
        format = ?cfg.input_format,
        "decoded span batch"
    );
    Ok(to_zipkin_span_models(&records))
}

fn decode_input(raw: &[u8], cfg: &Config) -> anyhow::Result<Vec<SpanRecord>> {
    match cfg.input_format {
        InputFormat::Records => {
            serde_json::from_slice(raw).context("input is not a JSON array of span records")
        }
        InputFormat::OtlpProtobuf => Ok(decode_bytes(raw, cfg.skip_invalid)?),
    }
}

fn read_input(input: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("read stdin")?;
            Ok(buf)
        }
    }
}
