use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jcv_core::compare::parse_numeric_dump;
use jcv_core::{
    ChannelBitstream, Comparator, Component, EncodingKind, PipelineConfig, Stage, Verifier,
    VerificationReport, BLOCK_LEN,
};
use jcv_io::{
    codebook_statistics, load_channel_streams, load_config, load_sample_block, load_sample_blocks,
    write_bitstream, write_huffman_outputs, DirDumpSource, OutputLayout,
};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "jcv",
    about = "JPEG co-verification: check hardware encoder dumps against the fixed-point reference",
    version
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// JSON pipeline config (scale, rescale_divisor, thresholds)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the software DCT, quantized block and zigzag sequence of one sample block
    Reference {
        /// Sample block file: 64 level-shifted integers
        block: PathBuf,
        /// Component the block belongs to (selects the quantization table)
        #[arg(short, long, default_value = "Y")]
        component: Component,
    },
    /// Compare two numeric dumps under the rescaling rule of a stage
    Compare {
        /// Hardware dump
        hardware: PathBuf,
        /// Software dump
        software: PathBuf,
        /// Stage name, e.g. Y_DCT, Cb_Quant, Cr_Zigzag
        #[arg(short, long)]
        stage: String,
        /// Pass threshold (defaults to the configured threshold of the stage)
        #[arg(short, long)]
        threshold: Option<f64>,
    },
    /// Verify every stage of every sample block against the hardware dumps
    Verify {
        /// Hardware output directory
        #[arg(short, long, default_value = "hw_output")]
        outputs: PathBuf,
        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Huffman-code the RLE/Delta dumps and assemble per-channel bitstreams
    Encode {
        /// Hardware output directory
        #[arg(short, long, default_value = "hw_output")]
        outputs: PathBuf,
    },
    /// Decode the record layout of a bitstream file
    Inspect {
        /// `<c>_encoded.bin` file
        file: PathBuf,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_reference(
    config: &PipelineConfig,
    block: PathBuf,
    component: Component,
) -> anyhow::Result<bool> {
    let samples = load_sample_block(&block)?;
    let verifier = Verifier::new(config)?;
    let stages = verifier.reference(component, &samples);

    println!("=== {} block {:?} ===", component, block);
    println!();
    println!("=== DCT Output ===");
    print!("{}", stages.dct);
    println!();
    println!("=== Quantization Output ===");
    print!("{}", stages.quant);
    println!();
    println!("=== Zigzag Output ===");
    for (i, v) in stages.zigzag.as_slice().iter().enumerate() {
        println!("Index {}: {}", i, v);
    }
    Ok(true)
}

fn run_compare(
    config: &PipelineConfig,
    hardware: PathBuf,
    software: PathBuf,
    stage: &str,
    threshold: Option<f64>,
) -> anyhow::Result<bool> {
    let threshold = match (threshold, Stage::recognise(stage)) {
        (Some(t), _) => t,
        (None, Some(s)) => config.thresholds.for_stage(s),
        (None, None) => anyhow::bail!(
            "stage '{}' is not a DCT/Quant/Zigzag stage; pass --threshold explicitly",
            stage
        ),
    };
    let hw_text = fs::read_to_string(&hardware).with_context(|| format!("reading {:?}", hardware))?;
    let sw_text = fs::read_to_string(&software).with_context(|| format!("reading {:?}", software))?;

    let comparator = Comparator::new(config.rescale_divisor);
    let result = match parse_numeric_dump(&sw_text) {
        Ok(sw) => comparator.compare_dump(&hw_text, &sw, stage, threshold),
        Err(e) => jcv_core::ComparisonResult::error(stage, format!("software dump: {}", e)),
    };
    println!("{}", result);
    Ok(result.is_pass())
}

fn run_verify(
    config: &PipelineConfig,
    outputs: PathBuf,
    json: Option<PathBuf>,
) -> anyhow::Result<bool> {
    let layout = OutputLayout::new(&outputs);
    let verifier = Verifier::new(config)?;
    let source = DirDumpSource::new(layout.clone());
    let mut report = VerificationReport::default();
    let mut ok = true;

    let t0 = Instant::now();
    for component in Component::ALL {
        let blocks = match load_sample_blocks(&layout, component) {
            Ok(blocks) => blocks,
            Err(e) => {
                warn!(
                    component = %component,
                    error = %format!("{:#}", e),
                    "sample blocks unreadable"
                );
                ok = false;
                continue;
            }
        };
        if blocks.is_empty() {
            warn!(component = %component, "no sample blocks found");
            continue;
        }
        verifier.verify_component(&source, component, &blocks, &mut report);
    }

    for stage in &report.stages {
        println!("[block {:>4}] {}", stage.block, stage.result);
    }
    eprintln!();
    eprintln!("  comparisons : {}", report.stages.len());
    eprintln!("  passed      : {}", report.passed());
    eprintln!("  failed      : {}", report.failed());
    eprintln!("  errors      : {}", report.errored());
    eprintln!("  elapsed     : {:.3}s", t0.elapsed().as_secs_f64());

    if let Some(path) = json {
        let text = serde_json::to_string_pretty(&report)?;
        fs::write(&path, text).with_context(|| format!("writing report {:?}", path))?;
        info!(path = ?path, "wrote JSON report");
    }
    Ok(ok && report.all_passed())
}

fn run_encode(outputs: PathBuf) -> anyhow::Result<bool> {
    let layout = OutputLayout::new(&outputs);
    let mut ok = true;
    let mut original_size = 0u64;
    let mut compressed_size = 0u64;

    eprintln!("Performing Huffman coding...");
    for component in Component::ALL {
        let streams = match load_channel_streams(&layout, component) {
            Ok(streams) => streams,
            Err(e) => {
                warn!(
                    component = %component,
                    error = %format!("{:#}", e),
                    "symbol streams unreadable"
                );
                ok = false;
                continue;
            }
        };
        if !streams.has(EncodingKind::Rle) && !streams.has(EncodingKind::Delta) {
            warn!(component = %component, "no symbol streams, skipping");
            continue;
        }

        match write_huffman_outputs(&layout, &streams) {
            Ok(summaries) => {
                for s in summaries {
                    println!("{} {}: {} unique codes", s.component, s.kind, s.codebook.len());
                }
            }
            Err(e) => {
                warn!(
                    component = %component,
                    error = %format!("{:#}", e),
                    "Huffman coding failed"
                );
                ok = false;
            }
        }

        match write_bitstream(&layout, &streams) {
            Ok(summary) => {
                println!(
                    "Created bitstream for {}: {:?} ({}, xxh3 {:016x})",
                    component,
                    summary.path,
                    human_bytes(summary.bytes as u64),
                    summary.checksum
                );
                compressed_size += summary.bytes as u64;
            }
            Err(e) => {
                eprintln!("bitstream for {} not written: {:#}", component, e);
                ok = false;
            }
        }

        match load_sample_blocks(&layout, component) {
            Ok(blocks) => original_size += (blocks.len() * BLOCK_LEN) as u64,
            Err(e) => {
                warn!(
                    component = %component,
                    error = %format!("{:#}", e),
                    "sample blocks unreadable"
                );
                ok = false;
            }
        }
    }

    println!();
    println!("=== Huffman Table Statistics ===");
    for (component, kind, stats) in codebook_statistics(&layout)? {
        println!();
        println!("{} {} Statistics:", component, kind.file_tag().to_uppercase());
        println!("  Total symbols       : {}", stats.symbols);
        println!("  Min code length     : {}", stats.min);
        println!("  Max code length     : {}", stats.max);
        println!("  Average code length : {:.2}", stats.mean);
    }

    if original_size > 0 && compressed_size > 0 {
        println!();
        println!("=== Compression Results ===");
        println!("  original size   : {}", human_bytes(original_size));
        println!("  compressed size : {}", human_bytes(compressed_size));
        println!("  ratio           : {:.2}:1", original_size as f64 / compressed_size as f64);
    }
    Ok(ok)
}

fn run_inspect(file: PathBuf) -> anyhow::Result<bool> {
    let bytes = fs::read(&file).with_context(|| format!("reading {:?}", file))?;
    let record =
        ChannelBitstream::from_bytes(&bytes).with_context(|| format!("decoding {:?}", file))?;

    println!("=== Bitstream: {:?} ===", file);
    println!();
    println!("  size       : {}", human_bytes(bytes.len() as u64));
    println!("  tag        : {} ({:?})", record.tag, record.tag as char);
    match record.dc {
        Some(dc) => println!("  dc delta   : {}", dc),
        None => println!("  dc delta   : (none)"),
    }
    println!("  ac entries : {}", record.ac.len());
    if !record.ac.is_empty() {
        println!();
        println!("  {:>6}  {:>4}  {:>7}", "entry", "run", "value");
        println!("  {}", "-".repeat(21));
        for (i, e) in record.ac.iter().enumerate() {
            println!("  {:>6}  {:>4}  {:>7}", i, e.run, e.value);
        }
    }
    Ok(true)
}

// ── Entry point ────────────────────────────────────────────────────────────

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    match cli.command {
        Commands::Reference { block, component } => run_reference(&config, block, component),
        Commands::Compare {
            hardware,
            software,
            stage,
            threshold,
        } => run_compare(&config, hardware, software, &stage, threshold),
        Commands::Verify { outputs, json } => run_verify(&config, outputs, json),
        Commands::Encode { outputs } => run_encode(outputs),
        Commands::Inspect { file } => run_inspect(file),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
