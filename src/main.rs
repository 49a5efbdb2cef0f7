//! fast-liftover CLI entry point
//!
//! Lifts BED intervals from one genome to another through a chain
//! alignment, writing BED or PSL.

use anyhow::Context;
use clap::Parser;
use fast_liftover::core::{open_output, ChainMapper, SmartReader};
use fast_liftover::formats::BedReadOptions;
use fast_liftover::liftover::{
    convert_bed, Liftover, LiftoverOptions, MissedSequences, OutputFormat,
};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fast-liftover")]
#[command(about = "Map BED intervals between genomes through an alignment")]
#[command(version)]
struct Cli {
    /// Chain file aligning the source genome (reference side) to the target genome
    chain: PathBuf,
    /// Name of the genome to lift from
    src_genome: String,
    /// Input BED file ('-' for stdin)
    src_bed: PathBuf,
    /// Name of the genome to lift to
    tgt_genome: String,
    /// Output file ('-' for stdout)
    tgt_bed: PathBuf,

    /// Write PSL instead of BED
    #[arg(long = "out-psl")]
    out_psl: bool,
    /// Write PSL with the BED name as an extra first column
    #[arg(long = "out-psl-with-name")]
    out_psl_with_name: bool,
    /// Do not follow paralogous copies
    #[arg(long = "no-dupes")]
    no_dupes: bool,
    /// Ancestor genome bounding the alignment search
    #[arg(long = "coalescence-limit")]
    coalescence_limit: Option<String>,
    /// Read input as this BED version instead of counting columns
    #[arg(long = "in-bed-version", value_parser = clap::value_parser!(u8).range(3..=12))]
    in_bed_version: Option<u8>,
    /// Keep columns beyond the BED version and write them back out
    #[arg(long = "keep-extra")]
    keep_extra: bool,
    /// Append to the output file instead of overwriting it
    #[arg(long)]
    append: bool,
    /// Number of threads
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,
}

impl Cli {
    fn output_format(&self) -> OutputFormat {
        if self.out_psl_with_name {
            OutputFormat::Psl { with_name: true }
        } else if self.out_psl {
            OutputFormat::Psl { with_name: false }
        } else {
            OutputFormat::Bed
        }
    }
}

fn load_chain(cli: &Cli) -> anyhow::Result<ChainMapper> {
    let start = Instant::now();
    eprintln!("Loading chain file: {:?}", cli.chain);
    let mapper = ChainMapper::from_chain_file(&cli.chain, cli.src_genome.as_str(), cli.tgt_genome.as_str())
        .with_context(|| format!("Failed to load chain file {:?}", cli.chain))?;
    eprintln!(
        "Chain file loaded in {:.2}s: {} blocks, {} <-> {}",
        start.elapsed().as_secs_f64(),
        mapper.block_count(),
        mapper.source_genome(),
        mapper.target_genome()
    );
    Ok(mapper)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let start = Instant::now();

    let mapper = load_chain(&cli)?;
    let options = LiftoverOptions {
        output: cli.output_format(),
        traverse_dupes: !cli.no_dupes,
        coalescence_limit: cli.coalescence_limit.clone(),
    };
    let read_options = BedReadOptions {
        version: cli.in_bed_version.map(usize::from),
        keep_extra: cli.keep_extra,
    };
    let missed = MissedSequences::new();
    let liftover = Liftover::new(&mapper, &cli.src_genome, &cli.tgt_genome, &options, &missed)?;

    let reader = SmartReader::open(&cli.src_bed)
        .with_context(|| format!("Failed to open input {:?}", cli.src_bed))?;
    let mut writer = open_output(&cli.tgt_bed, cli.append)
        .with_context(|| format!("Failed to open output {:?}", cli.tgt_bed))?;

    info!(
        "Lifting {:?} from {} to {} ({} threads)",
        cli.src_bed, cli.src_genome, cli.tgt_genome, cli.threads
    );
    let stats = convert_bed(reader, &mut *writer, &liftover, &read_options, cli.threads)?;

    eprintln!("\n=== Liftover Statistics ===");
    eprintln!("Total records:   {}", stats.total);
    eprintln!("Mapped:          {}", stats.mapped);
    eprintln!("Unmapped:        {}", stats.unmapped);
    eprintln!("Skipped:         {}", stats.skipped);
    eprintln!("Records written: {}", stats.records_out);
    if !missed.is_empty() {
        eprintln!("Missing sequences: {}", missed.len());
    }
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
