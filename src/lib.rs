//! FastLiftover - map genomic intervals between genomes
//!
//! Lifts BED records from a source genome onto a target genome through a
//! whole-genome alignment and reassembles the mapped pieces into BED or
//! PSL records.
//!
//! # Features
//!
//! - Duplication-aware assembly of multi-block (BED12) records
//! - PSL output with block ordering and insert statistics
//! - Pluggable alignment backend; chain files are supported out of the box
//! - Parallel processing with rayon
//! - Compressed input (gzip, bzip2)
//!
//! # Example
//!
//! ```ignore
//! use fast_liftover::{ChainMapper, Liftover, LiftoverOptions, MissedSequences};
//!
//! let mapper = ChainMapper::from_chain_file("hg19ToHg38.chain", "hg19", "hg38")?;
//! let options = LiftoverOptions::default();
//! let missed = MissedSequences::new();
//! let liftover = Liftover::new(&mapper, "hg19", "hg38", &options, &missed)?;
//!
//! let result = liftover.lift(&record)?;
//! ```

pub mod core;
pub mod formats;
pub mod liftover;

// Re-export commonly used types
pub use core::{
    parse_chain_bytes, parse_chain_file, Alignment, BedParseError, ChainMapper, ChainParseError,
    LiftoverError, RawFragment, Strand,
};
pub use formats::{BedLine, BedReadOptions, Block, PslInfo};
pub use liftover::{
    convert_bed, ConversionStats, LiftResult, Liftover, LiftoverOptions, MissedSequences,
    OutputFormat, SkipReason,
};
