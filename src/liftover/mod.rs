//! Interval liftover
//!
//! Lifts one parsed BED record at a time from a source genome to a target
//! genome:
//!
//! 1. intake: validate the record against the source genome
//! 2. map: call the alignment's mapping primitive per interval or block
//! 3. assemble: group raw fragments into output records ([`assemble`])
//! 4. normalize: put block lists into output order ([`orient`])
//! 5. clean up and sort ([`cleanup`])
//!
//! Every record gets fresh working state; the only state shared across
//! records is the [`MissedSequences`] set.

pub mod assemble;
pub mod cleanup;
mod convert;
pub mod orient;
mod warnings;

pub use convert::{convert_bed, ConversionStats};
pub use warnings::MissedSequences;

use crate::core::{Alignment, IntervalQuery, LiftoverError, RawFragment, Result, Strand};
use crate::formats::BedLine;
use log::{debug, trace, warn};

/// Output rendering of lifted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// BED with the same number of columns as the input
    #[default]
    Bed,
    /// PSL, optionally prefixed by the BED name column
    Psl { with_name: bool },
}

impl OutputFormat {
    pub fn is_psl(&self) -> bool {
        matches!(self, OutputFormat::Psl { .. })
    }
}

/// Caller-chosen liftover settings
#[derive(Debug, Clone)]
pub struct LiftoverOptions {
    pub output: OutputFormat,
    /// Follow paralogous copies in the alignment
    pub traverse_dupes: bool,
    /// Ancestor genome bounding the alignment search
    pub coalescence_limit: Option<String>,
}

impl Default for LiftoverOptions {
    fn default() -> Self {
        Self {
            output: OutputFormat::Bed,
            traverse_dupes: true,
            coalescence_limit: None,
        }
    }
}

/// Why a record produced no output without being an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The record's sequence is not in the source genome
    MissingSequence,
    /// The record ends past the end of its sequence
    PastSequenceEnd,
    /// A block-typed record with no blocks
    NoBlocks,
}

/// Outcome of lifting one record
#[derive(Debug, Clone, PartialEq)]
pub enum LiftResult {
    /// Lifted records, sorted by source position
    Mapped(Vec<BedLine>),
    /// Nothing in the record aligns to the target genome
    Unmapped,
    Skipped(SkipReason),
}

/// Lifts records from one genome to another through an [`Alignment`]
pub struct Liftover<'a, A: Alignment + ?Sized> {
    alignment: &'a A,
    source: &'a str,
    target: &'a str,
    options: &'a LiftoverOptions,
    missed: &'a MissedSequences,
}

impl<'a, A: Alignment + ?Sized> Liftover<'a, A> {
    /// Fails if any named genome is not part of the alignment
    pub fn new(
        alignment: &'a A,
        source: &'a str,
        target: &'a str,
        options: &'a LiftoverOptions,
        missed: &'a MissedSequences,
    ) -> Result<Self> {
        let genomes = [Some(source), Some(target), options.coalescence_limit.as_deref()];
        for genome in genomes.into_iter().flatten() {
            if !alignment.has_genome(genome) {
                return Err(LiftoverError::UnknownGenome(genome.to_string()));
            }
        }
        Ok(Self {
            alignment,
            source,
            target,
            options,
            missed,
        })
    }

    pub fn options(&self) -> &LiftoverOptions {
        self.options
    }

    /// Lift one record
    pub fn lift(&self, input: &BedLine) -> Result<LiftResult> {
        let psl = self.options.output.is_psl();
        let mut record = input.clone();
        if psl {
            // block lists everywhere keep the PSL path uniform; PSL has no unknown strand
            record.expand_to_bed12();
            record.strand.get_or_insert(Strand::Plus);
        }

        let Some(sequence) = self.alignment.sequence(self.source, &record.chrom) else {
            if self.missed.insert(&record.chrom) {
                warn!(
                    "Unable to find sequence {} in genome {}",
                    record.chrom, self.source
                );
            }
            return Ok(LiftResult::Skipped(SkipReason::MissingSequence));
        };
        if record.end > sequence.length {
            warn!(
                "Skipping interval with endpoint {} because sequence {} has length {}",
                record.end, record.chrom, sequence.length
            );
            return Ok(LiftResult::Skipped(SkipReason::PastSequenceEnd));
        }
        if record.bed_type > 9 && record.blocks.is_empty() {
            warn!(
                "Skipping input line {}:{}-{} with 0 blocks",
                record.chrom, record.start, record.end
            );
            return Ok(LiftResult::Skipped(SkipReason::NoBlocks));
        }

        let fragments = self.collect_fragments(&record)?;
        debug!(
            "{}:{}-{} lifted to {} raw fragments",
            record.chrom,
            record.start,
            record.end,
            fragments.len()
        );

        let lifted = if record.bed_type <= 9 {
            assemble::intervals_from_fragments(&record, fragments)
        } else if fragments.is_empty() {
            Vec::new()
        } else {
            assemble::assemble_blocks(&record, fragments, psl)?
        };

        let mut lifted = cleanup::clean_results(&record, lifted);
        if psl {
            for line in &mut lifted {
                let t_size = self
                    .alignment
                    .sequence(self.target, &line.chrom)
                    .map(|s| s.length)
                    .ok_or_else(|| {
                        LiftoverError::invariant(
                            &line.chrom,
                            line.start,
                            line.end,
                            format!("target sequence missing from genome {}", self.target),
                        )
                    })?;
                if let Some(info) = line.psl.as_mut() {
                    info.q_size = sequence.length;
                    info.t_size = t_size;
                }
            }
        }
        lifted.sort_by(assemble::source_order);

        Ok(if lifted.is_empty() {
            LiftResult::Unmapped
        } else {
            LiftResult::Mapped(lifted)
        })
    }

    /// Pool the raw fragments of the whole record or of each of its blocks
    fn collect_fragments(&self, record: &BedLine) -> Result<Vec<RawFragment>> {
        if record.bed_type <= 9 {
            return self.map_interval(record, record.start, record.end);
        }

        let mut blocks = record.blocks.clone();
        blocks.sort();
        let mut fragments = Vec::new();
        for block in blocks {
            let start = record.start + block.start;
            let end = start + block.length;
            if end > start {
                fragments.extend(self.map_interval(record, start, end)?);
            }
        }
        Ok(fragments)
    }

    fn map_interval(&self, record: &BedLine, start: u64, end: u64) -> Result<Vec<RawFragment>> {
        let query = IntervalQuery {
            source_genome: self.source,
            target_genome: self.target,
            sequence: &record.chrom,
            start,
            end,
            strand: record.strand,
            coalescence_limit: self.options.coalescence_limit.as_deref(),
            traverse_dupes: self.options.traverse_dupes,
            with_stats: self.options.output.is_psl(),
        };
        let mut fragments = self.alignment.map_interval(&query)?;
        fragments.retain(|f| !f.is_empty());
        trace!("{}:{}-{} -> {:?}", record.chrom, start, end, fragments);
        Ok(fragments)
    }
}
