//! PSL alignment output
//!
//! A lifted BED12 record plus its [`PslInfo`] is written as one PSL line:
//!
//! ```text
//! [name] matches misMatches repMatches nCount qNumInsert qBaseInsert
//! tNumInsert tBaseInsert strand qName qSize qStart qEnd tName tSize
//! tStart tEnd blockCount blockSizes qStarts tStarts
//! ```
//!
//! The query is the genome lifted from and the target the genome lifted to.

use crate::core::{MatchStats, Strand};
use crate::formats::bed::{join, BedLine};
use std::io::{self, Write};

/// Alignment columns carried by a record when PSL output is requested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PslInfo {
    pub stats: MatchStats,
    pub q_num_insert: u64,
    pub q_base_insert: u64,
    pub t_num_insert: u64,
    pub t_base_insert: u64,
    pub q_strand: Strand,
    pub q_chrom: String,
    pub q_size: u64,
    pub q_end: u64,
    pub t_size: u64,
    /// Absolute source start of each block, parallel to `BedLine::blocks`
    pub q_block_starts: Vec<u64>,
}

impl BedLine {
    /// Write as a PSL line, optionally prefixed by the name column
    pub fn write_psl<W: Write + ?Sized>(&self, out: &mut W, with_name: bool) -> io::Result<()> {
        let psl = self.psl.as_ref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{}:{}-{} has no PSL data", self.chrom, self.start, self.end),
            )
        })?;
        let t_strand = self.strand.unwrap_or(Strand::Plus);

        if with_name {
            write!(out, "{}\t", self.name)?;
        }
        write!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t",
            psl.stats.matches,
            psl.stats.mis_matches,
            psl.stats.rep_matches,
            psl.stats.n_count,
            psl.q_num_insert,
            psl.q_base_insert,
            psl.t_num_insert,
            psl.t_base_insert,
        )?;
        write!(out, "{}{}\t", psl.q_strand, t_strand)?;
        write!(
            out,
            "{}\t{}\t{}\t{}\t",
            psl.q_chrom, psl.q_size, self.src_start, psl.q_end
        )?;
        write!(
            out,
            "{}\t{}\t{}\t{}\t",
            self.chrom, psl.t_size, self.start, self.end
        )?;
        write!(out, "{}\t", self.blocks.len())?;
        write!(out, "{}\t", join(self.blocks.iter().map(|b| b.length)))?;

        let q_starts = psl
            .q_block_starts
            .iter()
            .zip(&self.blocks)
            .map(|(&q, b)| strand_start(psl.q_strand, psl.q_size, q, b.length));
        write!(out, "{}\t", join(q_starts))?;

        let t_starts = self
            .blocks
            .iter()
            .map(|b| strand_start(t_strand, psl.t_size, self.start + b.start, b.length));
        writeln!(out, "{}", join(t_starts))
    }
}

/// Block start in the coordinates of the given strand
fn strand_start(strand: Strand, size: u64, start: u64, length: u64) -> u64 {
    match strand {
        Strand::Plus => start,
        Strand::Minus => size - start - length,
    }
}
