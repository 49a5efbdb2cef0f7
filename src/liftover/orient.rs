//! Block ordering and PSL insert counts
//!
//! Assembled records hold their blocks in source order. BED wants them
//! ascending in target coordinates. PSL wants them ascending along the
//! query strand, which puts the target blocks in descending order on a
//! minus target strand.

use crate::core::{LiftoverError, Result, Strand};
use crate::formats::BedLine;

/// Signed distance from the end of `prev` to the start of `next`
///
/// With `descending` set the pair is measured the other way round, so the
/// gap is always taken in increasing-coordinate direction.
fn gap(prev: (u64, u64), next: (u64, u64), descending: bool) -> i64 {
    let (lower, upper) = if descending { (next, prev) } else { (prev, next) };
    upper.0 as i64 - (lower.0 + lower.1) as i64
}

fn must_flip(record: &BedLine, psl: bool) -> bool {
    let (first, second) = (&record.blocks[0], &record.blocks[1]);
    let delta = gap((first.start, first.length), (second.start, second.length), false);
    if psl {
        let minus = record.strand == Some(Strand::Minus);
        (minus && delta >= 0) || (!minus && delta < 0)
    } else {
        delta < 0
    }
}

fn strictly_ordered(values: impl Iterator<Item = u64>, descending: bool) -> bool {
    let values: Vec<u64> = values.collect();
    values
        .windows(2)
        .all(|w| if descending { w[1] < w[0] } else { w[1] > w[0] })
}

fn check_order(record: &BedLine, psl: bool) -> Result<()> {
    let target_descending = psl && record.strand == Some(Strand::Minus);
    if !strictly_ordered(record.blocks.iter().map(|b| b.start), target_descending) {
        return Err(LiftoverError::invariant(
            &record.chrom,
            record.start,
            record.end,
            "target blocks out of order after normalization",
        ));
    }

    if let Some(info) = record.psl.as_ref().filter(|_| psl) {
        let query_descending = info.q_strand == Strand::Minus;
        if !strictly_ordered(info.q_block_starts.iter().copied(), query_descending) {
            return Err(LiftoverError::invariant(
                &record.chrom,
                record.start,
                record.end,
                "query blocks out of order after normalization",
            ));
        }
    }
    Ok(())
}

/// Reverse block lists (and query starts) that run the wrong way
///
/// Applying this twice is the same as applying it once.
pub fn normalize_orientation(records: &mut [BedLine], psl: bool) -> Result<()> {
    for record in records.iter_mut().filter(|r| r.blocks.len() > 1) {
        if must_flip(record, psl) {
            record.blocks.reverse();
            if psl {
                if let Some(info) = record.psl.as_mut() {
                    info.q_block_starts.reverse();
                }
            }
        }
        check_order(record, psl)?;
    }
    Ok(())
}

/// Fill the four insert counters of every PSL record from its block gaps
pub fn compute_psl_inserts(records: &mut [BedLine]) -> Result<()> {
    for record in records.iter_mut() {
        let target_descending = record.strand == Some(Strand::Minus);
        let Some(info) = record.psl.as_mut() else {
            continue;
        };
        if info.q_block_starts.len() != record.blocks.len() {
            return Err(LiftoverError::invariant(
                &record.chrom,
                record.start,
                record.end,
                format!(
                    "{} blocks but {} query starts",
                    record.blocks.len(),
                    info.q_block_starts.len()
                ),
            ));
        }
        let query_descending = info.q_strand == Strand::Minus;

        info.q_num_insert = 0;
        info.q_base_insert = 0;
        info.t_num_insert = 0;
        info.t_base_insert = 0;

        for i in 1..record.blocks.len() {
            let (prev, next) = (&record.blocks[i - 1], &record.blocks[i]);

            let t_gap = gap(
                (prev.start, prev.length),
                (next.start, next.length),
                target_descending,
            );
            if t_gap < 0 {
                return Err(LiftoverError::invariant(
                    &record.chrom,
                    record.start,
                    record.end,
                    format!("target blocks {} and {} overlap", i - 1, i),
                ));
            }
            if t_gap > 0 {
                info.t_num_insert += 1;
                info.t_base_insert += t_gap as u64;
            }

            // duplicated query blocks may overlap; that is not an insert
            let q_gap = gap(
                (info.q_block_starts[i - 1], prev.length),
                (info.q_block_starts[i], next.length),
                query_descending,
            );
            if q_gap > 0 {
                info.q_num_insert += 1;
                info.q_base_insert += q_gap as u64;
            }
        }
    }
    Ok(())
}
