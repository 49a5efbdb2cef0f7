//! Grouping raw fragments into output records
//!
//! Fragments come back from the alignment unordered and possibly
//! overlapping in source coordinates. Blocked input records have their
//! fragments walked in source order and merged into multi-block records as
//! long as each new fragment continues the previous block on the same
//! strand and sequence without stepping back over it. Fragments that share
//! source bases with a neighbour are paralogous copies; PSL output always
//! gives those a record of their own.

use crate::core::{LiftoverError, RawFragment, Result, Strand};
use crate::formats::{BedLine, Block, PslInfo};
use crate::liftover::orient::{compute_psl_inserts, normalize_orientation};
use std::cmp::Ordering;

/// Source order: `(src_start, end, start, chrom, strand)`
pub fn source_order(a: &BedLine, b: &BedLine) -> Ordering {
    a.src_start
        .cmp(&b.src_start)
        .then(a.end.cmp(&b.end))
        .then(a.start.cmp(&b.start))
        .then_with(|| a.chrom.cmp(&b.chrom))
        .then(a.strand.cmp(&b.strand))
}

fn fragment_order(a: &RawFragment, b: &RawFragment) -> Ordering {
    a.source_start
        .cmp(&b.source_start)
        .then(a.end.cmp(&b.end))
        .then(a.start.cmp(&b.start))
        .then_with(|| a.chrom.cmp(&b.chrom))
        .then(a.strand.cmp(&b.strand))
}

/// A fresh output record seeded from the input's annotation columns
fn seed_record(input: &BedLine, fragment: &RawFragment, psl: bool) -> BedLine {
    BedLine {
        chrom: fragment.chrom.clone(),
        start: fragment.start,
        end: fragment.end,
        strand: fragment.strand,
        blocks: Vec::new(),
        src_start: fragment.source_start,
        psl: psl.then(|| PslInfo {
            stats: fragment.stats.unwrap_or_default(),
            q_strand: input.strand.unwrap_or(Strand::Plus),
            q_chrom: input.chrom.clone(),
            ..PslInfo::default()
        }),
        ..input.clone()
    }
}

/// Unblocked input: every fragment is reported as its own record
pub fn intervals_from_fragments(input: &BedLine, fragments: Vec<RawFragment>) -> Vec<BedLine> {
    fragments
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| seed_record(input, f, false))
        .collect()
}

/// Whether `fragment` may be appended as the next block of `record`
///
/// Checked in order: strand, exact source duplicate, backward step in
/// target coordinates, sequence name.
pub fn compatible(record: &BedLine, fragment: &RawFragment, input_strand: Option<Strand>) -> bool {
    if record.strand != fragment.strand {
        return false;
    }
    if record.src_start == fragment.source_start {
        return false;
    }
    let Some(last) = record.blocks.last() else {
        return false;
    };

    let delta = if record.strand != input_strand {
        last.start as i64 - fragment.end as i64
    } else {
        fragment.start as i64 - last.end() as i64
    };
    if delta < 0 {
        return false;
    }

    record.chrom == fragment.chrom
}

/// Blocked input: merge fragments into records with relative, normalized
/// block lists
pub fn assemble_blocks(
    input: &BedLine,
    mut fragments: Vec<RawFragment>,
    psl: bool,
) -> Result<Vec<BedLine>> {
    fragments.retain(|f| !f.is_empty());
    fragments.sort_by(fragment_order);

    let mut records: Vec<BedLine> = Vec::new();
    let mut prev_source_end: Option<u64> = None;

    for (i, fragment) in fragments.iter().enumerate() {
        let source_end = fragment.source_end();
        let duplicate = prev_source_end.is_some_and(|end| fragment.source_start < end)
            || fragments
                .get(i + 1)
                .is_some_and(|next| next.source_start < source_end);

        let open_new = match records.last() {
            None => true,
            Some(last) => (psl && duplicate) || !compatible(last, fragment, input.strand),
        };
        if open_new {
            records.push(seed_record(input, fragment, psl));
        }
        prev_source_end = Some(source_end);

        // just pushed or checked above
        let Some(record) = records.last_mut() else {
            continue;
        };
        record.start = record.start.min(fragment.start);
        record.end = record.end.max(fragment.end);
        record.blocks.push(Block {
            start: fragment.start,
            length: fragment.len(),
        });

        if let Some(info) = record.psl.as_mut() {
            info.q_block_starts.push(fragment.source_start);
            // the first block's stats were taken when the record was opened
            if record.blocks.len() > 1 {
                if let Some(stats) = &fragment.stats {
                    info.stats += stats;
                }
            }
        }
    }

    for record in &mut records {
        relativize(record)?;
    }
    normalize_orientation(&mut records, psl)?;
    if psl {
        compute_psl_inserts(&mut records)?;
    }
    Ok(records)
}

fn relativize(record: &mut BedLine) -> Result<()> {
    let origin = record.start;
    for block in &mut record.blocks {
        block.start = block.start.checked_sub(origin).ok_or_else(|| {
            LiftoverError::invariant(
                &record.chrom,
                record.start,
                record.end,
                format!("block at {} starts before its record", block.start),
            )
        })?;
    }
    Ok(())
}
