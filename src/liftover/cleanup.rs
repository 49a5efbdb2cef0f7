//! Post-assembly fix-ups that keep lifted records valid BED

use crate::formats::BedLine;
use log::debug;

/// Fix derived fields and drop degenerate records
///
/// The thick region is not lifted on its own: when the input declares one,
/// each output record's thick region becomes its whole span. Blocked
/// records left without blocks are dropped, and PSL records get their
/// query span recomputed from their blocks.
pub fn clean_results(input: &BedLine, records: Vec<BedLine>) -> Vec<BedLine> {
    let widen_thick = input.bed_type > 6 && input.has_thick_region();
    let blocked = input.bed_type > 9;

    records
        .into_iter()
        .filter_map(|mut record| {
            if widen_thick {
                record.thick_start = record.start;
                record.thick_end = record.end;
            } else if input.bed_type > 6 {
                debug_assert!(!record.has_thick_region());
            }

            if blocked {
                if record.blocks.is_empty() {
                    debug!("dropping {}:{}-{} with no blocks", record.chrom, record.start, record.end);
                    return None;
                }
                if let Some(info) = record.psl.as_mut() {
                    let spans = info.q_block_starts.iter().zip(&record.blocks);
                    if let Some(min_start) = spans.clone().map(|(&q, _)| q).min() {
                        record.src_start = min_start;
                    }
                    info.q_end = spans.map(|(&q, b)| q + b.length).max().unwrap_or(0);
                }
            }
            Some(record)
        })
        .collect()
}
