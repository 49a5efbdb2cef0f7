//! Interval index for chain blocks
//!
//! Uses rust-lapper for O(log n + k) overlap queries per source sequence.

use crate::core::chain::ChainBlock;
use crate::core::Strand;
use rust_lapper::{Interval, Lapper};
use std::collections::HashMap;

/// Target side of an indexed block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalValue {
    pub target_chrom: String,
    /// Forward-strand start on the target
    pub target_start: u64,
    pub target_end: u64,
    /// Relative orientation of source and target
    pub strand: Strand,
    /// Score of the owning chain; higher wins when duplicates are dropped
    pub score: u64,
}

/// Type alias for chain intervals
pub type ChainInterval = Interval<u64, IntervalValue>;

/// Chain blocks indexed by source sequence
pub struct ChainIndex {
    maps: HashMap<String, Lapper<u64, IntervalValue>>,
}

impl ChainIndex {
    /// Build an index over the source side of `blocks`
    pub fn from_blocks<I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = ChainBlock>,
    {
        let mut blocks_by_chrom: HashMap<String, Vec<ChainInterval>> = HashMap::new();

        for block in blocks {
            let interval = Interval {
                start: block.source_start,
                stop: block.source_end,
                val: IntervalValue {
                    target_chrom: block.target_chrom,
                    target_start: block.target_start,
                    target_end: block.target_end,
                    strand: block.strand,
                    score: block.score,
                },
            };
            blocks_by_chrom
                .entry(block.source_chrom)
                .or_default()
                .push(interval);
        }

        let maps = blocks_by_chrom
            .into_iter()
            .map(|(chrom, intervals)| (chrom, Lapper::new(intervals)))
            .collect();
        Self { maps }
    }

    /// Blocks overlapping `[start, end)` on `chrom`
    pub fn query_intervals(&self, chrom: &str, start: u64, end: u64) -> Vec<&ChainInterval> {
        match self.maps.get(chrom) {
            Some(lapper) => lapper.find(start, end).collect(),
            None => Vec::new(),
        }
    }

    /// Total number of indexed blocks
    pub fn total_intervals(&self) -> usize {
        self.maps.values().map(|l| l.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chain::parse_chain_bytes;

    fn create_test_index() -> ChainIndex {
        let chain_data = b"\
chain 1000 chr1 1000 + 100 500 chr1 1000 + 100 500 1
100 50 50
100 50 50
100

chain 500 chr2 2000 + 0 200 chr2 2000 + 0 200 2
100 50 50
50
";
        ChainIndex::from_blocks(parse_chain_bytes(chain_data).unwrap().blocks)
    }

    #[test]
    fn test_index_creation() {
        let index = create_test_index();
        assert_eq!(index.total_intervals(), 5);
        assert!(index.query_intervals("chr3", 0, 1000).is_empty());
    }

    #[test]
    fn test_query() {
        let index = create_test_index();

        let hits = index.query_intervals("chr1", 150, 160);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].val.target_start, 100);
        assert_eq!(hits[0].val.target_end, 200);
        assert_eq!(hits[0].val.score, 1000);

        assert!(index.query_intervals("chr1", 50, 60).is_empty());
        assert_eq!(index.query_intervals("chr1", 100, 500).len(), 3);
        assert!(index.query_intervals("chrUn", 0, 10).is_empty());
    }

    #[test]
    fn test_half_open_boundaries() {
        let index = create_test_index();
        // first block is [100, 200), second [250, 350)
        assert!(index.query_intervals("chr1", 200, 250).is_empty());
        assert_eq!(index.query_intervals("chr1", 199, 251).len(), 2);
    }
}
