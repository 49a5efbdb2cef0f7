//! Property-based tests for fragment assembly and block normalization
//!
//! **Feature: fast-liftover, Property 1-5: 组装不变量**

use fast_liftover::core::{MatchStats, RawFragment, Strand};
use fast_liftover::formats::{BedLine, Block};
use fast_liftover::liftover::assemble::assemble_blocks;
use fast_liftover::liftover::orient::normalize_orientation;
use proptest::prelude::*;

fn strand_strategy() -> impl Strategy<Value = Strand> {
    prop_oneof![Just(Strand::Plus), Just(Strand::Minus)]
}

/// Arbitrary fragments: overlapping sources, mixed strands and sequences
fn fragment_strategy() -> impl Strategy<Value = RawFragment> {
    (
        0u64..500,
        1u64..50,
        0u64..5000,
        strand_strategy(),
        prop::sample::select(vec!["chr2", "chr3"]),
    )
        .prop_map(|(source_start, len, start, strand, chrom)| RawFragment {
            source_start,
            chrom: chrom.to_string(),
            start,
            end: start + len,
            strand: Some(strand),
            stats: Some(MatchStats::all_matches(len)),
        })
}

fn input(strand: Strand) -> BedLine {
    BedLine {
        chrom: "chr1".to_string(),
        start: 0,
        end: 600,
        strand: Some(strand),
        bed_type: 12,
        blocks: vec![Block { start: 0, length: 600 }],
        ..BedLine::default()
    }
}

/// Blocks in the order the output format walks them
fn walk_order(record: &BedLine, psl: bool) -> Vec<Block> {
    let mut blocks = record.blocks.clone();
    if psl && record.strand == Some(Strand::Minus) {
        blocks.reverse();
    }
    blocks
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// **Property 1: 归一化幂等性**
    ///
    /// Normalizing an already normalized record set changes nothing.
    #[test]
    fn prop_normalization_idempotent(
        fragments in prop::collection::vec(fragment_strategy(), 1..20),
        strand in strand_strategy(),
        psl in any::<bool>(),
    ) {
        let records = assemble_blocks(&input(strand), fragments, psl).unwrap();
        let mut again = records.clone();
        normalize_orientation(&mut again, psl).unwrap();
        prop_assert_eq!(again, records);
    }

    /// **Property 2: 块与查询起点数量一致**
    #[test]
    fn prop_block_query_parity(
        fragments in prop::collection::vec(fragment_strategy(), 1..20),
        strand in strand_strategy(),
    ) {
        let records = assemble_blocks(&input(strand), fragments, true).unwrap();
        for record in &records {
            let info = record.psl.as_ref().unwrap();
            prop_assert_eq!(record.blocks.len(), info.q_block_starts.len());
        }
    }

    /// **Property 3: 块覆盖范围**
    ///
    /// Relative blocks never leave `[start, end)`, and together they reach
    /// both ends.
    #[test]
    fn prop_blocks_within_record(
        fragments in prop::collection::vec(fragment_strategy(), 1..20),
        strand in strand_strategy(),
        psl in any::<bool>(),
    ) {
        let records = assemble_blocks(&input(strand), fragments, psl).unwrap();
        for record in &records {
            let span = record.end - record.start;
            prop_assert!(record.blocks.iter().all(|b| b.end() <= span));
            prop_assert_eq!(record.blocks.iter().map(|b| b.start).min(), Some(0));
            prop_assert_eq!(record.blocks.iter().map(|b| b.end()).max(), Some(span));
        }
    }

    /// **Property 4: 块间距非负**
    ///
    /// Walking blocks in output order, no block starts before the end of
    /// the previous one.
    #[test]
    fn prop_no_backward_steps(
        fragments in prop::collection::vec(fragment_strategy(), 1..20),
        strand in strand_strategy(),
        psl in any::<bool>(),
    ) {
        let records = assemble_blocks(&input(strand), fragments, psl).unwrap();
        for record in &records {
            for pair in walk_order(record, psl).windows(2) {
                prop_assert!(pair[1].start >= pair[0].end());
            }
        }
    }

    /// **Property 5: 片段守恒**
    ///
    /// Every fragment ends up as exactly one block, and target inserts
    /// account for all of a PSL record's unaligned span.
    #[test]
    fn prop_fragments_conserved(
        fragments in prop::collection::vec(fragment_strategy(), 1..20),
        strand in strand_strategy(),
    ) {
        let count = fragments.len();
        let records = assemble_blocks(&input(strand), fragments, true).unwrap();
        prop_assert_eq!(records.iter().map(|r| r.blocks.len()).sum::<usize>(), count);

        for record in &records {
            let info = record.psl.as_ref().unwrap();
            let aligned: u64 = record.blocks.iter().map(|b| b.length).sum();
            prop_assert_eq!(aligned + info.t_base_insert, record.end - record.start);
            prop_assert_eq!(info.stats.matches, aligned);
        }
    }
}
