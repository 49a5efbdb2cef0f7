//! Scenario tests for Liftover against an in-memory alignment
//!
//! **Feature: fast-liftover, 片段组装场景**

use fast_liftover::core::{
    Alignment, IntervalQuery, LiftoverError, MatchStats, RawFragment, Result, SequenceInfo,
    Strand,
};
use fast_liftover::formats::{BedLine, Block};
use fast_liftover::liftover::{
    LiftResult, Liftover, LiftoverOptions, MissedSequences, OutputFormat, SkipReason,
};
use std::collections::HashMap;

/// Alignment that answers fixed intervals with canned fragments
#[derive(Default)]
struct MockAlignment {
    sizes: HashMap<(&'static str, &'static str), u64>,
    answers: HashMap<(String, u64, u64), Vec<RawFragment>>,
}

impl MockAlignment {
    fn new() -> Self {
        let mut mock = Self::default();
        mock.sizes.insert(("src", "chr1"), 10_000);
        mock.sizes.insert(("tgt", "chr1"), 10_000);
        mock.sizes.insert(("tgt", "chr2"), 20_000);
        mock
    }

    fn answer(&mut self, chrom: &str, start: u64, end: u64, fragments: Vec<RawFragment>) {
        self.answers.insert((chrom.to_string(), start, end), fragments);
    }
}

impl Alignment for MockAlignment {
    fn has_genome(&self, genome: &str) -> bool {
        self.sizes.keys().any(|(g, _)| *g == genome)
    }

    fn sequence(&self, genome: &str, name: &str) -> Option<SequenceInfo> {
        self.sizes
            .iter()
            .find(|((g, n), _)| *g == genome && *n == name)
            .map(|(_, &length)| SequenceInfo {
                name: name.to_string(),
                length,
            })
    }

    fn map_interval(&self, query: &IntervalQuery<'_>) -> Result<Vec<RawFragment>> {
        let key = (query.sequence.to_string(), query.start, query.end);
        let mut fragments = self.answers.get(&key).cloned().unwrap_or_default();
        for fragment in &mut fragments {
            let stats = fragment
                .stats
                .unwrap_or_else(|| MatchStats::all_matches(fragment.len()));
            fragment.stats = query.with_stats.then_some(stats);
        }
        Ok(fragments)
    }
}

fn fragment(source_start: u64, chrom: &str, start: u64, end: u64, strand: Strand) -> RawFragment {
    RawFragment {
        source_start,
        chrom: chrom.to_string(),
        start,
        end,
        strand: Some(strand),
        stats: None,
    }
}

fn bed6(start: u64, end: u64) -> BedLine {
    BedLine {
        chrom: "chr1".to_string(),
        start,
        end,
        name: "feat".to_string(),
        strand: Some(Strand::Plus),
        bed_type: 6,
        ..BedLine::default()
    }
}

fn bed12(start: u64, end: u64, blocks: &[(u64, u64)]) -> BedLine {
    BedLine {
        chrom: "chr1".to_string(),
        start,
        end,
        name: "tx".to_string(),
        strand: Some(Strand::Plus),
        thick_start: start,
        thick_end: end,
        bed_type: 12,
        blocks: blocks
            .iter()
            .map(|&(start, length)| Block { start, length })
            .collect(),
        ..BedLine::default()
    }
}

fn psl_options() -> LiftoverOptions {
    LiftoverOptions {
        output: OutputFormat::Psl { with_name: false },
        ..LiftoverOptions::default()
    }
}

fn lift(mock: &MockAlignment, options: &LiftoverOptions, record: &BedLine) -> LiftResult {
    let missed = MissedSequences::new();
    let liftover = Liftover::new(mock, "src", "tgt", options, &missed).unwrap();
    liftover.lift(record).unwrap()
}

fn mapped(result: LiftResult) -> Vec<BedLine> {
    match result {
        LiftResult::Mapped(records) => records,
        other => panic!("expected mapped records, got {:?}", other),
    }
}

#[test]
fn test_simple_interval() {
    let mut mock = MockAlignment::new();
    mock.answer("chr1", 100, 200, vec![fragment(100, "chr1", 500, 600, Strand::Plus)]);

    let out = mapped(lift(&mock, &LiftoverOptions::default(), &bed6(100, 200)));
    assert_eq!(out.len(), 1);
    assert_eq!(
        (out[0].chrom.as_str(), out[0].start, out[0].end, out[0].strand),
        ("chr1", 500, 600, Some(Strand::Plus))
    );
    assert_eq!(out[0].name, "feat");
    assert_eq!(out[0].bed_type, 6);
    assert!(out[0].psl.is_none());
}

#[test]
fn test_unblocked_duplicates_reported_separately() {
    let mut mock = MockAlignment::new();
    mock.answer(
        "chr1",
        100,
        200,
        vec![
            fragment(100, "chr2", 9000, 9100, Strand::Plus),
            fragment(100, "chr1", 500, 600, Strand::Plus),
        ],
    );

    let out = mapped(lift(&mock, &LiftoverOptions::default(), &bed6(100, 200)));
    assert_eq!(out.len(), 2);
    // same source start; ties broken by target end
    assert_eq!(out[0].chrom, "chr1");
    assert_eq!(out[1].chrom, "chr2");
}

#[test]
fn test_duplication_split_in_psl() {
    let mut mock = MockAlignment::new();
    mock.answer(
        "chr1",
        100,
        300,
        vec![
            fragment(150, "chr2", 5000, 5150, Strand::Plus),
            fragment(100, "chr2", 1000, 1100, Strand::Plus),
        ],
    );

    let out = mapped(lift(&mock, &psl_options(), &bed6(100, 300)));
    assert_eq!(out.len(), 2);

    let first = out[0].psl.as_ref().unwrap();
    assert_eq!((out[0].start, out[0].end, out[0].src_start), (1000, 1100, 100));
    assert_eq!((first.q_end, first.q_size, first.t_size), (200, 10_000, 20_000));
    assert_eq!(first.q_block_starts, vec![100]);

    let second = out[1].psl.as_ref().unwrap();
    assert_eq!((out[1].start, out[1].end, out[1].src_start), (5000, 5150, 150));
    assert_eq!(second.q_end, 300);
    assert_eq!(second.stats.matches, 150);
}

#[test]
fn test_duplication_fused_in_bed() {
    let mut mock = MockAlignment::new();
    mock.answer(
        "chr1",
        100,
        300,
        vec![
            fragment(150, "chr2", 5000, 5150, Strand::Plus),
            fragment(100, "chr2", 1000, 1100, Strand::Plus),
        ],
    );
    let record = bed12(100, 300, &[(0, 200)]);

    let out = mapped(lift(&mock, &LiftoverOptions::default(), &record));
    assert_eq!(out.len(), 1);
    assert_eq!((out[0].start, out[0].end), (1000, 5150));
    assert_eq!(
        out[0].blocks,
        vec![Block { start: 0, length: 100 }, Block { start: 4000, length: 150 }]
    );
}

#[test]
fn test_bed12_merge() {
    let mut mock = MockAlignment::new();
    mock.answer("chr1", 100, 150, vec![fragment(100, "chr2", 1000, 1050, Strand::Plus)]);
    mock.answer("chr1", 300, 350, vec![fragment(300, "chr2", 1200, 1250, Strand::Plus)]);
    let record = bed12(100, 400, &[(200, 50), (0, 50)]);

    let out = mapped(lift(&mock, &LiftoverOptions::default(), &record));
    assert_eq!(out.len(), 1);
    assert_eq!((out[0].chrom.as_str(), out[0].start, out[0].end), ("chr2", 1000, 1250));
    assert_eq!(
        out[0].blocks,
        vec![Block { start: 0, length: 50 }, Block { start: 200, length: 50 }]
    );
    assert_eq!((out[0].thick_start, out[0].thick_end), (1000, 1250));
}

#[test]
fn test_bed12_strand_flip() {
    let mut mock = MockAlignment::new();
    mock.answer("chr1", 100, 150, vec![fragment(100, "chr2", 1200, 1250, Strand::Minus)]);
    mock.answer("chr1", 300, 350, vec![fragment(300, "chr2", 1000, 1050, Strand::Minus)]);
    let record = bed12(100, 400, &[(0, 50), (200, 50)]);

    let out = mapped(lift(&mock, &LiftoverOptions::default(), &record));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].strand, Some(Strand::Minus));
    assert_eq!((out[0].start, out[0].end), (1000, 1250));
    assert_eq!(
        out[0].blocks,
        vec![Block { start: 0, length: 50 }, Block { start: 200, length: 50 }]
    );
}

#[test]
fn test_psl_minus_target_keeps_query_order() {
    let mut mock = MockAlignment::new();
    mock.answer("chr1", 100, 150, vec![fragment(100, "chr2", 1200, 1250, Strand::Minus)]);
    mock.answer("chr1", 300, 350, vec![fragment(300, "chr2", 1000, 1050, Strand::Minus)]);
    let record = bed12(100, 400, &[(0, 50), (200, 50)]);

    let out = mapped(lift(&mock, &psl_options(), &record));
    assert_eq!(out.len(), 1);
    let info = out[0].psl.as_ref().unwrap();
    assert_eq!(
        out[0].blocks,
        vec![Block { start: 200, length: 50 }, Block { start: 0, length: 50 }]
    );
    assert_eq!(info.q_block_starts, vec![100, 300]);
    assert_eq!((info.t_num_insert, info.t_base_insert), (1, 150));
    assert_eq!((info.q_num_insert, info.q_base_insert), (1, 150));

    let mut line = Vec::new();
    out[0].write_psl(&mut line, false).unwrap();
    let line = String::from_utf8(line).unwrap();
    let fields: Vec<&str> = line.trim_end().split('\t').collect();
    assert_eq!(fields[8], "+-");
    // 20000 - 1200 - 50 and 20000 - 1000 - 50
    assert_eq!(fields[20], "18750,18950");
}

#[test]
fn test_psl_insert_accounting() {
    let mut mock = MockAlignment::new();
    mock.answer("chr1", 100, 110, vec![fragment(100, "chr2", 500, 510, Strand::Plus)]);
    mock.answer("chr1", 110, 120, vec![fragment(110, "chr2", 515, 525, Strand::Plus)]);
    let record = bed12(100, 120, &[(0, 10), (10, 10)]);

    let out = mapped(lift(&mock, &psl_options(), &record));
    assert_eq!(out.len(), 1);
    let info = out[0].psl.as_ref().unwrap();
    assert_eq!((info.t_num_insert, info.t_base_insert), (1, 5));
    assert_eq!((info.q_num_insert, info.q_base_insert), (0, 0));
    assert_eq!(info.stats.matches, 20);
    assert_eq!((out[0].src_start, info.q_end), (100, 120));
}

#[test]
fn test_missing_sequence_warned_once() {
    let mock = MockAlignment::new();
    let options = LiftoverOptions::default();
    let missed = MissedSequences::new();
    let liftover = Liftover::new(&mock, "src", "tgt", &options, &missed).unwrap();

    let mut record = bed6(0, 10);
    record.chrom = "chrUn".to_string();
    for _ in 0..3 {
        assert_eq!(
            liftover.lift(&record).unwrap(),
            LiftResult::Skipped(SkipReason::MissingSequence)
        );
    }
    assert_eq!(missed.len(), 1);
}

#[test]
fn test_skip_past_sequence_end() {
    let mock = MockAlignment::new();
    assert_eq!(
        lift(&mock, &LiftoverOptions::default(), &bed6(9_990, 10_001)),
        LiftResult::Skipped(SkipReason::PastSequenceEnd)
    );
}

#[test]
fn test_skip_blockless_bed12() {
    let mock = MockAlignment::new();
    assert_eq!(
        lift(&mock, &LiftoverOptions::default(), &bed12(100, 200, &[])),
        LiftResult::Skipped(SkipReason::NoBlocks)
    );
}

#[test]
fn test_unmapped() {
    let mock = MockAlignment::new();
    assert_eq!(
        lift(&mock, &LiftoverOptions::default(), &bed6(100, 200)),
        LiftResult::Unmapped
    );
    assert_eq!(
        lift(&mock, &LiftoverOptions::default(), &bed12(100, 200, &[(0, 100)])),
        LiftResult::Unmapped
    );
}

#[test]
fn test_no_thick_region_stays_empty() {
    let mut mock = MockAlignment::new();
    mock.answer("chr1", 100, 200, vec![fragment(100, "chr1", 500, 600, Strand::Plus)]);
    let record = BedLine {
        bed_type: 8,
        ..bed6(100, 200)
    };

    let out = mapped(lift(&mock, &LiftoverOptions::default(), &record));
    assert_eq!((out[0].thick_start, out[0].thick_end), (0, 0));
}

#[test]
fn test_psl_unknown_strand_is_plus() {
    let mut mock = MockAlignment::new();
    mock.answer("chr1", 100, 200, vec![fragment(100, "chr1", 500, 600, Strand::Plus)]);
    let record = BedLine {
        chrom: "chr1".to_string(),
        start: 100,
        end: 200,
        ..BedLine::default()
    };

    let out = mapped(lift(&mock, &psl_options(), &record));
    assert_eq!(out[0].psl.as_ref().unwrap().q_strand, Strand::Plus);
    assert_eq!(out[0].bed_type, 12);
}

#[test]
fn test_input_record_untouched() {
    let mut mock = MockAlignment::new();
    mock.answer("chr1", 100, 200, vec![fragment(100, "chr1", 500, 600, Strand::Plus)]);
    let record = bed6(100, 200);
    let before = record.clone();

    lift(&mock, &psl_options(), &record);
    assert_eq!(record, before);
}

#[test]
fn test_unknown_coalescence_limit() {
    let mock = MockAlignment::new();
    let options = LiftoverOptions {
        coalescence_limit: Some("anc0".to_string()),
        ..LiftoverOptions::default()
    };
    let missed = MissedSequences::new();
    let err = Liftover::new(&mock, "src", "tgt", &options, &missed)
        .err()
        .unwrap();
    assert!(matches!(err, LiftoverError::UnknownGenome(name) if name == "anc0"));
}
