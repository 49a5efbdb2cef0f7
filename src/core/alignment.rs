//! The alignment seam
//!
//! Liftover only needs three things from an alignment store: sequence
//! lookup, sequence length, and a primitive that lifts one absolute
//! interval to a set of raw fragments on the target genome. Everything
//! downstream of that primitive lives in [`crate::liftover`].

use crate::core::{Result, Strand};

/// A sequence found in a genome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInfo {
    pub name: String,
    pub length: u64,
}

/// Per-fragment alignment counts used for PSL output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub matches: u64,
    pub mis_matches: u64,
    pub rep_matches: u64,
    pub n_count: u64,
}

impl MatchStats {
    /// Stats for `len` aligned bases that all match
    pub fn all_matches(len: u64) -> Self {
        Self {
            matches: len,
            ..Self::default()
        }
    }
}

impl std::ops::AddAssign<&MatchStats> for MatchStats {
    fn add_assign(&mut self, other: &MatchStats) {
        self.matches += other.matches;
        self.mis_matches += other.mis_matches;
        self.rep_matches += other.rep_matches;
        self.n_count += other.n_count;
    }
}

/// One raw source-to-target sub-interval returned by [`Alignment::map_interval`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    /// Absolute source coordinate the fragment starts at
    pub source_start: u64,
    /// Target sequence name
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    /// Query strand carried through the alignment; `None` when unknown
    pub strand: Option<Strand>,
    pub stats: Option<MatchStats>,
}

impl RawFragment {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Source coordinate one past the fragment's last base
    pub fn source_end(&self) -> u64 {
        self.source_start + self.len()
    }
}

/// One call of the mapping primitive
#[derive(Debug, Clone, Copy)]
pub struct IntervalQuery<'a> {
    pub source_genome: &'a str,
    pub target_genome: &'a str,
    pub sequence: &'a str,
    /// Absolute, half-open
    pub start: u64,
    pub end: u64,
    pub strand: Option<Strand>,
    /// Ancestor bounding how far up the alignment the search goes
    pub coalescence_limit: Option<&'a str>,
    pub traverse_dupes: bool,
    /// Whether fragments should carry [`MatchStats`]
    pub with_stats: bool,
}

/// Alignment store consumed by the liftover core
///
/// `map_interval` returns fragments in no particular order; fragments may
/// overlap in source coordinates when the source region is duplicated in
/// the target.
pub trait Alignment: Sync {
    fn has_genome(&self, genome: &str) -> bool;

    fn sequence(&self, genome: &str, name: &str) -> Option<SequenceInfo>;

    fn map_interval(&self, query: &IntervalQuery<'_>) -> Result<Vec<RawFragment>>;
}
