//! Chain-backed coordinate mapping
//!
//! [`ChainMapper`] implements [`Alignment`] on top of a pairwise chain file.
//! The mapping algorithm per query interval:
//! 1. Query the interval index for overlapping chain blocks
//! 2. For each overlapping block, compute the intersection
//! 3. Project the intersection onto the target using the block offset
//! 4. Combine the query strand with the block orientation

use crate::core::alignment::{Alignment, IntervalQuery, MatchStats, RawFragment, SequenceInfo};
use crate::core::chain::{parse_chain_file, ChainFile};
use crate::core::error::{ChainResult, LiftoverError, Result};
use crate::core::index::{ChainIndex, IntervalValue};
use std::collections::HashMap;
use std::path::Path;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    /// Parse strand from char
    ///
    /// # Examples
    /// ```
    /// use fast_liftover::core::Strand;
    /// assert_eq!(Strand::from_char('+'), Some(Strand::Plus));
    /// assert_eq!(Strand::from_char('-'), Some(Strand::Minus));
    /// assert_eq!(Strand::from_char('.'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            _ => None,
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }

    /// Combine a query strand with an alignment orientation
    ///
    /// # Examples
    /// ```
    /// use fast_liftover::core::Strand;
    /// assert_eq!(Strand::Plus.combine(Strand::Minus), Strand::Minus);
    /// assert_eq!(Strand::Minus.combine(Strand::Minus), Strand::Plus);
    /// ```
    pub fn combine(&self, other: Strand) -> Strand {
        if *self == other {
            Strand::Plus
        } else {
            Strand::Minus
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Intersection of `[start1, end1)` and `[start2, end2)`, if non-empty
#[inline]
pub fn intersect_intervals(start1: u64, end1: u64, start2: u64, end2: u64) -> Option<(u64, u64)> {
    if start1 >= end2 || end1 <= start2 {
        return None;
    }
    Some((start1.max(start2), end1.min(end2)))
}

/// Target coordinates of `size` bases found `left_offset` bases into a block
#[inline]
fn project(block: &IntervalValue, left_offset: u64, size: u64) -> (u64, u64) {
    let target_start = match block.strand {
        Strand::Plus => block.target_start + left_offset,
        // reverse blocks run backwards from the forward-strand end
        Strand::Minus => block.target_end - left_offset - size,
    };
    (target_start, target_start + size)
}

/// Pairwise alignment between two named genomes, read from a chain file
///
/// Both directions are indexed, so a chain from `A` to `B` lifts `A -> B`
/// and `B -> A`.
pub struct ChainMapper {
    source_genome: String,
    target_genome: String,
    forward: ChainIndex,
    reverse: ChainIndex,
    source_sizes: HashMap<String, u64>,
    target_sizes: HashMap<String, u64>,
}

impl ChainMapper {
    /// Build from parsed chain data; `source_genome` names the chain's
    /// reference (UCSC "t") side and `target_genome` its query side
    pub fn from_chain_data(
        chain_file: ChainFile,
        source_genome: impl Into<String>,
        target_genome: impl Into<String>,
    ) -> Self {
        let reverse = ChainIndex::from_blocks(chain_file.blocks.iter().map(|b| b.reversed()));
        let forward = ChainIndex::from_blocks(chain_file.blocks);
        Self {
            source_genome: source_genome.into(),
            target_genome: target_genome.into(),
            forward,
            reverse,
            source_sizes: chain_file.source_chrom_sizes,
            target_sizes: chain_file.target_chrom_sizes,
        }
    }

    /// Load a (possibly compressed) chain file
    pub fn from_chain_file<P: AsRef<Path>>(
        path: P,
        source_genome: impl Into<String>,
        target_genome: impl Into<String>,
    ) -> ChainResult<Self> {
        let chain_file = parse_chain_file(path.as_ref())?;
        Ok(Self::from_chain_data(chain_file, source_genome, target_genome))
    }

    pub fn source_genome(&self) -> &str {
        &self.source_genome
    }

    pub fn target_genome(&self) -> &str {
        &self.target_genome
    }

    /// Number of aligned blocks indexed per direction
    pub fn block_count(&self) -> usize {
        self.forward.total_intervals()
    }

    fn sizes(&self, genome: &str) -> Option<&HashMap<String, u64>> {
        if genome == self.source_genome {
            Some(&self.source_sizes)
        } else if genome == self.target_genome {
            Some(&self.target_sizes)
        } else {
            None
        }
    }

    fn index_for(&self, source: &str, target: &str) -> Result<&ChainIndex> {
        if source == self.source_genome && target == self.target_genome {
            Ok(&self.forward)
        } else if source == self.target_genome && target == self.source_genome {
            Ok(&self.reverse)
        } else {
            Err(LiftoverError::UnsupportedGenomePair {
                source_genome: source.to_string(),
                target_genome: target.to_string(),
            })
        }
    }
}

/// Sub-ranges of `[start, end)` not covered by any range in `covered`
fn uncovered(start: u64, end: u64, covered: &[(u64, u64)]) -> Vec<(u64, u64)> {
    let mut overlapping: Vec<(u64, u64)> = covered
        .iter()
        .copied()
        .filter(|&(s, e)| s < end && start < e)
        .collect();
    overlapping.sort_unstable();

    let mut free = Vec::new();
    let mut cursor = start;
    for (s, e) in overlapping {
        if s > cursor {
            free.push((cursor, s));
        }
        cursor = cursor.max(e);
    }
    if cursor < end {
        free.push((cursor, end));
    }
    free
}

impl Alignment for ChainMapper {
    fn has_genome(&self, genome: &str) -> bool {
        self.sizes(genome).is_some()
    }

    fn sequence(&self, genome: &str, name: &str) -> Option<SequenceInfo> {
        let length = *self.sizes(genome)?.get(name)?;
        Some(SequenceInfo {
            name: name.to_string(),
            length,
        })
    }

    fn map_interval(&self, query: &IntervalQuery<'_>) -> Result<Vec<RawFragment>> {
        let index = self.index_for(query.source_genome, query.target_genome)?;
        if let Some(limit) = query.coalescence_limit {
            log::debug!("coalescence limit {} has no effect on a pairwise chain alignment", limit);
        }

        // (source start, offset into block, size, block)
        let mut hits: Vec<(u64, u64, u64, &IntervalValue)> = index
            .query_intervals(query.sequence, query.start, query.end)
            .into_iter()
            .filter_map(|iv| {
                intersect_intervals(query.start, query.end, iv.start, iv.stop)
                    .map(|(s, e)| (s, s - iv.start, e - s, &iv.val))
            })
            .collect();

        if !query.traverse_dupes {
            // best chain first; later hits may not reuse a source base
            hits.sort_by(|a, b| b.3.score.cmp(&a.3.score).then(a.0.cmp(&b.0)));
        }

        let mut fragments = Vec::with_capacity(hits.len());
        let mut kept: Vec<(u64, u64)> = Vec::new();
        for (source_start, left_offset, size, block) in hits {
            let pieces = if query.traverse_dupes {
                vec![(source_start, source_start + size)]
            } else {
                let free = uncovered(source_start, source_start + size, &kept);
                kept.extend_from_slice(&free);
                free
            };

            for (piece_start, piece_end) in pieces {
                let piece_size = piece_end - piece_start;
                let (start, end) = project(block, left_offset + (piece_start - source_start), piece_size);
                fragments.push(RawFragment {
                    source_start: piece_start,
                    chrom: block.target_chrom.clone(),
                    start,
                    end,
                    strand: query.strand.map(|s| s.combine(block.strand)),
                    stats: query.with_stats.then(|| MatchStats::all_matches(piece_size)),
                });
            }
        }
        Ok(fragments)
    }
}
