//! Chain file parsing
//!
//! Parses UCSC chain format files, the pairwise alignment format used by
//! [`ChainMapper`](crate::core::ChainMapper).
//!
//! # Chain File Format
//!
//! ```text
//! chain score tName tSize tStrand tStart tEnd qName qSize qStrand qStart qEnd id
//! size dt dq
//! size dt dq
//! size
//! ```
//!
//! UCSC "target" (t) is the genome we lift from and UCSC "query" (q) the
//! genome we lift to, so the t fields become `source_*` and the q fields
//! become `target_*` here.

use crate::core::error::{ChainParseError, ChainResult};
use crate::core::io::SmartReader;
use crate::core::Strand;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Parsed chain header
#[derive(Debug, Clone)]
pub struct ChainHeader {
    pub score: u64,
    pub source_name: String,
    pub source_size: u64,
    pub source_strand: Strand,
    pub source_start: u64,
    pub source_end: u64,
    pub target_name: String,
    pub target_size: u64,
    pub target_strand: Strand,
    pub target_start: u64,
    pub target_end: u64,
    pub chain_id: String,
}

fn parse_u64(field: &'static str, value: &str, line: usize) -> ChainResult<u64> {
    value.parse::<u64>().map_err(|_| ChainParseError::ParseInt {
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_strand(value: &str, line: usize) -> ChainResult<Strand> {
    let mut chars = value.chars();
    match (chars.next().and_then(Strand::from_char), chars.next()) {
        (Some(strand), None) => Ok(strand),
        _ => Err(ChainParseError::InvalidStrand {
            line,
            strand: value.to_string(),
        }),
    }
}

fn check_range(
    what: &str,
    start: u64,
    end: u64,
    size: u64,
    line: usize,
) -> ChainResult<()> {
    if start > end {
        return Err(ChainParseError::InvalidCoordinates {
            line,
            message: format!("{} start ({}) > {} end ({})", what, start, what, end),
        });
    }
    if end > size {
        return Err(ChainParseError::InvalidCoordinates {
            line,
            message: format!("{} end ({}) > {} size ({})", what, end, what, size),
        });
    }
    Ok(())
}

impl ChainHeader {
    /// Parse a chain header line
    pub fn parse(line: &str, line_number: usize) -> ChainResult<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() < 12 {
            return Err(ChainParseError::InvalidHeader {
                line: line_number,
                message: format!("expected 12+ fields, got {}", fields.len()),
            });
        }
        if fields[0] != "chain" {
            return Err(ChainParseError::InvalidHeader {
                line: line_number,
                message: format!("expected 'chain' keyword, got '{}'", fields[0]),
            });
        }

        let header = Self {
            score: parse_u64("score", fields[1], line_number)?,
            source_name: fields[2].to_string(),
            source_size: parse_u64("source size", fields[3], line_number)?,
            source_strand: parse_strand(fields[4], line_number)?,
            source_start: parse_u64("source start", fields[5], line_number)?,
            source_end: parse_u64("source end", fields[6], line_number)?,
            target_name: fields[7].to_string(),
            target_size: parse_u64("target size", fields[8], line_number)?,
            target_strand: parse_strand(fields[9], line_number)?,
            target_start: parse_u64("target start", fields[10], line_number)?,
            target_end: parse_u64("target end", fields[11], line_number)?,
            chain_id: fields.get(12).map(|s| s.to_string()).unwrap_or_default(),
        };

        check_range(
            "source",
            header.source_start,
            header.source_end,
            header.source_size,
            line_number,
        )?;
        check_range(
            "target",
            header.target_start,
            header.target_end,
            header.target_size,
            line_number,
        )?;
        Ok(header)
    }
}

/// One gap-free aligned block, in forward-strand coordinates on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainBlock {
    pub source_chrom: String,
    pub source_start: u64,
    pub source_end: u64,
    pub target_chrom: String,
    pub target_start: u64,
    pub target_end: u64,
    /// Relative orientation of the target side
    pub strand: Strand,
    /// Score of the chain this block belongs to
    pub score: u64,
    pub chain_id: String,
}

impl ChainBlock {
    /// The same block seen from the other genome
    pub fn reversed(&self) -> Self {
        Self {
            source_chrom: self.target_chrom.clone(),
            source_start: self.target_start,
            source_end: self.target_end,
            target_chrom: self.source_chrom.clone(),
            target_start: self.source_start,
            target_end: self.source_end,
            strand: self.strand,
            score: self.score,
            chain_id: self.chain_id.clone(),
        }
    }
}

/// Data line in a chain file (size, dt, dq)
#[derive(Debug, Clone, Copy)]
struct DataLine {
    size: u64,
    /// UCSC "dt"
    source_gap: u64,
    /// UCSC "dq"
    target_gap: u64,
}

impl DataLine {
    fn parse(line: &str, line_number: usize) -> ChainResult<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (size, source_gap, target_gap) = match fields.as_slice() {
            [size] => (parse_u64("block size", size, line_number)?, 0, 0),
            [size, dt, dq] => (
                parse_u64("block size", size, line_number)?,
                parse_u64("source gap (dt)", dt, line_number)?,
                parse_u64("target gap (dq)", dq, line_number)?,
            ),
            _ => {
                return Err(ChainParseError::InvalidDataLine {
                    line: line_number,
                    message: format!("expected 1 or 3 fields, got {}", fields.len()),
                })
            }
        };
        if size == 0 {
            return Err(ChainParseError::InvalidDataLine {
                line: line_number,
                message: "block size must be greater than 0".to_string(),
            });
        }
        Ok(Self {
            size,
            source_gap,
            target_gap,
        })
    }
}

/// Result of parsing a chain file
#[derive(Debug, Clone, Default)]
pub struct ChainFile {
    pub blocks: Vec<ChainBlock>,
    pub source_chrom_sizes: HashMap<String, u64>,
    pub target_chrom_sizes: HashMap<String, u64>,
}

/// Walk position inside the chain currently being read
struct OpenChain {
    header: ChainHeader,
    source_pos: u64,
    target_pos: u64,
}

impl OpenChain {
    /// Project a strand-relative offset to forward-strand coordinates
    fn forward(strand: Strand, size: u64, pos: u64, len: u64) -> (u64, u64) {
        match strand {
            Strand::Plus => (pos, pos + len),
            Strand::Minus => (size - (pos + len), size - pos),
        }
    }

    fn push_block(&mut self, data: DataLine, line_number: usize) -> ChainResult<ChainBlock> {
        let h = &self.header;
        if self.source_pos + data.size > h.source_end || self.target_pos + data.size > h.target_end {
            return Err(ChainParseError::InvalidCoordinates {
                line: line_number,
                message: format!("block runs past the end of chain {}", h.chain_id),
            });
        }

        let (source_start, source_end) =
            Self::forward(h.source_strand, h.source_size, self.source_pos, data.size);
        let (target_start, target_end) =
            Self::forward(h.target_strand, h.target_size, self.target_pos, data.size);
        let block = ChainBlock {
            source_chrom: h.source_name.clone(),
            source_start,
            source_end,
            target_chrom: h.target_name.clone(),
            target_start,
            target_end,
            strand: h.source_strand.combine(h.target_strand),
            score: h.score,
            chain_id: h.chain_id.clone(),
        };

        self.source_pos += data.size + data.source_gap;
        self.target_pos += data.size + data.target_gap;
        Ok(block)
    }
}

/// Parse a chain file from any buffered reader
pub fn parse_chain_reader<R: BufRead>(reader: R) -> ChainResult<ChainFile> {
    let mut result = ChainFile::default();
    let mut current: Option<OpenChain> = None;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line_result?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            current = None;
            continue;
        }

        if trimmed.starts_with("chain") {
            let header = ChainHeader::parse(trimmed, line_number)?;
            result
                .source_chrom_sizes
                .insert(header.source_name.clone(), header.source_size);
            result
                .target_chrom_sizes
                .insert(header.target_name.clone(), header.target_size);
            current = Some(OpenChain {
                source_pos: header.source_start,
                target_pos: header.target_start,
                header,
            });
        } else {
            let chain = current
                .as_mut()
                .ok_or(ChainParseError::OrphanDataLine(line_number))?;
            let data = DataLine::parse(trimmed, line_number)?;
            result.blocks.push(chain.push_block(data, line_number)?);
        }
    }

    Ok(result)
}

/// Parse a chain file from a path; gzip and bzip2 are detected automatically
pub fn parse_chain_file(path: &Path) -> ChainResult<ChainFile> {
    if !path.exists() {
        return Err(ChainParseError::FileNotFound(path.to_path_buf()));
    }
    parse_chain_reader(SmartReader::open(path)?)
}

/// Parse chain data held in memory
pub fn parse_chain_bytes(data: &[u8]) -> ChainResult<ChainFile> {
    parse_chain_reader(data)
}
