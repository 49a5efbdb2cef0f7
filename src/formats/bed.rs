//! BED format records
//!
//! Parses BED3 through BED12 lines (plus extra trailing columns) into
//! [`BedLine`] and writes them back with the same number of columns.

use crate::core::{BedParseError, Strand};
use crate::formats::psl::PslInfo;
use memchr::memchr_iter;
use std::io::{self, Write};

/// Number of standard BED columns
pub const BED_MAX_FIELDS: usize = 12;

/// One block of a BED12 record
///
/// `start` is absolute while a record is being assembled and relative to
/// the record start once it is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Block {
    pub start: u64,
    pub length: u64,
}

impl Block {
    pub fn end(&self) -> u64 {
        self.start + self.length
    }
}

/// An annotated genomic interval
#[derive(Debug, Clone, PartialEq)]
pub struct BedLine {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub score: String,
    pub strand: Option<Strand>,
    /// Only meaningful when `bed_type > 6`
    pub thick_start: u64,
    /// Only meaningful when `bed_type > 7`
    pub thick_end: u64,
    pub item_rgb: String,
    /// Only meaningful when `bed_type > 9`
    pub blocks: Vec<Block>,
    /// Columns after the twelfth, kept verbatim
    pub extra: Vec<String>,
    /// Number of standard columns (3 to 12)
    pub bed_type: usize,
    /// Absolute source coordinate this record was lifted from
    pub src_start: u64,
    /// Present only when PSL output was requested
    pub psl: Option<PslInfo>,
}

impl Default for BedLine {
    fn default() -> Self {
        Self {
            chrom: String::new(),
            start: 0,
            end: 0,
            name: String::new(),
            score: "0".to_string(),
            strand: None,
            thick_start: 0,
            thick_end: 0,
            item_rgb: "0".to_string(),
            blocks: Vec::new(),
            extra: Vec::new(),
            bed_type: 3,
            src_start: 0,
            psl: None,
        }
    }
}

/// How input BED lines are read
#[derive(Debug, Clone, Copy, Default)]
pub struct BedReadOptions {
    /// Force the BED version instead of counting columns
    pub version: Option<usize>,
    /// Keep columns beyond the declared version and write them back out
    pub keep_extra: bool,
}

/// Comment, track, browser and blank lines
pub fn is_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}

fn parse_u64(field: &'static str, value: &str) -> Result<u64, BedParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| BedParseError::InvalidNumber(field, value.to_string()))
}

fn parse_list(field: &'static str, value: &str) -> Result<Vec<u64>, BedParseError> {
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_u64(field, s))
        .collect()
}

fn parse_strand(value: &str) -> Result<Option<Strand>, BedParseError> {
    match value {
        "+" => Ok(Some(Strand::Plus)),
        "-" => Ok(Some(Strand::Minus)),
        "." => Ok(None),
        other => Err(BedParseError::InvalidStrand(other.to_string())),
    }
}

/// Split on tabs without allocating per field
fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(BED_MAX_FIELDS);
    let mut field_start = 0;
    for tab in memchr_iter(b'\t', bytes) {
        fields.push(&line[field_start..tab]);
        field_start = tab + 1;
    }
    fields.push(&line[field_start..]);
    fields
}

impl BedLine {
    /// Parse one data line
    pub fn parse(line: &str, options: &BedReadOptions) -> Result<Self, BedParseError> {
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        if line.is_empty() {
            return Err(BedParseError::EmptyLine);
        }

        let fields = split_fields(line);
        let bed_type = match options.version {
            Some(v) if !(3..=BED_MAX_FIELDS).contains(&v) => {
                return Err(BedParseError::UnsupportedVersion(v))
            }
            Some(v) => v,
            None => fields.len().min(BED_MAX_FIELDS),
        };
        if fields.len() < bed_type.max(3) {
            return Err(BedParseError::TooFewFields {
                expected: bed_type.max(3),
                found: fields.len(),
            });
        }

        let mut bed = BedLine {
            chrom: fields[0].to_string(),
            start: parse_u64("start", fields[1])?,
            end: parse_u64("end", fields[2])?,
            bed_type,
            ..BedLine::default()
        };
        if bed.start > bed.end {
            return Err(BedParseError::InvalidRange {
                start: bed.start,
                end: bed.end,
            });
        }
        bed.src_start = bed.start;

        if bed_type > 3 {
            bed.name = fields[3].to_string();
        }
        if bed_type > 4 {
            bed.score = fields[4].to_string();
        }
        if bed_type > 5 {
            bed.strand = parse_strand(fields[5])?;
        }
        if bed_type > 6 {
            bed.thick_start = parse_u64("thickStart", fields[6])?;
        }
        if bed_type > 7 {
            bed.thick_end = parse_u64("thickEnd", fields[7])?;
        }
        if bed_type > 8 {
            bed.item_rgb = fields[8].to_string();
        }
        if bed_type >= BED_MAX_FIELDS {
            let count = parse_u64("blockCount", fields[9])? as usize;
            let sizes = parse_list("blockSizes", fields[10])?;
            let starts = parse_list("blockStarts", fields[11])?;
            if sizes.len() != count || starts.len() != count {
                return Err(BedParseError::BlockCountMismatch {
                    count,
                    sizes: sizes.len(),
                    starts: starts.len(),
                });
            }
            bed.blocks = starts
                .into_iter()
                .zip(sizes)
                .map(|(start, length)| Block { start, length })
                .collect();
        }
        if options.keep_extra {
            bed.extra = fields[bed_type..].iter().map(|s| s.to_string()).collect();
        }

        Ok(bed)
    }

    /// Fill in every optional column so the record can be treated as BED12
    ///
    /// An unblocked interval becomes a single block covering all of it.
    pub fn expand_to_bed12(&mut self) {
        if self.bed_type >= BED_MAX_FIELDS {
            return;
        }
        if self.bed_type < 7 {
            self.thick_start = self.start;
        }
        if self.bed_type < 8 {
            self.thick_end = self.end;
        }
        if self.bed_type < 9 {
            self.item_rgb = "0".to_string();
        }
        self.blocks = vec![Block {
            start: 0,
            length: self.end - self.start,
        }];
        self.bed_type = BED_MAX_FIELDS;
    }

    /// Whether the record declares a thick region at all
    pub fn has_thick_region(&self) -> bool {
        self.thick_start != 0 || self.thick_end != 0
    }

    pub fn strand_char(&self) -> char {
        self.strand.map(|s| s.to_char()).unwrap_or('.')
    }

    /// Write as a BED line with `bed_type` columns plus any kept extras
    pub fn write_bed<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}\t{}\t{}", self.chrom, self.start, self.end)?;
        if self.bed_type > 3 {
            write!(out, "\t{}", self.name)?;
        }
        if self.bed_type > 4 {
            write!(out, "\t{}", self.score)?;
        }
        if self.bed_type > 5 {
            write!(out, "\t{}", self.strand_char())?;
        }
        if self.bed_type > 6 {
            write!(out, "\t{}", self.thick_start)?;
        }
        if self.bed_type > 7 {
            write!(out, "\t{}", self.thick_end)?;
        }
        if self.bed_type > 8 {
            write!(out, "\t{}", self.item_rgb)?;
        }
        if self.bed_type > 9 {
            write!(out, "\t{}", self.blocks.len())?;
        }
        if self.bed_type > 10 {
            write!(out, "\t{}", join(self.blocks.iter().map(|b| b.length)))?;
        }
        if self.bed_type > 11 {
            write!(out, "\t{}", join(self.blocks.iter().map(|b| b.start)))?;
        }
        for field in &self.extra {
            write!(out, "\t{}", field)?;
        }
        writeln!(out)
    }
}

pub(crate) fn join<I: Iterator<Item = u64>>(values: I) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
