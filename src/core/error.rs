//! Error types for FastLiftover
//!
//! Skippable input problems (missing sequence, interval past the end of
//! its sequence, empty block list) are not errors: they are reported as
//! warnings and the record is skipped. Everything here aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for liftover operations
#[derive(Debug, Error)]
pub enum LiftoverError {
    /// Chain file parsing errors
    #[error("Chain parse error: {0}")]
    ChainParse(#[from] ChainParseError),

    /// Malformed BED input
    #[error("Invalid BED input at line {line}: {source}")]
    Bed {
        line: usize,
        #[source]
        source: BedParseError,
    },

    /// Genome not present in the alignment
    #[error("Genome not found in alignment: {0}")]
    UnknownGenome(String),

    /// The alignment cannot map between the requested genomes
    #[error("Alignment has no mapping from genome {source_genome} to genome {target_genome}")]
    UnsupportedGenomePair {
        source_genome: String,
        target_genome: String,
    },

    /// Internal consistency check failed while assembling output records
    #[error("Liftover invariant violated for {chrom}:{start}-{end}: {message}")]
    Invariant {
        chrom: String,
        start: u64,
        end: u64,
        message: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LiftoverError {
    pub(crate) fn invariant(chrom: &str, start: u64, end: u64, message: impl Into<String>) -> Self {
        LiftoverError::Invariant {
            chrom: chrom.to_string(),
            start,
            end,
            message: message.into(),
        }
    }
}

/// Errors that can occur during chain file parsing
#[derive(Debug, Error)]
pub enum ChainParseError {
    /// Invalid chain header format
    #[error("Invalid chain header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },

    /// Invalid data line format
    #[error("Invalid data line at line {line}: {message}")]
    InvalidDataLine { line: usize, message: String },

    /// Strand must be '+' or '-'
    #[error("Strand must be '+' or '-', got '{strand}' at line {line}")]
    InvalidStrand { line: usize, strand: String },

    /// Failed to parse integer
    #[error("Failed to parse {field} '{value}' at line {line}")]
    ParseInt {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// Coordinates outside the declared sequence or reversed
    #[error("Invalid coordinates at line {line}: {message}")]
    InvalidCoordinates { line: usize, message: String },

    /// Data line outside of any chain
    #[error("Data line without a preceding chain header at line {0}")]
    OrphanDataLine(usize),

    /// File not found
    #[error("Chain file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChainParseError {
    /// Line number the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ChainParseError::InvalidHeader { line, .. }
            | ChainParseError::InvalidDataLine { line, .. }
            | ChainParseError::InvalidStrand { line, .. }
            | ChainParseError::ParseInt { line, .. }
            | ChainParseError::InvalidCoordinates { line, .. } => Some(*line),
            ChainParseError::OrphanDataLine(line) => Some(*line),
            ChainParseError::FileNotFound(_) | ChainParseError::Io(_) => None,
        }
    }
}

/// BED line parsing error
#[derive(Debug, Error)]
pub enum BedParseError {
    #[error("Empty line")]
    EmptyLine,

    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("Invalid strand '{0}'")]
    InvalidStrand(String),

    #[error("Start ({start}) > end ({end})")]
    InvalidRange { start: u64, end: u64 },

    #[error("Block list mismatch: {count} blocks declared, {sizes} sizes, {starts} starts")]
    BlockCountMismatch {
        count: usize,
        sizes: usize,
        starts: usize,
    },

    #[error("Unsupported BED version {0}: expected 3 to 12")]
    UnsupportedVersion(usize),
}

/// Result type alias for liftover operations
pub type Result<T> = std::result::Result<T, LiftoverError>;

/// Result type alias for chain parsing operations
pub type ChainResult<T> = std::result::Result<T, ChainParseError>;
