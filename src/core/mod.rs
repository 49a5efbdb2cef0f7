//! Core alignment functionality
//!
//! This module contains the alignment seam used by liftover, the chain
//! file parser and interval index behind the bundled chain alignment,
//! and shared error and I/O types.

pub mod alignment;
mod chain;
mod error;
mod index;
pub mod io;
mod mapper;

pub use alignment::{Alignment, IntervalQuery, MatchStats, RawFragment, SequenceInfo};
pub use chain::{
    parse_chain_bytes, parse_chain_file, parse_chain_reader, ChainBlock, ChainFile, ChainHeader,
};
pub use error::{BedParseError, ChainParseError, ChainResult, LiftoverError, Result};
pub use index::{ChainIndex, ChainInterval, IntervalValue};
pub use io::{detect_compression, open_output, CompressionFormat, SmartReader};
pub use mapper::{intersect_intervals, ChainMapper, Strand};
