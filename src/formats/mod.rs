//! Record formats
//!
//! BED records are both the input and the working representation of a
//! lifted interval; PSL is an alternative output rendering of the same
//! records.

pub mod bed;
pub mod psl;

pub use bed::{is_header, BedLine, BedReadOptions, Block, BED_MAX_FIELDS};
pub use psl::PslInfo;
