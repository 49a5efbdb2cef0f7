//! Streaming BED conversion
//!
//! Reads BED lines, lifts each record and writes the results in input
//! order. With more than one thread, all lines are read into memory and
//! lifted in parallel chunks.

use crate::core::{Alignment, LiftoverError, Result};
use crate::formats::{is_header, BedLine, BedReadOptions};
use crate::liftover::{LiftResult, Liftover, OutputFormat};
use rayon::prelude::*;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Chunk size for parallel processing
const CHUNK_SIZE: usize = 10000;

/// Conversion statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    /// Data lines read (headers excluded)
    pub total: usize,
    /// Records that produced at least one output record
    pub mapped: usize,
    pub unmapped: usize,
    /// Records skipped with a warning
    pub skipped: usize,
    /// Output records written
    pub records_out: usize,
}

#[derive(Default)]
struct AtomicStats {
    total: AtomicUsize,
    mapped: AtomicUsize,
    unmapped: AtomicUsize,
    skipped: AtomicUsize,
    records_out: AtomicUsize,
}

impl AtomicStats {
    fn snapshot(&self) -> ConversionStats {
        ConversionStats {
            total: self.total.load(Ordering::Relaxed),
            mapped: self.mapped.load(Ordering::Relaxed),
            unmapped: self.unmapped.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            records_out: self.records_out.load(Ordering::Relaxed),
        }
    }
}

fn write_record<W: Write + ?Sized>(record: &BedLine, output: OutputFormat, out: &mut W) -> Result<()> {
    match output {
        OutputFormat::Bed => record.write_bed(out)?,
        OutputFormat::Psl { with_name } => record.write_psl(out, with_name)?,
    }
    Ok(())
}

/// Lift one input line and write whatever it produces
fn convert_line<A, W>(
    liftover: &Liftover<'_, A>,
    read_options: &BedReadOptions,
    line_number: usize,
    line: &str,
    out: &mut W,
    stats: &AtomicStats,
) -> Result<()>
where
    A: Alignment + ?Sized,
    W: Write + ?Sized,
{
    let output = liftover.options().output;
    if is_header(line) {
        // headers have no PSL equivalent
        if !line.trim().is_empty() && !output.is_psl() {
            writeln!(out, "{}", line)?;
        }
        return Ok(());
    }

    stats.total.fetch_add(1, Ordering::Relaxed);
    let record = BedLine::parse(line, read_options).map_err(|source| LiftoverError::Bed {
        line: line_number,
        source,
    })?;

    match liftover.lift(&record)? {
        LiftResult::Mapped(records) => {
            stats.mapped.fetch_add(1, Ordering::Relaxed);
            stats.records_out.fetch_add(records.len(), Ordering::Relaxed);
            for lifted in &records {
                write_record(lifted, output, out)?;
            }
        }
        LiftResult::Unmapped => {
            stats.unmapped.fetch_add(1, Ordering::Relaxed);
        }
        LiftResult::Skipped(reason) => {
            log::debug!("line {} skipped: {:?}", line_number, reason);
            stats.skipped.fetch_add(1, Ordering::Relaxed);
        }
    }
    Ok(())
}

/// Lift every record read from `reader` into `out`
///
/// Output order follows input order regardless of `threads`. The first
/// parse error or invariant violation aborts the conversion.
pub fn convert_bed<A, R, W>(
    reader: R,
    out: &mut W,
    liftover: &Liftover<'_, A>,
    read_options: &BedReadOptions,
    threads: usize,
) -> Result<ConversionStats>
where
    A: Alignment + ?Sized,
    R: BufRead,
    W: Write + ?Sized,
{
    if threads > 1 {
        convert_bed_parallel(reader, out, liftover, read_options, threads)
    } else {
        convert_bed_sequential(reader, out, liftover, read_options)
    }
}

fn convert_bed_sequential<A, R, W>(
    mut reader: R,
    out: &mut W,
    liftover: &Liftover<'_, A>,
    read_options: &BedReadOptions,
) -> Result<ConversionStats>
where
    A: Alignment + ?Sized,
    R: BufRead,
    W: Write + ?Sized,
{
    let stats = AtomicStats::default();
    let mut line_buf = String::with_capacity(4096);
    let mut line_number = 0;

    loop {
        line_buf.clear();
        if reader.read_line(&mut line_buf)? == 0 {
            break;
        }
        line_number += 1;
        let line = line_buf.trim_end_matches(&['\n', '\r'][..]);
        convert_line(liftover, read_options, line_number, line, out, &stats)?;
    }

    out.flush()?;
    Ok(stats.snapshot())
}

/// Reads all lines into memory, lifts chunks in parallel, then writes the
/// chunks back in order
fn convert_bed_parallel<A, R, W>(
    reader: R,
    out: &mut W,
    liftover: &Liftover<'_, A>,
    read_options: &BedReadOptions,
    threads: usize,
) -> Result<ConversionStats>
where
    A: Alignment + ?Sized,
    R: BufRead,
    W: Write + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| {
            LiftoverError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to create thread pool: {}", e),
            ))
        })?;

    let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
    let stats = AtomicStats::default();

    let chunks: Vec<Result<Vec<u8>>> = pool.install(|| {
        lines
            .par_chunks(CHUNK_SIZE)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let mut buf = Vec::with_capacity(chunk.len() * 64);
                for (i, line) in chunk.iter().enumerate() {
                    let line_number = chunk_index * CHUNK_SIZE + i + 1;
                    let line = line.trim_end_matches('\r');
                    convert_line(liftover, read_options, line_number, line, &mut buf, &stats)?;
                }
                Ok(buf)
            })
            .collect()
    });

    for chunk in chunks {
        out.write_all(&chunk?)?;
    }
    out.flush()?;
    Ok(stats.snapshot())
}
