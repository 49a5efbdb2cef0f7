//! Input/output helpers
//!
//! Opens chain and BED inputs with transparent gzip/bzip2 decompression,
//! memory maps large plain files, and maps `-` to stdin/stdout.

use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Threshold for using memory mapping (100MB)
pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Path that stands for stdin or stdout
pub const STDIO_PATH: &str = "-";

/// Compression format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip compressed (.gz)
    Gzip,
    /// Bzip2 compressed (.bz2)
    Bzip2,
}

impl CompressionFormat {
    /// Detect from leading magic bytes
    pub fn from_magic(magic: &[u8]) -> Self {
        if magic.len() >= 2 && magic[0] == 0x1f && magic[1] == 0x8b {
            CompressionFormat::Gzip
        } else if magic.len() >= 3 && magic[..3] == *b"BZh" {
            CompressionFormat::Bzip2
        } else {
            CompressionFormat::Plain
        }
    }
}

/// Detect compression format from file extension, falling back to magic bytes
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => return Ok(CompressionFormat::Gzip),
        Some("bz2") => return Ok(CompressionFormat::Bzip2),
        _ => {}
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let bytes_read = file.read(&mut magic)?;
    Ok(CompressionFormat::from_magic(&magic[..bytes_read]))
}

/// Memory-mapped file reader
pub struct MappedReader {
    mmap: Mmap,
    position: usize,
}

impl MappedReader {
    pub fn new(file: &File) -> io::Result<Self> {
        // SAFETY: the input is not expected to change while it is being read
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, position: 0 })
    }
}

impl Read for MappedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.mmap[self.position..];
        let to_read = buf.len().min(remaining.len());
        buf[..to_read].copy_from_slice(&remaining[..to_read]);
        self.position += to_read;
        Ok(to_read)
    }
}

impl BufRead for MappedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&self.mmap[self.position..])
    }

    fn consume(&mut self, amt: usize) {
        self.position = (self.position + amt).min(self.mmap.len());
    }
}

/// A reader that picks the right strategy for the input it is given
pub enum SmartReader {
    /// Buffered reader for small plain files
    Buffered(BufReader<File>),
    /// Memory-mapped reader for large plain files
    Mapped(MappedReader),
    /// Decompressing reader for gzip/bzip2 input
    Compressed(BufReader<Box<dyn Read + Send>>),
    /// Standard input
    Stdin(BufReader<io::Stdin>),
}

impl SmartReader {
    /// Open a path (or `-` for stdin)
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == STDIO_PATH {
            return Ok(SmartReader::Stdin(BufReader::with_capacity(
                DEFAULT_BUFFER_SIZE,
                io::stdin(),
            )));
        }

        let format = detect_compression(path)?;
        let file = File::open(path)?;
        match format {
            CompressionFormat::Gzip => Ok(Self::compressed(Box::new(
                flate2::read::MultiGzDecoder::new(file),
            ))),
            CompressionFormat::Bzip2 => Ok(Self::compressed(Box::new(
                bzip2::read::BzDecoder::new(file),
            ))),
            CompressionFormat::Plain => {
                if file.metadata()?.len() >= MMAP_THRESHOLD {
                    Ok(SmartReader::Mapped(MappedReader::new(&file)?))
                } else {
                    Ok(SmartReader::Buffered(BufReader::with_capacity(
                        DEFAULT_BUFFER_SIZE,
                        file,
                    )))
                }
            }
        }
    }

    fn compressed(decoder: Box<dyn Read + Send>) -> Self {
        SmartReader::Compressed(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, decoder))
    }

    /// Check if using memory mapping
    pub fn is_mapped(&self) -> bool {
        matches!(self, SmartReader::Mapped(_))
    }
}

impl Read for SmartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SmartReader::Buffered(r) => r.read(buf),
            SmartReader::Mapped(r) => r.read(buf),
            SmartReader::Compressed(r) => r.read(buf),
            SmartReader::Stdin(r) => r.read(buf),
        }
    }
}

impl BufRead for SmartReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            SmartReader::Buffered(r) => r.fill_buf(),
            SmartReader::Mapped(r) => r.fill_buf(),
            SmartReader::Compressed(r) => r.fill_buf(),
            SmartReader::Stdin(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            SmartReader::Buffered(r) => r.consume(amt),
            SmartReader::Mapped(r) => r.consume(amt),
            SmartReader::Compressed(r) => r.consume(amt),
            SmartReader::Stdin(r) => r.consume(amt),
        }
    }
}

/// Open an output path (or `-` for stdout), truncating unless `append` is set
pub fn open_output<P: AsRef<Path>>(path: P, append: bool) -> io::Result<Box<dyn Write + Send>> {
    let path = path.as_ref();
    if path.as_os_str() == STDIO_PATH {
        return Ok(Box::new(BufWriter::with_capacity(
            DEFAULT_BUFFER_SIZE,
            io::stdout(),
        )));
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    Ok(Box::new(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file)))
}
