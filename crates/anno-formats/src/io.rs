//! File opening with transparent gzip support
//!
//! Paths ending in `.gz` are decompressed on read and compressed on write
//! using flate2. Annotation releases are commonly distributed as
//! `goa_human.gaf.gz`, sometimes as several concatenated gzip members, so
//! input uses `MultiGzDecoder`.
//!
//! A gzip stream is only complete once its trailer is written. Writers end
//! their output through [`FinishWrite::try_finish`] so that a failed trailer
//! write is reported instead of being lost in `Drop`.

use anno_common::{AnnoError, Result};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Stdout, Write};
use std::path::Path;
use tracing::debug;

pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Open a (possibly gzipped) annotation file for buffered reading
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| {
        AnnoError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open {}: {}", path.display(), e),
        ))
    })?;

    if is_gzip_path(path) {
        debug!("Reading gzip input {}", path.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Output that has an explicit end of stream
///
/// The default just flushes. Borrowed outputs forward to the owner.
pub trait FinishWrite: Write {
    fn try_finish(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl FinishWrite for Vec<u8> {}
impl FinishWrite for File {}
impl FinishWrite for Stdout {}
impl<W: Write> FinishWrite for BufWriter<W> {}

impl<T: FinishWrite + ?Sized> FinishWrite for &mut T {
    fn try_finish(&mut self) -> io::Result<()> {
        (**self).try_finish()
    }
}

impl<T: FinishWrite + ?Sized> FinishWrite for Box<T> {
    fn try_finish(&mut self) -> io::Result<()> {
        (**self).try_finish()
    }
}

/// File created by [`create_output`]
pub enum OutputFile {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputFile::Plain(w) => w.write(buf),
            OutputFile::Gzip(w) => w.write(buf),
        }
    }

    /// Does not end a gzip stream; see [`FinishWrite::try_finish`]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputFile::Plain(w) => w.flush(),
            OutputFile::Gzip(w) => w.flush(),
        }
    }
}

impl FinishWrite for OutputFile {
    /// Writes the gzip trailer (once) and flushes the file
    fn try_finish(&mut self) -> io::Result<()> {
        match self {
            OutputFile::Plain(w) => w.flush(),
            OutputFile::Gzip(encoder) => {
                encoder.try_finish()?;
                encoder.get_mut().flush()
            }
        }
    }
}

/// Create an output file, gzip-compressed when the path ends in `.gz`
pub fn create_output(path: &Path, compression_level: u32) -> Result<OutputFile> {
    let file = File::create(path).map_err(|e| {
        AnnoError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create {}: {}", path.display(), e),
        ))
    })?;

    if is_gzip_path(path) {
        debug!("Writing gzip output {}", path.display());
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::new(compression_level));
        Ok(OutputFile::Gzip(encoder))
    } else {
        Ok(OutputFile::Plain(BufWriter::new(file)))
    }
}

/// Document ID for a path: its file name
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
