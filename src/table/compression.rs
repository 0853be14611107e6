//! Transparent gzip handling for table files, chosen by the `.gz` suffix.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Whether a path names a gzip-compressed file (by extension).
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Open a file for reading, transparently gunzipping `.gz` files.
pub fn open_reader(path: &Path) -> io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    if is_gzip_path(path) {
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Wrap an already created file for writing, gzip-compressing when
/// `compress` is set.
///
/// The returned writer must be finished with [`finish_writer`] so the gzip
/// trailer is flushed before the file is persisted.
pub fn wrap_writer(file: File, compress: bool) -> TableSink {
    if compress {
        TableSink::Gzip(GzEncoder::new(BufWriter::new(file), Compression::default()))
    } else {
        TableSink::Plain(BufWriter::new(file))
    }
}

/// Output byte sink for a table file.
pub enum TableSink {
    /// Uncompressed output
    Plain(BufWriter<File>),
    /// Gzip-compressed output
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Write for TableSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            TableSink::Plain(w) => w.write(buf),
            TableSink::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            TableSink::Plain(w) => w.flush(),
            TableSink::Gzip(w) => w.flush(),
        }
    }
}

/// Flush all buffered bytes (and the gzip trailer) to the underlying file.
pub fn finish_writer(sink: TableSink) -> io::Result<()> {
    match sink {
        TableSink::Plain(mut w) => w.flush(),
        TableSink::Gzip(w) => {
            let mut inner = w.finish()?;
            inner.flush()
        }
    }
}
