//src/reader.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::TaxCountError;

/// Opens a text input for line-wise reading. Files ending in `.gz` are
/// decompressed on the fly.
pub fn open_lines<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, TaxCountError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|source| TaxCountError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Opens the output sink: the given file, or stdout when no path is set.
pub fn open_output<P: AsRef<Path>>(path: Option<P>) -> Result<Box<dyn Write>, TaxCountError> {
    match path {
        Some(path) => {
            let path = path.as_ref();
            let f = File::create(path).map_err(|source| TaxCountError::Create {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(f)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
