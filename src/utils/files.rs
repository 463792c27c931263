use std::fs::{File, OpenOptions};
use std::io::{stdin, BufReader, BufWriter, Stdin};
use std::path::Path;

use anyhow::{Context, Result};

/// Create a BufReader that reads from StdIn
pub fn open_sin() -> BufReader<Stdin> {
    BufReader::new(stdin())
}

/// Create a BufReader that reads from the file at `path`
pub fn open_read(path: &Path) -> Result<BufReader<File>> {
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("Failed to open file \"{}\" for reading", path.display()))?;
    Ok(BufReader::new(file))
}

/// Create a BufWriter that writes to the file at `path`, creating it if needed
pub fn open_write(path: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open file \"{}\" for writing", path.display()))?;
    Ok(BufWriter::new(file))
}
