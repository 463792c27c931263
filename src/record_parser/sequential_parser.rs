use std::io::{BufRead, Lines};

use anyhow::{Error, Result};

use crate::dialect::Dialect;
use crate::record::Record;

/// A simple single-threaded parser over a `//`-terminated record stream.
pub struct SequentialRecordParser<B: BufRead> {
    lines: Lines<B>,
    data: Vec<String>,
    dialect: Dialect,
}

impl<B: BufRead> SequentialRecordParser<B> {
    pub fn new(reader: B, dialect: Dialect) -> Self {
        Self {
            lines: reader.lines(),
            data: Vec::new(),
            dialect,
        }
    }

    fn take_record(&mut self) -> Record {
        let mut text = self.data.join("\n");
        text.push('\n');
        self.data.clear();
        Record::parse(&text, self.dialect)
    }
}

impl<B: BufRead> Iterator for SequentialRecordParser<B> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next() {
                None => {
                    // A final record without terminator still counts.
                    if self.data.is_empty() {
                        return None;
                    }
                    return Some(Ok(self.take_record()));
                }
                Some(Err(e)) => return Some(Err(Error::new(e).context("Error reading line"))),
                Some(Ok(line)) if line.trim_end() == "//" => {
                    if self.data.is_empty() {
                        continue;
                    }
                    return Some(Ok(self.take_record()));
                }
                Some(Ok(line)) => self.data.push(line),
            }
        }
    }
}
