use std::io::BufRead;

use anyhow::Result;

mod consumer;
mod producer;
pub mod sequential_parser;
pub mod threaded_parser;

use self::sequential_parser::SequentialRecordParser;
use self::threaded_parser::ThreadedRecordParser;
use crate::dialect::Dialect;
use crate::record::Record;

/// Create a sequential or threaded parser based on the amount of threads
/// passed. Records are independent, so all parallelism is across records.
pub fn flat_record_parser<B: BufRead + Send + 'static>(
    reader: B,
    dialect: Dialect,
    threads: usize,
) -> Box<dyn Iterator<Item = Result<Record>>> {
    if threads == 1 {
        Box::new(SequentialRecordParser::new(reader, dialect))
    } else {
        Box::new(ThreadedRecordParser::new(reader, dialect, threads))
    }
}
