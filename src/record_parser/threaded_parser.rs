use std::io::BufRead;

use anyhow::Result;
use crossbeam_channel::{bounded, Receiver};
use lazy_static::lazy_static;

use super::consumer::Consumer;
use super::producer::Producer;
use crate::dialect::Dialect;
use crate::record::Record;

/// A multi-threaded record parser: one thread splits the input stream at
/// record boundaries, `threads` worker threads decode the chunks.
/// Record order is not preserved across workers.
pub struct ThreadedRecordParser<B: BufRead + Send + 'static> {
    producer: Producer<B>,
    consumers: Vec<Consumer>,
    dialect: Dialect,
    threads: usize,
    r_parsed: Option<Receiver<Result<Record>>>,
    started: bool,
}

impl<B: BufRead + Send + 'static> ThreadedRecordParser<B> {
    /// Create a parser with `threads` consumer threads; 0 uses one per
    /// (virtual) CPU.
    pub fn new(reader: B, dialect: Dialect, mut threads: usize) -> Self {
        if threads == 0 {
            lazy_static! {
                static ref THREADS: usize = num_cpus::get();
            }
            threads = *THREADS
        }

        let producer = Producer::new(reader);
        let mut consumers = Vec::<Consumer>::with_capacity(threads);

        for _ in 0..threads {
            consumers.push(Consumer::new());
        }

        Self {
            producer,
            consumers,
            dialect,
            threads,
            r_parsed: None,
            started: false,
        }
    }

    /// Create the communication channels and launch all threads.
    fn start(&mut self) {
        let (s_raw, r_raw) = bounded::<Result<String>>(self.threads * 2);
        let (s_parsed, r_parsed) = bounded::<Result<Record>>(self.threads * 2);

        self.producer.start(s_raw);

        for consumer in &mut self.consumers {
            consumer.start(self.dialect, r_raw.clone(), s_parsed.clone());
        }

        self.r_parsed = Some(r_parsed);
        self.started = true;
    }

    fn join(&mut self) {
        self.producer.join();
        for consumer in self.consumers.iter_mut() {
            consumer.join();
        }
    }
}

impl<B: BufRead + Send + 'static> Iterator for ThreadedRecordParser<B> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.start();
        }

        match &self.r_parsed {
            Some(receiver) => {
                match receiver.recv() {
                    Ok(entry) => Some(entry),
                    // The channel disconnects when the producer and every
                    // consumer are done; that is the end of the stream.
                    Err(_) => {
                        self.join();
                        None
                    }
                }
            }
            // We never started (unreachable case in practice)
            None => None,
        }
    }
}
