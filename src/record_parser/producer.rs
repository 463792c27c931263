use std::io::BufRead;
use std::thread;
use std::thread::JoinHandle;

use anyhow::{Error, Result};
use crossbeam_channel::Sender;

/// Reads the input stream on its own thread and publishes one raw record
/// text per `//`-terminated entry, terminator line excluded.
pub struct Producer<B: BufRead + Send + 'static> {
    reader: Option<B>,
    handle: Option<JoinHandle<()>>,
}

impl<B: BufRead + Send + 'static> Producer<B> {
    pub fn new(reader: B) -> Self {
        Self {
            reader: Some(reader),
            handle: None,
        }
    }

    pub fn start(&mut self, sender: Sender<Result<String>>) {
        let mut reader = self.reader.take().expect("producer started twice");

        self.handle = Some(thread::spawn(move || {
            let mut line = String::new();
            let mut chunk = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        let _ = sender.send(Err(Error::new(e).context("Error reading line")));
                        return;
                    }
                }

                if line.trim_end() == "//" {
                    // A send error means every receiver hung up; stop reading.
                    if sender.send(Ok(std::mem::take(&mut chunk))).is_err() {
                        return;
                    }
                    continue;
                }
                chunk.push_str(&line);
            }

            // A final record without terminator still counts.
            if !chunk.trim().is_empty() {
                let _ = sender.send(Ok(chunk));
            }
        }));
    }

    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("producer thread panicked");
        }
    }
}
