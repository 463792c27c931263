use std::thread;
use std::thread::JoinHandle;

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};

use crate::dialect::Dialect;
use crate::record::Record;

/// A Consumer runs in a thread, listening on a channel of raw record texts
/// and publishing decoded `Record`s.
pub struct Consumer {
    handle: Option<JoinHandle<()>>,
}

impl Consumer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn start(
        &mut self,
        dialect: Dialect,
        receiver: Receiver<Result<String>>,
        sender: Sender<Result<Record>>,
    ) {
        self.handle = Some(thread::spawn(move || {
            for chunk in receiver {
                let entry = chunk.map(|text| Record::parse(&text, dialect));
                if sender.send(entry).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("consumer thread panicked");
        }
    }
}

impl Default for Consumer {
    fn default() -> Self {
        Self::new()
    }
}
