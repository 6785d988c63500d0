//! Shared test doubles.

use std::sync::{Arc, Mutex};

use crate::logger::{Logger, Record, Sink};

/// A [`Sink`] that keeps every record for later assertions. Clones share the
/// same store.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger whose only sink is this recorder.
    pub fn logger(&self) -> Logger {
        Logger::with_sinks("test", vec![Box::new(self.clone())])
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }
}

impl Sink for RecordingSink {
    fn write(&self, record: &Record) {
        self.records.lock().unwrap().push(record.clone());
    }
}
