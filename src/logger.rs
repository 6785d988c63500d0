//! Structured audit logger.
//!
//! A [`Logger`] is a cheap clonable handle constructed once at process start
//! and passed into the middleware and the dispatcher — there is no global
//! instance. Each log call builds one [`Record`] and hands it to every
//! configured [`Sink`] synchronously, inside the request lifecycle: when the
//! call returns, every sink has acknowledged submission (durability is the
//! sink's own business).
//!
//! The crate ships one sink, [`TracingSink`], which forwards records as
//! `tracing` events. Anything else — files, sockets, a test recorder — is an
//! external [`Sink`] implementation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Key/value context attached to a [`Record`].
pub type Metadata = serde_json::Map<String, Value>;

/// Record severity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info  => "info",
            Self::Warn  => "warn",
            Self::Error => "error",
        }
    }
}

/// One structured log record: timestamp, severity, message, metadata map.
#[derive(Clone, Debug, Serialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub metadata: Metadata,
}

/// A destination for [`Record`]s.
///
/// `write` is infallible at this interface: a sink that can fail internally
/// (disk full, broken pipe) deals with that itself.
pub trait Sink: Send + Sync {
    fn write(&self, record: &Record);
}

/// Clonable logging handle.
///
/// Every record it emits carries the service name in its metadata under
/// `"service"`, unless the caller already set that key.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    service: String,
    sinks: Vec<Box<dyn Sink>>,
}

impl Logger {
    /// A logger for `service` writing to [`TracingSink`].
    pub fn new(service: impl Into<String>) -> Self {
        Self::with_sinks(service, vec![Box::new(TracingSink)])
    }

    /// A logger writing to the given sinks.
    pub fn with_sinks(service: impl Into<String>, sinks: Vec<Box<dyn Sink>>) -> Self {
        Self {
            inner: Arc::new(Inner { service: service.into(), sinks }),
        }
    }

    pub fn info(&self, message: impl Into<String>, metadata: Metadata) {
        self.log(Level::Info, message.into(), metadata);
    }

    pub fn warn(&self, message: impl Into<String>, metadata: Metadata) {
        self.log(Level::Warn, message.into(), metadata);
    }

    pub fn error(&self, message: impl Into<String>, metadata: Metadata) {
        self.log(Level::Error, message.into(), metadata);
    }

    pub fn debug(&self, message: impl Into<String>, metadata: Metadata) {
        self.log(Level::Debug, message.into(), metadata);
    }

    fn log(&self, level: Level, message: String, mut metadata: Metadata) {
        if !metadata.contains_key("service") {
            metadata.insert("service".to_owned(), Value::from(self.inner.service.as_str()));
        }
        let record = Record { timestamp: Utc::now(), level, message, metadata };
        for sink in &self.inner.sinks {
            sink.write(&record);
        }
    }
}

/// Forwards records to the `tracing` ecosystem.
///
/// The metadata map rides along as a single JSON-rendered `meta` field, so
/// whatever subscriber the host process installed (fmt, json, OTLP) sees the
/// full record.
pub struct TracingSink;

impl Sink for TracingSink {
    fn write(&self, record: &Record) {
        let meta = Value::Object(record.metadata.clone());
        match record.level {
            Level::Debug => tracing::debug!(meta = %meta, "{}", record.message),
            Level::Info  => tracing::info!(meta = %meta, "{}", record.message),
            Level::Warn  => tracing::warn!(meta = %meta, "{}", record.message),
            Level::Error => tracing::error!(meta = %meta, "{}", record.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::RecordingSink;

    #[test]
    fn records_reach_every_sink_in_order() {
        let a = RecordingSink::new();
        let b = RecordingSink::new();
        let logger =
            Logger::with_sinks("calc", vec![Box::new(a.clone()), Box::new(b.clone())]);

        logger.info("first", Metadata::new());
        logger.error("second", Metadata::new());

        for sink in [&a, &b] {
            let records = sink.records();
            assert_eq!(records.len(), 2);
            assert_eq!(records[0].message, "first");
            assert_eq!(records[0].level, Level::Info);
            assert_eq!(records[1].message, "second");
            assert_eq!(records[1].level, Level::Error);
        }
    }

    #[test]
    fn service_name_is_merged_into_metadata() {
        let sink = RecordingSink::new();
        let logger = Logger::with_sinks("calc", vec![Box::new(sink.clone())]);

        logger.info("hello", Metadata::new());

        assert_eq!(sink.records()[0].metadata["service"], Value::from("calc"));
    }

    #[test]
    fn caller_metadata_wins_over_service_default() {
        let sink = RecordingSink::new();
        let logger = Logger::with_sinks("calc", vec![Box::new(sink.clone())]);

        let mut meta = Metadata::new();
        meta.insert("service".to_owned(), Value::from("override"));
        logger.info("hello", meta);

        assert_eq!(sink.records()[0].metadata["service"], Value::from("override"));
    }
}
