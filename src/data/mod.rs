//! Record sources.
//!
//! The pipeline never talks to a database, a file or the network directly; it is handed
//! raw rows by a `RecordSource`.

pub mod csv_source;
pub mod http;
pub mod sample;

pub use csv_source::*;
pub use http::*;
pub use sample::*;

use crate::domain::RawRecord;
use crate::error::AppError;

/// Something that can produce the raw rows of one metric.
pub trait RecordSource {
    /// Short human-readable description, used in reports.
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<Vec<RawRecord>, AppError>;
}

/// Rows held in memory. Used by tests and by the TUI after the first fetch.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    label: String,
    rows: Vec<RawRecord>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, rows: Vec<RawRecord>) -> Self {
        Self {
            label: label.into(),
            rows,
        }
    }
}

impl RecordSource for MemorySource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, AppError> {
        Ok(self.rows.clone())
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, AppError> {
        (**self).fetch()
    }
}
