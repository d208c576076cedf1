use std::io;

use thiserror::Error;

/// Failures produced while reading the counter source.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The backing record could not be opened, read, or parsed as a whole.
    #[error("{record} is unavailable")]
    SourceUnavailable {
        record: &'static str,
        #[source]
        source: io::Error,
    },

    /// A single record had too few fields or a non-numeric value.
    #[error("malformed {record} record: {detail}")]
    MalformedRecord {
        record: &'static str,
        detail: String,
    },

    /// A per-process read failed because the process exited mid-enumeration.
    #[error("process {pid} vanished while being sampled")]
    ProcessVanished {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

impl SampleError {
    pub(crate) fn unavailable(record: &'static str, source: io::Error) -> Self {
        SampleError::SourceUnavailable { record, source }
    }

    /// Builds a `SourceUnavailable` for a record that was read but could not be parsed.
    pub(crate) fn invalid_data(record: &'static str, detail: impl Into<String>) -> Self {
        SampleError::SourceUnavailable {
            record,
            source: io::Error::new(io::ErrorKind::InvalidData, detail.into()),
        }
    }

    pub(crate) fn malformed(record: &'static str, detail: impl Into<String>) -> Self {
        SampleError::MalformedRecord {
            record,
            detail: detail.into(),
        }
    }
}
