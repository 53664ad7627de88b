use thiserror::Error;

pub type Result<T> = std::result::Result<T, AggregateError>;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at byte {offset}: {reason}")]
    Parse { offset: usize, reason: &'static str },

    #[error("Station name at byte {offset} is longer than {max} bytes")]
    KeyTooLong { offset: usize, max: usize },

    #[error("Aggregation table is full ({capacity} slots)")]
    TableFull { capacity: usize },

    #[error("No line terminator within {lookahead} bytes of segment boundary {boundary}")]
    SegmentAlignment { boundary: usize, lookahead: usize },

    #[error("Station name is not valid UTF-8: {0}")]
    InvalidStationName(#[from] std::string::FromUtf8Error),

    #[error("Worker pool error: {0}")]
    ThreadPool(String),
}

impl AggregateError {
    pub(crate) fn parse(offset: usize, reason: &'static str) -> Self {
        Self::Parse { offset, reason }
    }
}
