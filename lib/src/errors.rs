use std::result::Result as StdResult;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KmerQfError {
    #[error("failed to load/read/write file: {0:?}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse the fasta/fastq file: {0}")]
    Needletail(#[from] needletail::errors::ParseError),
    #[error("json error: {0:?}")]
    Json(#[from] serde_json::Error),
    #[error("k must be between 1 and 32, got {0}")]
    InvalidK(u32),
    #[error("bit width must be an even number between 2 and 64, got {0}")]
    InvalidBitWidth(u32),
    #[error("value {value:#x} has bits set above bit width {bit_width}")]
    ValueExceedsBitWidth { value: u64, bit_width: u32 },
    #[error("k-mers must hold between 1 and 32 bases, got {0}")]
    InvalidKmerLength(usize),
    #[error("record {record}: expected a {expected}-mer, found {found} bases")]
    KmerLength {
        expected: u32,
        found: usize,
        record: usize,
    },
    #[error("line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("counting structure is full ({num_slots} slots)")]
    StructureFull { num_slots: u64 },
    #[error("invalid counting structure parameters: {0}")]
    InvalidStructureParams(String),
    #[error("kmerqf error: {0}")]
    Message(String),
}

pub type KmerQfResult<T> = StdResult<T, KmerQfError>;

#[doc(hidden)]
#[macro_export]
macro_rules! bail {
    ($e:expr) => {
        return Err($crate::errors::KmerQfError::Message($e.to_owned()));
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::KmerQfError::Message(format!($fmt, $($arg)*)))
    };
}
