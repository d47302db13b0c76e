use std::path::PathBuf;

use thiserror::Error;

/// Failure while parsing a single class file. Any of these aborts the
/// enclosing jar transcode.
#[derive(Debug, Error)]
pub enum ClassError {
    #[error("not a class file (magic {0:#010x})")]
    BadMagic(u32),
    #[error("truncated class file")]
    Truncated,
    #[error("unknown constant pool tag {0}")]
    UnknownTag(u8),
    #[error("constant pool index {0} out of range")]
    BadIndex(u16),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("missing required resource: {0}")]
    MissingResource(PathBuf),
    #[error("malformed class {path}: {source}")]
    MalformedClass {
        path: String,
        #[source]
        source: ClassError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
