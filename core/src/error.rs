use std::path::PathBuf;
use thiserror::Error;

use crate::patch::PatchStage;

#[derive(Debug, Error)]
pub enum FdsError {
    #[error("Failed to open input file: {}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read input file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File too long for buffer, valid FDS images must be {max} or fewer bytes in length")]
    Oversize { max: usize },

    #[error("Image has unrecognised size, should be a multiple of 65500 bytes with an optional 16 byte header; actual size is {0} bytes")]
    UnrecognizedSize(usize),

    #[error("Patch failed while {stage} for {}", path.display())]
    PatchIo {
        stage: PatchStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Original {} was removed but the rename failed; patched data kept at {}", path.display(), temp.display())]
    OriginalLost {
        path: PathBuf,
        temp: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type FdsResult<T> = Result<T, FdsError>;
