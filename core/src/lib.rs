pub mod error;
pub mod format;
pub mod image;
pub mod patch;
pub mod report;

pub use error::{FdsError, FdsResult};
pub use format::{HeaderKind, SizeClass};
pub use image::{classify, load_image, Classification};
pub use patch::{
    patch_file, FnProgress, LoggingProgress, NoOpProgress, PatchOptions, PatchOutcome,
    PatchProgress, PatchStage, ReplaceStrategy,
};
