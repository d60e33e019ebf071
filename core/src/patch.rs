// Header insertion and crash-safe file replacement

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{FdsError, FdsResult};
use crate::format::header_for;
use crate::image::Classification;

/// Steps of the on-disk replacement, in the order they complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStage {
    ResolveDirectory,
    TempName,
    Open,
    Write,
    Close,
    Unlink,
    Rename,
}

impl fmt::Display for PatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PatchStage::ResolveDirectory => "resolving target directory",
            PatchStage::TempName => "generating temporary file name",
            PatchStage::Open => "opening temporary file",
            PatchStage::Write => "writing temporary file",
            PatchStage::Close => "closing temporary file",
            PatchStage::Unlink => "removing original file",
            PatchStage::Rename => "renaming temporary file",
        };
        f.write_str(text)
    }
}

/// How the patched content replaces the original file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceStrategy {
    /// Rename the temporary file over the original in one step
    #[default]
    Atomic,
    /// Remove the original, then rename the temporary file into place.
    /// A failed rename leaves the original path absent.
    RemoveThenRename,
}

#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    pub strategy: ReplaceStrategy,
    /// Insert the header in memory only; the file is not touched
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The image already carries a header (valid or not) and was left alone
    AlreadyHeadered,
    Patched { new_len: usize },
    DryRun { new_len: usize },
}

/// Receives each replacement stage as it completes
pub trait PatchProgress {
    fn on_stage(&self, stage: PatchStage, detail: &str);
}

/// No-op progress callback
pub struct NoOpProgress;

impl PatchProgress for NoOpProgress {
    fn on_stage(&self, _stage: PatchStage, _detail: &str) {}
}

/// Reports each stage through the `log` facade
pub struct LoggingProgress;

impl PatchProgress for LoggingProgress {
    fn on_stage(&self, stage: PatchStage, detail: &str) {
        info!("Done {}: {}", stage, detail);
    }
}

/// Function-based progress callback
pub struct FnProgress<F>
where
    F: Fn(PatchStage, &str),
{
    callback: F,
}

impl<F> FnProgress<F>
where
    F: Fn(PatchStage, &str),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> PatchProgress for FnProgress<F>
where
    F: Fn(PatchStage, &str),
{
    fn on_stage(&self, stage: PatchStage, detail: &str) {
        (self.callback)(stage, detail)
    }
}

/// Prepend the loader header to a headerless image.
///
/// Returns `false` without touching `image` when the classification says a
/// header is already present.
pub fn insert_header(classification: &Classification, image: &mut Vec<u8>) -> FdsResult<bool> {
    if classification.has_header.is_present() {
        return Ok(false);
    }

    let expected = classification.size_class().byte_len();
    if image.len() != expected {
        return Err(FdsError::InvalidInput(format!(
            "image is {} bytes but was classified as {} bytes",
            image.len(),
            expected
        )));
    }

    let header = header_for(classification.disk_count);
    image.splice(0..0, header.iter().copied());
    Ok(true)
}

/// Add the loader header to the image at `path` if it lacks one.
///
/// `image` must hold the file's current content and `classification` must be
/// derived from it. On success with [`PatchOutcome::Patched`], `image` holds
/// the new file content.
pub fn patch_file(
    classification: &Classification,
    image: &mut Vec<u8>,
    path: &Path,
    options: &PatchOptions,
    progress: &dyn PatchProgress,
) -> FdsResult<PatchOutcome> {
    if !insert_header(classification, image)? {
        info!("{} already has a header, leaving it unchanged", path.display());
        return Ok(PatchOutcome::AlreadyHeadered);
    }

    let new_len = image.len();
    if options.dry_run {
        info!("Dry run: would write {} bytes to {}", new_len, path.display());
        return Ok(PatchOutcome::DryRun { new_len });
    }

    replace_file(path, image, options.strategy, progress)?;
    Ok(PatchOutcome::Patched { new_len })
}

/// Replace `path` with `contents` via a temporary file in the same directory.
///
/// The temporary file is removed on every failure before the swap. With
/// [`ReplaceStrategy::RemoveThenRename`], a failed final rename keeps the
/// temporary file and reports [`FdsError::OriginalLost`].
pub fn replace_file(
    path: &Path,
    contents: &[u8],
    strategy: ReplaceStrategy,
    progress: &dyn PatchProgress,
) -> FdsResult<()> {
    let io_error = |stage: PatchStage| {
        let path = path.to_path_buf();
        move |source: std::io::Error| FdsError::PatchIo { stage, path, source }
    };

    let dir = target_directory(path);
    progress.on_stage(PatchStage::ResolveDirectory, &dir.display().to_string());

    // Name generation and creation are one step; a collision retries internally
    let mut temp = tempfile::Builder::new()
        .prefix(".fdspatch")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(io_error(PatchStage::Open))?;
    let temp_name = temp.path().display().to_string();
    progress.on_stage(PatchStage::TempName, &temp_name);
    progress.on_stage(PatchStage::Open, &temp_name);

    temp.write_all(contents).map_err(io_error(PatchStage::Write))?;
    temp.flush().map_err(io_error(PatchStage::Write))?;
    progress.on_stage(PatchStage::Write, &format!("{} bytes", contents.len()));

    // tempfile creates 0600; carry the original's mode over
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(io_error(PatchStage::Close))?;
    }
    temp.as_file().sync_all().map_err(io_error(PatchStage::Close))?;
    // Drops the handle; the path is still removed if we bail out below
    let temp_path = temp.into_temp_path();
    progress.on_stage(PatchStage::Close, &temp_name);

    if strategy == ReplaceStrategy::RemoveThenRename {
        fs::remove_file(path).map_err(io_error(PatchStage::Unlink))?;
        progress.on_stage(PatchStage::Unlink, &path.display().to_string());
        rename_after_unlink(temp_path, path)?;
    } else {
        temp_path
            .persist(path)
            .map_err(|err| io_error(PatchStage::Rename)(err.error))?;
    }

    progress.on_stage(PatchStage::Rename, &path.display().to_string());
    Ok(())
}

/// Move `temp` to `path` once the original is gone.
///
/// On failure the temporary file holds the only copy, so it is kept and
/// named in [`FdsError::OriginalLost`].
fn rename_after_unlink(temp: tempfile::TempPath, path: &Path) -> FdsResult<()> {
    let err = match temp.persist(path) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    warn!("Rename failed after {} was removed", path.display());
    match err.path.keep() {
        Ok(temp) => Err(FdsError::OriginalLost {
            path: path.to_path_buf(),
            temp,
            source: err.error,
        }),
        Err(keep_err) => Err(FdsError::PatchIo {
            stage: PatchStage::Rename,
            path: path.to_path_buf(),
            source: keep_err.error,
        }),
    }
}

fn target_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
