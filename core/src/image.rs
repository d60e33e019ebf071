// Image loading and classification

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::error::{FdsError, FdsResult};
use crate::format::{
    header_for, HeaderKind, SizeClass, HEADER_SIZE, IDENT_SIZE, LEADER, LEADER_SIZE,
    MAX_IMAGE_SIZE,
};

/// What the classifier learned about an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub disk_count: u8,
    pub has_header: HeaderKind,
    pub header_valid: bool,
    pub leader_valid: bool,
    /// Raw byte after the leader; only meaningful when `leader_valid`
    pub vendor_id: u8,
    /// Raw identifier bytes; only meaningful when `leader_valid`
    pub game_ident: [u8; IDENT_SIZE],
    /// Only meaningful when `leader_valid`
    pub game_version: u8,
}

impl Classification {
    /// Size class this record was derived from
    pub fn size_class(&self) -> SizeClass {
        match (self.disk_count, self.has_header) {
            (1, HeaderKind::None) => SizeClass::OneSide,
            (_, HeaderKind::None) => SizeClass::TwoSides,
            (_, HeaderKind::Single) => SizeClass::OneSideHeadered,
            (_, HeaderKind::Double) => SizeClass::TwoSidesHeadered,
        }
    }

    /// Offset of the leader inside the image
    pub fn leader_offset(&self) -> usize {
        if self.has_header.is_present() {
            HEADER_SIZE
        } else {
            0
        }
    }

    /// Game identifier as text, stopping at the first NUL
    pub fn ident_text(&self) -> String {
        let end = self
            .game_ident
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(IDENT_SIZE);
        String::from_utf8_lossy(&self.game_ident[..end]).into_owned()
    }
}

/// Read an image file into a buffer sized for the largest valid image.
///
/// Files longer than [`MAX_IMAGE_SIZE`] are rejected rather than truncated.
pub fn load_image(path: &Path) -> FdsResult<Vec<u8>> {
    let file = File::open(path).map_err(|source| FdsError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut buffer = Vec::with_capacity(MAX_IMAGE_SIZE + 1);
    file.take(MAX_IMAGE_SIZE as u64 + 1)
        .read_to_end(&mut buffer)
        .map_err(|source| FdsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    if buffer.len() > MAX_IMAGE_SIZE {
        return Err(FdsError::Oversize { max: MAX_IMAGE_SIZE });
    }

    debug!("Loaded {} bytes from {}", buffer.len(), path.display());
    Ok(buffer)
}

/// Classify an image held entirely in `image`.
///
/// Fails only when the length is not one of the four recognised size classes.
/// Header and leader mismatches are recorded, not reported as errors.
pub fn classify(image: &[u8]) -> FdsResult<Classification> {
    let class = SizeClass::from_len(image.len())
        .ok_or(FdsError::UnrecognizedSize(image.len()))?;

    let disk_count = class.disk_count();
    let has_header = class.header();

    let header_valid = has_header.is_present()
        && image[..HEADER_SIZE] == header_for(disk_count)[..];

    let offset = if has_header.is_present() { HEADER_SIZE } else { 0 };
    let leader_valid = image[offset..offset + LEADER_SIZE] == LEADER;

    // Always in bounds: the smallest size class is a full disk side
    let info = offset + LEADER_SIZE;
    let mut game_ident = [0u8; IDENT_SIZE];
    game_ident.copy_from_slice(&image[info + 1..info + 1 + IDENT_SIZE]);

    let classification = Classification {
        disk_count,
        has_header,
        header_valid,
        leader_valid,
        vendor_id: image[info],
        game_ident,
        game_version: image[info + 1 + IDENT_SIZE],
    };

    debug!("Classified {:?} image: {:?}", class, classification);
    Ok(classification)
}
