// On-disk layout of Famicom Disk System images

use serde::Serialize;

/// Size of one disk side in bytes
pub const DISK_SIDE_SIZE: usize = 65500;

/// Size of the optional loader header in bytes
pub const HEADER_SIZE: usize = 16;

/// Size of the leader signature that opens each disk side
pub const LEADER_SIZE: usize = 15;

/// Size of the game identifier that follows the vendor id
pub const IDENT_SIZE: usize = 4;

/// Largest image the loader accepts: header plus two disk sides
pub const MAX_IMAGE_SIZE: usize = HEADER_SIZE + DISK_SIDE_SIZE * 2;

/// Magic bytes at the start of the loader header ("FDS\x1A")
pub const HEADER_MAGIC: [u8; 4] = [0x46, 0x44, 0x53, 0x1A];

pub const HEADER_ONE_SIDE: [u8; HEADER_SIZE] = [
    0x46, 0x44, 0x53, 0x1A, 0x01, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

pub const HEADER_TWO_SIDES: [u8; HEADER_SIZE] = [
    0x46, 0x44, 0x53, 0x1A, 0x02, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// 0x01 followed by "*NINTENDO-HVC*"
pub const LEADER: [u8; LEADER_SIZE] = [
    0x01, 0x2A, 0x4E, 0x49, 0x4E, 0x54, 0x45, 0x4E,
    0x44, 0x4F, 0x2D, 0x48, 0x56, 0x43, 0x2A,
];

/// Header variant an image of a given size is expected to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderKind {
    None,
    Single,
    Double,
}

impl HeaderKind {
    pub fn is_present(self) -> bool {
        self != HeaderKind::None
    }
}

/// The four image lengths the tool recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    OneSide,
    TwoSides,
    OneSideHeadered,
    TwoSidesHeadered,
}

impl SizeClass {
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            DISK_SIDE_SIZE => Some(SizeClass::OneSide),
            l if l == DISK_SIDE_SIZE * 2 => Some(SizeClass::TwoSides),
            l if l == HEADER_SIZE + DISK_SIDE_SIZE => Some(SizeClass::OneSideHeadered),
            MAX_IMAGE_SIZE => Some(SizeClass::TwoSidesHeadered),
            _ => None,
        }
    }

    pub fn byte_len(self) -> usize {
        let header = if self.header().is_present() { HEADER_SIZE } else { 0 };
        header + DISK_SIDE_SIZE * self.disk_count() as usize
    }

    pub fn disk_count(self) -> u8 {
        match self {
            SizeClass::OneSide | SizeClass::OneSideHeadered => 1,
            SizeClass::TwoSides | SizeClass::TwoSidesHeadered => 2,
        }
    }

    pub fn header(self) -> HeaderKind {
        match self {
            SizeClass::OneSide | SizeClass::TwoSides => HeaderKind::None,
            SizeClass::OneSideHeadered => HeaderKind::Single,
            SizeClass::TwoSidesHeadered => HeaderKind::Double,
        }
    }
}

/// Loader header for an image with `disk_count` sides.
///
/// Any count other than two gets the one-side header; the classifier only
/// ever produces 1 or 2.
pub fn header_for(disk_count: u8) -> &'static [u8; HEADER_SIZE] {
    if disk_count == 2 {
        &HEADER_TWO_SIDES
    } else {
        &HEADER_ONE_SIDE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_lengths() {
        assert_eq!(SizeClass::from_len(65500), Some(SizeClass::OneSide));
        assert_eq!(SizeClass::from_len(131000), Some(SizeClass::TwoSides));
        assert_eq!(SizeClass::from_len(65516), Some(SizeClass::OneSideHeadered));
        assert_eq!(SizeClass::from_len(131016), Some(SizeClass::TwoSidesHeadered));

        for class in [
            SizeClass::OneSide,
            SizeClass::TwoSides,
            SizeClass::OneSideHeadered,
            SizeClass::TwoSidesHeadered,
        ] {
            assert_eq!(SizeClass::from_len(class.byte_len()), Some(class));
        }
    }

    #[test]
    fn test_unrecognised_lengths() {
        for len in [0, 1, 16, 21, 70, 65499, 65501, 65515, 65517, 130999, 131017, 196500] {
            assert_eq!(SizeClass::from_len(len), None, "length {} should not classify", len);
        }
    }

    #[test]
    fn test_headers_differ_only_in_disk_count() {
        assert_eq!(&HEADER_ONE_SIDE[..4], &HEADER_MAGIC);
        assert_eq!(&HEADER_TWO_SIDES[..4], &HEADER_MAGIC);
        for i in 0..HEADER_SIZE {
            if i == 4 {
                assert_eq!(HEADER_ONE_SIDE[i], 1);
                assert_eq!(HEADER_TWO_SIDES[i], 2);
            } else {
                assert_eq!(HEADER_ONE_SIDE[i], HEADER_TWO_SIDES[i]);
            }
        }
        assert_eq!(header_for(1), &HEADER_ONE_SIDE);
        assert_eq!(header_for(2), &HEADER_TWO_SIDES);
    }

    #[test]
    fn test_leader_text() {
        assert_eq!(LEADER[0], 0x01);
        assert_eq!(&LEADER[1..], b"*NINTENDO-HVC*");
    }
}
