use crate::error::{QrError, QrResult};

/// A QR version number between 1 and 40 (inclusive). Determines the
/// symbol's side length: `size = 21 + 4*(version - 1)`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// Panics if the number is outside the range [1, 40]. Callers recovering
    /// a version from untrusted image data should validate first and
    /// surface [`QrError::InvalidVersion`] instead of calling this directly.
    pub fn new(ver: u8) -> Self {
        assert!(
            (Version::MIN.value()..=Version::MAX.value()).contains(&ver),
            "Version number out of range"
        );
        Self(ver)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Side length in modules for this version.
    pub fn size(self) -> i32 {
        21 + 4 * (i32::from(self.0) - 1)
    }

    /// `size -> version`. Fails if `size` is not a valid QR size (`size ∈
    /// {21, 25, ..., 177}`).
    pub fn size_decode(size: i32) -> QrResult<Version> {
        if (size - 17) % 4 != 0 {
            return Err(QrError::InvalidVersion);
        }
        let ver = (size - 17) / 4;
        if (1..=40).contains(&ver) {
            Ok(Version::new(ver as u8))
        } else {
            Err(QrError::InvalidVersion)
        }
    }

    /// `version -> size`, the inverse of [`Version::size_decode`].
    pub fn size_encode(self) -> i32 {
        self.size()
    }

    /// Governs the bit width of length fields: 0 for v1-9, 1 for v10-26, 2
    /// for v27-40.
    pub fn size_type(self) -> usize {
        ((i32::from(self.0) + 7) / 17) as usize
    }
}
