//! Native library version numbers

use std::fmt;

/// A `MAJOR.MINOR.PATCH` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NativeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl NativeVersion {
    /// Unpacks a `0xMMmmpp` version number.
    pub fn from_packed(packed: u32) -> Self {
        Self {
            major: packed >> 16,
            minor: (packed >> 8) & 0xFF,
            patch: packed & 0xFF,
        }
    }

    /// Parses the leading `MAJOR.MINOR.PATCH` of a string such as `0.21.4-Release`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.splitn(3, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch_part = parts.next()?;
        let digits_end = patch_part
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(patch_part.len());
        let patch = patch_part[..digits_end].parse().ok()?;

        Some(Self {
            major,
            minor,
            patch,
        })
    }

    /// Major and minor components match.
    pub fn agrees_with(&self, other: &NativeVersion) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl fmt::Display for NativeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
