use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Capability bitset a decoder reports for a source during accept and open.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DecoderCaps(u8);

impl DecoderCaps {
    /// No capabilities.
    pub const NONE: Self = Self(0);
    /// Resolution independent source.
    pub const VECTOR: Self = Self(0x01);
    /// More than one frame.
    pub const ANIMATED: Self = Self(0x02);
    /// Frames can be decoded out of order.
    pub const SEEKABLE: Self = Self(0x04);
    /// Open produces a full pixel buffer.
    pub const CACHED: Self = Self(0x08);
    /// Frame delays differ between frames.
    pub const VARIABLE_FRAME_RATE: Self = Self(0x10);
    /// Animation repeats.
    pub const LOOPING: Self = Self(0x20);
    /// Output may contain transparent pixels.
    pub const TRANSPARENT: Self = Self(0x40);

    const NAMED: [(Self, &'static str); 7] = [
        (Self::VECTOR, "vector"),
        (Self::ANIMATED, "animated"),
        (Self::SEEKABLE, "seekable"),
        (Self::CACHED, "cached"),
        (Self::VARIABLE_FRAME_RATE, "variable_frame_rate"),
        (Self::LOOPING, "looping"),
        (Self::TRANSPARENT, "transparent"),
    ];

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, dropping unknown ones.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & 0x7f)
    }

    /// Return `true` when every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Return `true` when no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set the bits of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Names of the set capabilities, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(cap, _)| self.contains(*cap))
            .map(|(_, name)| name)
    }
}

impl BitOr for DecoderCaps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DecoderCaps {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for DecoderCaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl serde::Serialize for DecoderCaps {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decoder/caps.rs"]
mod tests;
