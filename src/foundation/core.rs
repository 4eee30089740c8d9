use crate::foundation::math::mix_channel;

/// Fully transparent.
pub const OPA_TRANSP: u8 = 0;
/// Lowest opacity that is still drawn; anything below is treated as transparent.
pub const OPA_MIN: u8 = 2;
/// Opacity at or above which a layer counts as opaque.
pub const OPA_MAX: u8 = 253;
/// Fully opaque.
pub const OPA_COVER: u8 = 255;

/// Zoom factor meaning "no scaling" (fixed point, 256 = 1.0).
pub const ZOOM_NONE: u16 = 256;

/// Integer pixel coordinate.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangle with inclusive corners, in buffer-relative pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Area {
    /// Left edge (inclusive).
    pub x1: i32,
    /// Top edge (inclusive).
    pub y1: i32,
    /// Right edge (inclusive).
    pub x2: i32,
    /// Bottom edge (inclusive).
    pub y2: i32,
}

impl Area {
    /// Create an area from inclusive corners.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create an area from an origin and a size.
    pub const fn from_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + w - 1,
            y2: y + h - 1,
        }
    }

    /// Width in pixels (0 for degenerate areas).
    pub fn width(&self) -> i32 {
        (self.x2 - self.x1 + 1).max(0)
    }

    /// Height in pixels (0 for degenerate areas).
    pub fn height(&self) -> i32 {
        (self.y2 - self.y1 + 1).max(0)
    }

    /// Return `true` when the area covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Translate the area in place.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x1 += dx;
        self.x2 += dx;
        self.y1 += dy;
        self.y2 += dy;
    }

    /// Keep the origin and set a new size.
    pub fn resize(&mut self, w: i32, h: i32) {
        self.x2 = self.x1 + w - 1;
        self.y2 = self.y1 + h - 1;
    }
}

/// Native 32-bit pixel, stored as `b, g, r, a` bytes.
#[repr(C)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Color32 {
    /// Blue channel.
    pub b: u8,
    /// Green channel.
    pub g: u8,
    /// Red channel.
    pub r: u8,
    /// Alpha channel (straight, not premultiplied).
    pub a: u8,
}

impl Color32 {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Default chroma key: pure green.
    pub const CHROMA_KEY: Self = Self::rgb(0, 255, 0);

    /// Opaque color from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r, a: 255 }
    }

    /// Color from components with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Opaque color from a `0xRRGGBB` value.
    pub const fn hex(v: u32) -> Self {
        Self::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Mix `fg` over `bg` with `ratio` (255 keeps `fg`, 0 keeps `bg`). The result is opaque.
    pub fn mix(fg: Self, bg: Self, ratio: u8) -> Self {
        Self {
            b: mix_channel(fg.b, bg.b, ratio),
            g: mix_channel(fg.g, bg.g, ratio),
            r: mix_channel(fg.r, bg.r, ratio),
            a: 255,
        }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Compare color channels, ignoring alpha.
    pub fn same_rgb(self, other: Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

/// Pixel layout of a decoded image buffer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    /// Not determined yet.
    #[default]
    Unknown,
    /// [`Color32`] pixels; the alpha byte is ignored.
    Native,
    /// [`Color32`] pixels with straight per-pixel alpha.
    NativeAlpha,
    /// [`Color32`] pixels where [`Color32::CHROMA_KEY`] marks transparency.
    NativeChromaKeyed,
    /// One alpha byte per pixel, tinted with the decode input color.
    Alpha8,
}

impl ColorFormat {
    /// Numeric code stored in raw image blob headers.
    pub fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Native => 4,
            Self::NativeAlpha => 5,
            Self::NativeChromaKeyed => 6,
            Self::Alpha8 => 14,
        }
    }

    /// Inverse of [`ColorFormat::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            4 => Some(Self::Native),
            5 => Some(Self::NativeAlpha),
            6 => Some(Self::NativeChromaKeyed),
            14 => Some(Self::Alpha8),
            _ => None,
        }
    }

    /// Return `true` when pixels carry their own alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::NativeAlpha | Self::Alpha8)
    }

    /// Bytes used by one pixel (0 for [`ColorFormat::Unknown`]).
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::Native | Self::NativeAlpha | Self::NativeChromaKeyed => 4,
            Self::Alpha8 => 1,
        }
    }
}

/// Image metadata produced by a decoder on open.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ImageHeader {
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
    /// Pixel layout.
    pub cf: ColorFormat,
}

impl ImageHeader {
    /// Create a header.
    pub const fn new(w: u32, h: u32, cf: ColorFormat) -> Self {
        Self { w, h, cf }
    }

    /// Bytes needed for one tightly packed row.
    pub fn row_bytes(&self) -> usize {
        (self.w as usize).saturating_mul(self.cf.bytes_per_pixel())
    }

    /// Bytes needed for the whole tightly packed image.
    pub fn byte_len(&self) -> usize {
        self.row_bytes().saturating_mul(self.h as usize)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
