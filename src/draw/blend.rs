//! Per-pixel blend rules shared by every compositing path.

use crate::draw::dsc::DrawImageDsc;
use crate::foundation::core::{Color32, ColorFormat, OPA_MAX};
use crate::foundation::math::mul_div255_u8;

/// Inclusive per-channel color band treated as transparent in chroma-keyed images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChromaKeyRange {
    /// Lower bound per channel.
    pub low: Color32,
    /// Upper bound per channel.
    pub high: Color32,
}

impl ChromaKeyRange {
    /// Band of one step around `key`, clamped to the channel range.
    pub fn around(key: Color32) -> Self {
        Self {
            low: Color32::rgb(
                key.r.saturating_sub(1),
                key.g.saturating_sub(1),
                key.b.saturating_sub(1),
            ),
            high: Color32::rgb(
                key.r.saturating_add(1),
                key.g.saturating_add(1),
                key.b.saturating_add(1),
            ),
        }
    }

    /// Key band for a draw call, or `None` when `cf` is not chroma-keyed.
    ///
    /// With recoloring active the key is recolored the same way the source pixels are, so keyed
    /// pixels still land inside the band after the recolor pass.
    pub fn for_draw(dsc: &DrawImageDsc, cf: ColorFormat) -> Option<Self> {
        if cf != ColorFormat::NativeChromaKeyed {
            return None;
        }
        let key = if dsc.has_recolor() {
            Color32::mix(dsc.recolor, Color32::CHROMA_KEY, dsc.recolor_opa)
        } else {
            Color32::CHROMA_KEY
        };
        Some(Self::around(key))
    }

    /// Return `true` when every color channel of `c` lies inside the band. Alpha is ignored.
    pub fn contains(&self, c: Color32) -> bool {
        (self.low.r..=self.high.r).contains(&c.r)
            && (self.low.g..=self.high.g).contains(&c.g)
            && (self.low.b..=self.high.b).contains(&c.b)
    }
}

/// Where the blend ratio of a source pixel comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaMode {
    /// Global opacity only; the pixel's alpha byte is ignored.
    Override,
    /// The pixel's own alpha.
    Embedded,
    /// The pixel's alpha scaled by the global opacity.
    Multiply,
}

impl AlphaMode {
    /// Pick the mode for a global opacity and source format.
    pub fn select(opa: u8, cf: ColorFormat) -> Self {
        match (cf.has_alpha(), opa >= OPA_MAX) {
            (false, _) => Self::Override,
            (true, true) => Self::Embedded,
            (true, false) => Self::Multiply,
        }
    }
}

/// Resolved blend rules for one draw call.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PixelBlender {
    mode: AlphaMode,
    opa: u8,
    key: Option<ChromaKeyRange>,
    copy: bool,
}

impl PixelBlender {
    pub(crate) fn new(dsc: &DrawImageDsc, cf: ColorFormat) -> Self {
        let key = ChromaKeyRange::for_draw(dsc, cf);
        Self {
            mode: AlphaMode::select(dsc.opa, cf),
            opa: dsc.opa,
            copy: dsc.opa >= OPA_MAX && !cf.has_alpha() && key.is_none(),
            key,
        }
    }

    /// Straight copy, no per-pixel math needed.
    pub(crate) fn is_copy(&self) -> bool {
        self.copy
    }

    /// Blend `src` over `dst`, or `None` when the destination stays untouched.
    pub(crate) fn blend(&self, src: Color32, dst: Color32) -> Option<Color32> {
        if self.copy {
            return Some(src);
        }
        if self.key.is_some_and(|k| k.contains(src)) {
            return None;
        }
        let ratio = match self.mode {
            AlphaMode::Override => self.opa,
            AlphaMode::Embedded => src.a,
            AlphaMode::Multiply => mul_div255_u8(u16::from(src.a), u16::from(self.opa)),
        };
        match ratio {
            0 => None,
            255 => Some(src.with_alpha(255)),
            r => Some(Color32::mix(src, dst, r)),
        }
    }
}

/// Apply the descriptor's recolor to one pixel, keeping its alpha.
pub(crate) fn recolor(px: Color32, dsc: &DrawImageDsc) -> Color32 {
    if !dsc.has_recolor() {
        return px;
    }
    Color32::mix(dsc.recolor, px, dsc.recolor_opa).with_alpha(px.a)
}

#[cfg(test)]
#[path = "../../tests/unit/draw/blend.rs"]
mod tests;
