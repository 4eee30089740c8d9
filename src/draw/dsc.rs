use crate::foundation::core::{Color32, OPA_COVER, OPA_TRANSP, Point, ZOOM_NONE};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};

/// Largest rotation angle, in tenths of a degree.
pub const ANGLE_MAX: u16 = 3599;

/// Per-draw transform and blend parameters.
///
/// The compositor only ever reads a descriptor; build a new one for every draw call that needs
/// different parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DrawImageDsc {
    /// Global opacity.
    pub opa: u8,
    /// Color mixed into every source pixel.
    pub recolor: Color32,
    /// Strength of `recolor`; [`OPA_TRANSP`] disables recoloring.
    pub recolor_opa: u8,
    /// Rotation in tenths of a degree, clockwise (`0..=3599`).
    pub angle: u16,
    /// Scale factor, fixed point with 256 meaning 1.0.
    pub zoom: u16,
    /// Rotation and zoom center, relative to the destination area origin.
    pub pivot: Point,
}

impl Default for DrawImageDsc {
    fn default() -> Self {
        Self {
            opa: OPA_COVER,
            recolor: Color32::BLACK,
            recolor_opa: OPA_TRANSP,
            angle: 0,
            zoom: ZOOM_NONE,
            pivot: Point::default(),
        }
    }
}

impl DrawImageDsc {
    /// Descriptor with opaque, untransformed defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global opacity.
    pub fn with_opa(mut self, opa: u8) -> Self {
        self.opa = opa;
        self
    }

    /// Set the recolor color and its strength.
    pub fn with_recolor(mut self, recolor: Color32, recolor_opa: u8) -> Self {
        self.recolor = recolor;
        self.recolor_opa = recolor_opa;
        self
    }

    /// Set the rotation angle in tenths of a degree.
    pub fn with_angle(mut self, angle: u16) -> Self {
        self.angle = angle;
        self
    }

    /// Set the zoom factor (256 = 1.0).
    pub fn with_zoom(mut self, zoom: u16) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the pivot relative to the destination area.
    pub fn with_pivot(mut self, x: i32, y: i32) -> Self {
        self.pivot = Point::new(x, y);
        self
    }

    /// Return `true` when recoloring is active.
    pub fn has_recolor(&self) -> bool {
        self.recolor_opa != OPA_TRANSP
    }

    /// Return `true` for 0, 90, 180 and 270 degrees.
    pub fn is_cardinal(&self) -> bool {
        matches!(self.angle, 0 | 900 | 1800 | 2700)
    }

    /// Check the parameter ranges.
    pub fn validate(&self) -> ImgpipeResult<()> {
        if self.angle > ANGLE_MAX {
            return Err(ImgpipeError::validation(format!(
                "angle {} is outside 0..={ANGLE_MAX}",
                self.angle
            )));
        }
        if self.zoom == 0 {
            return Err(ImgpipeError::validation("zoom must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/dsc.rs"]
mod tests;
