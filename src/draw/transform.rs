use crate::draw::blend::{PixelBlender, recolor};
use crate::draw::dsc::DrawImageDsc;
use crate::draw::surface::{PixelBuf, PixelBufMut};
use crate::foundation::core::{Area, ColorFormat, Point, ZOOM_NONE};

/// Destination offset that turns a rotation about the buffer origin into one about `pivot`.
///
/// `angle` is in tenths of a degree; only the four cardinal angles produce an offset.
pub fn pivot_offset(angle: u16, pivot: Point, dest_w: i32, dest_h: i32) -> Point {
    let (px, py) = (pivot.x, pivot.y);
    match angle {
        900 => Point::new(px + py - dest_h, py - px),
        1800 => Point::new(2 * px - dest_w, 2 * py - dest_h),
        2700 => Point::new(px - py, px + py - dest_w),
        _ => Point::new(0, 0),
    }
}

/// Clockwise quarter turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub(crate) fn from_angle(angle: u16) -> Option<Self> {
        match angle {
            0 => Some(Self::None),
            900 => Some(Self::Cw90),
            1800 => Some(Self::Cw180),
            2700 => Some(Self::Cw270),
            _ => None,
        }
    }

    pub(crate) fn swaps_axes(self) -> bool {
        matches!(self, Self::Cw90 | Self::Cw270)
    }

    /// Output size for a `w` x `h` input.
    pub(crate) fn output_size(self, w: i32, h: i32) -> (i32, i32) {
        if self.swaps_axes() { (h, w) } else { (w, h) }
    }

    /// Source pixel shown at output pixel `(ox, oy)` of a `w` x `h` input.
    pub(crate) fn source_of(self, ox: i32, oy: i32, w: i32, h: i32) -> (i32, i32) {
        match self {
            Self::None => (ox, oy),
            Self::Cw90 => (oy, h - 1 - ox),
            Self::Cw180 => (w - 1 - ox, h - 1 - oy),
            Self::Cw270 => (w - 1 - oy, ox),
        }
    }
}

/// Rotate by a cardinal angle and recolor at full opacity, writing straight into `dest`.
///
/// The transformed region lands at `dest_area` moved by [`pivot_offset`]; the written area is
/// returned with width and height swapped for 90 and 270 degrees. Non-cardinal angles are
/// treated as 0.
pub(crate) fn cover_cardinal(
    dest: &mut PixelBufMut<'_>,
    dest_area: Area,
    src: &PixelBuf<'_>,
    src_area: Area,
    dsc: &DrawImageDsc,
) -> Area {
    let rot = Rotation::from_angle(dsc.angle).unwrap_or(Rotation::None);
    let w = src_area.width().min(dest_area.width());
    let h = src_area.height().min(dest_area.height());
    let out = cover_area(dest_area, src_area, dsc);
    let (ow, oh) = (out.width(), out.height());

    for oy in 0..oh {
        for ox in 0..ow {
            let (sx, sy) = rot.source_of(ox, oy, w, h);
            if let Some(px) = src.get(src_area.x1 + sx, src_area.y1 + sy) {
                dest.set(out.x1 + ox, out.y1 + oy, recolor(px, dsc));
            }
        }
    }
    out
}

/// Area [`cover_cardinal`] writes for these arguments.
///
/// The pivot offset always uses the full `dest_area` size, even when the source is smaller.
pub(crate) fn cover_area(dest_area: Area, src_area: Area, dsc: &DrawImageDsc) -> Area {
    let rot = Rotation::from_angle(dsc.angle).unwrap_or(Rotation::None);
    let w = src_area.width().min(dest_area.width());
    let h = src_area.height().min(dest_area.height());
    let off = pivot_offset(dsc.angle, dsc.pivot, dest_area.width(), dest_area.height());
    let (ow, oh) = rot.output_size(w, h);
    Area::from_size(dest_area.x1 + off.x, dest_area.y1 + off.y, ow, oh)
}

/// Rotate and zoom `src_area` about the pivot with nearest-neighbour sampling, compositing
/// each pixel into `dest` with the regular blend rules.
pub(crate) fn transform_generic(
    dest: &mut PixelBufMut<'_>,
    dest_area: Area,
    src: &PixelBuf<'_>,
    src_area: Area,
    dsc: &DrawImageDsc,
    cf: ColorFormat,
) {
    if dsc.zoom == 0 {
        return;
    }
    let blender = PixelBlender::new(dsc, cf);
    let (w, h) = (f64::from(src_area.width()), f64::from(src_area.height()));
    let (px, py) = (f64::from(dsc.pivot.x), f64::from(dsc.pivot.y));
    let cx = f64::from(dest_area.x1) + px;
    let cy = f64::from(dest_area.y1) + py;
    let zoom = f64::from(dsc.zoom) / f64::from(ZOOM_NONE);
    let (sin, cos) = (f64::from(dsc.angle) / 10.0).to_radians().sin_cos();

    let forward = |x: f64, y: f64| {
        let (u, v) = ((x - px) * zoom, (y - py) * zoom);
        (cx + u * cos - v * sin, cy + u * sin + v * cos)
    };
    let corners = [forward(0.0, 0.0), forward(w, 0.0), forward(0.0, h), forward(w, h)];
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor();
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max).ceil();
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor();
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max).ceil();

    let x0 = (min_x as i64).max(0) as i32;
    let y0 = (min_y as i64).max(0) as i32;
    let x1 = (max_x as i64).min(dest.stride() as i64) as i32;
    let y1 = (max_y as i64).min(dest.height() as i64) as i32;

    for dy in y0..y1 {
        for dx in x0..x1 {
            let u = (f64::from(dx) + 0.5 - cx) / zoom;
            let v = (f64::from(dy) + 0.5 - cy) / zoom;
            let lx = (u * cos + v * sin + px).floor();
            let ly = (-u * sin + v * cos + py).floor();
            if lx < 0.0 || ly < 0.0 || lx >= w || ly >= h {
                continue;
            }
            let Some(sp) = src.get(src_area.x1 + lx as i32, src_area.y1 + ly as i32) else {
                continue;
            };
            let Some(dp) = dest.get(dx, dy) else {
                continue;
            };
            if let Some(out) = blender.blend(recolor(sp, dsc), dp) {
                dest.set(dx, dy, out);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/transform.rs"]
mod tests;
