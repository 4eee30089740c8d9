use crate::draw::blend::PixelBlender;
use crate::draw::dsc::DrawImageDsc;
use crate::draw::scratch::{CompositorOpts, ScratchBuffer};
use crate::draw::surface::{PixelBuf, PixelBufMut};
use crate::draw::transform::{cover_area, cover_cardinal, transform_generic};
use crate::foundation::core::{
    Area, Color32, ColorFormat, OPA_COVER, OPA_MAX, OPA_MIN, ZOOM_NONE,
};

/// The two primitive operations a blit backend provides.
///
/// [`Compositor`] chains them into the full decision tree. A hardware accelerator implements
/// this trait and reports what it can handle through [`BlitEngine::supports`].
pub trait BlitEngine {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Return `true` when [`BlitEngine::cover`] can apply this descriptor's transform.
    fn supports(&self, dsc: &DrawImageDsc) -> bool;

    /// Rotate and recolor `src_area` at full opacity into `dest` at `dest_area`.
    ///
    /// Returns the area actually written: `dest_area` moved by the pivot offset, with width and
    /// height swapped for 90 and 270 degrees.
    fn cover(
        &mut self,
        dest: &mut PixelBufMut<'_>,
        dest_area: Area,
        src: &PixelBuf<'_>,
        src_area: Area,
        dsc: &DrawImageDsc,
    ) -> Area;

    /// Blend `src_area` into `dest_area` without any transform, applying opacity, the source
    /// alpha channel and chroma keying for `cf`.
    fn composite(
        &mut self,
        dest: &mut PixelBufMut<'_>,
        dest_area: Area,
        src: &PixelBuf<'_>,
        src_area: Area,
        dsc: &DrawImageDsc,
        cf: ColorFormat,
    );
}

/// CPU blit engine; handles cardinal angles at zoom 1.0.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftwareBlitter;

impl BlitEngine for SoftwareBlitter {
    fn name(&self) -> &str {
        "software"
    }

    fn supports(&self, dsc: &DrawImageDsc) -> bool {
        dsc.is_cardinal() && dsc.zoom == ZOOM_NONE
    }

    fn cover(
        &mut self,
        dest: &mut PixelBufMut<'_>,
        dest_area: Area,
        src: &PixelBuf<'_>,
        src_area: Area,
        dsc: &DrawImageDsc,
    ) -> Area {
        cover_cardinal(dest, dest_area, src, src_area, dsc)
    }

    fn composite(
        &mut self,
        dest: &mut PixelBufMut<'_>,
        dest_area: Area,
        src: &PixelBuf<'_>,
        src_area: Area,
        dsc: &DrawImageDsc,
        cf: ColorFormat,
    ) {
        let blender = PixelBlender::new(dsc, cf);
        let w = src_area.width().min(dest_area.width());
        let h = src_area.height().min(dest_area.height());

        for y in 0..h {
            let (sy, dy) = (src_area.y1 + y, dest_area.y1 + y);
            if blender.is_copy() && src_area.x1 >= 0 && dest_area.x1 >= 0 {
                if let (Some(s), Some(d)) = (
                    src.row(src_area.x1, sy, w as usize),
                    dest.row_mut(dest_area.x1, dy, w as usize),
                ) {
                    let n = s.len().min(d.len());
                    d[..n].copy_from_slice(&s[..n]);
                }
                continue;
            }
            for x in 0..w {
                let dx = dest_area.x1 + x;
                let (Some(sp), Some(dp)) = (src.get(src_area.x1 + x, sy), dest.get(dx, dy)) else {
                    continue;
                };
                if let Some(out) = blender.blend(sp, dp) {
                    dest.set(dx, dy, out);
                }
            }
        }
    }
}

/// Draws transformed images through a [`BlitEngine`], owning the two-pass scratch buffer.
#[derive(Debug)]
pub struct Compositor<E: BlitEngine = SoftwareBlitter> {
    engine: E,
    scratch: ScratchBuffer,
}

impl Default for Compositor<SoftwareBlitter> {
    fn default() -> Self {
        Self::new(SoftwareBlitter, CompositorOpts::default())
    }
}

impl Compositor<SoftwareBlitter> {
    /// Software compositor with explicit options.
    pub fn software(opts: CompositorOpts) -> Self {
        Self::new(SoftwareBlitter, opts)
    }
}

impl<E: BlitEngine> Compositor<E> {
    /// Compositor over `engine`, with a scratch buffer sized from `opts`.
    pub fn new(engine: E, opts: CompositorOpts) -> Self {
        Self {
            engine,
            scratch: ScratchBuffer::with_capacity(opts.capacity()),
        }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The two-pass scratch buffer.
    pub fn scratch(&self) -> &ScratchBuffer {
        &self.scratch
    }

    /// Draw `src_area` of `src` into `dest_area` of `dest`.
    ///
    /// Areas must be non-degenerate; pixels falling outside either buffer are skipped. `cf` is
    /// the format the source pixels were decoded from and decides alpha and chroma-key handling.
    pub fn blit(
        &mut self,
        dest: &mut PixelBufMut<'_>,
        dest_area: Area,
        src: &PixelBuf<'_>,
        src_area: Area,
        dsc: &DrawImageDsc,
        cf: ColorFormat,
    ) {
        if dsc.opa < OPA_MIN {
            return;
        }
        if !self.engine.supports(dsc) {
            tracing::trace!(
                engine = self.engine.name(),
                angle = dsc.angle,
                zoom = dsc.zoom,
                "generic transform"
            );
            transform_generic(dest, dest_area, src, src_area, dsc, cf);
            return;
        }

        if dsc.has_recolor() || dsc.angle != 0 {
            let chroma_keyed = cf == ColorFormat::NativeChromaKeyed;
            if dsc.opa >= OPA_MAX && !cf.has_alpha() && !chroma_keyed {
                self.engine.cover(dest, dest_area, src, src_area, dsc);
            } else {
                self.blit_two_pass(dest, dest_area, src, src_area, dsc, cf);
            }
        } else {
            self.engine
                .composite(dest, dest_area, src, src_area, dsc, cf);
        }
    }

    /// Transform at full opacity into scratch, then composite the result into `dest`.
    fn blit_two_pass(
        &mut self,
        dest: &mut PixelBufMut<'_>,
        dest_area: Area,
        src: &PixelBuf<'_>,
        src_area: Area,
        dsc: &DrawImageDsc,
        cf: ColorFormat,
    ) {
        let stride = dest.stride();
        let rows = dest.height();
        let Self { engine, scratch } = self;

        // Scratch shares the destination geometry so both passes address the same area.
        let mut temp = PixelBufMut::from_parts(scratch.ensure(stride * rows), stride);
        let cover_dsc = DrawImageDsc {
            opa: OPA_COVER,
            ..*dsc
        };
        temp.fill(cover_area(dest_area, src_area, &cover_dsc), Color32::TRANSPARENT);
        let written = engine.cover(&mut temp, dest_area, src, src_area, &cover_dsc);
        tracing::trace!(?written, "two-pass blit");

        let temp = temp.as_buf();
        engine.composite(dest, written, &temp, written, dsc, cf);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/blit.rs"]
mod tests;
