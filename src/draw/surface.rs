use crate::foundation::core::{Area, Color32};
use crate::foundation::error::{ImgpipeError, ImgpipeResult};

/// Read-only pixel buffer: row-major [`Color32`] pixels with a stride in pixels.
#[derive(Clone, Copy, Debug)]
pub struct PixelBuf<'a> {
    pixels: &'a [Color32],
    stride: usize,
}

impl<'a> PixelBuf<'a> {
    /// Wrap `pixels` laid out with `stride` pixels per row.
    pub fn new(pixels: &'a [Color32], stride: usize) -> ImgpipeResult<Self> {
        if stride == 0 {
            return Err(ImgpipeError::validation("pixel buffer stride must be > 0"));
        }
        Ok(Self { pixels, stride })
    }

    /// Pixels per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of complete rows.
    pub fn height(&self) -> usize {
        self.pixels.len() / self.stride
    }

    /// Underlying pixels.
    pub fn pixels(&self) -> &'a [Color32] {
        self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<Color32> {
        index(self.stride, self.height(), x, y).map(|i| self.pixels[i])
    }

    pub(crate) fn row(&self, x: i32, y: i32, len: usize) -> Option<&'a [Color32]> {
        let start = index(self.stride, self.height(), x, y)?;
        let len = len.min(self.stride - x as usize);
        self.pixels.get(start..start + len)
    }
}

/// Writable pixel buffer, the destination side of a blit.
#[derive(Debug)]
pub struct PixelBufMut<'a> {
    pixels: &'a mut [Color32],
    stride: usize,
}

impl<'a> PixelBufMut<'a> {
    /// Wrap `pixels` laid out with `stride` pixels per row.
    pub fn new(pixels: &'a mut [Color32], stride: usize) -> ImgpipeResult<Self> {
        if stride == 0 {
            return Err(ImgpipeError::validation("pixel buffer stride must be > 0"));
        }
        Ok(Self { pixels, stride })
    }

    pub(crate) fn from_parts(pixels: &'a mut [Color32], stride: usize) -> Self {
        Self {
            pixels,
            stride: stride.max(1),
        }
    }

    /// Pixels per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of complete rows.
    pub fn height(&self) -> usize {
        self.pixels.len() / self.stride
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<Color32> {
        index(self.stride, self.height(), x, y).map(|i| self.pixels[i])
    }

    /// Store `c` at `(x, y)`; writes outside the buffer are dropped.
    pub fn set(&mut self, x: i32, y: i32, c: Color32) {
        if let Some(i) = index(self.stride, self.height(), x, y) {
            self.pixels[i] = c;
        }
    }

    /// Set every pixel of `area` to `c`, clipped to the buffer.
    pub fn fill(&mut self, area: Area, c: Color32) {
        let last_row = self.height() as i32 - 1;
        for y in area.y1.max(0)..=area.y2.min(last_row) {
            let x = area.x1.max(0);
            let len = (area.x2 - x + 1).max(0) as usize;
            if let Some(row) = self.row_mut(x, y, len) {
                row.fill(c);
            }
        }
    }

    /// Read-only view of the same pixels.
    pub fn as_buf(&self) -> PixelBuf<'_> {
        PixelBuf {
            pixels: &*self.pixels,
            stride: self.stride,
        }
    }

    pub(crate) fn row_mut(&mut self, x: i32, y: i32, len: usize) -> Option<&mut [Color32]> {
        let start = index(self.stride, self.height(), x, y)?;
        let len = len.min(self.stride - x as usize);
        self.pixels.get_mut(start..start + len)
    }
}

fn index(stride: usize, height: usize, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= stride || y >= height {
        return None;
    }
    Some(y * stride + x)
}

#[cfg(test)]
#[path = "../../tests/unit/draw/surface.rs"]
mod tests;
