//! CPU pixel buffer behind the `RenderBackend` seam, plus the stretch blit
//! that puts it on the window surface.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::renderer::RenderBackend;

pub struct FrameBuffer {
    pub pixels: Vec<u32>,
    pub width: usize,
    pub height: usize,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    #[inline]
    fn put(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }
}

impl RenderBackend for FrameBuffer {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32) {
        if !(w > 0.0 && h > 0.0) {
            return;
        }
        // Clamp in float space first; stripes for very close walls are
        // far taller than the screen.
        let x0 = x.floor().clamp(0.0, self.width as f32) as usize;
        let x1 = (x + w).ceil().clamp(0.0, self.width as f32) as usize;
        let y0 = y.floor().clamp(0.0, self.height as f32) as usize;
        let y1 = (y + h).ceil().clamp(0.0, self.height as f32) as usize;
        for row in y0..y1 {
            let start = row * self.width;
            self.pixels[start + x0..start + x1].fill(color);
        }
    }

    fn draw_line(&mut self, from: [f32; 2], to: [f32; 2], color: u32) {
        // Bresenham on rounded endpoints
        let (mut x0, mut y0) = (from[0].round() as i32, from[1].round() as i32);
        let (x1, y1) = (to[0].round() as i32, to[1].round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn draw_circle(&mut self, center: [f32; 2], radius: f32, color: u32) {
        let r = radius.max(0.5);
        let (cx, cy) = (center[0], center[1]);
        let (y0, y1) = ((cy - r).floor() as i32, (cy + r).ceil() as i32);
        let (x0, x1) = ((cx - r).floor() as i32, (cx + r).ceil() as i32);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                if dx * dx + dy * dy <= r * r {
                    self.put(x, y, color);
                }
            }
        }
    }
}

/// Nearest-neighbour source index for every destination row and column.
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_y: Vec::new(),
        }
    }

    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        let axis = |dst: usize, src: usize| -> Vec<usize> {
            let s = src as f32 / dst.max(1) as f32;
            (0..dst)
                .map(|i| ((i as f32 * s) as usize).min(src.saturating_sub(1)))
                .collect()
        };
        Self {
            src_x: axis(dst_w, src_w),
            src_y: axis(dst_h, src_h),
        }
    }

    #[inline]
    pub fn dst_size(&self) -> (usize, usize) {
        (self.src_x.len(), self.src_y.len())
    }
}

/// Stretch `src` onto `dst` (row stride `dw`). Rows run in parallel.
pub fn present(dst: &mut [u32], dw: usize, src: &FrameBuffer, lut: &ScaleLut) {
    if dw == 0 {
        return;
    }
    dst.par_chunks_mut(dw)
        .take(lut.src_y.len())
        .enumerate()
        .for_each(|(y, dst_row)| {
            let row = lut.src_y[y] * src.width;
            for (d, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
                *d = src.pixels[row + sx];
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_clips_to_buffer() {
        let mut fb = FrameBuffer::new(8, 6);
        fb.fill_rect(6.0, -100.0, 10.0, 1000.0, 7);
        assert_eq!(fb.get(6, 0), Some(7));
        assert_eq!(fb.get(7, 5), Some(7));
        assert_eq!(fb.get(5, 3), Some(0));
        fb.fill_rect(0.0, 0.0, 0.0, 5.0, 9);
        assert_eq!(fb.get(0, 0), Some(0));
    }

    #[test]
    fn test_line_reaches_both_ends() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_line([1.0, 1.0], [8.0, 4.0], 3);
        assert_eq!(fb.get(1, 1), Some(3));
        assert_eq!(fb.get(8, 4), Some(3));
        // off-screen segments are clipped per pixel
        fb.draw_line([-5.0, -5.0], [20.0, 20.0], 4);
        assert_eq!(fb.get(9, 9), Some(4));
    }

    #[test]
    fn test_circle_is_filled() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_circle([5.0, 5.0], 2.0, 1);
        assert_eq!(fb.get(5, 5), Some(1));
        assert_eq!(fb.get(4, 4), Some(1));
        assert_eq!(fb.get(0, 0), Some(0));
    }

    #[test]
    fn test_present_doubles_pixels() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.pixels.copy_from_slice(&[1, 2, 3, 4]);
        let lut = ScaleLut::new(4, 4, 2, 2);
        assert_eq!(lut.dst_size(), (4, 4));
        let mut dst = vec![0u32; 16];
        present(&mut dst, 4, &fb, &lut);
        assert_eq!(&dst[0..4], &[1, 1, 2, 2]);
        assert_eq!(&dst[12..16], &[3, 3, 4, 4]);
    }
}
