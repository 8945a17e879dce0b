//! Component I — the rasteriser itself.
//!
//! `Graphics` owns the width/height/bpp/colour state from §4.I and drives a
//! pluggable [`crate::sink::PixelSink`] rather than the original's four raw
//! function pointers — the idiomatic-Rust shape for "backend installs its
//! own implementation of a handful of operations" (see `otter-sql`'s
//! `SqlAdapter` trait for the same pattern in the teacher's stack).

use crate::font::{self, VECTOR_FONT_MAX_POLY_SIZE, VECTOR_FONT_OFFSET, VECTOR_FONT_POLY_SEPARATOR, VECTOR_FONT_POLY_SIZE};
use crate::sink::PixelSink;

/// Clamp to the coordinate range valid for a rasteriser: signed 16-bit,
/// saturating rather than wrapping (§4.I "overflow ... is clamped to
/// ±32767").
#[inline]
fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// The rasteriser state from §4.I, parameterised over its pixel backend.
pub struct Graphics {
    width: i16,
    height: i16,
    bpp: u8,
    fg_color: u32,
    bg_color: u32,
    sink: Box<dyn PixelSink>,
    interrupted: Box<dyn Fn() -> bool>,
}

impl Graphics {
    pub fn new(width: i16, height: i16, bpp: u8, sink: Box<dyn PixelSink>) -> Self {
        Self {
            width,
            height,
            bpp,
            fg_color: (1u32 << bpp.min(31)).wrapping_sub(1),
            bg_color: 0,
            sink,
            interrupted: Box::new(|| false),
        }
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn bpp(&self) -> u8 {
        self.bpp
    }

    pub fn fg_color(&self) -> u32 {
        self.fg_color
    }

    pub fn set_fg_color(&mut self, c: u32) {
        self.fg_color = c;
    }

    pub fn bg_color(&self) -> u32 {
        self.bg_color
    }

    pub fn set_bg_color(&mut self, c: u32) {
        self.bg_color = c;
    }

    /// Installs a host-provided "should I bail out of a long scan?" check,
    /// consulted by `fill_poly` between scanlines (§5 cooperative cancel).
    pub fn set_interrupt_check(&mut self, check: Box<dyn Fn() -> bool>) {
        self.interrupted = check;
    }

    /// `graphicsSetPixel`: clips to bounds and masks to `bpp` bits.
    pub fn set_pixel(&mut self, x: i16, y: i16, col: u32) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        let mask = if self.bpp >= 32 { u32::MAX } else { (1u32 << self.bpp) - 1 };
        self.sink.set_pixel(x, y, col & mask);
    }

    pub fn get_pixel(&self, x: i16, y: i16) -> u32 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return 0;
        }
        self.sink.get_pixel(x, y)
    }

    /// `graphicsFillRect`: fills with the current foreground colour.
    pub fn fill_rect(&mut self, x1: i16, y1: i16, x2: i16, y2: i16) {
        self.sink.fill_rect(x1, y1, x2, y2, self.fg_color);
    }

    /// `graphicsFallbackBitmap1bit`: draws a row-major, LSB-first 1-bit
    /// bitmap by dispatching to `set_pixel` per bit (fg for `1`, bg for
    /// `0`). Backends may override this via `PixelSink::bitmap_1bit` for a
    /// faster path; the default here is the software fallback.
    pub fn bitmap_1bit(&mut self, x1: i16, y1: i16, width: u16, height: u16, data: &[u8]) {
        let (fg, bg) = (self.fg_color, self.bg_color);
        for y in 0..height {
            for x in 0..width {
                let bit_offset = x as i64 + (y as i64) * width as i64;
                let byte = data.get((bit_offset >> 3) as usize).copied().unwrap_or(0);
                let bit = (byte >> (bit_offset & 7)) & 1;
                self.set_pixel(x1 + x as i16, y1 + y as i16, if bit != 0 { fg } else { bg });
            }
        }
    }

    /// `graphicsClear`: fills with the background colour.
    pub fn clear(&mut self) {
        let fg = self.fg_color;
        self.fg_color = self.bg_color;
        self.fill_rect(0, 0, self.width - 1, self.height - 1);
        self.fg_color = fg;
    }

    /// `graphicsDrawRect`: four thin `fill_rect`s rather than per-pixel
    /// writes, same as the original.
    pub fn draw_rect(&mut self, x1: i16, y1: i16, x2: i16, y2: i16) {
        self.fill_rect(x1, y1, x2, y1);
        self.fill_rect(x2, y1, x2, y2);
        self.fill_rect(x1, y2, x2, y2);
        self.fill_rect(x1, y2, x1, y1);
    }

    /// `graphicsDrawLine`: integer Bresenham-like, axis chosen by the
    /// longer delta, 8.8 fixed-point step, endpoints swapped to scan
    /// monotonically in the chosen axis.
    pub fn draw_line(&mut self, mut x1: i16, mut y1: i16, mut x2: i16, mut y2: i16) {
        let mut xl = (x2 as i32) - (x1 as i32);
        let mut yl = (y2 as i32) - (y1 as i32);
        if xl < 0 {
            xl = -xl;
        } else if xl == 0 {
            xl = 1;
        }
        if yl < 0 {
            yl = -yl;
        } else if yl == 0 {
            yl = 1;
        }
        let fg = self.fg_color;
        if xl > yl {
            if x1 > x2 {
                std::mem::swap(&mut x1, &mut x2);
                std::mem::swap(&mut y1, &mut y2);
            }
            let mut pos = ((y1 as i32) << 8) + 128;
            let step = (((y2 as i32) - (y1 as i32)) << 8) / xl;
            let mut x = x1;
            while x <= x2 {
                self.set_pixel(x, (pos >> 8) as i16, fg);
                pos += step;
                if x == i16::MAX {
                    break;
                }
                x += 1;
            }
        } else {
            if y1 > y2 {
                std::mem::swap(&mut x1, &mut x2);
                std::mem::swap(&mut y1, &mut y2);
            }
            let mut pos = ((x1 as i32) << 8) + 128;
            let step = (((x2 as i32) - (x1 as i32)) << 8) / yl;
            let mut y = y1;
            while y <= y2 {
                self.set_pixel((pos >> 8) as i16, y, fg);
                pos += step;
                if y == i16::MAX {
                    break;
                }
                y += 1;
            }
        }
    }

    /// `graphicsFillPolyCreateVertScanLines`: records, per column `x`, the
    /// min/max `y` any edge crosses. Vertical-scanline variant only — see
    /// `DESIGN.md` for why the horizontal alternative isn't also shipped.
    fn fill_poly_scan_edge(&self, miny: &mut [i16], maxy: &mut [i16], mut x1: i16, mut y1: i16, mut x2: i16, mut y2: i16) {
        if x2 < x1 {
            std::mem::swap(&mut x1, &mut x2);
            std::mem::swap(&mut y1, &mut y2);
        }
        let mut yh = (y1 as i32) * 256;
        let mut xl = (x2 as i32) - (x1 as i32);
        if xl == 0 {
            xl = 1;
        }
        let stepy = (((y2 as i32) - (y1 as i32)) * 256) / xl;
        let mut x = x1;
        loop {
            let y = clamp_i16(yh >> 8);
            if x >= 0 && (x as usize) < miny.len() {
                let idx = x as usize;
                if y < miny[idx] {
                    miny[idx] = y;
                }
                if y > maxy[idx] {
                    maxy[idx] = y;
                }
            }
            yh += stepy;
            if x == x2 {
                break;
            }
            x += 1;
        }
    }

    /// `graphicsFillPoly`: scanline fill over a closed polygon given as
    /// flattened `(x, y)` pairs. Adjacent identical spans coalesce into one
    /// `fill_rect`; polls the interrupt check between columns.
    pub fn fill_poly(&mut self, vertices: &[(i16, i16)]) {
        if vertices.len() < 2 {
            return;
        }
        let mut minx = self.width - 1;
        let mut maxx: i16 = 0;
        for &(x, _) in vertices {
            if x < minx {
                minx = x;
            }
            if x > maxx {
                maxx = x;
            }
        }
        if minx < 0 {
            minx = 0;
        }
        if maxx >= self.width {
            maxx = self.width - 1;
        }
        if minx > maxx {
            return;
        }

        let span = (maxx - minx + 1) as usize;
        let mut miny = vec![self.height - 1; span];
        let mut maxy = vec![0i16; span];

        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (x1, y1) = vertices[j];
            let (x2, y2) = vertices[i];
            self.fill_poly_scan_edge(&mut miny[..], &mut maxy[..], x1 - minx, y1, x2 - minx, y2);
            j = i;
        }

        let mut x = 0usize;
        while x < span {
            if maxy[x] >= miny[x] {
                let mut lo = miny[x];
                let mut hi = maxy[x];
                if lo < 0 {
                    lo = 0;
                }
                if hi >= self.height {
                    hi = self.height - 1;
                }
                let old_x = x;
                while x + 1 < span && miny[x + 1] == miny[old_x] && maxy[x + 1] == maxy[old_x] {
                    x += 1;
                }
                self.fill_rect(old_x as i16 + minx, lo, x as i16 + minx, hi);
                if (self.interrupted)() {
                    break;
                }
            }
            x += 1;
        }
    }

    /// `graphicsDrawChar4x6`: one glyph at `(x, y)`, column by column.
    fn draw_char_4x6(&mut self, x: i16, y: i16, ch: u8) {
        let glyph = font::glyph_4x6(ch);
        let fg = self.fg_color;
        for (col, byte) in glyph.iter().enumerate() {
            for row in 0..font::FONT_4X6_HEIGHT {
                if byte & (1 << row) != 0 {
                    self.set_pixel(x + col as i16, y + row as i16, fg);
                }
            }
        }
    }

    /// `graphicsDrawString`: advances 4 pixels per character.
    pub fn draw_string(&mut self, x: i16, y: i16, s: &str) {
        let mut cx = x;
        for &b in s.as_bytes() {
            self.draw_char_4x6(cx, y, b);
            cx = cx.saturating_add(4);
        }
    }

    /// `graphicsFillVectorChar`: dispatches each 0x80-terminated sub-polygon
    /// to `fill_poly`, returns the glyph's advance width.
    pub fn fill_vector_char(&mut self, x: i16, y: i16, size: i16, ch: u8) -> u32 {
        if size < 0 || ch < VECTOR_FONT_OFFSET {
            return 0;
        }
        let idx = (ch - VECTOR_FONT_OFFSET) as usize;
        let Some(meta) = font::VECTOR_FONT_CHARS.get(idx) else {
            return 0;
        };
        let Some(verts) = font::vector_glyph_verts(ch) else {
            return 0;
        };

        let mut buf: Vec<(i16, i16)> = Vec::with_capacity(VECTOR_FONT_MAX_POLY_SIZE);
        let mut i = 0;
        let byte_count = meta.vert_count * 2;
        while i < byte_count && i + 1 < verts.len() {
            let raw_x = (verts[i] & 0x7F) as i32;
            let raw_y_byte = verts[i + 1];
            let raw_y = (raw_y_byte & 0x7F) as i32;
            let px = x as i32 + (raw_x * size as i32 + VECTOR_FONT_POLY_SIZE / 2) / VECTOR_FONT_POLY_SIZE;
            let py = y as i32 + (raw_y * size as i32 + VECTOR_FONT_POLY_SIZE / 2) / VECTOR_FONT_POLY_SIZE;
            buf.push((clamp_i16(px), clamp_i16(py)));
            let is_last = raw_y_byte & VECTOR_FONT_POLY_SEPARATOR != 0;
            i += 2;
            if is_last {
                self.fill_poly(&buf);
                buf.clear();
                if (self.interrupted)() {
                    break;
                }
            }
        }
        ((meta.width * size as i32) / (VECTOR_FONT_POLY_SIZE * 2)) as u32
    }

    /// `graphicsSplash`.
    pub fn splash(&mut self) {
        self.draw_string(0, 0, "mcujs");
        self.draw_string(0, 6, "  Embedded JavaScript");
        self.draw_string(0, 12, "  heap + rasteriser");
    }
}
