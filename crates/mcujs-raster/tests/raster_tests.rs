//! End-to-end rasteriser scenarios against an in-memory pixel sink.

use mcujs_raster::{Graphics, PixelSink};

/// A plain `Vec<u32>` framebuffer, standing in for a real backend so these
/// tests can assert on exact pixel values without touching the heap.
struct MemSink {
    width: i16,
    height: i16,
    pixels: Vec<u32>,
}

impl MemSink {
    fn new(width: i16, height: i16) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    fn idx(&self, x: i16, y: i16) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl PixelSink for MemSink {
    fn set_pixel(&mut self, x: i16, y: i16, col: u32) {
        let i = self.idx(x, y);
        self.pixels[i] = col;
    }

    fn get_pixel(&self, x: i16, y: i16) -> u32 {
        self.pixels[self.idx(x, y)]
    }

    fn fill_rect(&mut self, x1: i16, y1: i16, x2: i16, y2: i16, col: u32) {
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let (y1, y2) = (y1.min(y2), y1.max(y2));
        for y in y1..=y2 {
            for x in x1..=x2 {
                self.set_pixel(x, y, col);
            }
        }
    }
}

fn graphics(sink: MemSink) -> Graphics {
    Graphics::new(sink.width, sink.height, 1, Box::new(sink))
}

#[test]
fn test_draw_line_bresenham_matches_expected_pixel_set() {
    let sink = MemSink::new(16, 16);
    let mut g = graphics(sink);
    g.draw_line(0, 0, 9, 3);

    let expected: &[(i16, i16)] = &[
        (0, 0),
        (1, 0),
        (2, 1),
        (3, 1),
        (4, 1),
        (5, 2),
        (6, 2),
        (7, 2),
        (8, 3),
        (9, 3),
    ];
    for &(x, y) in expected {
        assert_eq!(g.get_pixel(x, y), 1, "expected ({x},{y}) to be set");
    }
    // Nothing on the next row down should have been touched.
    for x in 0..10 {
        assert_eq!(g.get_pixel(x, 4), 0);
    }
}

#[test]
fn test_fill_poly_triangle_fills_interior_only() {
    let sink = MemSink::new(16, 16);
    let mut g = graphics(sink);
    g.fill_poly(&[(0, 0), (10, 0), (5, 10)]);

    assert_eq!(g.get_pixel(5, 5), 1, "triangle interior must be filled");
    assert_eq!(g.get_pixel(5, 0), 1, "top edge must be filled");
    assert_eq!(g.get_pixel(0, 9), 0, "bottom-left corner is outside the triangle");
    assert_eq!(g.get_pixel(10, 9), 0, "bottom-right corner is outside the triangle");
}

#[test]
fn test_draw_rect_outlines_without_filling_interior() {
    let sink = MemSink::new(16, 16);
    let mut g = graphics(sink);
    g.draw_rect(2, 2, 6, 6);

    assert_eq!(g.get_pixel(2, 2), 1);
    assert_eq!(g.get_pixel(6, 6), 1);
    assert_eq!(g.get_pixel(4, 2), 1, "top edge");
    assert_eq!(g.get_pixel(4, 4), 0, "interior stays unset");
}

#[test]
fn test_clear_fills_with_background_colour() {
    let sink = MemSink::new(4, 4);
    let mut g = graphics(sink);
    g.set_bg_color(0);
    g.set_pixel(1, 1, 1);
    g.clear();
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(g.get_pixel(x, y), 0);
        }
    }
}

#[test]
fn test_bitmap_1bit_draws_row_major_lsb_first() {
    let sink = MemSink::new(8, 8);
    let mut g = graphics(sink);
    // A single row, 4 pixels wide: bits 1,0,1,0 (LSB first) -> 0b0101 = 0x05.
    g.bitmap_1bit(0, 0, 4, 1, &[0b0000_0101]);
    assert_eq!(g.get_pixel(0, 0), 1);
    assert_eq!(g.get_pixel(1, 0), 0);
    assert_eq!(g.get_pixel(2, 0), 1);
    assert_eq!(g.get_pixel(3, 0), 0);
}

#[test]
fn test_draw_string_advances_four_pixels_per_character() {
    let sink = MemSink::new(32, 8);
    let mut g = graphics(sink);
    g.draw_string(0, 0, "AB");
    // 'B' starts 4px after 'A' and its first column is a full vertical
    // stroke, so some pixel in column 4 must be set.
    let mut any_in_second_glyph = false;
    for y in 0..6 {
        if g.get_pixel(4, y) == 1 {
            any_in_second_glyph = true;
        }
    }
    assert!(any_in_second_glyph, "second glyph must render at its advanced position");
}

#[test]
fn test_fill_vector_char_returns_a_nonzero_advance_width() {
    let sink = MemSink::new(32, 32);
    let mut g = graphics(sink);
    let advance = g.fill_vector_char(0, 0, 24, b'5');
    assert!(advance > 0);
}

#[test]
fn test_splash_draws_without_panicking() {
    let sink = MemSink::new(64, 32);
    let mut g = graphics(sink);
    g.splash();
}
