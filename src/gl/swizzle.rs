/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Conversion between linear RGBA8 pixels and the native texture layout.
//!
//! Native textures are split into 8×8 tiles, stored left to right and then
//! bottom to top. Pixels within a tile are in Morton (Z-order) order, and each
//! pixel's bytes are A, B, G, R. The first row of a legacy buffer is the bottom
//! row of the image, which is also where native tile row 0 is, so no vertical
//! flip is involved.

use crate::pica::Framebuffer;

type Pixel = [u8; 4];

/// Position of pixel `(x, y)` within its 8×8 tile.
fn morton(x: u32, y: u32) -> u32 {
    let mut index = 0;
    for bit in 0..3 {
        index |= ((x >> bit) & 1) << (2 * bit);
        index |= ((y >> bit) & 1) << (2 * bit + 1);
    }
    index
}

/// Pixel index of `(x, y)` in a tiled texture `width` pixels wide.
pub fn tiled_index(x: u32, y: u32, width: u32) -> usize {
    let tile = (y / 8) * (width / 8) + x / 8;
    (tile * 64 + morton(x % 8, y % 8)) as usize
}

fn rgba_to_native([r, g, b, a]: Pixel) -> Pixel {
    [a, b, g, r]
}

fn native_to_rgba([a, b, g, r]: Pixel) -> Pixel {
    [r, g, b, a]
}

/// Swizzle a linear RGBA8 image into native layout. Both buffers must hold
/// exactly `width * height` pixels, and the dimensions must be multiples of 8.
pub fn linear_to_tiled(width: u32, height: u32, linear: &[u8], tiled: &mut [u8]) {
    let linear: &[Pixel] = bytemuck::cast_slice(linear);
    let tiled: &mut [Pixel] = bytemuck::cast_slice_mut(tiled);
    assert_eq!(linear.len(), (width * height) as usize);
    assert_eq!(tiled.len(), linear.len());
    for (y, row) in linear.chunks_exact(width as usize).enumerate() {
        for (x, &pixel) in row.iter().enumerate() {
            tiled[tiled_index(x as u32, y as u32, width)] = rgba_to_native(pixel);
        }
    }
}

/// Inverse of [linear_to_tiled].
pub fn tiled_to_linear(width: u32, height: u32, tiled: &[u8], linear: &mut [u8]) {
    let tiled: &[Pixel] = bytemuck::cast_slice(tiled);
    let linear: &mut [Pixel] = bytemuck::cast_slice_mut(linear);
    assert_eq!(linear.len(), (width * height) as usize);
    assert_eq!(tiled.len(), linear.len());
    for (y, row) in linear.chunks_exact_mut(width as usize).enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = native_to_rgba(tiled[tiled_index(x as u32, y as u32, width)]);
        }
    }
}

/// Expand tightly packed RGB8 pixels to RGBA8 with full alpha.
pub fn rgb_to_rgba(rgb: &[u8], rgba: &mut [u8]) {
    let rgba: &mut [Pixel] = bytemuck::cast_slice_mut(rgba);
    for (out, pixel) in rgba.iter_mut().zip(rgb.chunks_exact(3)) {
        *out = [pixel[0], pixel[1], pixel[2], 0xFF];
    }
}

/// Copy a `width`×`height` rectangle of the framebuffer, with its bottom-left
/// corner at legacy window co-ordinates `(x, y)`, into a linear RGBA8 buffer.
/// Works for either framebuffer orientation.
/// The rectangle must lie within the screen.
pub fn gather_framebuffer(
    framebuffer: &Framebuffer,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    linear: &mut [u8],
) {
    let linear: &mut [Pixel] = bytemuck::cast_slice_mut(linear);
    assert_eq!(linear.len(), (width * height) as usize);
    assert!(x + width <= framebuffer.screen_width.into());
    assert!(y + height <= framebuffer.screen_height.into());
    if width == 0 {
        return;
    }
    let source: &[Pixel] = bytemuck::cast_slice(framebuffer.pixels);
    for (row_index, row) in linear.chunks_exact_mut(width as usize).enumerate() {
        for (column_index, pixel) in row.iter_mut().enumerate() {
            let offset = framebuffer.offset(x + column_index as u32, y + row_index as u32);
            *pixel = native_to_rgba(source[offset / 4]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if (x + y) % 2 == 0 {
                    pixels.extend_from_slice(&[0xFF, 0x80, 0x00, 0xFF]);
                } else {
                    pixels.extend_from_slice(&[0x00, 0x40, 0xC0, 0x7F]);
                }
            }
        }
        pixels
    }

    #[test]
    fn morton_order() {
        assert_eq!(tiled_index(0, 0, 16), 0);
        assert_eq!(tiled_index(1, 0, 16), 1);
        assert_eq!(tiled_index(0, 1, 16), 2);
        assert_eq!(tiled_index(1, 1, 16), 3);
        assert_eq!(tiled_index(2, 0, 16), 4);
        assert_eq!(tiled_index(7, 7, 16), 63);
        assert_eq!(tiled_index(8, 0, 16), 64);
        assert_eq!(tiled_index(0, 8, 16), 128);
    }

    #[test]
    fn channels_are_reversed() {
        let linear = [[1u8, 2, 3, 4]; 64].concat();
        let mut tiled = vec![0; 64 * 4];
        linear_to_tiled(8, 8, &linear, &mut tiled);
        assert_eq!(&tiled[0..4], &[4, 3, 2, 1]);
    }

    #[test]
    fn round_trip() {
        let linear = checkerboard(32, 16);
        let mut tiled = vec![0; linear.len()];
        linear_to_tiled(32, 16, &linear, &mut tiled);
        assert_ne!(tiled, linear);
        let mut back = vec![0; linear.len()];
        tiled_to_linear(32, 16, &tiled, &mut back);
        assert_eq!(back, linear);
    }

    #[test]
    fn rgb_expansion() {
        let mut rgba = [0; 8];
        rgb_to_rgba(&[1, 2, 3, 4, 5, 6], &mut rgba);
        assert_eq!(rgba, [1, 2, 3, 0xFF, 4, 5, 6, 0xFF]);
    }

    #[test]
    fn gather_transposes() {
        let (screen_width, screen_height) = (4u16, 2u16);
        let mut pixels = vec![0; 4 * 2 * 4];
        let framebuffer = Framebuffer {
            screen_width,
            screen_height,
            tilted: true,
            pixels: &pixels,
        };
        // Screen pixel (3, 1), stored as A, B, G, R.
        let offset = framebuffer.offset(3, 1);
        pixels[offset..offset + 4].copy_from_slice(&[4, 3, 2, 1]);
        let framebuffer = Framebuffer {
            screen_width,
            screen_height,
            tilted: true,
            pixels: &pixels,
        };
        let mut linear = vec![0; 2 * 2 * 4];
        gather_framebuffer(&framebuffer, 2, 0, 2, 2, &mut linear);
        // Row 1, column 1 of the copy.
        assert_eq!(&linear[12..16], &[1, 2, 3, 4]);
        assert_eq!(&linear[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn gather_untilted() {
        let mut pixels = vec![0; 4 * 2 * 4];
        // Screen pixel (1, 0) of a row-major framebuffer.
        pixels[4..8].copy_from_slice(&[4, 3, 2, 1]);
        let framebuffer = Framebuffer {
            screen_width: 4,
            screen_height: 2,
            tilted: false,
            pixels: &pixels,
        };
        let mut linear = vec![0; 2 * 2 * 4];
        gather_framebuffer(&framebuffer, 0, 0, 2, 2, &mut linear);
        assert_eq!(&linear[4..8], &[1, 2, 3, 4]);
        assert_eq!(&linear[8..12], &[0, 0, 0, 0]);
    }
}
