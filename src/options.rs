/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Parsing and management of user-configurable options for the emulation
//! layer.

pub const DOCUMENTATION: &str = "\
Display options:
    --gl-screen=...
        Sets the size of the legacy screen, in pixels, as WIDTHxHEIGHT.

        The default is 400x240, the size of the top screen. Legacy window
        coordinates (viewport, scissor, glCopyTexSubImage2D) are relative to
        this size.

    --gl-no-tilt
        Declares that the native framebuffer has the same orientation as the
        legacy screen.

        By default the framebuffer is assumed to be stored in portrait
        orientation, rotated 90° from the landscape screen. The projection
        matrix and all window rectangles are then rotated to match.

Matrix options:
    --gl-matrix-stack-depth=...
        Sets how many matrices glPushMatrix can save on each matrix stack.

        The default is 32. Pushing onto a full stack is ignored.

        This is a natural number that is at least 1.
";

/// Struct containing all user-configurable options.
#[derive(Clone, Debug)]
pub struct Options {
    pub screen_width: u16,
    pub screen_height: u16,
    pub tilt: bool,
    pub matrix_stack_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            screen_width: 400,
            screen_height: 240,
            tilt: true,
            matrix_stack_depth: 32,
        }
    }
}

/// A rectangle in native framebuffer coordinates, in the form the PICA
/// scissor and viewport registers take it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NativeRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Options {
    /// Parse the command-line argument syntax for an option. Returns `Ok(true)`
    /// if the option was valid and has been applied, and `Ok(false)` if the
    /// option was not recognized.
    pub fn parse_argument(&mut self, arg: &str) -> Result<bool, String> {
        if let Some(value) = arg.strip_prefix("--gl-screen=") {
            let (width, height) = value
                .split_once('x')
                .ok_or_else(|| "Screen size must be written as WIDTHxHEIGHT".to_string())?;
            let width: u16 = width
                .parse()
                .map_err(|_| "Invalid screen width".to_string())?;
            let height: u16 = height
                .parse()
                .map_err(|_| "Invalid screen height".to_string())?;
            if width == 0 || height == 0 {
                return Err("Screen size must not be zero".to_string());
            }
            self.screen_width = width;
            self.screen_height = height;
        } else if arg == "--gl-no-tilt" {
            self.tilt = false;
        } else if let Some(value) = arg.strip_prefix("--gl-matrix-stack-depth=") {
            let depth: usize = value
                .parse()
                .map_err(|_| "Invalid matrix stack depth".to_string())?;
            if depth == 0 {
                return Err("Matrix stack depth must be at least 1".to_string());
            }
            self.matrix_stack_depth = depth;
        } else {
            return Ok(false);
        };
        Ok(true)
    }

    /// Convert a legacy window rectangle (origin at the bottom-left of the
    /// screen) to native framebuffer coordinates. The part left of or below
    /// the screen is clipped off.
    pub fn native_rect(&self, x: i32, y: i32, width: i32, height: i32) -> NativeRect {
        let clip = |origin: i32, size: i32| {
            let size = size.max(0).saturating_add(origin.min(0)).max(0);
            (origin.max(0) as u32, size as u32)
        };
        let (x, width) = clip(x, width);
        let (y, height) = clip(y, height);
        if self.tilt {
            // The framebuffer's rows are the screen's columns.
            NativeRect {
                x: y,
                y: x,
                width: height,
                height: width,
            }
        } else {
            NativeRect {
                x,
                y,
                width,
                height,
            }
        }
    }

    /// Convert a legacy viewport to native coordinates. Unlike
    /// [Options::native_rect] the origin stays signed, so a viewport hanging
    /// off the screen keeps its scale.
    pub fn native_viewport(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> (i32, i32, u32, u32) {
        let (width, height) = (width.max(0) as u32, height.max(0) as u32);
        if self.tilt {
            (y, x, height, width)
        } else {
            (x, y, width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let mut options = Options::default();
        assert_eq!(options.parse_argument("--gl-screen=320x200"), Ok(true));
        assert_eq!((options.screen_width, options.screen_height), (320, 200));
        assert_eq!(options.parse_argument("--gl-no-tilt"), Ok(true));
        assert!(!options.tilt);
        assert_eq!(options.parse_argument("--gl-matrix-stack-depth=4"), Ok(true));
        assert_eq!(options.matrix_stack_depth, 4);
        assert_eq!(options.parse_argument("--fullscreen"), Ok(false));
        assert!(options.parse_argument("--gl-screen=320").is_err());
        assert!(options.parse_argument("--gl-matrix-stack-depth=0").is_err());
    }

    #[test]
    fn tilted_rect_is_transposed() {
        let options = Options::default();
        assert_eq!(
            options.native_rect(10, 20, 100, 50),
            NativeRect {
                x: 20,
                y: 10,
                width: 50,
                height: 100
            }
        );
        let options = Options {
            tilt: false,
            ..Options::default()
        };
        assert_eq!(
            options.native_rect(-5, 20, 100, 50),
            NativeRect {
                x: 0,
                y: 20,
                width: 95,
                height: 50
            }
        );
    }

    #[test]
    fn off_screen_rect_is_clipped() {
        let options = Options::default();
        assert_eq!(
            options.native_rect(-10, -30, 420, 20),
            NativeRect {
                x: 0,
                y: 0,
                width: 0,
                height: 410
            }
        );
    }

    #[test]
    fn viewport_keeps_signed_origin() {
        let options = Options::default();
        assert_eq!(options.native_viewport(-10, 0, 420, 240), (0, -10, 240, 420));
        let options = Options {
            tilt: false,
            ..Options::default()
        };
        assert_eq!(options.native_viewport(-10, 0, 420, 240), (-10, 0, 420, 240));
    }
}
