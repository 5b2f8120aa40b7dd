/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Legacy OpenGL abstraction and its implementation on the PICA200.
//!
//! The game renders with a small subset of OpenGL 1.x: capability flags, a
//! `glBegin`/`glEnd` bracket, the three matrix stacks, texture objects and the
//! texture environment. The PICA200 supports none of these directly, so they
//! are emulated in a series of layers:
//!
//! - [gl_generic] provides the legacy interface as a trait.
//! - [gl_on_pica] implements it on top of [crate::pica::Pica]. It is built
//!   from the following pieces, leaf first:
//!   - [translate] maps legacy enumerants to native ones.
//!   - [render_state] tracks state set outside draw brackets and turns it into
//!     native state when a bracket opens.
//!   - [matrix_stack] holds the model-view, projection and texture stacks.
//!   - [textures] is the texture object registry.
//!   - [swizzle] converts pixels between the linear legacy layout and the
//!     tiled native layout.
//! - [gl_raw] provides the constants and types of OpenGL 1.5 compatibility
//!   profile, generated from the Khronos API registry. Its functions are
//!   never loaded.
//!
//! Useful resources:
//! - [Reference pages](https://registry.khronos.org/OpenGL-Refpages/gl2.1/)
//! - [Specification](https://registry.khronos.org/OpenGL/specs/gl/glspec15.pdf)
//! - [citro3d](https://github.com/devkitPro/citro3d), whose API shape
//!   [crate::pica::Pica] follows.

pub mod gl_generic;
pub mod gl_on_pica;
mod matrix_stack;
pub mod render_state;
mod swizzle;
mod textures;
mod translate;
mod util;

pub use pica_gl_bindings::gl15 as gl_raw;

pub use gl_generic::GL;
pub use gl_on_pica::GLOnPica;

use gl_raw::types::{GLenum, GLsizei};

/// Recoverable failures of the legacy entry points.
///
/// Misuse of the API (e.g. `glVertex` outside `glBegin`/`glEnd`) is not an
/// error but a bug in the caller, and panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GLError {
    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
    #[error("too many texture objects")]
    TooManyTextures,
    #[error("couldn't allocate native storage for a {width}x{height} texture")]
    TextureAllocationFailed { width: GLsizei, height: GLsizei },
    #[error("texture size {width}x{height} unsupported, must be a power of two from 8 to 1024")]
    UnsupportedTextureSize { width: GLsizei, height: GLsizei },
    #[error("unsupported pixel format {format:#x} with type {type_:#x}")]
    UnsupportedPixelFormat { format: GLenum, type_: GLenum },
    #[error("pixel buffer holds {actual} bytes, {expected} needed")]
    PixelBufferTooSmall { expected: usize, actual: usize },
}
