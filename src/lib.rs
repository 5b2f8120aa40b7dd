/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! pica_gl emulates legacy immediate-mode OpenGL on top of the PICA200 GPU.
//!
//! In various places, the terms "legacy" and "native" are used to distinguish
//! between the two sides of the translation:
//! - "Legacy" is the OpenGL 1.x fixed-function API the game is written
//!   against, with its enumerants, matrix conventions and linear RGBA pixels.
//! - "Native" is the PICA200 command model (see [pica]), with its own
//!   enumerants, a shader that takes matrices as uniforms, and tiled textures.
//!
//! The entry point is [GLOnPica], which implements the [GL] trait over any
//! [Pica] implementation. [PicaTrace] records native commands instead of
//! driving hardware.

// Allow items in the crate to have non-snake-case names, so the legacy
// entry points can keep their OpenGL names.
#![allow(non_snake_case)]
// The documentation for this crate is intended to include private items.
#![allow(rustdoc::private_intra_doc_links)]

#[macro_use]
mod log;
pub mod gl;
pub mod matrix;
pub mod options;
pub mod pica;

pub use gl::{gl_raw, GLError, GLOnPica, GL};
pub use options::Options;
pub use pica::{Pica, PicaTrace};
