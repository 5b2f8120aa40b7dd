/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! This package contains OpenGL bindings generated with the `gl_generator`
//! crate.
//!
//! Only the constants and types are meant to be used. The functions are never
//! loaded, since there is no host OpenGL driver underneath `pica_gl`.

#![allow(non_snake_case)]

#[allow(warnings)]
pub mod gl15 {
    include!(concat!(env!("OUT_DIR"), "/gl15.rs"));
}
