/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Shared utilities.

use super::gl_raw as gl; // constants only
use super::gl_raw::types::{GLboolean, GLenum, GLfloat, GLint};

/// Type of a parameter, used in [ParamTable].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParamType {
    /// `GLboolean`
    Boolean,
    /// `GLfloat`
    Float,
    /// `GLint`
    Int,
    /// Floating-point values in the range [0, 1] (colors, clear depth, alpha
    /// reference) which are scaled to the full range when read as integers.
    FloatSpecial,
}

/// Table of parameter names, component types and component counts.
///
/// This is a helper for implementing the common pattern in OpenGL where a set
/// of parameters named by [GLenum] values can be accessed via functions with
/// suffixes like `f`, `fv`, `i`, `iv`, etc.
pub struct ParamTable(pub &'static [(GLenum, ParamType, u8)]);

impl ParamTable {
    /// Look up the component type and count for a parameter. Returns [None]
    /// if the name is not recognized.
    pub fn get_type_info(&self, pname: GLenum) -> Option<(ParamType, u8)> {
        self.0
            .iter()
            .find(|&&(pname2, _, _)| pname == pname2)
            .map(|&(_, type_, count)| (type_, count))
    }

    pub fn is_known_param(&self, pname: GLenum) -> bool {
        self.get_type_info(pname).is_some()
    }
}

/// Convert a stored parameter value for `glGetIntegerv`.
///
/// Values are stored as [f64] so that every [GLint] and handle is exact.
pub fn param_to_int(type_: ParamType, value: f64) -> GLint {
    match type_ {
        // Truncating through i64 keeps the bit pattern of unsigned values.
        ParamType::Boolean | ParamType::Int => value as i64 as GLint,
        ParamType::Float => value.round() as GLint,
        // Linear mapping of [-1, 1] to the full integer range.
        ParamType::FloatSpecial => {
            ((f64::from(u32::MAX) * value.clamp(-1.0, 1.0) - 1.0) / 2.0) as GLint
        }
    }
}

/// Convert a stored parameter value for `glGetFloatv`.
pub fn param_to_float(value: f64) -> GLfloat {
    value as GLfloat
}

/// Convert a stored parameter value for `glGetBooleanv`.
pub fn param_to_boolean(value: f64) -> GLboolean {
    if value != 0.0 {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

/// Table of `glGet` parameters tracked by the emulation layer.
pub const GET_PARAMS: ParamTable = ParamTable(&[
    (gl::ALPHA_TEST, ParamType::Boolean, 1),
    (gl::ALPHA_TEST_FUNC, ParamType::Int, 1),
    (gl::ALPHA_TEST_REF, ParamType::FloatSpecial, 1),
    (gl::BLEND, ParamType::Boolean, 1),
    (gl::BLEND_DST, ParamType::Int, 1),
    (gl::BLEND_SRC, ParamType::Int, 1),
    (gl::COLOR_CLEAR_VALUE, ParamType::FloatSpecial, 4),
    (gl::CULL_FACE, ParamType::Boolean, 1),
    (gl::CULL_FACE_MODE, ParamType::Int, 1),
    (gl::CURRENT_COLOR, ParamType::FloatSpecial, 4),
    (gl::CURRENT_TEXTURE_COORDS, ParamType::Float, 4),
    (gl::DEPTH_CLEAR_VALUE, ParamType::FloatSpecial, 1),
    (gl::DEPTH_FUNC, ParamType::Int, 1),
    (gl::DEPTH_TEST, ParamType::Boolean, 1),
    (gl::DEPTH_WRITEMASK, ParamType::Boolean, 1),
    (gl::FRONT_FACE, ParamType::Int, 1),
    (gl::MATRIX_MODE, ParamType::Int, 1),
    (gl::MAX_MODELVIEW_STACK_DEPTH, ParamType::Int, 1),
    (gl::MAX_PROJECTION_STACK_DEPTH, ParamType::Int, 1),
    (gl::MAX_TEXTURE_SIZE, ParamType::Int, 1),
    (gl::MAX_TEXTURE_STACK_DEPTH, ParamType::Int, 1),
    (gl::MODELVIEW_MATRIX, ParamType::Float, 16),
    (gl::MODELVIEW_STACK_DEPTH, ParamType::Int, 1),
    (gl::PROJECTION_MATRIX, ParamType::Float, 16),
    (gl::PROJECTION_STACK_DEPTH, ParamType::Int, 1),
    (gl::SCISSOR_BOX, ParamType::Int, 4),
    (gl::SCISSOR_TEST, ParamType::Boolean, 1),
    (gl::TEXTURE_2D, ParamType::Boolean, 1),
    (gl::TEXTURE_BINDING_2D, ParamType::Int, 1),
    (gl::TEXTURE_MATRIX, ParamType::Float, 16),
    (gl::TEXTURE_STACK_DEPTH, ParamType::Int, 1),
    (gl::VIEWPORT, ParamType::Int, 4),
]);

/// Table of `glGetTexEnv` parameters.
pub const TEX_ENV_PARAMS: ParamTable = ParamTable(&[
    (gl::TEXTURE_ENV_MODE, ParamType::Int, 1),
    (gl::COMBINE_RGB, ParamType::Int, 1),
    (gl::COMBINE_ALPHA, ParamType::Int, 1),
    (gl::SOURCE0_RGB, ParamType::Int, 1),
    (gl::SOURCE1_RGB, ParamType::Int, 1),
    (gl::SOURCE2_RGB, ParamType::Int, 1),
    (gl::SOURCE0_ALPHA, ParamType::Int, 1),
    (gl::SOURCE1_ALPHA, ParamType::Int, 1),
    (gl::SOURCE2_ALPHA, ParamType::Int, 1),
    (gl::OPERAND0_RGB, ParamType::Int, 1),
    (gl::OPERAND1_RGB, ParamType::Int, 1),
    (gl::OPERAND2_RGB, ParamType::Int, 1),
    (gl::OPERAND0_ALPHA, ParamType::Int, 1),
    (gl::OPERAND1_ALPHA, ParamType::Int, 1),
    (gl::OPERAND2_ALPHA, ParamType::Int, 1),
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert_eq!(
            GET_PARAMS.get_type_info(gl::VIEWPORT),
            Some((ParamType::Int, 4))
        );
        assert_eq!(GET_PARAMS.get_type_info(gl::FOG_MODE), None);
        assert!(TEX_ENV_PARAMS.is_known_param(gl::OPERAND2_ALPHA));
    }

    #[test]
    fn conversions() {
        assert_eq!(param_to_int(ParamType::Float, 2.6), 3);
        assert_eq!(param_to_int(ParamType::Int, f64::from(0xFFFF_0001u32)), -65535);
        assert_eq!(param_to_int(ParamType::FloatSpecial, 1.0), i32::MAX);
        assert_eq!(param_to_int(ParamType::FloatSpecial, 0.0), 0);
        assert_eq!(param_to_boolean(0.5), gl::TRUE);
        assert_eq!(param_to_boolean(0.0), gl::FALSE);
    }
}
