/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Translation of legacy enumerants to native ones.
//!
//! Every function here is total: a value outside the translated subset maps to
//! the nearest native equivalent (documented per function) rather than failing.
//! Nothing is validated at the time the legacy setter is called, so this is
//! also where unexpected values are first noticed.

use super::gl_raw as gl;
use super::gl_raw::types::GLenum;
use crate::pica::{
    BlendFactor, CombineFunc, CullMode, FilterMode, Primitive, TestFunc, TevOpAlpha, TevOpRgb,
    TevSource, WrapMode,
};

/// Unknown factors become `ONE`.
pub fn blend_factor(factor: GLenum) -> BlendFactor {
    match factor {
        gl::ZERO => BlendFactor::Zero,
        gl::ONE => BlendFactor::One,
        gl::SRC_COLOR => BlendFactor::SrcColor,
        gl::ONE_MINUS_SRC_COLOR => BlendFactor::OneMinusSrcColor,
        gl::DST_COLOR => BlendFactor::DstColor,
        gl::ONE_MINUS_DST_COLOR => BlendFactor::OneMinusDstColor,
        gl::SRC_ALPHA => BlendFactor::SrcAlpha,
        gl::ONE_MINUS_SRC_ALPHA => BlendFactor::OneMinusSrcAlpha,
        gl::DST_ALPHA => BlendFactor::DstAlpha,
        gl::ONE_MINUS_DST_ALPHA => BlendFactor::OneMinusDstAlpha,
        gl::CONSTANT_COLOR => BlendFactor::ConstantColor,
        gl::ONE_MINUS_CONSTANT_COLOR => BlendFactor::OneMinusConstantColor,
        gl::CONSTANT_ALPHA => BlendFactor::ConstantAlpha,
        gl::ONE_MINUS_CONSTANT_ALPHA => BlendFactor::OneMinusConstantAlpha,
        gl::SRC_ALPHA_SATURATE => BlendFactor::SrcAlphaSaturate,
        _ => {
            log_dbg!("Unknown blend factor {:#x}, using GL_ONE", factor);
            BlendFactor::One
        }
    }
}

/// Comparison for the alpha test. Unknown functions become `ALWAYS`.
pub fn test_func(func: GLenum) -> TestFunc {
    match func {
        gl::NEVER => TestFunc::Never,
        gl::LESS => TestFunc::Less,
        gl::EQUAL => TestFunc::Equal,
        gl::LEQUAL => TestFunc::LessEqual,
        gl::GREATER => TestFunc::Greater,
        gl::NOTEQUAL => TestFunc::NotEqual,
        gl::GEQUAL => TestFunc::GreaterEqual,
        gl::ALWAYS => TestFunc::Always,
        _ => {
            log_dbg!("Unknown comparison function {:#x}, using GL_ALWAYS", func);
            TestFunc::Always
        }
    }
}

/// Comparison for the depth test.
///
/// The native depth buffer stores the near plane as the larger value, so the
/// ordering comparisons are mirrored. Unknown functions become `ALWAYS`.
pub fn depth_test_func(func: GLenum) -> TestFunc {
    match test_func(func) {
        TestFunc::Less => TestFunc::Greater,
        TestFunc::LessEqual => TestFunc::GreaterEqual,
        TestFunc::Greater => TestFunc::Less,
        TestFunc::GreaterEqual => TestFunc::LessEqual,
        other => other,
    }
}

/// `mode` is the `glCullFace` value, `front_face` the `glFrontFace` value.
/// `FRONT_AND_BACK` and unknown modes degrade to culling back faces, since the
/// PICA can't cull everything.
pub fn cull_mode(mode: GLenum, front_face: GLenum) -> CullMode {
    let cull_front = match mode {
        gl::FRONT => true,
        gl::BACK => false,
        _ => {
            log_dbg!("Cull mode {:#x} unsupported, culling back faces", mode);
            false
        }
    };
    let front_is_ccw = front_face != gl::CW;
    if cull_front == front_is_ccw {
        CullMode::FrontCcw
    } else {
        CullMode::BackCcw
    }
}

/// `CLAMP` has no exact native counterpart and becomes clamp-to-edge. Unknown
/// modes become `REPEAT`.
pub fn wrap_mode(mode: GLenum) -> WrapMode {
    match mode {
        gl::REPEAT => WrapMode::Repeat,
        gl::CLAMP | gl::CLAMP_TO_EDGE => WrapMode::ClampToEdge,
        gl::CLAMP_TO_BORDER => WrapMode::ClampToBorder,
        gl::MIRRORED_REPEAT => WrapMode::MirroredRepeat,
        _ => {
            log_dbg!("Unknown wrap mode {:#x}, using GL_REPEAT", mode);
            WrapMode::Repeat
        }
    }
}

/// Textures have no mipmaps natively, so the mipmap variants collapse onto
/// their texel filter: every `NEAREST_MIPMAP_*` is `NEAREST` and every
/// `LINEAR_MIPMAP_*` is `LINEAR`. Unknown filters become `LINEAR`.
pub fn filter_mode(filter: GLenum) -> FilterMode {
    match filter {
        gl::NEAREST | gl::NEAREST_MIPMAP_NEAREST | gl::NEAREST_MIPMAP_LINEAR => {
            FilterMode::Nearest
        }
        gl::LINEAR | gl::LINEAR_MIPMAP_NEAREST | gl::LINEAR_MIPMAP_LINEAR => FilterMode::Linear,
        _ => {
            log_dbg!("Unknown texture filter {:#x}, using GL_LINEAR", filter);
            FilterMode::Linear
        }
    }
}

/// `COMBINE_RGB`/`COMBINE_ALPHA` value. Unknown functions become `MODULATE`.
pub fn combine_func(func: GLenum) -> CombineFunc {
    match func {
        gl::REPLACE => CombineFunc::Replace,
        gl::MODULATE => CombineFunc::Modulate,
        gl::ADD => CombineFunc::Add,
        gl::ADD_SIGNED => CombineFunc::AddSigned,
        gl::INTERPOLATE => CombineFunc::Interpolate,
        gl::SUBTRACT => CombineFunc::Subtract,
        gl::DOT3_RGB => CombineFunc::Dot3Rgb,
        gl::DOT3_RGBA => CombineFunc::Dot3Rgba,
        _ => {
            log_dbg!("Unknown combine function {:#x}, using GL_MODULATE", func);
            CombineFunc::Modulate
        }
    }
}

/// `SOURCEn_RGB`/`SOURCEn_ALPHA` value. There is only one texture unit, so
/// `TEXTURE` and `TEXTURE0` are the same. Unknown sources become
/// `PRIMARY_COLOR`.
pub fn tev_source(source: GLenum) -> TevSource {
    match source {
        gl::TEXTURE | gl::TEXTURE0 => TevSource::Texture0,
        gl::PRIMARY_COLOR => TevSource::PrimaryColor,
        gl::CONSTANT => TevSource::Constant,
        gl::PREVIOUS => TevSource::Previous,
        _ => {
            log_dbg!("Unknown combiner source {:#x}, using GL_PRIMARY_COLOR", source);
            TevSource::PrimaryColor
        }
    }
}

/// `OPERANDn_RGB` value. Unknown operands become `SRC_COLOR`.
pub fn tev_op_rgb(operand: GLenum) -> TevOpRgb {
    match operand {
        gl::SRC_COLOR => TevOpRgb::SrcColor,
        gl::ONE_MINUS_SRC_COLOR => TevOpRgb::OneMinusSrcColor,
        gl::SRC_ALPHA => TevOpRgb::SrcAlpha,
        gl::ONE_MINUS_SRC_ALPHA => TevOpRgb::OneMinusSrcAlpha,
        _ => {
            log_dbg!("Unknown RGB operand {:#x}, using GL_SRC_COLOR", operand);
            TevOpRgb::SrcColor
        }
    }
}

/// `OPERANDn_ALPHA` value. Unknown operands become `SRC_ALPHA`.
pub fn tev_op_alpha(operand: GLenum) -> TevOpAlpha {
    match operand {
        gl::SRC_ALPHA => TevOpAlpha::SrcAlpha,
        gl::ONE_MINUS_SRC_ALPHA => TevOpAlpha::OneMinusSrcAlpha,
        _ => {
            log_dbg!("Unknown alpha operand {:#x}, using GL_SRC_ALPHA", operand);
            TevOpAlpha::SrcAlpha
        }
    }
}

/// `glBegin` mode. Only fans and strips have a native counterpart; anything
/// else is drawn as independent triangles, which won't give complete
/// primitives for e.g. `GL_QUADS`.
pub fn primitive(mode: GLenum) -> Primitive {
    match mode {
        gl::TRIANGLE_FAN => Primitive::TriangleFan,
        gl::TRIANGLE_STRIP => Primitive::TriangleStrip,
        gl::TRIANGLES => Primitive::Triangles,
        _ => {
            log_dbg!("Primitive mode {:#x} drawn as GL_TRIANGLES", mode);
            Primitive::Triangles
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_factors() {
        assert_eq!(blend_factor(gl::SRC_ALPHA), BlendFactor::SrcAlpha);
        assert_eq!(
            blend_factor(gl::ONE_MINUS_SRC_ALPHA),
            BlendFactor::OneMinusSrcAlpha
        );
        assert_eq!(blend_factor(gl::ZERO), BlendFactor::Zero);
        assert_eq!(blend_factor(0xdead), BlendFactor::One);
    }

    #[test]
    fn depth_comparisons_are_mirrored() {
        assert_eq!(test_func(gl::LESS), TestFunc::Less);
        assert_eq!(depth_test_func(gl::LESS), TestFunc::Greater);
        assert_eq!(depth_test_func(gl::LEQUAL), TestFunc::GreaterEqual);
        assert_eq!(depth_test_func(gl::GEQUAL), TestFunc::LessEqual);
        assert_eq!(depth_test_func(gl::EQUAL), TestFunc::Equal);
        assert_eq!(depth_test_func(0xdead), TestFunc::Always);
    }

    #[test]
    fn cull_modes() {
        assert_eq!(cull_mode(gl::BACK, gl::CCW), CullMode::BackCcw);
        assert_eq!(cull_mode(gl::FRONT, gl::CCW), CullMode::FrontCcw);
        assert_eq!(cull_mode(gl::BACK, gl::CW), CullMode::FrontCcw);
        assert_eq!(cull_mode(gl::FRONT, gl::CW), CullMode::BackCcw);
        assert_eq!(cull_mode(gl::FRONT_AND_BACK, gl::CCW), CullMode::BackCcw);
    }

    #[test]
    fn texture_parameters() {
        assert_eq!(wrap_mode(gl::CLAMP), WrapMode::ClampToEdge);
        assert_eq!(wrap_mode(gl::MIRRORED_REPEAT), WrapMode::MirroredRepeat);
        assert_eq!(wrap_mode(0xdead), WrapMode::Repeat);
        assert_eq!(filter_mode(gl::NEAREST_MIPMAP_LINEAR), FilterMode::Nearest);
        assert_eq!(filter_mode(gl::NEAREST_MIPMAP_NEAREST), FilterMode::Nearest);
        assert_eq!(filter_mode(gl::LINEAR_MIPMAP_LINEAR), FilterMode::Linear);
        assert_eq!(filter_mode(0xdead), FilterMode::Linear);
    }

    #[test]
    fn combiner() {
        assert_eq!(combine_func(gl::ADD_SIGNED), CombineFunc::AddSigned);
        assert_eq!(combine_func(0xdead), CombineFunc::Modulate);
        assert_eq!(tev_source(gl::TEXTURE), TevSource::Texture0);
        assert_eq!(tev_source(gl::TEXTURE0), TevSource::Texture0);
        assert_eq!(tev_source(0xdead), TevSource::PrimaryColor);
        assert_eq!(
            tev_op_rgb(gl::ONE_MINUS_SRC_COLOR),
            TevOpRgb::OneMinusSrcColor
        );
        assert_eq!(tev_op_alpha(gl::SRC_COLOR), TevOpAlpha::SrcAlpha);
    }

    #[test]
    fn primitives() {
        assert_eq!(primitive(gl::TRIANGLE_FAN), Primitive::TriangleFan);
        assert_eq!(primitive(gl::TRIANGLE_STRIP), Primitive::TriangleStrip);
        assert_eq!(primitive(gl::QUADS), Primitive::Triangles);
        assert_eq!(primitive(gl::POLYGON), Primitive::Triangles);
    }
}
