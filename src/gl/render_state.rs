/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Tracking of legacy render state and its translation to native state.
//!
//! Setters only store values here. Nothing reaches the GPU until a draw
//! bracket opens, at which point [RenderState::snapshot] translates everything
//! at once and [NativeState::apply] sends it. The native pipeline wants related
//! state (test enable, function and write mask; blend equation and factors)
//! configured together, while legacy callers set it piecemeal in any order.

use super::gl_raw as gl;
use super::gl_raw::types::{GLenum, GLfloat, GLint};
use super::translate;
use crate::options::Options;
use crate::pica::{
    Blend, BlendEquation, CombineFunc, CullMode, Pica, ScissorMode, TestFunc, TevOpAlpha,
    TevOpRgb, TevSource, TexEnv, WriteMask,
};

/// Texture environment of the single texture unit, as legacy enumerants.
#[derive(Clone, Debug, PartialEq)]
pub struct TexEnvState {
    pub mode: GLenum,
    pub combine_rgb: GLenum,
    pub combine_alpha: GLenum,
    pub src_rgb: [GLenum; 3],
    pub src_alpha: [GLenum; 3],
    pub operand_rgb: [GLenum; 3],
    pub operand_alpha: [GLenum; 3],
}

impl Default for TexEnvState {
    fn default() -> Self {
        TexEnvState {
            mode: gl::MODULATE,
            combine_rgb: gl::MODULATE,
            combine_alpha: gl::MODULATE,
            src_rgb: [gl::TEXTURE, gl::PREVIOUS, gl::CONSTANT],
            src_alpha: [gl::TEXTURE, gl::PREVIOUS, gl::CONSTANT],
            operand_rgb: [gl::SRC_COLOR, gl::SRC_COLOR, gl::SRC_ALPHA],
            operand_alpha: [gl::SRC_ALPHA, gl::SRC_ALPHA, gl::SRC_ALPHA],
        }
    }
}

impl TexEnvState {
    fn field_mut(&mut self, pname: GLenum) -> Option<&mut GLenum> {
        Some(match pname {
            gl::TEXTURE_ENV_MODE => &mut self.mode,
            gl::COMBINE_RGB => &mut self.combine_rgb,
            gl::COMBINE_ALPHA => &mut self.combine_alpha,
            gl::SOURCE0_RGB => &mut self.src_rgb[0],
            gl::SOURCE1_RGB => &mut self.src_rgb[1],
            gl::SOURCE2_RGB => &mut self.src_rgb[2],
            gl::SOURCE0_ALPHA => &mut self.src_alpha[0],
            gl::SOURCE1_ALPHA => &mut self.src_alpha[1],
            gl::SOURCE2_ALPHA => &mut self.src_alpha[2],
            gl::OPERAND0_RGB => &mut self.operand_rgb[0],
            gl::OPERAND1_RGB => &mut self.operand_rgb[1],
            gl::OPERAND2_RGB => &mut self.operand_rgb[2],
            gl::OPERAND0_ALPHA => &mut self.operand_alpha[0],
            gl::OPERAND1_ALPHA => &mut self.operand_alpha[1],
            gl::OPERAND2_ALPHA => &mut self.operand_alpha[2],
            _ => return None,
        })
    }

    /// Store a `glTexEnv` parameter. Returns `false` if the name isn't
    /// tracked.
    pub fn set(&mut self, pname: GLenum, value: GLenum) -> bool {
        match self.field_mut(pname) {
            Some(field) => {
                *field = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, pname: GLenum) -> Option<GLenum> {
        Some(match pname {
            gl::TEXTURE_ENV_MODE => self.mode,
            gl::COMBINE_RGB => self.combine_rgb,
            gl::COMBINE_ALPHA => self.combine_alpha,
            gl::SOURCE0_RGB => self.src_rgb[0],
            gl::SOURCE1_RGB => self.src_rgb[1],
            gl::SOURCE2_RGB => self.src_rgb[2],
            gl::SOURCE0_ALPHA => self.src_alpha[0],
            gl::SOURCE1_ALPHA => self.src_alpha[1],
            gl::SOURCE2_ALPHA => self.src_alpha[2],
            gl::OPERAND0_RGB => self.operand_rgb[0],
            gl::OPERAND1_RGB => self.operand_rgb[1],
            gl::OPERAND2_RGB => self.operand_rgb[2],
            gl::OPERAND0_ALPHA => self.operand_alpha[0],
            gl::OPERAND1_ALPHA => self.operand_alpha[1],
            gl::OPERAND2_ALPHA => self.operand_alpha[2],
            _ => return None,
        })
    }

    /// Build the combiner stage for this environment, given that a texture is
    /// sampled.
    fn to_native(&self) -> TexEnv {
        use TevSource::{Constant, PrimaryColor, Texture0};

        let mut env = TexEnv {
            src_rgb: [Texture0, PrimaryColor, Constant],
            src_alpha: [Texture0, PrimaryColor, Constant],
            ..TexEnv::PRIMARY_COLOR
        };
        match self.mode {
            gl::REPLACE => {
                env.func_rgb = CombineFunc::Replace;
                env.func_alpha = CombineFunc::Replace;
            }
            gl::DECAL => {
                // Cf * (1 - At) + Ct * At
                env.func_rgb = CombineFunc::Interpolate;
                env.src_rgb = [Texture0, PrimaryColor, Texture0];
                env.op_rgb[2] = TevOpRgb::SrcAlpha;
                env.func_alpha = CombineFunc::Replace;
                env.src_alpha[0] = PrimaryColor;
            }
            gl::BLEND => {
                // Cf * (1 - Ct) + Cc * Ct, with the environment color left at
                // its initial value of zero.
                env.func_rgb = CombineFunc::Modulate;
                env.src_rgb = [PrimaryColor, Texture0, Constant];
                env.op_rgb[1] = TevOpRgb::OneMinusSrcColor;
                env.func_alpha = CombineFunc::Modulate;
            }
            gl::ADD => {
                env.func_rgb = CombineFunc::Add;
                env.func_alpha = CombineFunc::Modulate;
            }
            gl::COMBINE => {
                env.func_rgb = translate::combine_func(self.combine_rgb);
                env.func_alpha = translate::combine_func(self.combine_alpha);
                #[allow(clippy::needless_range_loop)]
                for i in 0..3 {
                    env.src_rgb[i] = first_stage_source(self.src_rgb[i]);
                    env.src_alpha[i] = first_stage_source(self.src_alpha[i]);
                    env.op_rgb[i] = translate::tev_op_rgb(self.operand_rgb[i]);
                    env.op_alpha[i] = translate::tev_op_alpha(self.operand_alpha[i]);
                }
            }
            mode => {
                if mode != gl::MODULATE {
                    log!("Unknown texture environment mode {:#x}, using GL_MODULATE", mode);
                }
                env.func_rgb = CombineFunc::Modulate;
                env.func_alpha = CombineFunc::Modulate;
            }
        }
        env
    }
}

/// The previous stage of the first combiner is the vertex color.
fn first_stage_source(source: GLenum) -> TevSource {
    match translate::tev_source(source) {
        TevSource::Previous => TevSource::PrimaryColor,
        other => other,
    }
}

/// Legacy state that is only committed at the start of a draw bracket.
#[derive(Clone, Debug)]
pub struct RenderState {
    pub cull_face: bool,
    pub blend: bool,
    pub depth_test: bool,
    pub alpha_test: bool,
    pub scissor_test: bool,
    pub texture_2d: bool,

    pub cull_face_mode: GLenum,
    pub front_face: GLenum,
    pub blend_src: GLenum,
    pub blend_dst: GLenum,
    pub depth_func: GLenum,
    pub depth_mask: bool,
    pub alpha_func: GLenum,
    pub alpha_ref: GLfloat,
    /// x, y, width, height in legacy window co-ordinates.
    pub scissor_box: [GLint; 4],
    pub tex_env: TexEnvState,
}

impl RenderState {
    /// The initial legacy state: opaque, unblended, no tests.
    pub fn new(options: &Options) -> Self {
        RenderState {
            cull_face: false,
            blend: false,
            depth_test: false,
            alpha_test: false,
            scissor_test: false,
            texture_2d: false,
            cull_face_mode: gl::BACK,
            front_face: gl::CCW,
            blend_src: gl::ONE,
            blend_dst: gl::ZERO,
            depth_func: gl::LESS,
            depth_mask: true,
            alpha_func: gl::ALWAYS,
            alpha_ref: 0.0,
            scissor_box: [
                0,
                0,
                options.screen_width.into(),
                options.screen_height.into(),
            ],
            tex_env: TexEnvState::default(),
        }
    }

    /// Flag for a capability, or [None] if the capability isn't tracked.
    pub fn capability_mut(&mut self, cap: GLenum) -> Option<&mut bool> {
        Some(match cap {
            gl::CULL_FACE => &mut self.cull_face,
            gl::BLEND => &mut self.blend,
            gl::DEPTH_TEST => &mut self.depth_test,
            gl::ALPHA_TEST => &mut self.alpha_test,
            gl::SCISSOR_TEST => &mut self.scissor_test,
            gl::TEXTURE_2D => &mut self.texture_2d,
            _ => return None,
        })
    }

    pub fn is_enabled(&self, cap: GLenum) -> Option<bool> {
        Some(match cap {
            gl::CULL_FACE => self.cull_face,
            gl::BLEND => self.blend,
            gl::DEPTH_TEST => self.depth_test,
            gl::ALPHA_TEST => self.alpha_test,
            gl::SCISSOR_TEST => self.scissor_test,
            gl::TEXTURE_2D => self.texture_2d,
            _ => return None,
        })
    }

    /// Translate the whole state to native form. `texturing` says whether a
    /// texture will be sampled by the draws that follow.
    pub fn snapshot(&self, options: &Options, texturing: bool) -> NativeState {
        let cull = if self.cull_face {
            translate::cull_mode(self.cull_face_mode, self.front_face)
        } else {
            CullMode::None
        };

        let depth_func = translate::depth_test_func(self.depth_func);
        // The depth buffer is never written while the test is off.
        let write_mask = if self.depth_test && self.depth_mask {
            WriteMask::ColorAndDepth
        } else {
            WriteMask::Color
        };

        let alpha_ref = (self.alpha_ref.clamp(0.0, 1.0) * 255.0).round() as u8;

        let blend = if self.blend {
            let src = translate::blend_factor(self.blend_src);
            let dst = translate::blend_factor(self.blend_dst);
            Blend {
                color_equation: BlendEquation::Add,
                alpha_equation: BlendEquation::Add,
                src_color: src,
                dst_color: dst,
                src_alpha: src,
                dst_alpha: dst,
            }
        } else {
            Blend::OPAQUE
        };

        let scissor = if self.scissor_test {
            let [x, y, width, height] = self.scissor_box;
            let rect = options.native_rect(x, y, width, height);
            (
                ScissorMode::Normal,
                [rect.x, rect.y, rect.x + rect.width, rect.y + rect.height],
            )
        } else {
            (ScissorMode::Disable, [0; 4])
        };

        let tex_env = if texturing {
            self.tex_env.to_native()
        } else {
            TexEnv::PRIMARY_COLOR
        };

        NativeState {
            cull,
            depth_test: self.depth_test,
            depth_func,
            write_mask,
            alpha_test: self.alpha_test,
            alpha_func: translate::test_func(self.alpha_func),
            alpha_ref,
            blend,
            scissor,
            tex_env,
        }
    }
}

/// Fully translated render state, ready to be sent to the GPU.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeState {
    pub cull: CullMode,
    pub depth_test: bool,
    pub depth_func: TestFunc,
    pub write_mask: WriteMask,
    pub alpha_test: bool,
    pub alpha_func: TestFunc,
    pub alpha_ref: u8,
    pub blend: Blend,
    /// Mode and left, top, right, bottom.
    pub scissor: (ScissorMode, [u32; 4]),
    pub tex_env: TexEnv,
}

impl NativeState {
    pub fn apply<P: Pica>(&self, pica: &mut P) {
        pica.set_cull_face(self.cull);
        pica.set_depth_test(self.depth_test, self.depth_func, self.write_mask);
        pica.set_alpha_test(self.alpha_test, self.alpha_func, self.alpha_ref);
        pica.set_alpha_blend(self.blend);
        let (mode, [left, top, right, bottom]) = self.scissor;
        pica.set_scissor(mode, left, top, right, bottom);
        pica.set_tex_env(0, &self.tex_env);
    }
}
