/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Abstraction over the native PICA200 command surface.
//!
//! The shape of [Pica] follows citro3d: the GPU is configured through a
//! handful of grouped state calls (blend, depth test, alpha test, …), the
//! fixed vertex shader takes three matrix uniforms, and geometry is sent one
//! attribute at a time between [Pica::imm_draw_begin] and
//! [Pica::imm_draw_end].
//!
//! Implementations:
//! - [trace::PicaTrace] records every command and keeps texture storage in
//!   memory. It's what the tests run against, and it can be used to trace a
//!   game's rendering without hardware.

pub mod trace;

pub use trace::PicaTrace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Comparison used by the depth and alpha tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TestFunc {
    Never,
    Always,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// The PICA only knows counter-clockwise front faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    FrontCcw,
    BackCcw,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WrapMode {
    ClampToEdge,
    ClampToBorder,
    Repeat,
    MirroredRepeat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Texture combiner (TEV) function.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CombineFunc {
    Replace,
    Modulate,
    Add,
    AddSigned,
    Interpolate,
    Subtract,
    Dot3Rgb,
    Dot3Rgba,
}

/// Texture combiner (TEV) input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TevSource {
    PrimaryColor,
    Texture0,
    Constant,
    Previous,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TevOpRgb {
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TevOpAlpha {
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatrixUniform {
    Projection,
    ModelView,
    Texture,
}

/// Which buffers a fragment may write. The PICA can't write depth without
/// also writing color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WriteMask {
    Color,
    ColorAndDepth,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScissorMode {
    Disable,
    Normal,
}

/// Arguments of `C3D_AlphaBlend`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Blend {
    pub color_equation: BlendEquation,
    pub alpha_equation: BlendEquation,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl Blend {
    /// Blending that leaves the incoming fragment as-is.
    pub const OPAQUE: Blend = Blend {
        color_equation: BlendEquation::Add,
        alpha_equation: BlendEquation::Add,
        src_color: BlendFactor::One,
        dst_color: BlendFactor::Zero,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::Zero,
    };
}

/// Configuration of one texture combiner stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TexEnv {
    pub func_rgb: CombineFunc,
    pub func_alpha: CombineFunc,
    pub src_rgb: [TevSource; 3],
    pub src_alpha: [TevSource; 3],
    pub op_rgb: [TevOpRgb; 3],
    pub op_alpha: [TevOpAlpha; 3],
}

impl TexEnv {
    /// Pass the vertex color through untouched.
    pub const PRIMARY_COLOR: TexEnv = TexEnv {
        func_rgb: CombineFunc::Replace,
        func_alpha: CombineFunc::Replace,
        src_rgb: [TevSource::PrimaryColor; 3],
        src_alpha: [TevSource::PrimaryColor; 3],
        op_rgb: [TevOpRgb::SrcColor; 3],
        op_alpha: [TevOpAlpha::SrcAlpha; 3],
    };
}

/// One vertex shader input register. All inputs are sent as four floats in
/// immediate mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub register: u8,
    pub components: u8,
}

/// Input layout of the fixed vertex shader: position, texture co-ordinates,
/// color.
pub const VERTEX_ATTRIBUTES: &[Attribute] = &[
    Attribute {
        register: 0,
        components: 4,
    },
    Attribute {
        register: 1,
        components: 4,
    },
    Attribute {
        register: 2,
        components: 4,
    },
];

/// The framebuffer currently on screen.
///
/// A tilted framebuffer is column-major relative to the legacy screen: each
/// run of `screen_height` pixels is one screen column, starting at the bottom.
/// An untilted one is row-major, bottom row first. Pixels are RGBA8 in native
/// byte order (A, B, G, R).
pub struct Framebuffer<'a> {
    pub screen_width: u16,
    pub screen_height: u16,
    pub tilted: bool,
    pub pixels: &'a [u8],
}

impl Framebuffer<'_> {
    /// Byte offset of the pixel at legacy window co-ordinates `(x, y)`.
    pub fn offset(&self, x: u32, y: u32) -> usize {
        let (x, y) = (x as usize, y as usize);
        if self.tilted {
            (x * usize::from(self.screen_height) + y) * 4
        } else {
            (y * usize::from(self.screen_width) + x) * 4
        }
    }
}

/// Trait representing the native GPU.
///
/// Calls are expected from a single rendering thread, in the order a citro3d
/// program would make them.
pub trait Pica {
    /// Native texture object (`C3D_Tex`). Owned by whoever holds it; it must
    /// be given back to [Pica::texture_free] to release its storage.
    type Texture;

    /// Get a human-friendly description of this implementation.
    fn description() -> &'static str
    where
        Self: Sized;

    fn set_attribute_layout(&mut self, attributes: &[Attribute]);
    /// The origin may be negative, placing part of the viewport off screen.
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    fn set_scissor(&mut self, mode: ScissorMode, left: u32, top: u32, right: u32, bottom: u32);
    fn set_cull_face(&mut self, mode: CullMode);
    fn set_depth_test(&mut self, enable: bool, func: TestFunc, write_mask: WriteMask);
    fn set_alpha_test(&mut self, enable: bool, func: TestFunc, reference: u8);
    fn set_alpha_blend(&mut self, blend: Blend);
    fn set_tex_env(&mut self, stage: u8, env: &TexEnv);
    /// Upload a matrix uniform. Rows are in shader register layout, see
    /// [crate::matrix::Matrix::to_pica_rows].
    fn set_matrix_uniform(&mut self, uniform: MatrixUniform, rows: &[[f32; 4]; 4]);

    /// Allocate RGBA8 storage. Returns [None] if there isn't enough memory.
    fn texture_init(&mut self, width: u16, height: u16) -> Option<Self::Texture>;
    fn texture_set_wrap(&mut self, texture: &mut Self::Texture, s: WrapMode, t: WrapMode);
    fn texture_set_filter(&mut self, texture: &mut Self::Texture, mag: FilterMode, min: FilterMode);
    /// Replace the texture's contents with already tiled native data.
    fn texture_upload(&mut self, texture: &mut Self::Texture, tiled: &[u8]);
    /// Copy the texture's tiled native data into `out`.
    fn texture_read(&self, texture: &Self::Texture, out: &mut [u8]);
    fn texture_free(&mut self, texture: Self::Texture);
    fn bind_texture(&mut self, unit: u8, texture: Option<&Self::Texture>);

    fn displayed_framebuffer(&self) -> Framebuffer<'_>;
    /// Clear the current render target. `color` is `0xRRGGBBAA`, `depth` is
    /// a 24-bit value. [None] leaves that buffer alone.
    fn clear(&mut self, color: Option<u32>, depth: Option<u32>);

    fn imm_draw_begin(&mut self, primitive: Primitive);
    fn imm_send_attrib(&mut self, x: f32, y: f32, z: f32, w: f32);
    fn imm_draw_end(&mut self);

    fn flush(&mut self);
}
