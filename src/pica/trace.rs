/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Recording implementation of [Pica].

use super::{
    Attribute, Blend, CullMode, FilterMode, Framebuffer, MatrixUniform, Pica, Primitive,
    ScissorMode, TestFunc, TexEnv, WrapMode, WriteMask,
};
use crate::matrix::Matrix;

/// One native call, as recorded by [PicaTrace].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    SetAttributeLayout(Vec<Attribute>),
    SetViewport {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    SetScissor {
        mode: ScissorMode,
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
    SetCullFace(CullMode),
    SetDepthTest {
        enable: bool,
        func: TestFunc,
        write_mask: WriteMask,
    },
    SetAlphaTest {
        enable: bool,
        func: TestFunc,
        reference: u8,
    },
    SetAlphaBlend(Blend),
    SetTexEnv {
        stage: u8,
        env: TexEnv,
    },
    SetMatrixUniform {
        uniform: MatrixUniform,
        rows: [[f32; 4]; 4],
    },
    TextureInit {
        id: u32,
        width: u16,
        height: u16,
    },
    TextureSetWrap {
        id: u32,
        s: WrapMode,
        t: WrapMode,
    },
    TextureSetFilter {
        id: u32,
        mag: FilterMode,
        min: FilterMode,
    },
    TextureUpload {
        id: u32,
    },
    TextureFree {
        id: u32,
    },
    BindTexture {
        unit: u8,
        id: Option<u32>,
    },
    Clear {
        color: Option<u32>,
        depth: Option<u32>,
    },
    DrawBegin(Primitive),
    Attrib([f32; 4]),
    DrawEnd,
    Flush,
}

/// Texture storage held in host memory.
#[derive(Debug)]
pub struct TraceTexture {
    id: u32,
    width: u16,
    height: u16,
    wrap: (WrapMode, WrapMode),
    filter: (FilterMode, FilterMode),
    data: Vec<u8>,
}

impl TraceTexture {
    pub fn id(&self) -> u32 {
        self.id
    }
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }
    pub fn wrap(&self) -> (WrapMode, WrapMode) {
        self.wrap
    }
    pub fn filter(&self) -> (FilterMode, FilterMode) {
        self.filter
    }
    /// Tiled native data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// A completed immediate-mode batch, reassembled from the command stream.
#[derive(Clone, Debug, PartialEq)]
pub struct Draw {
    pub primitive: Primitive,
    /// Each vertex has one entry per attribute in the layout.
    pub vertices: Vec<Vec<[f32; 4]>>,
}

pub struct PicaTrace {
    commands: Vec<Command>,
    next_texture_id: u32,
    texture_memory_limit: usize,
    texture_memory_used: usize,
    screen_width: u16,
    screen_height: u16,
    tilted: bool,
    framebuffer: Vec<u8>,
    drawing: bool,
}

impl PicaTrace {
    /// Create a trace with a displayed framebuffer covering a legacy screen of
    /// the given size, initially black. The framebuffer is tilted, as on the
    /// 3DS.
    pub fn new(screen_width: u16, screen_height: u16) -> Self {
        PicaTrace {
            commands: Vec::new(),
            next_texture_id: 1,
            texture_memory_limit: usize::MAX,
            texture_memory_used: 0,
            screen_width,
            screen_height,
            tilted: true,
            framebuffer: vec![0; usize::from(screen_width) * usize::from(screen_height) * 4],
            drawing: false,
        }
    }

    /// Make [Pica::texture_init] fail once this many bytes of texture storage
    /// are live.
    pub fn with_texture_memory_limit(mut self, bytes: usize) -> Self {
        self.texture_memory_limit = bytes;
        self
    }

    /// Store the framebuffer in the same orientation as the legacy screen.
    pub fn with_untilted_framebuffer(mut self) -> Self {
        self.tilted = false;
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn texture_memory_used(&self) -> usize {
        self.texture_memory_used
    }

    /// Write one pixel of the displayed framebuffer, given in legacy window
    /// co-ordinates and RGBA byte order.
    pub fn set_framebuffer_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let offset = self.displayed_framebuffer().offset(x, y);
        let [r, g, b, a] = rgba;
        self.framebuffer[offset..offset + 4].copy_from_slice(&[a, b, g, r]);
    }

    /// Group the recorded attributes into vertices, using the attribute layout
    /// that was active when each batch was sent.
    pub fn draws(&self) -> Vec<Draw> {
        let mut draws = Vec::new();
        let mut attribute_count = 1;
        let mut current: Option<(Primitive, Vec<[f32; 4]>)> = None;
        for command in &self.commands {
            match command {
                Command::SetAttributeLayout(layout) => attribute_count = layout.len().max(1),
                Command::DrawBegin(primitive) => current = Some((*primitive, Vec::new())),
                Command::Attrib(attrib) => {
                    if let Some((_, attribs)) = current.as_mut() {
                        attribs.push(*attrib);
                    }
                }
                Command::DrawEnd => {
                    if let Some((primitive, attribs)) = current.take() {
                        draws.push(Draw {
                            primitive,
                            vertices: attribs
                                .chunks(attribute_count)
                                .map(|vertex| vertex.to_vec())
                                .collect(),
                        });
                    }
                }
                _ => (),
            }
        }
        draws
    }

    /// The most recent value uploaded to a matrix uniform.
    pub fn matrix_uniform(&self, uniform: MatrixUniform) -> Option<Matrix<4>> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::SetMatrixUniform { uniform: u, rows } if *u == uniform => {
                Some(Matrix::from_pica_rows(rows))
            }
            _ => None,
        })
    }

    pub fn last_blend(&self) -> Option<Blend> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::SetAlphaBlend(blend) => Some(*blend),
            _ => None,
        })
    }

    pub fn last_tex_env(&self) -> Option<TexEnv> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::SetTexEnv { stage: 0, env } => Some(*env),
            _ => None,
        })
    }

    /// `Some(None)` if the last bind on unit 0 cleared the binding.
    pub fn last_bound_texture(&self) -> Option<Option<u32>> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::BindTexture { unit: 0, id } => Some(*id),
            _ => None,
        })
    }
}

impl Pica for PicaTrace {
    type Texture = TraceTexture;

    fn description() -> &'static str {
        "PICA200 command trace (no hardware)"
    }

    fn set_attribute_layout(&mut self, attributes: &[Attribute]) {
        self.commands
            .push(Command::SetAttributeLayout(attributes.to_vec()));
    }
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.commands.push(Command::SetViewport {
            x,
            y,
            width,
            height,
        });
    }
    fn set_scissor(&mut self, mode: ScissorMode, left: u32, top: u32, right: u32, bottom: u32) {
        self.commands.push(Command::SetScissor {
            mode,
            left,
            top,
            right,
            bottom,
        });
    }
    fn set_cull_face(&mut self, mode: CullMode) {
        self.commands.push(Command::SetCullFace(mode));
    }
    fn set_depth_test(&mut self, enable: bool, func: TestFunc, write_mask: WriteMask) {
        self.commands.push(Command::SetDepthTest {
            enable,
            func,
            write_mask,
        });
    }
    fn set_alpha_test(&mut self, enable: bool, func: TestFunc, reference: u8) {
        self.commands.push(Command::SetAlphaTest {
            enable,
            func,
            reference,
        });
    }
    fn set_alpha_blend(&mut self, blend: Blend) {
        self.commands.push(Command::SetAlphaBlend(blend));
    }
    fn set_tex_env(&mut self, stage: u8, env: &TexEnv) {
        self.commands.push(Command::SetTexEnv { stage, env: *env });
    }
    fn set_matrix_uniform(&mut self, uniform: MatrixUniform, rows: &[[f32; 4]; 4]) {
        self.commands.push(Command::SetMatrixUniform {
            uniform,
            rows: *rows,
        });
    }

    fn texture_init(&mut self, width: u16, height: u16) -> Option<TraceTexture> {
        let size = usize::from(width) * usize::from(height) * 4;
        if self.texture_memory_limit - self.texture_memory_used < size {
            return None;
        }
        self.texture_memory_used += size;
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.commands.push(Command::TextureInit { id, width, height });
        Some(TraceTexture {
            id,
            width,
            height,
            wrap: (WrapMode::ClampToEdge, WrapMode::ClampToEdge),
            filter: (FilterMode::Nearest, FilterMode::Nearest),
            data: vec![0; size],
        })
    }
    fn texture_set_wrap(&mut self, texture: &mut TraceTexture, s: WrapMode, t: WrapMode) {
        texture.wrap = (s, t);
        self.commands.push(Command::TextureSetWrap {
            id: texture.id,
            s,
            t,
        });
    }
    fn texture_set_filter(&mut self, texture: &mut TraceTexture, mag: FilterMode, min: FilterMode) {
        texture.filter = (mag, min);
        self.commands.push(Command::TextureSetFilter {
            id: texture.id,
            mag,
            min,
        });
    }
    fn texture_upload(&mut self, texture: &mut TraceTexture, tiled: &[u8]) {
        assert_eq!(tiled.len(), texture.data.len());
        texture.data.copy_from_slice(tiled);
        self.commands.push(Command::TextureUpload { id: texture.id });
    }
    fn texture_read(&self, texture: &TraceTexture, out: &mut [u8]) {
        out.copy_from_slice(&texture.data);
    }
    fn texture_free(&mut self, texture: TraceTexture) {
        self.texture_memory_used -= texture.data.len();
        self.commands.push(Command::TextureFree { id: texture.id });
    }
    fn bind_texture(&mut self, unit: u8, texture: Option<&TraceTexture>) {
        self.commands.push(Command::BindTexture {
            unit,
            id: texture.map(|texture| texture.id),
        });
    }

    fn displayed_framebuffer(&self) -> Framebuffer<'_> {
        Framebuffer {
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            tilted: self.tilted,
            pixels: &self.framebuffer,
        }
    }
    fn clear(&mut self, color: Option<u32>, depth: Option<u32>) {
        if let Some(color) = color {
            let pixel = color.to_le_bytes();
            for chunk in self.framebuffer.chunks_exact_mut(4) {
                chunk.copy_from_slice(&pixel);
            }
        }
        self.commands.push(Command::Clear { color, depth });
    }

    fn imm_draw_begin(&mut self, primitive: Primitive) {
        assert!(!self.drawing, "C3D_ImmDrawBegin inside a batch");
        self.drawing = true;
        self.commands.push(Command::DrawBegin(primitive));
    }
    fn imm_send_attrib(&mut self, x: f32, y: f32, z: f32, w: f32) {
        assert!(self.drawing, "C3D_ImmSendAttrib outside a batch");
        self.commands.push(Command::Attrib([x, y, z, w]));
    }
    fn imm_draw_end(&mut self) {
        assert!(self.drawing, "C3D_ImmDrawEnd outside a batch");
        self.drawing = false;
        self.commands.push(Command::DrawEnd);
    }

    fn flush(&mut self) {
        self.commands.push(Command::Flush);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_memory_limit() {
        let mut trace = PicaTrace::new(400, 240).with_texture_memory_limit(8 * 8 * 4);
        let texture = trace.texture_init(8, 8).unwrap();
        assert!(trace.texture_init(8, 8).is_none());
        trace.texture_free(texture);
        assert_eq!(trace.texture_memory_used(), 0);
        assert!(trace.texture_init(8, 8).is_some());
    }

    #[test]
    fn draws_group_attributes() {
        let mut trace = PicaTrace::new(400, 240);
        trace.set_attribute_layout(super::super::VERTEX_ATTRIBUTES);
        trace.imm_draw_begin(Primitive::TriangleFan);
        for i in 0..6 {
            trace.imm_send_attrib(i as f32, 0.0, 0.0, 1.0);
        }
        trace.imm_draw_end();
        let draws = trace.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].primitive, Primitive::TriangleFan);
        assert_eq!(draws[0].vertices.len(), 2);
        assert_eq!(draws[0].vertices[1][0], [3.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn clear_fills_framebuffer() {
        let mut trace = PicaTrace::new(4, 2);
        trace.clear(Some(0x11223344), None);
        let framebuffer = trace.displayed_framebuffer();
        assert_eq!(&framebuffer.pixels[0..4], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(framebuffer.offset(1, 1), 12);
    }

    #[test]
    fn untilted_framebuffer_is_row_major() {
        let trace = PicaTrace::new(4, 2).with_untilted_framebuffer();
        let framebuffer = trace.displayed_framebuffer();
        assert_eq!(framebuffer.offset(1, 0), 4);
        assert_eq!(framebuffer.offset(0, 1), 16);
    }
}
