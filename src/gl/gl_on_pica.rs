/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Implementation of legacy OpenGL on top of the PICA200.
//!
//! The PICA has no fixed-function vertex processing, no `glBegin`/`glEnd` and
//! no texture objects as such. What it does have is a vertex shader with three
//! matrix uniforms, an immediate mode that takes one attribute at a time, and
//! a texture combiner that can express the fixed-function texture
//! environment. This module tracks the legacy state and translates it:
//!
//! - Render state is only stored by the setters and is committed in one go
//!   when a draw bracket opens (see [super::render_state]).
//! - Matrices are uploaded at the same point, and only if they changed.
//! - Textures live in a registry of objects owning native storage (see
//!   [super::textures]). Pixel data is swizzled on upload and unswizzled on
//!   readback (see [super::swizzle]).
//!
//! Misuse of the draw bracket and the matrix stack is a bug in the caller and
//! panics. Values outside the translated subset are tolerated and logged.

use super::gl_raw as gl;
use super::gl_raw::types::*;
use super::matrix_stack::MatrixStacks;
use super::render_state::{NativeState, RenderState};
use super::textures::{TextureObject, TextureRegistry};
use super::util::{
    param_to_boolean, param_to_float, param_to_int, ParamType, GET_PARAMS, TEX_ENV_PARAMS,
};
use super::{swizzle, translate, GLError, GL};
use crate::matrix::Matrix;
use crate::options::Options;
use crate::pica::{MatrixUniform, Pica, Primitive, VERTEX_ATTRIBUTES};

/// Smallest texture size the PICA can sample.
pub const MIN_TEXTURE_SIZE: GLsizei = 8;
/// Largest texture size the PICA can sample.
pub const MAX_TEXTURE_SIZE: GLsizei = 1024;

/// Whether a draw bracket is open.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Bracket {
    Idle,
    Recording(Primitive),
}

pub struct GLOnPica<P: Pica> {
    pica: P,
    options: Options,
    state: RenderState,
    matrices: MatrixStacks,
    textures: TextureRegistry<P::Texture>,
    bracket: Bracket,
    viewport: [GLint; 4],
    clear_color: [GLclampf; 4],
    clear_depth: GLclampf,
    current_color: [GLfloat; 4],
    current_tex_coord: [GLfloat; 4],
}

/// Allocate a zeroed staging buffer, reporting failure instead of aborting.
fn staging_buffer(len: usize) -> Result<Vec<u8>, GLError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| GLError::OutOfMemory { bytes: len })?;
    buffer.resize(len, 0);
    Ok(buffer)
}

fn is_supported_texture_size(size: GLsizei) -> bool {
    (MIN_TEXTURE_SIZE..=MAX_TEXTURE_SIZE).contains(&size) && (size as u32).is_power_of_two()
}

/// Bytes per pixel of a supported client pixel format.
fn pixel_size(format: GLenum, type_: GLenum) -> Result<usize, GLError> {
    match (format, type_) {
        (gl::RGBA, gl::UNSIGNED_BYTE) => Ok(4),
        (gl::RGB, gl::UNSIGNED_BYTE) => Ok(3),
        _ => Err(GLError::UnsupportedPixelFormat { format, type_ }),
    }
}

fn color_to_native(color: [GLclampf; 4]) -> u32 {
    color.iter().fold(0, |packed, &channel| {
        (packed << 8) | (channel.clamp(0.0, 1.0) * 255.0).round() as u32
    })
}

/// The native depth buffer has the near plane at its maximum.
fn depth_to_native(depth: GLclampf) -> u32 {
    ((1.0 - depth.clamp(0.0, 1.0)) * 0xFF_FFFF as f32).round() as u32
}

/// Send a texture object's stored parameters to its native storage.
fn apply_texture_parameters<P: Pica>(pica: &mut P, object: &mut TextureObject<P::Texture>) {
    let Some(native) = object.native.as_mut() else {
        return;
    };
    pica.texture_set_wrap(
        native,
        translate::wrap_mode(object.wrap_s),
        translate::wrap_mode(object.wrap_t),
    );
    pica.texture_set_filter(
        native,
        translate::filter_mode(object.mag_filter),
        translate::filter_mode(object.min_filter),
    );
}

impl<P: Pica> GLOnPica<P> {
    pub fn new(mut pica: P, options: Options) -> Self {
        echo!(
            "Legacy OpenGL on {}, {}x{} screen",
            P::description(),
            options.screen_width,
            options.screen_height
        );
        pica.set_attribute_layout(VERTEX_ATTRIBUTES);
        let viewport = [
            0,
            0,
            options.screen_width.into(),
            options.screen_height.into(),
        ];
        let (x, y, width, height) =
            options.native_viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
        pica.set_viewport(x, y, width, height);
        if pica.displayed_framebuffer().tilted != options.tilt {
            log!(
                "Framebuffer orientation doesn't match the tilt option ({}), copies will be transposed",
                options.tilt
            );
        }
        GLOnPica {
            state: RenderState::new(&options),
            matrices: MatrixStacks::new(options.matrix_stack_depth),
            textures: TextureRegistry::new(),
            bracket: Bracket::Idle,
            viewport,
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            current_color: [1.0; 4],
            current_tex_coord: [0.0, 0.0, 0.0, 1.0],
            pica,
            options,
        }
    }

    pub fn pica(&self) -> &P {
        &self.pica
    }

    pub fn pica_mut(&mut self) -> &mut P {
        &mut self.pica
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Whether a texture will be sampled by the next draw bracket.
    fn texturing(&self) -> bool {
        self.state.texture_2d
            && self
                .textures
                .bound_object()
                .is_some_and(TextureObject::is_initialized)
    }

    /// Translate the current render state without sending it anywhere. This is
    /// what the next draw bracket will commit.
    pub fn native_state(&self) -> NativeState {
        self.state.snapshot(&self.options, self.texturing())
    }

    /// Upload changed matrices, then send the render state and the texture
    /// binding.
    fn commit(&mut self) {
        for uniform in [
            MatrixUniform::Projection,
            MatrixUniform::ModelView,
            MatrixUniform::Texture,
        ] {
            if !self.matrices.take_dirty(uniform) {
                continue;
            }
            let mut matrix = *self.matrices.current(uniform);
            if uniform == MatrixUniform::Projection && self.options.tilt {
                matrix = matrix.multiply(&Matrix::tilt());
            }
            self.pica.set_matrix_uniform(uniform, &matrix.to_pica_rows());
        }

        self.native_state().apply(&mut self.pica);

        let texture = if self.texturing() {
            self.textures
                .bound_object()
                .and_then(|object| object.native.as_ref())
        } else {
            None
        };
        self.pica.bind_texture(0, texture);
    }

    /// Query the values of a `glGet` parameter. Returns [None] if it isn't
    /// tracked.
    fn get_param(&self, pname: GLenum) -> Option<(ParamType, Vec<f64>)> {
        let (type_, count) = GET_PARAMS.get_type_info(pname)?;
        let floats =
            |source: &[f32]| -> Vec<f64> { source.iter().copied().map(f64::from).collect() };
        let matrix = |which| floats(&self.matrices.current(which).to_column_array());
        let stack_depth = |which| vec![self.matrices.depth(which) as f64];
        let values: Vec<f64> = match pname {
            gl::ALPHA_TEST_FUNC => vec![f64::from(self.state.alpha_func)],
            gl::ALPHA_TEST_REF => vec![f64::from(self.state.alpha_ref)],
            gl::BLEND_DST => vec![f64::from(self.state.blend_dst)],
            gl::BLEND_SRC => vec![f64::from(self.state.blend_src)],
            gl::COLOR_CLEAR_VALUE => floats(&self.clear_color),
            gl::CULL_FACE_MODE => vec![f64::from(self.state.cull_face_mode)],
            gl::CURRENT_COLOR => floats(&self.current_color),
            gl::CURRENT_TEXTURE_COORDS => floats(&self.current_tex_coord),
            gl::DEPTH_CLEAR_VALUE => vec![f64::from(self.clear_depth)],
            gl::DEPTH_FUNC => vec![f64::from(self.state.depth_func)],
            gl::DEPTH_WRITEMASK => vec![f64::from(u8::from(self.state.depth_mask))],
            gl::FRONT_FACE => vec![f64::from(self.state.front_face)],
            gl::MATRIX_MODE => vec![f64::from(self.matrices.mode())],
            gl::MAX_MODELVIEW_STACK_DEPTH
            | gl::MAX_PROJECTION_STACK_DEPTH
            | gl::MAX_TEXTURE_STACK_DEPTH => vec![self.matrices.max_depth() as f64],
            gl::MAX_TEXTURE_SIZE => vec![f64::from(MAX_TEXTURE_SIZE)],
            gl::MODELVIEW_MATRIX => matrix(MatrixUniform::ModelView),
            gl::PROJECTION_MATRIX => matrix(MatrixUniform::Projection),
            gl::TEXTURE_MATRIX => matrix(MatrixUniform::Texture),
            gl::MODELVIEW_STACK_DEPTH => stack_depth(MatrixUniform::ModelView),
            gl::PROJECTION_STACK_DEPTH => stack_depth(MatrixUniform::Projection),
            gl::TEXTURE_STACK_DEPTH => stack_depth(MatrixUniform::Texture),
            gl::SCISSOR_BOX => self.state.scissor_box.map(f64::from).to_vec(),
            gl::TEXTURE_BINDING_2D => vec![f64::from(self.textures.bound().unwrap_or(0))],
            gl::VIEWPORT => self.viewport.map(f64::from).to_vec(),
            // The remaining entries of the table are capabilities.
            _ => vec![f64::from(u8::from(self.state.is_enabled(pname)?))],
        };
        debug_assert_eq!(values.len(), usize::from(count));
        Some((type_, values))
    }

    /// Target and level checks shared by the texture image functions. Returns
    /// `false` if the call should be ignored.
    fn is_supported_target(&self, function: &str, target: GLenum, level: GLint) -> bool {
        if target != gl::TEXTURE_2D {
            log!("Ignoring {}() with target {:#x}", function, target);
            false
        } else if level != 0 {
            log_dbg!("Ignoring {}() for mipmap level {}", function, level);
            false
        } else {
            true
        }
    }

    fn emit_vertex(&mut self, x: GLfloat, y: GLfloat, z: GLfloat) {
        assert!(
            matches!(self.bracket, Bracket::Recording(_)),
            "glVertex() outside glBegin()/glEnd()"
        );
        self.pica.imm_send_attrib(x, y, z, 1.0);
        let [s, t, r, q] = self.current_tex_coord;
        self.pica.imm_send_attrib(s, t, r, q);
        let [red, green, blue, alpha] = self.current_color;
        self.pica.imm_send_attrib(red, green, blue, alpha);
    }

    fn set_texture_parameter(&mut self, target: GLenum, pname: GLenum, param: GLenum) {
        if target != gl::TEXTURE_2D {
            log!("Ignoring glTexParameter() with target {:#x}", target);
            return;
        }
        let Some(object) = self.textures.bound_object_mut() else {
            log_dbg!("Ignoring glTexParameter() with no texture bound");
            return;
        };
        match pname {
            gl::TEXTURE_WRAP_S => object.wrap_s = param,
            gl::TEXTURE_WRAP_T => object.wrap_t = param,
            gl::TEXTURE_MIN_FILTER => object.min_filter = param,
            gl::TEXTURE_MAG_FILTER => object.mag_filter = param,
            _ => {
                log!("Ignoring texture parameter {:#x}", pname);
                return;
            }
        }
        apply_texture_parameters(&mut self.pica, object);
    }

    fn set_tex_env(&mut self, target: GLenum, pname: GLenum, param: GLenum) {
        if target != gl::TEXTURE_ENV {
            log!("Ignoring glTexEnv() with target {:#x}", target);
        } else if !self.state.tex_env.set(pname, param) {
            log!("Ignoring texture environment parameter {:#x}", pname);
        }
    }
}

impl<P: Pica> GL for GLOnPica<P> {
    fn description() -> &'static str {
        "Legacy OpenGL on PICA200"
    }

    // Generic state manipulation
    fn Enable(&mut self, cap: GLenum) {
        match self.state.capability_mut(cap) {
            Some(flag) => *flag = true,
            None => log_dbg!("Ignoring glEnable({:#x})", cap),
        }
    }
    fn IsEnabled(&mut self, cap: GLenum) -> GLboolean {
        match self.state.is_enabled(cap) {
            Some(true) => gl::TRUE,
            Some(false) => gl::FALSE,
            None => {
                log_dbg!("glIsEnabled({:#x}) of untracked capability", cap);
                gl::FALSE
            }
        }
    }
    fn Disable(&mut self, cap: GLenum) {
        match self.state.capability_mut(cap) {
            Some(flag) => *flag = false,
            None => log_dbg!("Ignoring glDisable({:#x})", cap),
        }
    }
    fn GetBooleanv(&mut self, pname: GLenum, params: &mut [GLboolean]) {
        let Some((_, values)) = self.get_param(pname) else {
            log!("Ignoring glGetBooleanv({:#x})", pname);
            return;
        };
        for (param, &value) in params[..values.len()].iter_mut().zip(&values) {
            *param = param_to_boolean(value);
        }
    }
    fn GetFloatv(&mut self, pname: GLenum, params: &mut [GLfloat]) {
        let Some((_, values)) = self.get_param(pname) else {
            log!("Ignoring glGetFloatv({:#x})", pname);
            return;
        };
        for (param, &value) in params[..values.len()].iter_mut().zip(&values) {
            *param = param_to_float(value);
        }
    }
    fn GetIntegerv(&mut self, pname: GLenum, params: &mut [GLint]) {
        let Some((type_, values)) = self.get_param(pname) else {
            log!("Ignoring glGetIntegerv({:#x})", pname);
            return;
        };
        for (param, &value) in params[..values.len()].iter_mut().zip(&values) {
            *param = param_to_int(type_, value);
        }
    }
    fn GetTexEnviv(&mut self, target: GLenum, pname: GLenum, params: &mut [GLint]) {
        if target != gl::TEXTURE_ENV || !TEX_ENV_PARAMS.is_known_param(pname) {
            log!("Ignoring glGetTexEnviv({:#x}, {:#x})", target, pname);
            return;
        }
        if let Some(value) = self.state.tex_env.get(pname) {
            params[0] = value as GLint;
        }
    }
    fn Finish(&mut self) {
        self.pica.flush();
    }
    fn Flush(&mut self) {
        self.pica.flush();
    }

    // Other state manipulation
    fn AlphaFunc(&mut self, func: GLenum, ref_: GLclampf) {
        self.state.alpha_func = func;
        self.state.alpha_ref = ref_.clamp(0.0, 1.0);
    }
    fn BlendFunc(&mut self, sfactor: GLenum, dfactor: GLenum) {
        self.state.blend_src = sfactor;
        self.state.blend_dst = dfactor;
    }
    fn CullFace(&mut self, mode: GLenum) {
        self.state.cull_face_mode = mode;
    }
    fn FrontFace(&mut self, mode: GLenum) {
        if mode == gl::CW || mode == gl::CCW {
            self.state.front_face = mode;
        } else {
            log!("Ignoring glFrontFace({:#x})", mode);
        }
    }
    fn DepthFunc(&mut self, func: GLenum) {
        self.state.depth_func = func;
    }
    fn DepthMask(&mut self, flag: GLboolean) {
        self.state.depth_mask = flag != gl::FALSE;
    }
    fn Scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        if width < 0 || height < 0 {
            log!("Ignoring glScissor() with negative size {}x{}", width, height);
            return;
        }
        self.state.scissor_box = [x, y, width, height];
    }
    fn Viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        if width < 0 || height < 0 {
            log!("Ignoring glViewport() with negative size {}x{}", width, height);
            return;
        }
        self.viewport = [x, y, width, height];
        let (x, y, width, height) = self.options.native_viewport(x, y, width, height);
        self.pica.set_viewport(x, y, width, height);
    }

    fn Fogi(&mut self, pname: GLenum, param: GLint) {
        log_dbg!("Ignoring glFogi({:#x}, {:#x})", pname, param);
    }
    fn Fogf(&mut self, pname: GLenum, param: GLfloat) {
        log_dbg!("Ignoring glFogf({:#x}, {})", pname, param);
    }
    fn Fogfv(&mut self, pname: GLenum, params: &[GLfloat]) {
        log_dbg!("Ignoring glFogfv({:#x}, {:?})", pname, params);
    }

    // Immediate mode
    fn Begin(&mut self, mode: GLenum) {
        assert!(
            self.bracket == Bracket::Idle,
            "glBegin() inside glBegin()/glEnd()"
        );
        let primitive = translate::primitive(mode);
        self.commit();
        self.pica.imm_draw_begin(primitive);
        self.bracket = Bracket::Recording(primitive);
    }
    fn End(&mut self) {
        assert!(
            self.bracket != Bracket::Idle,
            "glEnd() without glBegin()"
        );
        self.pica.imm_draw_end();
        self.bracket = Bracket::Idle;
    }
    fn Color3f(&mut self, red: GLfloat, green: GLfloat, blue: GLfloat) {
        self.Color4f(red, green, blue, 1.0);
    }
    fn Color4f(&mut self, red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat) {
        self.current_color = [red, green, blue, alpha];
    }
    fn Color4ub(&mut self, red: GLubyte, green: GLubyte, blue: GLubyte, alpha: GLubyte) {
        self.Color4f(
            f32::from(red) / 255.0,
            f32::from(green) / 255.0,
            f32::from(blue) / 255.0,
            f32::from(alpha) / 255.0,
        );
    }
    fn Color4ubv(&mut self, v: &[GLubyte; 4]) {
        self.Color4ub(v[0], v[1], v[2], v[3]);
    }
    fn TexCoord2f(&mut self, s: GLfloat, t: GLfloat) {
        self.TexCoord4f(s, t, 0.0, 1.0);
    }
    fn TexCoord2fv(&mut self, v: &[GLfloat; 2]) {
        self.TexCoord2f(v[0], v[1]);
    }
    fn TexCoord4f(&mut self, s: GLfloat, t: GLfloat, r: GLfloat, q: GLfloat) {
        self.current_tex_coord = [s, t, r, q];
    }
    fn Vertex2i(&mut self, x: GLint, y: GLint) {
        self.emit_vertex(x as GLfloat, y as GLfloat, 0.0);
    }
    fn Vertex2f(&mut self, x: GLfloat, y: GLfloat) {
        self.emit_vertex(x, y, 0.0);
    }
    fn Vertex3f(&mut self, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.emit_vertex(x, y, z);
    }
    fn Vertex3fv(&mut self, v: &[GLfloat; 3]) {
        self.emit_vertex(v[0], v[1], v[2]);
    }

    // Clearing
    fn Clear(&mut self, mask: GLbitfield) {
        let known = gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT;
        if mask & !known != 0 {
            log_dbg!("Ignoring glClear() bits {:#x}", mask & !known);
        }
        let color = (mask & gl::COLOR_BUFFER_BIT != 0).then(|| color_to_native(self.clear_color));
        let depth = (mask & gl::DEPTH_BUFFER_BIT != 0).then(|| depth_to_native(self.clear_depth));
        if color.is_some() || depth.is_some() {
            self.pica.clear(color, depth);
        }
    }
    fn ClearColor(&mut self, red: GLclampf, green: GLclampf, blue: GLclampf, alpha: GLclampf) {
        self.clear_color = [red, green, blue, alpha].map(|channel| channel.clamp(0.0, 1.0));
    }
    fn ClearDepth(&mut self, depth: GLclampd) {
        self.clear_depth = depth.clamp(0.0, 1.0) as GLclampf;
    }

    // Textures
    fn GenTextures(&mut self, textures: &mut [GLuint]) -> Result<(), GLError> {
        let mut failure = None;
        for (i, texture) in textures.iter_mut().enumerate() {
            match self.textures.allocate() {
                Ok(handle) => *texture = handle,
                Err(err) => {
                    failure = Some((i, err));
                    break;
                }
            }
        }
        if let Some((allocated, err)) = failure {
            // Don't leak the handles allocated so far.
            for &handle in &textures[..allocated] {
                self.textures.delete(handle);
            }
            return Err(err);
        }
        Ok(())
    }
    fn DeleteTextures(&mut self, textures: &[GLuint]) {
        for &handle in textures {
            if handle == 0 {
                continue;
            }
            match self.textures.delete(handle) {
                Some(object) => {
                    if let Some(native) = object.native {
                        self.pica.texture_free(native);
                    }
                }
                None => log_dbg!("Ignoring deletion of unknown texture {:#x}", handle),
            }
        }
    }
    fn BindTexture(&mut self, target: GLenum, texture: GLuint) {
        if target != gl::TEXTURE_2D {
            log!("Ignoring glBindTexture() with target {:#x}", target);
            return;
        }
        self.textures.bind(texture);
    }
    fn IsTexture(&mut self, texture: GLuint) -> GLboolean {
        if self.textures.is_texture(texture) {
            gl::TRUE
        } else {
            gl::FALSE
        }
    }
    fn TexParameteri(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        self.set_texture_parameter(target, pname, param as GLenum);
    }
    fn TexParameterf(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {
        self.set_texture_parameter(target, pname, param as GLenum);
    }
    fn TexImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        internalformat: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: Option<&[u8]>,
    ) -> Result<(), GLError> {
        if !self.is_supported_target("glTexImage2D", target, level) {
            return Ok(());
        }
        if border != 0 {
            log!("Ignoring border {} of glTexImage2D()", border);
        }
        if internalformat as GLenum != format {
            log_dbg!(
                "Storing glTexImage2D() internal format {:#x} as RGBA8",
                internalformat
            );
        }
        let bytes_per_pixel = pixel_size(format, type_)?;
        if !is_supported_texture_size(width) || !is_supported_texture_size(height) {
            return Err(GLError::UnsupportedTextureSize { width, height });
        }
        let pixel_count = width as usize * height as usize;

        let tiled = match pixels {
            Some(pixels) => {
                let expected = pixel_count * bytes_per_pixel;
                if pixels.len() < expected {
                    return Err(GLError::PixelBufferTooSmall {
                        expected,
                        actual: pixels.len(),
                    });
                }
                let mut tiled = staging_buffer(pixel_count * 4)?;
                if bytes_per_pixel == 4 {
                    swizzle::linear_to_tiled(
                        width as u32,
                        height as u32,
                        &pixels[..expected],
                        &mut tiled,
                    );
                } else {
                    let mut rgba = staging_buffer(pixel_count * 4)?;
                    swizzle::rgb_to_rgba(&pixels[..expected], &mut rgba);
                    swizzle::linear_to_tiled(width as u32, height as u32, &rgba, &mut tiled);
                }
                Some(tiled)
            }
            None => None,
        };

        let Some(object) = self.textures.bound_object_mut() else {
            log_dbg!("Ignoring glTexImage2D() with no texture bound");
            return Ok(());
        };
        if let Some(old) = object.native.take() {
            self.pica.texture_free(old);
        }
        // Checked above that both fit.
        let (width_u16, height_u16) = (width as u16, height as u16);
        let Some(mut native) = self.pica.texture_init(width_u16, height_u16) else {
            object.width = 0;
            object.height = 0;
            return Err(GLError::TextureAllocationFailed { width, height });
        };
        if let Some(tiled) = tiled {
            self.pica.texture_upload(&mut native, &tiled);
        }
        object.native = Some(native);
        object.width = width_u16;
        object.height = height_u16;
        apply_texture_parameters(&mut self.pica, object);
        Ok(())
    }
    fn CopyTexSubImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
    ) -> Result<(), GLError> {
        if !self.is_supported_target("glCopyTexSubImage2D", target, level) {
            return Ok(());
        }
        let Some(object) = self.textures.bound_object_mut() else {
            log_dbg!("Ignoring glCopyTexSubImage2D() with no texture bound");
            return Ok(());
        };
        let (texture_width, texture_height) = (object.width, object.height);
        let Some(native) = object.native.as_mut() else {
            log!("Ignoring glCopyTexSubImage2D() into texture without storage");
            return Ok(());
        };

        // Clip against the screen and the texture.
        let framebuffer = self.pica.displayed_framebuffer();
        let clip = |source: i64, dest: i64, size: i64, source_limit: i64, dest_limit: i64| {
            let skip = 0i64.max(-source).max(-dest);
            let (source, dest, size) = (source + skip, dest + skip, size - skip);
            let size = size.min(source_limit - source).min(dest_limit - dest);
            (source, dest, size.max(0))
        };
        let (x, xoffset, width) = clip(
            x.into(),
            xoffset.into(),
            width.into(),
            framebuffer.screen_width.into(),
            texture_width.into(),
        );
        let (y, yoffset, height) = clip(
            y.into(),
            yoffset.into(),
            height.into(),
            framebuffer.screen_height.into(),
            texture_height.into(),
        );
        if width == 0 || height == 0 {
            return Ok(());
        }
        let (x, y, width, height) = (x as u32, y as u32, width as usize, height as usize);
        let (xoffset, yoffset) = (xoffset as usize, yoffset as usize);

        let mut region = staging_buffer(width * height * 4)?;
        swizzle::gather_framebuffer(
            &framebuffer,
            x,
            y,
            width as u32,
            height as u32,
            &mut region,
        );

        // Patch the region into the texture's current contents.
        let texture_width = usize::from(texture_width);
        let texture_height = usize::from(texture_height);
        let size = texture_width * texture_height * 4;
        let mut tiled = staging_buffer(size)?;
        let mut linear = staging_buffer(size)?;
        self.pica.texture_read(native, &mut tiled);
        swizzle::tiled_to_linear(
            texture_width as u32,
            texture_height as u32,
            &tiled,
            &mut linear,
        );
        for (row_index, row) in region.chunks_exact(width * 4).enumerate() {
            let start = ((yoffset + row_index) * texture_width + xoffset) * 4;
            linear[start..start + row.len()].copy_from_slice(row);
        }
        swizzle::linear_to_tiled(
            texture_width as u32,
            texture_height as u32,
            &linear,
            &mut tiled,
        );
        self.pica.texture_upload(native, &tiled);
        Ok(())
    }
    fn GetTexImage(
        &mut self,
        target: GLenum,
        level: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: &mut [u8],
    ) -> Result<(), GLError> {
        if !self.is_supported_target("glGetTexImage", target, level) {
            return Ok(());
        }
        let bytes_per_pixel = pixel_size(format, type_)?;
        let Some(object) = self.textures.bound_object() else {
            log_dbg!("Ignoring glGetTexImage() with no texture bound");
            return Ok(());
        };
        let Some(native) = object.native.as_ref() else {
            log_dbg!("Ignoring glGetTexImage() of texture without storage");
            return Ok(());
        };
        let (width, height) = (u32::from(object.width), u32::from(object.height));
        let pixel_count = (width * height) as usize;
        let expected = pixel_count * bytes_per_pixel;
        if pixels.len() < expected {
            return Err(GLError::PixelBufferTooSmall {
                expected,
                actual: pixels.len(),
            });
        }

        let mut tiled = staging_buffer(pixel_count * 4)?;
        self.pica.texture_read(native, &mut tiled);
        if bytes_per_pixel == 4 {
            swizzle::tiled_to_linear(width, height, &tiled, &mut pixels[..expected]);
        } else {
            let mut rgba = staging_buffer(pixel_count * 4)?;
            swizzle::tiled_to_linear(width, height, &tiled, &mut rgba);
            for (rgb, rgba) in pixels[..expected]
                .chunks_exact_mut(3)
                .zip(rgba.chunks_exact(4))
            {
                rgb.copy_from_slice(&rgba[..3]);
            }
        }
        Ok(())
    }
    fn GetTexLevelParameteriv(
        &mut self,
        target: GLenum,
        level: GLint,
        pname: GLenum,
        params: &mut [GLint],
    ) {
        if target != gl::TEXTURE_2D {
            log!("Ignoring glGetTexLevelParameteriv() with target {:#x}", target);
            return;
        }
        let object = self
            .textures
            .bound_object()
            .filter(|object| level == 0 && object.is_initialized());
        params[0] = match pname {
            gl::TEXTURE_WIDTH => object.map_or(0, |object| object.width.into()),
            gl::TEXTURE_HEIGHT => object.map_or(0, |object| object.height.into()),
            gl::TEXTURE_INTERNAL_FORMAT => gl::RGBA as GLint,
            _ => {
                log!("Ignoring glGetTexLevelParameteriv() of {:#x}", pname);
                return;
            }
        };
    }
    fn TexEnvf(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {
        self.set_tex_env(target, pname, param as GLenum);
    }
    fn TexEnvi(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        self.set_tex_env(target, pname, param as GLenum);
    }

    // Matrix stack operations
    fn MatrixMode(&mut self, mode: GLenum) {
        match MatrixStacks::stack_for_mode(mode) {
            Some(which) => self.matrices.select(which),
            None => log!("Ignoring glMatrixMode({:#x})", mode),
        }
    }
    fn LoadIdentity(&mut self) {
        self.matrices.load(Matrix::identity());
    }
    fn LoadMatrixf(&mut self, m: &[GLfloat; 16]) {
        self.matrices.load(Matrix::from_column_array(m));
    }
    fn MultMatrixf(&mut self, m: &[GLfloat; 16]) {
        self.matrices.multiply(&Matrix::from_column_array(m));
    }
    fn PushMatrix(&mut self) {
        if !self.matrices.push() {
            log!(
                "glPushMatrix() on full {:#x} stack ignored",
                self.matrices.mode()
            );
        }
    }
    fn PopMatrix(&mut self) {
        self.matrices.pop();
    }
    fn Ortho(
        &mut self,
        left: GLdouble,
        right: GLdouble,
        bottom: GLdouble,
        top: GLdouble,
        near: GLdouble,
        far: GLdouble,
    ) {
        self.matrices.load(Matrix::ortho(
            left as f32,
            right as f32,
            bottom as f32,
            top as f32,
            near as f32,
            far as f32,
        ));
    }
    fn Frustum(
        &mut self,
        left: GLdouble,
        right: GLdouble,
        bottom: GLdouble,
        top: GLdouble,
        near: GLdouble,
        far: GLdouble,
    ) {
        self.matrices.load(Matrix::frustum(
            left as f32,
            right as f32,
            bottom as f32,
            top as f32,
            near as f32,
            far as f32,
        ));
    }
    fn Perspective(&mut self, fovy: GLdouble, aspect: GLdouble, near: GLdouble, far: GLdouble) {
        self.matrices.load(Matrix::perspective(
            fovy as f32,
            aspect as f32,
            near as f32,
            far as f32,
        ));
    }
    fn Rotatef(&mut self, angle: GLfloat, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.matrices.multiply(&Matrix::rotation(angle, x, y, z));
    }
    fn Scalef(&mut self, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.matrices.multiply(&Matrix::scale(x, y, z));
    }
    fn Translatef(&mut self, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.matrices.multiply(&Matrix::translation(x, y, z));
    }
}
