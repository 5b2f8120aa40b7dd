/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Generic legacy OpenGL interface.
//!
//! Unfortunately this does not provide the types and constants, so the correct
//! usage is to import `GL` and `types` from this module, but get the
//! constants from [super::gl_raw].
//!
//! Pointer arguments of the C API are slices here. Where the C function reads
//! or writes a fixed number of values, the slice must be at least that long.

use super::gl_raw::types::*;
use super::GLError;

/// Trait representing a legacy OpenGL implementation and context.
#[allow(clippy::upper_case_acronyms)]
#[allow(clippy::too_many_arguments)] // not our fault :(
pub trait GL {
    /// Get a human-friendly description of this implementation.
    fn description() -> &'static str
    where
        Self: Sized;

    // Generic state manipulation
    fn Enable(&mut self, cap: GLenum);
    fn IsEnabled(&mut self, cap: GLenum) -> GLboolean;
    fn Disable(&mut self, cap: GLenum);
    fn GetBooleanv(&mut self, pname: GLenum, params: &mut [GLboolean]);
    fn GetFloatv(&mut self, pname: GLenum, params: &mut [GLfloat]);
    fn GetIntegerv(&mut self, pname: GLenum, params: &mut [GLint]);
    fn GetTexEnviv(&mut self, target: GLenum, pname: GLenum, params: &mut [GLint]);
    fn Finish(&mut self);
    fn Flush(&mut self);

    // Other state manipulation
    fn AlphaFunc(&mut self, func: GLenum, ref_: GLclampf);
    fn BlendFunc(&mut self, sfactor: GLenum, dfactor: GLenum);
    fn CullFace(&mut self, mode: GLenum);
    fn FrontFace(&mut self, mode: GLenum);
    fn DepthFunc(&mut self, func: GLenum);
    fn DepthMask(&mut self, flag: GLboolean);
    fn Scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn Viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    /// Fog is accepted but has no effect.
    fn Fogi(&mut self, pname: GLenum, param: GLint);
    fn Fogf(&mut self, pname: GLenum, param: GLfloat);
    fn Fogfv(&mut self, pname: GLenum, params: &[GLfloat]);

    // Immediate mode
    fn Begin(&mut self, mode: GLenum);
    fn End(&mut self);
    fn Color3f(&mut self, red: GLfloat, green: GLfloat, blue: GLfloat);
    fn Color4f(&mut self, red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat);
    fn Color4ub(&mut self, red: GLubyte, green: GLubyte, blue: GLubyte, alpha: GLubyte);
    fn Color4ubv(&mut self, v: &[GLubyte; 4]);
    fn TexCoord2f(&mut self, s: GLfloat, t: GLfloat);
    fn TexCoord2fv(&mut self, v: &[GLfloat; 2]);
    fn TexCoord4f(&mut self, s: GLfloat, t: GLfloat, r: GLfloat, q: GLfloat);
    fn Vertex2i(&mut self, x: GLint, y: GLint);
    fn Vertex2f(&mut self, x: GLfloat, y: GLfloat);
    fn Vertex3f(&mut self, x: GLfloat, y: GLfloat, z: GLfloat);
    fn Vertex3fv(&mut self, v: &[GLfloat; 3]);

    // Clearing
    fn Clear(&mut self, mask: GLbitfield);
    fn ClearColor(&mut self, red: GLclampf, green: GLclampf, blue: GLclampf, alpha: GLclampf);
    fn ClearDepth(&mut self, depth: GLclampd);

    // Textures
    fn GenTextures(&mut self, textures: &mut [GLuint]) -> Result<(), GLError>;
    fn DeleteTextures(&mut self, textures: &[GLuint]);
    fn BindTexture(&mut self, target: GLenum, texture: GLuint);
    fn IsTexture(&mut self, texture: GLuint) -> GLboolean;
    fn TexParameteri(&mut self, target: GLenum, pname: GLenum, param: GLint);
    fn TexParameterf(&mut self, target: GLenum, pname: GLenum, param: GLfloat);
    /// `pixels` of [None] allocates storage without initializing it.
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
    ) -> Result<(), GLError>;
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
    ) -> Result<(), GLError>;
    fn GetTexImage(
        &mut self,
        target: GLenum,
        level: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: &mut [u8],
    ) -> Result<(), GLError>;
    fn GetTexLevelParameteriv(
        &mut self,
        target: GLenum,
        level: GLint,
        pname: GLenum,
        params: &mut [GLint],
    );
    fn TexEnvf(&mut self, target: GLenum, pname: GLenum, param: GLfloat);
    fn TexEnvi(&mut self, target: GLenum, pname: GLenum, param: GLint);

    // Matrix stack operations
    fn MatrixMode(&mut self, mode: GLenum);
    fn LoadIdentity(&mut self);
    fn LoadMatrixf(&mut self, m: &[GLfloat; 16]);
    fn MultMatrixf(&mut self, m: &[GLfloat; 16]);
    fn PushMatrix(&mut self);
    fn PopMatrix(&mut self);
    fn Ortho(
        &mut self,
        left: GLdouble,
        right: GLdouble,
        bottom: GLdouble,
        top: GLdouble,
        near: GLdouble,
        far: GLdouble,
    );
    fn Frustum(
        &mut self,
        left: GLdouble,
        right: GLdouble,
        bottom: GLdouble,
        top: GLdouble,
        near: GLdouble,
        far: GLdouble,
    );
    /// `gluPerspective`.
    fn Perspective(&mut self, fovy: GLdouble, aspect: GLdouble, near: GLdouble, far: GLdouble);
    fn Rotatef(&mut self, angle: GLfloat, x: GLfloat, y: GLfloat, z: GLfloat);
    fn Scalef(&mut self, x: GLfloat, y: GLfloat, z: GLfloat);
    fn Translatef(&mut self, x: GLfloat, y: GLfloat, z: GLfloat);
}
