use pica_gl::gl_raw as gl;
use pica_gl::matrix::Matrix;
use pica_gl::pica::trace::Command;
use pica_gl::pica::{
    BlendFactor, CombineFunc, FilterMode, MatrixUniform, Primitive, TevSource, WrapMode,
};
use pica_gl::{GLError, GLOnPica, Options, PicaTrace, GL};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn new_gl(options: Options) -> GLOnPica<PicaTrace> {
    init_logging();
    let mut pica = PicaTrace::new(options.screen_width, options.screen_height);
    if !options.tilt {
        pica = pica.with_untilted_framebuffer();
    }
    GLOnPica::new(pica, options)
}

fn solid(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
    rgba.iter()
        .copied()
        .cycle()
        .take(width * height * 4)
        .collect()
}

/// Draw one screen-aligned quad as a triangle fan.
fn draw_quad(gl: &mut GLOnPica<PicaTrace>, width: f32, height: f32) {
    gl.Begin(gl::TRIANGLE_FAN);
    gl.TexCoord2f(0.0, 0.0);
    gl.Vertex2f(0.0, 0.0);
    gl.TexCoord2f(1.0, 0.0);
    gl.Vertex2f(width, 0.0);
    gl.TexCoord2f(1.0, 1.0);
    gl.Vertex2f(width, height);
    gl.TexCoord2f(0.0, 1.0);
    gl.Vertex2f(0.0, height);
    gl.End();
}

#[test]
fn textured_sprite_frame() {
    let mut gl = new_gl(Options::default());

    gl.MatrixMode(gl::PROJECTION);
    gl.LoadIdentity();
    gl.Ortho(0.0, 400.0, 0.0, 240.0, -1.0, 1.0);
    gl.MatrixMode(gl::MODELVIEW);
    gl.LoadIdentity();

    let mut texture = [0];
    gl.GenTextures(&mut texture).unwrap();
    gl.BindTexture(gl::TEXTURE_2D, texture[0]);
    gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as _);
    gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as _);
    gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP as _);
    gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP as _);
    let pixels = solid(64, 32, [0x20, 0x40, 0x60, 0x80]);
    gl.TexImage2D(
        gl::TEXTURE_2D,
        0,
        gl::RGBA as _,
        64,
        32,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        Some(&pixels),
    )
    .unwrap();

    gl.ClearColor(0.0, 0.0, 0.0, 1.0);
    gl.Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);

    gl.Enable(gl::TEXTURE_2D);
    gl.Enable(gl::BLEND);
    gl.BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
    gl.PushMatrix();
    gl.Translatef(100.0, 50.0, 0.0);
    gl.Color4ub(255, 255, 255, 128);
    draw_quad(&mut gl, 64.0, 32.0);
    gl.PopMatrix();
    gl.Flush();

    let trace = gl.pica();
    let draws = trace.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].primitive, Primitive::TriangleFan);
    assert_eq!(draws[0].vertices.len(), 4);
    assert_eq!(draws[0].vertices[2][0], [64.0, 32.0, 0.0, 1.0]);
    assert_eq!(draws[0].vertices[2][1], [1.0, 1.0, 0.0, 1.0]);

    assert_eq!(
        trace.matrix_uniform(MatrixUniform::Projection),
        Some(Matrix::ortho(0.0, 400.0, 0.0, 240.0, -1.0, 1.0).multiply(&Matrix::tilt()))
    );
    assert_eq!(
        trace.matrix_uniform(MatrixUniform::ModelView),
        Some(Matrix::translation(100.0, 50.0, 0.0))
    );

    let blend = trace.last_blend().unwrap();
    assert_eq!(blend.src_alpha, BlendFactor::SrcAlpha);
    assert_eq!(blend.dst_alpha, BlendFactor::OneMinusSrcAlpha);

    let env = trace.last_tex_env().unwrap();
    assert_eq!(env.func_rgb, CombineFunc::Modulate);
    assert_eq!(env.src_rgb[0], TevSource::Texture0);
    assert_eq!(env.src_rgb[1], TevSource::PrimaryColor);

    assert!(trace.last_bound_texture().unwrap().is_some());
    assert!(trace.commands().iter().any(|command| matches!(
        command,
        Command::TextureSetWrap {
            s: WrapMode::ClampToEdge,
            t: WrapMode::ClampToEdge,
            ..
        }
    )));
    assert!(trace.commands().iter().any(|command| matches!(
        command,
        Command::TextureSetFilter {
            mag: FilterMode::Nearest,
            min: FilterMode::Nearest,
            ..
        }
    )));
    assert_eq!(trace.commands().last(), Some(&Command::Flush));

    gl.DeleteTextures(&texture);
    assert_eq!(gl.pica().texture_memory_used(), 0);
}

#[test]
fn render_to_texture_round_trip() {
    let mut gl = new_gl(Options::default());

    gl.ClearColor(1.0, 0.0, 0.0, 1.0);
    gl.Clear(gl::COLOR_BUFFER_BIT);
    gl.pica_mut().set_framebuffer_pixel(0, 0, [0, 0, 0xFF, 0xFF]);

    let mut texture = [0];
    gl.GenTextures(&mut texture).unwrap();
    gl.BindTexture(gl::TEXTURE_2D, texture[0]);
    gl.TexImage2D(
        gl::TEXTURE_2D,
        0,
        gl::RGB as _,
        8,
        8,
        0,
        gl::RGB,
        gl::UNSIGNED_BYTE,
        None,
    )
    .unwrap();
    gl.CopyTexSubImage2D(gl::TEXTURE_2D, 0, 0, 0, 0, 0, 8, 8)
        .unwrap();

    let mut rgb = vec![0; 8 * 8 * 3];
    gl.GetTexImage(gl::TEXTURE_2D, 0, gl::RGB, gl::UNSIGNED_BYTE, &mut rgb)
        .unwrap();
    assert_eq!(&rgb[0..3], &[0, 0, 0xFF]);
    assert!(rgb[3..].chunks_exact(3).all(|pixel| pixel == [0xFF, 0, 0]));

    let mut too_small = [0; 16];
    assert_eq!(
        gl.GetTexImage(
            gl::TEXTURE_2D,
            0,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            &mut too_small
        ),
        Err(GLError::PixelBufferTooSmall {
            expected: 256,
            actual: 16
        })
    );
}

#[test]
fn untilted_screen() {
    let mut options = Options::default();
    assert_eq!(options.parse_argument("--gl-no-tilt"), Ok(true));
    assert_eq!(options.parse_argument("--gl-screen=320x240"), Ok(true));
    let mut gl = new_gl(options);

    gl.Viewport(10, 20, 300, 200);
    gl.Enable(gl::SCISSOR_TEST);
    gl.Scissor(0, 0, 160, 120);
    gl.Begin(gl::TRIANGLES);
    gl.End();

    let trace = gl.pica();
    assert!(trace.commands().contains(&Command::SetViewport {
        x: 10,
        y: 20,
        width: 300,
        height: 200,
    }));
    assert_eq!(
        trace.matrix_uniform(MatrixUniform::Projection),
        Some(Matrix::identity())
    );
    assert!(trace.commands().iter().any(|command| matches!(
        command,
        Command::SetScissor {
            right: 160,
            bottom: 120,
            ..
        }
    )));
}
