/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Enough of a matrix implementation to handle the legacy transform calls.
//!
//! Projections are built for the PICA200 clip space, whose depth range is
//! [-1, 0] (near plane at -1), rather than OpenGL's [-1, 1].

/// Column-major, the same element order `glLoadMatrixf` uses.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix<const N: usize>([[f32; N]; N]);

impl<const N: usize> Matrix<N> {
    pub fn identity() -> Self {
        let mut matrix = [[0f32; N]; N];
        #[allow(clippy::needless_range_loop)]
        for i in 0..N {
            matrix[i][i] = 1f32;
        }
        Matrix(matrix)
    }

    pub fn columns(&self) -> &[[f32; N]; N] {
        &self.0
    }

    /// Construct from rows, i.e. the way matrices are written on paper.
    pub fn from_rows(rows: [[f32; N]; N]) -> Self {
        Matrix(rows).transpose()
    }

    pub fn rows(&self) -> [[f32; N]; N] {
        self.transpose().0
    }

    pub fn transpose(&self) -> Self {
        let mut res = [[0f32; N]; N];
        for (i, column) in self.0.iter().enumerate() {
            for (j, &cell) in column.iter().enumerate() {
                res[j][i] = cell;
            }
        }
        Matrix(res)
    }

    /// Compose two transforms. The result applies `self` first, then `other`,
    /// so in conventional notation this is `other × self`.
    pub fn multiply(&self, other: &Self) -> Self {
        let mut res = [[0f32; N]; N];
        #[allow(clippy::needless_range_loop)]
        for i in 0..N {
            for j in 0..N {
                for k in 0..N {
                    res[i][j] += self.0[i][k] * other.0[k][j];
                }
            }
        }
        Matrix(res)
    }

    /// Transform a vector using the matrix.
    pub fn transform(&self, vector: [f32; N]) -> [f32; N] {
        let mut new = [0f32; N];
        for (i, basis_vector) in self.columns().iter().enumerate() {
            for j in 0..N {
                new[j] += basis_vector[j] * vector[i];
            }
        }
        new
    }
}

impl Matrix<4> {
    /// Reinterpret the 16 floats passed to `glLoadMatrixf`.
    pub fn from_column_array(m: &[f32; 16]) -> Self {
        let mut columns = [[0f32; 4]; 4];
        for (i, column) in columns.iter_mut().enumerate() {
            column.copy_from_slice(&m[i * 4..i * 4 + 4]);
        }
        Matrix(columns)
    }

    /// Inverse of [Self::from_column_array], as returned by `glGetFloatv`.
    pub fn to_column_array(&self) -> [f32; 16] {
        let mut m = [0f32; 16];
        for (i, column) in self.0.iter().enumerate() {
            m[i * 4..i * 4 + 4].copy_from_slice(column);
        }
        m
    }

    /// The layout expected by the vertex shader's matrix uniforms: one
    /// register per row, components stored from W down to X.
    pub fn to_pica_rows(&self) -> [[f32; 4]; 4] {
        let mut rows = self.rows();
        for row in rows.iter_mut() {
            row.reverse();
        }
        rows
    }

    pub fn from_pica_rows(pica_rows: &[[f32; 4]; 4]) -> Self {
        let mut rows = *pica_rows;
        for row in rows.iter_mut() {
            row.reverse();
        }
        Self::from_rows(rows)
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation of `angle` degrees around the axis
    /// `(x, y, z)`, as in `glRotatef`. A zero axis gives the identity.
    pub fn rotation(angle: f32, x: f32, y: f32, z: f32) -> Self {
        let length = (x * x + y * y + z * z).sqrt();
        if length == 0.0 || !length.is_finite() {
            return Self::identity();
        }
        let (x, y, z) = (x / length, y / length, z / length);
        let (s, c) = angle.to_radians().sin_cos();
        let ic = 1.0 - c;
        Self::from_rows([
            [x * x * ic + c, x * y * ic - z * s, x * z * ic + y * s, 0.0],
            [y * x * ic + z * s, y * y * ic + c, y * z * ic - x * s, 0.0],
            [x * z * ic - y * s, y * z * ic + x * s, z * z * ic + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Equivalent of `glOrtho`, with the near plane mapped to -1 and the far
    /// plane to 0.
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::from_rows([
            [2.0 / (right - left), 0.0, 0.0, (left + right) / (left - right)],
            [0.0, 2.0 / (top - bottom), 0.0, (bottom + top) / (bottom - top)],
            [
                0.0,
                0.0,
                1.0 / (near - far),
                0.5 * (near + far) / (near - far) - 0.5,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Equivalent of `glFrustum`, with the near plane mapped to -1 and the far
    /// plane to 0.
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::from_rows([
            [
                2.0 * near / (right - left),
                0.0,
                (right + left) / (right - left),
                0.0,
            ],
            [
                0.0,
                2.0 * near / (top - bottom),
                (top + bottom) / (top - bottom),
                0.0,
            ],
            [0.0, 0.0, near / (near - far), far * near / (near - far)],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Equivalent of `gluPerspective`: `fovy` is in degrees.
    pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = near * (fovy.to_radians() / 2.0).tan();
        let right = top * aspect;
        Self::frustum(-right, right, -top, top, near, far)
    }

    /// Rotation by 90° that maps the landscape screen onto the portrait
    /// framebuffer. Applied after the projection.
    pub fn tilt() -> Self {
        Self::from_rows([
            [0.0, 1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::Matrix;

    fn assert_close(a: [f32; 4], b: [f32; 4]) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn translation_moves_origin() {
        let m = Matrix::<4>::translation(1.0, 2.0, 3.0);
        assert_eq!(m.transform([0.0, 0.0, 0.0, 1.0]), [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn multiply_applies_self_first() {
        let t = Matrix::<4>::translation(1.0, 0.0, 0.0);
        let s = Matrix::<4>::scale(2.0, 2.0, 2.0);
        // Translate, then scale.
        assert_close(
            t.multiply(&s).transform([1.0, 1.0, 0.0, 1.0]),
            [4.0, 2.0, 0.0, 1.0],
        );
        // Scale, then translate.
        assert_close(
            s.multiply(&t).transform([1.0, 1.0, 0.0, 1.0]),
            [3.0, 2.0, 0.0, 1.0],
        );
    }

    #[test]
    fn rotation_is_counter_clockwise() {
        let m = Matrix::<4>::rotation(90.0, 0.0, 0.0, 1.0);
        assert_close(m.transform([1.0, 0.0, 0.0, 1.0]), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(Matrix::<4>::rotation(45.0, 0.0, 0.0, 0.0), Matrix::identity());
    }

    #[test]
    fn column_array_layout() {
        let m = Matrix::<4>::translation(5.0, 6.0, 7.0);
        let array = m.to_column_array();
        assert_eq!(&array[12..16], &[5.0, 6.0, 7.0, 1.0]);
        assert_eq!(Matrix::from_column_array(&array), m);
    }

    #[test]
    fn pica_rows_are_reversed() {
        let m = Matrix::<4>::translation(5.0, 6.0, 7.0);
        let rows = m.to_pica_rows();
        assert_eq!(rows[0], [5.0, 0.0, 0.0, 1.0]);
        assert_eq!(rows[3], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(Matrix::from_pica_rows(&rows), m);
    }

    #[test]
    fn ortho_depth_range() {
        let m = Matrix::<4>::ortho(0.0, 320.0, 0.0, 200.0, -1.0, 1.0);
        // near plane is at z = 1 in eye space when near = -1
        assert_close(m.transform([0.0, 0.0, 1.0, 1.0]), [-1.0, -1.0, -1.0, 1.0]);
        assert_close(m.transform([320.0, 200.0, -1.0, 1.0]), [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn perspective_depth_range() {
        let m = Matrix::<4>::perspective(90.0, 1.0, 1.0, 100.0);
        let near = m.transform([0.0, 0.0, -1.0, 1.0]);
        let far = m.transform([0.0, 0.0, -100.0, 1.0]);
        assert!((near[2] / near[3] + 1.0).abs() < 1e-5);
        assert!((far[2] / far[3]).abs() < 1e-5);
    }

    #[test]
    fn tilt_rotates_screen() {
        assert_close(
            Matrix::<4>::tilt().transform([1.0, 0.0, 0.0, 1.0]),
            [0.0, -1.0, 0.0, 1.0],
        );
    }
}
