/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The model-view, projection and texture matrix stacks.
//!
//! Matrices are kept in the legacy convention (see [crate::matrix]). Any
//! conversion to what the vertex shader expects happens when they are
//! uploaded, never in here.

use super::gl_raw as gl;
use super::gl_raw::types::GLenum;
use crate::matrix::Matrix;
use crate::pica::MatrixUniform;

struct MatrixStack {
    current: Matrix<4>,
    saved: Vec<Matrix<4>>,
    /// Changed since it was last uploaded.
    dirty: bool,
}

pub struct MatrixStacks {
    stacks: [MatrixStack; 3],
    active: MatrixUniform,
    max_depth: usize,
}

fn index(which: MatrixUniform) -> usize {
    match which {
        MatrixUniform::ModelView => 0,
        MatrixUniform::Projection => 1,
        MatrixUniform::Texture => 2,
    }
}

impl MatrixStacks {
    /// All stacks start out with an identity matrix. `max_depth` is how many
    /// matrices each stack can save.
    pub fn new(max_depth: usize) -> Self {
        let new_stack = || MatrixStack {
            current: Matrix::identity(),
            saved: Vec::new(),
            dirty: true,
        };
        MatrixStacks {
            stacks: [new_stack(), new_stack(), new_stack()],
            active: MatrixUniform::ModelView,
            max_depth,
        }
    }

    /// Map a `glMatrixMode` value to a stack.
    pub fn stack_for_mode(mode: GLenum) -> Option<MatrixUniform> {
        match mode {
            gl::MODELVIEW => Some(MatrixUniform::ModelView),
            gl::PROJECTION => Some(MatrixUniform::Projection),
            gl::TEXTURE => Some(MatrixUniform::Texture),
            _ => None,
        }
    }

    pub fn mode(&self) -> GLenum {
        match self.active {
            MatrixUniform::ModelView => gl::MODELVIEW,
            MatrixUniform::Projection => gl::PROJECTION,
            MatrixUniform::Texture => gl::TEXTURE,
        }
    }

    pub fn select(&mut self, which: MatrixUniform) {
        self.active = which;
    }

    fn active_stack(&mut self) -> &mut MatrixStack {
        &mut self.stacks[index(self.active)]
    }

    pub fn current(&self, which: MatrixUniform) -> &Matrix<4> {
        &self.stacks[index(which)].current
    }

    /// Number of matrices on a stack, counting the current one.
    pub fn depth(&self, which: MatrixUniform) -> usize {
        self.stacks[index(which)].saved.len() + 1
    }

    /// Maximum value of [Self::depth].
    pub fn max_depth(&self) -> usize {
        self.max_depth + 1
    }

    /// Replace the active stack's current matrix.
    pub fn load(&mut self, matrix: Matrix<4>) {
        let stack = self.active_stack();
        stack.current = matrix;
        stack.dirty = true;
    }

    /// Compose a transform onto the active stack's current matrix, so that it
    /// applies to vertices before the transforms already accumulated.
    pub fn multiply(&mut self, matrix: &Matrix<4>) {
        let stack = self.active_stack();
        stack.current = matrix.multiply(&stack.current);
        stack.dirty = true;
    }

    /// Save a copy of the current matrix. Returns `false`, leaving the stack
    /// untouched, if it is already full.
    pub fn push(&mut self) -> bool {
        let max_depth = self.max_depth;
        let stack = self.active_stack();
        if stack.saved.len() >= max_depth {
            return false;
        }
        stack.saved.push(stack.current);
        true
    }

    /// Restore the most recently saved matrix. Panics if nothing was saved.
    pub fn pop(&mut self) {
        let active = self.active;
        let stack = self.active_stack();
        let Some(matrix) = stack.saved.pop() else {
            panic!("glPopMatrix() with empty {:?} stack", active);
        };
        stack.current = matrix;
        stack.dirty = true;
    }

    /// Returns `true` if the matrix changed since the last call, and clears
    /// the flag.
    pub fn take_dirty(&mut self, which: MatrixUniform) -> bool {
        std::mem::replace(&mut self.stacks[index(which)].dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_push_pop_restores_matrix() {
        let mut stacks = MatrixStacks::new(32);
        stacks.multiply(&Matrix::translation(1.0, 2.0, 3.0));
        let before = *stacks.current(MatrixUniform::ModelView);
        assert!(stacks.push());
        stacks.multiply(&Matrix::rotation(30.0, 0.0, 1.0, 0.0));
        assert!(stacks.push());
        stacks.load(Matrix::scale(2.0, 2.0, 2.0));
        assert_eq!(stacks.depth(MatrixUniform::ModelView), 3);
        stacks.pop();
        stacks.pop();
        assert_eq!(*stacks.current(MatrixUniform::ModelView), before);
        assert_eq!(stacks.depth(MatrixUniform::ModelView), 1);
    }

    #[test]
    fn translate_moves_origin() {
        let mut stacks = MatrixStacks::new(32);
        stacks.load(Matrix::identity());
        stacks.multiply(&Matrix::translation(4.0, 5.0, 6.0));
        assert_eq!(
            stacks
                .current(MatrixUniform::ModelView)
                .transform([0.0, 0.0, 0.0, 1.0]),
            [4.0, 5.0, 6.0, 1.0]
        );
    }

    #[test]
    fn later_transforms_apply_first() {
        let mut stacks = MatrixStacks::new(32);
        stacks.multiply(&Matrix::translation(1.0, 0.0, 0.0));
        stacks.multiply(&Matrix::scale(2.0, 2.0, 2.0));
        // scale, then translate
        assert_eq!(
            stacks
                .current(MatrixUniform::ModelView)
                .transform([1.0, 1.0, 0.0, 1.0]),
            [3.0, 2.0, 0.0, 1.0]
        );
    }

    #[test]
    fn stacks_are_independent() {
        let mut stacks = MatrixStacks::new(32);
        stacks.select(MatrixUniform::Projection);
        assert_eq!(stacks.mode(), gl::PROJECTION);
        stacks.load(Matrix::scale(3.0, 3.0, 3.0));
        assert!(stacks.push());
        assert_eq!(*stacks.current(MatrixUniform::ModelView), Matrix::identity());
        assert_eq!(stacks.depth(MatrixUniform::ModelView), 1);
        assert_eq!(stacks.depth(MatrixUniform::Projection), 2);
    }

    #[test]
    fn overflow_is_ignored() {
        let mut stacks = MatrixStacks::new(2);
        assert!(stacks.push());
        assert!(stacks.push());
        assert!(!stacks.push());
        assert_eq!(stacks.depth(MatrixUniform::ModelView), 3);
        assert_eq!(stacks.max_depth(), 3);
    }

    #[test]
    #[should_panic(expected = "empty")]
    fn pop_empty_stack() {
        let mut stacks = MatrixStacks::new(32);
        stacks.pop();
    }

    #[test]
    fn dirty_tracking() {
        let mut stacks = MatrixStacks::new(32);
        assert!(stacks.take_dirty(MatrixUniform::Texture));
        assert!(!stacks.take_dirty(MatrixUniform::Texture));
        stacks.select(MatrixUniform::Texture);
        stacks.push();
        assert!(!stacks.take_dirty(MatrixUniform::Texture));
        stacks.pop();
        assert!(stacks.take_dirty(MatrixUniform::Texture));
        assert!(stacks.take_dirty(MatrixUniform::ModelView));
    }

    #[test]
    fn modes() {
        assert_eq!(
            MatrixStacks::stack_for_mode(gl::TEXTURE),
            Some(MatrixUniform::Texture)
        );
        assert_eq!(MatrixStacks::stack_for_mode(gl::COLOR), None);
    }
}
