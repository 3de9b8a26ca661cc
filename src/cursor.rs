//! Traversal cursors.
//!
//! A [`Cursor`] is the ownership path from the root of a compilation unit to
//! the node currently being visited: one [`Step`] per ancestor, each naming
//! the construct kind, its node id, and the position among its siblings. It
//! is an ordinary value — cheap to clone, holding no references into the
//! tree — so the scope indexer and recipes can keep one without pinning the
//! tree they were derived from. A cursor is only meaningful for the single
//! traversal that produced it.

use smallvec::SmallVec;

use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    File,
    ClassBody,
    AnonClassBody,
    MethodBody,
    Block,
    ThenArm,
    ElseArm,
    LoopBody,
    LambdaBody,
    Condition,
    Args,
    AnnotationArgs,
    FieldInit,
}

impl StepKind {
    /// Steps that start a declaration nested inside the enclosing method,
    /// i.e. code that may run at another time than its surroundings.
    pub fn is_nested_decl(self) -> bool {
        matches!(self, StepKind::AnonClassBody | StepKind::LambdaBody)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub node: NodeId,
    pub index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Cursor {
    steps: SmallVec<[Step; 8]>,
}

impl Cursor {
    pub fn root() -> Self {
        Cursor::default()
    }

    pub(crate) fn push(&mut self, kind: StepKind, node: NodeId, index: usize) {
        self.steps.push(Step { kind, node, index });
    }

    pub(crate) fn pop(&mut self) {
        self.steps.pop();
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Is the visited node inside a loop body?
    pub fn in_loop(&self) -> bool {
        self.steps.iter().any(|s| s.kind == StepKind::LoopBody)
    }

    /// Is the visited node inside an anonymous class or lambda?
    pub fn in_nested_decl(&self) -> bool {
        self.steps.iter().any(|s| s.kind.is_nested_decl())
    }

    /// Innermost enclosing step of the given kind, walking outward.
    pub fn enclosing(&self, kind: StepKind) -> Option<Step> {
        self.steps.iter().rev().find(|s| s.kind == kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_context_queries() {
        let mut cursor = Cursor::root();
        cursor.push(StepKind::File, NodeId::fresh(), 0);
        cursor.push(StepKind::ClassBody, NodeId::fresh(), 0);
        let method = NodeId::fresh();
        cursor.push(StepKind::MethodBody, method, 1);
        assert!(!cursor.in_loop());

        cursor.push(StepKind::LoopBody, NodeId::fresh(), 0);
        assert!(cursor.in_loop());
        assert!(!cursor.in_nested_decl());
        assert_eq!(cursor.enclosing(StepKind::MethodBody).unwrap().node, method);

        cursor.pop();
        assert!(!cursor.in_loop());
        assert_eq!(cursor.depth(), 3);
    }
}
