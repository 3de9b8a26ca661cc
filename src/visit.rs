//! Tree traversal and the visitor contract.
//!
//! Depth-first, pre-order, single-threaded per file. A visitor takes each
//! node by value on entry and hands back what should stand in its place:
//!
//! * [`Edit::Visit`] — keep (or replace) the node and descend into the
//!   children of whatever was returned, so nested rewrites compose;
//! * [`Edit::Prune`] — keep the node, skip its children;
//! * [`Edit::Remove`] — drop the node. Legal as-is in list slots; in a slot
//!   the grammar requires to be filled (a loop or branch body) the walk
//!   substitutes an explicit empty statement instead of leaving the tree
//!   ungrammatical.
//!
//! Expressions always occupy required slots, so their hook returns the
//! removal-free [`Pass`]. Every node also gets a post-order `leave_*` call.
//! Sibling lists are walked in declared order; that order is part of the
//! contract, analyses depend on it.

use crate::cursor::{Cursor, StepKind};
use crate::tree::*;

pub enum Edit<T> {
    Visit(T),
    Prune(T),
    Remove,
}

pub enum Pass<T> {
    Visit(T),
    Prune(T),
}

#[allow(unused_variables)]
pub trait Visitor {
    /// Called once per traversal before descent, with the whole unit.
    fn visit_file(&mut self, file: SourceFile, cx: &Cursor) -> SourceFile {
        file
    }

    fn enter_import(&mut self, import: Import, cx: &Cursor) -> Edit<Import> {
        Edit::Visit(import)
    }

    fn enter_member(&mut self, member: Member, cx: &Cursor) -> Edit<Member> {
        Edit::Visit(member)
    }

    fn leave_member(&mut self, member: Member, cx: &Cursor) -> Member {
        member
    }

    fn enter_stmt(&mut self, stmt: Stmt, cx: &Cursor) -> Edit<Stmt> {
        Edit::Visit(stmt)
    }

    fn leave_stmt(&mut self, stmt: Stmt, cx: &Cursor) -> Stmt {
        stmt
    }

    fn enter_expr(&mut self, expr: Expr, cx: &Cursor) -> Pass<Expr> {
        Pass::Visit(expr)
    }

    fn leave_expr(&mut self, expr: Expr, cx: &Cursor) -> Expr {
        expr
    }
}

/// Run one full traversal of `file` under `visitor`.
pub fn walk_file<V: Visitor + ?Sized>(visitor: &mut V, file: SourceFile) -> SourceFile {
    let mut cx = Cursor::root();
    let mut file = visitor.visit_file(file, &cx);
    cx.push(StepKind::File, file.id, 0);

    let imports = std::mem::take(&mut file.imports);
    file.imports = imports
        .into_iter()
        .filter_map(|import| match visitor.enter_import(import, &cx) {
            Edit::Visit(i) | Edit::Prune(i) => Some(i),
            Edit::Remove => None,
        })
        .collect();

    let types = std::mem::take(&mut file.types);
    file.types = types.into_iter().map(|class| walk_class(visitor, class, &mut cx)).collect();

    cx.pop();
    file
}

fn walk_class<V: Visitor + ?Sized>(visitor: &mut V, mut class: ClassDecl, cx: &mut Cursor) -> ClassDecl {
    let annotations = std::mem::take(&mut class.annotations);
    class.annotations =
        annotations.into_iter().map(|a| walk_annotation(visitor, a, cx)).collect();
    class.body = walk_class_body(visitor, class.body, cx, StepKind::ClassBody);
    class
}

fn walk_class_body<V: Visitor + ?Sized>(
    visitor: &mut V,
    mut body: ClassBody,
    cx: &mut Cursor,
    kind: StepKind,
) -> ClassBody {
    cx.push(kind, body.id, 0);
    let members = std::mem::take(&mut body.members);
    body.members = members
        .into_iter()
        .enumerate()
        .filter_map(|(i, member)| {
            let member = match visitor.enter_member(member, cx) {
                Edit::Visit(m) => walk_member_children(visitor, m, cx, i),
                Edit::Prune(m) => m,
                Edit::Remove => return None,
            };
            Some(visitor.leave_member(member, cx))
        })
        .collect();
    cx.pop();
    body
}

fn walk_member_children<V: Visitor + ?Sized>(
    visitor: &mut V,
    member: Member,
    cx: &mut Cursor,
    index: usize,
) -> Member {
    match member {
        Member::Field(mut field) => {
            if let Some(init) = field.init {
                cx.push(StepKind::FieldInit, field.id, index);
                let value = walk_expr(visitor, init.value, cx);
                cx.pop();
                field.init = Some(Initializer { eq: init.eq, value });
            }
            Member::Field(field)
        }
        Member::Method(mut method) => {
            let annotations = std::mem::take(&mut method.annotations);
            method.annotations =
                annotations.into_iter().map(|a| walk_annotation(visitor, a, cx)).collect();
            cx.push(StepKind::MethodBody, method.id, index);
            method.body = walk_block_stmts(visitor, method.body, cx);
            cx.pop();
            Member::Method(method)
        }
        Member::Class(class) => Member::Class(walk_class(visitor, class, cx)),
    }
}

fn walk_annotation<V: Visitor + ?Sized>(
    visitor: &mut V,
    mut ann: Annotation,
    cx: &mut Cursor,
) -> Annotation {
    if let Some(mut args) = ann.args {
        cx.push(StepKind::AnnotationArgs, ann.id, 0);
        args.args = args
            .args
            .into_iter()
            .map(|mut arg| {
                arg.value = walk_expr(visitor, arg.value, cx);
                arg
            })
            .collect();
        cx.pop();
        ann.args = Some(args);
    }
    ann
}

/// Walk the statements of a block, honoring removals.
fn walk_block_stmts<V: Visitor + ?Sized>(visitor: &mut V, mut block: Block, cx: &mut Cursor) -> Block {
    let stmts = std::mem::take(&mut block.stmts);
    block.stmts = stmts
        .into_iter()
        .enumerate()
        .filter_map(|(i, stmt)| {
            let stmt = match visitor.enter_stmt(stmt, cx) {
                Edit::Visit(s) => walk_stmt_children(visitor, s, cx, i),
                Edit::Prune(s) => s,
                Edit::Remove => return None,
            };
            Some(visitor.leave_stmt(stmt, cx))
        })
        .collect();
    block
}

/// Walk a statement in a slot the grammar requires to be filled. A removal
/// here leaves an explicit `;` carrying the removed statement's leading
/// trivia.
fn walk_required_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: Stmt, cx: &mut Cursor) -> Stmt {
    let leading = stmt.leading().clone();
    let stmt = match visitor.enter_stmt(stmt, cx) {
        Edit::Visit(s) => walk_stmt_children(visitor, s, cx, 0),
        Edit::Prune(s) => s,
        Edit::Remove => Stmt::Empty(Empty { id: NodeId::fresh(), semi: leading }),
    };
    visitor.leave_stmt(stmt, cx)
}

fn walk_stmt_children<V: Visitor + ?Sized>(
    visitor: &mut V,
    stmt: Stmt,
    cx: &mut Cursor,
    index: usize,
) -> Stmt {
    match stmt {
        Stmt::Local(mut s) => {
            if let Some(init) = s.init {
                cx.push(StepKind::FieldInit, s.id, index);
                let value = walk_expr(visitor, init.value, cx);
                cx.pop();
                s.init = Some(Initializer { eq: init.eq, value });
            }
            Stmt::Local(s)
        }
        Stmt::Assign(mut s) => {
            s.target = walk_expr(visitor, s.target, cx);
            s.value = walk_expr(visitor, s.value, cx);
            Stmt::Assign(s)
        }
        Stmt::Expr(mut s) => {
            s.expr = walk_expr(visitor, s.expr, cx);
            Stmt::Expr(s)
        }
        Stmt::If(mut s) => {
            cx.push(StepKind::Condition, s.id, index);
            s.cond = walk_expr(visitor, s.cond, cx);
            cx.pop();
            cx.push(StepKind::ThenArm, s.id, 0);
            s.then_branch = Box::new(walk_required_stmt(visitor, *s.then_branch, cx));
            cx.pop();
            if let Some(els) = s.else_branch {
                cx.push(StepKind::ElseArm, s.id, 1);
                let body = Box::new(walk_required_stmt(visitor, *els.body, cx));
                cx.pop();
                s.else_branch = Some(ElseClause { kw: els.kw, body });
            }
            Stmt::If(s)
        }
        Stmt::While(mut s) => {
            cx.push(StepKind::Condition, s.id, index);
            s.cond = walk_expr(visitor, s.cond, cx);
            cx.pop();
            cx.push(StepKind::LoopBody, s.id, 0);
            s.body = Box::new(walk_required_stmt(visitor, *s.body, cx));
            cx.pop();
            Stmt::While(s)
        }
        Stmt::ForEach(mut s) => {
            cx.push(StepKind::Condition, s.id, index);
            s.iterable = walk_expr(visitor, s.iterable, cx);
            cx.pop();
            cx.push(StepKind::LoopBody, s.id, 0);
            s.body = Box::new(walk_required_stmt(visitor, *s.body, cx));
            cx.pop();
            Stmt::ForEach(s)
        }
        Stmt::Return(mut s) => {
            s.value = s.value.map(|value| walk_expr(visitor, value, cx));
            Stmt::Return(s)
        }
        Stmt::Block(mut s) => {
            cx.push(StepKind::Block, s.id, index);
            s = walk_block_stmts(visitor, s, cx);
            cx.pop();
            Stmt::Block(s)
        }
        Stmt::Empty(s) => Stmt::Empty(s),
    }
}

fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: Expr, cx: &mut Cursor) -> Expr {
    let expr = match visitor.enter_expr(expr, cx) {
        Pass::Visit(e) => walk_expr_children(visitor, e, cx),
        Pass::Prune(e) => e,
    };
    visitor.leave_expr(expr, cx)
}

fn walk_expr_children<V: Visitor + ?Sized>(visitor: &mut V, expr: Expr, cx: &mut Cursor) -> Expr {
    match expr {
        Expr::Field(mut e) => {
            e.target = Box::new(walk_expr(visitor, *e.target, cx));
            Expr::Field(e)
        }
        Expr::Call(mut e) => {
            if let Some(mut recv) = e.receiver {
                recv.expr = Box::new(walk_expr(visitor, *recv.expr, cx));
                e.receiver = Some(recv);
            }
            cx.push(StepKind::Args, e.id, 0);
            e.args = e.args.into_iter().map(|a| walk_expr(visitor, a, cx)).collect();
            cx.pop();
            Expr::Call(e)
        }
        Expr::New(mut e) => {
            cx.push(StepKind::Args, e.id, 0);
            e.args = e.args.into_iter().map(|a| walk_expr(visitor, a, cx)).collect();
            cx.pop();
            e.body = e.body.map(|body| walk_class_body(visitor, body, cx, StepKind::AnonClassBody));
            Expr::New(e)
        }
        Expr::Binary(mut e) => {
            e.lhs = Box::new(walk_expr(visitor, *e.lhs, cx));
            e.rhs = Box::new(walk_expr(visitor, *e.rhs, cx));
            Expr::Binary(e)
        }
        Expr::Unary(mut e) => {
            e.expr = Box::new(walk_expr(visitor, *e.expr, cx));
            Expr::Unary(e)
        }
        Expr::Paren(mut e) => {
            e.expr = Box::new(walk_expr(visitor, *e.expr, cx));
            Expr::Paren(e)
        }
        Expr::Lambda(mut e) => {
            cx.push(StepKind::LambdaBody, e.id, 0);
            e.body = match e.body {
                LambdaBody::Expr(b) => LambdaBody::Expr(Box::new(walk_expr(visitor, *b, cx))),
                LambdaBody::Block(mut b) => {
                    cx.push(StepKind::Block, b.id, 0);
                    b = walk_block_stmts(visitor, b, cx);
                    cx.pop();
                    LambdaBody::Block(b)
                }
            };
            cx.pop();
            Expr::Lambda(e)
        }
        other @ (Expr::Lit(_) | Expr::Name(_)) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::printer;

    struct RemoveAssignsTo<'a> {
        name: &'a str,
    }

    impl Visitor for RemoveAssignsTo<'_> {
        fn enter_stmt(&mut self, stmt: Stmt, _cx: &Cursor) -> Edit<Stmt> {
            if let Stmt::Assign(a) = &stmt {
                if matches!(&a.target, Expr::Name(n) if n.name == self.name) {
                    return Edit::Remove;
                }
            }
            Edit::Visit(stmt)
        }
    }

    #[test]
    fn test_remove_from_block_drops_statement_and_its_trivia() {
        let src = "class A {\n    void f() {\n        int x = 0;\n        x = 1;\n        done();\n    }\n}\n";
        let file = parser::parse(src).unwrap();
        let out = walk_file(&mut RemoveAssignsTo { name: "x" }, file);
        assert_eq!(
            printer::print(&out),
            "class A {\n    void f() {\n        int x = 0;\n        done();\n    }\n}\n"
        );
    }

    #[test]
    fn test_remove_from_required_slot_leaves_empty_statement() {
        let src = "class A {\n    void f(boolean c) {\n        if (c) x = 1;\n    }\n}\n";
        let file = parser::parse(src).unwrap();
        let out = walk_file(&mut RemoveAssignsTo { name: "x" }, file);
        assert_eq!(
            printer::print(&out),
            "class A {\n    void f(boolean c) {\n        if (c) ;\n    }\n}\n"
        );
    }

    struct ReplaceThenCollect {
        seen: Vec<String>,
    }

    impl Visitor for ReplaceThenCollect {
        fn enter_stmt(&mut self, stmt: Stmt, _cx: &Cursor) -> Edit<Stmt> {
            if let Stmt::Assign(a) = &stmt {
                if matches!(&a.target, Expr::Name(n) if n.name == "old") {
                    let replacement = parser::parse("class D { void d() { fresh = next; } }")
                        .unwrap();
                    let Member::Method(mut m) = replacement.types[0].body.members[0].clone()
                    else {
                        unreachable!()
                    };
                    let mut stmt = m.body.stmts.remove(0);
                    stmt.set_leading(a.target.leading().clone());
                    return Edit::Visit(stmt);
                }
            }
            Edit::Visit(stmt)
        }

        fn enter_expr(&mut self, expr: Expr, _cx: &Cursor) -> Pass<Expr> {
            if let Expr::Name(n) = &expr {
                self.seen.push(n.name.clone());
            }
            Pass::Visit(expr)
        }
    }

    #[test]
    fn test_replacement_children_are_visited() {
        let src = "class A {\n    void f() {\n        old = 1;\n    }\n}\n";
        let file = parser::parse(src).unwrap();
        let mut visitor = ReplaceThenCollect { seen: Vec::new() };
        let out = walk_file(&mut visitor, file);
        // The walk descended into the replacement, not the original.
        assert!(visitor.seen.contains(&"next".to_string()));
        assert!(printer::print(&out).contains("fresh = next;"));
    }

    struct OrderProbe {
        entered: Vec<String>,
        left: Vec<String>,
    }

    impl Visitor for OrderProbe {
        fn enter_stmt(&mut self, stmt: Stmt, _cx: &Cursor) -> Edit<Stmt> {
            if let Stmt::Assign(a) = &stmt {
                if let Expr::Name(n) = &a.target {
                    self.entered.push(n.name.clone());
                }
            }
            Edit::Visit(stmt)
        }

        fn leave_stmt(&mut self, stmt: Stmt, _cx: &Cursor) -> Stmt {
            if let Stmt::Assign(a) = &stmt {
                if let Expr::Name(n) = &a.target {
                    self.left.push(n.name.clone());
                }
            }
            stmt
        }
    }

    #[test]
    fn test_siblings_visited_in_declared_order_with_leave_hooks() {
        let src = "class A {\n    void f() {\n        a = 1;\n        b = 2;\n        c = 3;\n    }\n}\n";
        let file = parser::parse(src).unwrap();
        let mut probe = OrderProbe { entered: Vec::new(), left: Vec::new() };
        walk_file(&mut probe, file);
        assert_eq!(probe.entered, ["a", "b", "c"]);
        assert_eq!(probe.left, ["a", "b", "c"]);
    }

    struct PruneBlocks {
        visited_exprs: usize,
    }

    impl Visitor for PruneBlocks {
        fn enter_stmt(&mut self, stmt: Stmt, _cx: &Cursor) -> Edit<Stmt> {
            match stmt {
                Stmt::Block(_) => Edit::Prune(stmt),
                _ => Edit::Visit(stmt),
            }
        }

        fn enter_expr(&mut self, expr: Expr, _cx: &Cursor) -> Pass<Expr> {
            self.visited_exprs += 1;
            Pass::Visit(expr)
        }
    }

    #[test]
    fn test_prune_skips_children() {
        let src = "class A {\n    void f() {\n        {\n            hidden = 1;\n        }\n    }\n}\n";
        let file = parser::parse(src).unwrap();
        let mut probe = PruneBlocks { visited_exprs: 0 };
        walk_file(&mut probe, file);
        assert_eq!(probe.visited_exprs, 0);
    }
}
