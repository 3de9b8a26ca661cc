//! Scope and reference index.
//!
//! One read-only pass over a resolved tree, run before any mutating visitor,
//! aggregating what the resolver annotated: per-scope declarations in
//! declaration order and, per symbol, every use site in program order
//! together with enough ancestor context (branch arms, loop bodies, nested
//! declarations) to reason about reachability later. The index owns all of
//! its data — no borrows into the tree — so lookups stay valid while a
//! visitor rebuilds the tree underneath it. Analyses that need a
//! post-mutation view build a fresh index instead.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cursor::{Cursor, StepKind};
use crate::tree::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    File,
    Class,
    Method,
    Block,
    Lambda,
}

#[derive(Debug)]
pub struct ScopeData {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    /// Node owning this scope (class body, method, block, lambda).
    pub owner: NodeId,
    /// Class or method name, where the scope has one.
    pub name: Option<String>,
    /// Declared symbols, in declaration order.
    pub decls: Vec<SymbolId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    /// Compound assignment: reads the previous value, then writes.
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtxKind {
    ThenArm,
    ElseArm,
    LoopBody,
    NestedDecl,
}

/// One conditional/looping/nesting ancestor of a use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtxStep {
    pub node: NodeId,
    pub kind: CtxKind,
}

#[derive(Debug, Clone)]
pub struct UseSite {
    pub node: NodeId,
    /// The enclosing assignment statement for writes that a recipe could
    /// remove; `None` for reads and for writes baked into a declaration.
    pub stmt: Option<NodeId>,
    pub access: Access,
    pub ctx: SmallVec<[CtxStep; 4]>,
}

#[derive(Debug)]
pub struct SymbolEntry {
    pub handle: SymbolHandle,
    pub decl_node: NodeId,
    pub decl_scope: ScopeId,
    /// Context depth at the declaration; a use site's context relative to
    /// the declaration is `ctx[decl_ctx_len..]`.
    pub decl_ctx_len: usize,
    /// Use sites in program order.
    pub uses: Vec<UseSite>,
}

/// A simple-name type reference resolved through the import machinery.
#[derive(Debug, Clone)]
pub struct TypeUse {
    pub fqn: String,
    pub node: NodeId,
}

/// An unqualified reference to a static member.
#[derive(Debug, Clone)]
pub struct StaticUse {
    pub owner: String,
    pub name: String,
    pub node: NodeId,
}

#[derive(Debug, Default)]
pub struct ScopeIndex {
    scopes: Vec<ScopeData>,
    entries: Vec<SymbolEntry>,
    by_symbol: FxHashMap<SymbolId, usize>,
    scope_by_owner: FxHashMap<NodeId, ScopeId>,
    /// File-wide type references in first-reference order.
    pub type_uses: Vec<TypeUse>,
    /// File-wide unqualified static member references, in order.
    pub static_uses: Vec<StaticUse>,
    /// Simple names the resolver could not account for. Analyses must treat
    /// anything these names could shadow as used.
    pub unresolved: Vec<String>,
}

impl ScopeIndex {
    pub fn build(file: &SourceFile) -> ScopeIndex {
        let mut b = Builder { index: ScopeIndex::default(), stack: Vec::new(), cursor: Cursor::root() };
        b.file(file);
        b.index
    }

    pub fn scopes(&self) -> &[ScopeData] {
        &self.scopes
    }

    pub fn scope(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id.0]
    }

    pub fn scope_of(&self, owner: NodeId) -> Option<ScopeId> {
        self.scope_by_owner.get(&owner).copied()
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn entry(&self, id: SymbolId) -> Option<&SymbolEntry> {
        self.by_symbol.get(&id).map(|&i| &self.entries[i])
    }

    /// Scope chain from the given scope outward to the file scope.
    pub fn chain(&self, from: ScopeId) -> Vec<ScopeId> {
        let mut out = vec![from];
        let mut cur = from;
        while let Some(parent) = self.scopes[cur.0].parent {
            out.push(parent);
            cur = parent;
        }
        out
    }

    /// Locals and parameters visible from the given scope, outermost first.
    pub fn visible_locals(&self, from: ScopeId) -> Vec<SymbolHandle> {
        let mut chain = self.chain(from);
        chain.reverse();
        let mut out = Vec::new();
        for scope in chain {
            for &sym in &self.scopes[scope.0].decls {
                if let Some(entry) = self.entry(sym) {
                    if matches!(entry.handle.kind, SymbolKind::Local | SymbolKind::Param) {
                        out.push(SymbolHandle::clone(&entry.handle));
                    }
                }
            }
        }
        out
    }

    /// Name of the innermost class enclosing the given scope.
    pub fn enclosing_class_name(&self, from: ScopeId) -> Option<String> {
        self.chain(from)
            .into_iter()
            .find(|s| self.scopes[s.0].kind == ScopeKind::Class)
            .and_then(|s| self.scopes[s.0].name.clone())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

struct Builder {
    index: ScopeIndex,
    /// Open scopes, innermost last.
    stack: Vec<ScopeId>,
    cursor: Cursor,
}

impl Builder {
    fn open(&mut self, kind: ScopeKind, owner: NodeId, name: Option<String>) -> ScopeId {
        let id = ScopeId(self.index.scopes.len());
        let parent = self.stack.last().copied();
        self.index.scopes.push(ScopeData { id, parent, kind, owner, name, decls: Vec::new() });
        self.index.scope_by_owner.insert(owner, id);
        self.stack.push(id);
        id
    }

    fn close(&mut self) {
        self.stack.pop();
    }

    fn ctx(&self) -> SmallVec<[CtxStep; 4]> {
        self.cursor
            .steps()
            .iter()
            .filter_map(|s| {
                let kind = match s.kind {
                    StepKind::ThenArm => CtxKind::ThenArm,
                    StepKind::ElseArm => CtxKind::ElseArm,
                    StepKind::LoopBody => CtxKind::LoopBody,
                    StepKind::AnonClassBody | StepKind::LambdaBody => CtxKind::NestedDecl,
                    _ => return None,
                };
                Some(CtxStep { node: s.node, kind })
            })
            .collect()
    }

    fn declare(&mut self, handle: &SymbolHandle, decl_node: NodeId) {
        let scope = *self.stack.last().expect("declaration outside any scope");
        self.index.scopes[scope.0].decls.push(handle.id);
        let entry = SymbolEntry {
            handle: SymbolHandle::clone(handle),
            decl_node,
            decl_scope: scope,
            decl_ctx_len: self.ctx().len(),
            uses: Vec::new(),
        };
        self.index.by_symbol.insert(handle.id, self.index.entries.len());
        self.index.entries.push(entry);
    }

    fn record_use(&mut self, handle: &SymbolHandle, node: NodeId, stmt: Option<NodeId>, access: Access) {
        let ctx = self.ctx();
        if let Some(&i) = self.index.by_symbol.get(&handle.id) {
            self.index.entries[i].uses.push(UseSite { node, stmt, access, ctx });
        }
    }

    /// Route a resolved (or unresolved) name to the right bucket.
    fn record_name(&mut self, ident: &Ident, stmt: Option<NodeId>, access: Access) {
        match &ident.sym {
            Some(sym) => match sym.kind {
                SymbolKind::Local | SymbolKind::Param | SymbolKind::Field => {
                    self.record_use(&SymbolHandle::clone(sym), ident.id, stmt, access);
                }
                SymbolKind::Type => {
                    self.index.type_uses.push(TypeUse { fqn: sym.fqn(), node: ident.id });
                }
                SymbolKind::StaticMember => {
                    self.index.static_uses.push(StaticUse {
                        owner: sym.owner.clone().unwrap_or_default(),
                        name: sym.name.clone(),
                        node: ident.id,
                    });
                }
                SymbolKind::Method => {}
            },
            None => {
                if ident.name != "this" {
                    self.index.unresolved.push(ident.name.clone());
                }
            }
        }
    }

    fn type_ref(&mut self, ty: &TypeRef) {
        // Qualified references need no import; primitives resolve to nothing.
        if !ty.is_primitive() && !ty.name.is_qualified() {
            match &ty.resolved {
                Some(sym) if sym.kind == SymbolKind::StaticMember => {
                    self.index.static_uses.push(StaticUse {
                        owner: sym.owner.clone().unwrap_or_default(),
                        name: sym.name.clone(),
                        node: ty.id,
                    });
                }
                Some(sym) => {
                    self.index.type_uses.push(TypeUse { fqn: sym.fqn(), node: ty.id });
                }
                None => self.index.unresolved.push(ty.name.head.name.clone()),
            }
        }
        if let Some(args) = &ty.args {
            for arg in &args.args {
                self.type_ref(arg);
            }
        }
    }

    // -- walk ---------------------------------------------------------------

    fn file(&mut self, file: &SourceFile) {
        self.open(ScopeKind::File, file.id, None);
        self.cursor.push(StepKind::File, file.id, 0);
        for class in &file.types {
            self.class(class);
        }
        self.cursor.pop();
        self.close();
    }

    fn class(&mut self, class: &ClassDecl) {
        for ann in &class.annotations {
            self.annotation(ann);
        }
        if let Some(ext) = &class.extends {
            self.type_ref(&ext.ty);
        }
        if let Some(imp) = &class.implements {
            for ty in &imp.types {
                self.type_ref(ty);
            }
        }
        self.class_body(&class.body, Some(class.name.name.clone()), StepKind::ClassBody);
    }

    fn class_body(&mut self, body: &ClassBody, name: Option<String>, step: StepKind) {
        self.open(ScopeKind::Class, body.id, name);
        self.cursor.push(step, body.id, 0);

        // Members see each other regardless of order; register fields first.
        for member in &body.members {
            if let Member::Field(f) = member {
                if let Some(sym) = &f.name.sym {
                    let sym = SymbolHandle::clone(sym);
                    self.declare(&sym, f.id);
                }
            }
        }

        for (i, member) in body.members.iter().enumerate() {
            match member {
                Member::Field(f) => {
                    self.type_ref(&f.ty);
                    if let Some(init) = &f.init {
                        self.expr(&init.value, None);
                    }
                    // An initialized field starts written; the write is part
                    // of the declaration, not a removable statement.
                    if f.init.is_some() {
                        if let Some(sym) = &f.name.sym {
                            let sym = SymbolHandle::clone(sym);
                            self.record_use(&sym, f.name.id, None, Access::Write);
                        }
                    }
                }
                Member::Method(m) => self.method(m, i),
                Member::Class(c) => self.class(c),
            }
        }

        self.cursor.pop();
        self.close();
    }

    fn method(&mut self, method: &MethodDecl, index: usize) {
        for ann in &method.annotations {
            self.annotation(ann);
        }
        self.type_ref(&method.ret);
        let scope = self.open(ScopeKind::Method, method.id, Some(method.name.name.clone()));
        // The body block shares the method's scope; let lookups by the
        // block's id land there too.
        self.index.scope_by_owner.insert(method.body.id, scope);
        self.cursor.push(StepKind::MethodBody, method.id, index);
        for param in &method.params {
            self.type_ref(&param.ty);
            if let Some(sym) = &param.name.sym {
                let sym = SymbolHandle::clone(sym);
                self.declare(&sym, param.id);
                self.record_use(&sym, param.name.id, None, Access::Write);
            }
        }
        self.block_stmts(&method.body);
        self.cursor.pop();
        self.close();
    }

    fn annotation(&mut self, ann: &Annotation) {
        match &ann.resolved {
            Some(sym) if sym.kind == SymbolKind::Type => {
                self.index.type_uses.push(TypeUse { fqn: sym.fqn(), node: ann.id });
            }
            Some(sym) if sym.kind == SymbolKind::StaticMember => {
                self.index.static_uses.push(StaticUse {
                    owner: sym.owner.clone().unwrap_or_default(),
                    name: sym.name.clone(),
                    node: ann.id,
                });
            }
            Some(_) => {}
            None => self.index.unresolved.push(ann.name.name.clone()),
        }
        if let Some(args) = &ann.args {
            self.cursor.push(StepKind::AnnotationArgs, ann.id, 0);
            for arg in &args.args {
                self.expr(&arg.value, None);
            }
            self.cursor.pop();
        }
    }

    fn block_stmts(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Local(s) => {
                self.type_ref(&s.ty);
                if let Some(init) = &s.init {
                    self.expr(&init.value, None);
                }
                if let Some(sym) = &s.name.sym {
                    let sym = SymbolHandle::clone(sym);
                    self.declare(&sym, s.id);
                    if s.init.is_some() {
                        self.record_use(&sym, s.name.id, None, Access::Write);
                    }
                }
            }
            Stmt::Assign(s) => {
                // The value is evaluated before the store, so its reads come
                // first in program order.
                self.expr(&s.value, None);
                let access = if s.op.is_compound() { Access::ReadWrite } else { Access::Write };
                match &s.target {
                    Expr::Name(n) => self.record_name(n, Some(s.id), access),
                    Expr::Field(f) => {
                        self.expr(&f.target, None);
                        if let Some(sym) = &f.name.sym {
                            let sym = SymbolHandle::clone(sym);
                            self.record_use(&sym, f.name.id, Some(s.id), access);
                        }
                    }
                    other => self.expr(other, None),
                }
            }
            Stmt::Expr(s) => self.expr(&s.expr, None),
            Stmt::If(s) => {
                self.expr(&s.cond, None);
                self.cursor.push(StepKind::ThenArm, s.id, 0);
                self.stmt(&s.then_branch);
                self.cursor.pop();
                if let Some(els) = &s.else_branch {
                    self.cursor.push(StepKind::ElseArm, s.id, 1);
                    self.stmt(&els.body);
                    self.cursor.pop();
                }
            }
            Stmt::While(s) => {
                self.expr(&s.cond, None);
                self.cursor.push(StepKind::LoopBody, s.id, 0);
                self.stmt(&s.body);
                self.cursor.pop();
            }
            Stmt::ForEach(s) => {
                self.type_ref(&s.ty);
                self.expr(&s.iterable, None);
                self.open(ScopeKind::Block, s.id, None);
                if let Some(sym) = &s.name.sym {
                    let sym = SymbolHandle::clone(sym);
                    self.declare(&sym, s.id);
                    self.record_use(&sym, s.name.id, None, Access::Write);
                }
                self.cursor.push(StepKind::LoopBody, s.id, 0);
                self.stmt(&s.body);
                self.cursor.pop();
                self.close();
            }
            Stmt::Return(s) => {
                if let Some(value) = &s.value {
                    self.expr(value, None);
                }
            }
            Stmt::Block(s) => {
                self.open(ScopeKind::Block, s.id, None);
                self.block_stmts(s);
                self.close();
            }
            Stmt::Empty(_) => {}
        }
    }

    fn expr(&mut self, expr: &Expr, stmt: Option<NodeId>) {
        match expr {
            Expr::Lit(_) => {}
            Expr::Name(n) => self.record_name(n, stmt, Access::Read),
            Expr::Field(f) => {
                self.expr(&f.target, None);
                if let Some(sym) = &f.name.sym {
                    let sym = SymbolHandle::clone(sym);
                    self.record_use(&sym, f.name.id, None, Access::Read);
                }
            }
            Expr::Call(c) => {
                match &c.receiver {
                    Some(recv) => self.expr(&recv.expr, None),
                    None => self.record_name(&c.name, None, Access::Read),
                }
                self.cursor.push(StepKind::Args, c.id, 0);
                for arg in &c.args {
                    self.expr(arg, None);
                }
                self.cursor.pop();
            }
            Expr::New(n) => {
                self.type_ref(&n.ty);
                self.cursor.push(StepKind::Args, n.id, 0);
                for arg in &n.args {
                    self.expr(arg, None);
                }
                self.cursor.pop();
                if let Some(body) = &n.body {
                    self.class_body(body, None, StepKind::AnonClassBody);
                }
            }
            Expr::Binary(b) => {
                self.expr(&b.lhs, None);
                self.expr(&b.rhs, None);
            }
            Expr::Unary(u) => self.expr(&u.expr, None),
            Expr::Paren(p) => self.expr(&p.expr, None),
            Expr::Lambda(l) => {
                self.open(ScopeKind::Lambda, l.id, None);
                self.cursor.push(StepKind::LambdaBody, l.id, 0);
                if let Some(sym) = &l.param.sym {
                    let sym = SymbolHandle::clone(sym);
                    self.declare(&sym, l.id);
                    self.record_use(&sym, l.param.id, None, Access::Write);
                }
                match &l.body {
                    LambdaBody::Expr(e) => self.expr(e, None),
                    LambdaBody::Block(b) => {
                        self.open(ScopeKind::Block, b.id, None);
                        self.block_stmts(b);
                        self.close();
                    }
                }
                self.cursor.pop();
                self.close();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::resolve::TypeTable;

    fn indexed(src: &str, table: &TypeTable) -> (SourceFile, ScopeIndex) {
        let file = parser::parse_with(src, table).unwrap();
        let index = ScopeIndex::build(&file);
        (file, index)
    }

    fn entry_for<'a>(index: &'a ScopeIndex, name: &str) -> &'a SymbolEntry {
        index
            .entries()
            .iter()
            .find(|e| e.handle.name == name)
            .unwrap_or_else(|| panic!("no entry for {name}"))
    }

    #[test]
    fn test_declarations_in_order_and_uses_in_program_order() {
        let src = "class A {\n    void f(int p) {\n        int a = p;\n        int b = 0;\n        b = a;\n        use(b);\n    }\n}\n";
        let (_, index) = indexed(src, &TypeTable::new());
        let b = entry_for(&index, "b");
        let accesses: Vec<Access> = b.uses.iter().map(|u| u.access).collect();
        assert_eq!(accesses, [Access::Write, Access::Write, Access::Read]);
        // Declaration-baked writes carry no removable statement; the bare
        // reassignment does.
        assert!(b.uses[0].stmt.is_none());
        assert!(b.uses[1].stmt.is_some());

        let method_scope = index
            .scopes()
            .iter()
            .find(|s| s.kind == ScopeKind::Method)
            .unwrap();
        let names: Vec<&str> = method_scope
            .decls
            .iter()
            .map(|id| index.entry(*id).unwrap().handle.name.as_str())
            .collect();
        assert_eq!(names, ["p", "a", "b"]);
    }

    #[test]
    fn test_branch_and_loop_context_recorded() {
        let src = "class A {\n    void f(boolean c) {\n        int x = 0;\n        if (c) {\n            x = 1;\n        } else {\n            x = 2;\n        }\n        while (c) {\n            x = 3;\n        }\n    }\n}\n";
        let (_, index) = indexed(src, &TypeTable::new());
        let x = entry_for(&index, "x");
        let rel: Vec<Vec<CtxKind>> = x
            .uses
            .iter()
            .map(|u| u.ctx[x.decl_ctx_len..].iter().map(|s| s.kind).collect())
            .collect();
        assert_eq!(rel[0], Vec::<CtxKind>::new());
        assert_eq!(rel[1], vec![CtxKind::ThenArm]);
        assert_eq!(rel[2], vec![CtxKind::ElseArm]);
        assert_eq!(rel[3], vec![CtxKind::LoopBody]);
    }

    #[test]
    fn test_shadowed_variables_are_independent_symbols() {
        let src = "class A {\n    void f() {\n        int a = 1;\n        {\n            int a = 2;\n            a = 3;\n        }\n        a = 4;\n    }\n}\n";
        let (_, index) = indexed(src, &TypeTable::new());
        let entries: Vec<&SymbolEntry> =
            index.entries().iter().filter(|e| e.handle.name == "a").collect();
        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].handle.id, entries[1].handle.id);
        // Outer symbol: declaration write plus the trailing reassignment.
        assert_eq!(entries[0].uses.len(), 2);
        // Inner symbol: declaration write plus one reassignment.
        assert_eq!(entries[1].uses.len(), 2);
    }

    #[test]
    fn test_capture_inside_anonymous_class_is_flagged() {
        let src = "class A {\n    Object f() {\n        int a = 1;\n        return new Runnable() {\n            void run() {\n                use(a);\n            }\n        };\n    }\n}\n";
        let (_, index) = indexed(src, &TypeTable::new());
        let a = entry_for(&index, "a");
        let read = a.uses.iter().find(|u| u.access == Access::Read).unwrap();
        assert!(read.ctx[a.decl_ctx_len..].iter().any(|s| s.kind == CtxKind::NestedDecl));
    }

    #[test]
    fn test_type_uses_in_first_reference_order_and_unresolved_names() {
        let table = TypeTable::new().with_package("java.util", &["List", "Set", "Map"]);
        let src = "import java.util.*;\nclass A {\n    Set<Integer> s;\n    List<Integer> l;\n    Mystery m;\n}\n";
        let (_, index) = indexed(src, &table);
        let fqns: Vec<&str> = index.type_uses.iter().map(|u| u.fqn.as_str()).collect();
        assert_eq!(fqns[0], "java.util.Set");
        assert!(fqns.contains(&"java.util.List"));
        assert_eq!(index.unresolved, vec!["Mystery".to_string()]);
    }

    #[test]
    fn test_qualified_static_access_counts_type_not_member() {
        let table = TypeTable::new()
            .with_package("java.sql", &["ResultSet"])
            .with_statics("java.sql.ResultSet", &["TYPE_FORWARD_ONLY"]);
        let src = "import java.sql.ResultSet;\nclass A {\n    int t = ResultSet.TYPE_FORWARD_ONLY;\n}\n";
        let (_, index) = indexed(src, &table);
        assert!(index.type_uses.iter().any(|u| u.fqn == "java.sql.ResultSet"));
        assert!(index.static_uses.is_empty());
    }
}
