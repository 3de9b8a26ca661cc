//! Symbol resolution.
//!
//! Binds identifiers and type references to shared [`SymbolHandle`]s using
//! the file's imports, its own declarations, and a caller-supplied
//! [`TypeTable`] describing what the classpath would know. Resolution is a
//! separate pass over a freshly parsed tree; everything downstream (index,
//! recipes) only compares the handles it leaves behind and never re-derives
//! binding. A name the table cannot account for simply stays unannotated,
//! and the analyses treat it conservatively.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::tree::*;

/// Catalog of types per package and static members per type, standing in for
/// classpath knowledge. Always includes a small `java.lang` slice so common
/// code resolves without setup.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    packages: FxHashMap<String, Vec<String>>,
    statics: FxHashMap<String, Vec<String>>,
}

const JAVA_LANG: &[&str] = &[
    "String", "Object", "System", "Integer", "Boolean", "Long", "Double", "Math",
    "Runnable", "Exception", "RuntimeException", "Override",
];

impl TypeTable {
    pub fn new() -> Self {
        TypeTable::default()
    }

    pub fn with_package(mut self, package: &str, types: &[&str]) -> Self {
        let entry = self.packages.entry(package.to_string()).or_default();
        entry.extend(types.iter().map(|t| (*t).to_string()));
        self
    }

    pub fn with_statics(mut self, owner_fqn: &str, members: &[&str]) -> Self {
        let entry = self.statics.entry(owner_fqn.to_string()).or_default();
        entry.extend(members.iter().map(|m| (*m).to_string()));
        self
    }

    fn package_has(&self, package: &str, name: &str) -> bool {
        if package == "java.lang" && JAVA_LANG.contains(&name) {
            return true;
        }
        self.packages.get(package).is_some_and(|types| types.iter().any(|t| t == name))
    }

    fn owner_has_static(&self, owner: &str, member: &str) -> bool {
        self.statics.get(owner).is_some_and(|members| members.iter().any(|m| m == member))
    }
}

/// Annotate the tree in place. Safe to run again after a splice; handles are
/// rebuilt from scratch each time.
pub fn resolve(file: &mut SourceFile, table: &TypeTable) {
    let mut r = Resolver {
        table,
        named_types: FxHashMap::default(),
        star_packages: Vec::new(),
        static_named: FxHashMap::default(),
        static_star_owners: Vec::new(),
        scopes: Vec::new(),
        class_scopes: Vec::new(),
        type_cache: FxHashMap::default(),
        static_cache: FxHashMap::default(),
    };

    let package = file.package.as_ref().map(|p| p.name.text());

    for import in &file.imports {
        let target = import.target();
        match (import.is_static(), import.is_star()) {
            (false, false) => {
                let simple = import.path.simple_name().to_string();
                r.named_types.insert(simple, target);
            }
            (false, true) => r.star_packages.push(target),
            (true, false) => {
                if let Some(owner) = import.path.qualifier() {
                    r.static_named.insert(import.path.simple_name().to_string(), owner);
                }
            }
            (true, true) => r.static_star_owners.push(target),
        }
    }

    // The file's own top-level classes resolve by simple name.
    for class in &file.types {
        let fqn = match &package {
            Some(pkg) => format!("{}.{}", pkg, class.name.name),
            None => class.name.name.clone(),
        };
        r.named_types.insert(class.name.name.clone(), fqn);
    }

    for class in &mut file.types {
        r.class(class);
    }
}

struct Resolver<'t> {
    table: &'t TypeTable,
    named_types: FxHashMap<String, String>,
    star_packages: Vec<String>,
    static_named: FxHashMap<String, String>,
    static_star_owners: Vec<String>,
    /// Lexical value scopes, innermost last.
    scopes: Vec<FxHashMap<String, SymbolHandle>>,
    /// Indices into `scopes` that belong to class bodies; `this.x` searches
    /// only these.
    class_scopes: Vec<usize>,
    type_cache: FxHashMap<String, SymbolHandle>,
    static_cache: FxHashMap<(String, String), SymbolHandle>,
}

impl Resolver<'_> {
    // -- handle construction ------------------------------------------------

    fn type_handle(&mut self, package: Option<&str>, simple: &str) -> SymbolHandle {
        let fqn = match package {
            Some(pkg) => format!("{}.{}", pkg, simple),
            None => simple.to_string(),
        };
        Arc::clone(self.type_cache.entry(fqn).or_insert_with_key(|fqn| {
            let (owner, name) = match fqn.rsplit_once('.') {
                Some((owner, name)) => (Some(owner.to_string()), name.to_string()),
                None => (None, fqn.clone()),
            };
            Arc::new(Symbol { id: SymbolId::fresh(), name, kind: SymbolKind::Type, owner, ty: None })
        }))
    }

    fn static_handle(&mut self, owner: &str, member: &str) -> SymbolHandle {
        let key = (owner.to_string(), member.to_string());
        Arc::clone(self.static_cache.entry(key).or_insert_with(|| {
            Arc::new(Symbol {
                id: SymbolId::fresh(),
                name: member.to_string(),
                kind: SymbolKind::StaticMember,
                owner: Some(owner.to_string()),
                ty: None,
            })
        }))
    }

    fn declare(&mut self, name: &str, kind: SymbolKind, ty: Option<String>) -> SymbolHandle {
        let handle = Arc::new(Symbol {
            id: SymbolId::fresh(),
            name: name.to_string(),
            kind,
            owner: None,
            ty,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), Arc::clone(&handle));
        }
        handle
    }

    fn lookup(&self, name: &str) -> Option<SymbolHandle> {
        self.scopes.iter().rev().find_map(|s| s.get(name).cloned())
    }

    fn lookup_field(&self, name: &str) -> Option<SymbolHandle> {
        self.class_scopes
            .iter()
            .rev()
            .find_map(|&depth| self.scopes.get(depth).and_then(|s| s.get(name).cloned()))
    }

    /// Resolve a simple type name through imports, the table, and static
    /// imports (which can expose nested types). `None` means unprovable.
    fn resolve_simple_type(&mut self, simple: &str) -> Option<SymbolHandle> {
        if let Some(fqn) = self.named_types.get(simple).cloned() {
            let (pkg, name) = split_fqn(&fqn);
            return Some(self.type_handle(pkg.as_deref(), &name));
        }
        let star = self.star_packages.iter().find(|pkg| self.table.package_has(pkg, simple)).cloned();
        if let Some(pkg) = star {
            return Some(self.type_handle(Some(&pkg), simple));
        }
        if self.table.package_has("java.lang", simple) {
            return Some(self.type_handle(Some("java.lang"), simple));
        }
        if let Some(owner) = self.static_named.get(simple).cloned() {
            return Some(self.static_handle(&owner, simple));
        }
        let owner = self
            .static_star_owners
            .iter()
            .find(|owner| self.table.owner_has_static(owner, simple))
            .cloned();
        if let Some(owner) = owner {
            return Some(self.static_handle(&owner, simple));
        }
        None
    }

    // -- declarations -------------------------------------------------------

    fn type_ref(&mut self, ty: &mut TypeRef) {
        if let Some(args) = &mut ty.args {
            for arg in &mut args.args {
                self.type_ref(arg);
            }
        }
        if ty.is_primitive() {
            return;
        }
        if ty.name.is_qualified() {
            // A fully qualified reference needs no import to be legal.
            let text = ty.name.text();
            let (pkg, name) = split_fqn(&text);
            ty.resolved = Some(self.type_handle(pkg.as_deref(), &name));
        } else {
            ty.resolved = self.resolve_simple_type(&ty.name.head.name.clone());
        }
    }

    fn class(&mut self, class: &mut ClassDecl) {
        for ann in &mut class.annotations {
            self.annotation(ann);
        }
        if let Some(ext) = &mut class.extends {
            self.type_ref(&mut ext.ty);
        }
        if let Some(imp) = &mut class.implements {
            for ty in &mut imp.types {
                self.type_ref(ty);
            }
        }
        self.class_body(&mut class.body);
    }

    fn class_body(&mut self, body: &mut ClassBody) {
        self.scopes.push(FxHashMap::default());
        self.class_scopes.push(self.scopes.len() - 1);

        // Fields and methods are visible to every member regardless of
        // declaration order.
        for member in &body.members {
            match member {
                Member::Field(f) => {
                    let ty = Some(f.ty.canonical_text());
                    self.declare(&f.name.name, SymbolKind::Field, ty);
                }
                Member::Method(m) => {
                    self.declare(&m.name.name, SymbolKind::Method, None);
                }
                Member::Class(_) => {}
            }
        }

        for member in &mut body.members {
            match member {
                Member::Field(f) => {
                    self.type_ref(&mut f.ty);
                    f.name.sym = self.lookup(&f.name.name);
                    if let Some(init) = &mut f.init {
                        self.expr(&mut init.value);
                    }
                }
                Member::Method(m) => self.method(m),
                Member::Class(c) => self.class(c),
            }
        }

        self.class_scopes.pop();
        self.scopes.pop();
    }

    fn method(&mut self, method: &mut MethodDecl) {
        for ann in &mut method.annotations {
            self.annotation(ann);
        }
        self.type_ref(&mut method.ret);
        self.scopes.push(FxHashMap::default());
        for param in &mut method.params {
            self.type_ref(&mut param.ty);
            let ty = Some(param.ty.canonical_text());
            param.name.sym = Some(self.declare(&param.name.name, SymbolKind::Param, ty));
        }
        self.block(&mut method.body);
        self.scopes.pop();
    }

    fn annotation(&mut self, ann: &mut Annotation) {
        ann.resolved = self.resolve_simple_type(&ann.name.name.clone());
        if let Some(args) = &mut ann.args {
            for arg in &mut args.args {
                self.expr(&mut arg.value);
            }
        }
    }

    // -- statements ---------------------------------------------------------

    fn block(&mut self, block: &mut Block) {
        self.scopes.push(FxHashMap::default());
        for stmt in &mut block.stmts {
            self.stmt(stmt);
        }
        self.scopes.pop();
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Local(s) => {
                self.type_ref(&mut s.ty);
                // The initializer cannot see the variable it initializes.
                if let Some(init) = &mut s.init {
                    self.expr(&mut init.value);
                }
                let ty = Some(s.ty.canonical_text());
                s.name.sym = Some(self.declare(&s.name.name, SymbolKind::Local, ty));
            }
            Stmt::Assign(s) => {
                self.expr(&mut s.target);
                self.expr(&mut s.value);
            }
            Stmt::Expr(s) => self.expr(&mut s.expr),
            Stmt::If(s) => {
                self.expr(&mut s.cond);
                self.stmt(&mut s.then_branch);
                if let Some(els) = &mut s.else_branch {
                    self.stmt(&mut els.body);
                }
            }
            Stmt::While(s) => {
                self.expr(&mut s.cond);
                self.stmt(&mut s.body);
            }
            Stmt::ForEach(s) => {
                self.type_ref(&mut s.ty);
                self.expr(&mut s.iterable);
                self.scopes.push(FxHashMap::default());
                let ty = Some(s.ty.canonical_text());
                s.name.sym = Some(self.declare(&s.name.name, SymbolKind::Local, ty));
                self.stmt(&mut s.body);
                self.scopes.pop();
            }
            Stmt::Return(s) => {
                if let Some(value) = &mut s.value {
                    self.expr(value);
                }
            }
            Stmt::Block(s) => self.block(s),
            Stmt::Empty(_) => {}
        }
    }

    // -- expressions --------------------------------------------------------

    fn expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Lit(_) => {}
            Expr::Name(n) => {
                if n.name == "this" {
                    return;
                }
                let name = n.name.clone();
                n.sym = self.lookup(&name).or_else(|| self.resolve_simple_type(&name));
            }
            Expr::Field(f) => {
                self.expr(&mut f.target);
                // `this.x` binds to the enclosing class's field; members of
                // arbitrary receivers are outside what resolution promises.
                if matches!(&*f.target, Expr::Name(n) if n.name == "this") {
                    f.name.sym = self.lookup_field(&f.name.name);
                }
            }
            Expr::Call(c) => {
                if let Some(recv) = &mut c.receiver {
                    self.expr(&mut recv.expr);
                } else {
                    let name = c.name.name.clone();
                    c.name.sym = self.lookup(&name).or_else(|| self.resolve_simple_type(&name));
                }
                for arg in &mut c.args {
                    self.expr(arg);
                }
            }
            Expr::New(n) => {
                self.type_ref(&mut n.ty);
                for arg in &mut n.args {
                    self.expr(arg);
                }
                if let Some(body) = &mut n.body {
                    self.class_body(body);
                }
            }
            Expr::Binary(b) => {
                self.expr(&mut b.lhs);
                self.expr(&mut b.rhs);
            }
            Expr::Unary(u) => self.expr(&mut u.expr),
            Expr::Paren(p) => self.expr(&mut p.expr),
            Expr::Lambda(l) => {
                self.scopes.push(FxHashMap::default());
                l.param.sym = Some(self.declare(&l.param.name.clone(), SymbolKind::Param, None));
                match &mut l.body {
                    LambdaBody::Expr(e) => self.expr(e),
                    LambdaBody::Block(b) => self.block(b),
                }
                self.scopes.pop();
            }
        }
    }
}

fn split_fqn(fqn: &str) -> (Option<String>, String) {
    match fqn.rsplit_once('.') {
        Some((pkg, name)) => (Some(pkg.to_string()), name.to_string()),
        None => (None, fqn.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn util_table() -> TypeTable {
        TypeTable::new()
            .with_package("java.util", &["List", "ArrayList", "Collection", "Set", "HashSet", "Collections"])
            .with_statics("java.util.Collections", &["emptyList", "emptySet", "sort"])
    }

    #[test]
    fn test_named_import_binds_simple_type() {
        let src = "import java.util.List;\nclass A {\n    List<Integer> items;\n}\n";
        let file = parser::parse_with(src, &util_table()).unwrap();
        let Member::Field(field) = &file.types[0].body.members[0] else { panic!() };
        let sym = field.ty.resolved.as_ref().unwrap();
        assert_eq!(sym.kind, SymbolKind::Type);
        assert_eq!(sym.fqn(), "java.util.List");
    }

    #[test]
    fn test_star_import_consults_table() {
        let src = "import java.util.*;\nclass A {\n    Collection<Integer> c;\n    Missing m;\n}\n";
        let file = parser::parse_with(src, &util_table()).unwrap();
        let Member::Field(c) = &file.types[0].body.members[0] else { panic!() };
        assert_eq!(c.ty.resolved.as_ref().unwrap().fqn(), "java.util.Collection");
        let Member::Field(m) = &file.types[0].body.members[1] else { panic!() };
        assert!(m.ty.resolved.is_none(), "unknown type must stay unresolved");
    }

    #[test]
    fn test_locals_shadow_fields_but_this_reaches_the_field() {
        let src = "class A {\n    int a;\n    void f() {\n        int a = 0;\n        a = 1;\n        this.a = 2;\n    }\n}\n";
        let file = parser::parse_with(src, &TypeTable::new()).unwrap();
        let Member::Method(method) = &file.types[0].body.members[1] else { panic!() };
        let Stmt::Local(local) = &method.body.stmts[0] else { panic!() };
        let local_sym = local.name.sym.as_ref().unwrap();
        assert_eq!(local_sym.kind, SymbolKind::Local);

        let Stmt::Assign(bare) = &method.body.stmts[1] else { panic!() };
        let Expr::Name(target) = &bare.target else { panic!() };
        assert_eq!(target.sym.as_ref().unwrap().id, local_sym.id);

        let Stmt::Assign(qualified) = &method.body.stmts[2] else { panic!() };
        let Expr::Field(access) = &qualified.target else { panic!() };
        assert_eq!(access.name.sym.as_ref().unwrap().kind, SymbolKind::Field);
    }

    #[test]
    fn test_static_star_import_binds_unqualified_member() {
        let src = "import static java.util.Collections.*;\nclass A {\n    Object o = emptyList();\n}\n";
        let file = parser::parse_with(src, &util_table()).unwrap();
        let Member::Field(field) = &file.types[0].body.members[0] else { panic!() };
        let Some(Initializer { value: Expr::Call(call), .. }) = &field.init else { panic!() };
        let sym = call.name.sym.as_ref().unwrap();
        assert_eq!(sym.kind, SymbolKind::StaticMember);
        assert_eq!(sym.fqn(), "java.util.Collections.emptyList");
    }

    #[test]
    fn test_shared_handles_have_one_identity() {
        let src = "import java.util.List;\nclass A {\n    List<Integer> a;\n    List<String> b;\n}\n";
        let file = parser::parse_with(src, &util_table()).unwrap();
        let Member::Field(a) = &file.types[0].body.members[0] else { panic!() };
        let Member::Field(b) = &file.types[0].body.members[1] else { panic!() };
        assert_eq!(
            a.ty.resolved.as_ref().unwrap().id,
            b.ty.resolved.as_ref().unwrap().id,
        );
    }
}
