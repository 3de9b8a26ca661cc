//! Re-renders a tree back to source text.
//!
//! Printing is lossless: every token is emitted behind the exact trivia the
//! parser captured for it, so a subtree nobody replaced prints back
//! byte-for-byte. A second mode drops trivia and joins tokens with single
//! spaces; that token stream is what structural comparison looks at.

use crate::tree::*;

/// Render a compilation unit exactly, preserving all captured formatting.
pub fn print(file: &SourceFile) -> String {
    let mut p = Printer { out: String::new(), tokens_only: false };
    p.file(file);
    p.out
}

/// Render the bare token stream, one space between tokens, all trivia
/// dropped. Formatting-insensitive by construction.
pub fn print_tokens(file: &SourceFile) -> String {
    let mut p = Printer { out: String::new(), tokens_only: true };
    p.file(file);
    p.out
}

struct Printer {
    out: String,
    tokens_only: bool,
}

impl Printer {
    fn tok(&mut self, space: &Space, text: &str) {
        if self.tokens_only {
            if !self.out.is_empty() {
                self.out.push(' ');
            }
        } else {
            self.out.push_str(space.as_str());
        }
        self.out.push_str(text);
    }

    fn trivia(&mut self, space: &Space) {
        if !self.tokens_only {
            self.out.push_str(space.as_str());
        }
    }

    fn file(&mut self, file: &SourceFile) {
        if let Some(pkg) = &file.package {
            self.tok(&pkg.prefix, "package");
            self.qname(&pkg.name);
            self.tok(&pkg.semi, ";");
        }
        for import in &file.imports {
            self.import(import);
        }
        for ty in &file.types {
            self.class(ty);
        }
        self.trivia(&file.eof);
    }

    fn import(&mut self, import: &Import) {
        self.tok(&import.prefix, "import");
        if let Some(kw) = &import.static_kw {
            self.tok(kw, "static");
        }
        self.qname(&import.path);
        if let Some((dot, star)) = &import.star {
            self.tok(dot, ".");
            self.tok(star, "*");
        }
        self.tok(&import.semi, ";");
    }

    fn qname(&mut self, name: &QualifiedName) {
        self.ident(&name.head);
        for seg in &name.tail {
            self.tok(&seg.dot, ".");
            self.ident(&seg.name);
        }
    }

    fn ident(&mut self, ident: &Ident) {
        self.tok(&ident.prefix, &ident.name);
    }

    fn class(&mut self, class: &ClassDecl) {
        for ann in &class.annotations {
            self.annotation(ann);
        }
        for m in &class.modifiers {
            self.tok(&m.prefix, m.kind.as_str());
        }
        self.tok(&class.class_kw, "class");
        self.ident(&class.name);
        if let Some(ext) = &class.extends {
            self.tok(&ext.kw, "extends");
            self.type_ref(&ext.ty);
        }
        if let Some(imp) = &class.implements {
            self.tok(&imp.kw, "implements");
            for (i, ty) in imp.types.iter().enumerate() {
                if i > 0 {
                    self.tok(&imp.commas[i - 1], ",");
                }
                self.type_ref(ty);
            }
        }
        self.class_body(&class.body);
    }

    fn class_body(&mut self, body: &ClassBody) {
        self.tok(&body.lbrace, "{");
        for member in &body.members {
            self.member(member);
        }
        self.tok(&body.rbrace, "}");
    }

    fn member(&mut self, member: &Member) {
        match member {
            Member::Field(f) => self.field(f),
            Member::Method(m) => self.method(m),
            Member::Class(c) => self.class(c),
        }
    }

    fn field(&mut self, field: &FieldDecl) {
        for m in &field.modifiers {
            self.tok(&m.prefix, m.kind.as_str());
        }
        self.type_ref(&field.ty);
        self.ident(&field.name);
        if let Some(init) = &field.init {
            self.tok(&init.eq, "=");
            self.expr(&init.value);
        }
        self.tok(&field.semi, ";");
    }

    fn method(&mut self, method: &MethodDecl) {
        for ann in &method.annotations {
            self.annotation(ann);
        }
        for m in &method.modifiers {
            self.tok(&m.prefix, m.kind.as_str());
        }
        self.type_ref(&method.ret);
        self.ident(&method.name);
        self.tok(&method.lparen, "(");
        for (i, param) in method.params.iter().enumerate() {
            if i > 0 {
                self.tok(&method.commas[i - 1], ",");
            }
            self.type_ref(&param.ty);
            self.ident(&param.name);
        }
        self.tok(&method.rparen, ")");
        self.block(&method.body);
    }

    fn annotation(&mut self, ann: &Annotation) {
        self.tok(&ann.at, "@");
        self.ident(&ann.name);
        if let Some(args) = &ann.args {
            self.tok(&args.lparen, "(");
            for (i, arg) in args.args.iter().enumerate() {
                if i > 0 {
                    self.tok(&args.commas[i - 1], ",");
                }
                if let Some((name, eq)) = &arg.name {
                    self.ident(name);
                    self.tok(eq, "=");
                }
                self.expr(&arg.value);
            }
            self.tok(&args.rparen, ")");
        }
    }

    fn type_ref(&mut self, ty: &TypeRef) {
        self.qname(&ty.name);
        if let Some(args) = &ty.args {
            self.tok(&args.lt, "<");
            for (i, a) in args.args.iter().enumerate() {
                if i > 0 {
                    self.tok(&args.commas[i - 1], ",");
                }
                self.type_ref(a);
            }
            self.tok(&args.gt, ">");
        }
    }

    fn block(&mut self, block: &Block) {
        self.tok(&block.lbrace, "{");
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
        self.tok(&block.rbrace, "}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Local(s) => {
                self.type_ref(&s.ty);
                self.ident(&s.name);
                if let Some(init) = &s.init {
                    self.tok(&init.eq, "=");
                    self.expr(&init.value);
                }
                self.tok(&s.semi, ";");
            }
            Stmt::Assign(s) => {
                self.expr(&s.target);
                self.tok(&s.op_space, s.op.token());
                self.expr(&s.value);
                self.tok(&s.semi, ";");
            }
            Stmt::Expr(s) => {
                self.expr(&s.expr);
                self.tok(&s.semi, ";");
            }
            Stmt::If(s) => {
                self.tok(&s.kw, "if");
                self.tok(&s.lparen, "(");
                self.expr(&s.cond);
                self.tok(&s.rparen, ")");
                self.stmt(&s.then_branch);
                if let Some(els) = &s.else_branch {
                    self.tok(&els.kw, "else");
                    self.stmt(&els.body);
                }
            }
            Stmt::While(s) => {
                self.tok(&s.kw, "while");
                self.tok(&s.lparen, "(");
                self.expr(&s.cond);
                self.tok(&s.rparen, ")");
                self.stmt(&s.body);
            }
            Stmt::ForEach(s) => {
                self.tok(&s.kw, "for");
                self.tok(&s.lparen, "(");
                self.type_ref(&s.ty);
                self.ident(&s.name);
                self.tok(&s.colon, ":");
                self.expr(&s.iterable);
                self.tok(&s.rparen, ")");
                self.stmt(&s.body);
            }
            Stmt::Return(s) => {
                self.tok(&s.kw, "return");
                if let Some(value) = &s.value {
                    self.expr(value);
                }
                self.tok(&s.semi, ";");
            }
            Stmt::Block(s) => self.block(s),
            Stmt::Empty(s) => self.tok(&s.semi, ";"),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Lit(e) => self.tok(&e.prefix, &e.text),
            Expr::Name(e) => self.ident(e),
            Expr::Field(e) => {
                self.expr(&e.target);
                self.tok(&e.dot, ".");
                self.ident(&e.name);
            }
            Expr::Call(e) => {
                if let Some(recv) = &e.receiver {
                    self.expr(&recv.expr);
                    self.tok(&recv.dot, ".");
                }
                self.ident(&e.name);
                self.tok(&e.lparen, "(");
                for (i, arg) in e.args.iter().enumerate() {
                    if i > 0 {
                        self.tok(&e.commas[i - 1], ",");
                    }
                    self.expr(arg);
                }
                self.tok(&e.rparen, ")");
            }
            Expr::New(e) => {
                self.tok(&e.kw, "new");
                self.type_ref(&e.ty);
                self.tok(&e.lparen, "(");
                for (i, arg) in e.args.iter().enumerate() {
                    if i > 0 {
                        self.tok(&e.commas[i - 1], ",");
                    }
                    self.expr(arg);
                }
                self.tok(&e.rparen, ")");
                if let Some(body) = &e.body {
                    self.class_body(body);
                }
            }
            Expr::Binary(e) => {
                self.expr(&e.lhs);
                self.tok(&e.op_space, e.op.token());
                self.expr(&e.rhs);
            }
            Expr::Unary(e) => {
                self.tok(&e.prefix, e.op.token());
                self.expr(&e.expr);
            }
            Expr::Paren(e) => {
                self.tok(&e.lparen, "(");
                self.expr(&e.expr);
                self.tok(&e.rparen, ")");
            }
            Expr::Lambda(e) => {
                self.ident(&e.param);
                self.tok(&e.arrow, "->");
                match &e.body {
                    LambdaBody::Expr(b) => self.expr(b),
                    LambdaBody::Block(b) => self.block(b),
                }
            }
        }
    }
}
