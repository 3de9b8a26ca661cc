//! Reference parser for the supported Java subset.
//!
//! The lexer attaches to every token the raw run of whitespace and comments
//! preceding it; the parser moves that run onto the owning node as its
//! [`Space`]. Nothing is normalized, so `print(parse(text)) == text` holds
//! for any input this grammar accepts.

use thiserror::Error;

use crate::resolve::{self, TypeTable};
use crate::tree::*;

#[derive(Debug, Clone, Error)]
#[error("parse error at {line}:{col}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

/// Parse a compilation unit without symbol resolution.
pub fn parse(text: &str) -> Result<SourceFile, ParseError> {
    let tokens = lex(text)?;
    Parser { tokens, pos: 0 }.file()
}

/// Parse and resolve against the given type catalog. This is the entry the
/// engine uses; `dependencies` a caller would hand a real compiler are
/// condensed into the [`TypeTable`].
pub fn parse_with(text: &str, table: &TypeTable) -> Result<SourceFile, ParseError> {
    let mut file = parse(text)?;
    resolve::resolve(&mut file, table);
    Ok(file)
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokKind {
    Ident,
    Int,
    Str,
    Char,
    Punct,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    leading: String,
    kind: TokKind,
    text: String,
    line: usize,
    col: usize,
}

const KEYWORDS: &[&str] = &[
    "package", "import", "class", "extends", "implements", "static", "public", "private",
    "protected", "final", "abstract", "new", "if", "else", "while", "for", "return",
];

fn lex(src: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut col = 0;

    while i <= bytes.len() {
        // Capture the contiguous trivia run verbatim.
        let trivia_start = i;
        loop {
            if i >= bytes.len() {
                break;
            }
            let c = bytes[i] as char;
            if c.is_ascii_whitespace() {
                if c == '\n' {
                    line += 1;
                    col = 0;
                } else {
                    col += 1;
                }
                i += 1;
            } else if c == '/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                    col += 1;
                }
            } else if c == '/' && i + 1 < bytes.len() && bytes[i + 1] == b'*' {
                let open_line = line;
                let open_col = col;
                i += 2;
                col += 2;
                loop {
                    if i + 1 >= bytes.len() {
                        return Err(ParseError {
                            line: open_line,
                            col: open_col,
                            message: "unterminated block comment".into(),
                        });
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        i += 2;
                        col += 2;
                        break;
                    }
                    if bytes[i] == b'\n' {
                        line += 1;
                        col = 0;
                    } else {
                        col += 1;
                    }
                    i += 1;
                }
            } else {
                break;
            }
        }
        let leading = src[trivia_start..i].to_string();

        if i >= bytes.len() {
            tokens.push(Token { leading, kind: TokKind::Eof, text: String::new(), line, col });
            break;
        }

        let start = i;
        let start_line = line;
        let start_col = col;
        let c = bytes[i] as char;

        let kind = if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            while i < bytes.len() {
                let c = bytes[i] as char;
                if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                    i += 1;
                    col += 1;
                } else {
                    break;
                }
            }
            TokKind::Ident
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                i += 1;
                col += 1;
            }
            TokKind::Int
        } else if c == '"' || c == '\'' {
            let quote = c;
            i += 1;
            col += 1;
            loop {
                if i >= bytes.len() || bytes[i] == b'\n' {
                    return Err(ParseError {
                        line: start_line,
                        col: start_col,
                        message: "unterminated literal".into(),
                    });
                }
                let b = bytes[i] as char;
                i += 1;
                col += 1;
                if b == '\\' && i < bytes.len() {
                    i += 1;
                    col += 1;
                } else if b == quote {
                    break;
                }
            }
            if quote == '"' { TokKind::Str } else { TokKind::Char }
        } else {
            // Longest-match punctuation.
            let two = if i + 1 < bytes.len() { &src[i..i + 2] } else { "" };
            let len = match two {
                "==" | "!=" | "<=" | ">=" | "&&" | "||" | "+=" | "-=" | "*=" | "/=" | "->" => 2,
                _ => match c {
                    '(' | ')' | '{' | '}' | '<' | '>' | '.' | ',' | ';' | ':' | '=' | '+'
                    | '-' | '*' | '/' | '%' | '!' | '@' => 1,
                    _ => {
                        return Err(ParseError {
                            line: start_line,
                            col: start_col,
                            message: format!("unexpected character '{c}'"),
                        })
                    }
                },
            };
            i += len;
            col += len;
            TokKind::Punct
        };

        tokens.push(Token {
            leading,
            kind,
            text: src[start..i].to_string(),
            line: start_line,
            col: start_col,
        });
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at_punct(&self, text: &str) -> bool {
        let t = self.peek();
        t.kind == TokKind::Punct && t.text == text
    }

    fn at_word(&self, word: &str) -> bool {
        let t = self.peek();
        t.kind == TokKind::Ident && t.text == word
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokKind::Eof
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let t = self.peek();
        ParseError { line: t.line, col: t.col, message: message.into() }
    }

    fn expect_punct(&mut self, text: &str) -> Result<Space, ParseError> {
        if self.at_punct(text) {
            Ok(Space(self.bump().leading))
        } else {
            Err(self.error(format!("expected '{}', found '{}'", text, self.peek().text)))
        }
    }

    fn eat_punct(&mut self, text: &str) -> Option<Space> {
        if self.at_punct(text) {
            Some(Space(self.bump().leading))
        } else {
            None
        }
    }

    fn eat_word(&mut self, word: &str) -> Option<Space> {
        if self.at_word(word) {
            Some(Space(self.bump().leading))
        } else {
            None
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<Space, ParseError> {
        self.eat_word(word)
            .ok_or_else(|| self.error(format!("expected '{}', found '{}'", word, self.peek().text)))
    }

    fn expect_name(&mut self) -> Result<Ident, ParseError> {
        let t = self.peek();
        if t.kind == TokKind::Ident && !KEYWORDS.contains(&t.text.as_str()) {
            let t = self.bump();
            Ok(Ident::new(Space(t.leading), t.text))
        } else {
            Err(self.error(format!("expected identifier, found '{}'", self.peek().text)))
        }
    }

    // -- compilation unit ---------------------------------------------------

    fn file(&mut self) -> Result<SourceFile, ParseError> {
        let package = if self.at_word("package") { Some(self.package()?) } else { None };

        let mut imports = Vec::new();
        while self.at_word("import") {
            imports.push(self.import()?);
        }

        let mut types = Vec::new();
        while !self.at_eof() {
            types.push(self.class_decl()?);
        }

        let eof = Space(self.peek().leading.clone());
        Ok(SourceFile { id: NodeId::fresh(), package, imports, types, eof })
    }

    fn package(&mut self) -> Result<PackageDecl, ParseError> {
        let prefix = self.expect_word("package")?;
        let name = self.qualified_name()?;
        let semi = self.expect_punct(";")?;
        Ok(PackageDecl { id: NodeId::fresh(), prefix, name, semi })
    }

    fn import(&mut self) -> Result<Import, ParseError> {
        let prefix = self.expect_word("import")?;
        let static_kw = self.eat_word("static");
        let head = self.expect_name()?;
        let mut tail = Vec::new();
        let mut star = None;
        while self.at_punct(".") {
            let dot = Space(self.bump().leading);
            if self.at_punct("*") {
                let star_space = Space(self.bump().leading);
                star = Some((dot, star_space));
                break;
            }
            tail.push(NameSegment { dot, name: self.expect_name()? });
        }
        let semi = self.expect_punct(";")?;
        Ok(Import {
            id: NodeId::fresh(),
            prefix,
            static_kw,
            path: QualifiedName { head, tail },
            star,
            semi,
        })
    }

    fn qualified_name(&mut self) -> Result<QualifiedName, ParseError> {
        let head = self.expect_name()?;
        let mut tail = Vec::new();
        while self.at_punct(".") && self.peek_ahead(1).kind == TokKind::Ident
            && !KEYWORDS.contains(&self.peek_ahead(1).text.as_str())
        {
            let dot = Space(self.bump().leading);
            tail.push(NameSegment { dot, name: self.expect_name()? });
        }
        Ok(QualifiedName { head, tail })
    }

    // -- declarations -------------------------------------------------------

    fn annotations(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut out = Vec::new();
        while self.at_punct("@") {
            let at = Space(self.bump().leading);
            let name = self.expect_name()?;
            let args = if self.at_punct("(") {
                let lparen = Space(self.bump().leading);
                let mut args = Vec::new();
                let mut commas = Vec::new();
                if !self.at_punct(")") {
                    loop {
                        args.push(self.annotation_arg()?);
                        match self.eat_punct(",") {
                            Some(c) => commas.push(c),
                            None => break,
                        }
                    }
                }
                let rparen = self.expect_punct(")")?;
                Some(AnnotationArgs { lparen, args, commas, rparen })
            } else {
                None
            };
            out.push(Annotation { id: NodeId::fresh(), at, name, resolved: None, args });
        }
        Ok(out)
    }

    fn annotation_arg(&mut self) -> Result<AnnotationArg, ParseError> {
        // `name = value` when the next two tokens say so, else a bare value.
        let named = self.peek().kind == TokKind::Ident
            && !KEYWORDS.contains(&self.peek().text.as_str())
            && self.peek_ahead(1).kind == TokKind::Punct
            && self.peek_ahead(1).text == "=";
        let name = if named {
            let ident = self.expect_name()?;
            let eq = self.expect_punct("=")?;
            Some((ident, eq))
        } else {
            None
        };
        let value = self.expr()?;
        Ok(AnnotationArg { name, value })
    }

    fn modifiers(&mut self) -> Vec<Modifier> {
        let mut out = Vec::new();
        loop {
            let t = self.peek();
            if t.kind != TokKind::Ident {
                break;
            }
            match ModifierKind::from_str(&t.text) {
                // `static` also opens a static import, but those are handled
                // before declarations; here it is always a modifier.
                Some(kind) => {
                    let t = self.bump();
                    out.push(Modifier { prefix: Space(t.leading), kind });
                }
                None => break,
            }
        }
        out
    }

    fn class_decl(&mut self) -> Result<ClassDecl, ParseError> {
        let annotations = self.annotations()?;
        let modifiers = self.modifiers();
        let class_kw = self.expect_word("class")?;
        let name = self.expect_name()?;
        let extends = match self.eat_word("extends") {
            Some(kw) => Some(SuperClause { kw, ty: self.type_ref()? }),
            None => None,
        };
        let implements = match self.eat_word("implements") {
            Some(kw) => {
                let mut types = vec![self.type_ref()?];
                let mut commas = Vec::new();
                while let Some(c) = self.eat_punct(",") {
                    commas.push(c);
                    types.push(self.type_ref()?);
                }
                Some(ImplementsClause { kw, types, commas })
            }
            None => None,
        };
        let body = self.class_body()?;
        Ok(ClassDecl {
            id: NodeId::fresh(),
            annotations,
            modifiers,
            class_kw,
            name,
            extends,
            implements,
            body,
        })
    }

    fn class_body(&mut self) -> Result<ClassBody, ParseError> {
        let lbrace = self.expect_punct("{")?;
        let mut members = Vec::new();
        while !self.at_punct("}") && !self.at_eof() {
            members.push(self.member()?);
        }
        let rbrace = self.expect_punct("}")?;
        Ok(ClassBody { id: NodeId::fresh(), lbrace, members, rbrace })
    }

    fn member(&mut self) -> Result<Member, ParseError> {
        let save = self.pos;
        let annotations = self.annotations()?;
        let modifiers = self.modifiers();

        if self.at_word("class") {
            self.pos = save;
            return Ok(Member::Class(self.class_decl()?));
        }

        let ty = self.type_ref()?;
        let name = self.expect_name()?;

        if self.at_punct("(") {
            let lparen = Space(self.bump().leading);
            let mut params = Vec::new();
            let mut commas = Vec::new();
            if !self.at_punct(")") {
                loop {
                    let pty = self.type_ref()?;
                    let pname = self.expect_name()?;
                    params.push(Param { id: NodeId::fresh(), ty: pty, name: pname });
                    match self.eat_punct(",") {
                        Some(c) => commas.push(c),
                        None => break,
                    }
                }
            }
            let rparen = self.expect_punct(")")?;
            let body = self.block()?;
            Ok(Member::Method(MethodDecl {
                id: NodeId::fresh(),
                annotations,
                modifiers,
                ret: ty,
                name,
                lparen,
                params,
                commas,
                rparen,
                body,
            }))
        } else {
            let init = match self.eat_punct("=") {
                Some(eq) => Some(Initializer { eq, value: self.expr()? }),
                None => None,
            };
            let semi = self.expect_punct(";")?;
            Ok(Member::Field(FieldDecl { id: NodeId::fresh(), modifiers, ty, name, init, semi }))
        }
    }

    fn type_ref(&mut self) -> Result<TypeRef, ParseError> {
        let name = self.qualified_name()?;
        let args = if self.at_punct("<") { Some(self.type_args()?) } else { None };
        Ok(TypeRef { id: NodeId::fresh(), name, args, resolved: None })
    }

    fn type_args(&mut self) -> Result<TypeArgs, ParseError> {
        let lt = self.expect_punct("<")?;
        let mut args = Vec::new();
        let mut commas = Vec::new();
        if !self.at_punct(">") {
            loop {
                args.push(self.type_ref()?);
                match self.eat_punct(",") {
                    Some(c) => commas.push(c),
                    None => break,
                }
            }
        }
        let gt = self.expect_punct(">")?;
        Ok(TypeArgs { lt, args, commas, gt })
    }

    // -- statements ---------------------------------------------------------

    fn block(&mut self) -> Result<Block, ParseError> {
        let lbrace = self.expect_punct("{")?;
        let mut stmts = Vec::new();
        while !self.at_punct("}") && !self.at_eof() {
            stmts.push(self.stmt()?);
        }
        let rbrace = self.expect_punct("}")?;
        Ok(Block { id: NodeId::fresh(), lbrace, stmts, rbrace })
    }

    fn stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.at_punct(";") {
            let semi = Space(self.bump().leading);
            return Ok(Stmt::Empty(Empty { id: NodeId::fresh(), semi }));
        }
        if self.at_punct("{") {
            return Ok(Stmt::Block(self.block()?));
        }
        if self.at_word("if") {
            return self.if_stmt();
        }
        if self.at_word("while") {
            let kw = self.expect_word("while")?;
            let lparen = self.expect_punct("(")?;
            let cond = self.expr()?;
            let rparen = self.expect_punct(")")?;
            let body = Box::new(self.stmt()?);
            return Ok(Stmt::While(While { id: NodeId::fresh(), kw, lparen, cond, rparen, body }));
        }
        if self.at_word("for") {
            let kw = self.expect_word("for")?;
            let lparen = self.expect_punct("(")?;
            let ty = self.type_ref()?;
            let name = self.expect_name()?;
            let colon = self.expect_punct(":")?;
            let iterable = self.expr()?;
            let rparen = self.expect_punct(")")?;
            let body = Box::new(self.stmt()?);
            return Ok(Stmt::ForEach(ForEach {
                id: NodeId::fresh(),
                kw,
                lparen,
                ty,
                name,
                colon,
                iterable,
                rparen,
                body,
            }));
        }
        if self.at_word("return") {
            let kw = self.expect_word("return")?;
            let value = if self.at_punct(";") { None } else { Some(self.expr()?) };
            let semi = self.expect_punct(";")?;
            return Ok(Stmt::Return(Return { id: NodeId::fresh(), kw, value, semi }));
        }

        if let Some(local) = self.try_local_decl()? {
            return Ok(Stmt::Local(local));
        }

        let expr = self.expr()?;
        for op in [AssignOp::Set, AssignOp::Add, AssignOp::Sub, AssignOp::Mul, AssignOp::Div] {
            if self.at_punct(op.token()) {
                if !matches!(expr, Expr::Name(_) | Expr::Field(_)) {
                    return Err(self.error("assignment target must be a name or field access"));
                }
                let op_space = Space(self.bump().leading);
                let value = self.expr()?;
                let semi = self.expect_punct(";")?;
                return Ok(Stmt::Assign(Assign {
                    id: NodeId::fresh(),
                    target: expr,
                    op,
                    op_space,
                    value,
                    semi,
                }));
            }
        }
        let semi = self.expect_punct(";")?;
        Ok(Stmt::Expr(ExprStmt { id: NodeId::fresh(), expr, semi }))
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let kw = self.expect_word("if")?;
        let lparen = self.expect_punct("(")?;
        let cond = self.expr()?;
        let rparen = self.expect_punct(")")?;
        let then_branch = Box::new(self.stmt()?);
        let else_branch = match self.eat_word("else") {
            Some(kw) => Some(ElseClause { kw, body: Box::new(self.stmt()?) }),
            None => None,
        };
        Ok(Stmt::If(If { id: NodeId::fresh(), kw, lparen, cond, rparen, then_branch, else_branch }))
    }

    /// Speculatively parse `Type name (= init)? ;`. Rolls back and returns
    /// `None` when the lookahead turns out to be an expression statement.
    fn try_local_decl(&mut self) -> Result<Option<LocalDecl>, ParseError> {
        let save = self.pos;
        let ty = match self.type_ref() {
            Ok(ty) => ty,
            Err(_) => {
                self.pos = save;
                return Ok(None);
            }
        };
        let name = match self.expect_name() {
            Ok(name) => name,
            Err(_) => {
                self.pos = save;
                return Ok(None);
            }
        };
        if !self.at_punct("=") && !self.at_punct(";") {
            self.pos = save;
            return Ok(None);
        }
        let init = match self.eat_punct("=") {
            Some(eq) => Some(Initializer { eq, value: self.expr()? }),
            None => None,
        };
        let semi = self.expect_punct(";")?;
        Ok(Some(LocalDecl { id: NodeId::fresh(), ty, name, init, semi }))
    }

    // -- expressions --------------------------------------------------------

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.binary(0)
    }

    fn binary(&mut self, min_level: usize) -> Result<Expr, ParseError> {
        const LEVELS: &[&[BinOp]] = &[
            &[BinOp::Or],
            &[BinOp::And],
            &[BinOp::EqEq, BinOp::Ne],
            &[BinOp::Lt, BinOp::Gt, BinOp::Le, BinOp::Ge],
            &[BinOp::Add, BinOp::Sub],
            &[BinOp::Mul, BinOp::Div, BinOp::Rem],
        ];
        if min_level >= LEVELS.len() {
            return self.unary();
        }
        let mut lhs = self.binary(min_level + 1)?;
        'outer: loop {
            for &op in LEVELS[min_level] {
                if self.at_punct(op.token()) {
                    let op_space = Space(self.bump().leading);
                    let rhs = self.binary(min_level + 1)?;
                    lhs = Expr::Binary(Binary {
                        id: NodeId::fresh(),
                        lhs: Box::new(lhs),
                        op,
                        op_space,
                        rhs: Box::new(rhs),
                    });
                    continue 'outer;
                }
            }
            break;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        for op in [UnOp::Not, UnOp::Neg] {
            if self.at_punct(op.token()) {
                let prefix = Space(self.bump().leading);
                let expr = Box::new(self.unary()?);
                return Ok(Expr::Unary(Unary { id: NodeId::fresh(), prefix, op, expr }));
            }
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        while self.at_punct(".") {
            let dot = Space(self.bump().leading);
            let name = self.expect_name()?;
            if self.at_punct("(") {
                let (lparen, args, commas, rparen) = self.call_args()?;
                expr = Expr::Call(Call {
                    id: NodeId::fresh(),
                    receiver: Some(Receiver { expr: Box::new(expr), dot }),
                    name,
                    lparen,
                    args,
                    commas,
                    rparen,
                });
            } else {
                expr = Expr::Field(FieldAccess {
                    id: NodeId::fresh(),
                    target: Box::new(expr),
                    dot,
                    name,
                });
            }
        }
        Ok(expr)
    }

    fn call_args(&mut self) -> Result<(Space, Vec<Expr>, Vec<Space>, Space), ParseError> {
        let lparen = self.expect_punct("(")?;
        let mut args = Vec::new();
        let mut commas = Vec::new();
        if !self.at_punct(")") {
            loop {
                args.push(self.expr()?);
                match self.eat_punct(",") {
                    Some(c) => commas.push(c),
                    None => break,
                }
            }
        }
        let rparen = self.expect_punct(")")?;
        Ok((lparen, args, commas, rparen))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let t = self.peek().clone();
        match t.kind {
            TokKind::Int | TokKind::Str | TokKind::Char => {
                let t = self.bump();
                Ok(Expr::Lit(Literal { id: NodeId::fresh(), prefix: Space(t.leading), text: t.text }))
            }
            TokKind::Ident if t.text == "true" || t.text == "false" || t.text == "null" => {
                let t = self.bump();
                Ok(Expr::Lit(Literal { id: NodeId::fresh(), prefix: Space(t.leading), text: t.text }))
            }
            TokKind::Ident if t.text == "new" => {
                let kw = Space(self.bump().leading);
                let ty = self.type_ref()?;
                let (lparen, args, commas, rparen) = self.call_args()?;
                let body = if self.at_punct("{") { Some(self.class_body()?) } else { None };
                Ok(Expr::New(New { id: NodeId::fresh(), kw, ty, lparen, args, commas, rparen, body }))
            }
            TokKind::Ident if !KEYWORDS.contains(&t.text.as_str()) || t.text == "this" => {
                let name = if t.text == "this" {
                    let t = self.bump();
                    Ident::new(Space(t.leading), t.text)
                } else {
                    self.expect_name()?
                };
                if self.at_punct("->") {
                    let arrow = Space(self.bump().leading);
                    let body = if self.at_punct("{") {
                        LambdaBody::Block(self.block()?)
                    } else {
                        LambdaBody::Expr(Box::new(self.expr()?))
                    };
                    return Ok(Expr::Lambda(Lambda { id: NodeId::fresh(), param: name, arrow, body }));
                }
                if self.at_punct("(") {
                    let (lparen, args, commas, rparen) = self.call_args()?;
                    return Ok(Expr::Call(Call {
                        id: NodeId::fresh(),
                        receiver: None,
                        name,
                        lparen,
                        args,
                        commas,
                        rparen,
                    }));
                }
                Ok(Expr::Name(name))
            }
            TokKind::Punct if t.text == "(" => {
                let lparen = Space(self.bump().leading);
                let expr = Box::new(self.expr()?);
                let rparen = self.expect_punct(")")?;
                Ok(Expr::Paren(Paren { id: NodeId::fresh(), lparen, expr, rparen }))
            }
            _ => Err(self.error(format!("expected expression, found '{}'", t.text))),
        }
    }
}
