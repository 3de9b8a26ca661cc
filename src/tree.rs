//! Format-preserving tree model for Java sources.
//!
//! Every node carries the raw whitespace/comment text that precedes its first
//! token (a [`Space`]), so a tree that was not modified prints back
//! byte-for-byte. Nodes are built once and replaced wholesale, never mutated
//! field-by-field mid-traversal; a [`NodeId`] gives each node an identity
//! distinct from its structure, so two `a = 1;` statements stay tellable
//! apart through a rewrite.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stable per-node identity. Fresh ids come from a process-wide counter;
/// cloning a node clones the id, replacing a node gives the replacement a
/// new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Raw whitespace and comment text preceding a token, kept verbatim.
/// Opaque to every analysis; only the printer and a few spacing fixups
/// look inside.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Space(pub String);

impl Space {
    pub fn none() -> Self {
        Space(String::new())
    }

    pub fn of(text: &str) -> Self {
        Space(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the trivia carries comment text that must not be dropped
    /// by a spacing fixup.
    pub fn has_comment(&self) -> bool {
        self.0.contains("//") || self.0.contains("/*")
    }

    pub fn newlines(&self) -> usize {
        self.0.chars().filter(|c| *c == '\n').count()
    }
}

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

/// Identity of a resolved symbol, shared by every reference to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(u64);

impl SymbolId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SymbolId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Local,
    Param,
    Field,
    Type,
    Method,
    StaticMember,
}

/// Resolver-supplied annotation attached to identifiers and type references.
/// Analyses compare these by identity; they never re-derive binding.
#[derive(Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Package for a type, owning type fqn for a field/static member.
    pub owner: Option<String>,
    /// Canonical source text of the declared type, where one exists
    /// (locals, parameters, fields). Used to re-declare the symbol in a
    /// synthesized scaffold.
    pub ty: Option<String>,
}

pub type SymbolHandle = Arc<Symbol>;

impl Symbol {
    /// Fully qualified name, e.g. `java.util.List` for a type or
    /// `java.util.Collections.emptyList` for a static member.
    pub fn fqn(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Names and types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Ident {
    pub id: NodeId,
    pub prefix: Space,
    pub name: String,
    pub sym: Option<SymbolHandle>,
}

impl Ident {
    pub fn new(prefix: Space, name: impl Into<String>) -> Self {
        Ident {
            id: NodeId::fresh(),
            prefix,
            name: name.into(),
            sym: None,
        }
    }
}

/// `a.b.c` with the trivia before each dot preserved.
#[derive(Debug, Clone)]
pub struct QualifiedName {
    pub head: Ident,
    pub tail: Vec<NameSegment>,
}

#[derive(Debug, Clone)]
pub struct NameSegment {
    pub dot: Space,
    pub name: Ident,
}

impl QualifiedName {
    pub fn simple(name: Ident) -> Self {
        QualifiedName { head: name, tail: Vec::new() }
    }

    /// Build `a.b.c` from a dotted string with no interior trivia.
    pub fn synthetic(dotted: &str) -> Self {
        let mut parts = dotted.split('.');
        let head = Ident::new(Space::none(), parts.next().unwrap_or_default());
        let tail = parts
            .map(|p| NameSegment { dot: Space::none(), name: Ident::new(Space::none(), p) })
            .collect();
        QualifiedName { head, tail }
    }

    pub fn is_qualified(&self) -> bool {
        !self.tail.is_empty()
    }

    /// Canonical dotted text with no trivia, e.g. `java.util.List`.
    pub fn text(&self) -> String {
        let mut out = self.head.name.clone();
        for seg in &self.tail {
            out.push('.');
            out.push_str(&seg.name.name);
        }
        out
    }

    /// Last segment.
    pub fn simple_name(&self) -> &str {
        match self.tail.last() {
            Some(seg) => &seg.name.name,
            None => &self.head.name,
        }
    }

    /// Everything but the last segment, or `None` for a simple name.
    pub fn qualifier(&self) -> Option<String> {
        if self.tail.is_empty() {
            return None;
        }
        let mut out = self.head.name.clone();
        for seg in &self.tail[..self.tail.len() - 1] {
            out.push('.');
            out.push_str(&seg.name.name);
        }
        Some(out)
    }
}

pub const PRIMITIVES: &[&str] =
    &["void", "boolean", "byte", "short", "int", "long", "char", "float", "double"];

#[derive(Debug, Clone)]
pub struct TypeRef {
    pub id: NodeId,
    pub name: QualifiedName,
    pub args: Option<TypeArgs>,
    pub resolved: Option<SymbolHandle>,
}

#[derive(Debug, Clone)]
pub struct TypeArgs {
    pub lt: Space,
    pub args: Vec<TypeRef>,
    /// Trivia before each comma; always one shorter than `args` (empty for
    /// the diamond `<>`).
    pub commas: Vec<Space>,
    pub gt: Space,
}

impl TypeRef {
    pub fn is_primitive(&self) -> bool {
        !self.name.is_qualified() && PRIMITIVES.contains(&self.name.head.name.as_str())
    }

    /// Canonical source text, e.g. `List<Integer>`.
    pub fn canonical_text(&self) -> String {
        let mut out = self.name.text();
        if let Some(args) = &self.args {
            out.push('<');
            for (i, a) in args.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&a.canonical_text());
            }
            out.push('>');
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Compilation unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: NodeId,
    pub package: Option<PackageDecl>,
    pub imports: Vec<Import>,
    pub types: Vec<ClassDecl>,
    /// Trivia between the last token and end of input.
    pub eof: Space,
}

#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub id: NodeId,
    pub prefix: Space,
    pub name: QualifiedName,
    pub semi: Space,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub id: NodeId,
    pub prefix: Space,
    /// Trivia before the `static` keyword when present.
    pub static_kw: Option<Space>,
    pub path: QualifiedName,
    /// `.*` suffix: trivia before the dot, trivia before the star.
    pub star: Option<(Space, Space)>,
    pub semi: Space,
}

impl Import {
    pub fn is_static(&self) -> bool {
        self.static_kw.is_some()
    }

    pub fn is_star(&self) -> bool {
        self.star.is_some()
    }

    /// The package (plain star import) or owning type (static star import)
    /// the wildcard draws from; for a named import, the full imported name.
    pub fn target(&self) -> String {
        self.path.text()
    }

    /// Build `import a.b.C;` or `import static a.b.C.M;` with a given prefix
    /// and single spaces everywhere else.
    pub fn synthetic(prefix: Space, is_static: bool, path: &str) -> Self {
        let mut name = QualifiedName::synthetic(path);
        name.head.prefix = Space::of(" ");
        Import {
            id: NodeId::fresh(),
            prefix,
            static_kw: is_static.then(|| Space::of(" ")),
            path: name,
            star: None,
            semi: Space::none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
}

impl ModifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModifierKind::Public => "public",
            ModifierKind::Private => "private",
            ModifierKind::Protected => "protected",
            ModifierKind::Static => "static",
            ModifierKind::Final => "final",
            ModifierKind::Abstract => "abstract",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "public" => ModifierKind::Public,
            "private" => ModifierKind::Private,
            "protected" => ModifierKind::Protected,
            "static" => ModifierKind::Static,
            "final" => ModifierKind::Final,
            "abstract" => ModifierKind::Abstract,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Modifier {
    pub prefix: Space,
    pub kind: ModifierKind,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub id: NodeId,
    /// Trivia before the `@`.
    pub at: Space,
    pub name: Ident,
    pub resolved: Option<SymbolHandle>,
    pub args: Option<AnnotationArgs>,
}

#[derive(Debug, Clone)]
pub struct AnnotationArgs {
    pub lparen: Space,
    pub args: Vec<AnnotationArg>,
    pub commas: Vec<Space>,
    pub rparen: Space,
}

#[derive(Debug, Clone)]
pub struct AnnotationArg {
    /// `name =` part of a named argument; trivia is the space before `=`.
    pub name: Option<(Ident, Space)>,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub id: NodeId,
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    /// Trivia before the `class` keyword.
    pub class_kw: Space,
    pub name: Ident,
    pub extends: Option<SuperClause>,
    pub implements: Option<ImplementsClause>,
    pub body: ClassBody,
}

impl ClassDecl {
    /// Trivia before the declaration's first token.
    pub fn leading(&self) -> &Space {
        if let Some(ann) = self.annotations.first() {
            &ann.at
        } else if let Some(m) = self.modifiers.first() {
            &m.prefix
        } else {
            &self.class_kw
        }
    }

    pub fn set_leading(&mut self, space: Space) {
        if let Some(ann) = self.annotations.first_mut() {
            ann.at = space;
        } else if let Some(m) = self.modifiers.first_mut() {
            m.prefix = space;
        } else {
            self.class_kw = space;
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuperClause {
    /// Trivia before `extends`.
    pub kw: Space,
    pub ty: TypeRef,
}

#[derive(Debug, Clone)]
pub struct ImplementsClause {
    pub kw: Space,
    pub types: Vec<TypeRef>,
    pub commas: Vec<Space>,
}

#[derive(Debug, Clone)]
pub struct ClassBody {
    pub id: NodeId,
    pub lbrace: Space,
    pub members: Vec<Member>,
    pub rbrace: Space,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Class(ClassDecl),
}

impl Member {
    pub fn id(&self) -> NodeId {
        match self {
            Member::Field(f) => f.id,
            Member::Method(m) => m.id,
            Member::Class(c) => c.id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub id: NodeId,
    pub modifiers: Vec<Modifier>,
    pub ty: TypeRef,
    pub name: Ident,
    pub init: Option<Initializer>,
    pub semi: Space,
}

/// `= value` tail of a declaration; trivia is the space before `=`.
#[derive(Debug, Clone)]
pub struct Initializer {
    pub eq: Space,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: NodeId,
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    /// Return type; `void` is represented as a primitive type ref.
    pub ret: TypeRef,
    pub name: Ident,
    pub lparen: Space,
    pub params: Vec<Param>,
    pub commas: Vec<Space>,
    pub rparen: Space,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub id: NodeId,
    pub ty: TypeRef,
    pub name: Ident,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Stmt {
    Local(LocalDecl),
    Assign(Assign),
    Expr(ExprStmt),
    If(If),
    While(While),
    ForEach(ForEach),
    Return(Return),
    Block(Block),
    Empty(Empty),
}

impl Stmt {
    pub fn id(&self) -> NodeId {
        match self {
            Stmt::Local(s) => s.id,
            Stmt::Assign(s) => s.id,
            Stmt::Expr(s) => s.id,
            Stmt::If(s) => s.id,
            Stmt::While(s) => s.id,
            Stmt::ForEach(s) => s.id,
            Stmt::Return(s) => s.id,
            Stmt::Block(s) => s.id,
            Stmt::Empty(s) => s.id,
        }
    }

    /// Trivia before the statement's first token.
    pub fn leading(&self) -> &Space {
        match self {
            Stmt::Local(s) => &s.ty.name.head.prefix,
            Stmt::Assign(s) => s.target.leading(),
            Stmt::Expr(s) => s.expr.leading(),
            Stmt::If(s) => &s.kw,
            Stmt::While(s) => &s.kw,
            Stmt::ForEach(s) => &s.kw,
            Stmt::Return(s) => &s.kw,
            Stmt::Block(s) => &s.lbrace,
            Stmt::Empty(s) => &s.semi,
        }
    }

    pub fn set_leading(&mut self, space: Space) {
        match self {
            Stmt::Local(s) => s.ty.name.head.prefix = space,
            Stmt::Assign(s) => s.target.set_leading(space),
            Stmt::Expr(s) => s.expr.set_leading(space),
            Stmt::If(s) => s.kw = space,
            Stmt::While(s) => s.kw = space,
            Stmt::ForEach(s) => s.kw = space,
            Stmt::Return(s) => s.kw = space,
            Stmt::Block(s) => s.lbrace = space,
            Stmt::Empty(s) => s.semi = space,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalDecl {
    pub id: NodeId,
    pub ty: TypeRef,
    pub name: Ident,
    pub init: Option<Initializer>,
    pub semi: Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOp {
    pub fn token(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
        }
    }

    /// Compound operators read the target before writing it.
    pub fn is_compound(self) -> bool {
        !matches!(self, AssignOp::Set)
    }
}

#[derive(Debug, Clone)]
pub struct Assign {
    pub id: NodeId,
    /// Either a bare name or a field access.
    pub target: Expr,
    pub op: AssignOp,
    pub op_space: Space,
    pub value: Expr,
    pub semi: Space,
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub id: NodeId,
    pub expr: Expr,
    pub semi: Space,
}

#[derive(Debug, Clone)]
pub struct If {
    pub id: NodeId,
    pub kw: Space,
    pub lparen: Space,
    pub cond: Expr,
    pub rparen: Space,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<ElseClause>,
}

#[derive(Debug, Clone)]
pub struct ElseClause {
    pub kw: Space,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone)]
pub struct While {
    pub id: NodeId,
    pub kw: Space,
    pub lparen: Space,
    pub cond: Expr,
    pub rparen: Space,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone)]
pub struct ForEach {
    pub id: NodeId,
    pub kw: Space,
    pub lparen: Space,
    pub ty: TypeRef,
    pub name: Ident,
    pub colon: Space,
    pub iterable: Expr,
    pub rparen: Space,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone)]
pub struct Return {
    pub id: NodeId,
    pub kw: Space,
    pub value: Option<Expr>,
    pub semi: Space,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub lbrace: Space,
    pub stmts: Vec<Stmt>,
    /// Trivia before the closing brace.
    pub rbrace: Space,
}

/// A bare `;`. Also what the traversal substitutes when a visitor removes a
/// statement from a slot the grammar requires to be filled.
#[derive(Debug, Clone)]
pub struct Empty {
    pub id: NodeId,
    pub semi: Space,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Expr {
    Lit(Literal),
    Name(Ident),
    Field(FieldAccess),
    Call(Call),
    New(New),
    Binary(Binary),
    Unary(Unary),
    Paren(Paren),
    Lambda(Lambda),
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Lit(e) => e.id,
            Expr::Name(e) => e.id,
            Expr::Field(e) => e.id,
            Expr::Call(e) => e.id,
            Expr::New(e) => e.id,
            Expr::Binary(e) => e.id,
            Expr::Unary(e) => e.id,
            Expr::Paren(e) => e.id,
            Expr::Lambda(e) => e.id,
        }
    }

    /// Trivia before the expression's first token.
    pub fn leading(&self) -> &Space {
        match self {
            Expr::Lit(e) => &e.prefix,
            Expr::Name(e) => &e.prefix,
            Expr::Field(e) => e.target.leading(),
            Expr::Call(e) => match &e.receiver {
                Some(r) => r.expr.leading(),
                None => &e.name.prefix,
            },
            Expr::New(e) => &e.kw,
            Expr::Binary(e) => e.lhs.leading(),
            Expr::Unary(e) => &e.prefix,
            Expr::Paren(e) => &e.lparen,
            Expr::Lambda(e) => &e.param.prefix,
        }
    }

    pub fn set_leading(&mut self, space: Space) {
        match self {
            Expr::Lit(e) => e.prefix = space,
            Expr::Name(e) => e.prefix = space,
            Expr::Field(e) => e.target.set_leading(space),
            Expr::Call(e) => match &mut e.receiver {
                Some(r) => r.expr.set_leading(space),
                None => e.name.prefix = space,
            },
            Expr::New(e) => e.kw = space,
            Expr::Binary(e) => e.lhs.set_leading(space),
            Expr::Unary(e) => e.prefix = space,
            Expr::Paren(e) => e.lparen = space,
            Expr::Lambda(e) => e.param.prefix = space,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub id: NodeId,
    pub prefix: Space,
    /// Source text verbatim, quotes included.
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub id: NodeId,
    pub target: Box<Expr>,
    pub dot: Space,
    pub name: Ident,
}

#[derive(Debug, Clone)]
pub struct Receiver {
    pub expr: Box<Expr>,
    pub dot: Space,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub id: NodeId,
    pub receiver: Option<Receiver>,
    pub name: Ident,
    pub lparen: Space,
    pub args: Vec<Expr>,
    pub commas: Vec<Space>,
    pub rparen: Space,
}

#[derive(Debug, Clone)]
pub struct New {
    pub id: NodeId,
    pub kw: Space,
    pub ty: TypeRef,
    pub lparen: Space,
    pub args: Vec<Expr>,
    pub commas: Vec<Space>,
    pub rparen: Space,
    /// Anonymous class body.
    pub body: Option<ClassBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn token(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::EqEq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub id: NodeId,
    pub lhs: Box<Expr>,
    pub op: BinOp,
    pub op_space: Space,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
}

impl UnOp {
    pub fn token(self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Unary {
    pub id: NodeId,
    pub prefix: Space,
    pub op: UnOp,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct Paren {
    pub id: NodeId,
    pub lparen: Space,
    pub expr: Box<Expr>,
    pub rparen: Space,
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub id: NodeId,
    pub param: Ident,
    pub arrow: Space,
    pub body: LambdaBody,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

/// Structural comparison that ignores formatting and node identity: two
/// trees are the same shape when they produce the same token sequence.
pub fn same_shape(a: &SourceFile, b: &SourceFile) -> bool {
    crate::printer::print_tokens(a) == crate::printer::print_tokens(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_identity_distinct_from_structure() {
        let a = Ident::new(Space::none(), "x");
        let b = Ident::new(Space::none(), "x");
        assert_eq!(a.name, b.name);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_qualified_name_parts() {
        let q = QualifiedName::synthetic("java.util.List");
        assert_eq!(q.text(), "java.util.List");
        assert_eq!(q.simple_name(), "List");
        assert_eq!(q.qualifier().as_deref(), Some("java.util"));

        let s = QualifiedName::synthetic("List");
        assert_eq!(s.simple_name(), "List");
        assert!(s.qualifier().is_none());
    }

    #[test]
    fn test_space_comment_detection() {
        assert!(!Space::of("  \n\t").has_comment());
        assert!(Space::of("\n// keep me\n").has_comment());
        assert!(Space::of("/* block */").has_comment());
        assert_eq!(Space::of("\n\n  ").newlines(), 2);
    }

    #[test]
    fn test_synthetic_import_shape() {
        let i = Import::synthetic(Space::of("\n"), true, "java.util.Collections.emptyList");
        assert!(i.is_static());
        assert!(!i.is_star());
        assert_eq!(i.target(), "java.util.Collections.emptyList");
    }
}
