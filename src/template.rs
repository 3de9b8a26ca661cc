//! Splices parsed code fragments into an existing tree.
//!
//! A fragment like `counter = counter + 1;` does not parse on its own: it
//! needs an enclosing method, the locals it mentions, and the imports its
//! types come from. [`Template::splice`] synthesizes that minimal scaffold —
//! a stub class and method named with a collision-checked placeholder, whose
//! parameters re-declare every local visible at the insertion point — parses
//! the fragment inside it, then lifts the fragment's statements out of the
//! stub and grafts them at the target block. The placeholder never survives
//! into the result; imports the template asked for are added to the file
//! when missing.

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::cursor::Cursor;
use crate::index::ScopeIndex;
use crate::parser::{self, ParseError};
use crate::printer;
use crate::resolve::{self, TypeTable};
use crate::tree::*;
use crate::visit::{walk_file, Edit, Pass, Visitor};

#[derive(Debug, Error)]
pub enum SpliceError {
    /// The fragment does not parse even with its scaffold; distinguishable
    /// from "nothing to insert".
    #[error("fragment does not parse in context: {0}")]
    Fragment(#[source] ParseError),
    #[error("splice produced no scaffold method; placeholder vanished")]
    ScaffoldMissing,
    #[error("no block with the requested id exists in this file")]
    TargetNotFound,
    #[error("statement index {index} is out of bounds ({len} statements)")]
    BadIndex { index: usize, len: usize },
}

#[derive(Debug, Clone)]
pub struct Template {
    code: String,
    imports: Vec<String>,
}

impl Template {
    pub fn new(code: impl Into<String>) -> Self {
        Template { code: code.into(), imports: Vec::new() }
    }

    /// Declare a type the fragment depends on; the import is added to the
    /// target file if it is not already there.
    pub fn with_import(mut self, fqn: impl Into<String>) -> Self {
        self.imports.push(fqn.into());
        self
    }

    /// Insert this template's statements into the block with id `block`,
    /// before the statement currently at `at`. The file must already be
    /// resolved; the result is re-resolved before it is returned.
    pub fn splice(
        &self,
        file: &SourceFile,
        table: &TypeTable,
        block: NodeId,
        at: usize,
    ) -> Result<SourceFile, SpliceError> {
        let index = ScopeIndex::build(file);
        let scope = index.scope_of(block).ok_or(SpliceError::TargetNotFound)?;

        let marker = pick_marker(file);
        let scaffold = self.scaffold(file, &index, scope, &marker);
        debug!(%marker, "parsing template scaffold");
        let parsed = parser::parse_with(&scaffold, table).map_err(SpliceError::Fragment)?;

        let fragment = extract_stub_body(parsed, &marker).ok_or(SpliceError::ScaffoldMissing)?;

        let mut grafter =
            Grafter { target: block, at, fragment: Some(fragment), error: None, applied: false };
        let mut out = walk_file(&mut grafter, file.clone());
        if let Some(err) = grafter.error {
            return Err(err);
        }
        if !grafter.applied {
            return Err(SpliceError::TargetNotFound);
        }

        self.add_missing_imports(&mut out);
        resolve::resolve(&mut out, table);
        Ok(out)
    }

    /// Minimal compilation unit in which the fragment parses: the real
    /// file's package and imports, the template's own imports, and a stub
    /// class/method re-declaring the locals visible at the cursor.
    fn scaffold(
        &self,
        file: &SourceFile,
        index: &ScopeIndex,
        scope: crate::index::ScopeId,
        marker: &str,
    ) -> String {
        let mut out = String::new();
        if let Some(pkg) = &file.package {
            out.push_str(&format!("package {};\n", pkg.name.text()));
        }
        for import in &file.imports {
            out.push_str(&render_import(import));
        }
        for fqn in &self.imports {
            if !has_named_import(file, fqn) {
                out.push_str(&format!("import {fqn};\n"));
            }
        }

        // Innermost declaration wins when scopes shadow each other.
        let mut params: Vec<(String, String)> = Vec::new();
        let mut by_name: FxHashMap<String, usize> = FxHashMap::default();
        for sym in index.visible_locals(scope) {
            let Some(ty) = &sym.ty else { continue };
            match by_name.get(&sym.name) {
                Some(&i) => params[i].1 = ty.clone(),
                None => {
                    by_name.insert(sym.name.clone(), params.len());
                    params.push((sym.name.clone(), ty.clone()));
                }
            }
        }
        let params = params
            .iter()
            .map(|(name, ty)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!(
            "class {marker}C {{\nvoid {marker}m({params}) {{\n{}\n}}\n}}\n",
            self.code
        ));
        out
    }

    fn add_missing_imports(&self, file: &mut SourceFile) {
        for fqn in &self.imports {
            if has_named_import(file, fqn) {
                continue;
            }
            let prefix = if file.imports.is_empty() {
                if file.package.is_some() { Space::of("\n\n") } else { Space::none() }
            } else {
                Space::of("\n")
            };
            file.imports.push(Import::synthetic(prefix, false, fqn));
        }
    }
}

fn has_named_import(file: &SourceFile, fqn: &str) -> bool {
    file.imports.iter().any(|i| !i.is_static() && !i.is_star() && i.target() == fqn)
}

/// Placeholder base guaranteed not to collide with any token in the file.
fn pick_marker(file: &SourceFile) -> String {
    let tokens = printer::print_tokens(file);
    let mut n = 0usize;
    loop {
        let candidate = format!("__t{n}");
        if !tokens.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn render_import(import: &Import) -> String {
    let mut out = String::from("import ");
    if import.is_static() {
        out.push_str("static ");
    }
    out.push_str(&import.target());
    if import.is_star() {
        out.push_str(".*");
    }
    out.push_str(";\n");
    out
}

/// Pull the fragment's statements back out of the parsed scaffold.
fn extract_stub_body(parsed: SourceFile, marker: &str) -> Option<Vec<Stmt>> {
    let stub_class = format!("{marker}C");
    let stub_method = format!("{marker}m");
    parsed.types.into_iter().find(|c| c.name.name == stub_class).and_then(|class| {
        class.body.members.into_iter().find_map(|member| match member {
            Member::Method(m) if m.name.name == stub_method => Some(m.body.stmts),
            _ => None,
        })
    })
}

/// Visitor that inserts the fragment once it reaches the target block.
/// Method bodies are reached through their member, lambda bodies through
/// their expression, plain blocks through the statement hook.
struct Grafter {
    target: NodeId,
    at: usize,
    fragment: Option<Vec<Stmt>>,
    error: Option<SpliceError>,
    applied: bool,
}

impl Grafter {
    fn try_block(&mut self, block: &mut Block) {
        if block.id != self.target {
            return;
        }
        let Some(fragment) = self.fragment.take() else { return };
        if self.at > block.stmts.len() {
            self.error = Some(SpliceError::BadIndex { index: self.at, len: block.stmts.len() });
            return;
        }
        // Indent grafted statements like the sibling at the insertion point.
        let leading = block
            .stmts
            .get(self.at.min(block.stmts.len().saturating_sub(1)))
            .map(|s| reindent(s.leading()))
            .unwrap_or_else(|| Space::of(" "));
        for (offset, mut stmt) in fragment.into_iter().enumerate() {
            stmt.set_leading(leading.clone());
            block.stmts.insert(self.at + offset, stmt);
        }
        self.applied = true;
    }
}

/// Newline plus the sibling's indentation, or the sibling's own spacing for
/// single-line blocks.
fn reindent(sibling: &Space) -> Space {
    match sibling.0.rsplit_once('\n') {
        Some((_, indent)) => Space(format!("\n{indent}")),
        None => sibling.clone(),
    }
}

impl Visitor for Grafter {
    fn enter_member(&mut self, mut member: Member, _cx: &Cursor) -> Edit<Member> {
        if let Member::Method(m) = &mut member {
            self.try_block(&mut m.body);
        }
        Edit::Visit(member)
    }

    fn enter_stmt(&mut self, mut stmt: Stmt, _cx: &Cursor) -> Edit<Stmt> {
        if let Stmt::Block(b) = &mut stmt {
            self.try_block(b);
        }
        Edit::Visit(stmt)
    }

    fn enter_expr(&mut self, mut expr: Expr, _cx: &Cursor) -> Pass<Expr> {
        if let Expr::Lambda(l) = &mut expr {
            if let LambdaBody::Block(b) = &mut l.body {
                self.try_block(b);
            }
        }
        Pass::Visit(expr)
    }
}
