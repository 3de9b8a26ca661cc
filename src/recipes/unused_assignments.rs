//! Removes assignments whose value no execution path can read.
//!
//! Per local variable or parameter, independently: a bare assignment is dead
//! when, scanning forward through that symbol's use sites, no reachable read
//! appears before the value is overwritten on every path or the variable's
//! scope ends. A read protects only the most recent write that can reach it,
//! so a run of writes keeps the last one a read still observes — and goes
//! entirely when nothing reads the variable again. Everything the analysis
//! is unsure about stays: compound assignments read before they write, loop
//! bodies may run again, a lone branch arm may not execute, fields may be
//! observed from outside, and a variable captured by an anonymous class or
//! lambda has reads this scan cannot order. Declarations with initializers
//! are declarations, not assignments, and are never touched; whole
//! statements are what gets removed.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::cursor::Cursor;
use crate::engine::{Recipe, RecipeDescriptor, RecipeError};
use crate::index::{Access, CtxKind, CtxStep, ScopeIndex, SymbolEntry};
use crate::tree::{NodeId, Stmt, SymbolKind};
use crate::visit::{Edit, Visitor};

pub struct RemoveUnusedAssignments;

impl Recipe for RemoveUnusedAssignments {
    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor {
            name: "remove-unused-assignments".into(),
            display_name: "Remove unused assignments".into(),
            description: "Removes assignments to locals and parameters that are overwritten or fall out of scope before any read.".into(),
        }
    }

    fn visitor<'a>(&self, index: &'a ScopeIndex) -> Result<Box<dyn Visitor + 'a>, RecipeError> {
        Ok(Box::new(AssignmentPruner { dead: find_dead_assignments(index) }))
    }
}

struct AssignmentPruner {
    dead: FxHashSet<NodeId>,
}

impl Visitor for AssignmentPruner {
    fn enter_stmt(&mut self, stmt: Stmt, _cx: &Cursor) -> Edit<Stmt> {
        if let Stmt::Assign(a) = &stmt {
            if self.dead.contains(&a.id) {
                return Edit::Remove;
            }
        }
        Edit::Visit(stmt)
    }
}

/// Statement ids of every provably dead assignment in the file.
fn find_dead_assignments(index: &ScopeIndex) -> FxHashSet<NodeId> {
    let mut dead = FxHashSet::default();
    for entry in index.entries() {
        if !matches!(entry.handle.kind, SymbolKind::Local | SymbolKind::Param) {
            continue;
        }
        if is_captured(entry) {
            // A nested class or lambda touches this variable; its reads do
            // not happen in program order, so every write stays.
            continue;
        }
        scan_symbol(entry, &mut dead);
    }
    dead
}

fn is_captured(entry: &SymbolEntry) -> bool {
    entry
        .uses
        .iter()
        .any(|u| u.ctx[entry.decl_ctx_len..].iter().any(|s| s.kind == CtxKind::NestedDecl))
}

fn scan_symbol(entry: &SymbolEntry, dead: &mut FxHashSet<NodeId>) {
    for (i, write) in entry.uses.iter().enumerate() {
        // Candidates are plain writes that stand alone as statements;
        // declaration and parameter writes carry no statement.
        let Some(stmt) = write.stmt else { continue };
        if write.access != Access::Write {
            continue;
        }
        let wctx = &write.ctx[entry.decl_ctx_len..];
        if wctx.iter().any(|s| s.kind == CtxKind::LoopBody) {
            // A later iteration or the loop exit may read it.
            continue;
        }

        // Dead unless a reachable read turns up before the value is gone —
        // overwritten on every path, or out of scope.
        let mut is_dead = true;
        let mut then_overwrote: Option<NodeId> = None;
        let mut else_overwrote: Option<NodeId> = None;
        for later in &entry.uses[i + 1..] {
            let lctx = &later.ctx[entry.decl_ctx_len..];
            if in_sibling_arms(wctx, lctx) {
                continue;
            }
            match later.access {
                Access::Read | Access::ReadWrite => {
                    is_dead = false;
                    break;
                }
                Access::Write => {
                    // An unconditional overwrite, or a then/else pair on one
                    // conditional, seals the verdict; a lone arm still lets
                    // a read further down revive the write.
                    if is_prefix(lctx, wctx) {
                        break;
                    }
                    if let Some(step) = arm_step(wctx, lctx) {
                        match step.kind {
                            CtxKind::ThenArm => then_overwrote = Some(step.node),
                            CtxKind::ElseArm => else_overwrote = Some(step.node),
                            _ => {}
                        }
                        if then_overwrote.is_some() && then_overwrote == else_overwrote {
                            break;
                        }
                    }
                }
            }
        }
        if is_dead {
            debug!(symbol = %entry.handle.name, "dead assignment");
            dead.insert(stmt);
        }
    }
}

/// Two context chains sit in opposite arms of the same conditional, so one
/// site is unreachable from the other.
fn in_sibling_arms(a: &[CtxStep], b: &[CtxStep]) -> bool {
    for (x, y) in a.iter().zip(b.iter()) {
        if x.node == y.node {
            if x.kind != y.kind {
                return true;
            }
        } else {
            return false;
        }
    }
    false
}

/// `shorter` executes on every path that reaches `longer`'s position.
fn is_prefix(shorter: &[CtxStep], longer: &[CtxStep]) -> bool {
    shorter.len() <= longer.len() && shorter.iter().zip(longer.iter()).all(|(a, b)| a == b)
}

/// The single conditional arm separating `lctx` from `wctx`, if that is all
/// that separates them.
fn arm_step(wctx: &[CtxStep], lctx: &[CtxStep]) -> Option<CtxStep> {
    if lctx.len() == wctx.len() + 1 && is_prefix(wctx, lctx) {
        lctx.last().copied()
    } else {
        None
    }
}
