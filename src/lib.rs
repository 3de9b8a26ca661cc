//! Format-preserving refactoring engine for Java sources.
//!
//! Source text parses into a tree that keeps every byte of whitespace and
//! comment trivia on the node it precedes, so code nobody touched prints
//! back exactly as it was read. Recipes traverse that tree through a
//! cursor-tracking visitor protocol, consult a per-file scope and reference
//! index, and replace nodes copy-on-write; the engine runs recipe pipelines
//! over many files in parallel and reports per-file changesets. Ships two
//! data-flow-backed cleanup recipes (unused imports, unused assignments)
//! and a template splicer for inserting generated fragments.

pub mod cursor;
pub mod diff;
pub mod engine;
pub mod index;
pub mod parser;
pub mod printer;
pub mod recipes;
pub mod resolve;
pub mod template;
pub mod tree;
pub mod visit;

#[cfg(test)]
mod tests;

pub use cursor::{Cursor, Step, StepKind};
pub use engine::{ChangeSet, ChangeSummary, Engine, EngineError, FileOutcome, Recipe, RecipeDescriptor, RecipeError, SourceInput};
pub use index::ScopeIndex;
pub use parser::{parse, parse_with, ParseError};
pub use recipes::{RemoveUnusedAssignments, RemoveUnusedImports};
pub use resolve::TypeTable;
pub use template::{SpliceError, Template};
pub use visit::{walk_file, Edit, Pass, Visitor};
