//! Recipe orchestration.
//!
//! A [`Recipe`] names itself and builds the visitor that carries out its
//! transformation, given a freshly built [`ScopeIndex`]. The engine runs the
//! per-file pipeline — parse, resolve, then one full traversal per recipe,
//! each seeing the previous recipe's output and its own fresh index — and
//! reduces the result to a [`ChangeSet`].
//!
//! Files are independent: no state is shared between them, so the engine
//! fans out across files with rayon while keeping each file's traversal
//! strictly sequential. A parse or recipe failure is confined to its file's
//! outcome slot and never aborts the rest of the run.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::diff;
use crate::index::ScopeIndex;
use crate::parser::{self, ParseError};
use crate::printer;
use crate::resolve::TypeTable;
use crate::tree::{same_shape, SourceFile};
use crate::visit::{walk_file, Visitor};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error("recipe '{recipe}' failed on {path}: {message}")]
    Recipe { recipe: String, path: String, message: String },
}

/// Failure raised by a recipe while preparing or applying its visitor.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RecipeError(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

pub trait Recipe: Send + Sync {
    fn descriptor(&self) -> RecipeDescriptor;

    /// Build the visitor performing this recipe's transformation. The index
    /// was built from the exact tree the visitor will traverse.
    fn visitor<'a>(&self, index: &'a ScopeIndex) -> Result<Box<dyn Visitor + 'a>, RecipeError>;
}

#[derive(Debug, Clone)]
pub struct SourceInput {
    pub path: String,
    pub text: String,
}

impl SourceInput {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        SourceInput { path: path.into(), text: text.into() }
    }
}

/// Result of running the recipe pipeline over one file.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    pub path: String,
    pub before: String,
    pub after: String,
    /// Printed text differs from the input text. This is the ground truth
    /// consumed by persistence.
    pub changed: bool,
    /// The token-level shape of the tree changed; false when only
    /// formatting moved.
    pub structurally_changed: bool,
}

impl ChangeSet {
    pub fn unified_diff(&self) -> (String, diff::DiffStats) {
        diff::unified_diff(&self.path, &self.before, &self.after, 3)
    }

    pub fn summary(&self) -> ChangeSummary {
        let (_, stats) = self.unified_diff();
        ChangeSummary {
            path: self.path.clone(),
            changed: self.changed,
            lines_added: stats.lines_added,
            lines_removed: stats.lines_removed,
        }
    }
}

/// Serializable per-file report for external tooling.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeSummary {
    pub path: String,
    pub changed: bool,
    pub lines_added: usize,
    pub lines_removed: usize,
}

#[derive(Debug)]
pub enum FileOutcome {
    Ok(ChangeSet),
    Failed { path: String, error: EngineError },
}

impl FileOutcome {
    pub fn change_set(&self) -> Option<&ChangeSet> {
        match self {
            FileOutcome::Ok(cs) => Some(cs),
            FileOutcome::Failed { .. } => None,
        }
    }
}

pub struct Engine {
    table: TypeTable,
    recipes: Vec<Box<dyn Recipe>>,
}

impl Engine {
    pub fn new(table: TypeTable) -> Self {
        Engine { table, recipes: Vec::new() }
    }

    pub fn with_recipe(mut self, recipe: Box<dyn Recipe>) -> Self {
        self.recipes.push(recipe);
        self
    }

    /// Run the full pipeline over one file.
    pub fn run_file(&self, input: &SourceInput) -> Result<ChangeSet, EngineError> {
        let file = parser::parse_with(&input.text, &self.table)
            .map_err(|source| EngineError::Parse { path: input.path.clone(), source })?;
        let original = file.clone();
        let file = self.apply_recipes(file, &input.path)?;

        let after = printer::print(&file);

        // A rewritten tree must still parse and round-trip; failing loudly
        // here beats persisting corrupted source.
        #[cfg(debug_assertions)]
        {
            let reparsed = parser::parse(&after)
                .unwrap_or_else(|e| panic!("rewritten {} no longer parses: {e}", input.path));
            debug_assert_eq!(printer::print(&reparsed), after, "round-trip broke for {}", input.path);
        }

        Ok(ChangeSet {
            path: input.path.clone(),
            changed: after != input.text,
            structurally_changed: !same_shape(&original, &file),
            before: input.text.clone(),
            after,
        })
    }

    fn apply_recipes(&self, mut file: SourceFile, path: &str) -> Result<SourceFile, EngineError> {
        for recipe in &self.recipes {
            let name = recipe.descriptor().name;
            debug!(recipe = %name, path, "running recipe");
            // Recipes run as whole traversals in sequence, each over a fresh
            // index of the previous one's output. Mutations therefore never
            // invalidate an index mid-traversal.
            let index = ScopeIndex::build(&file);
            let mut visitor = recipe.visitor(&index).map_err(|e| EngineError::Recipe {
                recipe: name.clone(),
                path: path.to_string(),
                message: e.to_string(),
            })?;
            file = walk_file(visitor.as_mut(), file);
        }
        Ok(file)
    }

    fn outcome(&self, input: &SourceInput) -> FileOutcome {
        match self.run_file(input) {
            Ok(cs) => FileOutcome::Ok(cs),
            Err(error) => {
                warn!(path = %input.path, %error, "skipping file");
                FileOutcome::Failed { path: input.path.clone(), error }
            }
        }
    }

    /// Process files in parallel. Per-file output is identical to
    /// [`Engine::run_files_sequential`]; outcomes keep input order.
    pub fn run_files(&self, inputs: &[SourceInput]) -> Vec<FileOutcome> {
        inputs.par_iter().map(|input| self.outcome(input)).collect()
    }

    pub fn run_files_sequential(&self, inputs: &[SourceInput]) -> Vec<FileOutcome> {
        inputs.iter().map(|input| self.outcome(input)).collect()
    }
}
