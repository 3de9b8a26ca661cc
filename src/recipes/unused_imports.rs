//! Removes imports nothing in the file refers to.
//!
//! Named imports go when their symbol has no use site. A wildcard import is
//! removed outright when it supplies nothing, collapsed to named imports
//! when it supplies one or two names, and kept verbatim from three up —
//! unfolding more than that would be noisier than the wildcard. Static
//! wildcards collapse by referenced member the same way. A name the
//! resolver could not account for keeps every wildcard that might supply
//! it: this recipe never removes an import it cannot prove unused.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::cursor::Cursor;
use crate::engine::{Recipe, RecipeDescriptor, RecipeError};
use crate::index::ScopeIndex;
use crate::tree::{Import, SourceFile, Space};
use crate::visit::Visitor;

pub struct RemoveUnusedImports;

impl Recipe for RemoveUnusedImports {
    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor {
            name: "remove-unused-imports".into(),
            display_name: "Remove unused imports".into(),
            description: "Removes imports no longer referenced anywhere in the file, collapsing wildcard imports that supply at most two names.".into(),
        }
    }

    fn visitor<'a>(&self, index: &'a ScopeIndex) -> Result<Box<dyn Visitor + 'a>, RecipeError> {
        Ok(Box::new(ImportTrimmer { index }))
    }
}

struct ImportTrimmer<'a> {
    index: &'a ScopeIndex,
}

impl Visitor for ImportTrimmer<'_> {
    fn visit_file(&mut self, mut file: SourceFile, _cx: &Cursor) -> SourceFile {
        trim_imports(&mut file, self.index);
        file
    }
}

enum Decision {
    Keep,
    Remove,
    Replace(Vec<String>),
}

fn trim_imports(file: &mut SourceFile, index: &ScopeIndex) {
    if file.imports.is_empty() {
        return;
    }

    // Distinct references in first-reference order.
    let mut used_types: Vec<String> = Vec::new();
    let mut seen_types = FxHashSet::default();
    for use_ in &index.type_uses {
        if seen_types.insert(use_.fqn.clone()) {
            used_types.push(use_.fqn.clone());
        }
    }
    let mut used_statics: Vec<(String, String)> = Vec::new();
    let mut seen_statics = FxHashSet::default();
    for use_ in &index.static_uses {
        let key = (use_.owner.clone(), use_.name.clone());
        if seen_statics.insert(key.clone()) {
            used_statics.push(key);
        }
    }
    let has_unresolved = !index.unresolved.is_empty();

    // Names already covered by a named import; a wildcard never claims them.
    let named_type_fqns: FxHashSet<String> = file
        .imports
        .iter()
        .filter(|i| !i.is_static() && !i.is_star())
        .map(|i| i.target())
        .collect();
    let named_statics: FxHashSet<(String, String)> = file
        .imports
        .iter()
        .filter(|i| i.is_static() && !i.is_star())
        .filter_map(|i| {
            i.path.qualifier().map(|owner| (owner, i.path.simple_name().to_string()))
        })
        .collect();

    let decisions: Vec<Decision> = file
        .imports
        .iter()
        .map(|import| decide(import, &used_types, &used_statics, &named_type_fqns, &named_statics, has_unresolved))
        .collect();

    let had_imports = !file.imports.is_empty();
    let mut result: Vec<Import> = Vec::new();
    // Prefix of a removed import, carried to the next survivor so blank-line
    // group separation does not collapse.
    let mut pending: Option<Space> = None;

    for (import, decision) in file.imports.drain(..).zip(decisions) {
        match decision {
            Decision::Keep => {
                let mut import = import;
                adopt_prefix(&mut import.prefix, &mut pending, result.is_empty());
                result.push(import);
            }
            Decision::Remove => {
                debug!(import = %import.target(), "removing unused import");
                let prefix = import.prefix;
                pending = Some(match pending.take() {
                    // At the head, the original first position's prefix wins;
                    // further in, the widest gap wins.
                    Some(prev) if result.is_empty() => prev,
                    Some(prev) if prev.newlines() >= prefix.newlines() => prev,
                    _ => prefix,
                });
            }
            Decision::Replace(paths) => {
                let is_static = import.is_static();
                let mut head_prefix = import.prefix.clone();
                adopt_prefix(&mut head_prefix, &mut pending, result.is_empty());
                for (i, path) in paths.iter().enumerate() {
                    let prefix = if i == 0 { head_prefix.clone() } else { Space::of("\n") };
                    result.push(Import::synthetic(prefix, is_static, path));
                }
            }
        }
    }

    file.imports = result;

    if file.imports.is_empty() && had_imports {
        // No dangling blank import block: exactly one blank line between a
        // package declaration and the first type, nothing before it
        // otherwise. Comments in that gap stay put.
        if let Some(first) = file.types.first_mut() {
            if !first.leading().has_comment() {
                let space = if file.package.is_some() { "\n\n" } else { "" };
                first.set_leading(Space::of(space));
            }
        }
    }
}

fn adopt_prefix(prefix: &mut Space, pending: &mut Option<Space>, at_head: bool) {
    if let Some(p) = pending.take() {
        if prefix.has_comment() {
            return;
        }
        if at_head || p.newlines() > prefix.newlines() {
            *prefix = p;
        }
    }
}

fn decide(
    import: &Import,
    used_types: &[String],
    used_statics: &[(String, String)],
    named_type_fqns: &FxHashSet<String>,
    named_statics: &FxHashSet<(String, String)>,
    has_unresolved: bool,
) -> Decision {
    match (import.is_static(), import.is_star()) {
        // import a.b.C;
        (false, false) => {
            let fqn = import.target();
            if used_types.iter().any(|u| *u == fqn) {
                Decision::Keep
            } else {
                Decision::Remove
            }
        }
        // import a.b.*;
        (false, true) => {
            if has_unresolved {
                // Something did not resolve; this wildcard may be supplying it.
                return Decision::Keep;
            }
            let package = import.target();
            let claimed: Vec<&String> = used_types
                .iter()
                .filter(|fqn| {
                    !named_type_fqns.contains(*fqn)
                        && fqn.rsplit_once('.').is_some_and(|(pkg, _)| pkg == package)
                })
                .collect();
            match claimed.len() {
                0 => Decision::Remove,
                1 | 2 => Decision::Replace(claimed.into_iter().cloned().collect()),
                _ => Decision::Keep,
            }
        }
        // import static a.b.C.M;
        (true, false) => {
            let keep = import.path.qualifier().is_some_and(|owner| {
                let member = import.path.simple_name();
                used_statics.iter().any(|(o, m)| *o == owner && m == member)
            });
            if keep {
                Decision::Keep
            } else {
                Decision::Remove
            }
        }
        // import static a.b.C.*;
        (true, true) => {
            if has_unresolved {
                return Decision::Keep;
            }
            let owner = import.target();
            let claimed: Vec<String> = used_statics
                .iter()
                .filter(|(o, m)| *o == owner && !named_statics.contains(&(o.clone(), m.clone())))
                .map(|(o, m)| format!("{o}.{m}"))
                .collect();
            match claimed.len() {
                0 => Decision::Remove,
                1 | 2 => Decision::Replace(claimed),
                _ => Decision::Keep,
            }
        }
    }
}
