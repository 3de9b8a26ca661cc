//! Recipe test suites.
//!
//! Each case runs a complete source file through the engine and compares the
//! rewritten text against the exact expected output — whole-file
//! before/after pairs, trivia included.

mod harness {
    use crate::engine::{ChangeSet, Engine, Recipe, SourceInput};
    use crate::resolve::TypeTable;

    pub fn run_recipe(recipe: Box<dyn Recipe>, table: TypeTable, src: &str) -> ChangeSet {
        Engine::new(table)
            .with_recipe(recipe)
            .run_file(&SourceInput::new("Test.java", src))
            .expect("fixture must parse")
    }

    /// The recipe rewrites `before` into exactly `after`.
    pub fn assert_changed(recipe: Box<dyn Recipe>, table: TypeTable, before: &str, after: &str) {
        let cs = run_recipe(recipe, table, before);
        assert!(cs.changed, "expected a change for:\n{before}");
        assert_eq!(cs.after, after);
    }

    /// The recipe leaves `src` byte-for-byte alone.
    pub fn assert_unchanged(recipe: Box<dyn Recipe>, table: TypeTable, src: &str) {
        let cs = run_recipe(recipe, table, src);
        assert!(!cs.changed, "expected no change, got:\n{}", cs.after);
        assert_eq!(cs.after, src);
    }
}

#[cfg(test)]
mod unused_import_tests {
    use super::harness::{assert_changed, assert_unchanged, run_recipe};
    use crate::recipes::RemoveUnusedImports;
    use crate::resolve::TypeTable;

    fn table() -> TypeTable {
        TypeTable::new()
            .with_package(
                "java.util",
                &["List", "ArrayList", "Set", "Map", "Collection", "Collections"],
            )
            .with_package("java.io", &["File", "Reader", "Closeable"])
            .with_package("java.sql", &["ResultSet"])
            .with_package("org.junit", &["Test"])
            .with_statics("java.util.Collections", &["emptyList", "emptySet", "singletonList", "sort"])
            .with_statics("java.sql.ResultSet", &["TYPE_FORWARD_ONLY"])
    }

    #[test]
    fn test_named_import_with_no_uses_is_removed() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.List;
import java.util.Set;

class A {
    Set<Integer> s;
}
"#,
            r#"import java.util.Set;

class A {
    Set<Integer> s;
}
"#,
        );
    }

    #[test]
    fn test_named_import_with_a_use_is_retained() {
        assert_unchanged(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.List;

class A {
    List<Integer> items;
}
"#,
        );
    }

    #[test]
    fn test_star_import_with_no_uses_is_removed() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.*;

class A {
    int x;
}
"#,
            r#"class A {
    int x;
}
"#,
        );
    }

    #[test]
    fn test_star_import_collapses_to_one_named_import() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.*;

class A {
    List<Integer> items;
}
"#,
            r#"import java.util.List;

class A {
    List<Integer> items;
}
"#,
        );
    }

    #[test]
    fn test_star_import_collapses_to_two_named_imports_in_first_use_order() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.*;

class A {
    Set<Integer> s;
    List<Integer> l;
}
"#,
            r#"import java.util.Set;
import java.util.List;

class A {
    Set<Integer> s;
    List<Integer> l;
}
"#,
        );
    }

    #[test]
    fn test_star_import_with_three_referenced_types_is_kept() {
        assert_unchanged(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.*;

class A {
    Set<Integer> s;
    List<Integer> l;
    Map<Integer, Integer> m;
}
"#,
        );
    }

    #[test]
    fn test_named_imports_take_precedence_over_star_collapse() {
        // List is already named, so the wildcard only supplies Set and Map.
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.List;
import java.util.*;

class A {
    List<Integer> l;
    Set<Integer> s;
    Map<Integer, Integer> m;
}
"#,
            r#"import java.util.List;
import java.util.Set;
import java.util.Map;

class A {
    List<Integer> l;
    Set<Integer> s;
    Map<Integer, Integer> m;
}
"#,
        );
    }

    #[test]
    fn test_static_star_import_collapses_to_one_static_named_import() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import static java.util.Collections.*;

class A {
    Object items = emptyList();
}
"#,
            r#"import static java.util.Collections.emptyList;

class A {
    Object items = emptyList();
}
"#,
        );
    }

    #[test]
    fn test_static_star_import_with_three_referenced_members_is_kept() {
        assert_unchanged(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import static java.util.Collections.*;

class A {
    Object a = emptyList();
    Object b = emptySet();
    Object c = singletonList(null);
}
"#,
        );
    }

    #[test]
    fn test_unused_static_named_import_is_removed() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import static java.util.Collections.sort;

class A {
    int x;
}
"#,
            r#"class A {
    int x;
}
"#,
        );
    }

    #[test]
    fn test_qualified_static_access_counts_the_type_but_not_the_member() {
        // `ResultSet.TYPE_FORWARD_ONLY` keeps the type's import alive, yet
        // is no use of the static import of the member itself.
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.sql.ResultSet;
import static java.sql.ResultSet.TYPE_FORWARD_ONLY;

class A {
    int t = ResultSet.TYPE_FORWARD_ONLY;
}
"#,
            r#"import java.sql.ResultSet;

class A {
    int t = ResultSet.TYPE_FORWARD_ONLY;
}
"#,
        );
    }

    #[test]
    fn test_annotation_reference_counts_as_a_use() {
        assert_unchanged(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import org.junit.Test;

class A {
    @Test
    void f() {
    }
}
"#,
        );
    }

    #[test]
    fn test_supertype_and_interface_references_count_as_uses() {
        assert_unchanged(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.ArrayList;
import java.io.Closeable;

class A extends ArrayList implements Closeable {
}
"#,
        );
    }

    #[test]
    fn test_unresolved_reference_keeps_wildcard_imports() {
        // `Mystery` is not in the type table; the wildcard may be what
        // supplies it, so it must survive.
        assert_unchanged(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.*;

class A {
    Mystery m;
}
"#,
        );
    }

    #[test]
    fn test_removing_every_import_leaves_one_blank_line_after_package() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"package com.example;

import java.util.List;
import java.util.Set;

class A {
}
"#,
            r#"package com.example;

class A {
}
"#,
        );
    }

    #[test]
    fn test_comment_between_imports_and_type_stays_put() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.List;

// entry point
class A {
}
"#,
            r#"

// entry point
class A {
}
"#,
        );
    }

    #[test]
    fn test_blank_line_group_separation_survives_removal() {
        assert_changed(
            Box::new(RemoveUnusedImports),
            table(),
            r#"import java.util.List;

import java.io.File;
import java.io.Reader;

class A {
    List<Integer> l;
    Reader r;
}
"#,
            r#"import java.util.List;

import java.io.Reader;

class A {
    List<Integer> l;
    Reader r;
}
"#,
        );
    }

    #[test]
    fn test_import_removal_is_idempotent() {
        let before = r#"import java.util.*;

class A {
    Set<Integer> s;
    List<Integer> l;
}
"#;
        let first = run_recipe(Box::new(RemoveUnusedImports), table(), before);
        assert!(first.changed);
        let second = run_recipe(Box::new(RemoveUnusedImports), table(), &first.after);
        assert!(!second.changed);
        assert_eq!(second.after, first.after);
    }
}

#[cfg(test)]
mod unused_assignment_tests {
    use super::harness::{assert_changed, assert_unchanged, run_recipe};
    use crate::recipes::RemoveUnusedAssignments;
    use crate::resolve::TypeTable;

    #[test]
    fn test_sequential_writes_collapse_to_the_final_write() {
        assert_changed(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    int f() {
        int x;
        x = 0;
        x = 1;
        x = 2;
        x = 99;
        return x;
    }
}
"#,
            r#"class A {
    int f() {
        int x;
        x = 99;
        return x;
    }
}
"#,
        );
    }

    #[test]
    fn test_write_read_through_second_variable_is_retained() {
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    int f() {
        int x;
        x = 1;
        int y = x;
        x = 2;
        return x;
    }
}
"#,
        );
    }

    #[test]
    fn test_trailing_writes_with_no_read_are_removed() {
        // Only `b` is read after the reassignments, so the whole trailing
        // run of writes to `a` goes, last one included.
        assert_changed(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    int f() {
        int a;
        a = 0;
        int b = a;
        a = 1;
        a = 2;
        a = 3;
        a = 99;
        return b;
    }
}
"#,
            r#"class A {
    int f() {
        int a;
        a = 0;
        int b = a;
        return b;
    }
}
"#,
        );
    }

    #[test]
    fn test_writes_never_read_are_all_removed() {
        assert_changed(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    void f() {
        int x;
        x = 1;
        x = 2;
    }
}
"#,
            r#"class A {
    void f() {
        int x;
    }
}
"#,
        );
    }

    #[test]
    fn test_self_referencing_assignment_keeps_the_prior_write() {
        // The right-hand side of `x = x + 1` reads the prior value before
        // the store, so `x = 1` is live.
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    int f() {
        int x = 0;
        x = 1;
        x = x + 1;
        return x;
    }
}
"#,
        );
    }

    #[test]
    fn test_write_read_in_the_other_branch_is_retained() {
        // Overwritten on the then-path, read on the else-path: retained.
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    void f(boolean c) {
        int x;
        x = 1;
        if (c) {
            x = 2;
        } else {
            emit(x);
        }
        emit(x);
    }
}
"#,
        );
    }

    #[test]
    fn test_write_overwritten_in_both_branches_is_removed() {
        assert_changed(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    void f(boolean c) {
        int x;
        x = 1;
        if (c) {
            x = 2;
        } else {
            x = 3;
        }
        emit(x);
    }
}
"#,
            r#"class A {
    void f(boolean c) {
        int x;
        if (c) {
            x = 2;
        } else {
            x = 3;
        }
        emit(x);
    }
}
"#,
        );
    }

    #[test]
    fn test_conditional_overwrite_alone_retains_the_write() {
        // Without an else arm the branch can fall through unwritten.
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    void f(boolean c) {
        int x;
        x = 1;
        if (c) {
            x = 2;
        }
        emit(x);
    }
}
"#,
        );
    }

    #[test]
    fn test_write_in_loop_body_is_never_removed() {
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    void f(boolean c) {
        int x = 0;
        while (c) {
            x = 1;
        }
    }
}
"#,
        );
    }

    #[test]
    fn test_write_in_for_each_body_is_never_removed() {
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    void f(List<String> names) {
        int n = 0;
        for (String s : names) {
            n = 1;
        }
    }
}
"#,
        );
    }

    #[test]
    fn test_compound_assignment_is_never_removed() {
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    int f() {
        int x;
        x = 1;
        x += 2;
        x = 3;
        return x;
    }
}
"#,
        );
    }

    #[test]
    fn test_field_writes_are_never_removed() {
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    int total;
    void f() {
        total = 1;
        total = 2;
        this.total = 3;
    }
}
"#,
        );
    }

    #[test]
    fn test_captured_variable_is_left_alone() {
        // The anonymous class reads `x` at a time this scan cannot order.
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    Object f() {
        int x;
        x = 1;
        x = 2;
        return new Runnable() {
            void run() {
                emit(x);
            }
        };
    }
}
"#,
        );
    }

    #[test]
    fn test_lambda_capture_is_left_alone() {
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    void f() {
        int x;
        x = 1;
        x = 2;
        accept(y -> x + y);
    }
}
"#,
        );
    }

    #[test]
    fn test_shadowed_inner_variable_is_analyzed_independently() {
        assert_changed(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    Object f() {
        int x;
        x = 1;
        x = 2;
        use(x);
        return new Runnable() {
            void run() {
                int x;
                x = 7;
                x = 8;
                emit(x);
            }
        };
    }
}
"#,
            r#"class A {
    Object f() {
        int x;
        x = 2;
        use(x);
        return new Runnable() {
            void run() {
                int x;
                x = 8;
                emit(x);
            }
        };
    }
}
"#,
        );
    }

    #[test]
    fn test_declaration_initializer_is_never_removed() {
        assert_unchanged(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    void f() {
        int x = compute();
        x = 2;
        emit(x);
    }
}
"#,
        );
    }

    #[test]
    fn test_parameter_reassignment_collapses() {
        assert_changed(
            Box::new(RemoveUnusedAssignments),
            TypeTable::new(),
            r#"class A {
    int f(int p) {
        p = 1;
        p = 2;
        return p;
    }
}
"#,
            r#"class A {
    int f(int p) {
        p = 2;
        return p;
    }
}
"#,
        );
    }

    #[test]
    fn test_assignment_removal_is_idempotent() {
        let before = r#"class A {
    int f() {
        int x;
        x = 1;
        x = 2;
        x = 3;
        return x;
    }
}
"#;
        let first = run_recipe(Box::new(RemoveUnusedAssignments), TypeTable::new(), before);
        assert!(first.changed);
        let second = run_recipe(Box::new(RemoveUnusedAssignments), TypeTable::new(), &first.after);
        assert!(!second.changed);
        assert_eq!(second.after, first.after);
    }
}

#[cfg(test)]
mod pipeline_tests {
    use crate::engine::{Engine, SourceInput};
    use crate::recipes::{RemoveUnusedAssignments, RemoveUnusedImports};
    use crate::resolve::TypeTable;

    fn table() -> TypeTable {
        TypeTable::new().with_package("java.util", &["List", "Set"])
    }

    #[test]
    fn test_zero_recipes_round_trip_exactly() {
        let src = r#"package demo;

import java.util.List;

/* leading
   block */
class A {
    // count of things
    int n = 0;

    void f(List<Integer> xs) {
        n = n + 1;  // bump
    }
}
"#;
        let cs = Engine::new(table())
            .run_file(&SourceInput::new("A.java", src))
            .unwrap();
        assert!(!cs.changed);
        assert!(!cs.structurally_changed);
        assert_eq!(cs.after, src);
    }

    #[test]
    fn test_recipes_compose_over_one_file() {
        let src = r#"import java.util.List;
import java.util.Set;

class A {
    void f(Set<Integer> s) {
        int x;
        x = 1;
        x = 2;
        emit(x, s);
    }
}
"#;
        let cs = Engine::new(table())
            .with_recipe(Box::new(RemoveUnusedImports))
            .with_recipe(Box::new(RemoveUnusedAssignments))
            .run_file(&SourceInput::new("A.java", src))
            .unwrap();
        assert!(cs.changed);
        assert!(cs.structurally_changed);
        assert_eq!(
            cs.after,
            r#"import java.util.Set;

class A {
    void f(Set<Integer> s) {
        int x;
        x = 2;
        emit(x, s);
    }
}
"#
        );
    }

    #[test]
    fn test_composed_run_reaches_a_fixed_point() {
        let src = r#"import java.util.List;

class A {
    void f() {
        int x;
        x = 1;
        x = 2;
        emit(x);
    }
}
"#;
        let engine = Engine::new(table())
            .with_recipe(Box::new(RemoveUnusedImports))
            .with_recipe(Box::new(RemoveUnusedAssignments));
        let first = engine.run_file(&SourceInput::new("A.java", src)).unwrap();
        assert!(first.changed);
        let second = engine
            .run_file(&SourceInput::new("A.java", &first.after))
            .unwrap();
        assert!(!second.changed);
        assert_eq!(second.after, first.after);
    }
}
